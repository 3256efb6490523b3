//! Toolkit capability interfaces
//!
//! The engine never touches a GUI toolkit directly. It drives a [`ViewHost`] (view tree and
//! constraint primitives) and reaches individual widgets through [`Widget`], whose optional
//! single-property capabilities replace runtime reflection: a widget that has no text simply
//! returns `None` from [`Widget::as_text`] and text properties skip it.

pub mod geometry;
pub mod values;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::constraint::attribute::{Attribute, Relation, TraitCollection};
use crate::stylesheet::Color;

pub use geometry::{EdgeInsets, Point, Rect};
pub use values::{ContentMode, LineBreakMode, TextAlignment};

/// Handle to a live widget owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// Handle to an installed relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub u64);

/// Required priority; anything lower may be broken by the toolkit
pub const PRIORITY_REQUIRED: f64 = 1000.0;

/// A concrete linear relation: `item.attribute (relation) to_item.to_attribute * multiplier + constant`
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConstraint {
    pub item: WidgetId,
    pub attribute: Attribute,
    pub relation: Relation,
    /// `None` for intrinsic-size relations
    pub to_item: Option<WidgetId>,
    pub to_attribute: Option<Attribute>,
    pub multiplier: f64,
    pub constant: f64,
    pub priority: f64,
    pub identifier: Option<String>,
    pub active: bool,
}

impl LayoutConstraint {
    /// Every widget this relation mentions
    pub fn involves(&self, view: WidgetId) -> bool {
        self.item == view || self.to_item == Some(view)
    }
}

/// View tree and constraint primitives of a toolkit
pub trait ViewHost {
    /// Instantiate a widget of the named class, or a plain view when `None`
    fn create_view(&mut self, class: Option<&str>) -> WidgetId;

    fn superview(&self, view: WidgetId) -> Option<WidgetId>;

    /// Children in stacking order, back to front
    fn subviews(&self, view: WidgetId) -> Vec<WidgetId>;

    /// Append `child` to `parent`, moving it to the front if it is already there
    fn add_subview(&mut self, parent: WidgetId, child: WidgetId);

    fn remove_from_superview(&mut self, view: WidgetId);

    fn add_constraint(&mut self, owner: WidgetId, constraint: LayoutConstraint) -> ConstraintId;

    fn remove_constraint(&mut self, owner: WidgetId, id: ConstraintId);

    fn remove_all_constraints(&mut self, owner: WidgetId);

    /// Constraints owned by `owner`
    fn constraints(&self, owner: WidgetId) -> Vec<ConstraintId>;

    fn constraint(&self, id: ConstraintId) -> Option<&LayoutConstraint>;

    fn set_constraint_active(&mut self, id: ConstraintId, active: bool);

    fn trait_collection(&self, view: WidgetId) -> TraitCollection;

    fn widget_mut(&mut self, view: WidgetId) -> Option<&mut dyn Widget>;

    fn root_of(&self, view: WidgetId) -> WidgetId {
        let mut current = view;
        while let Some(parent) = self.superview(current) {
            current = parent;
        }
        current
    }

    fn shares_ancestry(&self, a: WidgetId, b: WidgetId) -> bool {
        self.root_of(a) == self.root_of(b)
    }
}

/// Properties every view supports
pub trait ViewMappable {
    fn frame(&self) -> Rect;
    fn set_frame(&mut self, frame: Rect);

    fn background_color(&self) -> Option<Color>;
    fn set_background_color(&mut self, color: Option<Color>);

    fn corner_radius(&self) -> f64;
    fn set_corner_radius(&mut self, radius: f64);

    fn border_width(&self) -> f64;
    fn set_border_width(&mut self, width: f64);

    fn border_color(&self) -> Option<Color>;
    fn set_border_color(&mut self, color: Option<Color>);

    fn alpha(&self) -> f64;
    fn set_alpha(&mut self, alpha: f64);

    fn clips_to_bounds(&self) -> bool;
    fn set_clips_to_bounds(&mut self, clips: bool);

    fn content_mode(&self) -> ContentMode;
    fn set_content_mode(&mut self, mode: ContentMode);

    fn is_hidden(&self) -> bool;
    fn set_hidden(&mut self, hidden: bool);
}

pub trait TextMappable {
    fn text(&self) -> Option<String>;
    fn set_text(&mut self, text: Option<String>);
}

pub trait TextColorMappable {
    fn text_color(&self) -> Option<Color>;
    fn set_text_color(&mut self, color: Option<Color>);
}

pub trait LineBreakModeMappable {
    fn line_break_mode(&self) -> LineBreakMode;
    fn set_line_break_mode(&mut self, mode: LineBreakMode);
}

pub trait TextAlignmentMappable {
    fn text_alignment(&self) -> TextAlignment;
    fn set_text_alignment(&mut self, alignment: TextAlignment);
}

pub trait NumberOfLinesMappable {
    fn number_of_lines(&self) -> i64;
    fn set_number_of_lines(&mut self, lines: i64);
}

pub trait FontSizeMappable {
    fn font_size(&self) -> f64;
    fn set_font_size(&mut self, size: f64);
}

pub trait ImageMappable {
    fn image(&self) -> Option<String>;
    fn set_image(&mut self, name: Option<String>);
}

pub trait BackgroundImageMappable {
    fn background_image(&self) -> Option<String>;
    fn set_background_image(&mut self, name: Option<String>);
}

pub trait ContentInsetMappable {
    fn content_inset(&self) -> EdgeInsets;
    fn set_content_inset(&mut self, inset: EdgeInsets);
}

pub trait ContentOffsetMappable {
    fn content_offset(&self) -> Point;
    fn set_content_offset(&mut self, offset: Point);
}

pub trait PlaceholderMappable {
    fn placeholder(&self) -> Option<String>;
    fn set_placeholder(&mut self, text: Option<String>);
}

pub trait TranslucentMappable {
    fn is_translucent(&self) -> bool;
    fn set_translucent(&mut self, translucent: bool);
}

pub trait TintColorMappable {
    fn tint_color(&self) -> Option<Color>;
    fn set_tint_color(&mut self, color: Option<Color>);
}

/// A live widget: base view properties plus whichever capabilities its kind has
pub trait Widget: ViewMappable {
    fn class_name(&self) -> &str;

    fn as_text(&mut self) -> Option<&mut dyn TextMappable> {
        None
    }
    fn as_text_color(&mut self) -> Option<&mut dyn TextColorMappable> {
        None
    }
    fn as_line_break_mode(&mut self) -> Option<&mut dyn LineBreakModeMappable> {
        None
    }
    fn as_text_alignment(&mut self) -> Option<&mut dyn TextAlignmentMappable> {
        None
    }
    fn as_number_of_lines(&mut self) -> Option<&mut dyn NumberOfLinesMappable> {
        None
    }
    fn as_font_size(&mut self) -> Option<&mut dyn FontSizeMappable> {
        None
    }
    fn as_image(&mut self) -> Option<&mut dyn ImageMappable> {
        None
    }
    fn as_background_image(&mut self) -> Option<&mut dyn BackgroundImageMappable> {
        None
    }
    fn as_content_inset(&mut self) -> Option<&mut dyn ContentInsetMappable> {
        None
    }
    fn as_content_offset(&mut self) -> Option<&mut dyn ContentOffsetMappable> {
        None
    }
    fn as_placeholder(&mut self) -> Option<&mut dyn PlaceholderMappable> {
        None
    }
    fn as_translucent(&mut self) -> Option<&mut dyn TranslucentMappable> {
        None
    }
    fn as_tint_color(&mut self) -> Option<&mut dyn TintColorMappable> {
        None
    }
}

/// Hosting-controller chrome that document-level properties can target
pub trait ControllerChrome {
    fn navigation_bar(&self) -> Option<WidgetId>;
    fn set_title(&self, title: &str);
}

/// Where existing widgets are looked up by name
pub trait ViewEnvironment {
    fn view(&self, key: &str) -> Option<WidgetId>;

    fn as_controller(&self) -> Option<&dyn ControllerChrome> {
        None
    }
}

/// A named-outlet environment.
///
/// Lookups fall back to the parent environment, so a view declared on a base environment is
/// visible through every environment derived from it.
#[derive(Default)]
pub struct Outlets {
    views: RefCell<IndexMap<String, WidgetId>>,
    parent: Option<Rc<dyn ViewEnvironment>>,
}

impl fmt::Debug for Outlets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outlets")
            .field("views", &self.views.borrow())
            .field("inherits", &self.parent.is_some())
            .finish()
    }
}

impl Outlets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inheriting(parent: Rc<dyn ViewEnvironment>) -> Self {
        Self {
            views: RefCell::default(),
            parent: Some(parent),
        }
    }

    pub fn with(self, key: &str, view: WidgetId) -> Self {
        self.insert(key, view);
        self
    }

    pub fn insert(&self, key: &str, view: WidgetId) {
        self.views.borrow_mut().insert(key.to_string(), view);
    }

    pub fn remove(&self, key: &str) -> Option<WidgetId> {
        self.views.borrow_mut().shift_remove(key)
    }
}

impl ViewEnvironment for Outlets {
    fn view(&self, key: &str) -> Option<WidgetId> {
        let own = self.views.borrow().get(key).copied();
        own.or_else(|| self.parent.as_ref().and_then(|p| p.view(key)))
    }
}

/// A screen controller: outlets plus a navigation bar and a title
#[derive(Debug, Default)]
pub struct Controller {
    pub outlets: Outlets,
    navigation_bar: Option<WidgetId>,
    title: RefCell<Option<String>>,
}

impl Controller {
    pub fn new(outlets: Outlets, navigation_bar: Option<WidgetId>) -> Self {
        Self {
            outlets,
            navigation_bar,
            title: RefCell::default(),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.title.borrow().clone()
    }
}

impl ControllerChrome for Controller {
    fn navigation_bar(&self) -> Option<WidgetId> {
        self.navigation_bar
    }

    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = Some(title.to_string());
    }
}

impl ViewEnvironment for Controller {
    fn view(&self, key: &str) -> Option<WidgetId> {
        self.outlets.view(key)
    }

    fn as_controller(&self) -> Option<&dyn ControllerChrome> {
        Some(self)
    }
}

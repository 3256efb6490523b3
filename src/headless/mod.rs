//! In-memory toolkit
//!
//! [`HeadlessHost`] implements [`ViewHost`] over an arena of [`HeadlessWidget`]s. It behaves
//! like a retained-mode GUI toolkit closely enough to drive the engine without a display:
//! detaching a view drops every relation that mentions it or its descendants, and frames are
//! computed from the installed relations by [`HeadlessHost::layout`].

pub mod solver;

use indexmap::IndexMap;

use crate::constraint::attribute::TraitCollection;
use crate::host::{
    BackgroundImageMappable, ConstraintId, ContentInsetMappable, ContentMode,
    ContentOffsetMappable, EdgeInsets, FontSizeMappable, ImageMappable, LayoutConstraint,
    LineBreakMode, LineBreakModeMappable, NumberOfLinesMappable, PlaceholderMappable, Point, Rect,
    TextAlignment, TextAlignmentMappable, TextColorMappable, TextMappable, TintColorMappable,
    TranslucentMappable, ViewHost, ViewMappable, Widget, WidgetId,
};
use crate::stylesheet::Color;

pub use solver::{FrameSolution, FrameSolver, SolverError};

/// Widget families the headless toolkit can instantiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetKind {
    #[default]
    View,
    Label,
    Button,
    ImageView,
    TextField,
    ScrollView,
    NavigationBar,
}

impl WidgetKind {
    /// Map a class name such as `UILabel` or `label` onto a kind. Unknown classes are plain views.
    pub fn from_class(class: &str) -> Self {
        let name = class.strip_prefix("UI").unwrap_or(class).to_ascii_lowercase();
        match name.as_str() {
            "label" => WidgetKind::Label,
            "button" => WidgetKind::Button,
            "imageview" | "image" => WidgetKind::ImageView,
            "textfield" => WidgetKind::TextField,
            "scrollview" | "scroll" => WidgetKind::ScrollView,
            "navigationbar" => WidgetKind::NavigationBar,
            _ => WidgetKind::View,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            WidgetKind::View => "UIView",
            WidgetKind::Label => "UILabel",
            WidgetKind::Button => "UIButton",
            WidgetKind::ImageView => "UIImageView",
            WidgetKind::TextField => "UITextField",
            WidgetKind::ScrollView => "UIScrollView",
            WidgetKind::NavigationBar => "UINavigationBar",
        }
    }
}

/// A widget with every mappable property stored as plain data
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWidget {
    kind: WidgetKind,
    class_name: String,
    frame: Rect,
    background_color: Option<Color>,
    corner_radius: f64,
    border_width: f64,
    border_color: Option<Color>,
    alpha: f64,
    clips_to_bounds: bool,
    content_mode: ContentMode,
    hidden: bool,
    text: Option<String>,
    text_color: Option<Color>,
    line_break_mode: LineBreakMode,
    text_alignment: TextAlignment,
    number_of_lines: i64,
    font_size: f64,
    image: Option<String>,
    background_image: Option<String>,
    content_inset: EdgeInsets,
    content_offset: Point,
    placeholder: Option<String>,
    translucent: bool,
    tint_color: Option<Color>,
    bar_tint_color: Option<Color>,
}

impl HeadlessWidget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            class_name: kind.class_name().to_string(),
            frame: Rect::default(),
            background_color: None,
            corner_radius: 0.0,
            border_width: 0.0,
            border_color: None,
            alpha: 1.0,
            clips_to_bounds: false,
            content_mode: ContentMode::default(),
            hidden: false,
            text: None,
            text_color: None,
            line_break_mode: LineBreakMode::default(),
            text_alignment: TextAlignment::default(),
            number_of_lines: 1,
            font_size: 17.0,
            image: None,
            background_image: None,
            content_inset: EdgeInsets::default(),
            content_offset: Point::default(),
            placeholder: None,
            translucent: true,
            tint_color: None,
            bar_tint_color: None,
        }
    }

    /// A widget for `class`, keeping the requested class name
    pub fn of_class(class: &str) -> Self {
        Self {
            class_name: class.to_string(),
            ..Self::new(WidgetKind::from_class(class))
        }
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn bar_tint_color(&self) -> Option<Color> {
        self.bar_tint_color
    }
}

impl ViewMappable for HeadlessWidget {
    fn frame(&self) -> Rect {
        self.frame
    }
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    // A navigation bar's background is its bar tint
    fn background_color(&self) -> Option<Color> {
        match self.kind {
            WidgetKind::NavigationBar => self.bar_tint_color,
            _ => self.background_color,
        }
    }
    fn set_background_color(&mut self, color: Option<Color>) {
        match self.kind {
            WidgetKind::NavigationBar => self.bar_tint_color = color,
            _ => self.background_color = color,
        }
    }

    fn corner_radius(&self) -> f64 {
        self.corner_radius
    }
    fn set_corner_radius(&mut self, radius: f64) {
        self.corner_radius = radius;
    }

    fn border_width(&self) -> f64 {
        self.border_width
    }
    fn set_border_width(&mut self, width: f64) {
        self.border_width = width;
    }

    fn border_color(&self) -> Option<Color> {
        self.border_color
    }
    fn set_border_color(&mut self, color: Option<Color>) {
        self.border_color = color;
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }
    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn clips_to_bounds(&self) -> bool {
        self.clips_to_bounds
    }
    fn set_clips_to_bounds(&mut self, clips: bool) {
        self.clips_to_bounds = clips;
    }

    fn content_mode(&self) -> ContentMode {
        self.content_mode
    }
    fn set_content_mode(&mut self, mode: ContentMode) {
        self.content_mode = mode;
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

impl TextMappable for HeadlessWidget {
    fn text(&self) -> Option<String> {
        self.text.clone()
    }
    fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }
}

// On a navigation bar this is the title color
impl TextColorMappable for HeadlessWidget {
    fn text_color(&self) -> Option<Color> {
        self.text_color
    }
    fn set_text_color(&mut self, color: Option<Color>) {
        self.text_color = color;
    }
}

impl LineBreakModeMappable for HeadlessWidget {
    fn line_break_mode(&self) -> LineBreakMode {
        self.line_break_mode
    }
    fn set_line_break_mode(&mut self, mode: LineBreakMode) {
        self.line_break_mode = mode;
    }
}

impl TextAlignmentMappable for HeadlessWidget {
    fn text_alignment(&self) -> TextAlignment {
        self.text_alignment
    }
    fn set_text_alignment(&mut self, alignment: TextAlignment) {
        self.text_alignment = alignment;
    }
}

impl NumberOfLinesMappable for HeadlessWidget {
    fn number_of_lines(&self) -> i64 {
        self.number_of_lines
    }
    fn set_number_of_lines(&mut self, lines: i64) {
        self.number_of_lines = lines;
    }
}

impl FontSizeMappable for HeadlessWidget {
    fn font_size(&self) -> f64 {
        self.font_size
    }
    fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }
}

impl ImageMappable for HeadlessWidget {
    fn image(&self) -> Option<String> {
        self.image.clone()
    }
    fn set_image(&mut self, name: Option<String>) {
        self.image = name;
    }
}

impl BackgroundImageMappable for HeadlessWidget {
    fn background_image(&self) -> Option<String> {
        self.background_image.clone()
    }
    fn set_background_image(&mut self, name: Option<String>) {
        self.background_image = name;
    }
}

impl ContentInsetMappable for HeadlessWidget {
    fn content_inset(&self) -> EdgeInsets {
        self.content_inset
    }
    fn set_content_inset(&mut self, inset: EdgeInsets) {
        self.content_inset = inset;
    }
}

impl ContentOffsetMappable for HeadlessWidget {
    fn content_offset(&self) -> Point {
        self.content_offset
    }
    fn set_content_offset(&mut self, offset: Point) {
        self.content_offset = offset;
    }
}

impl PlaceholderMappable for HeadlessWidget {
    fn placeholder(&self) -> Option<String> {
        self.placeholder.clone()
    }
    fn set_placeholder(&mut self, text: Option<String>) {
        self.placeholder = text;
    }
}

impl TranslucentMappable for HeadlessWidget {
    fn is_translucent(&self) -> bool {
        self.translucent
    }
    fn set_translucent(&mut self, translucent: bool) {
        self.translucent = translucent;
    }
}

impl TintColorMappable for HeadlessWidget {
    fn tint_color(&self) -> Option<Color> {
        self.tint_color
    }
    fn set_tint_color(&mut self, color: Option<Color>) {
        self.tint_color = color;
    }
}

/// Expose a capability only for the listed kinds
macro_rules! capability {
    ($method:ident, $capability:ident, $($kind:ident)|+) => {
        fn $method(&mut self) -> Option<&mut dyn $capability> {
            match self.kind {
                $(WidgetKind::$kind)|+ => Some(self),
                _ => None,
            }
        }
    };
}

impl Widget for HeadlessWidget {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    capability!(as_text, TextMappable, Label | Button | TextField);
    capability!(as_text_color, TextColorMappable, Label | Button | TextField | NavigationBar);
    capability!(as_line_break_mode, LineBreakModeMappable, Label);
    capability!(as_text_alignment, TextAlignmentMappable, Label | TextField);
    capability!(as_number_of_lines, NumberOfLinesMappable, Label);
    capability!(as_font_size, FontSizeMappable, Label | Button | TextField);
    capability!(as_image, ImageMappable, Button | ImageView);
    capability!(as_background_image, BackgroundImageMappable, Button | TextField);
    capability!(as_content_inset, ContentInsetMappable, ScrollView);
    capability!(as_content_offset, ContentOffsetMappable, ScrollView);
    capability!(as_placeholder, PlaceholderMappable, TextField);
    capability!(as_translucent, TranslucentMappable, NavigationBar);
    capability!(as_tint_color, TintColorMappable, Button | NavigationBar);
}

#[derive(Debug, Clone)]
struct ViewRecord {
    widget: HeadlessWidget,
    superview: Option<WidgetId>,
    subviews: Vec<WidgetId>,
    constraints: Vec<ConstraintId>,
}

/// Arena-backed [`ViewHost`]
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    views: IndexMap<WidgetId, ViewRecord>,
    constraints: IndexMap<ConstraintId, LayoutConstraint>,
    next_view: u64,
    next_constraint: u64,
    traits: TraitCollection,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trait_collection(mut self, traits: TraitCollection) -> Self {
        self.traits = traits;
        self
    }

    pub fn set_trait_collection(&mut self, traits: TraitCollection) {
        self.traits = traits;
    }

    /// Add a widget that already exists outside any layout
    pub fn insert_widget(&mut self, widget: HeadlessWidget) -> WidgetId {
        let id = WidgetId(self.next_view);
        self.next_view += 1;
        self.views.insert(
            id,
            ViewRecord {
                widget,
                superview: None,
                subviews: Vec::new(),
                constraints: Vec::new(),
            },
        );
        id
    }

    pub fn widget(&self, view: WidgetId) -> Option<&HeadlessWidget> {
        self.views.get(&view).map(|record| &record.widget)
    }

    pub fn contains(&self, view: WidgetId) -> bool {
        self.views.contains_key(&view)
    }

    /// `view` and everything below it, parents first
    pub fn descendants(&self, view: WidgetId) -> Vec<WidgetId> {
        let mut result = vec![view];
        let mut i = 0;
        while i < result.len() {
            result.extend(self.subviews(result[i]));
            i += 1;
        }
        result
    }

    /// Every installed relation, in installation order
    pub fn all_constraints(&self) -> impl Iterator<Item = (ConstraintId, &LayoutConstraint)> + '_ {
        self.constraints.iter().map(|(id, c)| (*id, c))
    }

    /// Active relations whose subject is `view`
    pub fn constraints_on(&self, view: WidgetId) -> Vec<&LayoutConstraint> {
        self.constraints
            .values()
            .filter(|c| c.active && c.item == view)
            .collect()
    }

    /// Solve every active relation under `root`, sized to `size`, and store the frames
    pub fn layout(&mut self, root: WidgetId, width: f64, height: f64) -> FrameSolution {
        let tree = self.descendants(root);
        let mut solver = FrameSolver::new();
        solver.pin(root, Rect::new(0.0, 0.0, width, height));
        for constraint in self.constraints.values() {
            let in_tree = tree.contains(&constraint.item)
                && constraint.to_item.map_or(true, |peer| tree.contains(&peer));
            if constraint.active && in_tree {
                solver.relate(constraint);
            }
        }
        let parents: Vec<_> = tree
            .iter()
            .map(|view| (*view, if *view == root { None } else { self.superview(*view) }))
            .collect();
        let solution = solver.solve(&parents);
        for (view, frame) in &solution.frames {
            if let Some(record) = self.views.get_mut(view) {
                record.widget.set_frame(*frame);
            }
        }
        log::debug!(
            "solved {} frames under {} with {} conflicts",
            solution.frames.len(),
            root,
            solution.conflicts.len()
        );
        solution
    }

    fn drop_constraints_involving(&mut self, views: &[WidgetId]) {
        let doomed: Vec<ConstraintId> = self
            .constraints
            .iter()
            .filter(|(_, c)| views.iter().any(|view| c.involves(*view)))
            .map(|(id, _)| *id)
            .collect();
        for id in doomed {
            self.constraints.shift_remove(&id);
            for record in self.views.values_mut() {
                record.constraints.retain(|c| *c != id);
            }
        }
    }
}

impl ViewHost for HeadlessHost {
    fn create_view(&mut self, class: Option<&str>) -> WidgetId {
        let widget = match class {
            Some(class) => HeadlessWidget::of_class(class),
            None => HeadlessWidget::new(WidgetKind::View),
        };
        self.insert_widget(widget)
    }

    fn superview(&self, view: WidgetId) -> Option<WidgetId> {
        self.views.get(&view).and_then(|record| record.superview)
    }

    fn subviews(&self, view: WidgetId) -> Vec<WidgetId> {
        self.views
            .get(&view)
            .map(|record| record.subviews.clone())
            .unwrap_or_default()
    }

    fn add_subview(&mut self, parent: WidgetId, child: WidgetId) {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return;
        }
        if let Some(old_parent) = self.superview(child) {
            if let Some(record) = self.views.get_mut(&old_parent) {
                record.subviews.retain(|view| *view != child);
            }
        }
        if let Some(record) = self.views.get_mut(&parent) {
            record.subviews.push(child);
        }
        if let Some(record) = self.views.get_mut(&child) {
            record.superview = Some(parent);
        }
    }

    fn remove_from_superview(&mut self, view: WidgetId) {
        let Some(parent) = self.superview(view) else {
            return;
        };
        let subtree = self.descendants(view);
        self.drop_constraints_involving(&subtree);
        if let Some(record) = self.views.get_mut(&parent) {
            record.subviews.retain(|child| *child != view);
        }
        if let Some(record) = self.views.get_mut(&view) {
            record.superview = None;
        }
    }

    fn add_constraint(&mut self, owner: WidgetId, constraint: LayoutConstraint) -> ConstraintId {
        let id = ConstraintId(self.next_constraint);
        self.next_constraint += 1;
        self.constraints.insert(id, constraint);
        if let Some(record) = self.views.get_mut(&owner) {
            record.constraints.push(id);
        }
        id
    }

    fn remove_constraint(&mut self, owner: WidgetId, id: ConstraintId) {
        if let Some(record) = self.views.get_mut(&owner) {
            record.constraints.retain(|c| *c != id);
        }
        self.constraints.shift_remove(&id);
    }

    fn remove_all_constraints(&mut self, owner: WidgetId) {
        let owned = self
            .views
            .get_mut(&owner)
            .map(|record| std::mem::take(&mut record.constraints))
            .unwrap_or_default();
        for id in owned {
            self.constraints.shift_remove(&id);
        }
    }

    fn constraints(&self, owner: WidgetId) -> Vec<ConstraintId> {
        self.views
            .get(&owner)
            .map(|record| record.constraints.clone())
            .unwrap_or_default()
    }

    fn constraint(&self, id: ConstraintId) -> Option<&LayoutConstraint> {
        self.constraints.get(&id)
    }

    fn set_constraint_active(&mut self, id: ConstraintId, active: bool) {
        if let Some(constraint) = self.constraints.get_mut(&id) {
            constraint.active = active;
        }
    }

    fn trait_collection(&self, _view: WidgetId) -> TraitCollection {
        self.traits
    }

    fn widget_mut(&mut self, view: WidgetId) -> Option<&mut dyn Widget> {
        self.views
            .get_mut(&view)
            .map(|record| &mut record.widget as &mut dyn Widget)
    }
}

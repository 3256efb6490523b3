//! Node model
//!
//! A [`ViewNode`] is one entry of the view tree: the raw data it was last built from, the
//! live widget it drives, the relations it installed and the original property values it
//! overwrote. Nodes never own each other; the parent is an id looked up in the index.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::constraint::attribute::{Attribute, SizeClass, TraitCollection};
use crate::host::{ConstraintId, ViewHost, WidgetId};
use crate::parser::{LayoutTemplate, RawConstraint, RawNode, RawProperty};
use crate::property;
use crate::stylesheet::Palette;

/// Prefix marking a node whose widget is created by the layout
pub const NEW_ELEMENT_MARKER: char = '!';

/// Separates the id from the class a new widget is instantiated as
pub const CLASS_SEPARATOR: char = ':';

/// The facts encoded in a raw id such as `!title:UILabel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeIdentity<'a> {
    pub id: &'a str,
    pub is_new: bool,
    /// Only meaningful for new elements
    pub class: Option<&'a str>,
}

impl<'a> NodeIdentity<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        let (is_new, rest) = match raw.strip_prefix(NEW_ELEMENT_MARKER) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (id, class) = match rest.split_once(CLASS_SEPARATOR) {
            Some((id, class)) => (id, Some(class).filter(|c| is_new && !c.is_empty())),
            None => (rest, None),
        };
        Self { id, is_new, class }
    }
}

/// A relation this node installed on the host
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedConstraint {
    pub id: ConstraintId,
    /// Widget the relation is attached to
    pub owner: WidgetId,
    pub attribute: Attribute,
    pub identifier: Option<String>,
    pub horizontal_size_class: Option<SizeClass>,
    pub vertical_size_class: Option<SizeClass>,
}

impl AppliedConstraint {
    pub fn is_gated(&self) -> bool {
        self.horizontal_size_class.is_some() || self.vertical_size_class.is_some()
    }

    /// Toggle a gated relation to match the current size classes
    pub fn update_active(&self, host: &mut dyn ViewHost, traits: &TraitCollection) {
        if self.is_gated() {
            let active = traits.satisfies(self.horizontal_size_class, self.vertical_size_class);
            host.set_constraint_active(self.id, active);
        }
    }
}

/// One layout node
#[derive(Debug, Clone)]
pub struct ViewNode {
    id: String,
    /// Raw data without subviews; children live in their own nodes
    raw: RawNode,
    parent: Option<String>,
    is_root: bool,
    active: bool,
    target: Option<WidgetId>,
    cached_properties: IndexMap<String, String>,
    applied_constraints: Vec<AppliedConstraint>,
    applied_templates: Vec<Rc<LayoutTemplate>>,
}

fn without_subviews(mut raw: RawNode) -> RawNode {
    raw.subviews.clear();
    raw
}

impl ViewNode {
    pub fn new(raw: RawNode, parent: Option<String>, is_root: bool) -> Self {
        let id = raw.identity().id.to_string();
        Self {
            id,
            raw: without_subviews(raw),
            parent,
            is_root,
            active: true,
            target: None,
            cached_properties: IndexMap::new(),
            applied_constraints: Vec::new(),
            applied_templates: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn raw(&self) -> &RawNode {
        &self.raw
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_new_element(&self) -> bool {
        self.raw.identity().is_new
    }

    pub fn class_name(&self) -> Option<&str> {
        self.raw.identity().class
    }

    pub fn z_index(&self) -> i32 {
        self.raw.z_index
    }

    pub fn target(&self) -> Option<WidgetId> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<WidgetId>) {
        self.target = target;
    }

    /// Swap in fresh raw data from a new build and reactivate. A node without a parent is
    /// the root of that build.
    pub fn update(&mut self, raw: RawNode, parent: Option<String>) {
        self.raw = without_subviews(raw);
        self.is_root = parent.is_none();
        self.parent = parent;
        self.active = true;
    }

    pub fn apply_template(&mut self, template: Rc<LayoutTemplate>) {
        self.applied_templates.push(template);
    }

    pub fn clear_templates(&mut self) {
        self.applied_templates.clear();
    }

    pub fn applied_templates(&self) -> &[Rc<LayoutTemplate>] {
        &self.applied_templates
    }

    /// Own constraints first, then each applied template's in order
    pub fn affecting_constraints(&self) -> impl Iterator<Item = &RawConstraint> + '_ {
        self.raw.constraints.iter().chain(
            self.applied_templates
                .iter()
                .flat_map(|template| template.constraints.iter()),
        )
    }

    /// Own properties first, then each applied template's in order
    pub fn affecting_properties(&self) -> impl Iterator<Item = &RawProperty> + '_ {
        self.raw.properties.iter().chain(
            self.applied_templates
                .iter()
                .flat_map(|template| template.properties.iter()),
        )
    }

    pub fn cached_properties(&self) -> &IndexMap<String, String> {
        &self.cached_properties
    }

    // Constraints

    pub fn applied_constraints(&self) -> &[AppliedConstraint] {
        &self.applied_constraints
    }

    pub fn record_constraint(&mut self, constraint: AppliedConstraint) {
        self.applied_constraints.push(constraint);
    }

    pub fn constraints_for_attribute(&self, attribute: Attribute) -> Vec<&AppliedConstraint> {
        self.constraints_for_attributes(&[attribute])
    }

    pub fn constraints_for_attributes(&self, attributes: &[Attribute]) -> Vec<&AppliedConstraint> {
        self.applied_constraints
            .iter()
            .filter(|c| attributes.contains(&c.attribute))
            .collect()
    }

    pub fn constraint_with_identifier(&self, identifier: &str) -> Option<&AppliedConstraint> {
        self.applied_constraints
            .iter()
            .find(|c| c.identifier.as_deref() == Some(identifier))
    }

    pub fn constraints_with_identifiers(&self, identifiers: &[&str]) -> Vec<&AppliedConstraint> {
        self.applied_constraints
            .iter()
            .filter(|c| {
                c.identifier
                    .as_deref()
                    .is_some_and(|id| identifiers.contains(&id))
            })
            .collect()
    }

    /// Remove every relation this node installed
    pub fn clear_constraints(&mut self, host: &mut dyn ViewHost) {
        for constraint in self.applied_constraints.drain(..) {
            host.remove_constraint(constraint.owner, constraint.id);
        }
    }

    pub fn update_constraint_activity(&self, host: &mut dyn ViewHost, traits: &TraitCollection) {
        for constraint in &self.applied_constraints {
            constraint.update_active(host, traits);
        }
    }

    // Properties

    /// Apply one property, first capturing the widget's current value if this node has never
    /// overwritten that property before
    pub fn apply_property(
        &mut self,
        host: &mut dyn ViewHost,
        name: &str,
        value: &str,
        palette: &Palette,
    ) {
        let Some(widget) = self.target.and_then(|target| host.widget_mut(target)) else {
            return;
        };
        if !self.cached_properties.contains_key(name) {
            if let Some(current) = property::retrieve(widget, name, palette) {
                self.cached_properties.insert(name.to_string(), current);
            }
        }
        property::apply(widget, name, value, palette);
    }

    /// Restore the baseline, then apply own and template properties
    pub fn apply_all_properties(&mut self, host: &mut dyn ViewHost, palette: &Palette) {
        self.reset_properties(host, palette);
        let properties: Vec<RawProperty> = self.affecting_properties().cloned().collect();
        for RawProperty { name, value } in &properties {
            self.apply_property(host, name, value, palette);
        }
    }

    /// Put every cached original value back. The cache itself is kept.
    pub fn reset_properties(&self, host: &mut dyn ViewHost, palette: &Palette) {
        let Some(widget) = self.target.and_then(|target| host.widget_mut(target)) else {
            return;
        };
        for (name, value) in &self.cached_properties {
            property::apply(&mut *widget, name, value, palette);
        }
    }

    /// Take this node out of the live hierarchy and restore the widget it drove
    pub fn remove(&mut self, host: &mut dyn ViewHost, palette: &Palette) {
        if let Some(target) = self.target {
            if self.is_root {
                host.remove_all_constraints(target);
            } else {
                self.clear_constraints(host);
                host.remove_from_superview(target);
            }
        }
        self.applied_constraints.clear();
        self.applied_templates.clear();
        self.active = false;
        self.reset_properties(host, palette);
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use crate::host::ViewMappable;
    use crate::stylesheet::Color;

    #[test]
    fn test_identity_parsing() {
        assert_eq!(
            NodeIdentity::parse("!title:UILabel"),
            NodeIdentity {
                id: "title",
                is_new: true,
                class: Some("UILabel")
            }
        );
        assert_eq!(
            NodeIdentity::parse("header"),
            NodeIdentity {
                id: "header",
                is_new: false,
                class: None
            }
        );
        // A class is only honored on new elements
        let existing = NodeIdentity::parse("header:UILabel");
        assert_eq!(existing.id, "header");
        assert_eq!(existing.class, None);
    }

    #[test]
    fn test_new_strips_subviews() {
        let raw = RawNode::new("!box").with_subview(RawNode::new("!inner"));
        let node = ViewNode::new(raw, Some("root".into()), false);
        assert_eq!(node.id(), "box");
        assert!(node.is_new_element());
        assert!(node.raw().subviews.is_empty());
        assert_eq!(node.parent(), Some("root"));
    }

    #[test]
    fn test_template_content_follows_own() {
        let template = Rc::new(LayoutTemplate {
            name: "card".into(),
            constraints: vec![RawConstraint::pair("height", "+40")],
            properties: vec![RawProperty::new("alpha", "0.5")],
        });
        let raw = RawNode::new("!box")
            .with_constraint(RawConstraint::pair("width", "+10"))
            .with_property("hidden", "false");
        let mut node = ViewNode::new(raw, None, false);
        node.apply_template(template);
        let names: Vec<_> = node.affecting_properties().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["hidden", "alpha"]);
        assert_eq!(node.affecting_constraints().count(), 2);
        node.clear_templates();
        assert_eq!(node.affecting_constraints().count(), 1);
    }

    #[test]
    fn test_cache_is_first_write_wins() {
        let mut host = HeadlessHost::new();
        let parent = host.create_view(None);
        let view = host.create_view(None);
        host.add_subview(parent, view);
        let palette = Palette::default();

        let mut node = ViewNode::new(RawNode::new("!box"), None, false);
        node.set_target(Some(view));
        node.apply_property(&mut host, "backgroundColor", "red", &palette);
        node.apply_property(&mut host, "backgroundColor", "blue", &palette);
        assert_eq!(node.cached_properties().get("backgroundColor").map(String::as_str), Some("clear"));

        node.remove(&mut host, &palette);
        assert!(!node.is_active());
        assert_eq!(node.target(), None);
        let widget = host.widget(view).unwrap();
        assert_eq!(widget.background_color(), Some(Color::CLEAR));
        assert_eq!(host.superview(view), None);
        // Restoring does not consume the baseline
        assert_eq!(node.cached_properties().len(), 1);
    }

    #[test]
    fn test_update_reactivates() {
        let mut node = ViewNode::new(RawNode::new("box"), None, false);
        let mut host = HeadlessHost::new();
        node.remove(&mut host, &Palette::default());
        assert!(!node.is_active());
        node.update(RawNode::new("box").with_z_index(3), Some("root".into()));
        assert!(node.is_active());
        assert_eq!(node.z_index(), 3);
    }
}

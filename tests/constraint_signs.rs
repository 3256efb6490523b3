//! How constant modifiers, multipliers and attribute lists land on installed relations

use std::rc::Rc;

use live_layout::constraint::attribute::Attribute;
use live_layout::host::{LayoutConstraint, Outlets};
use live_layout::report::CollectingSink;
use live_layout::{render, HeadlessHost, Layout, Reporter, ViewHost};
use pretty_assertions::assert_eq;

/// Build a root with a single `!box` node carrying `constraints`, returning its relations
fn relations(constraints: &str) -> (Vec<LayoutConstraint>, CollectingSink) {
    let source = format!(
        r#"{{"root": {{"id": "root", "views": {{
            "anchor": {{"id": "!anchor"}},
            "box": {{"id": "!box", "constraints": {}}}
        }}}}}}"#,
        constraints
    );
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let sink = CollectingSink::new();
    let mut layout = Layout::new(source).with_reporter(Reporter::silent().with_sink(sink.clone()));
    layout.build(&mut host, root, None).unwrap();
    let target = layout.index().target_of("box").unwrap();
    let installed = host.constraints_on(target).into_iter().cloned().collect();
    (installed, sink)
}

fn constant_for(installed: &[LayoutConstraint], attribute: Attribute) -> f64 {
    installed
        .iter()
        .find(|c| c.attribute == attribute)
        .map(|c| c.constant)
        .unwrap_or_else(|| panic!("no relation on {:?}", attribute))
}

#[test]
fn test_inset_flips_trailing_edges() {
    let (installed, _) = relations(r#"{"leading trailing top bottom": "<12"}"#);
    assert_eq!(constant_for(&installed, Attribute::Leading), 12.0);
    assert_eq!(constant_for(&installed, Attribute::Trailing), -12.0);
    assert_eq!(constant_for(&installed, Attribute::Top), 12.0);
    assert_eq!(constant_for(&installed, Attribute::Bottom), -12.0);
}

#[test]
fn test_offset_flips_leading_edges() {
    let (installed, _) = relations(r#"{"leading top right": ">5"}"#);
    assert_eq!(constant_for(&installed, Attribute::Leading), 5.0);
    assert_eq!(constant_for(&installed, Attribute::Top), -5.0);
    assert_eq!(constant_for(&installed, Attribute::Right), 5.0);
}

#[test]
fn test_negative_always_negates() {
    let (installed, _) = relations(r#"{"left bottom width": "-7"}"#);
    for c in &installed {
        assert_eq!(c.constant, -7.0, "{:?}", c.attribute);
    }
    assert_eq!(installed.len(), 3);
}

#[test]
fn test_divide_inverts_multiplier() {
    let (installed, _) = relations(r#"{"width": "@anchor.height:/4"}"#);
    assert_eq!(installed.len(), 1);
    assert_eq!(installed[0].multiplier, 0.25);
    assert_eq!(installed[0].to_attribute, Some(Attribute::Height));
}

#[test]
fn test_edges_make_four_relations_against_superview() {
    let (installed, sink) = relations(r#"{"edges": "<0"}"#);
    let attributes: Vec<Attribute> = installed.iter().map(|c| c.attribute).collect();
    assert_eq!(
        attributes,
        [Attribute::Top, Attribute::Left, Attribute::Bottom, Attribute::Right]
    );
    assert!(installed.iter().all(|c| c.to_item.is_some()));
    assert!(sink.reports().is_empty());
}

#[test]
fn test_comprehensive_form() {
    let (installed, _) = relations(
        r#"{"height": {"to": "anchor", "attribute": "width", "relation": "gte",
            "multiplier": 0.5, "constant": 3, "priority": 250, "identifier": "ratio"}}"#,
    );
    let c = &installed[0];
    assert_eq!(c.to_attribute, Some(Attribute::Width));
    assert_eq!(c.multiplier, 0.5);
    assert_eq!(c.constant, 3.0);
    assert_eq!(c.priority, 250.0);
    assert_eq!(c.identifier.as_deref(), Some("ratio"));
}

#[test]
fn test_invalid_argument_is_dropped_with_warning() {
    let (installed, sink) = relations(r#"{"width": "+abc", "height": "+10"}"#);
    assert_eq!(installed.len(), 2);
    assert_eq!(constant_for(&installed, Attribute::Width), 0.0);
    assert_eq!(constant_for(&installed, Attribute::Height), 10.0);
    assert!(sink.warnings()[0].message.contains("'+abc'"));
}

#[test]
fn test_relation_across_trees_reports_and_installs_nothing() {
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let stranger = host.create_view(None);
    let outlets = Rc::new(Outlets::new().with("stranger", stranger));
    let sink = CollectingSink::new();
    let mut layout = Layout::new(
        r#"{"root": {"id": "root", "views": {
            "box": {"id": "!box", "constraints": {"top": "@stranger.bottom:!glue"}}
        }}}"#,
    )
    .with_reporter(Reporter::silent().with_sink(sink.clone()));
    layout.build(&mut host, root, Some(outlets)).unwrap();

    assert_eq!(sink.errors().len(), 1);
    assert!(sink.errors()[0].message.ends_with("Constraint: glue"));
    assert_eq!(host.all_constraints().count(), 0);
    assert!(layout.node("box").unwrap().applied_constraints().is_empty());
}

#[test]
fn test_render_tree() {
    let tree = render(
        r#"{"root": {"id": "root", "views": {
            "header": {"id": "!header:UILabel",
                "constraints": {"top leading trailing": "<16", "height": "+44"}},
            "body": {"id": "!body",
                "constraints": {"top": "@header.bottom:+8", "left right bottom": "<0"},
                "views": {
                    "badge": {"id": "!badge", "constraints": {"width height": "+:24", "right bottom": "<8"}}
                }}
        }}}"#,
    )
    .unwrap();
    insta::assert_snapshot!(tree.trim_end(), @r"
    root [UIView] 0 0 320 480
      header [UILabel] 16 16 288 44
      body [UIView] 0 68 320 412
        badge [UIView] 288 380 24 24
    ");
}

//! Integration tests for building, rebuilding and clearing layouts on the headless toolkit

use std::rc::Rc;

use live_layout::constraint::attribute::Attribute;
use live_layout::host::{Controller, Outlets, TextMappable, ViewMappable};
use live_layout::report::CollectingSink;
use live_layout::stylesheet::Color;
use live_layout::{
    HeadlessHost, HeadlessWidget, Layout, LayoutState, Reporter, SizeClass, TraitCollection,
    ViewHost, WidgetId, WidgetKind,
};
use pretty_assertions::assert_eq;

const SQUARE: &str = r#"{
    "root": {
        "id": "root",
        "views": {
            "square": {
                "id": "!square",
                "constraints": { "width height": "+:100" },
                "properties": { "backgroundColor": "red" }
            }
        }
    }
}"#;

fn layout(source: &str) -> (Layout, CollectingSink) {
    let sink = CollectingSink::new();
    let layout = Layout::new(source).with_reporter(Reporter::silent().with_sink(sink.clone()));
    (layout, sink)
}

fn relations_per_node(layout: &Layout) -> Vec<(String, usize)> {
    layout
        .index()
        .iter()
        .map(|node| (node.id().to_string(), node.applied_constraints().len()))
        .collect()
}

#[test]
fn test_square_scenario() {
    let mut host = HeadlessHost::new();
    let container = host.create_view(None);
    let (mut layout, sink) = layout(SQUARE);
    layout.build(&mut host, container, None).unwrap();

    assert_eq!(layout.index().len(), 2);
    let square = layout.index().target_of("square").expect("square has a widget");
    assert_ne!(square, container);
    assert_eq!(host.superview(square), Some(container));

    let relations = host.constraints_on(square);
    assert_eq!(relations.len(), 2);
    let attributes: Vec<Attribute> = relations.iter().map(|c| c.attribute).collect();
    assert_eq!(attributes, [Attribute::Width, Attribute::Height]);
    for relation in relations {
        assert_eq!(relation.constant, 100.0);
        assert_eq!(relation.to_item, None);
        assert_eq!(relation.to_attribute, None);
    }

    let widget = host.widget(square).unwrap();
    assert_eq!(widget.background_color(), Some(Color::rgb(255, 0, 0)));
    assert!(sink.reports().is_empty());

    let solution = host.layout(container, 320.0, 480.0);
    assert_eq!(solution.frames[&square].width, 100.0);
    assert_eq!(solution.frames[&square].height, 100.0);
}

#[test]
fn test_rebuild_does_not_accumulate_relations() {
    let source = r#"{
        "root": {
            "id": "root",
            "views": {
                "a": { "id": "!a", "constraints": { "top left right": "+8", "height": "+44" } },
                "b": { "id": "!b", "constraints": { "top": "@a.bottom:+8", "edges": "<0" } }
            }
        }
    }"#;
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let (mut layout, _) = layout(source);

    layout.build(&mut host, root, None).unwrap();
    let first = relations_per_node(&layout);
    let first_total = host.all_constraints().count();
    let a = layout.index().target_of("a");

    layout.build(&mut host, root, None).unwrap();
    assert_eq!(relations_per_node(&layout), first);
    assert_eq!(host.all_constraints().count(), first_total);
    // New elements keep their widget across rebuilds
    assert_eq!(layout.index().target_of("a"), a);

    layout.reload(&mut host).unwrap();
    assert_eq!(relations_per_node(&layout), first);
    assert_eq!(host.all_constraints().count(), first_total);
}

#[test]
fn test_cache_restores_value_before_first_application() {
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let mut header = HeadlessWidget::new(WidgetKind::Label);
    header.set_background_color(Some(Color::rgb(0, 0, 255)));
    header.set_text(Some("Original".into()));
    let header = host.insert_widget(header);
    host.add_subview(root, header);
    let outlets: Rc<Outlets> = Rc::new(Outlets::new().with("header", header));

    let (mut layout, sink) = layout(
        r#"{"root": {"id": "root", "views": {"header": {"id": "header",
            "properties": {"backgroundColor": "red", "text": "First"}}}}}"#,
    );
    layout.build(&mut host, root, Some(outlets.clone())).unwrap();
    assert_eq!(host.widget(header).unwrap().text().as_deref(), Some("First"));

    layout.set_source(
        r#"{"root": {"id": "root", "views": {"header": {"id": "header",
            "properties": {"backgroundColor": "green", "text": "Second"}}}}}"#,
    );
    layout.build(&mut host, root, Some(outlets)).unwrap();
    let widget = host.widget(header).unwrap();
    assert_eq!(widget.background_color(), Some(Color::rgb(0, 255, 0)));
    assert_eq!(widget.text().as_deref(), Some("Second"));

    layout.clear(&mut host);
    let widget = host.widget(header).unwrap();
    assert_eq!(widget.background_color(), Some(Color::rgb(0, 0, 255)));
    assert_eq!(widget.text().as_deref(), Some("Original"));
    assert!(sink.reports().is_empty());
}

#[test]
fn test_children_follow_z_index() {
    let source = r#"{
        "root": {
            "id": "root",
            "views": {
                "top": { "id": "!top", "z-index": 3 },
                "bottom": { "id": "!bottom", "z-index": 1 },
                "middle": { "id": "!middle", "z-index": 2 },
                "also-bottom": { "id": "!also-bottom", "z-index": 1 }
            }
        }
    }"#;
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let (mut layout, _) = layout(source);
    layout.build(&mut host, root, None).unwrap();

    assert_eq!(layout.index().len(), 5);
    let order: Vec<WidgetId> = ["bottom", "also-bottom", "middle", "top"]
        .iter()
        .filter_map(|id| layout.index().target_of(id))
        .collect();
    assert_eq!(host.subviews(root), order);
}

#[test]
fn test_vanished_nodes_are_removed() {
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let (mut layout, _) = layout(
        r#"{"root": {"id": "root", "views": {
            "keep": {"id": "!keep", "constraints": {"height": "+10"}},
            "drop": {"id": "!drop", "constraints": {"top": "@keep.bottom"}}
        }}}"#,
    );
    layout.build(&mut host, root, None).unwrap();
    let dropped = layout.index().target_of("drop").unwrap();

    layout.set_source(
        r#"{"root": {"id": "root", "views": {"keep": {"id": "!keep", "constraints": {"height": "+10"}}}}}"#,
    );
    layout.build(&mut host, root, None).unwrap();
    assert_eq!(host.superview(dropped), None);
    assert!(!layout.node("drop").unwrap().is_active());
    assert_eq!(host.subviews(root).len(), 1);
    assert_eq!(host.all_constraints().count(), 1);
}

#[test]
fn test_missing_environment_view_warns_and_continues() {
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let (mut layout, sink) = layout(
        r#"{"root": {"id": "root", "views": {
            "ghost": {"id": "ghost", "views": {"inner": {"id": "!inner"}}},
            "real": {"id": "!real", "constraints": {"width": "+20"}}
        }}}"#,
    );
    layout
        .build(&mut host, root, Some(Rc::new(Outlets::new())))
        .unwrap();
    assert_eq!(sink.warnings().len(), 1);
    assert!(sink.warnings()[0].message.contains("'ghost'"));
    assert_eq!(layout.index().target_of("ghost"), None);
    // The subtree of the missing view is not attached; siblings are
    let inner = layout.index().target_of("inner").unwrap();
    assert_eq!(host.superview(inner), None);
    let real = layout.index().target_of("real").unwrap();
    assert_eq!(host.superview(real), Some(root));
}

#[test]
fn test_controller_chrome() {
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let bar = host.create_view(Some("UINavigationBar"));
    let controller = Rc::new(Controller::new(Outlets::new(), Some(bar)));
    let (mut layout, _) = layout(
        r#"{"controllerTitle": "Settings",
            "navigationBar": {"backgroundColor": "blue", "translucent": "false"},
            "root": {"id": "root"}}"#,
    );
    layout.build(&mut host, root, Some(controller.clone())).unwrap();
    assert_eq!(controller.title().as_deref(), Some("Settings"));
    let bar = host.widget(bar).unwrap();
    assert_eq!(bar.bar_tint_color(), Some(Color::rgb(0, 0, 255)));
}

#[test]
fn test_templates_do_not_accumulate() {
    let source = r#"{
        "templates": { "tall": { "constraints": { "height": "+60" }, "properties": { "alpha": "0.5" } } },
        "root": { "id": "root", "views": { "box": { "id": "!box", "templates": "tall",
            "constraints": { "width": "+30" } } } }
    }"#;
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let (mut layout, _) = layout(source);
    layout.build(&mut host, root, None).unwrap();
    layout.build(&mut host, root, None).unwrap();

    let node = layout.node("box").unwrap();
    assert_eq!(node.applied_templates().len(), 1);
    assert_eq!(node.applied_constraints().len(), 2);
    assert_eq!(node.constraints_for_attribute(Attribute::Height).len(), 1);
    let view = node.target().unwrap();
    assert_eq!(host.widget(view).unwrap().alpha(), 0.5);
}

#[test]
fn test_teardown_forgets_everything() {
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let (mut layout, _) = layout(SQUARE);
    layout.build(&mut host, root, None).unwrap();
    layout.teardown(&mut host);
    assert_eq!(layout.state(), LayoutState::Unbuilt);
    assert!(layout.index().is_empty());
    assert!(host.subviews(root).is_empty());
    assert_eq!(host.all_constraints().count(), 0);
}

#[test]
fn test_clips_to_bounds_spelling_is_restored() {
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let photo = host.create_view(Some("UIImageView"));
    host.add_subview(root, photo);
    let (mut layout, _) = layout(
        r#"{"root": {"id": "root", "views": {"photo": {"id": "photo",
            "properties": {"clipsToBounds": "true"}}}}}"#,
    );
    layout
        .build(&mut host, root, Some(Rc::new(Outlets::new().with("photo", photo))))
        .unwrap();
    assert!(host.widget(photo).unwrap().clips_to_bounds());
    assert_eq!(
        layout.node("photo").unwrap().cached_properties().get("clipsToBounds").map(String::as_str),
        Some("false")
    );

    layout.clear(&mut host);
    assert!(!host.widget(photo).unwrap().clips_to_bounds());
}

#[test]
fn test_renamed_root_keeps_relations_on_the_target() {
    let mut host = HeadlessHost::new();
    let container = host.create_view(None);
    let (mut layout, _) = layout(
        r#"{"root": {"id": "root", "views": {"a": {"id": "!a", "constraints": {"top": "+8"}}}}}"#,
    );
    layout.build(&mut host, container, None).unwrap();
    assert_eq!(host.constraints(container).len(), 1);

    layout.set_source(
        r#"{"root": {"id": "main", "views": {"a": {"id": "!a", "constraints": {"top": "+8"}}}}}"#,
    );
    layout.build(&mut host, container, None).unwrap();
    assert_eq!(layout.index().root().map(|node| node.id()), Some("main"));
    assert_eq!(layout.index().root_target(), Some(container));
    assert!(!layout.node("root").unwrap().is_active());

    let a = layout.index().target_of("a").unwrap();
    assert_eq!(host.superview(a), Some(container));
    assert_eq!(host.constraints(container).len(), 1);
    assert_eq!(host.constraints(a).len(), 0);
}

#[test]
fn test_size_class_change_toggles_gated_relations() {
    let regular = TraitCollection::new(Some(SizeClass::Regular), None);
    let compact = TraitCollection::new(Some(SizeClass::Compact), None);
    let mut host = HeadlessHost::new().with_trait_collection(regular);
    let root = host.create_view(None);
    // The second width key carries a trailing space so the JSON keys differ
    let (mut layout, sink) = layout(
        r#"{"root": {"id": "root", "views": {"panel": {"id": "!panel", "constraints": {
            "top left": "+0",
            "height": "+40",
            "width": {"constant": 100, "horizontalSizeClass": "compact", "identifier": "narrow"},
            "width ": {"constant": 200, "horizontalSizeClass": "regular", "identifier": "wide"}
        }}}}}"#,
    );
    layout.build(&mut host, root, None).unwrap();
    assert!(sink.reports().is_empty(), "{:?}", sink.reports());

    let active = |host: &HeadlessHost, layout: &Layout, identifier: &str| {
        let node = layout.node("panel").unwrap();
        let applied = node.constraint_with_identifier(identifier).unwrap();
        host.constraint(applied.id).unwrap().active
    };
    assert!(!active(&host, &layout, "narrow"));
    assert!(active(&host, &layout, "wide"));
    let panel = layout.index().target_of("panel").unwrap();
    assert_eq!(host.layout(root, 320.0, 480.0).frames[&panel].width, 200.0);

    host.set_trait_collection(compact);
    layout.update_constraints(&mut host, &compact);
    assert!(active(&host, &layout, "narrow"));
    assert!(!active(&host, &layout, "wide"));
    assert_eq!(host.layout(root, 320.0, 480.0).frames[&panel].width, 100.0);
    // No rebuild happened
    assert_eq!(layout.index().target_of("panel"), Some(panel));
    assert_eq!(layout.node("panel").unwrap().applied_constraints().len(), 5);
}

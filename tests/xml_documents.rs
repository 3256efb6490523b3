//! Integration tests for layouts written in the XML dialect

use std::rc::Rc;

use live_layout::constraint::attribute::{Attribute, Relation};
use live_layout::host::{Controller, Outlets, ViewMappable};
use live_layout::report::CollectingSink;
use live_layout::stylesheet::Color;
use live_layout::{DocumentFormat, HeadlessHost, Layout, Reporter, ViewHost, WidgetKind};
use pretty_assertions::assert_eq;

const PROFILE: &str = r##"
<layout name="profile" controllerTitle="Profile">
  <navigationBar backgroundColor="orange"/>
  <templates>
    <rounded cornerRadius="12" clipsToBounds="true"/>
  </templates>
  <root backgroundColor="white">
    <views>
      <avatar new="true" targetClass="UIImageView" templates="rounded" z-index="1">
        <constraint leftAttribute="width height" constant="80" name="avatar-size"/>
        <constraint leftAttribute="top" to="super" constant="20"/>
        <constraint leftAttribute="centerX"/>
      </avatar>
      <name new="true" targetClass="UILabel" text="Ada" textColor="#333333" z-index="0">
        <constraint leftAttribute="top" to="avatar" rightAttribute="bottom" constant="8"/>
        <constraint leftAttribute="leading trailing" inset="16"/>
        <constraint leftAttribute="width" relation="&gt;=" to="avatar" divide="0.5" priority="750"/>
      </name>
    </views>
  </root>
</layout>
"##;

fn build() -> (HeadlessHost, Layout, CollectingSink, Rc<Controller>) {
    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    let bar = host.create_view(Some("UINavigationBar"));
    let controller = Rc::new(Controller::new(Outlets::new(), Some(bar)));
    let sink = CollectingSink::new();
    let mut layout = Layout::new(PROFILE).with_reporter(Reporter::silent().with_sink(sink.clone()));
    layout.build(&mut host, root, Some(controller.clone())).unwrap();
    (host, layout, sink, controller)
}

#[test]
fn test_xml_is_sniffed() {
    assert_eq!(Layout::new(PROFILE).format(), DocumentFormat::Xml);
}

#[test]
fn test_xml_builds_tree_in_z_order() {
    let (host, layout, sink, controller) = build();
    assert!(sink.reports().is_empty(), "{:?}", sink.reports());
    assert_eq!(layout.name(), Some("profile"));
    assert_eq!(layout.index().len(), 3);

    let root = layout.target().unwrap();
    let avatar = layout.index().target_of("avatar").unwrap();
    let name = layout.index().target_of("name").unwrap();
    assert_eq!(host.subviews(root), vec![name, avatar]);
    assert_eq!(host.widget(avatar).unwrap().kind(), WidgetKind::ImageView);
    assert_eq!(controller.title().as_deref(), Some("Profile"));
}

#[test]
fn test_xml_properties_and_templates() {
    let (host, layout, _, _) = build();
    let root = layout.target().unwrap();
    assert_eq!(
        host.widget(root).unwrap().background_color(),
        Some(Color::rgb(255, 255, 255))
    );
    let avatar = host.widget(layout.index().target_of("avatar").unwrap()).unwrap();
    assert_eq!(avatar.corner_radius(), 12.0);
    assert!(avatar.clips_to_bounds());
}

#[test]
fn test_xml_markup_constraints() {
    let (host, layout, _, _) = build();
    let root = layout.target().unwrap();
    let avatar = layout.index().target_of("avatar").unwrap();
    let name_node = layout.node("name").unwrap();

    let named = layout.index().applied_constraints_with_identifier("avatar-size");
    assert_eq!(named.len(), 2);

    let top = name_node.constraints_for_attribute(Attribute::Top)[0];
    let top = host.constraint(top.id).unwrap();
    assert_eq!(top.to_item, Some(avatar));
    assert_eq!(top.to_attribute, Some(Attribute::Bottom));
    assert_eq!(top.constant, 8.0);

    let sides = name_node.constraints_for_attributes(&[Attribute::Leading, Attribute::Trailing]);
    let constants: Vec<f64> = sides
        .iter()
        .map(|c| host.constraint(c.id).unwrap().constant)
        .collect();
    assert_eq!(constants, [16.0, -16.0]);
    assert!(sides
        .iter()
        .all(|c| host.constraint(c.id).unwrap().to_item == Some(root)));

    let width = name_node.constraints_for_attribute(Attribute::Width)[0];
    let width = host.constraint(width.id).unwrap();
    assert_eq!(width.relation, Relation::GreaterOrEqual);
    assert_eq!(width.multiplier, 2.0);
    assert_eq!(width.priority, 750.0);
}

#[test]
fn test_xml_frames() {
    let (mut host, layout, _, _) = build();
    let root = layout.target().unwrap();
    let solution = host.layout(root, 320.0, 480.0);
    assert!(solution.conflicts.is_empty(), "{:?}", solution.conflicts);

    let avatar = solution.frames[&layout.index().target_of("avatar").unwrap()];
    assert_eq!((avatar.x, avatar.y, avatar.width, avatar.height), (120.0, 20.0, 80.0, 80.0));
    let name = solution.frames[&layout.index().target_of("name").unwrap()];
    assert_eq!((name.x, name.y, name.width), (16.0, 108.0, 288.0));
}

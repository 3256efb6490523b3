//! XML document dialect
//!
//! ```xml
//! <layout name="home" controllerTitle="Home">
//!   <navigationBar backgroundColor="blue"/>
//!   <templates>
//!     <card cornerRadius="8"/>
//!   </templates>
//!   <root backgroundColor="white">
//!     <views>
//!       <square new="true" targetClass="UILabel" z-index="1" backgroundColor="red">
//!         <constraint leftAttribute="width height" constant="100"/>
//!       </square>
//!     </views>
//!   </root>
//! </layout>
//! ```

use std::rc::Rc;

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{
    DocumentFormat, DocumentParser, LayoutDocument, LayoutTemplate, RawConstraint, RawNode,
    RawProperty,
};
use crate::error::DocumentError;
use crate::node::{CLASS_SEPARATOR, NEW_ELEMENT_MARKER};
use crate::report::Reporter;

const ELEM_ROOT: &str = "root";
const ELEM_VIEWS: &str = "views";
const ELEM_CONSTRAINT: &str = "constraint";
const ELEM_TEMPLATES: &str = "templates";
const ELEM_NAVBAR: &str = "navigationBar";

const ATTR_NAME: &str = "name";
const ATTR_TITLE: &str = "controllerTitle";
const ATTR_TARGET_CLASS: &str = "targetClass";
const ATTR_NEW: &str = "new";
const ATTR_Z_INDEX: &str = "z-index";
const ATTR_TEMPLATES: &str = "templates";

/// Attributes on a view element that are structure, not style
const RESERVED_VIEW_ATTRIBUTES: &[&str] = &[ATTR_TARGET_CLASS, ATTR_NEW, ATTR_Z_INDEX, ATTR_TEMPLATES];

#[derive(Debug, Default, Clone, Copy)]
pub struct XmlDocumentParser;

/// Generic element tree read from the event stream
#[derive(Debug, Clone, PartialEq, Default)]
struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

impl DocumentParser for XmlDocumentParser {
    fn parse(&self, source: &str, reporter: &Reporter) -> Result<LayoutDocument, DocumentError> {
        let top = read_tree(source)?;

        let root = top.child(ELEM_ROOT).map(|root| parse_node(root, true));

        let templates = top
            .child(ELEM_TEMPLATES)
            .map(|templates| {
                templates
                    .children
                    .iter()
                    .map(|t| (t.name.clone(), Rc::new(parse_template(t))))
                    .collect::<IndexMap<_, _>>()
            })
            .unwrap_or_default();

        let navigation_bar = top
            .child(ELEM_NAVBAR)
            .map(|bar| properties_of(bar, &[]))
            .unwrap_or_default();

        if root.is_none() {
            reporter.warning("Layout document has no <root> element.");
        }

        Ok(LayoutDocument {
            name: top.attributes.get(ATTR_NAME).cloned(),
            root,
            templates,
            navigation_bar,
            controller_title: top.attributes.get(ATTR_TITLE).cloned(),
        })
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xml
    }
}

fn parse_node(element: &Element, is_root: bool) -> RawNode {
    let is_new = !is_root
        && element
            .attributes
            .get(ATTR_NEW)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    // Identity is always carried in the id string so every dialect decodes it the same way.
    let mut raw_id = String::new();
    if is_new {
        raw_id.push(NEW_ELEMENT_MARKER);
    }
    raw_id.push_str(&element.name);
    if let (true, Some(class)) = (is_new, element.attributes.get(ATTR_TARGET_CLASS)) {
        raw_id.push(CLASS_SEPARATOR);
        raw_id.push_str(class);
    }

    RawNode {
        raw_id,
        constraints: constraints_of(element),
        properties: properties_of(element, RESERVED_VIEW_ATTRIBUTES),
        z_index: element
            .attributes
            .get(ATTR_Z_INDEX)
            .and_then(|z| z.trim().parse().ok())
            .unwrap_or(0),
        templates: element
            .attributes
            .get(ATTR_TEMPLATES)
            .map(|t| t.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        subviews: element
            .child(ELEM_VIEWS)
            .map(|views| views.children.iter().map(|c| parse_node(c, false)).collect())
            .unwrap_or_default(),
    }
}

fn parse_template(element: &Element) -> LayoutTemplate {
    LayoutTemplate {
        name: element.name.clone(),
        constraints: constraints_of(element),
        properties: properties_of(element, RESERVED_VIEW_ATTRIBUTES),
    }
}

fn constraints_of(element: &Element) -> Vec<RawConstraint> {
    element
        .children_named(ELEM_CONSTRAINT)
        .map(|c| RawConstraint::Markup(c.attributes.clone()))
        .collect()
}

fn properties_of(element: &Element, reserved: &[&str]) -> Vec<RawProperty> {
    element
        .attributes
        .iter()
        .filter(|(name, _)| !reserved.contains(&name.as_str()))
        .map(|(name, value)| RawProperty::new(name.clone(), value.clone()))
        .collect()
}

fn xml_error(reader: &Reader<&[u8]>, source: &str, message: impl Into<String>) -> DocumentError {
    let pos = reader.buffer_position().min(source.len());
    DocumentError::Xml {
        span: pos..(pos + 1).min(source.len()),
        message: message.into(),
    }
}

fn read_element(reader: &Reader<&[u8]>, source: &str, e: &BytesStart) -> Result<Element, DocumentError> {
    let mut attributes = IndexMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(reader, source, format!("attribute error: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
        };
        attributes.insert(key, value);
    }
    Ok(Element {
        name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
        attributes,
        children: Vec::new(),
    })
}

/// Read the whole document into an element tree and return its top element
fn read_tree(source: &str) -> Result<Element, DocumentError> {
    let mut reader = Reader::from_str(source);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut top: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let element = read_element(&reader, source, e)?;
                stack.push(element);
            }
            Ok(Event::Empty(ref e)) => {
                let element = read_element(&reader, source, e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if top.is_none() => top = Some(element),
                    None => return Err(xml_error(&reader, source, "more than one top-level element")),
                }
            }
            Ok(Event::End(_)) => {
                let Some(element) = stack.pop() else {
                    return Err(xml_error(&reader, source, "unbalanced closing tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if top.is_none() => top = Some(element),
                    None => return Err(xml_error(&reader, source, "more than one top-level element")),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, source, e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(xml_error(&reader, source, "unexpected end of document"));
    }
    top.ok_or_else(|| DocumentError::shape("layout document has no top-level element"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
        <layout name="home" controllerTitle="Home">
          <navigationBar backgroundColor="blue"/>
          <templates>
            <card cornerRadius="8">
              <constraint leftAttribute="height" constant="40"/>
            </card>
          </templates>
          <root backgroundColor="white">
            <views>
              <square new="true" targetClass="UILabel" z-index="1" templates="card" backgroundColor="red">
                <constraint leftAttribute="width height" constant="100" name="size"/>
              </square>
              <title text="Hi"/>
            </views>
          </root>
        </layout>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = XmlDocumentParser.parse(DOC, &Reporter::silent()).unwrap();
        assert_eq!(doc.name.as_deref(), Some("home"));
        assert_eq!(doc.controller_title.as_deref(), Some("Home"));
        assert_eq!(
            doc.navigation_bar,
            vec![RawProperty::new("backgroundColor", "blue")]
        );
        assert_eq!(doc.template("card").unwrap().constraints.len(), 1);

        let root = doc.root.unwrap();
        assert_eq!(root.raw_id, "root");
        assert_eq!(root.properties, vec![RawProperty::new("backgroundColor", "white")]);

        let square = &root.subviews[0];
        assert_eq!(square.raw_id, "!square:UILabel");
        assert_eq!(square.z_index, 1);
        assert_eq!(square.templates, vec!["card"]);
        assert_eq!(square.properties, vec![RawProperty::new("backgroundColor", "red")]);
        let RawConstraint::Markup(attrs) = &square.constraints[0] else {
            panic!("expected markup constraint");
        };
        assert_eq!(attrs.get("leftAttribute").map(String::as_str), Some("width height"));
        assert_eq!(attrs.get("name").map(String::as_str), Some("size"));

        assert_eq!(root.subviews[1].raw_id, "title");
    }

    #[test]
    fn test_escaped_relation_is_unescaped() {
        let doc = XmlDocumentParser
            .parse(
                r#"<layout><root><constraint leftAttribute="width" relation="&lt;=" constant="10"/></root></layout>"#,
                &Reporter::silent(),
            )
            .unwrap();
        let RawConstraint::Markup(attrs) = &doc.root.unwrap().constraints[0] else {
            panic!("expected markup constraint");
        };
        assert_eq!(attrs.get("relation").map(String::as_str), Some("<="));
    }

    #[test]
    fn test_target_class_needs_new() {
        let doc = XmlDocumentParser
            .parse(
                r#"<layout><root><views><label targetClass="UILabel"/></views></root></layout>"#,
                &Reporter::silent(),
            )
            .unwrap();
        assert_eq!(doc.root.unwrap().subviews[0].raw_id, "label");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = XmlDocumentParser
            .parse("<layout><root></layout>", &Reporter::silent())
            .unwrap_err();
        assert!(matches!(err, DocumentError::Xml { .. }));
    }
}

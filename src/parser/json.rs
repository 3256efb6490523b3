//! JSON document dialect

use std::rc::Rc;

use indexmap::IndexMap;

use super::raw::RawValue;
use super::{
    DocumentFormat, DocumentParser, LayoutDocument, LayoutTemplate, RawConstraint, RawNode,
    RawProperty,
};
use crate::error::DocumentError;
use crate::report::Reporter;

pub const KEY_LAYOUT_NAME: &str = "name";
pub const KEY_LAYOUT_ROOT: &str = "root";
pub const KEY_TEMPLATES: &str = "templates";
pub const KEY_NAVBAR_PROPERTIES: &str = "navigationBar";
pub const KEY_TITLE: &str = "controllerTitle";

pub const KEY_ID: &str = "id";
pub const KEY_CONSTRAINTS: &str = "constraints";
pub const KEY_PROPERTIES: &str = "properties";
pub const KEY_SUBVIEWS: &str = "views";
pub const KEY_Z_INDEX: &str = "z-index";

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDocumentParser;

impl DocumentParser for JsonDocumentParser {
    fn parse(&self, source: &str, reporter: &Reporter) -> Result<LayoutDocument, DocumentError> {
        let value: serde_json::Value =
            serde_json::from_str(source).map_err(|e| DocumentError::from_json(&e, source))?;
        let raw = RawValue::from(value);
        let Some(top) = raw.as_map() else {
            return Err(DocumentError::shape("layout document must be a JSON object"));
        };

        let name = top.get(KEY_LAYOUT_NAME).and_then(RawValue::to_text);

        let root = match top.get(KEY_LAYOUT_ROOT) {
            Some(value) => parse_node(KEY_LAYOUT_ROOT, value, reporter),
            None => None,
        };

        let templates = top
            .get(KEY_TEMPLATES)
            .map(|value| parse_templates(value, reporter))
            .unwrap_or_default();

        let navigation_bar = top
            .get(KEY_NAVBAR_PROPERTIES)
            .map(|value| parse_properties("navigationBar", value, reporter))
            .unwrap_or_default();

        Ok(LayoutDocument {
            name,
            root,
            templates,
            navigation_bar,
            controller_title: top.get(KEY_TITLE).and_then(RawValue::to_text),
        })
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }
}

/// Parse one view node; `key` is its key in the parent's `views` map
pub fn parse_node(key: &str, value: &RawValue, reporter: &Reporter) -> Option<RawNode> {
    let Some(map) = value.as_map() else {
        reporter.error(format!("View '{}' is not an object.", key));
        return None;
    };

    let raw_id = map
        .get(KEY_ID)
        .and_then(RawValue::as_str)
        .unwrap_or(key)
        .to_string();

    let constraints = map
        .get(KEY_CONSTRAINTS)
        .map(|value| parse_constraints(&raw_id, value, reporter))
        .unwrap_or_default();

    let properties = map
        .get(KEY_PROPERTIES)
        .map(|value| parse_properties(&raw_id, value, reporter))
        .unwrap_or_default();

    let z_index = map
        .get(KEY_Z_INDEX)
        .and_then(RawValue::as_f64)
        .map(|z| z as i32)
        .unwrap_or(0);

    let templates = map
        .get(KEY_TEMPLATES)
        .map(|value| parse_template_names(&raw_id, value, reporter))
        .unwrap_or_default();

    let subviews = match map.get(KEY_SUBVIEWS) {
        Some(RawValue::Map(views)) => views
            .iter()
            .filter_map(|(child_key, child)| parse_node(child_key, child, reporter))
            .collect(),
        Some(RawValue::Null) | None => Vec::new(),
        Some(_) => {
            reporter.error(format!("Subviews of '{}' are not an object.", raw_id));
            Vec::new()
        }
    };

    Some(RawNode {
        raw_id,
        constraints,
        properties,
        z_index,
        templates,
        subviews,
    })
}

fn parse_constraints(owner: &str, value: &RawValue, reporter: &Reporter) -> Vec<RawConstraint> {
    match value {
        RawValue::Map(map) => map
            .iter()
            .map(|(lhs, rhs)| RawConstraint::Pair {
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            })
            .collect(),
        _ => {
            reporter.error(format!("Constraints of '{}' are not an object.", owner));
            Vec::new()
        }
    }
}

fn parse_properties(owner: &str, value: &RawValue, reporter: &Reporter) -> Vec<RawProperty> {
    let Some(map) = value.as_map() else {
        reporter.error(format!("Properties of '{}' are not an object.", owner));
        return Vec::new();
    };

    map.iter()
        .filter_map(|(name, value)| match value.to_text() {
            Some(text) => Some(RawProperty::new(name.clone(), text)),
            None => {
                reporter.error(format!(
                    "Property '{}' of '{}' is not a scalar value.",
                    name, owner
                ));
                None
            }
        })
        .collect()
}

fn parse_template_names(owner: &str, value: &RawValue, reporter: &Reporter) -> Vec<String> {
    match value {
        RawValue::String(names) => names.split_whitespace().map(str::to_string).collect(),
        RawValue::List(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => {
            reporter.error(format!("Templates of '{}' are not a list.", owner));
            Vec::new()
        }
    }
}

fn parse_templates(
    value: &RawValue,
    reporter: &Reporter,
) -> IndexMap<String, Rc<LayoutTemplate>> {
    let Some(map) = value.as_map() else {
        reporter.error("Layout templates are not an object.");
        return IndexMap::new();
    };

    map.iter()
        .filter_map(|(name, body)| {
            if body.as_map().is_none() {
                reporter.error(format!("Template '{}' is not an object.", name));
                return None;
            }
            let template = LayoutTemplate {
                name: name.clone(),
                constraints: body
                    .get(KEY_CONSTRAINTS)
                    .map(|v| parse_constraints(name, v, reporter))
                    .unwrap_or_default(),
                properties: body
                    .get(KEY_PROPERTIES)
                    .map(|v| parse_properties(name, v, reporter))
                    .unwrap_or_default(),
            };
            Some((name.clone(), Rc::new(template)))
        })
        .collect()
}

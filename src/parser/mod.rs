//! Layout document model and the dialect parsers that produce it

pub mod json;
pub mod raw;
pub mod xml;

use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::DocumentError;
use crate::node::NodeIdentity;
use crate::report::Reporter;

pub use json::JsonDocumentParser;
pub use raw::RawValue;
pub use xml::XmlDocumentParser;

/// One flat style entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    pub name: String,
    pub value: String,
}

impl RawProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An undecoded constraint entry as it appeared in the document
#[derive(Debug, Clone, PartialEq)]
pub enum RawConstraint {
    /// `"lhs": rhs` where rhs is shorthand text or a map of named fields
    Pair { lhs: String, rhs: RawValue },
    /// A markup element whose attributes carry the fields
    Markup(IndexMap<String, String>),
}

impl RawConstraint {
    pub fn pair(lhs: impl Into<String>, rhs: impl Into<RawValue>) -> Self {
        RawConstraint::Pair {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }
}

/// A named bundle of constraints and properties that nodes can opt into
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutTemplate {
    pub name: String,
    pub constraints: Vec<RawConstraint>,
    pub properties: Vec<RawProperty>,
}

/// One view entry before it is materialized
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawNode {
    /// Id as written, including the new-element marker and class suffix
    pub raw_id: String,
    pub constraints: Vec<RawConstraint>,
    pub properties: Vec<RawProperty>,
    pub z_index: i32,
    pub templates: Vec<String>,
    pub subviews: Vec<RawNode>,
}

impl RawNode {
    pub fn new(raw_id: impl Into<String>) -> Self {
        Self {
            raw_id: raw_id.into(),
            ..Default::default()
        }
    }

    pub fn identity(&self) -> NodeIdentity<'_> {
        NodeIdentity::parse(&self.raw_id)
    }

    pub fn with_constraint(mut self, constraint: RawConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.push(RawProperty::new(name, value));
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_subview(mut self, subview: RawNode) -> Self {
        self.subviews.push(subview);
        self
    }
}

/// A fully parsed layout document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutDocument {
    pub name: Option<String>,
    pub root: Option<RawNode>,
    pub templates: IndexMap<String, Rc<LayoutTemplate>>,
    pub navigation_bar: Vec<RawProperty>,
    pub controller_title: Option<String>,
}

impl LayoutDocument {
    pub fn template(&self, name: &str) -> Option<Rc<LayoutTemplate>> {
        self.templates.get(name).cloned()
    }
}

/// Serialization a document is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Xml,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "xml" => Some(DocumentFormat::Xml),
            _ => None,
        }
    }

    /// Guess from the first significant character
    pub fn sniff(source: &str) -> Self {
        if source.trim_start().starts_with('<') {
            DocumentFormat::Xml
        } else {
            DocumentFormat::Json
        }
    }

    pub fn parser(self) -> Box<dyn DocumentParser> {
        match self {
            DocumentFormat::Json => Box::new(JsonDocumentParser),
            DocumentFormat::Xml => Box::new(XmlDocumentParser),
        }
    }
}

/// Turns document text into a [`LayoutDocument`].
///
/// Field-level shape problems are reported and skipped; only text that cannot be read at
/// all is returned as an error.
pub trait DocumentParser {
    fn parse(&self, source: &str, reporter: &Reporter) -> Result<LayoutDocument, DocumentError>;

    fn format(&self) -> DocumentFormat;
}

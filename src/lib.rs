//! Live Layout - declarative, hot-reloadable view layouts
//!
//! A layout document (JSON or XML) describes a tree of views, their constraints in a terse
//! shorthand and their style properties. A [`Layout`] builds that tree onto a widget hierarchy
//! through a [`ViewHost`], reconciles it on rebuild and reloads it when a new document arrives
//! on its update channel. The [`headless`] toolkit implements the host in memory and solves
//! frames with a Cassowary solver.
//!
//! # Example
//!
//! ```rust
//! use live_layout::render;
//!
//! let tree = render(r#"{
//!     "root": {
//!         "id": "root",
//!         "views": {
//!             "square": { "id": "!square", "constraints": { "width height": "+:100" } }
//!         }
//!     }
//! }"#).unwrap();
//! assert!(tree.contains("square [UIView] 0 0 100 100"));
//! ```

pub mod bridge;
pub mod config;
pub mod constraint;
pub mod error;
pub mod headless;
pub mod host;
pub mod hot_reload;
pub mod index;
pub mod layout;
pub mod node;
pub mod parser;
pub mod property;
pub mod report;
pub mod stylesheet;

pub use config::{ConfigError, EngineConfig};
pub use constraint::{Attribute, ConstraintDescriptor, Relation, SizeClass, TraitCollection};
pub use error::{DocumentError, ShorthandError};
pub use headless::{FrameSolution, HeadlessHost, HeadlessWidget, WidgetKind};
pub use host::{ViewEnvironment, ViewHost, Widget, WidgetId};
pub use hot_reload::{LayoutUpdate, UpdateBus, UpdateChannel};
pub use index::ViewIndex;
pub use layout::{Layout, LayoutDelegate, LayoutError, LayoutState};
pub use node::ViewNode;
pub use parser::{DocumentFormat, LayoutDocument};
pub use report::{Report, Reporter, Severity};
pub use stylesheet::Palette;

use indexmap::IndexMap;
use thiserror::Error;

use crate::host::ViewMappable;
use crate::parser::raw::format_number;
use crate::report::CollectingSink;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Configuration for building a document on the headless toolkit
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub engine: EngineConfig,
    /// `#{key}` substitutions
    pub injection: IndexMap<String, String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 480.0,
            engine: EngineConfig::default(),
            injection: IndexMap::new(),
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_injection(mut self, key: &str, value: &str) -> Self {
        self.injection.insert(key.to_string(), value.to_string());
        self
    }
}

/// A document built and solved on the headless toolkit
pub struct Rendered {
    pub host: HeadlessHost,
    pub layout: Layout,
    pub root: WidgetId,
    pub solution: FrameSolution,
    pub reports: CollectingSink,
}

impl Rendered {
    /// One line per node, `id [class] x y w h`, indented by depth
    pub fn tree(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.layout.index().root() {
            self.write_node(&mut out, root, 0);
        }
        out
    }

    fn write_node(&self, out: &mut String, node: &ViewNode, depth: usize) {
        let indent = "  ".repeat(depth);
        match node.target().and_then(|view| self.host.widget(view)) {
            Some(widget) => {
                let frame = widget.frame();
                out.push_str(&format!(
                    "{}{} [{}] {} {} {} {}\n",
                    indent,
                    node.id(),
                    widget.class_name(),
                    format_number(frame.x),
                    format_number(frame.y),
                    format_number(frame.width),
                    format_number(frame.height)
                ));
            }
            None => out.push_str(&format!("{}{} <missing>\n", indent, node.id())),
        }
        for child in self.layout.index().children_of(node.id()) {
            if child.is_active() {
                self.write_node(out, child, depth + 1);
            }
        }
    }

    /// `N warnings, M errors`
    pub fn summary(&self) -> String {
        format!(
            "{} warnings, {} errors",
            self.reports.warnings().len(),
            self.reports.errors().len()
        )
    }

    /// Solve frames again, e.g. after a reload
    pub fn relayout(&mut self, width: f64, height: f64) {
        self.solution = self.host.layout(self.root, width, height);
    }
}

/// Build a document on an empty 320x480 headless root and print the solved tree
pub fn render(source: &str) -> Result<String, RenderError> {
    Ok(render_with_config(source, RenderConfig::default())?.tree())
}

/// Build a document on an empty headless root and solve its frames
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<Rendered, RenderError> {
    let reports = CollectingSink::new();
    let mut layout = config.engine.layout(source, None)?;
    let reporter = layout.reporter().clone().with_sink(reports.clone());
    layout = layout.with_reporter(reporter);
    if !config.injection.is_empty() {
        layout.inject_data(config.injection.clone());
    }

    let mut host = HeadlessHost::new();
    let root = host.create_view(None);
    layout.build(&mut host, root, None)?;
    let solution = host.layout(root, config.width, config.height);
    Ok(Rendered {
        host,
        layout,
        root,
        solution,
        reports,
    })
}

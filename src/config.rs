//! Engine configuration
//!
//! ```toml
//! format = "xml"
//! palette = "brand.toml"
//!
//! [reporting]
//! log = true
//! forward = false
//!
//! [colors]
//! accent = "#ff8800"
//! ```

use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::layout::Layout;
use crate::parser::DocumentFormat;
use crate::report::{ChannelSink, LogSink, Report, Reporter};
use crate::stylesheet::{Palette, PaletteError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to load palette: {0}")]
    Palette(#[from] PaletteError),
}

/// Where reports go
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Write reports to the log
    pub log: bool,
    /// Forward reports to the bridge
    pub forward: bool,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            log: true,
            forward: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub reporting: ReportingConfig,
    /// Palette file layered over the system colors
    pub palette: Option<PathBuf>,
    /// Named colors layered over the palette
    pub colors: IndexMap<String, String>,
    /// Dialect to parse documents with; sniffed from the text when unset
    pub format: Option<DocumentFormat>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        // Palette paths are relative to the config file
        if let (Some(palette), Some(dir)) = (config.palette.as_mut(), path.parent()) {
            if palette.is_relative() {
                *palette = dir.join(&*palette);
            }
        }
        Ok(config)
    }

    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_palette_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.palette = Some(path.into());
        self
    }

    pub fn with_color(mut self, name: &str, hex: &str) -> Self {
        self.colors.insert(name.to_string(), hex.to_string());
        self
    }

    pub fn with_forwarding(mut self, forward: bool) -> Self {
        self.reporting.forward = forward;
        self
    }

    /// Reporter with the configured sinks. `forward` is only used when forwarding is on.
    pub fn reporter(&self, forward: Option<Sender<Report>>) -> Reporter {
        let mut reporter = Reporter::silent();
        if self.reporting.log {
            reporter = reporter.with_sink(LogSink);
        }
        if let (true, Some(sender)) = (self.reporting.forward, forward) {
            reporter = reporter.with_sink(ChannelSink::new(sender));
        }
        reporter
    }

    pub fn palette(&self) -> Result<Palette, ConfigError> {
        let palette = match &self.palette {
            Some(path) => Palette::from_file(path)?,
            None => Palette::default(),
        };
        Ok(palette.with_colors(&self.colors)?)
    }

    /// A layout over `source` wired with this configuration
    pub fn layout(
        &self,
        source: impl Into<String>,
        forward: Option<Sender<Report>>,
    ) -> Result<Layout, ConfigError> {
        let mut layout = Layout::new(source)
            .with_reporter(self.reporter(forward))
            .with_palette(self.palette()?);
        if let Some(format) = self.format {
            layout = layout.with_format(format);
        }
        Ok(layout)
    }
}

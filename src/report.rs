//! Diagnostics fan-out
//!
//! Nothing in the engine aborts a build because of a bad expression. Problems are turned into
//! [`Report`]s and handed to a [`Reporter`], which forwards each one to every registered sink
//! such as the local log or a bridge channel.

use std::fmt;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;

/// How loud a report is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub severity: Severity,
    pub message: String,
}

impl Report {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.severity.label(), self.message)
    }
}

/// Destination for reports
pub trait ReportSink: Send + Sync {
    fn receive(&self, report: &Report);
}

/// Writes reports through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn receive(&self, report: &Report) {
        match report.severity {
            Severity::Warning => log::warn!("{}", report.message),
            Severity::Error => log::error!("{}", report.message),
        }
    }
}

/// Forwards reports to a channel, typically drained by the bridge connection
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Report>,
}

impl ChannelSink {
    pub fn new(sender: Sender<Report>) -> Self {
        Self { sender }
    }
}

impl ReportSink for ChannelSink {
    fn receive(&self, report: &Report) {
        let _ = self.sender.send(report.clone());
    }
}

/// Keeps every report in memory
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<Report> {
        self.reports()
            .into_iter()
            .filter(|r| r.severity == Severity::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<Report> {
        self.reports()
            .into_iter()
            .filter(|r| r.severity == Severity::Warning)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.clear();
        }
    }
}

impl ReportSink for CollectingSink {
    fn receive(&self, report: &Report) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
    }
}

/// Fans every report out to its sinks
#[derive(Clone, Default)]
pub struct Reporter {
    sinks: Vec<Arc<dyn ReportSink>>,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Reporter {
    /// A reporter with no sinks; reports are dropped
    pub fn silent() -> Self {
        Self::default()
    }

    /// A reporter that only writes to the log
    pub fn logging() -> Self {
        Self::silent().with_sink(LogSink)
    }

    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.dispatch(Report::warning(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.dispatch(Report::error(message));
    }

    pub fn dispatch(&self, report: Report) {
        for sink in &self.sinks {
            sink.receive(&report);
        }
    }
}

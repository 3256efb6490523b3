//! Layout orchestrator
//!
//! A [`Layout`] owns one document and the [`ViewIndex`] built from it. Building walks the
//! document tree, reconciles it with the nodes of previous builds, materializes widgets,
//! assembles the hierarchy and finally installs constraints and properties. All passes are
//! synchronous and run on the caller's thread; hot-reload updates are queued on a
//! [`Subscription`] and only applied when [`Layout::poll_updates`] is called.
//!
//! A delegate must not call back into the layout that is notifying it.

pub mod error;
pub mod inject;

pub use error::LayoutError;
pub use inject::inject;

use std::rc::Rc;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::constraint::attribute::TraitCollection;
use crate::constraint::resolve::ConstraintContext;
use crate::host::{ViewEnvironment, ViewHost, WidgetId};
use crate::hot_reload::{channel_name, Subscription, UpdateChannel};
use crate::index::ViewIndex;
use crate::node::{AppliedConstraint, ViewNode};
use crate::parser::{DocumentFormat, DocumentParser, LayoutDocument, RawNode};
use crate::property;
use crate::report::Reporter;
use crate::stylesheet::Palette;

/// Observer notified after every completed build
pub trait LayoutDelegate {
    fn layout_did_build(&self, layout: &Layout, target: WidgetId);
}

/// Where a layout is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    Unbuilt,
    Built,
    Cleared,
}

pub struct Layout {
    source: String,
    parser: Box<dyn DocumentParser>,
    reporter: Reporter,
    palette: Palette,
    /// Parsed form of `source`, after injection
    document: Option<LayoutDocument>,
    injection: IndexMap<String, String>,
    injection_pending: bool,
    index: ViewIndex,
    state: LayoutState,
    target: Option<WidgetId>,
    environment: Option<Rc<dyn ViewEnvironment>>,
    delegate: Option<Rc<dyn LayoutDelegate>>,
    channel: Option<Arc<dyn UpdateChannel>>,
    subscription: Option<Subscription>,
}

impl Layout {
    /// A layout over `source`, parsed with the dialect its first character suggests
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let parser = DocumentFormat::sniff(&source).parser();
        Self {
            source,
            parser,
            reporter: Reporter::logging(),
            palette: Palette::default(),
            document: None,
            injection: IndexMap::new(),
            injection_pending: false,
            index: ViewIndex::new(),
            state: LayoutState::Unbuilt,
            target: None,
            environment: None,
            delegate: None,
            channel: None,
            subscription: None,
        }
    }

    pub fn with_format(self, format: DocumentFormat) -> Self {
        self.with_parser(format.parser())
    }

    pub fn with_parser(mut self, parser: Box<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self.document = None;
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_delegate(mut self, delegate: Rc<dyn LayoutDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    // Accessors

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn format(&self) -> DocumentFormat {
        self.parser.format()
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn document(&self) -> Option<&LayoutDocument> {
        self.document.as_ref()
    }

    /// Layout name from the last parsed document
    pub fn name(&self) -> Option<&str> {
        self.document.as_ref().and_then(|doc| doc.name.as_deref())
    }

    pub fn index(&self) -> &ViewIndex {
        &self.index
    }

    pub fn node(&self, id: &str) -> Option<&ViewNode> {
        self.index.get(id)
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn target(&self) -> Option<WidgetId> {
        self.target
    }

    pub fn environment(&self) -> Option<&dyn ViewEnvironment> {
        self.environment.as_deref()
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    // Document

    /// Replace the document text. Pending injection data is applied again at the next build.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.document = None;
        self.injection_pending = !self.injection.is_empty();
    }

    /// Set the `#{key}` substitutions used from the next build on
    pub fn inject_data(&mut self, data: IndexMap<String, String>) {
        self.injection = data;
        self.injection_pending = true;
    }

    /// Parse the document if the text or the injection data changed since the last parse
    pub fn load(&mut self) -> Result<&LayoutDocument, LayoutError> {
        if self.document.is_none() || self.injection_pending {
            let text = if self.injection_pending {
                inject(&self.source, &self.injection)
            } else {
                self.source.clone()
            };
            self.injection_pending = false;
            match self.parser.parse(&text, &self.reporter) {
                Ok(document) => self.document = Some(document),
                Err(e) => {
                    self.document = None;
                    self.reporter.error(e.to_string());
                    return Err(e.into());
                }
            }
        }
        self.document
            .as_ref()
            .ok_or_else(|| LayoutError::missing_root(None))
    }

    // Hot reload

    /// Subscribe to `layout-update__<name>` when the document declares a name
    pub fn connect(&mut self, channel: Arc<dyn UpdateChannel>) -> Result<(), LayoutError> {
        self.disconnect();
        let name = self.load()?.name.clone();
        if let Some(name) = name {
            let subscription = channel.subscribe(&channel_name(&name));
            log::debug!("layout '{}' listening on {}", name, subscription.channel());
            self.subscription = Some(subscription);
        }
        self.channel = Some(channel);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let (Some(channel), Some(subscription)) = (self.channel.take(), self.subscription.take())
        {
            channel.unsubscribe(&subscription);
        }
    }

    /// Apply queued document updates for this layout; returns how many were applied.
    ///
    /// Updates naming another layout are ignored. A built layout is reloaded after each update.
    /// A document that fails to load has already been reported and does not stop later
    /// updates. When a document renames the layout, the subscription moves to the new name.
    pub fn poll_updates(&mut self, host: &mut dyn ViewHost) -> usize {
        let Some(subscription) = &self.subscription else {
            return 0;
        };
        let mut channel = subscription.channel().to_string();
        let updates = subscription.drain();
        let mut applied = 0;
        for update in updates {
            if channel_name(&update.layout_name) != channel {
                log::debug!(
                    "ignoring update for '{}' received on {}",
                    update.layout_name,
                    channel
                );
                continue;
            }
            log::info!("reloading layout '{}'", update.layout_name);
            self.set_source(update.document);
            let result = if self.target.is_some() {
                self.reload(host)
            } else {
                self.load().map(|_| ())
            };
            match result {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("update for '{}' not applied: {}", update.layout_name, e),
            }
            if let Some(renamed) = self.follow_rename() {
                channel = renamed;
            }
        }
        applied
    }

    /// Move the subscription when the loaded document names a different layout
    fn follow_rename(&mut self) -> Option<String> {
        let channel = self.channel.clone()?;
        let wanted = channel_name(self.name()?);
        if self.subscription.as_ref()?.channel() == wanted {
            return None;
        }
        if let Some(old) = self.subscription.take() {
            channel.unsubscribe(&old);
        }
        log::info!("layout renamed, now listening on {}", wanted);
        self.subscription = Some(channel.subscribe(&wanted));
        Some(wanted)
    }

    // Lifecycle

    /// Build the document onto `target`, looking up existing widgets in `environment`
    pub fn build(
        &mut self,
        host: &mut dyn ViewHost,
        target: WidgetId,
        environment: Option<Rc<dyn ViewEnvironment>>,
    ) -> Result<(), LayoutError> {
        let document = self.load()?.clone();
        let Some(root) = document.root.as_ref() else {
            let err = LayoutError::missing_root(document.name.as_deref());
            self.reporter.error(err.to_string());
            return Err(err);
        };
        self.target = Some(target);
        self.environment = environment;

        let mut visited = IndexSet::new();
        self.walk(root, None, &document, &mut visited);
        self.remove_vanished(host, &visited);
        self.materialize(host, target, root.identity().id, &visited);
        self.assemble_hierarchy(host);
        self.apply_expressions(host);
        self.apply_chrome(host, &document);

        self.state = LayoutState::Built;
        log::info!(
            "built layout '{}' on {} with {} views",
            document.name.as_deref().unwrap_or("<unnamed>"),
            target,
            visited.len()
        );
        if let Some(delegate) = self.delegate.clone() {
            delegate.layout_did_build(self, target);
        }
        Ok(())
    }

    /// Re-apply every active node's constraints and properties in place
    pub fn refresh(&mut self, host: &mut dyn ViewHost) -> Result<(), LayoutError> {
        if self.state != LayoutState::Built {
            return Err(LayoutError::NotBuilt);
        }
        self.apply_expressions(host);
        Ok(())
    }

    /// Remove every active node and restore the widgets they changed
    pub fn clear(&mut self, host: &mut dyn ViewHost) {
        for node in self.index.iter_mut().filter(|node| node.is_active()) {
            node.remove(host, &self.palette);
        }
        if self.state == LayoutState::Built {
            self.state = LayoutState::Cleared;
        }
    }

    /// Clear, then build again on the stored target and environment
    pub fn reload(&mut self, host: &mut dyn ViewHost) -> Result<(), LayoutError> {
        let target = self.target.ok_or(LayoutError::NotBuilt)?;
        self.clear(host);
        let environment = self.environment.clone();
        self.build(host, target, environment)
    }

    /// Toggle size-class gated relations without rebuilding
    pub fn update_constraints(&self, host: &mut dyn ViewHost, traits: &TraitCollection) {
        for node in self.index.active() {
            node.update_constraint_activity(host, traits);
        }
    }

    /// Clear, forget every node and stop listening for updates
    pub fn teardown(&mut self, host: &mut dyn ViewHost) {
        self.clear(host);
        self.index.clear();
        self.disconnect();
        self.state = LayoutState::Unbuilt;
        self.target = None;
        self.environment = None;
    }

    // Build passes

    fn walk(
        &mut self,
        raw: &RawNode,
        parent: Option<&str>,
        document: &LayoutDocument,
        visited: &mut IndexSet<String>,
    ) {
        let id = raw.identity().id.to_string();
        if !visited.insert(id.clone()) {
            self.reporter
                .warning(format!("Duplicate view id '{}'; only the first is used.", id));
            return;
        }

        let parent_id = parent.map(str::to_string);
        match self.index.get_mut(&id) {
            Some(node) => node.update(raw.clone(), parent_id),
            None => {
                self.index
                    .insert(ViewNode::new(raw.clone(), parent_id, parent.is_none()));
            }
        }

        if let Some(node) = self.index.get_mut(&id) {
            node.clear_templates();
            for name in &raw.templates {
                match document.template(name) {
                    Some(template) => node.apply_template(template),
                    None => self.reporter.warning(format!(
                        "Template '{}' applied to view '{}' does not exist.",
                        name, id
                    )),
                }
            }
        }

        for child in &raw.subviews {
            self.walk(child, Some(&id), document, visited);
        }
    }

    fn remove_vanished(&mut self, host: &mut dyn ViewHost, visited: &IndexSet<String>) {
        for node in self
            .index
            .iter_mut()
            .filter(|node| node.is_active() && !visited.contains(node.id()))
        {
            log::debug!("view '{}' left the layout", node.id());
            node.remove(host, &self.palette);
        }
    }

    fn materialize(
        &mut self,
        host: &mut dyn ViewHost,
        target: WidgetId,
        root_id: &str,
        visited: &IndexSet<String>,
    ) {
        for id in visited {
            let Some(node) = self.index.get_mut(id) else {
                continue;
            };
            let widget = if id == root_id {
                Some(target)
            } else if node.is_new_element() {
                node.target()
                    .or_else(|| Some(host.create_view(node.class_name())))
            } else {
                let found = self.environment.as_ref().and_then(|env| env.view(id));
                if found.is_none() {
                    self.reporter.warning(format!(
                        "Could not find view '{}' in the view environment.",
                        id
                    ));
                }
                found
            };
            node.set_target(widget);
        }
    }

    fn assemble_hierarchy(&self, host: &mut dyn ViewHost) {
        let placements: Vec<(WidgetId, WidgetId)> = self
            .index
            .by_z_order()
            .into_iter()
            .filter(|node| node.is_active())
            .filter_map(|node| Some((self.index.target_of(node.parent()?)?, node.target()?)))
            .collect();
        for (parent, child) in placements {
            host.add_subview(parent, child);
        }
    }

    fn apply_expressions(&mut self, host: &mut dyn ViewHost) {
        for node in self.index.iter_mut().filter(|node| node.is_active()) {
            node.clear_constraints(host);
        }

        let installed: Vec<(String, Vec<AppliedConstraint>)> = {
            let ctx =
                ConstraintContext::new(&self.index, self.environment.as_deref(), &self.reporter);
            self.index
                .active()
                .map(|node| (node.id().to_string(), ctx.establish(host, node)))
                .collect()
        };
        for (id, applied) in installed {
            if let Some(node) = self.index.get_mut(&id) {
                for constraint in applied {
                    node.record_constraint(constraint);
                }
            }
        }

        for node in self.index.iter_mut().filter(|node| node.is_active()) {
            node.apply_all_properties(host, &self.palette);
        }
    }

    /// Document-level properties for the hosting controller. These are not cached.
    fn apply_chrome(&self, host: &mut dyn ViewHost, document: &LayoutDocument) {
        let Some(controller) = self
            .environment
            .as_deref()
            .and_then(|env| env.as_controller())
        else {
            return;
        };
        if let Some(widget) = controller
            .navigation_bar()
            .and_then(|bar| host.widget_mut(bar))
        {
            for entry in &document.navigation_bar {
                property::apply(&mut *widget, &entry.name, &entry.value, &self.palette);
            }
        }
        if let Some(title) = &document.controller_title {
            controller.set_title(title);
        }
    }
}

impl Drop for Layout {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::headless::HeadlessHost;
    use crate::host::TextMappable;
    use crate::report::CollectingSink;

    const CARD: &str = r#"{
        "name": "card",
        "root": {
            "id": "root",
            "views": {
                "title": { "id": "!title:UILabel", "properties": { "text": "Hello" } },
                "body": { "id": "!body", "constraints": { "top": "+8" } }
            }
        }
    }"#;

    fn layout(source: &str) -> (Layout, CollectingSink) {
        let sink = CollectingSink::new();
        let layout = Layout::new(source).with_reporter(Reporter::silent().with_sink(sink.clone()));
        (layout, sink)
    }

    #[test]
    fn test_state_transitions() {
        let mut host = HeadlessHost::new();
        let root = host.create_view(None);
        let (mut layout, _) = layout(CARD);
        assert_eq!(layout.state(), LayoutState::Unbuilt);
        assert_eq!(layout.refresh(&mut host), Err(LayoutError::NotBuilt));
        assert_eq!(layout.reload(&mut host), Err(LayoutError::NotBuilt));

        layout.build(&mut host, root, None).unwrap();
        assert_eq!(layout.state(), LayoutState::Built);
        assert_eq!(layout.name(), Some("card"));
        layout.refresh(&mut host).unwrap();

        layout.clear(&mut host);
        assert_eq!(layout.state(), LayoutState::Cleared);
        assert!(host.subviews(root).is_empty());

        layout.reload(&mut host).unwrap();
        assert_eq!(layout.state(), LayoutState::Built);
        assert_eq!(host.subviews(root).len(), 2);
    }

    #[test]
    fn test_unreadable_document_is_reported() {
        let mut host = HeadlessHost::new();
        let root = host.create_view(None);
        let (mut layout, sink) = layout("{ not json");
        let result = layout.build(&mut host, root, None);
        assert!(matches!(result, Err(LayoutError::Document(_))));
        assert_eq!(sink.errors().len(), 1);
        assert_eq!(layout.target(), None);
    }

    #[test]
    fn test_missing_root() {
        let mut host = HeadlessHost::new();
        let root = host.create_view(None);
        let (mut layout, sink) = layout(r#"{"name": "empty"}"#);
        let result = layout.build(&mut host, root, None);
        assert_eq!(result, Err(LayoutError::missing_root(Some("empty"))));
        assert_eq!(sink.errors().len(), 1);
        assert_eq!(layout.target(), None);
    }

    #[test]
    fn test_unknown_template_warns() {
        let mut host = HeadlessHost::new();
        let root = host.create_view(None);
        let (mut layout, sink) = layout(r#"{"root": {"id": "root", "templates": ["missing"]}}"#);
        layout.build(&mut host, root, None).unwrap();
        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.warnings()[0].message.contains("'missing'"));
    }

    #[test]
    fn test_injection_applies_once_per_change() {
        let mut host = HeadlessHost::new();
        let root = host.create_view(None);
        let (mut layout, _) = layout(
            r##"{"root": {"id": "root", "views": {"t": {"id": "!t:UILabel", "properties": {"text": "#{greeting}"}}}}}"##,
        );
        let mut data = IndexMap::new();
        data.insert("greeting".to_string(), "Hi".to_string());
        layout.inject_data(data);
        layout.build(&mut host, root, None).unwrap();
        let label = layout.index().target_of("t").unwrap();
        assert_eq!(host.widget(label).unwrap().text().as_deref(), Some("Hi"));

        // A reload reuses the injected document
        layout.reload(&mut host).unwrap();
        let label = layout.index().target_of("t").unwrap();
        assert_eq!(host.widget(label).unwrap().text().as_deref(), Some("Hi"));
    }

    struct Recorder(RefCell<Vec<(usize, WidgetId)>>);

    impl LayoutDelegate for Recorder {
        fn layout_did_build(&self, layout: &Layout, target: WidgetId) {
            self.0.borrow_mut().push((layout.index().len(), target));
        }
    }

    #[test]
    fn test_delegate_called_per_build() {
        let mut host = HeadlessHost::new();
        let root = host.create_view(None);
        let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
        let (layout, _) = layout(CARD);
        let mut layout = layout.with_delegate(recorder.clone());
        layout.build(&mut host, root, None).unwrap();
        layout.reload(&mut host).unwrap();
        assert_eq!(*recorder.0.borrow(), vec![(3, root), (3, root)]);
    }
}

//! The viewer: load lifecycle, host notifications, focus and drill-down control.
//!
//! A [`Viewer`] serializes ingestion passes. Each [`Viewer::begin_load`] disposes the previous
//! pass, resets the session and hands out a fresh [`LoadToken`]; element events carrying an
//! older token are dropped, so a stale source can never write into a newer session.

use std::time::Instant;

use starmap_graphlib::Graph;

use crate::config::StarmapConfig;
use crate::element::SvgElement;
use crate::error::{Error, Result};
use crate::highlight::{HighlightView, highlight};
use crate::host::ViewHost;
use crate::progress::{Debouncer, Progress};
use crate::session::{IngestSession, Ingested};
use crate::shape::{ShapeExtractor, SvgShapeExtractor};
use crate::stream::{CancelFlag, ElementHandler, StreamOutcome, SvgStream};
use crate::subgraph::{self, Subgraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken {
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Keep a previously persisted camera instead of framing the new view box.
    pub restore_camera: bool,
    /// Flag the caller can flip to abandon the pass; a fresh one is used when unset.
    pub cancel: Option<CancelFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Completed,
    Cancelled,
    Failed,
    Disposed,
}

pub struct Viewer<H: ViewHost> {
    config: StarmapConfig,
    shapes: Box<dyn ShapeExtractor>,
    session: IngestSession,
    host: H,
    progress: Debouncer<Progress>,
    generation: u64,
    state: LoadState,
    restore_camera: bool,
    cancel: CancelFlag,
    pending_focus: Option<String>,
    user_interacted: bool,
    focused: Option<String>,
    subgraph: Option<(String, Subgraph)>,
}

impl<H: ViewHost> std::fmt::Debug for Viewer<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("nodes", &self.session.node_count())
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl<H: ViewHost> Viewer<H> {
    pub fn new(host: H, config: StarmapConfig) -> Self {
        let progress = Debouncer::new(config.progress_interval());
        Self {
            config,
            shapes: Box::new(SvgShapeExtractor::default()),
            session: IngestSession::new(),
            host,
            progress,
            generation: 0,
            state: LoadState::Idle,
            restore_camera: false,
            cancel: CancelFlag::default(),
            pending_focus: None,
            user_interacted: false,
            focused: None,
            subgraph: None,
        }
    }

    pub fn with_shapes(mut self, shapes: Box<dyn ShapeExtractor>) -> Self {
        self.shapes = shapes;
        self
    }

    pub fn config(&self) -> &StarmapConfig {
        &self.config
    }

    pub fn session(&self) -> &IngestSession {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn subgraph(&self) -> Option<(&str, &Subgraph)> {
        self.subgraph.as_ref().map(|(root, g)| (root.as_str(), g))
    }

    /// Disposes any previous pass and starts a new one.
    pub fn begin_load(&mut self, options: LoadOptions) -> LoadToken {
        if self.state == LoadState::Loading {
            tracing::debug!(generation = self.generation, "disposing in-flight load");
        }
        self.cancel.cancel();
        self.progress.cancel();
        self.session.reset();
        self.focused = None;
        self.subgraph = None;

        self.generation += 1;
        self.cancel = options.cancel.unwrap_or_default();
        self.restore_camera = options.restore_camera;
        self.state = LoadState::Loading;
        tracing::debug!(generation = self.generation, "load started");
        LoadToken {
            generation: self.generation,
        }
    }

    fn accepts(&mut self, token: LoadToken) -> bool {
        if token.generation != self.generation || self.state != LoadState::Loading {
            tracing::debug!(
                token = token.generation,
                current = self.generation,
                state = ?self.state,
                "dropping stale element event"
            );
            return false;
        }
        if self.cancel.is_cancelled() {
            self.abandon();
            return false;
        }
        true
    }

    fn abandon(&mut self) {
        tracing::debug!(generation = self.generation, "load cancelled; discarding session");
        self.session.reset();
        self.progress.cancel();
        self.state = LoadState::Cancelled;
    }

    fn fail(&mut self, err: &Error) {
        tracing::warn!(generation = self.generation, %err, "ingestion failed; discarding session");
        self.session.reset();
        self.progress.cancel();
        self.state = LoadState::Failed;
    }

    pub fn element_start(&mut self, token: LoadToken, el: &dyn SvgElement) -> Result<()> {
        if !self.accepts(token) {
            return Ok(());
        }
        match self
            .session
            .element_start(el, &self.config, self.shapes.as_ref())
        {
            Ok(ingested) => {
                self.dispatch(ingested);
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub fn element_end(&mut self, token: LoadToken, el: &dyn SvgElement) -> Result<()> {
        if !self.accepts(token) {
            return Ok(());
        }
        if let Err(err) = self.session.element_end(el) {
            self.fail(&err);
            return Err(err);
        }
        Ok(())
    }

    fn snapshot(&self, done: bool) -> Progress {
        Progress {
            nodes: self.session.node_count(),
            borders: self.session.borders().len(),
            clusters: self.session.cluster_count(),
            done,
        }
    }

    fn dispatch(&mut self, ingested: Ingested) {
        match ingested {
            Ingested::ViewBox => {
                if self.restore_camera {
                    return;
                }
                if let Some(view_box) = self.session.view_box() {
                    self.host.frame_view_box(&view_box);
                }
            }
            Ingested::Border(ix) => {
                if let Some(border) = self.session.borders().get(ix) {
                    self.host.add_border(border);
                }
                self.offer_progress();
            }
            Ingested::Node(seq) => {
                let Some(node) = self.session.node_by_sequence(seq) else {
                    return;
                };
                self.host.add_node(node);
                self.host.register_search(&node.name, seq);
                self.host.request_frame();

                let wanted = !self.user_interacted
                    && self.pending_focus.as_deref() == Some(node.name.as_str());
                if wanted {
                    self.host.focus_node(node);
                    self.focused = Some(node.name.clone());
                    self.pending_focus = None;
                }

                self.offer_progress();
            }
            Ingested::TransformPushed | Ingested::TransformPopped | Ingested::Ignored => {}
        }
    }

    fn offer_progress(&mut self) {
        let snapshot = self.snapshot(false);
        if let Some(progress) = self.progress.offer(Instant::now(), snapshot) {
            self.host.report_progress(progress);
        }
    }

    /// Emits a debounced progress snapshot once its interval has elapsed.
    pub fn poll_progress(&mut self, now: Instant) {
        if let Some(progress) = self.progress.poll(now) {
            self.host.report_progress(progress);
        }
    }

    /// Completes the pass: flushes pending progress, then reports the final snapshot.
    ///
    /// Returns `None` for a stale token.
    pub fn finish_load(&mut self, token: LoadToken) -> Option<Progress> {
        if !self.accepts(token) {
            return None;
        }
        if let Some(progress) = self.progress.flush() {
            self.host.report_progress(progress);
        }
        let done = self.snapshot(true);
        self.host.report_progress(done);
        self.state = LoadState::Completed;
        tracing::info!(
            nodes = done.nodes,
            borders = done.borders,
            clusters = done.clusters,
            "load completed"
        );
        Some(done)
    }

    /// Parses `text` and drives the whole document through a new pass.
    pub fn load_svg(&mut self, text: &str, options: LoadOptions) -> Result<StreamOutcome> {
        let token = self.begin_load(options);
        let stream = match SvgStream::parse(text) {
            Ok(stream) => stream.with_cancel(self.cancel.clone()),
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        let outcome = stream.run(&mut PassDriver {
            viewer: self,
            token,
        })?;
        match outcome {
            StreamOutcome::Completed => {
                self.finish_load(token);
            }
            StreamOutcome::Cancelled => {
                if self.state == LoadState::Loading {
                    self.abandon();
                }
            }
        }
        Ok(outcome)
    }

    /// Focuses `name` as soon as it is ingested, or now if it already is.
    pub fn request_focus(&mut self, name: &str) {
        self.user_interacted = false;
        match self.session.node(name) {
            Some(node) => {
                self.host.focus_node(node);
                self.focused = Some(node.name.clone());
                self.pending_focus = None;
            }
            None => self.pending_focus = Some(name.to_string()),
        }
    }

    /// Any direct user interaction supersedes a pending focus request.
    pub fn note_user_interaction(&mut self) {
        self.user_interacted = true;
        self.pending_focus = None;
    }

    pub fn focus<N, E>(&mut self, name: &str, graph: &Graph<N, E>) -> HighlightView {
        let view = highlight(&self.session, graph, name, &self.config);
        self.focused = self.session.node(name).map(|n| n.name.clone());
        view
    }

    pub fn unfocus(&mut self) {
        self.focused = None;
    }

    pub fn drill_down<N, E>(&mut self, name: &str, graph: &Graph<N, E>) -> &Subgraph {
        let sub = subgraph::extract(graph, &self.session, name);
        &self.subgraph.insert((name.to_string(), sub)).1
    }

    /// Leaves the drill-down view; returns whether one was open.
    pub fn exit_subgraph(&mut self) -> bool {
        self.subgraph.take().is_some()
    }

    /// Stops the current pass and drops everything it produced.
    pub fn dispose(&mut self) {
        self.cancel.cancel();
        self.progress.cancel();
        self.session.reset();
        self.generation += 1;
        self.state = LoadState::Disposed;
        self.pending_focus = None;
        self.focused = None;
        self.subgraph = None;
        tracing::debug!(generation = self.generation, "viewer disposed");
    }
}

struct PassDriver<'v, H: ViewHost> {
    viewer: &'v mut Viewer<H>,
    token: LoadToken,
}

impl<H: ViewHost> ElementHandler for PassDriver<'_, H> {
    fn element_start(&mut self, el: &dyn SvgElement) -> Result<()> {
        self.viewer.element_start(self.token, el)
    }

    fn element_end(&mut self, el: &dyn SvgElement) -> Result<()> {
        self.viewer.element_end(self.token, el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::host::RecordingHost;
    use std::rc::Rc;

    fn viewer() -> Viewer<RecordingHost> {
        Viewer::new(RecordingHost::default(), StarmapConfig::default())
    }

    fn circle(parent: &Rc<Element>, id: &str) -> Element {
        Element::new("circle")
            .with_attr("id", id)
            .with_attr("cx", "1")
            .with_attr("cy", "1")
            .with_attr("r", "1")
            .with_parent(parent.clone())
    }

    #[test]
    fn stale_tokens_cannot_write() {
        let mut v = viewer();
        let old = v.begin_load(LoadOptions::default());
        let new = v.begin_load(LoadOptions::default());
        assert_ne!(old, new);

        v.element_start(old, &Element::new("svg")).unwrap();
        assert!(v.session().view_box().is_none());
        assert!(v.finish_load(old).is_none());

        v.element_start(new, &Element::new("svg")).unwrap();
        assert!(v.session().view_box().is_some());
    }

    #[test]
    fn restore_camera_skips_framing() {
        let mut v = viewer();
        let token = v.begin_load(LoadOptions {
            restore_camera: true,
            ..LoadOptions::default()
        });
        v.element_start(token, &Element::new("svg")).unwrap();
        assert!(v.host().framed.is_empty());

        let token = v.begin_load(LoadOptions::default());
        v.element_start(token, &Element::new("svg")).unwrap();
        assert_eq!(v.host().framed.len(), 1);
    }

    #[test]
    fn node_notifies_host() {
        let mut v = viewer();
        let token = v.begin_load(LoadOptions::default());
        v.element_start(token, &Element::new("svg")).unwrap();
        let g = Rc::new(Element::new("g").with_attr("id", "c"));
        v.element_start(token, &circle(&g, "_a")).unwrap();

        let host = v.host();
        assert_eq!(host.nodes.len(), 1);
        assert_eq!(host.search, vec![("a".to_string(), 0)]);
        assert_eq!(host.frame_requests, 1);
        // Leading edge: first snapshot goes out at once.
        assert_eq!(host.progress.len(), 1);
        assert_eq!(host.progress[0].nodes, 1);
    }

    #[test]
    fn border_counts_reach_progress_before_any_node() {
        let mut v = viewer();
        let token = v.begin_load(LoadOptions::default());
        v.element_start(token, &Element::new("svg")).unwrap();
        let border = Element::new("path")
            .with_attr("id", "#c1")
            .with_attr("fill", "#336699")
            .with_attr("d", "M0 0 L1 0 L1 1 Z");
        v.element_start(token, &border).unwrap();

        let host = v.host();
        assert_eq!(host.borders.len(), 1);
        assert_eq!(host.progress.len(), 1);
        assert_eq!(host.progress[0].borders, 1);
        assert_eq!(host.progress[0].clusters, 1);
        assert_eq!(host.progress[0].nodes, 0);
    }

    #[test]
    fn pending_focus_fires_on_ingest_unless_superseded() {
        let g = Rc::new(Element::new("g").with_attr("id", "c"));

        let mut v = viewer();
        v.request_focus("b");
        let token = v.begin_load(LoadOptions::default());
        v.element_start(token, &Element::new("svg")).unwrap();
        v.element_start(token, &circle(&g, "a")).unwrap();
        assert!(v.host().focused.is_empty());
        v.element_start(token, &circle(&g, "b")).unwrap();
        assert_eq!(v.host().focused, vec!["b".to_string()]);
        assert_eq!(v.focused(), Some("b"));

        let mut v = viewer();
        v.request_focus("a");
        v.note_user_interaction();
        let token = v.begin_load(LoadOptions::default());
        v.element_start(token, &Element::new("svg")).unwrap();
        v.element_start(token, &circle(&g, "a")).unwrap();
        assert!(v.host().focused.is_empty());
    }

    #[test]
    fn errors_discard_the_session() {
        let mut v = viewer();
        let token = v.begin_load(LoadOptions::default());
        v.element_start(token, &Element::new("svg")).unwrap();
        let g = Rc::new(Element::new("g").with_attr("id", "c"));
        v.element_start(token, &circle(&g, "a")).unwrap();
        assert!(v.element_start(token, &circle(&g, "a")).is_err());

        assert_eq!(v.state(), LoadState::Failed);
        assert!(v.session().is_empty());
        // The failed pass accepts nothing further.
        v.element_start(token, &circle(&g, "z")).unwrap();
        assert_eq!(v.session().node_count(), 0);
    }

    #[test]
    fn dispose_stops_accepting_events() {
        let mut v = viewer();
        let token = v.begin_load(LoadOptions::default());
        v.element_start(token, &Element::new("svg")).unwrap();
        v.dispose();
        assert_eq!(v.state(), LoadState::Disposed);
        assert!(v.session().is_empty());
        v.element_start(token, &Element::new("svg")).unwrap();
        assert!(v.session().view_box().is_none());
    }

    #[test]
    fn finish_reports_done() {
        let mut v = viewer();
        let token = v.begin_load(LoadOptions::default());
        v.element_start(token, &Element::new("svg")).unwrap();
        let done = v.finish_load(token).unwrap();
        assert!(done.done);
        assert_eq!(v.state(), LoadState::Completed);
        assert_eq!(v.host().progress.last(), Some(&done));
    }

    #[test]
    fn drill_down_and_exit() {
        let mut v = viewer();
        let mut g: Graph<(), ()> = Graph::new();
        g.add_link("r", "a", ());
        assert_eq!(v.drill_down("r", &g).node_count(), 2);
        assert_eq!(v.subgraph().map(|(root, _)| root), Some("r"));
        assert!(v.exit_subgraph());
        assert!(!v.exit_subgraph());
    }
}

//! Callbacks into the surrounding renderer, search index and progress UI.

use crate::geom::ViewBox;
use crate::progress::Progress;
use crate::session::{BorderRecord, NodeRecord};

/// Receives ingestion output. Every method defaults to a no-op.
pub trait ViewHost {
    /// Frame the camera on the document's view box.
    fn frame_view_box(&mut self, _view_box: &ViewBox) {}

    fn request_frame(&mut self) {}

    fn add_border(&mut self, _border: &BorderRecord) {}

    fn add_node(&mut self, _node: &NodeRecord) {}

    fn register_search(&mut self, _name: &str, _sequence_id: usize) {}

    fn report_progress(&mut self, _progress: Progress) {}

    fn focus_node(&mut self, _node: &NodeRecord) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl ViewHost for NullHost {}

/// Records every callback; used by tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub framed: Vec<ViewBox>,
    pub frame_requests: usize,
    pub borders: Vec<BorderRecord>,
    pub nodes: Vec<NodeRecord>,
    pub search: Vec<(String, usize)>,
    pub progress: Vec<Progress>,
    pub focused: Vec<String>,
}

impl ViewHost for RecordingHost {
    fn frame_view_box(&mut self, view_box: &ViewBox) {
        self.framed.push(*view_box);
    }

    fn request_frame(&mut self) {
        self.frame_requests += 1;
    }

    fn add_border(&mut self, border: &BorderRecord) {
        self.borders.push(border.clone());
    }

    fn add_node(&mut self, node: &NodeRecord) {
        self.nodes.push(node.clone());
    }

    fn register_search(&mut self, name: &str, sequence_id: usize) {
        self.search.push((name.to_string(), sequence_id));
    }

    fn report_progress(&mut self, progress: Progress) {
        self.progress.push(progress);
    }

    fn focus_node(&mut self, node: &NodeRecord) {
        self.focused.push(node.name.clone());
    }
}

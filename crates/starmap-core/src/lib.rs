#![forbid(unsafe_code)]

//! Streaming SVG star-map ingestion (headless).
//!
//! Turns a pre-laid-out SVG map (cluster border paths plus node circles) into positioned node
//! and border records, derives per-cluster highlight colors, and answers focus and drill-down
//! queries against an externally supplied link graph.
//!
//! Design goals:
//! - one pass, append-only ingestion driven by document-order element events
//! - fail-fast on malformed documents; a failed pass leaves nothing behind
//! - pure, synchronous highlight and subgraph queries

pub mod attrs;
pub mod color;
pub mod config;
pub mod element;
pub mod error;
pub mod geom;
pub mod highlight;
pub mod host;
pub mod progress;
pub mod session;
pub mod shape;
pub mod stream;
pub mod subgraph;
pub mod transform;
pub mod viewer;

pub use config::StarmapConfig;
pub use element::{Element, SvgElement};
pub use error::{Error, Result};
pub use geom::{Point, Rgba, ViewBox};
pub use highlight::{HighlightView, HighlightedLink, HighlightedNode};
pub use host::{NullHost, RecordingHost, ViewHost};
pub use progress::{Debouncer, Progress};
pub use session::{BorderRecord, IngestSession, Ingested, NodeRecord};
pub use shape::{ShapeExtractor, SvgShapeExtractor};
pub use stream::{CancelFlag, ElementHandler, StreamOutcome, SvgStream};
pub use subgraph::{Subgraph, SubgraphLink, SubgraphNode, SubgraphSummary};
pub use viewer::{LoadOptions, LoadState, LoadToken, Viewer};

pub use starmap_graphlib::Graph;

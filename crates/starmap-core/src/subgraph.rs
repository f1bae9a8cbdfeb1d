//! Drill-down views: the induced subgraph over a root's 2-hop neighborhood.

use indexmap::IndexSet;
use serde::Serialize;
use starmap_graphlib::Graph;

use crate::geom::{Point, Rgba};
use crate::session::IngestSession;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphNode {
    pub is_root: bool,
    pub is_first_child: bool,
    /// Carried over from the ingested map when the node was drawn there.
    pub position: Option<Point>,
    pub color: Option<Rgba>,
    pub component_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphLink {
    pub is_root_level: bool,
}

pub type Subgraph = Graph<SubgraphNode, SubgraphLink>;

/// Serializable flat form of a [`Subgraph`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SubgraphSummary {
    pub root: String,
    pub nodes: Vec<SubgraphSummaryNode>,
    pub links: Vec<SubgraphSummaryLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphSummaryNode {
    pub id: String,
    #[serde(flatten)]
    pub data: SubgraphNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphSummaryLink {
    pub from: String,
    pub to: String,
    pub is_root_level: bool,
}

pub fn summarize(root: &str, subgraph: &Subgraph) -> SubgraphSummary {
    SubgraphSummary {
        root: root.to_string(),
        nodes: subgraph
            .nodes()
            .map(|(id, data)| SubgraphSummaryNode {
                id: id.to_string(),
                data: data.clone(),
            })
            .collect(),
        links: subgraph
            .links()
            .map(|l| SubgraphSummaryLink {
                from: l.from.to_string(),
                to: l.to.to_string(),
                is_root_level: l.data.is_root_level,
            })
            .collect(),
    }
}

fn node_data(session: &IngestSession, name: &str) -> SubgraphNode {
    match session.node(name) {
        Some(n) => SubgraphNode {
            position: Some(n.position),
            color: Some(n.color),
            component_id: Some(n.component_id.clone()),
            ..SubgraphNode::default()
        },
        None => SubgraphNode::default(),
    }
}

/// Extracts the subgraph induced by `root`, its neighbors, and their neighbors.
///
/// Returns an empty graph when `root` is not in `graph`. Links are de-duplicated regardless of
/// direction; the first direction seen is kept.
pub fn extract<N, E>(graph: &Graph<N, E>, session: &IngestSession, root: &str) -> Subgraph {
    let mut out = Subgraph::new();
    if !graph.has_node(root) {
        return out;
    }

    let first_hop: IndexSet<&str> = graph.neighbors(root).into_iter().collect();
    let mut closure: IndexSet<&str> = first_hop.clone();
    for &n in &first_hop {
        closure.extend(graph.neighbors(n));
    }

    out.add_node(
        root,
        SubgraphNode {
            is_root: true,
            ..node_data(session, root)
        },
    );

    for &n in &closure {
        if out.has_node(n) {
            continue;
        }
        out.add_node(
            n,
            SubgraphNode {
                is_first_child: graph.has_link_between(n, root),
                ..node_data(session, n)
            },
        );
    }

    for &n in &closure {
        graph.for_each_linked_node(n, |_, link| {
            let inside = |id: &str| id == root || closure.contains(id);
            if !inside(link.from) || !inside(link.to) {
                return;
            }
            if out.has_link_between(link.from, link.to) {
                return;
            }
            out.add_link(
                link.from,
                link.to,
                SubgraphLink {
                    is_root_level: link.touches(root),
                },
            );
        });
    }

    tracing::debug!(
        root,
        nodes = out.node_count(),
        links = out.link_count(),
        "subgraph extracted"
    );
    out
}

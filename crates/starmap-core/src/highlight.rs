//! Local (1-hop) highlight sets for a focused node.

use serde::Serialize;
use starmap_graphlib::Graph;

use crate::config::StarmapConfig;
use crate::geom::{Point, Rgba};
use crate::session::{IngestSession, NodeRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedNode {
    #[serde(flatten)]
    pub node: NodeRecord,
    pub highlight_color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedLink {
    pub source: String,
    pub target: String,
    pub from: Point,
    pub to: Point,
    pub color: Rgba,
    pub is_first_level: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HighlightView {
    pub nodes: Vec<HighlightedNode>,
    pub links: Vec<HighlightedLink>,
}

impl HighlightView {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Computes both highlight sets. Unknown names yield an empty view.
pub fn highlight<N, E>(
    session: &IngestSession,
    graph: &Graph<N, E>,
    name: &str,
    config: &StarmapConfig,
) -> HighlightView {
    HighlightView {
        nodes: highlighted_nodes(session, graph, name, config),
        links: highlighted_links(session, graph, name, config),
    }
}

/// The focused node followed by every node linked to it, in link order.
///
/// Neighbors are not de-duplicated beyond what the graph's adjacency yields; graph neighbors
/// that were never ingested have no position and are skipped.
pub fn highlighted_nodes<N, E>(
    session: &IngestSession,
    graph: &Graph<N, E>,
    name: &str,
    config: &StarmapConfig,
) -> Vec<HighlightedNode> {
    let Some(focused) = session.node(name) else {
        return Vec::new();
    };

    let mut out = vec![HighlightedNode {
        node: focused.clone(),
        highlight_color: config.primary_highlight_color,
    }];
    graph.for_each_linked_node(name, |other, _| {
        if let Some(node) = session.node(other) {
            out.push(HighlightedNode {
                node: node.clone(),
                highlight_color: config.secondary_highlight_color,
            });
        }
    });
    out
}

/// Links among the focused node's cluster members.
///
/// Links touching the focused node are always kept. Other links are capped at
/// `config.max_links` per source member and take the cluster's complementary color.
pub fn highlighted_links<N, E>(
    session: &IngestSession,
    graph: &Graph<N, E>,
    name: &str,
    config: &StarmapConfig,
) -> Vec<HighlightedLink> {
    let Some(focused) = session.node(name) else {
        return Vec::new();
    };
    let Some(members) = session.component_members(&focused.component_id) else {
        return Vec::new();
    };
    let secondary_color = session
        .cluster_complementary_color(&focused.component_id)
        .unwrap_or(config.secondary_highlight_color);

    let mut out = Vec::new();
    for member in members {
        let Some(source) = session.node(member) else {
            continue;
        };
        let mut emitted = 0usize;
        graph.for_each_linked_node(member, |other, _| {
            if !members.contains(other) {
                return;
            }
            let Some(target) = session.node(other) else {
                return;
            };
            let is_first_level = member == name || other == name;
            if !is_first_level {
                if emitted >= config.max_links {
                    return;
                }
                emitted += 1;
            }
            out.push(HighlightedLink {
                source: source.name.clone(),
                target: target.name.clone(),
                from: source.position,
                to: target.position,
                color: if is_first_level {
                    config.first_level_link_color
                } else {
                    secondary_color
                },
                is_first_level,
            });
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::shape::SvgShapeExtractor;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::rc::Rc;

    fn session_with(clusters: &[(&str, Vec<&str>)]) -> IngestSession {
        let cfg = StarmapConfig::default();
        let shapes = SvgShapeExtractor::default();
        let mut s = IngestSession::new();
        s.element_start(&Element::new("svg").with_attr("viewBox", "0 0 100 100"), &cfg, &shapes)
            .unwrap();
        for (cluster, names) in clusters {
            let g = Rc::new(Element::new("g").with_attr("id", *cluster));
            for (i, name) in names.iter().enumerate() {
                let el = Element::new("circle")
                    .with_attr("id", *name)
                    .with_attr("cx", i.to_string())
                    .with_attr("cy", "0")
                    .with_attr("r", "1")
                    .with_parent(g.clone());
                s.element_start(&el, &cfg, &shapes).unwrap();
            }
        }
        s
    }

    #[test]
    fn unknown_focus_is_empty() {
        let s = session_with(&[("c", vec!["a"])]);
        let g: Graph<(), ()> = Graph::new();
        assert!(highlight(&s, &g, "missing", &StarmapConfig::default()).is_empty());
    }

    #[test]
    fn isolated_node_highlights_only_itself() {
        let s = session_with(&[("c", vec!["a", "b"])]);
        let g: Graph<(), ()> = Graph::new();
        let cfg = StarmapConfig::default();
        let nodes = highlighted_nodes(&s, &g, "a", &cfg);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].node.name, "a");
        assert_eq!(nodes[0].highlight_color, cfg.primary_highlight_color);
        assert!(highlighted_links(&s, &g, "a", &cfg).is_empty());
    }

    #[test]
    fn neighbors_across_clusters_are_highlighted_in_link_order() {
        let s = session_with(&[("c1", vec!["a", "b"]), ("c2", vec!["x"])]);
        let mut g: Graph<(), ()> = Graph::new();
        g.add_link("x", "a", ());
        g.add_link("a", "b", ());
        g.add_link("a", "ghost", ());
        let cfg = StarmapConfig::default();

        let nodes = highlighted_nodes(&s, &g, "a", &cfg);
        let names: Vec<&str> = nodes.iter().map(|n| n.node.name.as_str()).collect();
        assert_eq!(names, vec!["a", "x", "b"]);
        assert!(
            nodes[1..]
                .iter()
                .all(|n| n.highlight_color == cfg.secondary_highlight_color)
        );
    }

    #[test]
    fn links_stay_inside_the_cluster() {
        let s = session_with(&[("c1", vec!["a", "b"]), ("c2", vec!["x"])]);
        let mut g: Graph<(), ()> = Graph::new();
        g.add_link("a", "b", ());
        g.add_link("a", "x", ());
        let cfg = StarmapConfig::default();

        let links = highlighted_links(&s, &g, "a", &cfg);
        assert!(links.iter().all(|l| l.source != "x" && l.target != "x"));
        // Seen once from each endpoint.
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.is_first_level));
        assert!(links.iter().all(|l| l.color == cfg.first_level_link_color));
    }

    #[test]
    fn secondary_links_are_capped_per_source() {
        let leaves: Vec<String> = (0..15).map(|i| format!("b{i}")).collect();
        let mut names: Vec<&str> = vec!["f", "a"];
        names.extend(leaves.iter().map(String::as_str));
        let s = session_with(&[("c", names)]);

        let mut g: Graph<(), ()> = Graph::new();
        for leaf in &leaves {
            g.add_link("a", leaf.as_str(), ());
        }
        g.add_link("a", "f", ());
        let cfg = StarmapConfig::default();

        let links = highlighted_links(&s, &g, "f", &cfg);
        let from_a: Vec<&HighlightedLink> = links.iter().filter(|l| l.source == "a").collect();
        // 10 capped secondary links plus the first-level link, which comes last in link order.
        assert_eq!(from_a.len(), 11);
        assert_eq!(from_a.iter().filter(|l| !l.is_first_level).count(), 10);
        assert!(from_a.last().unwrap().is_first_level);
        // Cluster has no border yet, so the configured secondary color is used.
        assert!(
            from_a
                .iter()
                .filter(|l| !l.is_first_level)
                .all(|l| l.color == cfg.secondary_highlight_color)
        );
    }

    #[test]
    fn secondary_links_use_cluster_complementary_color() {
        let cfg = StarmapConfig::default();
        let shapes = SvgShapeExtractor::default();
        let mut s = session_with(&[("c", vec!["f", "a", "b"])]);
        let border = Element::new("path")
            .with_attr("id", "c")
            .with_attr("fill", "#ffffff")
            .with_attr("d", "M0 0 L1 1");
        s.element_start(&border, &cfg, &shapes).unwrap();

        let mut g: Graph<(), ()> = Graph::new();
        g.add_link("a", "b", ());
        let links = highlighted_links(&s, &g, "f", &cfg);
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.color == Rgba(0xcccc_ccaa)));
    }

    proptest! {
        #[test]
        fn cap_holds_and_first_level_links_survive(
            edges in proptest::collection::vec((0usize..12, 0usize..12), 0..120),
            max_links in 0usize..4,
        ) {
            let names: Vec<String> = (0..12).map(|i| format!("n{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let s = session_with(&[("c", refs)]);
            let mut g: Graph<(), ()> = Graph::new();
            for (a, b) in &edges {
                if a != b {
                    g.add_link(names[*a].as_str(), names[*b].as_str(), ());
                }
            }
            let cfg = StarmapConfig { max_links, ..StarmapConfig::default() };
            let links = highlighted_links(&s, &g, "n0", &cfg);

            let mut secondary: HashMap<&str, usize> = HashMap::new();
            for l in links.iter().filter(|l| !l.is_first_level) {
                *secondary.entry(l.source.as_str()).or_default() += 1;
            }
            prop_assert!(secondary.values().all(|&c| c <= max_links));

            let first_level = links.iter().filter(|l| l.is_first_level).count();
            // Every link touching n0 is seen once from each endpoint.
            prop_assert_eq!(first_level, 2 * g.degree("n0"));
        }
    }
}

//! Ingestion session state and the element state machine.
//!
//! An [`IngestSession`] exclusively owns everything one pass over a document produces: the
//! view box, the transform stack, node and border records, and the cluster indices. It is
//! reset as a whole when a new document is loaded.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::attrs::{numeric_attribute, parse_view_box, text_attribute};
use crate::color::complementary_with_alpha;
use crate::config::StarmapConfig;
use crate::element::SvgElement;
use crate::error::{Error, Result};
use crate::geom::{Point, Rgba, ViewBox, point};
use crate::shape::ShapeExtractor;
use crate::transform::TransformStack;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub name: String,
    pub component_id: String,
    pub position: Point,
    pub color: Rgba,
    pub size: f64,
    pub sequence_id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderRecord {
    pub points: Vec<Point>,
    pub fill_color: Rgba,
    pub cluster_id: String,
}

/// What a single element event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    ViewBox,
    /// Index into [`IngestSession::borders`].
    Border(usize),
    /// Sequence id of the new node.
    Node(usize),
    TransformPushed,
    TransformPopped,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Root,
    Border,
    Node,
    Other,
}

fn classify(tag: &str) -> ElementKind {
    match tag {
        "svg" => ElementKind::Root,
        "path" => ElementKind::Border,
        "circle" => ElementKind::Node,
        _ => ElementKind::Other,
    }
}

fn node_name(raw_id: &str) -> &str {
    raw_id.strip_prefix('_').unwrap_or(raw_id)
}

fn cluster_id(raw_id: &str) -> &str {
    raw_id
        .strip_prefix('#')
        .or_else(|| raw_id.strip_prefix('_'))
        .unwrap_or(raw_id)
}

#[derive(Debug, Clone, Default)]
pub struct IngestSession {
    view_box: Option<ViewBox>,
    transforms: TransformStack,
    nodes: IndexMap<String, NodeRecord>,
    borders: Vec<BorderRecord>,
    nodes_by_component: IndexMap<String, IndexSet<String>>,
    cluster_fill_color: FxHashMap<String, Rgba>,
    cluster_complementary_color: FxHashMap<String, Rgba>,
}

impl IngestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every record and index.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.view_box.is_none()
            && self.nodes.is_empty()
            && self.borders.is_empty()
            && self.nodes_by_component.is_empty()
            && self.cluster_fill_color.is_empty()
    }

    pub fn view_box(&self) -> Option<ViewBox> {
        self.view_box
    }

    pub fn transform_depth(&self) -> usize {
        self.transforms.depth()
    }

    pub fn node(&self, name: &str) -> Option<&NodeRecord> {
        self.nodes.get(name)
    }

    pub fn node_by_sequence(&self, sequence_id: usize) -> Option<&NodeRecord> {
        self.nodes.get_index(sequence_id).map(|(_, n)| n)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn borders(&self) -> &[BorderRecord] {
        &self.borders
    }

    pub fn component_members(&self, component_id: &str) -> Option<&IndexSet<String>> {
        self.nodes_by_component.get(component_id)
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.nodes_by_component.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct clusters seen, from either member nodes or borders.
    pub fn cluster_count(&self) -> usize {
        let colored_only = self
            .cluster_fill_color
            .keys()
            .filter(|k| !self.nodes_by_component.contains_key(k.as_str()))
            .count();
        self.nodes_by_component.len() + colored_only
    }

    pub fn cluster_fill_color(&self, cluster_id: &str) -> Option<Rgba> {
        self.cluster_fill_color.get(cluster_id).copied()
    }

    pub fn cluster_complementary_color(&self, cluster_id: &str) -> Option<Rgba> {
        self.cluster_complementary_color.get(cluster_id).copied()
    }

    fn resolve_point(&mut self, x: f64, y: f64) -> Result<Point> {
        let view_box = self.view_box.ok_or(Error::MissingViewBox)?;
        let (x, y, _) = self.transforms.resolve(x, view_box.transform_y(y));
        Ok(point(x, y))
    }

    pub fn element_start(
        &mut self,
        el: &dyn SvgElement,
        config: &StarmapConfig,
        shapes: &dyn ShapeExtractor,
    ) -> Result<Ingested> {
        match classify(el.tag_name()) {
            ElementKind::Root => self.ingest_root(el, config),
            ElementKind::Border => self.ingest_border(el, config, shapes),
            ElementKind::Node => self.ingest_node(el, config, shapes),
            ElementKind::Other => match el.attribute("transform") {
                Some(raw) => {
                    self.transforms.push(raw)?;
                    Ok(Ingested::TransformPushed)
                }
                None => Ok(Ingested::Ignored),
            },
        }
    }

    pub fn element_end(&mut self, el: &dyn SvgElement) -> Result<Ingested> {
        if classify(el.tag_name()) != ElementKind::Other || el.attribute("transform").is_none() {
            return Ok(Ingested::Ignored);
        }
        self.transforms.pop()?;
        Ok(Ingested::TransformPopped)
    }

    fn ingest_root(&mut self, el: &dyn SvgElement, config: &StarmapConfig) -> Result<Ingested> {
        if self.view_box.is_some() {
            // Nested <svg> elements do not redefine the map window.
            tracing::debug!("ignoring nested root element");
            return Ok(Ingested::Ignored);
        }
        let view_box = match el.attribute("viewBox") {
            Some(raw) => parse_view_box(raw)?,
            None => config.default_view_box(),
        };
        tracing::debug!(?view_box, "view box set");
        self.view_box = Some(view_box);
        Ok(Ingested::ViewBox)
    }

    fn ingest_border(
        &mut self,
        el: &dyn SvgElement,
        config: &StarmapConfig,
        shapes: &dyn ShapeExtractor,
    ) -> Result<Ingested> {
        let cluster = cluster_id(text_attribute(el, "id")).to_string();
        let fill_color = shapes
            .fill_color(el)?
            .ok_or_else(|| Error::InvalidFillColor {
                element: el.tag_name().to_string(),
                id: cluster.clone(),
                raw: String::new(),
            })?;

        let raw_points = shapes.border_points(el)?;
        let mut points = Vec::with_capacity(raw_points.len());
        for p in raw_points {
            points.push(self.resolve_point(p.x, p.y)?);
        }

        if self.cluster_fill_color.contains_key(&cluster) {
            tracing::warn!(cluster = %cluster, "cluster already colored; keeping the first fill");
        } else {
            let complementary = complementary_with_alpha(fill_color, config.complementary_alpha);
            tracing::debug!(
                cluster = %cluster,
                fill = %fill_color.to_css_hex(),
                complementary = %complementary.to_css_hex(),
                "cluster colored"
            );
            self.cluster_fill_color.insert(cluster.clone(), fill_color);
            self.cluster_complementary_color
                .insert(cluster.clone(), complementary);
        }

        self.borders.push(BorderRecord {
            points,
            fill_color,
            cluster_id: cluster,
        });
        Ok(Ingested::Border(self.borders.len() - 1))
    }

    fn ingest_node(
        &mut self,
        el: &dyn SvgElement,
        config: &StarmapConfig,
        shapes: &dyn ShapeExtractor,
    ) -> Result<Ingested> {
        let cx = numeric_attribute(el, "cx")?;
        let cy = numeric_attribute(el, "cy")?;
        let r = numeric_attribute(el, "r")?;

        let name = node_name(text_attribute(el, "id"));
        if self.nodes.contains_key(name) {
            return Err(Error::DuplicateNodeName {
                name: name.to_string(),
            });
        }
        let name = name.to_string();

        let position = self.resolve_point(cx, cy)?;
        let component_id = el.parent_attribute("id").unwrap_or_default().to_string();
        let color = match shapes.fill_color(el) {
            Ok(Some(c)) => c,
            Ok(None) => config.node_color,
            Err(err) => {
                tracing::debug!(node = %name, %err, "unusable node fill; using default color");
                config.node_color
            }
        };

        self.nodes_by_component
            .entry(component_id.clone())
            .or_default()
            .insert(name.clone());

        let sequence_id = self.nodes.len();
        tracing::trace!(node = %name, component = %component_id, sequence_id, "node ingested");
        self.nodes.insert(
            name.clone(),
            NodeRecord {
                name,
                component_id,
                position,
                color,
                size: r * config.node_size_scale,
                sequence_id,
            },
        );
        Ok(Ingested::Node(sequence_id))
    }
}

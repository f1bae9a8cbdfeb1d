use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geom::{Rgba, ViewBox};

/// Viewer configuration.
///
/// Every field has a default, so partial JSON documents are merged over [`StarmapConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarmapConfig {
    /// Cap on secondary (non first-level) highlight links emitted per source node.
    pub max_links: usize,
    /// `[left, top, width, height]` used when the root element has no `viewBox`.
    pub default_view_box: [f64; 4],
    pub progress_interval_ms: u64,
    pub primary_highlight_color: Rgba,
    pub secondary_highlight_color: Rgba,
    pub first_level_link_color: Rgba,
    pub complementary_alpha: u8,
    /// Color for circles without a usable fill.
    pub node_color: Rgba,
    /// Multiplier applied to a circle's `r` to produce the node size.
    pub node_size_scale: f64,
}

impl Default for StarmapConfig {
    fn default() -> Self {
        Self {
            max_links: 10,
            default_view_box: [0.0, 0.0, 1024.0, 1024.0],
            progress_interval_ms: 100,
            primary_highlight_color: Rgba(0xbfee_5cff),
            secondary_highlight_color: Rgba(0xffd6_0aff),
            first_level_link_color: Rgba(0xffff_ffff),
            complementary_alpha: crate::color::COMPLEMENTARY_ALPHA,
            node_color: Rgba(0xffff_ffff),
            node_size_scale: 1.0,
        }
    }
}

impl StarmapConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn default_view_box(&self) -> ViewBox {
        ViewBox::from_array(self.default_view_box)
    }

    pub fn progress_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.progress_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn partial_documents_keep_defaults() {
        let cfg = StarmapConfig::from_json_str(r#"{ "maxLinks": 3, "nodeSizeScale": 2.5 }"#).unwrap();
        assert_eq!(cfg.max_links, 3);
        assert_eq!(cfg.node_size_scale, 2.5);
        assert_eq!(cfg.progress_interval_ms, 100);
        assert_eq!(cfg.default_view_box(), ViewBox::default());
    }

    #[test]
    fn colors_are_packed_integers() {
        let cfg = StarmapConfig::from_value(json!({ "firstLevelLinkColor": 0x11223344u32 })).unwrap();
        assert_eq!(cfg.first_level_link_color, Rgba::new(0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = StarmapConfig::from_json_str(r#"{ "maxLinks": "ten" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

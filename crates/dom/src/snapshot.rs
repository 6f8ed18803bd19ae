//! Document snapshot loading
//!
//! Builds a [`DomArena`] from a JSON description of a laid-out document:
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "root": {
//!     "nodeType": 9,
//!     "nodeName": "#document",
//!     "children": [{
//!       "nodeType": 1,
//!       "nodeName": "HTML",
//!       "rect": { "x": 0, "y": 0, "width": 800, "height": 600 },
//!       "scroll": { "scrollTop": 0, "scrollHeight": 2000, "clientHeight": 600 },
//!       "style": { "overflow-y": "auto" },
//!       "attributes": { "id": "app", "class": "a b" },
//!       "children": [...]
//!     }]
//!   }
//! }
//! ```

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, DomRect, NodeId, NodeType, ScrollMetrics, Viewport};
use ahash::AHashMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    viewport: Viewport,
    root: SnapshotNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotNode {
    node_type: u8,
    #[serde(default)]
    node_name: String,
    #[serde(default)]
    node_value: String,
    #[serde(default)]
    attributes: AHashMap<String, String>,
    #[serde(default)]
    style: AHashMap<String, String>,
    #[serde(default)]
    rect: Option<DomRect>,
    #[serde(default)]
    scroll: Option<ScrollMetrics>,
    #[serde(default)]
    children: Vec<SnapshotNode>,
}

/// Parse a snapshot from a JSON string
pub fn parse_snapshot_str(json: &str) -> Result<DomArena> {
    let value: Value = serde_json::from_str(json)?;
    parse_snapshot(&value)
}

/// Parse a snapshot value; the root must be a document node
pub fn parse_snapshot(value: &Value) -> Result<DomArena> {
    let snapshot = SnapshotDocument::deserialize(value)?;

    if NodeType::from_u8(snapshot.root.node_type) != Some(NodeType::Document) {
        return Err(DomError::InvalidNodeType {
            expected: "Document".to_string(),
            actual: format!("{}", snapshot.root.node_type),
        });
    }

    let mut arena = DomArena::new();
    arena.set_viewport(snapshot.viewport);

    // Explicit stack: pre-order, children pushed in reverse so they are
    // appended left-to-right
    let mut stack: Vec<(&SnapshotNode, Option<NodeId>)> = vec![(&snapshot.root, None)];
    while let Some((raw, parent_id)) = stack.pop() {
        let node_id = arena.add_node(build_node(raw)?);

        match parent_id {
            Some(parent_id) => arena.append_child(parent_id, node_id)?,
            None => arena.set_root(node_id)?,
        }

        for child in raw.children.iter().rev() {
            stack.push((child, Some(node_id)));
        }
    }

    tracing::debug!(nodes = arena.len(), "loaded document snapshot");
    Ok(arena)
}

fn build_node(raw: &SnapshotNode) -> Result<DomNode> {
    let node_type = NodeType::from_u8(raw.node_type).ok_or_else(|| DomError::InvalidNodeType {
        expected: "valid NodeType".to_string(),
        actual: format!("{}", raw.node_type),
    })?;

    let node_name = match node_type {
        NodeType::Element if raw.node_name.is_empty() => {
            return Err(DomError::Snapshot("element without nodeName".to_string()));
        }
        NodeType::Element => raw.node_name.to_ascii_uppercase(),
        _ => raw.node_name.clone(),
    };

    let mut node = DomNode::new(node_type, node_name);
    node.node_value = raw.node_value.clone();
    node.attributes = raw.attributes.clone();
    node.computed_styles = raw.style.clone();
    node.rect = raw.rect.unwrap_or_default();
    node.scroll = raw.scroll.unwrap_or_default();
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::scroll_parent;

    fn sample() -> Value {
        serde_json::json!({
            "viewport": { "width": 800, "height": 600 },
            "root": {
                "nodeType": 9,
                "nodeName": "#document",
                "children": [{
                    "nodeType": 1,
                    "nodeName": "html",
                    "scroll": { "scrollHeight": 600, "clientHeight": 600 },
                    "children": [
                        { "nodeType": 1, "nodeName": "head" },
                        {
                            "nodeType": 1,
                            "nodeName": "body",
                            "children": [{
                                "nodeType": 1,
                                "nodeName": "div",
                                "attributes": { "id": "list" },
                                "style": { "overflow-y": "scroll" },
                                "rect": { "x": 0, "y": 100, "width": 300, "height": 200 },
                                "scroll": { "scrollHeight": 1200, "clientHeight": 200 },
                                "children": [
                                    { "nodeType": 1, "nodeName": "p", "attributes": { "id": "first" } },
                                    { "nodeType": 3, "nodeName": "#text", "nodeValue": "hello" },
                                    { "nodeType": 1, "nodeName": "p", "attributes": { "id": "last" } }
                                ]
                            }]
                        }
                    ]
                }]
            }
        })
    }

    #[test]
    fn test_parse_snapshot_structure() {
        let arena = parse_snapshot(&sample()).unwrap();

        assert_eq!(arena.len(), 8);
        assert_eq!(arena.viewport().width, 800.0);
        assert!(arena.body().is_some());

        let list = arena.find_by_id("list", None).unwrap();
        let names: Vec<String> = arena
            .children(list)
            .unwrap()
            .iter()
            .map(|node| node.node_name.clone())
            .collect();
        assert_eq!(names, vec!["P", "#text", "P"]);
    }

    #[test]
    fn test_snapshot_feeds_scroll_resolution() {
        let arena = parse_snapshot(&sample()).unwrap();
        let list = arena.find_by_id("list", None).unwrap();
        let last = arena.find_by_id("last", None).unwrap();
        assert_eq!(scroll_parent(&arena, last), Some(list));
    }

    #[test]
    fn test_parse_snapshot_rejects_bad_root() {
        let err = parse_snapshot_str(r#"{ "root": { "nodeType": 1, "nodeName": "div" } }"#)
            .unwrap_err();
        assert!(matches!(err, DomError::InvalidNodeType { .. }));

        let err = parse_snapshot_str("not json").unwrap_err();
        assert!(matches!(err, DomError::Parse(_)));

        let err = parse_snapshot_str(
            r#"{ "root": { "nodeType": 9, "children": [{ "nodeType": 42 }] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomError::InvalidNodeType { .. }));
    }
}

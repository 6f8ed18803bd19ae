//! Core type definitions for the document tree
//!
//! Key design principles:
//! 1. Use u32 for node handles (index into the arena, not a pointer)
//! 2. Use SmallVec for child lists (most nodes have a handful of children)
//! 3. Geometry is viewport-relative, the way the host reports it

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node handle (index into arena)
/// u32 allows 4 billion nodes, enough for any document
pub type NodeId = u32;

/// Node type matching DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }
}

/// Rectangle with coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Check if rectangle intersects with another
    pub fn intersects(&self, other: &DomRect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Check if `other` lies entirely within this rectangle
    pub fn contains_rect(&self, other: &DomRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Apply offset (scrolling moves content by the negated delta)
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Vertical scroll state of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    /// Full content height
    pub scroll_height: f64,
    /// Visible height
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top: 0.0,
            scroll_height,
            client_height,
        }
    }

    /// Content taller than the box, so there is something to scroll
    pub fn overflows(&self) -> bool {
        self.scroll_height > self.client_height
    }

    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// Window viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Visible area in viewport coordinates
    pub fn rect(&self) -> DomRect {
        DomRect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

/// The main tree node structure
///
/// Design philosophy:
/// - Use indices instead of pointers
/// - Parent link is the only upward edge; walks are iterative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    pub node_name: String,
    pub node_value: String,
    pub attributes: AHashMap<String, String>,

    /// Computed CSS styles
    pub computed_styles: AHashMap<String, String>,

    /// Bounding box in viewport coordinates
    pub rect: DomRect,
    pub scroll: ScrollMetrics,
}

impl DomNode {
    /// Create a new node; the arena assigns `node_id` on insertion
    pub fn new(node_type: NodeType, node_name: impl Into<String>) -> Self {
        Self {
            node_id: 0,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: node_name.into(),
            node_value: String::new(),
            attributes: AHashMap::new(),
            computed_styles: AHashMap::new(),
            rect: DomRect::zero(),
            scroll: ScrollMetrics::default(),
        }
    }

    pub fn element(tag: &str) -> Self {
        Self::new(NodeType::Element, tag.to_ascii_uppercase())
    }

    pub fn text(value: impl Into<String>) -> Self {
        let mut node = Self::new(NodeType::Text, "#text");
        node.node_value = value.into();
        node
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Get computed style value
    pub fn style(&self, property: &str) -> Option<&str> {
        self.computed_styles.get(property).map(|s| s.as_str())
    }

    /// Element `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Tokens of the `class` attribute, in attribute order
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }
}

/// Child-list change record
///
/// One record per insertion or removal, like a platform mutation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Parent whose child list changed
    pub target: NodeId,
    pub added_nodes: SmallVec<[NodeId; 2]>,
    pub removed_nodes: SmallVec<[NodeId; 2]>,
}

impl MutationRecord {
    pub fn added(target: NodeId, node: NodeId) -> Self {
        let mut added_nodes = SmallVec::new();
        added_nodes.push(node);
        Self {
            target,
            added_nodes,
            removed_nodes: SmallVec::new(),
        }
    }

    pub fn removed(target: NodeId, node: NodeId) -> Self {
        let mut removed_nodes = SmallVec::new();
        removed_nodes.push(node);
        Self {
            target,
            added_nodes: SmallVec::new(),
            removed_nodes,
        }
    }
}

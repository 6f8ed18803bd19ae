//! Arena-based document tree storage
//!
//! This arena eliminates:
//! - Rc/Arc overhead per node
//! - Recursive function calls (stack overflow risk on deep trees)
//! - Cycles between parent and child handles
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Detached nodes stay in the arena. A handle held by application code keeps
//! answering queries after its node leaves the tree, it just stops being
//! reachable from the root.

use crate::error::{DomError, Result};
use crate::types::{DomNode, DomRect, MutationRecord, NodeId, NodeType, ScrollMetrics, Viewport};

/// Arena allocator for document nodes
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially
    nodes: Vec<DomNode>,

    /// Document node (if set)
    root_id: Option<NodeId>,

    viewport: Viewport,

    /// Subtree watched for child-list changes
    observed_root: Option<NodeId>,

    /// Records not yet taken by the observer
    pending_records: Vec<MutationRecord>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(1024) // Pre-allocate for typical page
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
            viewport: Viewport::default(),
            observed_root: None,
            pending_records: Vec::new(),
        }
    }

    /// Create a minimal document: `#document > HTML > (HEAD, BODY)`
    ///
    /// The document element scrolls the window, so its metrics start out
    /// matching the viewport.
    pub fn with_document(viewport: Viewport) -> Self {
        let mut arena = Self::new();
        arena.viewport = viewport;

        let document = arena.add_node(DomNode::new(NodeType::Document, "#document"));
        let html = arena.create_element("html");
        let head = arena.create_element("head");
        let body = arena.create_element("body");

        // Fresh nodes, no cycles possible
        for (parent, child) in [(document, html), (html, head), (html, body)] {
            arena.link(parent, child);
        }
        arena.root_id = Some(document);

        if let Some(node) = arena.nodes.get_mut(html as usize) {
            node.rect = viewport.rect();
            node.scroll = ScrollMetrics::new(viewport.height, viewport.height);
        }
        if let Some(node) = arena.nodes.get_mut(body as usize) {
            node.rect = viewport.rect();
        }

        arena
    }

    /// Add a node to the arena, returns its ID
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.nodes.push(node);
        node_id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.add_node(DomNode::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.add_node(DomNode::text(text))
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Get root node
    pub fn root(&self) -> Result<&DomNode> {
        let root_id = self.root_id.ok_or(DomError::NoRoot)?;
        self.get(root_id)
    }

    /// First element child of the document node (`<html>`)
    pub fn document_element(&self) -> Option<NodeId> {
        let root = self.root().ok()?;
        root.children_ids
            .iter()
            .copied()
            .find(|&id| self.get(id).is_ok_and(DomNode::is_element))
    }

    /// `<body>` child of the document element
    pub fn body(&self) -> Option<NodeId> {
        let html = self.get(self.document_element()?).ok()?;
        html.children_ids.iter().copied().find(|&id| {
            self.get(id)
                .is_ok_and(|node| node.tag_name() == Some("BODY"))
        })
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Walk parent links upward, excluding `node_id` itself
    pub fn ancestors(&self, node_id: NodeId) -> Ancestors<'_> {
        let next = self.get(node_id).ok().and_then(|node| node.parent_id);
        Ancestors { arena: self, next }
    }

    /// Pre-order walk of the subtree below `node_id`, excluding itself
    ///
    /// Iterative: explicit stack, children visited left-to-right.
    pub fn descendants(&self, node_id: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        if let Ok(node) = self.get(node_id) {
            stack.extend(node.children_ids.iter().rev().copied());
        }
        Descendants { arena: self, stack }
    }

    /// Inclusive containment: `node_id` is `ancestor_id` or below it
    pub fn contains(&self, ancestor_id: NodeId, node_id: NodeId) -> bool {
        if self.get(node_id).is_err() {
            return false;
        }
        node_id == ancestor_id || self.ancestors(node_id).any(|id| id == ancestor_id)
    }

    /// Whether the node is reachable from the document root
    pub fn is_attached(&self, node_id: NodeId) -> bool {
        match self.root_id {
            Some(root_id) => self.contains(root_id, node_id),
            None => false,
        }
    }

    /// Append `child` to `parent`, detaching it from its old parent first
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        self.get(parent_id)?;
        self.get(child_id)?;

        if self.contains(child_id, parent_id) {
            return Err(DomError::HierarchyRequest {
                parent: parent_id,
                child: child_id,
            });
        }

        self.detach(child_id)?;
        self.link(parent_id, child_id);
        self.record(MutationRecord::added(parent_id, child_id));
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        let parent = self.get_mut(parent_id)?;
        let Some(pos) = parent.children_ids.iter().position(|&id| id == child_id) else {
            return Err(DomError::NodeNotFound(child_id));
        };
        parent.children_ids.remove(pos);
        self.get_mut(child_id)?.parent_id = None;
        self.record(MutationRecord::removed(parent_id, child_id));
        Ok(())
    }

    /// Remove a node from its parent, if it has one
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        match self.get(node_id)?.parent_id {
            Some(parent_id) => self.remove_child(parent_id, node_id),
            None => Ok(()),
        }
    }

    /// Set a single computed style property
    pub fn set_style(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        self.get_mut(node_id)?
            .computed_styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        self.get_mut(node_id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_rect(&mut self, node_id: NodeId, rect: DomRect) -> Result<()> {
        self.get_mut(node_id)?.rect = rect;
        Ok(())
    }

    pub fn set_scroll_metrics(&mut self, node_id: NodeId, metrics: ScrollMetrics) -> Result<()> {
        self.get_mut(node_id)?.scroll = metrics;
        Ok(())
    }

    /// Scroll a node vertically, returns the applied (clamped) offset
    ///
    /// Descendant rects move by the applied delta. Scrolling the document
    /// element scrolls the window, so the element itself moves too and the
    /// viewport scroll position follows.
    pub fn set_scroll_top(&mut self, node_id: NodeId, value: f64) -> Result<f64> {
        let node = self.get_mut(node_id)?;
        let applied = value.clamp(0.0, node.scroll.max_scroll_top());
        let delta = applied - node.scroll.scroll_top;
        node.scroll.scroll_top = applied;

        if delta == 0.0 {
            return Ok(applied);
        }

        let moved: Vec<NodeId> = self.descendants(node_id).collect();
        for id in moved {
            if let Some(node) = self.nodes.get_mut(id as usize) {
                node.rect = node.rect.offset(0.0, -delta);
            }
        }

        if self.document_element() == Some(node_id) {
            self.viewport.scroll_y = applied;
            if let Some(node) = self.nodes.get_mut(node_id as usize) {
                node.rect = node.rect.offset(0.0, -delta);
            }
        }

        Ok(applied)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Find element by `id` attribute
    ///
    /// Without a scope: first attached element in document order.
    /// With a scope: only descendants of `scope` are considered.
    pub fn find_by_id(&self, id: &str, scope: Option<NodeId>) -> Option<NodeId> {
        let start = match scope {
            Some(scope_id) => scope_id,
            None => self.root_id?,
        };
        self.descendants(start).find(|&node_id| {
            self.get(node_id)
                .is_ok_and(|node| node.is_element() && node.id() == Some(id))
        })
    }

    /// Start recording child-list changes within `root_id`'s subtree
    pub fn observe(&mut self, root_id: NodeId) -> Result<()> {
        self.get(root_id)?;
        self.observed_root = Some(root_id);
        self.pending_records.clear();
        Ok(())
    }

    /// Stop recording and drop undelivered records
    pub fn disconnect_observer(&mut self) {
        self.observed_root = None;
        self.pending_records.clear();
    }

    pub fn is_observed(&self) -> bool {
        self.observed_root.is_some()
    }

    /// Drain records collected since the last call
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending_records)
    }

    fn link(&mut self, parent_id: NodeId, child_id: NodeId) {
        if let Some(child) = self.nodes.get_mut(child_id as usize) {
            child.parent_id = Some(parent_id);
        }
        if let Some(parent) = self.nodes.get_mut(parent_id as usize) {
            parent.children_ids.push(child_id);
        }
    }

    fn record(&mut self, record: MutationRecord) {
        let Some(observed) = self.observed_root else {
            return;
        };
        if self.contains(observed, record.target) {
            self.pending_records.push(record);
        }
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`DomArena::ancestors`]
pub struct Ancestors<'a> {
    arena: &'a DomArena,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.arena.get(current).ok().and_then(|node| node.parent_id);
        Some(current)
    }
}

/// Iterator returned by [`DomArena::descendants`]
pub struct Descendants<'a> {
    arena: &'a DomArena,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        if let Ok(node) = self.arena.get(current) {
            // Push children in reverse order (so they're visited left-to-right)
            self.stack.extend(node.children_ids.iter().rev().copied());
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> (DomArena, NodeId) {
        let arena = DomArena::with_document(Viewport::new(800.0, 600.0));
        let body = arena.body().unwrap();
        (arena, body)
    }

    #[test]
    fn test_document_skeleton() {
        let (arena, body) = document();

        let html = arena.document_element().unwrap();
        assert_eq!(arena.get(html).unwrap().tag_name(), Some("HTML"));
        assert_eq!(arena.get(body).unwrap().tag_name(), Some("BODY"));
        assert_eq!(arena.root().unwrap().node_type, NodeType::Document);
        assert!(arena.is_attached(body));
    }

    #[test]
    fn test_text_nodes_never_match_lookup() {
        let (mut arena, body) = document();
        let text = arena.create_text("hello");
        arena.append_child(body, text).unwrap();
        arena.set_attribute(text, "id", "greeting").unwrap();

        let node = arena.get(text).unwrap();
        assert_eq!(node.node_type, NodeType::Text);
        assert_eq!(node.node_value, "hello");
        assert!(arena.is_attached(text));
        assert_eq!(arena.find_by_id("greeting", None), None);
    }

    #[test]
    fn test_append_and_detach() {
        let (mut arena, body) = document();
        let div = arena.create_element("div");
        let span = arena.create_element("span");

        assert!(!arena.is_attached(div));
        arena.append_child(body, div).unwrap();
        arena.append_child(div, span).unwrap();
        assert!(arena.is_attached(span));

        // Removing an ancestor detaches the whole subtree
        arena.detach(div).unwrap();
        assert!(!arena.is_attached(span));
        assert!(arena.contains(div, span));
        assert!(arena.get(div).unwrap().parent_id.is_none());
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (mut arena, body) = document();
        let outer = arena.create_element("div");
        let inner = arena.create_element("div");
        arena.append_child(body, outer).unwrap();
        arena.append_child(outer, inner).unwrap();

        let err = arena.append_child(inner, outer).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));
        assert!(matches!(
            arena.append_child(outer, outer),
            Err(DomError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn test_reparent_moves_node() {
        let (mut arena, body) = document();
        let a = arena.create_element("div");
        let b = arena.create_element("div");
        let item = arena.create_element("p");
        arena.append_child(body, a).unwrap();
        arena.append_child(body, b).unwrap();
        arena.append_child(a, item).unwrap();

        arena.append_child(b, item).unwrap();
        assert!(arena.get(a).unwrap().children_ids.is_empty());
        assert_eq!(arena.get(b).unwrap().children_ids.as_slice(), &[item]);
    }

    #[test]
    fn test_descendants_document_order() {
        let (mut arena, body) = document();
        let first = arena.create_element("ul");
        let item1 = arena.create_element("li");
        let item2 = arena.create_element("li");
        let second = arena.create_element("p");
        arena.append_child(body, first).unwrap();
        arena.append_child(first, item1).unwrap();
        arena.append_child(first, item2).unwrap();
        arena.append_child(body, second).unwrap();

        let order: Vec<NodeId> = arena.descendants(body).collect();
        assert_eq!(order, vec![first, item1, item2, second]);
    }

    #[test]
    fn test_ancestors_walk() {
        let (mut arena, body) = document();
        let div = arena.create_element("div");
        arena.append_child(body, div).unwrap();

        let chain: Vec<NodeId> = arena.ancestors(div).collect();
        assert_eq!(
            chain,
            vec![body, arena.document_element().unwrap(), arena.root_id().unwrap()]
        );
    }

    #[test]
    fn test_records_only_when_observed() {
        let (mut arena, body) = document();
        let div = arena.create_element("div");
        arena.append_child(body, div).unwrap();
        assert!(arena.take_records().is_empty());

        arena.observe(arena.root_id().unwrap()).unwrap();
        arena.detach(div).unwrap();
        let records = arena.take_records();
        assert_eq!(records, vec![MutationRecord::removed(body, div)]);
        assert!(arena.take_records().is_empty());

        arena.disconnect_observer();
        arena.append_child(body, div).unwrap();
        assert!(arena.take_records().is_empty());
    }

    #[test]
    fn test_records_scoped_to_observed_subtree() {
        let (mut arena, body) = document();
        let watched = arena.create_element("section");
        let other = arena.create_element("aside");
        arena.append_child(body, watched).unwrap();
        arena.append_child(body, other).unwrap();
        arena.observe(watched).unwrap();

        let inside = arena.create_element("p");
        let outside = arena.create_element("p");
        arena.append_child(watched, inside).unwrap();
        arena.append_child(other, outside).unwrap();

        assert_eq!(
            arena.take_records(),
            vec![MutationRecord::added(watched, inside)]
        );
    }

    #[test]
    fn test_find_by_id_scoped() {
        let (mut arena, body) = document();
        let first = arena.create_element("div");
        let second = arena.create_element("div");
        let dup_a = arena.create_element("span");
        let dup_b = arena.create_element("span");
        arena.append_child(body, first).unwrap();
        arena.append_child(body, second).unwrap();
        arena.append_child(first, dup_a).unwrap();
        arena.append_child(second, dup_b).unwrap();
        arena.set_attribute(dup_a, "id", "foo").unwrap();
        arena.set_attribute(dup_b, "id", "foo").unwrap();

        assert_eq!(arena.find_by_id("foo", None), Some(dup_a));
        assert_eq!(arena.find_by_id("foo", Some(second)), Some(dup_b));
        assert_eq!(arena.find_by_id("foo", Some(dup_b)), None);
        assert_eq!(arena.find_by_id("missing", None), None);
    }

    #[test]
    fn test_find_by_id_ignores_detached() {
        let (mut arena, body) = document();
        let div = arena.create_element("div");
        arena.set_attribute(div, "id", "gone").unwrap();
        arena.append_child(body, div).unwrap();
        arena.detach(div).unwrap();

        assert_eq!(arena.find_by_id("gone", None), None);
    }

    #[test]
    fn test_set_scroll_top_clamps_and_shifts() {
        let (mut arena, body) = document();
        let list = arena.create_element("div");
        let item = arena.create_element("div");
        arena.append_child(body, list).unwrap();
        arena.append_child(list, item).unwrap();
        arena
            .set_scroll_metrics(list, ScrollMetrics::new(1000.0, 200.0))
            .unwrap();
        arena
            .set_rect(item, DomRect::new(0.0, 500.0, 100.0, 20.0))
            .unwrap();

        assert_eq!(arena.set_scroll_top(list, 300.0).unwrap(), 300.0);
        assert_eq!(arena.get(item).unwrap().rect.y, 200.0);

        assert_eq!(arena.set_scroll_top(list, 5000.0).unwrap(), 800.0);
        assert_eq!(arena.set_scroll_top(list, -10.0).unwrap(), 0.0);
        assert_eq!(arena.get(item).unwrap().rect.y, 500.0);
    }

    #[test]
    fn test_document_scroll_updates_viewport() {
        let (mut arena, _) = document();
        let html = arena.document_element().unwrap();
        arena
            .set_scroll_metrics(html, ScrollMetrics::new(3000.0, 600.0))
            .unwrap();

        arena.set_scroll_top(html, 250.0).unwrap();
        assert_eq!(arena.viewport().scroll_y, 250.0);
        assert_eq!(arena.get(html).unwrap().rect.y, -250.0);
    }
}

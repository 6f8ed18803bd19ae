//! Viewport and visibility queries

use crate::arena::DomArena;
use crate::types::{DomNode, NodeId};

/// Check if element is visible according to CSS
pub fn is_element_visible_by_css(node: &DomNode) -> bool {
    let display = node.style("display").unwrap_or("");
    let visibility = node.style("visibility").unwrap_or("");
    let opacity = node.style("opacity").unwrap_or("1");

    if display == "none" || visibility == "hidden" {
        return false;
    }

    if let Ok(opacity_val) = opacity.parse::<f64>() {
        if opacity_val <= 0.0 {
            return false;
        }
    }

    true
}

/// Window size as `(width, height)`
pub fn viewport_size(arena: &DomArena) -> (f64, f64) {
    let viewport = arena.viewport();
    (viewport.width, viewport.height)
}

/// Window scroll position as `(x, y)`
pub fn scroll_position(arena: &DomArena) -> (f64, f64) {
    let viewport = arena.viewport();
    (viewport.scroll_x, viewport.scroll_y)
}

/// Check whether an element shows inside the viewport
///
/// `fully` requires the whole box to be inside; otherwise any overlap
/// counts. Detached, unknown, and CSS-hidden nodes are never in view.
pub fn is_in_viewport(arena: &DomArena, node: Option<NodeId>, fully: bool) -> bool {
    let Some(node_id) = node else {
        return false;
    };
    if !arena.is_attached(node_id) {
        return false;
    }
    let Ok(element) = arena.get(node_id) else {
        return false;
    };
    if !is_element_visible_by_css(element) {
        return false;
    }

    let visible = arena.viewport().rect();
    if fully {
        visible.contains_rect(&element.rect)
    } else {
        visible.intersects(&element.rect)
    }
}

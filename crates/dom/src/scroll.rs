//! Scrollable-ancestor resolution and scroll planning
//!
//! Everything here is a pure function of tree structure, computed style
//! and geometry. Driving the animation over time is the host's job; this
//! module only says where to go and how to ease there.

use crate::arena::DomArena;
use crate::types::{NodeId, NodeType};
use std::time::Duration;

/// Whether the node's own scroll mechanism would move its content
///
/// Content must overflow, and the node must be `<body>`, the document
/// element, or have `overflow-y` of exactly `auto` or `scroll`.
pub fn is_scrollable(arena: &DomArena, node_id: NodeId) -> bool {
    let Ok(node) = arena.get(node_id) else {
        return false;
    };
    if !node.scroll.overflows() {
        return false;
    }

    Some(node_id) == arena.body()
        || Some(node_id) == arena.document_element()
        || matches!(node.style("overflow-y"), Some("auto") | Some("scroll"))
}

/// Nearest scrollable node, starting at `node_id` itself
///
/// Falls back to the document element when the walk runs out of parents
/// (also for detached subtrees). `None` only when the arena has no
/// document element at all.
pub fn scroll_parent(arena: &DomArena, node_id: NodeId) -> Option<NodeId> {
    let document_element = arena.document_element()?;
    if node_id == document_element {
        return Some(document_element);
    }

    let mut current = Some(node_id);
    while let Some(id) = current {
        let Ok(node) = arena.get(id) else {
            break;
        };
        if node.node_type == NodeType::Document {
            break;
        }
        if is_scrollable(arena, id) {
            return Some(id);
        }
        current = node.parent_id;
    }

    Some(document_element)
}

/// Where a scroll container should go so a node sits at a given offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPlan {
    pub container: NodeId,
    pub from: f64,
    pub to: f64,
}

impl ScrollPlan {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Plan a scroll that puts the top of `node_id` `desired_top` pixels below
/// the top of its scroll container
///
/// `None` when there is no container, or the node is its own container.
/// The target is clamped to the container's scroll range.
pub fn plan_scroll(arena: &DomArena, node_id: NodeId, desired_top: f64) -> Option<ScrollPlan> {
    let container = scroll_parent(arena, node_id)?;
    if container == node_id {
        return None;
    }

    let target = arena.get(node_id).ok()?;
    let scroller = arena.get(container).ok()?;

    // The document element's rect moves with the window; its visible top
    // is the top of the viewport.
    let visible_top = if Some(container) == arena.document_element() {
        0.0
    } else {
        scroller.rect.y
    };

    let from = scroller.scroll.scroll_top;
    let to = (from + (target.rect.y - visible_top) - desired_top)
        .clamp(0.0, scroller.scroll.max_scroll_top());

    Some(ScrollPlan {
        container,
        from,
        to,
    })
}

/// Easing curves for scroll animation
///
/// All map [0, 1] onto [0, 1] monotonically, so a tween never overshoots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    EaseInOutCubic,
    SmoothStep,
    EaseOutQuad,
}

impl Easing {
    pub fn sample(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Time-based interpolation between two scroll offsets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTween {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl ScrollTween {
    pub fn new(from: f64, to: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(Duration::from_millis(1)),
            easing,
        }
    }

    pub fn is_done(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Offset at `elapsed`; exactly `from` at zero and exactly `to` once done
    pub fn sample(&self, elapsed: Duration) -> f64 {
        if self.is_done(elapsed) {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let eased = self.easing.sample(t);
        let value = self.from + (self.to - self.from) * eased;

        // Guard against float drift past the endpoints
        let (lo, hi) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };
        value.clamp(lo, hi)
    }
}

//! Smooth scrolling - animate a scroll container toward a node
//!
//! The plan (which container, from where, to where) comes from
//! `dom::plan_scroll`. This module only drives it across frames.

use dom::{plan_scroll, Easing, NodeId, ScrollTween};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::SharedDocument;

/// Animation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOptions {
    pub duration: Duration,
    /// Time between animation frames
    pub frame_interval: Duration,
    pub easing: Easing,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(200),
            frame_interval: Duration::from_millis(16),
            easing: Easing::default(),
        }
    }
}

/// Scroll the nearest scrollable ancestor so the top of `node` ends up
/// `desired_top` pixels below that ancestor's top edge
///
/// Fire-and-forget: returns whether an animation was scheduled. Nothing is
/// scheduled when the node is its own scroll container, when no container
/// exists, or when the container is already in place. Outside a tokio
/// runtime nothing is scheduled either; see [`scroll_by_element_to_on`].
pub fn scroll_by_element_to(
    document: &SharedDocument,
    node: NodeId,
    desired_top: f64,
    options: ScrollOptions,
) -> bool {
    match Handle::try_current() {
        Ok(runtime) => scroll_by_element_to_on(&runtime, document, node, desired_top, options),
        Err(_) => {
            tracing::debug!(node, "no tokio runtime, skipping scroll");
            false
        }
    }
}

/// Same as [`scroll_by_element_to`], with frames driven on `runtime`
///
/// Callable from any thread.
pub fn scroll_by_element_to_on(
    runtime: &Handle,
    document: &SharedDocument,
    node: NodeId,
    desired_top: f64,
    options: ScrollOptions,
) -> bool {
    let plan = plan_scroll(&document.read(), node, desired_top);
    let Some(plan) = plan else {
        tracing::trace!(node, "no scroll container, skipping scroll");
        return false;
    };
    if plan.is_noop() {
        return false;
    }

    let tween = ScrollTween::new(plan.from, plan.to, options.duration, options.easing);
    let document = Arc::clone(document);

    tracing::debug!(
        node,
        container = plan.container,
        from = plan.from,
        to = plan.to,
        "starting scroll animation"
    );

    runtime.spawn(async move {
        let start = Instant::now();
        let mut frames = tokio::time::interval(options.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            frames.tick().await;
            let elapsed = start.elapsed();

            if let Err(e) = document
                .write()
                .set_scroll_top(plan.container, tween.sample(elapsed))
            {
                tracing::warn!("scroll container vanished mid-animation: {}", e);
                break;
            }

            if tween.is_done(elapsed) {
                break;
            }
        }
    });

    true
}

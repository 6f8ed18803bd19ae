//! Document tree model and element helpers
//!
//! An arena-backed document tree that answers the questions UI helper code
//! asks of its host: is this node still attached, who are its ancestors,
//! what is its computed style, where is it on screen, how far is it
//! scrolled. On top of that sit the helpers themselves: class-list
//! management, lookup by id, viewport queries, and scrollable-ancestor
//! resolution with scroll planning.
//!
//! ## Core Design
//!
//! ```text
//! JSON snapshot → DomArena (owned) → NodeId (u32) handles
//!                     ↓
//!          classes / scroll / utils (pure helpers)
//! ```

pub mod arena;
pub mod classes;
pub mod error;
pub mod scroll;
pub mod snapshot;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use classes::{
    add_class, class_names, has_class, remove_class, set_class, toggle_class, ClassArg, Toggle,
};
pub use error::{DomError, Result};
pub use scroll::{is_scrollable, plan_scroll, scroll_parent, Easing, ScrollPlan, ScrollTween};
pub use snapshot::{parse_snapshot, parse_snapshot_str};
pub use types::*;
pub use utils::{is_in_viewport, scroll_position, viewport_size};

//! State Module - Runtime behavior state machines
//!
//! - **ScrollLock** - single-flight page scroll lock with scrollbar compensation
//! - **HeaderScroll** - scrolled/visible header facets with show keepalive
//! - **Menu** - menu toggle that drives the scroll lock

mod header_scroll;
mod menu;
mod scroll_lock;

pub use header_scroll::*;
pub use menu::*;
pub use scroll_lock::*;

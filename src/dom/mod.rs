//! DOM Module - the page environment the behaviors act on.
//!
//! - **Document** - element arena, attributes, class list, inline style, queries
//! - **Viewport** - window width and scroll offset
//!
//! A host embedding these behaviors mirrors its real page into a `Document`
//! (or drives one directly in tests) and reads the results back out.

mod document;

pub use document::*;

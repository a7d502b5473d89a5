//! Shared types used by every Tarn middle-end crate.
//!
//! - [`span`]: byte-offset source spans and on-demand line lookup

pub mod span;

pub use span::{LineIndex, Span};

//! Middle-end transformations over the Tarn AST.
//!
//! The main pass is iterator inlining: every instantiated
//! `foreach x in iter(args)` is replaced by a copy of `iter`'s body in which
//! the single `yield value` has become `x = value` followed by the loop body.
//! Iterators never exist at run time.
//!
//! # Architecture
//!
//! - [`iterator`]: the inliner driver, parameter binding and yield rewriting
//! - [`switch`]: flattening of compile-time type switches
//! - [`rebind`]: the seam to signature binding, plus a reference binder
//! - [`context`]: per-run state threaded through the driver
//! - [`error`]: the error taxonomy
//! - [`diagnostics`]: ariadne and JSON rendering of errors

pub mod context;
pub mod diagnostics;
pub mod error;
pub mod iterator;
pub mod rebind;
pub mod switch;

pub use context::InlineContext;
pub use error::InlineError;
pub use iterator::{inline_iterator, inline_iterators, InlineStats, IteratorInliner};
pub use rebind::{BindRequest, Rebind, SignatureBinder};

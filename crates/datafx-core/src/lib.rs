//! # datafx-core - Core Types
//!
//! Foundation crate for DataFX. Provides error handling, logging setup,
//! observable properties, the retained node tree and small runtime helpers.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (thiserror, tracing, chrono, tokio, dirs).
//!
//! ## Public API
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Framework error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//! - [`BoxError`] - Error type returned by user hooks
//!
//! ### Nodes and Properties (`node`, `property`)
//! - [`Node`], [`NodeRef`], [`NodeKind`], [`NodeAction`], [`Effect`]
//! - [`Property`] - Observable value with listeners and one-way binding
//!
//! ### Runtime (`registry`, `exception`, `concurrent`)
//! - [`Registry`] - Type/key indexed shared objects
//! - [`ExceptionHandler`] - Sink for errors raised from UI events
//! - [`WorkerPool`] - Background execution on tokio's blocking pool
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use datafx_core::prelude::*;
//! ```

pub mod concurrent;
pub mod error;
pub mod exception;
pub mod logging;
pub mod node;
pub mod prelude;
pub mod property;
pub mod registry;

// Re-export commonly used types at crate root for convenience
pub use concurrent::WorkerPool;
pub use error::{BoxError, Error, HookKind, HookResult, Result, ResultExt};
pub use exception::{ExceptionHandler, ExceptionRecord};
pub use node::{Effect, Node, NodeAction, NodeKind, NodeRef};
pub use property::{ListenerId, Property};
pub use registry::Registry;

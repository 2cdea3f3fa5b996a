//! Prelude for common imports used throughout all DataFX crates

pub use crate::error::{BoxError, Error, HookResult, Result, ResultExt};
pub use tracing::{debug, error, info, instrument, trace, warn};

//! DataFX - view controllers and flow navigation
//!
//! Facade over the workspace crates:
//!
//! - [`core`]: errors, logging, observable properties and the node tree
//! - [`flow`]: controllers, injection, actions, flows and the flow handler
//! - [`featuretoggle`]: feature flags bound to view nodes
//! - [`tui`]: terminal host for running a flow
//!
//! [`wizard`] is a small sample flow used by the `datafx-wizard` binary.

pub use datafx_core as core;
pub use datafx_featuretoggle as featuretoggle;
pub use datafx_flow as flow;
pub use datafx_tui as tui;

pub mod wizard;

pub use datafx_core::{Error, Result};
pub use datafx_flow::{Flow, FlowHandler};

/// Install colored panic and error reports. Call once, before the terminal starts.
pub fn install_error_reporting() -> Result<()> {
    color_eyre::install().map_err(|e| Error::terminal(e.to_string()))
}

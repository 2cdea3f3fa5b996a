//! datafx-tui - Terminal host for DataFX flows
//!
//! Draws a flow's node tree with ratatui, moves keyboard focus between
//! activatable nodes and turns activations into flow actions. The stage title
//! follows the current view's title.

pub mod event;
pub mod focus;
pub mod render;
pub mod runner;
pub mod terminal;
pub mod theme;

// Re-export main entry points
pub use event::InputKey;
pub use focus::FocusRing;
pub use render::NodeWidget;
pub use runner::{run, App};
pub use terminal::TerminalStage;

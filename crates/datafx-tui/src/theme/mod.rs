//! Colors and styles used when drawing node trees

pub mod palette;
pub mod styles;

//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, section content, modal and toast overlays
//! - `input`: keyboard and mouse handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;

//! Report rendering.

mod render;

pub use render::{Report, escape_html, render};

//! Renderers for decoded record sets.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::to_text_table;

//! IMBRO XML handling: structural parsing and DOM helpers.

mod imbro;
mod utils;

pub use imbro::{ImbroFile, ParseMode, ParsedValue, PARAMETERS_TAG};
pub use utils::{
    element_children, find_by_path, find_child, find_children, get_tag_name, get_text, local_name,
    parse_document,
};

//! XML utilities for navigating bean definition documents.

mod utils;

pub use utils::{element_children, find_child, find_children, get_tag_name, has_tag, text_content};

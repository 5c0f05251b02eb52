use std::collections::HashMap;

use plate_alias_core::substitute;

/// The document as a reader will see it, with every known alias resolved.
/// `None` while there is nothing to show.
pub fn preview(markup: &str, values: &HashMap<String, String>) -> Option<String> {
    if markup.trim().is_empty() {
        return None;
    }
    Some(substitute(markup, values))
}

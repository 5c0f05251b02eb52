use std::collections::HashMap;

use tracing::{debug, warn};

use crate::core::Node;
use crate::markup;
use crate::widget::ALIAS_VALUE_ATTR;

/// Resolves alias tokens in serialized markup into their real values.
///
/// Every element carrying an alias value present in `values` becomes a
/// plain text node. Unknown aliases, blank input and markup that does not
/// parse pass through unchanged.
pub fn substitute(markup: &str, values: &HashMap<String, String>) -> String {
    if markup.trim().is_empty() {
        return markup.to_string();
    }

    let mut nodes = match markup::parse_fragment(markup) {
        Ok(nodes) => nodes,
        Err(err) => {
            warn!(%err, "markup left unsubstituted");
            return markup.to_string();
        }
    };

    let replaced = replace_tokens(&mut nodes, values);
    if replaced == 0 {
        return markup.to_string();
    }
    debug!(replaced, "aliases substituted");
    markup::serialize(&nodes)
}

fn replace_tokens(nodes: &mut [Node], values: &HashMap<String, String>) -> usize {
    let mut replaced = 0;
    for node in nodes.iter_mut() {
        let resolved = node
            .attr(ALIAS_VALUE_ATTR)
            .and_then(|key| values.get(key))
            .cloned();
        match (resolved, node) {
            (Some(value), node) => {
                *node = Node::text(value);
                replaced += 1;
            }
            (None, Node::Element(el)) => replaced += replace_tokens(&mut el.children, values),
            (None, Node::Text(_)) => {}
        }
    }
    replaced
}

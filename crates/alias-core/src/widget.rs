use serde::{Deserialize, Serialize};

use crate::config::AliasConfig;
use crate::core::{Attrs, Document, Node};
use crate::markup;
use crate::ops::Path;

pub const ALIAS_VALUE_ATTR: &str = "data-alias-value";
pub const ALIAS_ID_ATTR: &str = "data-alias-id";
pub const ALIAS_DELETE_ATTR: &str = "data-alias-delete";

/// A named placeholder that is substituted with a real value later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alias {
    pub id: String,
    pub value: String,
    pub label: String,
}

impl Alias {
    pub fn new(id: impl Into<String>, value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            label: label.into(),
        }
    }
}

pub fn is_token(node: &Node) -> bool {
    node.has_attr(ALIAS_VALUE_ATTR)
}

/// Path of the token that contains (or is) the node at `path`.
pub fn closest_token(doc: &Document, path: &[usize]) -> Option<Path> {
    doc.closest(path, is_token)
}

#[derive(Debug, Clone, Default)]
pub struct AliasWidgetFactory {
    config: AliasConfig,
}

impl AliasWidgetFactory {
    pub fn new(config: AliasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AliasConfig {
        &self.config
    }

    /// The token tree: a non-editable container tagged with the alias value
    /// and id, holding the label and a delete control.
    pub fn node(&self, alias: &Alias) -> Node {
        let mut attrs = Attrs::new();
        attrs.insert("class".to_string(), self.config.token_class.clone());
        attrs.insert("contenteditable".to_string(), "false".to_string());
        attrs.insert(ALIAS_VALUE_ATTR.to_string(), alias.value.clone());
        attrs.insert(ALIAS_ID_ATTR.to_string(), alias.id.clone());

        let label = Node::element("span", Attrs::new(), vec![Node::text(alias.label.clone())]);

        let a11y = Node::element(
            "span",
            Attrs::from([("class".to_string(), "a11y".to_string())]),
            vec![Node::text(self.config.delete_label.clone())],
        );
        let icon = Node::element(
            "i",
            Attrs::from([("class".to_string(), "delete-icon".to_string())]),
            vec![a11y],
        );
        let delete = Node::element(
            "button",
            Attrs::from([(ALIAS_DELETE_ATTR.to_string(), "true".to_string())]),
            vec![icon],
        );

        Node::element("span", attrs, vec![label, delete])
    }

    pub fn render(&self, alias: &Alias) -> String {
        markup::serialize_node(&self.node(alias))
    }

    /// Parses token markup back into a single root element. Empty,
    /// malformed or multi-root markup yields `None`.
    pub fn parse(&self, markup: &str) -> Option<Node> {
        let nodes = markup::parse_fragment(markup.trim()).ok()?;
        let mut roots = nodes
            .into_iter()
            .filter(|node| !matches!(node, Node::Text(t) if t.text.trim().is_empty()));
        let root = roots.next()?;
        if roots.next().is_some() || root.is_text() {
            return None;
        }
        Some(root)
    }
}

//! Tree-sitter parser integration for Go
//!
//! Thin helpers over `tree-sitter-go`; lowering lives in [`super::lower`].

use crate::errors::{Error, Result};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// A parsed Go file. Owns the source the tree points into.
pub struct GoSource {
    pub tree: Tree,
    pub source: String,
}

impl GoSource {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self, node: &Node) -> &str {
        node_text(node, &self.source)
    }
}

/// Parse Go source code into a tree-sitter CST, rejecting syntax errors.
pub fn parse_source(content: &str, path: &Path) -> Result<GoSource> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| Error::load(format!("failed to set tree-sitter Go language: {}", e)))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| Error::load_in(path, "parser produced no tree"))?;

    if let Some(node) = first_error(tree.root_node()) {
        let what = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "unexpected input".to_string()
        };
        return Err(Error::load_in(
            path,
            format!(
                "syntax error at {}:{}: {}",
                node_line(&node),
                node_column(&node),
                what
            ),
        ));
    }

    Ok(GoSource {
        tree,
        source: content.to_string(),
    })
}

/// First `ERROR` or missing node in document order.
pub fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Get 1-based line number for a node
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Get 1-based column number for a node
pub fn node_column(node: &Node) -> usize {
    node.start_position().column + 1
}

/// Named children, skipping comments.
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// All children (named and anonymous), skipping comments.
pub fn all_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Every child stored under field `name`.
pub fn field_children<'t>(node: &Node<'t>, name: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor).collect()
}

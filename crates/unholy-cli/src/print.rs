// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The AST printer: an indented pre-order walk of a parsed tree.

use unholy_ast::{NodeData, NodeId, SyntaxTree};

/// Render the whole tree, one node per line with position info.
pub fn render_tree(tree: &SyntaxTree) -> String {
    let mut out = String::new();
    render_node(tree, tree.root(), 0, &mut out);
    out
}

fn render_node(tree: &SyntaxTree, id: NodeId, depth: usize, out: &mut String) {
    let node = tree.node(id);
    let label = match &node.data {
        NodeData::Identifier { name } => format!("Identifier \"{}\"", name),
        NodeData::IntegerLiteral { text } => format!("IntegerLiteral {}", text),
        NodeData::SourceFile { file_name, .. } => format!("SourceFile \"{}\"", file_name),
        _ => format!("{:?}", node.kind),
    };
    out.push_str(&format!(
        "{}{} @ {}:{} [{}..{})\n",
        "  ".repeat(depth),
        label,
        node.line,
        node.column,
        node.pos,
        node.end()
    ));
    for child in tree.children(id) {
        render_node(tree, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_structure() {
        let tree = unholy_parser::parse_source("t.uh", "let x = 1 + 2;").unwrap();
        let out = render_tree(&tree);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("SourceFile \"t.uh\""));
        assert!(lines[1].starts_with("  VarDeclarationStatement"));
        assert!(lines[2].starts_with("    VarDeclaration"));
        assert!(out.contains("Identifier \"x\""));
        assert!(out.contains("BinaryExpression"));
        assert!(out.contains("PlusToken"));
        assert!(out.contains("IntegerLiteral 1"));
    }
}

//! Parser 辅助工具
//!
//! 提供通用的 tree-sitter 解析辅助函数

use tree_sitter::{Node, Parser, Tree};

/// 解析源代码为 Tree-sitter AST
pub fn parse_source(source: &str, language: tree_sitter::Language) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&language).ok()?;
    parser.parse(source, None)
}

/// 提取节点的文本内容
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// 查找指定类型的子节点
pub fn find_child_by_kind<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// 去掉 Python 字符串字面量的前缀和引号
pub fn unquote(literal: &str) -> String {
    let body = literal.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    body.to_string()
}

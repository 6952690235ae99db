//! Flow 加载
//!
//! 从 entrypoint 指向的源文件中读取 flow 的声明信息（名称、描述）。
//! 注册流程只依赖 [`FlowLoader`] trait，默认实现 [`PythonFlowLoader`]
//! 使用 tree-sitter-python 静态解析源码，不执行任何代码。

pub mod parser;

use crate::error::{ProjectError, Result};
use crate::utils::read_file;
use parser::{find_child_by_kind, node_text, parse_source, unquote};
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// 识别为 flow 的装饰器
const FLOW_DECORATORS: &[&str] = &["flow", "prefect.flow"];

/// 已加载的 flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    /// flow 声明的名称
    pub name: String,
    /// 被装饰的函数名
    pub function_name: String,
    /// 源文件路径
    pub path: PathBuf,
    pub description: Option<String>,
}

/// Flow 加载器
///
/// 可能做阻塞 IO，注册时放到 tokio 的 blocking 线程池中执行
pub trait FlowLoader: Send + Sync {
    /// 从 `path` 中加载名为 `function` 的 flow
    fn load(&self, path: &Path, function: &str) -> Result<Flow>;
}

/// 基于 tree-sitter 的 Python flow 加载器
pub struct PythonFlowLoader {
    language: tree_sitter::Language,
}

impl Default for PythonFlowLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonFlowLoader {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::language(),
        }
    }

    /// 从源码字符串中查找 flow
    pub fn load_from_source(&self, source: &str, path: &Path, function: &str) -> Result<Flow> {
        let tree = parse_source(source, self.language.clone()).ok_or_else(|| {
            anyhow::anyhow!("Failed to parse Python source: {}", path.display())
        })?;

        let root = tree.root_node();
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "decorated_definition" => {
                    let Some(definition) = child.child_by_field_name("definition") else {
                        continue;
                    };
                    if !is_named_function(&definition, source, function) {
                        continue;
                    }

                    let Some(decorator) = find_flow_decorator(&child, source) else {
                        return Err(ProjectError::NotAFlow {
                            path: path.to_path_buf(),
                            function: function.to_string(),
                        });
                    };

                    let flow_name = keyword_string(&decorator, source, "name")
                        .unwrap_or_else(|| function.replace('_', "-"));
                    let description = keyword_string(&decorator, source, "description")
                        .or_else(|| docstring(&definition, source));

                    return Ok(Flow {
                        name: flow_name,
                        function_name: function.to_string(),
                        path: path.to_path_buf(),
                        description,
                    });
                }
                "function_definition" if is_named_function(&child, source, function) => {
                    return Err(ProjectError::NotAFlow {
                        path: path.to_path_buf(),
                        function: function.to_string(),
                    });
                }
                _ => {}
            }
        }

        Err(ProjectError::FunctionNotFound {
            path: path.to_path_buf(),
            function: function.to_string(),
        })
    }
}

impl FlowLoader for PythonFlowLoader {
    fn load(&self, path: &Path, function: &str) -> Result<Flow> {
        let source = read_file(path)?;
        self.load_from_source(&source, path, function)
    }
}

fn is_named_function(node: &Node, source: &str, function: &str) -> bool {
    node.kind() == "function_definition"
        && node
            .child_by_field_name("name")
            .is_some_and(|name| node_text(&name, source) == function)
}

/// 返回 flow 装饰器的表达式节点（identifier、attribute 或 call）
fn find_flow_decorator<'a>(decorated: &Node<'a>, source: &str) -> Option<Node<'a>> {
    let mut cursor = decorated.walk();
    let decorators: Vec<Node<'a>> = decorated
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "decorator")
        .collect();

    decorators.into_iter().find_map(|decorator| {
        let expr = decorator.named_child(0)?;
        let target = if expr.kind() == "call" {
            expr.child_by_field_name("function")?
        } else {
            expr
        };
        let name: String = node_text(&target, source)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        FLOW_DECORATORS.contains(&name.as_str()).then_some(expr)
    })
}

/// 读取 `@flow(key="...")` 中的字符串参数
fn keyword_string(decorator: &Node, source: &str, key: &str) -> Option<String> {
    if decorator.kind() != "call" {
        return None;
    }
    let arguments = decorator.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let keywords: Vec<Node> = arguments
        .named_children(&mut cursor)
        .filter(|arg| arg.kind() == "keyword_argument")
        .collect();

    keywords.into_iter().find_map(|arg| {
        let name = arg.child_by_field_name("name")?;
        if node_text(&name, source) != key {
            return None;
        }
        let value = arg.child_by_field_name("value")?;
        (value.kind() == "string").then(|| unquote(node_text(&value, source)))
    })
}

/// 函数体第一条语句为字符串时作为 docstring
fn docstring(function: &Node, source: &str) -> Option<String> {
    let body = function.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = find_child_by_kind(&first, "string")?;
    let text = unquote(node_text(&literal, source));
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

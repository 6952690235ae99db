//! 占位符替换
//!
//! 在嵌套的 YAML 结构中替换 `{{ name }}` 形式的占位符。只处理字符串叶子节点，
//! 键名保持不变。

use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// 占位符名称到取值的扁平映射，合并时后写入者覆盖
pub type FormattingContext = BTreeMap<String, String>;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"\{\{\s*([\w.\-\[\]$]+)\s*\}\}").unwrap();
}

/// 字符串中的一个占位符
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// 完整匹配文本，例如 `{{ branch }}`
    pub full_match: String,
    /// 占位符名称，例如 `branch`
    pub name: String,
}

/// 找出字符串中的所有占位符（按出现顺序，去重）
pub fn find_placeholders(template: &str) -> Vec<Placeholder> {
    let mut found: Vec<Placeholder> = Vec::new();
    for caps in PLACEHOLDER_REGEX.captures_iter(template) {
        let placeholder = Placeholder {
            full_match: caps[0].to_string(),
            name: caps[1].to_string(),
        };
        if !found.contains(&placeholder) {
            found.push(placeholder);
        }
    }
    found
}

/// 收集嵌套结构中出现过的所有占位符名称
pub fn collect_placeholder_names(template: &Value) -> Vec<String> {
    let mut names = Vec::new();
    collect_into(template, &mut names);
    names.sort();
    names.dedup();
    names
}

fn collect_into(template: &Value, names: &mut Vec<String>) {
    match template {
        Value::String(s) => names.extend(find_placeholders(s).into_iter().map(|p| p.name)),
        Value::Sequence(items) => items.iter().for_each(|item| collect_into(item, names)),
        Value::Mapping(map) => map.values().for_each(|value| collect_into(value, names)),
        Value::Tagged(tagged) => collect_into(&tagged.value, names),
        _ => {}
    }
}

/// 将取值应用到模板
///
/// `remove_notset` 为 false 时，找不到取值的占位符原样保留；为 true 时，
/// 整个字符串就是占位符的节点被移除，嵌入在文本中的占位符替换为空串。
/// 返回 None 表示该节点被移除。
pub fn apply_values(
    template: &Value,
    values: &FormattingContext,
    remove_notset: bool,
) -> Option<Value> {
    match template {
        Value::String(s) => apply_to_str(s, values, remove_notset).map(Value::String),
        Value::Sequence(items) => Some(Value::Sequence(
            items
                .iter()
                .filter_map(|item| apply_values(item, values, remove_notset))
                .collect(),
        )),
        Value::Mapping(map) => Some(Value::Mapping(apply_to_mapping(
            map,
            values,
            remove_notset,
        ))),
        Value::Tagged(tagged) => {
            let mut tagged = tagged.clone();
            tagged.value = apply_values(&tagged.value, values, remove_notset)?;
            Some(Value::Tagged(tagged))
        }
        other => Some(other.clone()),
    }
}

/// 对映射应用取值，被移除的键直接丢弃
pub fn apply_to_mapping(map: &Mapping, values: &FormattingContext, remove_notset: bool) -> Mapping {
    let mut updated = Mapping::new();
    for (key, value) in map {
        if let Some(value) = apply_values(value, values, remove_notset) {
            updated.insert(key.clone(), value);
        }
    }
    updated
}

fn apply_to_str(template: &str, values: &FormattingContext, remove_notset: bool) -> Option<String> {
    let placeholders = find_placeholders(template);

    if placeholders.is_empty() {
        return Some(template.to_string());
    }

    if placeholders.len() == 1 && placeholders[0].full_match == template {
        return match values.get(&placeholders[0].name) {
            Some(value) => Some(value.clone()),
            None if remove_notset => None,
            None => Some(template.to_string()),
        };
    }

    let mut rendered = template.to_string();
    for placeholder in &placeholders {
        match values.get(&placeholder.name) {
            Some(value) => rendered = rendered.replace(&placeholder.full_match, value),
            None if remove_notset => rendered = rendered.replace(&placeholder.full_match, ""),
            None => {}
        }
    }
    Some(rendered)
}

//! prefect.yaml 读写
//!
//! 配置文件按固定顺序分段写出，每段前带注释。下游工具按约定（而不是结构）
//! 读取这些段落，因此顺序和注释不能变。

use crate::error::Result;
use crate::templates::TemplateAssets;
use crate::utils::{file_exists, write_file};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// 项目配置文件名
pub const PREFECT_FILE: &str = "prefect.yaml";

/// 写入配置文件时使用的版本号
pub const PREFECT_VERSION: &str = env!("CARGO_PKG_VERSION");

const HEADER: &str = "# File for configuring project / deployment build, push and pull steps\n\n";

/// 各段的注释和键，按写出顺序排列
const SECTIONS: &[(&str, &str)] = &[
    (
        "build",
        "# build section allows you to manage and build docker images",
    ),
    (
        "push",
        "# push section allows you to manage if and how this project is uploaded to remote locations",
    ),
    (
        "pull",
        "# pull section allows you to provide instructions for cloning this project in remote locations",
    ),
    (
        "deployments",
        "# the deployments section allows you to provide configuration for deploying flows",
    ),
];

/// 在 `dir` 下创建 prefect.yaml，文件已存在时不做任何事
///
/// `contents` 为 None 时使用内置的默认骨架。返回是否创建了文件。
pub fn create_default_prefect_yaml(
    dir: &Path,
    name: &str,
    contents: Option<Mapping>,
) -> Result<bool> {
    let prefect_file = dir.join(PREFECT_FILE);
    if prefect_file.exists() {
        tracing::debug!(path = %prefect_file.display(), "prefect.yaml already exists, skipping");
        return Ok(false);
    }

    let mut contents = match contents {
        Some(contents) => contents,
        None => TemplateAssets::default_project_config()?,
    };
    contents.insert("prefect-version".into(), PREFECT_VERSION.into());
    contents.insert("name".into(), name.into());

    write_file(&prefect_file, &render_prefect_yaml(&contents)?)?;
    Ok(true)
}

/// 按固定段落顺序渲染配置
///
/// 缺失的 build/push/pull 写为 null，缺失的 deployments 写为空列表；
/// 其它未识别的顶层键（例如 recipe 的 description）不会写出。
pub fn render_prefect_yaml(contents: &Mapping) -> Result<String> {
    let mut out = String::from(HEADER);

    out.push_str("# Generic metadata about this project\n");
    out.push_str(&dump_section(contents, "name", Value::Null)?);
    out.push_str(&dump_section(contents, "prefect-version", Value::Null)?);

    for (key, comment) in SECTIONS {
        out.push('\n');
        out.push_str(comment);
        out.push('\n');
        let default = if *key == "deployments" {
            Value::Sequence(Vec::new())
        } else {
            Value::Null
        };
        out.push_str(&dump_section(contents, key, default)?);
    }

    Ok(out)
}

fn dump_section(contents: &Mapping, key: &str, default: Value) -> Result<String> {
    let value = contents.get(key).cloned().unwrap_or(default);
    let mut section = Mapping::new();
    section.insert(key.into(), value);
    Ok(serde_yaml::to_string(&section)?)
}

/// 读取并解析 `dir` 下的 prefect.yaml
pub fn load_prefect_yaml(dir: &Path) -> Result<Option<Mapping>> {
    let prefect_file = dir.join(PREFECT_FILE);
    if !file_exists(&prefect_file) {
        return Ok(None);
    }
    let content = crate::utils::read_file(&prefect_file)?;
    Ok(Some(serde_yaml::from_str(&content)?))
}

//! 旧格式迁移
//!
//! 将旧版 deployment.yaml 中的部署配置追加到 prefect.yaml，只追加不覆盖。

use crate::error::{ProjectError, Result};
use crate::project::config::PREFECT_FILE;
use crate::utils::{append_file, file_exists, read_file};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// 旧版部署配置文件名
pub const DEPLOYMENT_FILE: &str = "deployment.yaml";

/// 把 deployment.yaml 的内容并入 prefect.yaml
///
/// - 空文件：追加空的 `deployments` 列表
/// - 没有 `deployments` 键：整个文件视为一个部署
/// - 已有 `deployments` 键：原文追加
pub fn copy_deployments_into_prefect_file(dir: &Path) -> Result<()> {
    let prefect_file = dir.join(PREFECT_FILE);
    let deployment_file = dir.join(DEPLOYMENT_FILE);
    if !file_exists(&prefect_file) || !file_exists(&deployment_file) {
        return Err(ProjectError::MigrationFilesMissing);
    }

    let raw = read_file(&deployment_file)?;
    let parsed: Value = if raw.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(&raw)?
    };

    let appended = match parsed {
        Value::Null => deployments_section(Vec::new())?,
        Value::Mapping(map) if map.is_empty() => deployments_section(Vec::new())?,
        Value::Mapping(map) if map.contains_key("deployments") => raw,
        Value::Mapping(map) => deployments_section(vec![Value::Mapping(map)])?,
        other => {
            return Err(ProjectError::InvalidDeploymentFile {
                found: describe(&other).to_string(),
            })
        }
    };

    append_file(&prefect_file, &format!("\n{}", appended))?;
    tracing::info!(path = %prefect_file.display(), "copied deployments into prefect.yaml");
    Ok(())
}

fn deployments_section(deployments: Vec<Value>) -> Result<String> {
    let mut section = Mapping::new();
    section.insert("deployments".into(), Value::Sequence(deployments));
    Ok(serde_yaml::to_string(&section)?)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

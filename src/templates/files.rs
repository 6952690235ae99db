//! 模板文件嵌入
//!
//! 嵌入项目初始化所需的模板文件

use anyhow::{anyhow, Result};
use rust_embed::RustEmbed;
use serde_yaml::Mapping;

/// 模板文件资源（编译时嵌入）
#[derive(RustEmbed)]
#[folder = "embedded/templates/"]
pub struct TemplateAssets;

impl TemplateAssets {
    /// 获取默认 prefect.yaml 骨架
    pub fn get_prefect_yaml() -> Result<String> {
        Self::get_file("prefect.yaml")
    }

    /// 解析默认 prefect.yaml 骨架
    pub fn default_project_config() -> Result<Mapping> {
        let content = Self::get_prefect_yaml()?;
        serde_yaml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse template 'prefect.yaml': {}", e))
    }

    /// 获取默认 .prefectignore 内容
    pub fn get_prefectignore() -> Result<String> {
        Self::get_file("prefectignore")
    }

    /// 获取指定模板文件
    fn get_file(filename: &str) -> Result<String> {
        let file = Self::get(filename)
            .ok_or_else(|| anyhow!("Template '{}' not found", filename))?;

        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| anyhow!("Failed to decode template '{}': {}", filename, e))?;

        Ok(content.to_string())
    }

    /// 列出所有可用的模板文件
    pub fn list_templates() -> Vec<String> {
        Self::iter()
            .map(|path| path.as_ref().to_string())
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════
// 测试
// ═══════════════════════════════════════════════════════════════════

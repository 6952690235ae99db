//! Recipe 加载
//!
//! 每个 recipe 是一份嵌入的 prefect.yaml 骨架（`embedded/recipes/<name>/prefect.yaml`），
//! 加载时用 FormattingContext 替换其中的占位符。

use crate::error::{ProjectError, Result};
use crate::templates::values::{apply_to_mapping, collect_placeholder_names, FormattingContext};
use rust_embed::RustEmbed;
use serde_yaml::{Mapping, Value};

const RECIPE_FILE: &str = "prefect.yaml";

/// Recipe 资源（编译时嵌入）
#[derive(RustEmbed)]
#[folder = "embedded/recipes/"]
pub struct RecipeAssets;

/// Recipe 概要信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeInfo {
    pub name: String,
    pub description: Option<String>,
    /// recipe 中引用到的占位符
    pub placeholders: Vec<String>,
}

impl RecipeAssets {
    /// 检查 recipe 是否存在
    pub fn recipe_exists(recipe: &str) -> bool {
        Self::get(&recipe_path(recipe)).is_some()
    }

    /// 读取并解析 recipe（未替换占位符）
    pub fn load(recipe: &str) -> Result<Mapping> {
        let file = Self::get(&recipe_path(recipe)).ok_or_else(|| ProjectError::UnknownRecipe {
            recipe: recipe.to_string(),
        })?;

        let content = std::str::from_utf8(file.data.as_ref()).map_err(|e| {
            ProjectError::InvalidRecipe {
                recipe: recipe.to_string(),
                message: e.to_string(),
            }
        })?;

        match serde_yaml::from_str::<Value>(content)? {
            Value::Mapping(map) => Ok(map),
            _ => Err(ProjectError::InvalidRecipe {
                recipe: recipe.to_string(),
                message: "top level must be a mapping".to_string(),
            }),
        }
    }

    /// 列出所有 recipe，按名称排序
    pub fn list_recipes() -> Vec<RecipeInfo> {
        let mut names: Vec<String> = Self::iter()
            .filter_map(|path| {
                path.strip_suffix(&format!("/{}", RECIPE_FILE))
                    .map(str::to_string)
            })
            .collect();
        names.sort();

        names
            .into_iter()
            .filter_map(|name| match Self::load(&name) {
                Ok(recipe) => Some(RecipeInfo {
                    description: recipe
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    placeholders: collect_placeholder_names(&Value::Mapping(recipe)),
                    name,
                }),
                Err(e) => {
                    tracing::warn!(recipe = %name, error = %e, "skipping unreadable recipe");
                    None
                }
            })
            .collect()
    }
}

fn recipe_path(recipe: &str) -> String {
    format!("{}/{}", recipe, RECIPE_FILE)
}

/// 按名称加载 recipe 并应用取值
///
/// 找不到取值的占位符保留原样，方便调用方检查还缺哪些输入。
pub fn configure_project_by_recipe(recipe: &str, values: &FormattingContext) -> Result<Mapping> {
    let config = RecipeAssets::load(recipe)?;
    tracing::debug!(recipe, "applying formatting context to recipe");
    Ok(apply_to_mapping(&config, values, false))
}

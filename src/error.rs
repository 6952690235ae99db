//! 错误类型
//!
//! 库对外暴露的统一错误，CLI 层再包装为 anyhow

use std::path::PathBuf;
use thiserror::Error;

/// 使用 ProjectError 的 Result 别名
pub type Result<T> = std::result::Result<T, ProjectError>;

/// 项目管理错误
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Unknown recipe '{recipe}' provided.")]
    UnknownRecipe { recipe: String },

    #[error("Recipe '{recipe}' is malformed: {message}")]
    InvalidRecipe { recipe: String, message: String },

    #[error(
        "Your flow entrypoint must include the name of the function that is the entrypoint to your flow.\nTry {entrypoint}:<flow_name>"
    )]
    MissingFlowName { entrypoint: String },

    #[error("No .prefect directory could be found - run `prefect-project init` to create one.")]
    MarkerNotFound,

    #[error("Entrypoint {} is not inside the project at {}", .path.display(), .root.display())]
    OutsideProject { path: PathBuf, root: PathBuf },

    #[error("Conflicting entry found for flow with name '{name}':\n{name}: {existing}\nnew entrypoint: {new}")]
    ConflictingFlow {
        name: String,
        existing: String,
        new: String,
    },

    #[error("Function '{function}' not found in {}", .path.display())]
    FunctionNotFound { path: PathBuf, function: String },

    #[error("Function '{function}' in {} is not decorated with @flow", .path.display())]
    NotAFlow { path: PathBuf, function: String },

    #[error("Could not find `prefect.yaml` or `deployment.yaml` files.")]
    MigrationFilesMissing,

    #[error("deployment.yaml must contain a mapping, found {found}")]
    InvalidDeploymentFile { found: String },

    #[error("Invalid field '{0}', expected KEY=VALUE")]
    InvalidField(String),

    #[error("Flow loader task failed: {0}")]
    LoaderTask(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProjectError {
    /// 是否属于"找不到"类的前置条件错误
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MarkerNotFound | Self::MigrationFilesMissing | Self::FunctionNotFound { .. }
        )
    }
}

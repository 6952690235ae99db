//! 嵌入资源与模板替换
//!
//! 使用 rust-embed 将 recipe 和默认模板编译进二进制

pub mod files;
pub mod recipes;
pub mod values;

pub use files::TemplateAssets;
pub use recipes::{configure_project_by_recipe, RecipeAssets, RecipeInfo};
pub use values::{apply_values, find_placeholders, FormattingContext, Placeholder};

//! 项目管理模块
//!
//! 提供项目根目录查找、初始化、flow 注册和旧格式迁移

pub mod config;
pub mod initializer;
pub mod migration;
pub mod registry;
pub mod root_finder;

// 重导出
pub use config::{create_default_prefect_yaml, PREFECT_FILE};
pub use initializer::{infer_recipe, initialize_project, parse_field, InitOptions};
pub use migration::copy_deployments_into_prefect_file;
pub use registry::{register_flow, FlowRegistry};
pub use root_finder::{find_prefect_directory, find_project_root, PREFECT_DIR};

// Prefect Projects - Library Root
//
// 项目脚手架：recipe 模板、.prefect 标记目录查找、flow 注册表

pub mod error;
pub mod flows;
pub mod project;
pub mod templates;
pub mod utils;

// 重新导出常用类型
pub use error::{ProjectError, Result};
pub use flows::{Flow, FlowLoader, PythonFlowLoader};
pub use project::{find_prefect_directory, find_project_root, initialize_project, InitOptions};

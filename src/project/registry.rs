//! Flow 注册表
//!
//! `.prefect/flows.json` 记录 flow 名称到 entrypoint 的映射。
//! 每次注册都会整体读取、修改、覆盖写回，没有加锁，并发写入时后写者生效。

use crate::error::{ProjectError, Result};
use crate::flows::{Flow, FlowLoader};
use crate::project::root_finder::find_prefect_directory;
use crate::utils::{read_json_if_exists, resolve_path, to_slash_path, write_json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 注册表文件名
pub const FLOWS_FILE: &str = "flows.json";

/// Flow 注册表
#[derive(Debug, Clone)]
pub struct FlowRegistry {
    path: PathBuf,
    flows: BTreeMap<String, String>,
}

impl FlowRegistry {
    /// 从 `.prefect` 目录加载注册表，文件不存在时为空
    pub fn load(prefect_dir: &Path) -> Result<Self> {
        let path = prefect_dir.join(FLOWS_FILE);
        let flows = read_json_if_exists(&path)?;
        Ok(Self { path, flows })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.flows.get(name).map(String::as_str)
    }

    /// 按名称排序的所有条目
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.flows.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// 插入或覆盖条目
    ///
    /// 同名 flow 已指向不同 entrypoint 且未指定 `force` 时返回冲突错误，注册表不变
    pub fn insert(&mut self, name: &str, entrypoint: &str, force: bool) -> Result<()> {
        if let Some(existing) = self.flows.get(name) {
            if existing != entrypoint {
                if !force {
                    return Err(ProjectError::ConflictingFlow {
                        name: name.to_string(),
                        existing: existing.clone(),
                        new: entrypoint.to_string(),
                    });
                }
                tracing::warn!(flow = name, old = %existing, new = entrypoint, "overwriting flow entry");
            }
        }
        self.flows.insert(name.to_string(), entrypoint.to_string());
        Ok(())
    }

    /// 整体覆盖写回（键排序，两空格缩进）
    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.flows)?;
        Ok(())
    }
}

/// 拆分 `path:function` 形式的 entrypoint（按最后一个冒号）
pub fn split_entrypoint(entrypoint: &str) -> Result<(&str, &str)> {
    entrypoint
        .rsplit_once(':')
        .ok_or_else(|| ProjectError::MissingFlowName {
            entrypoint: entrypoint.to_string(),
        })
}

/// 将 flow 注册到 `dir` 所在项目
///
/// entrypoint 的路径部分相对 `dir` 解析，写入注册表时改写为相对项目根目录的路径。
/// flow 加载在 blocking 线程池中执行。
pub async fn register_flow(
    dir: &Path,
    entrypoint: &str,
    force: bool,
    loader: Arc<dyn FlowLoader>,
) -> Result<Flow> {
    let (file_part, function) = split_entrypoint(entrypoint)?;

    let file_path = resolve_path(&dir.join(file_part));
    let prefect_dir = find_prefect_directory(dir).ok_or(ProjectError::MarkerNotFound)?;
    let project_root = prefect_dir
        .parent()
        .ok_or(ProjectError::MarkerNotFound)?
        .to_path_buf();

    let relative = file_path
        .strip_prefix(&project_root)
        .map_err(|_| ProjectError::OutsideProject {
            path: file_path.clone(),
            root: project_root.clone(),
        })?;
    let normalized = format!("{}:{}", to_slash_path(relative), function);

    let flow = {
        let function = function.to_string();
        let file_path = file_path.clone();
        tokio::task::spawn_blocking(move || loader.load(&file_path, &function))
            .await
            .map_err(|e| ProjectError::LoaderTask(e.to_string()))??
    };

    let mut registry = FlowRegistry::load(&prefect_dir)?;
    registry.insert(&flow.name, &normalized, force)?;
    registry.save()?;

    tracing::info!(flow = %flow.name, entrypoint = %normalized, "registered flow");
    Ok(flow)
}

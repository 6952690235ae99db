//! 项目根目录查找
//!
//! 从起始目录向上逐级查找 `.prefect` 标记目录，直到文件系统根目录。

use crate::utils::{dir_exists, resolve_path};
use std::path::{Path, PathBuf};

/// 项目标记目录名
pub const PREFECT_DIR: &str = ".prefect";

/// 查找 `.prefect` 标记目录
///
/// 起始路径先解析为绝对路径，然后依次检查自身及每一级父目录。
///
/// # Returns
///
/// 返回找到的 `.prefect` 目录的绝对路径，找不到返回 None
pub fn find_prefect_directory(start: &Path) -> Option<PathBuf> {
    let start = resolve_path(start);

    start
        .ancestors()
        .map(|candidate| candidate.join(PREFECT_DIR))
        .find(|marker| dir_exists(marker))
}

/// 查找项目根目录（`.prefect` 所在目录）
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    find_prefect_directory(start).and_then(|marker| marker.parent().map(Path::to_path_buf))
}

//! 文件系统工具

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// 安全读取文件内容
pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// 安全写入文件（整体覆盖）
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    // 确保父目录存在
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// 文件不存在时写入，返回是否写入
///
/// 已存在的路径（包括同名目录）一律跳过，不会覆盖
pub fn write_file_if_missing(path: &Path, content: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    write_file(path, content)?;
    Ok(true)
}

/// 追加内容到文件
pub fn append_file(path: &Path, content: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io::Write;

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open file for append: {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to append to file: {}", path.display()))
}

/// 检查文件是否存在
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// 检查目录是否存在
pub fn dir_exists(path: &Path) -> bool {
    path.is_dir()
}

/// 创建私有目录（unix 下权限 0o700）
pub fn create_private_dir(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder
        .create(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// 解析为绝对路径
///
/// 路径存在时取 canonicalize 结果（解析符号链接），否则退回到词法上的绝对路径
pub fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// 将路径格式化为 `/` 分隔的相对路径字符串
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

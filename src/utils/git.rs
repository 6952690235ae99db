//! Git 操作工具

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// 执行 git 命令并返回输出
pub fn git_command(args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args).stdin(Stdio::null());

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().context("Failed to execute git command")?;

    if !output.status.success() {
        anyhow::bail!(
            "Git command failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// 获取 remote origin URL
///
/// 不在 git 仓库、没有 origin、git 不可用时均返回 None
pub fn get_git_remote_origin_url(cwd: &Path) -> Option<String> {
    match git_command(&["config", "--get", "remote.origin.url"], Some(cwd)) {
        Ok(url) if !url.is_empty() => Some(url),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %format!("{:#}", e), "no git remote origin");
            None
        }
    }
}

/// 获取当前分支名
pub fn get_git_branch(cwd: &Path) -> Option<String> {
    match git_command(&["rev-parse", "--abbrev-ref", "HEAD"], Some(cwd)) {
        Ok(branch) if !branch.is_empty() => Some(branch),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %format!("{:#}", e), "could not determine git branch");
            None
        }
    }
}

//! 项目初始化
//!
//! 根据 git 信息和 Dockerfile 推断 recipe，生成 .prefectignore、prefect.yaml
//! 和 .prefect 目录。每一步都先检查是否已存在，因此可以重复执行。

use crate::error::{ProjectError, Result};
use crate::project::config::{create_default_prefect_yaml, PREFECT_FILE};
use crate::project::root_finder::PREFECT_DIR;
use crate::templates::values::collect_placeholder_names;
use crate::templates::{configure_project_by_recipe, FormattingContext, TemplateAssets};
use crate::utils::{
    create_private_dir, get_git_branch, get_git_remote_origin_url, resolve_path,
    write_file_if_missing,
};
use serde_yaml::Value;
use std::path::Path;

/// 默认忽略文件名
pub const IGNORE_FILE: &str = ".prefectignore";

/// 未检测到分支时使用的默认分支
const DEFAULT_BRANCH: &str = "main";

/// 初始化选项
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// 项目名称，默认使用目录名
    pub name: Option<String>,
    /// 显式指定的 recipe，默认自动推断
    pub recipe: Option<String>,
    /// 额外的占位符取值，覆盖推断出的同名取值
    pub inputs: FormattingContext,
}

/// 根据环境推断 recipe
pub fn infer_recipe(is_git_based: bool, has_dockerfile: bool) -> &'static str {
    match (is_git_based, has_dockerfile) {
        (true, true) => "docker-git",
        (true, false) => "git",
        (false, true) => "docker",
        (false, false) => "local",
    }
}

/// 解析 `KEY=VALUE` 形式的输入
pub fn parse_field(field: &str) -> Result<(String, String)> {
    match field.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ProjectError::InvalidField(field.to_string())),
    }
}

/// 初始化项目
///
/// # Returns
///
/// 本次实际创建的文件和目录；全部已存在时返回空列表
pub fn initialize_project(dir: &Path, options: &InitOptions) -> Result<Vec<String>> {
    let dir = resolve_path(dir);
    let dir_name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut formatting = FormattingContext::new();
    formatting.insert("directory".to_string(), dir.display().to_string());

    let remote_url = get_git_remote_origin_url(&dir);
    let is_git_based = remote_url.is_some();
    if let Some(url) = remote_url {
        formatting.insert("repository".to_string(), url);
        let branch = get_git_branch(&dir).unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        formatting.insert("branch".to_string(), branch);
    }

    formatting.insert("name".to_string(), dir_name.clone());

    let has_dockerfile = dir.join("Dockerfile").exists();
    if has_dockerfile {
        formatting.insert("dockerfile".to_string(), "Dockerfile".to_string());
    } else if options.recipe.as_deref().is_some_and(|r| r.contains("docker")) {
        formatting.insert("dockerfile".to_string(), "auto".to_string());
    }

    let recipe = match options.recipe.as_deref() {
        Some(recipe) => recipe,
        None => infer_recipe(is_git_based, has_dockerfile),
    };
    tracing::info!(recipe, is_git_based, has_dockerfile, "initializing project");

    formatting.extend(options.inputs.clone());
    let configuration = configure_project_by_recipe(recipe, &formatting)?;

    let unresolved = collect_placeholder_names(&Value::Mapping(configuration.clone()));
    if !unresolved.is_empty() {
        tracing::info!(
            placeholders = %unresolved.join(", "),
            "recipe has unresolved placeholders, pass them with --field KEY=VALUE"
        );
    }

    let project_name = options.name.clone().unwrap_or(dir_name);

    let mut files = Vec::new();
    if create_default_ignore_file(&dir)? {
        files.push(IGNORE_FILE.to_string());
    }
    if create_default_prefect_yaml(&dir, &project_name, Some(configuration))? {
        files.push(PREFECT_FILE.to_string());
    }
    if set_prefect_hidden_dir(&dir)? {
        files.push(format!("{}/", PREFECT_DIR));
    }

    for file in &files {
        tracing::info!(file = %file, "created");
    }

    Ok(files)
}

/// 创建默认 .prefectignore，已存在时跳过
pub fn create_default_ignore_file(dir: &Path) -> Result<bool> {
    let content = TemplateAssets::get_prefectignore()?;
    Ok(write_file_if_missing(&dir.join(IGNORE_FILE), &content)?)
}

/// 创建 .prefect 目录，已存在同名路径时跳过
pub fn set_prefect_hidden_dir(dir: &Path) -> Result<bool> {
    let marker = dir.join(PREFECT_DIR);
    if marker.exists() {
        return Ok(false);
    }
    create_private_dir(&marker)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::config::load_prefect_yaml;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    fn git(repo: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(repo)
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_infer_recipe() {
        assert_eq!(infer_recipe(false, true), "docker");
        assert_eq!(infer_recipe(true, false), "git");
        assert_eq!(infer_recipe(true, true), "docker-git");
        assert_eq!(infer_recipe(false, false), "local");
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("image_name=acme/etl").unwrap(),
            ("image_name".to_string(), "acme/etl".to_string())
        );
        assert_eq!(
            parse_field("tag=a=b").unwrap(),
            ("tag".to_string(), "a=b".to_string())
        );
        assert!(matches!(parse_field("novalue"), Err(ProjectError::InvalidField(_))));
        assert!(matches!(parse_field("=x"), Err(ProjectError::InvalidField(_))));
    }

    #[test]
    fn test_initialize_local_project() {
        let temp = TempDir::new().unwrap();
        let files = initialize_project(temp.path(), &InitOptions::default()).unwrap();

        assert_eq!(files, vec![".prefectignore", "prefect.yaml", ".prefect/"]);
        assert!(temp.path().join(".prefect").is_dir());

        let config = load_prefect_yaml(temp.path()).unwrap().unwrap();
        let dir_name = temp.path().file_name().unwrap().to_string_lossy();
        assert_eq!(config["name"].as_str(), Some(dir_name.as_ref()));

        let directory = config["pull"][0]["prefect.deployments.steps.set_working_directory"]
            ["directory"]
            .as_str()
            .unwrap();
        assert_eq!(Path::new(directory), resolve_path(temp.path()));
    }

    #[test]
    fn test_rerun_creates_nothing() {
        let temp = TempDir::new().unwrap();
        initialize_project(temp.path(), &InitOptions::default()).unwrap();
        let before = fs::read_to_string(temp.path().join(PREFECT_FILE)).unwrap();

        let options = InitOptions {
            name: Some("renamed".to_string()),
            recipe: Some("docker".to_string()),
            ..Default::default()
        };
        let files = initialize_project(temp.path(), &options).unwrap();

        assert!(files.is_empty());
        let after = fs::read_to_string(temp.path().join(PREFECT_FILE)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_partial_state_is_completed() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(IGNORE_FILE), "custom\n").unwrap();

        let files = initialize_project(temp.path(), &InitOptions::default()).unwrap();
        assert_eq!(files, vec!["prefect.yaml", ".prefect/"]);
        assert_eq!(
            fs::read_to_string(temp.path().join(IGNORE_FILE)).unwrap(),
            "custom\n"
        );
    }

    #[test]
    fn test_dockerfile_selects_docker_recipe() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Dockerfile"), "FROM python:3.11\n").unwrap();

        initialize_project(temp.path(), &InitOptions::default()).unwrap();
        let config = load_prefect_yaml(temp.path()).unwrap().unwrap();

        let build = &config["build"][0]["prefect_docker.deployments.steps.build_docker_image"];
        assert_eq!(build["dockerfile"].as_str(), Some("Dockerfile"));
        assert!(config["pull"][0]
            .get("prefect.deployments.steps.set_working_directory")
            .is_some());
    }

    #[test]
    fn test_explicit_docker_recipe_without_dockerfile() {
        let temp = TempDir::new().unwrap();
        let options = InitOptions {
            recipe: Some("docker".to_string()),
            ..Default::default()
        };
        initialize_project(temp.path(), &options).unwrap();

        let config = load_prefect_yaml(temp.path()).unwrap().unwrap();
        let build = &config["build"][0]["prefect_docker.deployments.steps.build_docker_image"];
        assert_eq!(build["dockerfile"].as_str(), Some("auto"));
    }

    #[test]
    fn test_inputs_override_inferred_values() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Dockerfile"), "FROM python:3.11\n").unwrap();

        let mut inputs = FormattingContext::new();
        inputs.insert("name".to_string(), "custom".to_string());
        inputs.insert("image_name".to_string(), "acme/etl".to_string());
        let options = InitOptions {
            name: Some("project-name".to_string()),
            inputs,
            ..Default::default()
        };
        initialize_project(temp.path(), &options).unwrap();

        let config = load_prefect_yaml(temp.path()).unwrap().unwrap();
        assert_eq!(config["name"].as_str(), Some("project-name"));
        let build = &config["build"][0]["prefect_docker.deployments.steps.build_docker_image"];
        assert_eq!(build["image_name"].as_str(), Some("acme/etl"));
        assert_eq!(build["tag"].as_str(), Some("{{ tag }}"));
        let pull = &config["pull"][0]["prefect.deployments.steps.set_working_directory"];
        assert_eq!(pull["directory"].as_str(), Some("/opt/prefect/custom"));
    }

    #[test]
    fn test_unknown_recipe_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let options = InitOptions {
            recipe: Some("kubernetes".to_string()),
            ..Default::default()
        };
        let err = initialize_project(temp.path(), &options).unwrap_err();
        assert!(matches!(err, ProjectError::UnknownRecipe { .. }));
        assert!(!temp.path().join(PREFECT_FILE).exists());
    }

    #[test]
    fn test_git_repository_selects_git_recipe() {
        let temp = TempDir::new().unwrap();
        git(temp.path(), &["init"]);
        git(
            temp.path(),
            &["remote", "add", "origin", "https://github.com/acme/etl.git"],
        );

        initialize_project(temp.path(), &InitOptions::default()).unwrap();
        let config = load_prefect_yaml(temp.path()).unwrap().unwrap();

        let clone = &config["pull"][0]["prefect.deployments.steps.git_clone"];
        assert_eq!(
            clone["repository"].as_str(),
            Some("https://github.com/acme/etl.git")
        );
        // 没有提交时无法解析 HEAD，回退到 main
        assert_eq!(clone["branch"].as_str(), Some("main"));
        assert_eq!(config["build"], Value::Null);
    }

    #[test]
    fn test_git_and_dockerfile_select_docker_git() {
        let temp = TempDir::new().unwrap();
        git(temp.path(), &["init"]);
        git(
            temp.path(),
            &["remote", "add", "origin", "git@github.com:acme/etl.git"],
        );
        fs::write(temp.path().join("Dockerfile"), "FROM python:3.11\n").unwrap();

        initialize_project(temp.path(), &InitOptions::default()).unwrap();
        let config = load_prefect_yaml(temp.path()).unwrap().unwrap();

        assert!(config["build"][0]
            .get("prefect_docker.deployments.steps.build_docker_image")
            .is_some());
        assert!(config["pull"][0]
            .get("prefect.deployments.steps.git_clone")
            .is_some());
    }
}

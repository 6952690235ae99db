use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prefect_projects::project::{
    copy_deployments_into_prefect_file, find_project_root, initialize_project, parse_field,
    register_flow, FlowRegistry, InitOptions,
};
use prefect_projects::templates::RecipeAssets;
use prefect_projects::{find_prefect_directory, PythonFlowLoader};

/// Prefect project scaffolding
///
/// 初始化项目目录、注册 flow、迁移旧版 deployment.yaml
#[derive(Parser)]
#[command(name = "prefect-project")]
#[command(author, version, about)]
struct Cli {
    /// 提高日志级别（-v 为 info，-vv 为 debug）
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化项目 - 创建 .prefectignore、prefect.yaml 和 .prefect 目录
    Init {
        /// 项目名称（默认使用当前目录名）
        #[arg(short, long)]
        name: Option<String>,

        /// recipe 名称（默认根据 git 和 Dockerfile 推断）
        #[arg(short, long)]
        recipe: Option<String>,

        /// recipe 占位符取值，格式 KEY=VALUE，可重复
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// 注册 flow，entrypoint 格式为 path/to/file.py:function_name
    Register {
        entrypoint: String,

        /// 覆盖同名 flow 的已有条目
        #[arg(long)]
        force: bool,
    },

    /// 列出已注册的 flow
    Flows,

    /// 列出内嵌的 recipe
    Recipes,

    /// 显示项目根目录
    Root,

    /// 将 deployment.yaml 合并进 prefect.yaml
    Migrate,
}

// ═══════════════════════════════════════════════════════════════════
// 日志
// ═══════════════════════════════════════════════════════════════════

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// ═══════════════════════════════════════════════════════════════════
// 命令实现
// ═══════════════════════════════════════════════════════════════════

fn init(cwd: &Path, name: Option<String>, recipe: Option<String>, fields: Vec<String>) -> Result<()> {
    let mut options = InitOptions {
        name,
        recipe,
        ..Default::default()
    };
    for field in &fields {
        let (key, value) = parse_field(field)?;
        options.inputs.insert(key, value);
    }

    let files = initialize_project(cwd, &options)?;

    if files.is_empty() {
        println!("{}", "Project already initialized - nothing to create".yellow());
        return Ok(());
    }

    println!("{}", "✅ Project initialized!".green().bold());
    for file in &files {
        println!("   {} {}", "Created".green(), file.cyan());
    }
    println!();
    println!(
        "💡 Tip: Register a flow with {}",
        "prefect-project register path/to/flows.py:my_flow".cyan()
    );

    Ok(())
}

async fn register(cwd: &Path, entrypoint: &str, force: bool) -> Result<()> {
    let flow = register_flow(cwd, entrypoint, force, Arc::new(PythonFlowLoader::new())).await?;

    println!(
        "{} Registered flow {}",
        "✓".green(),
        format!("'{}'", flow.name).yellow()
    );
    if let Some(description) = &flow.description {
        println!("   {}", description);
    }

    Ok(())
}

fn list_flows(cwd: &Path) -> Result<()> {
    let prefect_dir = find_prefect_directory(cwd)
        .context("No .prefect directory found. Run 'prefect-project init' first.")?;
    let registry = FlowRegistry::load(&prefect_dir)?;

    if registry.is_empty() {
        println!("No flows registered.");
        return Ok(());
    }

    println!("{}", "📦 Registered flows:".cyan().bold());
    println!();
    for (name, entrypoint) in registry.entries() {
        println!("  {} {} → {}", "•".green(), name.yellow(), entrypoint);
    }

    Ok(())
}

fn list_recipes() -> Result<()> {
    println!("{}", "📦 Available recipes:".cyan().bold());
    println!();

    for recipe in RecipeAssets::list_recipes() {
        println!(
            "  {} {:<12} {}",
            "•".green(),
            recipe.name.yellow(),
            recipe.description.as_deref().unwrap_or("")
        );
        if !recipe.placeholders.is_empty() {
            println!("    inputs: {}", recipe.placeholders.join(", ").dimmed());
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = env::current_dir().context("Failed to read current directory")?;

    match cli.command {
        Commands::Init {
            name,
            recipe,
            fields,
        } => init(&cwd, name, recipe, fields),
        Commands::Register { entrypoint, force } => register(&cwd, &entrypoint, force).await,
        Commands::Flows => list_flows(&cwd),
        Commands::Recipes => list_recipes(),
        Commands::Root => {
            match find_project_root(&cwd) {
                Some(root) => println!("{}", root.display()),
                None => {
                    eprintln!("{}", "No .prefect directory found".red());
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Migrate => {
            copy_deployments_into_prefect_file(&cwd)?;
            println!("{}", "✅ Copied deployments into prefect.yaml".green());
            Ok(())
        }
    }
}

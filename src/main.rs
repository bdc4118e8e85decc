use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use minigit_ui::actions::Submission;
use minigit_ui::api::HttpApi;
use minigit_ui::app::{App, UiEvent};
use minigit_ui::clipboard::Copier;
use minigit_ui::config;
use minigit_ui::format::{format_date, format_file_size};
use minigit_ui::modal::{CLONE_MODAL, CREATE_MODAL};
use minigit_ui::repo_page::repository_path_from_location;
use minigit_ui::terminal::TerminalView;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "minigit-ui", version, about = "Terminal client for the minigit web UI")]
struct Cli {
    /// 服务地址（默认读取 config.toml）
    #[arg(long, global = true)]
    server: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 初始化本地配置
    Init,
    /// 刷新并列出仓库
    Repos {
        /// 输出侧边栏 HTML 片段
        #[arg(long)]
        html: bool,
    },
    /// 克隆远程仓库到本地路径
    Clone {
        #[arg(long)]
        url: String,
        #[arg(long)]
        path: String,
    },
    /// 新建仓库（名称只能包含字母、数字、点、连字符、下划线）
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        path: String,
    },
    /// 查询一次仓库状态（路径或 /repository/... 地址）
    Status {
        #[arg(long)]
        repo: String,
    },
    /// 定期轮询仓库状态，Ctrl-C 退出
    Watch {
        #[arg(long)]
        repo: String,
    },
    /// 格式化文件大小
    Size { bytes: u64 },
    /// 格式化日期（相对时间）
    Date { value: String },
    /// 复制文本到剪贴板
    Copy { text: String },
}

fn field(modal: &str, field: &str, value: String) -> UiEvent {
    UiEvent::FieldInput {
        modal: modal.to_string(),
        field: field.to_string(),
        value,
    }
}

fn repo_path(repo: String) -> String {
    repository_path_from_location(&repo).unwrap_or(repo)
}

fn expect_success(out: Submission) -> Result<()> {
    match out {
        Submission::Succeeded => Ok(()),
        Submission::Invalid(e) => bail!("{e}"),
        Submission::Refused(msg) => bail!("{msg}"),
        Submission::Unreachable => bail!("server unreachable"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = config::data_dir()?;
    let cfg_path = config::config_path(&data_dir);
    config::ensure_data_dir(&data_dir)?;
    let mut cfg = config::Config::load_or_create(&cfg_path)?;

    if let Command::Init = cli.command {
        if let Some(server) = cli.server {
            cfg.server_url = server;
            cfg.save(&cfg_path)?;
        }
        println!("Initialized.");
        println!("Config: {}", cfg_path.display());
        println!("Server: {}", cfg.server_url);
        return Ok(());
    }

    match &cli.command {
        Command::Size { bytes } => {
            println!("{}", format_file_size(*bytes));
            return Ok(());
        }
        Command::Date { value } => {
            let formatted = format_date(value).with_context(|| format!("unrecognised date {value}"))?;
            println!("{formatted}");
            return Ok(());
        }
        _ => {}
    }

    if let Some(server) = cli.server {
        cfg.server_url = server;
    }
    let html = matches!(cli.command, Command::Repos { html: true });
    let timing = cfg.timing();
    let api = Arc::new(HttpApi::new(&cfg.server_url)?);
    let view = Arc::new(TerminalView::new(api.base_url()).with_html(html));
    let app = App::new(api, view, timing, |toaster| {
        Copier::system(toaster, timing.short_toast)
    });

    match cli.command {
        Command::Init | Command::Size { .. } | Command::Date { .. } => {}
        Command::Repos { .. } => {
            if !app.sidebar.refresh().await {
                bail!("could not load repositories");
            }
        }
        Command::Clone { url, path } => {
            app.handle(UiEvent::OpenClone).await;
            app.handle(field(CLONE_MODAL, "repo_url", url)).await;
            app.handle(field(CLONE_MODAL, "local_path", path)).await;
            let out = app.actions.submit_clone_form().await;
            app.actions.settle().await;
            expect_success(out)?;
        }
        Command::Create { name, path } => {
            app.handle(UiEvent::OpenCreate).await;
            app.handle(field(CREATE_MODAL, "repo_name", name)).await;
            app.handle(field(CREATE_MODAL, "repo_path", path)).await;
            let out = app.actions.submit_create_form().await;
            app.actions.settle().await;
            expect_success(out)?;
        }
        Command::Status { repo } => {
            let repo = repo_path(repo);
            let page = app.enter_repository(&repo, "overview");
            page.stop_polling();
            page.refresh_status()
                .await
                .with_context(|| format!("could not load status of {repo}"))?;
            app.leave_repository();
        }
        Command::Watch { repo } => {
            let repo = repo_path(repo);
            let page = app.enter_repository(&repo, "overview");
            page.refresh_status().await;
            tokio::signal::ctrl_c().await.context("wait for ctrl-c")?;
            app.leave_repository();
        }
        Command::Copy { text } => {
            if !app.copy(&text) {
                bail!("could not copy to clipboard");
            }
        }
    }

    Ok(())
}

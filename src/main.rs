use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskd::{
    client::{
        board::{format_time_12hr, TaskBoard},
        ApiClient,
    },
    config::ServerConfig,
    rest,
    storage::{Storage, TaskRow},
    AppContext,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "Task manager — REST API server and terminal board",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Data directory for the SQLite database and config.toml
    #[arg(long, env = "TASKD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Browser origin allowed by CORS
    #[arg(long, env = "TASKD_FRONTEND_ORIGIN")]
    frontend_origin: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKD_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the task API server (default when no subcommand given).
    Serve,
    /// Fetch the task list once and print the pending/completed board.
    Board {
        /// Task API base URL (default: http://localhost:8080)
        #[arg(long, env = "TASKD_API_URL")]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Board { api_url }) => {
            // The board talks to a remote server and never reads a data dir,
            // so CLI/env settings are all there is to resolve.
            let log_level = args.log.as_deref().unwrap_or("info").to_owned();
            let log_format =
                std::env::var("TASKD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
            let _file_guard = setup_logging(&log_level, args.log_file.as_deref(), &log_format);
            run_board(api_url).await
        }
        Some(Command::Serve) | None => {
            serve(
                args.port,
                args.data_dir,
                args.log,
                args.frontend_origin,
                args.log_file,
            )
            .await
        }
    }
}

async fn serve(
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    log: Option<String>,
    frontend_origin: Option<String>,
    log_file: Option<PathBuf>,
) -> Result<()> {
    // Resolve config first so the TOML layer participates in the log
    // level/format, then init tracing before anything else logs.
    let config = Arc::new(ServerConfig::new(port, data_dir, log, frontend_origin));
    let _file_guard = setup_logging(&config.log, log_file.as_deref(), &config.log_format);
    info!(
        db = %config.db_path.display(),
        origin = %config.frontend_origin,
        "starting taskd"
    );

    let storage = Arc::new(Storage::open(&config.db_path, config.slow_query_threshold_ms).await?);
    let ctx = Arc::new(AppContext {
        config,
        storage,
        started_at: std::time::Instant::now(),
    });

    rest::start_rest_server(ctx).await
}

async fn run_board(api_url: Option<String>) -> Result<()> {
    let client = match api_url {
        Some(url) => ApiClient::new(url)?,
        None => ApiClient::from_env()?,
    };
    let mut board = TaskBoard::new(client);
    board.refresh().await?;

    print_section("Pending Tasks", &board.pending());
    println!();
    print_section("Completed Tasks", &board.completed());
    Ok(())
}

fn print_section(heading: &str, tasks: &[&TaskRow]) {
    println!("{heading}");
    println!("{}", "-".repeat(64));
    if tasks.is_empty() {
        println!("No tasks!");
        return;
    }
    for t in tasks {
        let date = if t.date.is_empty() { "No date" } else { &t.date };
        let category = if t.category.is_empty() {
            String::new()
        } else {
            format!("  [{}]", t.category)
        };
        println!(
            "{:<36} {:>8}  {:<12}{}",
            t.title,
            format_time_12hr(&t.time),
            date,
            category
        );
    }
}

/// Configure tracing output. Returns a guard that must stay alive for the
/// duration of the program when file logging is active.
fn setup_logging(
    log_level: &str,
    log_file: Option<&Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("taskd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stdout-only — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            init_stdout_logging(log_level, use_json);
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
                .init();
        }
        Some(guard)
    } else {
        init_stdout_logging(log_level, use_json);
        None
    }
}

/// Shared stdout-only subscriber setup for the no-file and bad-log-dir paths.
fn init_stdout_logging(log_level: &str, use_json: bool) {
    if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
    }
}

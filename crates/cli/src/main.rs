use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use repochat_cli::{load_config, router, AppState, ConfigOverrides, LlmArgs};
use repochat_pipeline::{ChatService, FileSystemRepository, Orchestrator, PipelineConfig};
use repochat_vector_store::MemoryIndex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "repochat")]
#[command(about = "Repository analysis and code chat", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML configuration file
    #[arg(long, global = true, env = "REPOCHAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the analysis and chat API over HTTP
    Serve(ServeArgs),

    /// Analyze one repository and print its status and dependency graph as JSON
    Analyze(AnalyzeArgs),

    /// Analyze one repository, then answer a question about it
    Chat(ChatArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Directory holding one checkout per repository id
    #[arg(long, env = "REPOCHAT_REPOS")]
    repos: PathBuf,

    #[command(flatten)]
    llm: LlmArgs,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Repository id (subdirectory of --repos)
    repository: String,

    /// Directory holding one checkout per repository id
    #[arg(long, env = "REPOCHAT_REPOS")]
    repos: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ChatArgs {
    /// Repository id (subdirectory of --repos)
    repository: String,

    /// Question about the repository
    query: String,

    /// Directory holding one checkout per repository id
    #[arg(long, env = "REPOCHAT_REPOS")]
    repos: PathBuf,

    #[command(flatten)]
    llm: LlmArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(cli.config.as_deref(), &cli.overrides)?;

    match cli.command {
        Commands::Serve(args) => serve(args, config).await?,
        Commands::Analyze(args) => run_analyze(args, config).await?,
        Commands::Chat(args) => run_chat(args, config).await?,
    }

    Ok(())
}

fn build_orchestrator(repos: &Path, config: PipelineConfig) -> Result<Arc<Orchestrator>> {
    if !repos.is_dir() {
        bail!("Repository root does not exist: {}", repos.display());
    }
    let repository = Arc::new(FileSystemRepository::new(repos, config.max_file_bytes));
    let orchestrator = Orchestrator::new(config, repository, Arc::new(MemoryIndex::default()))
        .context("Failed to initialise pipeline")?;
    Ok(Arc::new(orchestrator))
}

async fn serve(args: ServeArgs, config: PipelineConfig) -> Result<()> {
    let orchestrator = build_orchestrator(&args.repos, config)?;
    let chat = args
        .llm
        .generator()?
        .map(|generator| ChatService::new(orchestrator.gateway().clone(), generator));
    if chat.is_none() {
        log::warn!("No answer generator configured; /api/v1/chat is disabled");
    }

    let app = router(Arc::new(AppState { orchestrator, chat }));
    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    let addr = listener.local_addr()?;

    println!("Serving repochat API on http://{addr}/api/v1");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

async fn run_analyze(args: AnalyzeArgs, config: PipelineConfig) -> Result<()> {
    let orchestrator = build_orchestrator(&args.repos, config)?;
    let status = orchestrator.analyze(&args.repository).await?;
    let graph = orchestrator.graph(&args.repository);
    let success = status.success;

    let output = serde_json::json!({
        "status": status,
        "graph": graph.as_ref(),
    });
    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    print_stdout(&text)?;

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_chat(args: ChatArgs, config: PipelineConfig) -> Result<()> {
    let Some(generator) = args.llm.generator()? else {
        bail!("chat requires --llm-url and --llm-model");
    };
    let orchestrator = build_orchestrator(&args.repos, config)?;

    let status = orchestrator.analyze(&args.repository).await?;
    if !status.success {
        bail!(
            "Analysis of {} failed at {}: {}",
            args.repository,
            status.current_step,
            status.error.unwrap_or_default()
        );
    }

    let chat = ChatService::new(orchestrator.gateway().clone(), generator);
    let answer = chat.chat(&args.query).await?;
    print_stdout(&answer)
}

//! CLI entrypoint for codecouncil
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use council_application::{
    AuditEvent, FeedbackProcessor, FeedbackQueue, NoCache, ResultCache, RlTrainer,
    RunAnalysisInput, RunAnalysisUseCase, SubmitFeedbackInput, SubmitFeedbackUseCase,
    WeightAuditLog, WeightStore,
};
use council_domain::Language;
use council_infrastructure::{
    ConfigIssue, ConfigLoader, FileConfig, FileResultCache, FileWeightStore, InMemoryResultCache,
    InMemoryWeightStore, JsonlWeightAuditLog, SqliteFeedbackLedger, SqliteFeedbackQueue,
    SyncPolicy, build_registry,
};
use council_presentation::{
    AnalyzeArgs, Cli, Command, ConsoleFormatter, FeedbackArgs, OutputFormat, ProgressReporter,
    WorkerArgs,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    // Keeps the file writer flushing until exit
    let _log_guard = init_tracing(cli.verbose, config.logging.resolved_directory().as_deref());

    info!("Starting codecouncil");

    let issues = config.validate();
    if matches!(cli.command, Command::Config) {
        let sources = ConfigLoader::sources(cli.config.as_ref());
        println!("{}", ConsoleFormatter::format_config(&sources, &issues));
        return Ok(());
    }

    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("Config: {}", issue.message);
    }
    let errors: Vec<&ConfigIssue> = issues.iter().filter(|i| i.is_error()).collect();
    if !errors.is_empty() {
        for issue in &errors {
            eprintln!("config error: {}", issue.message);
        }
        bail!(
            "Configuration has {} error(s); run `codecouncil config` for details",
            errors.len()
        );
    }

    // === Dependency Injection ===
    let weights = open_weight_store(&config).await?;

    match cli.command {
        Command::Analyze(args) => analyze(&config, weights, args, cli.quiet).await,
        Command::Feedback(args) => feedback(&config, args).await,
        Command::Worker(args) => worker(&config, weights, args).await,
        Command::Weights { reset } => show_weights(&config, weights, reset).await,
        Command::Config => Ok(()),
    }
}

/// Install the stderr subscriber, plus a daily-rolling file when configured
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "codecouncil.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

async fn open_weight_store(config: &FileConfig) -> Result<Arc<dyn WeightStore>> {
    match config.weights.resolved_path() {
        Some(path) => {
            let store = FileWeightStore::open(path.clone())
                .await
                .with_context(|| format!("Failed to open weight file {}", path.display()))?;
            info!("Using weight file {}", path.display());
            Ok(Arc::new(store))
        }
        None => {
            warn!("No data directory and no [weights] path; weights last only for this process");
            Ok(Arc::new(InMemoryWeightStore::new()))
        }
    }
}

fn open_result_cache(config: &FileConfig, no_cache: bool) -> Result<Arc<dyn ResultCache>> {
    if no_cache || !config.cache.enabled {
        return Ok(Arc::new(NoCache));
    }
    match config.cache.resolved_path() {
        Some(dir) => {
            let cache = FileResultCache::open(&dir)
                .with_context(|| format!("Failed to open cache directory {}", dir.display()))?;
            Ok(Arc::new(cache))
        }
        None => Ok(Arc::new(InMemoryResultCache::new())),
    }
}

fn queue_path(config: &FileConfig) -> Result<PathBuf> {
    config
        .queue
        .resolved_path()
        .ok_or_else(|| anyhow!("No data directory found; set [queue] path in the config"))
}

fn open_audit_log(config: &FileConfig) -> Option<Arc<dyn WeightAuditLog>> {
    let path = config.logging.resolved_audit_log()?;
    let sync = if config.logging.audit_fsync {
        SyncPolicy::EveryLine
    } else {
        SyncPolicy::OsBuffered
    };
    match JsonlWeightAuditLog::open(&path) {
        Ok(audit) => Some(Arc::new(audit.with_sync_policy(sync))),
        Err(e) => {
            warn!(
                "Audit log {} could not be opened ({}); continuing without it",
                path.display(),
                e
            );
            None
        }
    }
}

async fn analyze(
    config: &FileConfig,
    weights: Arc<dyn WeightStore>,
    args: AnalyzeArgs,
    quiet: bool,
) -> Result<()> {
    let code = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let language = match args.language {
        Some(language) => language,
        None => args
            .file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
            .map(|language| language.as_str().to_string())
            .ok_or_else(|| {
                anyhow!(
                    "Cannot guess the language of {}; pass --language",
                    args.file.display()
                )
            })?,
    };

    let registry = build_registry(config)?;
    let cache = open_result_cache(config, args.no_cache)?;
    let use_case =
        RunAnalysisUseCase::new(registry, cache, weights).with_params(config.analysis_params());

    let input = RunAnalysisInput::new(code, language);
    let result = if quiet || args.output == OutputFormat::Json {
        use_case.execute(input).await?
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await?
    };

    let output = match args.output {
        OutputFormat::Full => ConsoleFormatter::format(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };
    println!("{}", output);

    Ok(())
}

/// Enqueue one verdict; a `worker` process applies it
async fn feedback(config: &FileConfig, args: FeedbackArgs) -> Result<()> {
    let path = queue_path(config)?;
    let queue = SqliteFeedbackQueue::open(&path)
        .with_context(|| format!("Failed to open feedback queue {}", path.display()))?;
    let submit = SubmitFeedbackUseCase::new(Arc::new(queue))
        .with_enqueue_timeout(config.queue.enqueue_timeout());

    let input = if args.accepted() {
        SubmitFeedbackInput::accept(args.analysis_id, args.finding_id, args.agent, args.rating)
    } else {
        SubmitFeedbackInput::reject(args.analysis_id, args.finding_id, args.agent, args.rating)
    };
    let ack = submit.execute(input).await?;
    println!("{}", ConsoleFormatter::format_feedback_ack(&ack));
    Ok(())
}

/// Apply queued feedback until Ctrl-C, or until the queue is empty with `--drain`
async fn worker(
    config: &FileConfig,
    weights: Arc<dyn WeightStore>,
    args: WorkerArgs,
) -> Result<()> {
    let path = queue_path(config)?;
    let queue = Arc::new(
        SqliteFeedbackQueue::open(&path)
            .with_context(|| format!("Failed to open feedback queue {}", path.display()))?
            .with_visibility_timeout(config.queue.visibility_timeout())
            .with_poll_interval(config.queue.poll_interval()),
    );
    let ledger = SqliteFeedbackLedger::open(&path)
        .with_context(|| format!("Failed to open feedback ledger {}", path.display()))?
        .with_retention(config.worker.dedup_retention())
        .with_claim_timeout(config.worker.claim_timeout());

    let mut trainer = RlTrainer::new(weights);
    if let Some(audit) = open_audit_log(config) {
        trainer = trainer.with_audit_log(audit);
    }

    let mut params = config.worker_params();
    if args.drain {
        params.wait = std::time::Duration::ZERO;
    }
    let processor =
        FeedbackProcessor::new(queue.clone(), trainer, Arc::new(ledger)).with_params(params);

    let stats = if args.drain {
        processor.drain().await
    } else {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown requested; finishing the current batch");
            on_signal.cancel();
        });
        info!(queue = %path.display(), "Worker polling; press Ctrl-C to stop");
        processor.run(cancel).await
    };
    println!("{}", ConsoleFormatter::format_worker_stats(&stats));

    let depth = queue.depth().await?;
    if depth.dead_lettered > 0 {
        warn!(
            "{} message(s) in the dead-letter table of {}",
            depth.dead_lettered,
            path.display()
        );
    }
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn show_weights(
    config: &FileConfig,
    weights: Arc<dyn WeightStore>,
    reset: bool,
) -> Result<()> {
    if reset {
        weights.reset().await?;
        if let Some(audit) = open_audit_log(config) {
            audit.log(AuditEvent::WeightsReset);
        }
        println!("Weights reset to neutral");
    }

    let records = weights.records().await?;
    println!("{}", ConsoleFormatter::format_weights(&records));
    Ok(())
}

use std::io::BufRead;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::use_cases::archetypes::ArchetypeStore;
use crate::application::use_cases::batch_pipeline::BatchPipeline;
use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::bootstrap::build_pipeline;
use crate::infrastructure::config::{load_env_files, ConfigService};
use crate::infrastructure::logging::init_tracing;
use crate::infrastructure::storage::ensure_workspace_dirs;
use crate::interfaces::cli::Cli;
use crate::interfaces::watcher::{self, InputQueue, WatchEvent};

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    load_env_files();
    let service = ConfigService::new().with_config_file(&cli.config);

    if cli.store_api_key {
        init_tracing("info", false);
        return store_api_key(&service);
    }

    let config = match service.load(&cli.overrides()) {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info", false);
            error!(error = %err, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_level, config.debug_mode);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let debug_mode = config.debug_mode;
    match runtime.block_on(serve(config, cli.once)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error(&err, debug_mode, "testforge stopped with an error");
            ExitCode::FAILURE
        }
    }
}

fn store_api_key(service: &ConfigService) -> ExitCode {
    let mut key = String::new();
    if let Err(err) = std::io::stdin().lock().read_line(&mut key) {
        error!(error = %err, "Failed to read API key from stdin");
        return ExitCode::FAILURE;
    }
    let key = key.trim();
    if key.is_empty() {
        error!("No API key given on stdin");
        return ExitCode::FAILURE;
    }
    match service.save_api_key(key) {
        Ok(()) => {
            info!(outcome = "success", "API key stored in OS keyring");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Failed to store API key");
            ExitCode::FAILURE
        }
    }
}

fn log_error(err: &AppError, debug_mode: bool, message: &str) {
    if debug_mode {
        error!(error = ?err, "{}", message);
    } else {
        error!(error = %err, "{}", message);
    }
}

fn log_banner(config: &AppConfig) {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = ?config.llm_provider,
        model = %config.gemini_model,
        browser = config.playwright_browser.as_str(),
        headless = config.playwright_headless,
        archetypes = config.use_archetypes,
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        "testforge started"
    );
}

async fn serve(config: AppConfig, once: bool) -> Result<()> {
    ensure_workspace_dirs(&config).await?;
    log_banner(&config);

    if let Err(err) = ArchetypeStore::new(config.archetypes_dir.clone()).seed_base().await {
        warn!(error = %err, "Failed to seed archetype templates");
    }

    let pipeline = build_pipeline(&config);
    let cancel = CancellationToken::new();

    let stop = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stop requested; abandoning in-flight work");
            stop.cancel();
        }
    });

    let input_dir = tokio::fs::canonicalize(&config.input_dir).await?;

    // Watch before scanning so nothing dropped in between is missed.
    let watch = if once {
        None
    } else {
        Some(watcher::watch(&input_dir)?)
    };

    let mut queue = InputQueue::default();
    for path in watcher::initial_scan(&input_dir)? {
        if cancel.is_cancelled() {
            break;
        }
        if queue.admit(&path) {
            process(&pipeline, &path, &cancel, config.debug_mode).await;
        }
    }

    let Some((_watcher, mut events)) = watch else {
        info!(outcome = "success", "One-shot run finished");
        return Ok(());
    };

    info!(dir = %input_dir.display(), "Watching for new files (Ctrl-C to stop)");
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Some(WatchEvent::Created(path)) => {
                if !queue.admit(&path) {
                    debug!(path = %path.display(), "Already processed");
                    continue;
                }
                // Give writers time to finish before reading.
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(config.settle_delay()) => {}
                }
                if !path.is_file() {
                    queue.forget(&path);
                    continue;
                }
                process(&pipeline, &path, &cancel, config.debug_mode).await;
            }
            Some(WatchEvent::Removed(path)) => queue.forget(&path),
            None => {
                warn!("Watcher channel closed");
                break;
            }
        }
    }

    info!("testforge stopped");
    Ok(())
}

async fn process(pipeline: &BatchPipeline, path: &Path, cancel: &CancellationToken, debug_mode: bool) {
    match pipeline.process_file(path, cancel).await {
        Ok(summary) => info!(
            outcome = "success",
            batch = %summary.batch.name,
            rows = summary.rows,
            artifacts = summary.artifacts.len(),
            fallback_rows = summary.fallback_rows,
            valid = summary.validation.is_valid,
            execution = ?summary.execution,
            project = %summary.project_path.display(),
            "Batch complete"
        ),
        Err(err) => {
            let message = format!("Batch failed for {}", path.display());
            log_error(&err, debug_mode, &message);
        }
    }
}

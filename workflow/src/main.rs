//! Main entry point for the workflow binary
//!
//! Interactive mode renders the workflow on the terminal and performs the
//! current control action every time Enter is pressed. Batch mode (one or
//! more `--image` flags) loads the model once and runs each image through a
//! full identify/reset cycle.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use shared::{logging, session_debug, session_info, session_warn};
use workflow::{
    ActionLabels, Args, ModelLoader, ModelProvider, Orchestrator, WorkflowConfig,
    core::format_result,
    services::{Console, ConsoleImagePicker, HttpModelLoader, RandomModelLoader, ScriptedImagePicker},
    traits::ImagePicker,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Values from .env act as defaults for env-backed flags
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = WorkflowConfig::try_from(args).context("Invalid configuration")?;

    logging::init_tracing_with_level(Some(&config.log_level));

    match config.provider {
        ModelProvider::Random => run_with_loader(RandomModelLoader::new(config.top_k), &config).await,
        ModelProvider::Http => {
            let endpoint = config
                .endpoint
                .clone()
                .context("--endpoint is required with --provider http")?;
            run_with_loader(HttpModelLoader::new(endpoint), &config).await
        }
    }
}

async fn run_with_loader<L>(loader: L, config: &WorkflowConfig) -> anyhow::Result<()>
where
    L: ModelLoader + 'static,
{
    let labels = ActionLabels::for_locale(config.locale);

    if config.is_batch() {
        let picker = ScriptedImagePicker::new(config.images.clone());
        let orchestrator = Orchestrator::new(loader, picker).with_failure_policy(config.failure_policy);
        logging::log_startup(&orchestrator.session_id(), "workflow (batch mode)");

        let outcome = run_batch(&orchestrator, config.images.len()).await;
        orchestrator.teardown();
        logging::log_shutdown(&orchestrator.session_id(), "Batch finished");
        outcome
    } else {
        let console = Arc::new(Console::stdin());
        let picker = ConsoleImagePicker::new(Arc::clone(&console));
        let orchestrator = Orchestrator::new(loader, picker).with_failure_policy(config.failure_policy);
        logging::log_startup(&orchestrator.session_id(), "workflow (interactive mode)");

        let outcome = run_interactive(&orchestrator, &console, &labels).await;
        orchestrator.teardown();
        logging::log_shutdown(&orchestrator.session_id(), "Session closed");
        outcome
    }
}

/// Load once, then identify every queued image; the first model failure aborts
async fn run_batch<L, P>(orchestrator: &Orchestrator<L, P>, images: usize) -> anyhow::Result<()>
where
    L: ModelLoader + 'static,
    P: ImagePicker + 'static,
{
    orchestrator.load_model().await.context("Model failed to load")?;

    for _ in 0..images {
        let Some(image) = orchestrator.request_image().await? else {
            session_warn!(orchestrator.session_id(), "⏭️ Skipping unreadable image");
            continue;
        };

        let results = orchestrator
            .identify()
            .await
            .with_context(|| format!("Classification of {} failed", image.name))?;

        println!("{}", image.name);
        for result in &results {
            println!("  {}", format_result(result));
        }

        orchestrator.reset().await?;
    }

    logging::log_success(&orchestrator.session_id(), "All images processed");
    Ok(())
}

/// Render, wait for Enter, perform the control action; `q` or end of input quits
async fn run_interactive<L, P, R>(
    orchestrator: &Orchestrator<L, P>,
    console: &Console<R>,
    labels: &ActionLabels,
) -> anyhow::Result<()>
where
    L: ModelLoader + 'static,
    P: ImagePicker + 'static,
    R: tokio::io::AsyncBufRead + Unpin + Send,
{
    let session_id = orchestrator.session_id();

    loop {
        println!("\n{}", orchestrator.view(labels).await.render());

        let line = tokio::select! {
            line = console.read_line("press Enter to continue, q to quit > ") => line?,
            _ = signal::ctrl_c() => {
                session_info!(session_id, "Received Ctrl+C signal");
                break;
            }
        };

        match line.as_deref() {
            None | Some("q") | Some("quit") => break,
            Some(_) => {}
        }

        tokio::select! {
            outcome = orchestrator.activate() => match outcome {
                Ok(Some(action)) => {
                    session_debug!(session_id, "Performed {}", action);
                }
                Ok(None) => {}
                // Capability failures are also recorded on the session and rendered
                Err(e) => {
                    session_warn!(session_id, "⚠️ {}", e);
                }
            },
            _ = signal::ctrl_c() => {
                session_info!(session_id, "Received Ctrl+C signal");
                break;
            }
        }
    }

    Ok(())
}

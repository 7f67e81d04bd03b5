//! `ask` and `new-thread` command handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::AskArgs;
use crate::backend::{AssistantBackend, OpenAiAssistantsBackend};
use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::response::NormalizedResponse;
use crate::run::{RunController, Termination};

pub async fn handle_new_thread() -> Result<(), AssistantError> {
    let config = AssistantConfig::from_env()?;
    let backend = OpenAiAssistantsBackend::new(&config)?;
    let thread = backend.create_thread().await?;
    println!("{}", thread.id);
    if let Some(at) = thread.created_at() {
        eprintln!("created {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

pub async fn handle_ask(args: AskArgs) -> Result<(), AssistantError> {
    let config = AssistantConfig::from_env()?;
    let backend: Arc<dyn AssistantBackend> = Arc::new(OpenAiAssistantsBackend::new(&config)?);
    let controller = RunController::new(backend.clone(), &config);

    let thread_id = match args.thread {
        Some(id) => id,
        None => {
            let thread = backend.create_thread().await?;
            eprintln!("thread: {}", thread.id);
            thread.id
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let report = controller.execute(&thread_id, &args.prompt, &cancel).await?;

    match report.termination {
        Termination::Cancelled => {
            eprintln!("cancelled while waiting on run {}", report.run_id);
            return Ok(());
        }
        Termination::BudgetExhausted => {
            eprintln!(
                "run {} still {} after {} checks; showing what is available",
                report.run_id, report.status, report.iterations
            );
        }
        Termination::Terminal if !report.is_success() => {
            eprintln!("run {} ended with status {}", report.run_id, report.status);
        }
        Termination::Terminal => {}
    }

    for response in &report.responses {
        match response {
            NormalizedResponse::Text(text) => println!("{}", text.text()),
            NormalizedResponse::Image(image) if args.no_image_urls => {
                println!("[image {}]", image.file_id());
            }
            NormalizedResponse::Image(image) => {
                let url = image.url().await?;
                if url.is_empty() {
                    println!("[image {}]", image.file_id());
                } else {
                    println!("[image {}] {url}", image.file_id());
                }
            }
        }
    }

    Ok(())
}

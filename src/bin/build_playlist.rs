//! Build a `ProPresenter` playlist from a worship planning document.
//!
//! Usage: cargo run --bin build_playlist -- <document.docx> [--name <playlist>]
//!
//! The run pauses after classification so the detected songs can be imported
//! into the library. Press Enter to continue, or type `q` to cancel.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use serviceflow::config::default_playlist_name;
use serviceflow::constants::async_tasks::CHANNEL_BUFFER_SIZE;
use serviceflow::{continuation, Config, Pipeline, PipelineEvent};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(document) = args.iter().find(|a| !a.starts_with("--")) else {
        bail!("usage: build_playlist <document.docx> [--name <playlist>]");
    };
    let path = PathBuf::from(shellexpand::tilde(document).as_ref());
    let name = args
        .iter()
        .position(|a| a == "--name")
        .and_then(|i| args.get(i + 1).cloned())
        .or_else(|| default_playlist_name(&path))
        .context("Cannot derive a playlist name; pass --name")?;

    let config = Config::load().context("Failed to load config")?;
    config.validate().map_err(|e| anyhow::anyhow!(e.diagnostic()))?;
    let pipeline = Pipeline::new(&config).map_err(|e| anyhow::anyhow!(e.diagnostic()))?;

    let (events_tx, mut events_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let (handle, pause) = continuation();

    let run = tokio::spawn(async move {
        pipeline.run(&path, &name, events_tx, pause).await
    });

    let mut handle = Some(handle);
    while let Some(event) = events_rx.recv().await {
        match event {
            PipelineEvent::Classified(count) => println!("Found {count} service items"),
            PipelineEvent::AwaitingImport(songs) => {
                println!("\nImport these songs into the ProPresenter library:");
                for song in &songs {
                    println!("  - {song}");
                }
                println!("\nPress Enter when done (q to cancel)");

                let answer = tokio::task::spawn_blocking(|| {
                    let mut line = String::new();
                    std::io::stdin().lock().read_line(&mut line).map(|_| line)
                })
                .await??;

                if let Some(handle) = handle.take() {
                    if answer.trim().eq_ignore_ascii_case("q") {
                        handle.abort();
                    } else {
                        handle.proceed();
                    }
                }
            }
            PipelineEvent::Resolving => println!("Resolving songs and psalms..."),
            PipelineEvent::Assembling => println!("Building playlist..."),
            PipelineEvent::Finished(count) => println!("Processed {count} items"),
        }
    }

    let report = run.await?.map_err(|e| anyhow::anyhow!(e.diagnostic()))?;

    println!("\n=== Playlist '{}' (id: {}) ===", report.playlist_name, report.playlist_id);
    for outcome in &report.outcomes {
        println!("  {outcome}");
    }
    println!("\n{}", report.summary());

    Ok(())
}

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use candidate_pipeline::config::Config;
use candidate_pipeline::extraction::{client, LlmClient};
use candidate_pipeline::Pipeline;

/// Reads plain resume text from the file given as the first argument (or
/// stdin), runs the pipeline and prints the candidate record as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting candidate pipeline v{}", env!("CARGO_PKG_VERSION"));

    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("Failed to read '{path}'"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!(
        "Extraction client initialized (model: {}, rubric: {})",
        client::MODEL,
        config.rubric.label
    );

    let pipeline = Pipeline::from_config(&config, Arc::new(llm));
    let record = pipeline.run(&text).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

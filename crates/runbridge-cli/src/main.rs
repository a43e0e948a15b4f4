//! Developer front end for the submission bridge.
//!
//! Reads one source program (inline flag, file, or stdin), submits it
//! through the bridge against the configured engine, prints the outcome,
//! and exits non-zero when the outcome is a failure.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use runbridge_core::{
    load_config, BridgeConfig, ChannelSink, CodeBuffer, EngineConfig, OutputConfig, OutputSink,
    SequencedSink, SubmissionBridge,
};
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[clap(
    name = "Runbridge",
    author,
    version = "0.1.0",
    about = "Submission bridge for external code-execution engines"
)]
struct Cli {
    #[clap(
        long,
        short,
        default_value = "runbridge.yaml",
        help = "Path to the bridge configuration file"
    )]
    config: String,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Submit this source text instead of reading stdin")]
    source: Option<String>,

    #[clap(long, help = "Submit the contents of this file instead of reading stdin")]
    file: Option<String>,

    #[clap(
        long,
        help = "Run a local interpreter command directly, bypassing the configuration file"
    )]
    command: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    if cli.source.is_some() && cli.file.is_some() {
        anyhow::bail!(
            "Conflicting input flags specified. Only one of --source or --file can be used at a time."
        );
    }

    let config = match &cli.command {
        Some(command) => {
            let config = BridgeConfig {
                engine: EngineConfig::Process {
                    command: command.clone(),
                    args: Vec::new(),
                    timeout_secs: 10,
                },
                output: OutputConfig::default(),
            };
            config.validate().map_err(|e| anyhow::anyhow!(e))?;
            config
        }
        None => load_config(&cli.config).await.map_err(|e| anyhow::anyhow!(e))?,
    };

    let source = match (&cli.source, &cli.file) {
        (Some(text), _) => text.clone(),
        (_, Some(path)) => tokio::fs::read_to_string(path).await?,
        _ => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let (channel, mut outcomes) = ChannelSink::new();
    let sink: Arc<dyn OutputSink> = if config.output.sequenced {
        Arc::new(SequencedSink::new(channel))
    } else {
        Arc::new(channel)
    };

    let bridge = SubmissionBridge::new(config.engine_factory(), sink);
    let buffer = CodeBuffer::mounted(source);
    bridge.submit(&buffer).finished().await;

    match outcomes.recv().await {
        Some(outcome) => {
            println!("{}", outcome);
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        None => anyhow::bail!("Output channel closed without an outcome"),
    }

    Ok(())
}

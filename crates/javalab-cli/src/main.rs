//! Terminal client for running code against a Javabuilder backend.
//!
//! Connects one session, prints the console stream to stdout, and forwards
//! stdin lines as outbound messages until the backend closes the channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Parser;
use javalab_session::{
    Collaborators, ConsoleSink, JavabuilderSession, LoggingExceptionHandler, RunState,
    SessionDescriptor, TokenRequester,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "javalab", about = "Run code remotely on a Javabuilder backend")]
struct Args {
    /// WebSocket URL of the Javabuilder backend.
    #[arg(long)]
    javabuilder_url: String,

    /// HTTP endpoint issuing session access tokens.
    #[arg(long)]
    token_url: String,

    /// Project channel id.
    #[arg(long)]
    channel_id: String,

    /// URL the backend fetches project sources from.
    #[arg(long)]
    project_url: String,

    /// Source version id to execute.
    #[arg(long, default_value = "main")]
    project_version: String,

    /// Server level id.
    #[arg(long)]
    level_id: String,

    /// Extra backend option, repeatable (`--option executionType=RUN`).
    #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    options: Vec<(String, String)>,

    /// Surface DEBUG frames from the backend.
    #[arg(long)]
    diagnostic: bool,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

/// Prints every console line to stdout.
struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Tracks the running flag and renders blank separators.
struct CliRunState {
    running: AtomicBool,
}

impl RunState for CliRunState {
    fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    fn append_blank_line(&self) {
        println!();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut descriptor = SessionDescriptor::new(
        args.channel_id,
        args.project_url,
        args.project_version,
        args.level_id,
    );
    for (key, value) in args.options {
        descriptor = descriptor.with_option(key, value);
    }

    let run_state = Arc::new(CliRunState {
        running: AtomicBool::new(true),
    });
    let collaborators = Collaborators {
        sink: Arc::new(StdoutSink),
        run_state: run_state.clone(),
        exceptions: Arc::new(LoggingExceptionHandler),
        mini_app: None,
    };

    let mut session = JavabuilderSession::new(
        args.javabuilder_url,
        TokenRequester::new(args.token_url),
        descriptor,
        collaborators,
    )
    .with_diagnostic(args.diagnostic);

    session
        .connect()
        .await
        .context("could not open a javabuilder session")?;

    // Forward stdin lines for as long as the channel stays open.
    let sender = session.sender()?;
    let stdin_task = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Err(err) = sender.send(&line) {
                tracing::warn!(%err, "dropping outbound message");
                break;
            }
        }
    });

    session.run_to_close().await;
    stdin_task.abort();

    if let Some(close) = session.close_info() {
        tracing::info!(
            code = close.code,
            reason = %close.reason,
            was_clean = close.was_clean,
            "session closed"
        );
    }
    Ok(())
}

//! dlren CLI
//!
//! Scans a directory, looks every product code up in the DLsite catalog,
//! shows the new names, asks, then renames.

mod args;
mod error;
mod logging;
mod report;

use crate::args::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use dlren_catalog::DlsiteLookup;
use dlren_config::Config;
use dlren_library::{CandidateEntry, EntryStatus, Event, Pipeline, Reporter, Summary};
use dlren_storage::backend::LocalBackend;
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: could not start async runtime: {e}");
            return ExitCode::FAILURE;
        },
    };
    let result = runtime.block_on(run(cli));
    // A prompt interrupted by Ctrl-C leaves a stdin read behind that can't
    // be cancelled; don't wait for it.
    runtime.shutdown_background();

    match result {
        Ok(summary) => ExitCode::from(report::exit_status(&summary)),
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<Summary> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    cli.apply(&mut config);
    config.validate().or_raise(|| ErrorKind::Config)?;
    let template = config.name_template().or_raise(|| ErrorKind::Config)?;
    if cli.placeholders {
        print!("{}", report::placeholder_table(&template));
        return Ok(Summary::default());
    }
    let lookup = DlsiteLookup::new(config.lookup.endpoint.clone(), &config.lookup.user_agent, config.lookup.timeout())
        .or_raise(|| ErrorKind::Lookup)?;
    let Some(directory) = cli.directory.as_deref() else {
        exn::bail!(ErrorKind::Directory);
    };
    let root = std::path::absolute(directory).or_raise(|| ErrorKind::Directory)?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let (reporter, events) = Reporter::channel();
    let pipeline =
        Pipeline::new(Arc::new(LocalBackend::new("local")), Arc::new(lookup), template, reporter, cancel.clone());
    let (decide, decision) = oneshot::channel();
    let worker = tokio::spawn(work(pipeline, root, config.recursive, decision));

    observe(events, decide, &cli, &cancel).await?;
    worker.await.or_raise(|| ErrorKind::Pipeline)?.or_raise(|| ErrorKind::Pipeline)
}

/// Runs the pipeline, waiting for the user's decision between lookups and
/// renames.
async fn work(
    pipeline: Pipeline,
    root: PathBuf,
    recursive: bool,
    decision: oneshot::Receiver<bool>,
) -> dlren_library::error::Result<Summary> {
    let entries = pipeline.scan(&root, recursive).await?;
    let entries = pipeline.enrich(entries).await;
    if pipeline.cancel_token().is_cancelled() || !decision.await.unwrap_or(false) {
        return Ok(pipeline.abandon(&entries));
    }
    Ok(pipeline.rename(entries).await)
}

/// Prints pipeline events until the pipeline is done, answering its
/// confirmation request on the way.
async fn observe(
    mut events: UnboundedReceiver<Event>,
    decide: oneshot::Sender<bool>,
    cli: &Cli,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut decide = Some(decide);
    while let Some(event) = events.recv().await {
        match event {
            Event::Log(line) => println!("{line}"),
            Event::Enriched(entries) => {
                for entry in &entries {
                    println!("{}", report::preview_line(entry));
                }
                let proceed = confirm(&entries, cli, cancel).await?;
                if let Some(decide) = decide.take() {
                    // The worker only stops listening if it has already finished.
                    let _ = decide.send(proceed);
                }
            },
            Event::Summary(summary) => println!("{}", report::summary_line(&summary)),
            Event::Progress { stage, done, total } => tracing::debug!(%stage, done, total, "progress"),
            Event::Started { .. } | Event::Discovered(_) | Event::Renamed(_) => {},
        }
    }
    Ok(())
}

async fn confirm(entries: &[CandidateEntry], cli: &Cli, cancel: &CancellationToken) -> Result<bool> {
    let ready = entries.iter().filter(|e| e.status() == EntryStatus::Ready).count();
    if cli.dry_run {
        println!("dry run: {ready} of {} entries would be renamed", entries.len());
        return Ok(false);
    }
    if ready == 0 || cancel.is_cancelled() {
        return Ok(false);
    }
    if cli.yes {
        return Ok(true);
    }

    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("Rename {ready} entries? [y/N] ").as_bytes()).await.or_raise(|| ErrorKind::Prompt)?;
    stdout.flush().await.or_raise(|| ErrorKind::Prompt)?;
    let mut answer = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        read = stdin.read_line(&mut answer) => {
            read.or_raise(|| ErrorKind::Prompt)?;
        },
        () = cancel.cancelled() => {
            println!();
            return Ok(false);
        },
    }
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupted, stopping after the current item");
        cancel.cancel();
    }
}

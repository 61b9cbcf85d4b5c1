// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shelftag: local label print server
//
// Entry point. Initialises logging, loads the configuration document, and
// either runs the HTTP label endpoint or renders a single label to stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shelftag_core::data_dir::default_config_path;
use shelftag_core::error::{Result, ShelftagError};
use shelftag_core::ShelftagConfig;
use shelftag_print::{LabelServer, PrinterSink};
use shelftag_tspl::{LabelRequest, render_now};

#[derive(Parser, Debug)]
#[command(name = "shelftag")]
#[command(about = "Render shelf codes to TSPL and print them on a thermal label printer")]
struct Args {
    /// Configuration document (defaults to <config dir>/shelftag/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run the HTTP label endpoint (default)
    Serve,

    /// Render one label to stdout without touching the printer
    Render {
        /// Label text, e.g. 44-10
        label: String,

        /// Print only the part before the dash
        #[arg(long)]
        left_only: bool,

        /// Emit the resolved layout as JSON instead of the TSPL job
        #[arg(long)]
        plan: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "shelftag failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config = ShelftagConfig::load(&path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config),
        Command::Render {
            label,
            left_only,
            plan,
        } => {
            if left_only {
                config.features.print_only_left = true;
            }
            render_to_stdout(&LabelRequest::new(&label), &config, plan)
        }
    }
}

fn serve(config: ShelftagConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        info!(printer = %config.printer.name, "Shelftag starting");

        let sink = PrinterSink::from_config(&config.printer);
        let mut server = LabelServer::from_config(&config.server);
        server.start(Arc::new(config), sink).await?;

        tokio::signal::ctrl_c()
            .await
            .map_err(|e| ShelftagError::Server(format!("signal handler: {e}")))?;
        info!("interrupt received");

        server.stop().await
    })
}

fn render_to_stdout(label: &LabelRequest, config: &ShelftagConfig, plan: bool) -> Result<()> {
    let rendered = render_now(label, config);
    let mut stdout = std::io::stdout().lock();
    if plan {
        serde_json::to_writer_pretty(&mut stdout, &rendered.plan)?;
        writeln!(stdout)?;
    } else {
        stdout.write_all(&rendered.script.to_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

mod cli;
mod commands;
mod renderer;

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use factbook_core::config::FactbookConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::ExportRequest;

/// Logs go to stderr so command output stays pipeable. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = FactbookConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    init_tracing(&config.log_level);
    let lang = cli.lang.unwrap_or(config.default_language);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::List => commands::list(&config, lang, &mut out)?,
        Command::View { page } => {
            let spec = commands::resolve_page(&page)?;
            let store = commands::load_store(&config)?;
            drop(out);
            renderer::render_tui(&store, spec, config.total_policy, lang)?;
        }
        Command::Export {
            page,
            format,
            out: path,
            width,
            height,
            dark,
        } => {
            let store = commands::load_store(&config)?;
            let request = ExportRequest {
                format,
                out: path,
                width,
                height,
                dark,
            };
            commands::export(&config, &store, &page, &request, lang, &mut out)?;
        }
        Command::Merge(args) => commands::merge(&config, &args, &mut out)?,
        Command::Validate { tolerance } => {
            let store = commands::load_store(&config)?;
            let problems = commands::validate(&config, &store, tolerance, &mut out)?;
            out.flush()?;
            if problems > 0 {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swingdesk_core::config::parse_symbol_list;
use swingdesk_core::llm::error::log_provider_diagnostics;
use swingdesk_core::notify::LogNotifier;
use swingdesk_core::pipeline::Orchestrator;

#[derive(Debug, Parser)]
#[command(name = "swingdesk_worker")]
struct Args {
    /// Comma-separated symbols to analyze. Defaults to DEFAULT_SYMBOLS.
    #[arg(long)]
    symbols: Option<String>,

    /// Run the analysis but log the summary instead of emailing it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = swingdesk_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let symbols = resolve_symbols(args.symbols.as_deref(), &settings.default_symbols)?;

    let mut orchestrator = Orchestrator::from_settings(&settings).inspect_err(|e| {
        sentry_anyhow::capture_anyhow(e);
    })?;
    if args.dry_run {
        orchestrator = orchestrator.with_notifier(Arc::new(LogNotifier));
    }

    tracing::info!(symbols = ?symbols, dry_run = args.dry_run, "worker run starting");

    match orchestrator.analyze(&symbols).await {
        Ok(run) => {
            tracing::info!(records = run.results.len(), message = %run.message, "worker run finished");
            println!("{}", serde_json::to_string_pretty(&run)?);
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            log_provider_diagnostics(&err);
            tracing::error!(error = %err, "worker run failed");
            Err(err)
        }
    }
}

fn resolve_symbols(arg: Option<&str>, defaults: &[String]) -> anyhow::Result<Vec<String>> {
    let symbols = match arg {
        Some(raw) => parse_symbol_list(raw),
        None => defaults.to_vec(),
    };
    anyhow::ensure!(!symbols.is_empty(), "no symbols to analyze");
    Ok(symbols)
}

fn init_sentry(settings: &swingdesk_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

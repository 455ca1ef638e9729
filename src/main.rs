use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info};

use newsgate::runtime::{build_main_runtime, shutdown_signal, spawn_stats_reporter};
use newsgate::{
    Args, GlobalStats, ProtocolHandler, RedditSource, Refresher, RfcRenderer, Server, SharedStore,
    Store, load_config_with_fallback, logging,
};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let (config, source) = match load_config_with_fallback(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("newsgate: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = logging::init_logging(args.debug, config.log_file.as_deref());
    info!("Loaded configuration from {}", source.description());

    match run(args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, config: newsgate::Config) -> Result<()> {
    let runtime = build_main_runtime()?;

    let store = SharedStore::new(Store::load(&config.spool));

    let source = RedditSource::new(&config.source)?;
    let refresher = Refresher::new(Arc::new(source), store.clone());
    let renderer = Arc::new(RfcRenderer::new(&config.articles));
    let handler = ProtocolHandler::new(refresher, renderer, args.features());

    let stats = GlobalStats::new();
    let server = Server::bind(&args.server_config(), handler, stats.clone())?;
    info!(
        workers = server.worker_count(),
        ihave = args.features().ihave,
        streaming = args.features().streaming,
        "Server started"
    );

    runtime.block_on(async {
        let reporter = spawn_stats_reporter(stats.clone(), config.stats.interval_secs);
        let result = server.run_until(shutdown_signal()).await;
        reporter.abort();
        result
    })?;

    stats.report();
    store.lock().expunge_and_persist();
    info!("Spool saved, exiting");
    Ok(())
}

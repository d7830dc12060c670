use std::io;

mod config;
mod error;
mod extract;
mod fetcher;
mod label_scan;
mod record;
mod session;
mod structured_data;
mod utils;
mod writer;

use config::Settings;
use fetcher::HttpFetcher;
use session::Session;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the prompts on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::default();
    let fetcher = HttpFetcher::new(&settings)?;

    let stdin = io::stdin();
    let summary = Session::new(&settings, &fetcher, stdin.lock(), io::stdout()).run()?;

    tracing::info!(added = summary.added, path = %summary.path.display(), "done");
    Ok(())
}

#[path = "../shared/mod.rs"]
mod shared;

use prkit::{GitHub, close_pull_request, parse_close_args};
use shared::{exit_with_error, handle_clap_help_version, init_tracing};
use tracing::debug;

async fn run() -> anyhow::Result<()> {
    let (spec, timeout) = match parse_close_args(std::env::args()) {
        Ok(result) => result,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            }
            return Err(err);
        }
    };

    let github = GitHub::from_env(timeout)?;
    let outcome = close_pull_request(&spec, &github).await?;

    debug!(?outcome, "close-pr finished");

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        exit_with_error(err);
    }
}

#[path = "../shared/mod.rs"]
mod shared;

use prkit::{GitHub, list_pull_requests, parse_list_args, write_json};
use shared::{exit_with_error, handle_clap_help_version, init_tracing};

async fn run() -> anyhow::Result<()> {
    let (spec, timeout) = match parse_list_args(std::env::args()) {
        Ok(result) => result,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            }
            return Err(err);
        }
    };

    let github = GitHub::from_env(timeout)?;
    let prs = list_pull_requests(&spec.query, &github).await?;

    let mut stdout = std::io::stdout().lock();
    write_json(&prs, spec.pretty, &mut stdout)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        exit_with_error(err);
    }
}

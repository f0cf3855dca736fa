//! Process plumbing shared by the `close-pr` and `list-pr` entry points.

use prkit::exit_code_for;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Prints clap help/version to stdout and exits 0; prints usage errors to
/// stderr and exits 2.
pub fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

/// Logs the full error chain and exits with the code for its kind.
pub fn exit_with_error(err: anyhow::Error) -> ! {
    tracing::error!("{err:#}");
    std::process::exit(exit_code_for(&err));
}

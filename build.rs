//! Embeds a human-readable version string for `--version`.
//!
//! The string is `<crate version> (<git version>) <rustc version>`, where
//! the git version is `git describe --tags --always --dirty` when a tag is
//! reachable, otherwise a pseudo-version
//! `v<crate version>-<commit timestamp>-<short sha>[+dirty]`. Any part that
//! cannot be determined is left out.

use std::{env, process::Command};

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let components = [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        git_version().map(|v| format!("({v})")),
        rustc_version(),
    ];
    let build_info = components.into_iter().flatten().collect::<Vec<_>>().join(" ");

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={build_info}");
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn rustc_version() -> Option<String> {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    command_output(&rustc, &["--version"])
}

fn git_version() -> Option<String> {
    let describe = command_output("git", &["describe", "--tags", "--always", "--dirty"])?;
    if describe.starts_with('v') || describe.contains("-g") {
        return Some(describe);
    }
    Some(pseudo_version())
}

fn pseudo_version() -> String {
    let sha = command_output("git", &["rev-parse", "--short=12", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());
    let dirty = command_output("git", &["status", "--porcelain"]).is_some();

    // Dirty trees get the build time, clean ones the commit time.
    let timestamp = if dirty {
        None
    } else {
        command_output("git", &["log", "-1", "--format=%ct"])
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
    .unwrap_or_else(Utc::now)
    .format(TIMESTAMP_FORMAT);

    let suffix = if dirty { "+dirty" } else { "" };
    format!("v{}-{timestamp}-{sha}{suffix}", env!("CARGO_PKG_VERSION"))
}

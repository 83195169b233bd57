#![allow(dead_code)]

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn loadout_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_loadout"))
}

// Runs the binary from `cwd` with a clean view of the loadout env vars.
pub fn run_loadout(cwd: &Path, args: &[&str], envs: &[(&str, &Path)]) -> Result<Output> {
    let mut command = Command::new(loadout_bin());
    command
        .current_dir(cwd)
        .args(args)
        .env_remove("LOADOUT_DB_ROOT")
        .env_remove("LOADOUT_CACHE_PATH")
        .env("RUST_LOG", "warn");
    for (key, value) in envs {
        command.env(key, value);
    }
    command
        .output()
        .with_context(|| format!("failed to run loadout {}", args.join(" ")))
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;

pub fn run(verbose: bool, release: bool) -> Result<()> {
    println!();
    println!("{}", "⌚ Starting watch simulator...".cyan().bold());
    println!();

    let mut cmd = Command::new("cargo");
    cmd.args([
        "run",
        "-p",
        "firmware",
        "--bin",
        "watch-sim",
        "--features",
        "emulator",
    ]);
    if release {
        cmd.arg("--release");
    }
    if verbose {
        cmd.env("RUST_LOG", "debug");
    }

    // Inherit stdio so the tracing output streams live.
    let status = cmd.status().context("Failed to launch simulator")?;
    if !status.success() {
        anyhow::bail!("Simulator exited with {}", status);
    }

    println!();
    println!("{}", "✓ Simulation finished".green());
    Ok(())
}

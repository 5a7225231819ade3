use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Bare-metal target the no_std crates must build for.
const MCU_TARGET: &str = "thumbv7em-none-eabihf";

/// Crates that ship on the watch and must stay `no_std`.
const NO_STD_CRATES: [&str; 5] = ["platform", "power", "bluetooth", "ui", "firmware"];

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking firmware builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Check 1: every no_std crate on the MCU target
    for krate in NO_STD_CRATES {
        cargo_step(
            &format!("{} ({})", krate, MCU_TARGET),
            &["check", "-p", krate, "--target", MCU_TARGET],
        )?;
    }

    // The firmware defmt feature enables it in the crates it depends on
    cargo_step(
        &format!("firmware with defmt ({})", MCU_TARGET),
        &["check", "-p", "firmware", "--target", MCU_TARGET, "--features", "defmt"],
    )?;

    // Check 2: simulator on the host
    cargo_step(
        "simulator (host)",
        &["check", "-p", "firmware", "--features", "emulator", "--bins"],
    )?;

    // Check 3: docs build with the mocks visible next to the traits
    cargo_step(
        "docs",
        &[
            "doc",
            "--workspace",
            "--exclude",
            "xtask",
            "--no-deps",
            "--features",
            "firmware/emulator",
        ],
    )?;

    // Check 4: Clippy lints
    println!("{}", "  Running clippy lints...".cyan());
    let clippy_start = Instant::now();

    let clippy_output = Command::new("cargo")
        .args([
            "clippy",
            "--workspace",
            "--all-targets",
            "--features",
            "firmware/emulator",
            "--",
            "-D",
            "warnings",
        ])
        .output()
        .context("Failed to run clippy")?;

    if clippy_output.status.success() {
        println!(
            "{}",
            format!(
                "  ✓ Clippy passed in {:.2}s",
                clippy_start.elapsed().as_secs_f64()
            )
            .green()
        );
    } else {
        eprintln!("{}", "  ⚠ Clippy warnings found".yellow().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&clippy_output.stderr));
        // Don't fail on clippy warnings, just show them
    }
    println!();

    // Check 5: Format check
    println!("{}", "  Checking code formatting...".cyan());

    let fmt_output = Command::new("cargo")
        .args(["fmt", "--all", "--check"])
        .output()
        .context("Failed to run cargo fmt")?;

    if fmt_output.status.success() {
        println!("{}", "  ✓ Formatting check passed".green());
    } else {
        eprintln!("{}", "  ⚠ Formatting issues found".yellow().bold());
        eprintln!("     Run 'cargo fmt --all' to fix");
    }
    println!();

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}

/// Run one `cargo` invocation that must succeed.
fn cargo_step(label: &str, args: &[&str]) -> Result<()> {
    println!("{}", format!("  Checking {}...", label).cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(args)
        .output()
        .with_context(|| format!("Failed to check {}", label))?;

    if !output.status.success() {
        eprintln!("{}", format!("  ✗ {} check failed", label).red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{} check failed", label);
    }

    println!(
        "{}",
        format!(
            "  ✓ {} passed in {:.2}s",
            label,
            start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();
    Ok(())
}

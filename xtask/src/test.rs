use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// One named `cargo test` invocation.
struct Suite {
    label: &'static str,
    args: &'static [&'static str],
}

const UNIT: Suite = Suite {
    label: "unit",
    args: &["test", "--lib", "--workspace"],
};

/// Integration suites, cheapest first. Each runs on its own so a failure
/// names the suite instead of "integration tests failed".
const INTEGRATION: [Suite; 8] = [
    Suite {
        label: "power state machine",
        args: &["test", "-p", "power", "--test", "state_machine"],
    },
    Suite {
        label: "power irq bridge (threads)",
        args: &["test", "-p", "power", "--test", "irq_bridge"],
    },
    Suite {
        label: "power registry (proptest)",
        args: &["test", "-p", "power", "--test", "registry_proptest"],
    },
    Suite {
        label: "platform HAL (proptest)",
        args: &["test", "-p", "platform", "--test", "hal_proptest"],
    },
    Suite {
        label: "bluetooth inbox (threads)",
        args: &["test", "-p", "bluetooth", "--test", "inbox_threads"],
    },
    Suite {
        label: "settings recovery",
        args: &["test", "-p", "firmware", "--test", "settings_recovery"],
    },
    Suite {
        label: "watch lifecycle",
        args: &["test", "-p", "firmware", "--test", "watch_lifecycle"],
    },
    Suite {
        label: "watch lifecycle (std)",
        args: &[
            "test",
            "-p",
            "firmware",
            "--features",
            "std",
            "--test",
            "watch_lifecycle",
        ],
    },
];

const DOC: Suite = Suite {
    label: "doc",
    args: &["test", "--doc", "--workspace", "--exclude", "xtask"],
};

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();
    let mut passed = 0u32;

    if !integration_only {
        passed = passed.saturating_add(run_suite(&UNIT)?);
    }

    if !unit_only {
        for suite in &INTEGRATION {
            passed = passed.saturating_add(run_suite(suite)?);
        }
        // Only the simulator turns on the emulator feature chain.
        build_simulator()?;
    }

    if !unit_only && !integration_only {
        passed = passed.saturating_add(run_suite(&DOC)?);
    }

    println!(
        "{}",
        format!(
            "✓ {} tests passed in {:.2}s",
            passed,
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}

/// Run `suite`, returning the number of passed tests.
fn run_suite(suite: &Suite) -> Result<u32> {
    println!("{}", format!("  Running {} tests...", suite.label).cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(suite.args)
        .output()
        .with_context(|| format!("Failed to run {} tests", suite.label))?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    if !output.status.success() {
        eprintln!("{}", format!("  ✗ {} tests failed", suite.label).red().bold());
        eprintln!();
        for line in stdout.lines().filter(|l| !l.starts_with("test ") || l.ends_with("FAILED")) {
            eprintln!("  {}", line);
        }
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{} tests failed", suite.label);
    }

    let passed = count_passed(&stdout);
    println!(
        "{}",
        format!(
            "  ✓ {}: {} passed in {:.2}s",
            suite.label,
            passed,
            start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();
    Ok(passed)
}

fn build_simulator() -> Result<()> {
    println!("{}", "  Building watch-sim (emulator)...".cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(["build", "-p", "firmware", "--features", "emulator", "--bin", "watch-sim"])
        .output()
        .context("Failed to build watch-sim")?;

    if !output.status.success() {
        eprintln!("{}", "  ✗ watch-sim build failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("watch-sim build failed");
    }

    println!(
        "{}",
        format!("  ✓ watch-sim built in {:.2}s", start.elapsed().as_secs_f64()).green()
    );
    println!();
    Ok(())
}

/// Sum "test result: ok. 5 passed; 0 failed; ..." across test binaries.
fn count_passed(output: &str) -> u32 {
    output
        .lines()
        .filter_map(|line| line.split("test result:").nth(1))
        .filter_map(|result| {
            result
                .split(';')
                .find_map(|part| part.trim().trim_start_matches("ok.").trim().strip_suffix(" passed"))
                .and_then(|n| n.trim().parse::<u32>().ok())
        })
        .fold(0, u32::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_passed_sums_binaries() {
        let out = "\
running 3 tests
test result: ok. 3 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out
running 0 tests
test result: ok. 0 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out
test result: ok. 12 passed; 0 failed; 1 ignored; 0 measured; 0 filtered out";
        assert_eq!(count_passed(out), 15);
        assert_eq!(count_passed("no summary here"), 0);
    }

    #[test]
    fn test_every_integration_file_has_a_suite() {
        for name in [
            "state_machine",
            "irq_bridge",
            "registry_proptest",
            "hal_proptest",
            "inbox_threads",
            "settings_recovery",
            "watch_lifecycle",
        ] {
            assert!(
                INTEGRATION.iter().any(|s| s.args.contains(&name)),
                "no suite runs {}",
                name
            );
        }
    }
}

//! Desktop watch simulator
//!
//! Boots the firmware on the mock board and plays a short scripted day:
//! phone connects, a few steps, display timeout, the alarm rings, a tap
//! wakes the watch. Simulated time runs faster than wall time.
//!
//! Run with: cargo run -p firmware --bin watch-sim --features emulator
//! Log level: RUST_LOG=debug

// Simulated clock arithmetic on small, bounded values.
#![allow(clippy::arithmetic_side_effects)]

use std::cell::RefCell;
use std::time::Duration;

use anyhow::Context;
use bluetooth::{Bluetooth, BluetoothEvent};
use firmware::{alarm, irq, AlarmRecord, RetainedSteps, Subsystems, Watch, Wiring};
use platform::mocks::MockBoard;
use platform::{InterruptStatus, RtcClock};
use tracing_subscriber::EnvFilter;

/// Simulated milliseconds per loop iteration.
const TICK_MS: u64 = 100;

/// Wall-clock pause per loop iteration.
const REAL_TICK: Duration = Duration::from_millis(5);

/// 2024-01-03 06:58:30 UTC.
const BOOT_UNIX: i64 = 1_704_265_110;

/// Script length in simulated seconds.
const RUN_S: u64 = 150;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        "{} v{}",
        platform::config::dev_banner(),
        firmware::config::FIRMWARE_VERSION
    );

    let (drivers, store) = firmware::split(MockBoard::peripherals(BOOT_UNIX));
    let store = RefCell::new(store);
    let wiring = Wiring::statics();
    let sys = Subsystems::<MockBoard>::new(drivers, &store, wiring);
    let watch = Watch::new(&sys, RetainedSteps::default()).context("boot")?;

    sys.rtc
        .set_alarm(AlarmRecord {
            enabled: true,
            hour: 7,
            minute: 0,
            week_days: [false; 7],
        })
        .context("set alarm")?;

    let mut interval = tokio::time::interval(REAL_TICK);
    let mut rung_at = None;
    let mut uptime_ms = 0u64;
    while uptime_ms <= RUN_S * 1_000 {
        interval.tick().await;

        let now = sys.rtc.clock_mut().now().unwrap_or(BOOT_UNIX);
        script(&sys, &watch, uptime_ms, wiring);

        // The mock RTC has no comparator; fire the INT line on a match.
        if sys.rtc.clock().alarm_enabled()
            && sys.rtc.clock().alarm() == alarm::alarm_registers(now)
            && rung_at != Some(now / 60)
        {
            rung_at = Some(now / 60);
            irq::on_rtc_irq();
        }

        let report = watch.tick(uptime_ms, now);
        if let Some(state) = report.transition {
            tracing::info!(
                "t={}s {} backlight={} steps={} time={}",
                uptime_ms / 1_000,
                state.as_str(),
                sys.display.panel().backlight(),
                sys.motion.steps(),
                sys.gui.main_tile().time()
            );
        }

        uptime_ms += TICK_MS;
        if uptime_ms % 1_000 == 0 {
            sys.rtc.clock_mut().advance(1);
        }
    }

    let face = sys.gui.main_tile();
    tracing::info!(
        "done: state={} time={} steps={} alarm={} ble={} next alarm weekday={}",
        watch.state().as_str(),
        face.time(),
        face.steps(),
        face.alarm(),
        face.bluetooth(),
        sys.rtc.next_alarm_weekday().map_or(-1, i16::from)
    );
    Ok(())
}

/// Scripted inputs, keyed on simulated uptime.
fn script(
    sys: &Subsystems<'_, MockBoard>,
    watch: &Watch<'_, MockBoard>,
    uptime_ms: u64,
    wiring: Wiring<'_>,
) {
    match uptime_ms {
        2_000 => {
            tracing::info!("script: phone connects");
            let peer = [0x24, 0x0a, 0xc4, 0x12, 0x34, 0x56];
            if !Bluetooth::post(wiring.inbox, BluetoothEvent::Connected(peer)) {
                tracing::warn!("script: inbox full");
            }
        }
        5_000 => {
            tracing::info!("script: walking");
            let mut accel = sys.motion.accel_mut();
            accel.set_steps(120);
            accel.trigger(InterruptStatus {
                step_counter: true,
                ..InterruptStatus::default()
            });
            drop(accel);
            irq::on_motion_irq();
        }
        8_000 => {
            tracing::info!("script: touch");
            watch.user_activity(uptime_ms);
        }
        120_000 => {
            tracing::info!("script: double tap");
            sys.motion.accel_mut().trigger(InterruptStatus {
                double_click: true,
                ..InterruptStatus::default()
            });
            irq::on_motion_irq();
        }
        135_000 => {
            tracing::info!("script: power button");
            irq::on_power_button();
        }
        _ => {}
    }
}

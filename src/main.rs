//! HID Event Logger - print every keyboard and mouse event, optionally suppressing them.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use hid_logger::cli::Cli;
use hid_logger::kill_switch::KILL_KEY;
use hid_logger::{driver, open_default_source, EventCallback, Interrupt, KillSwitch, StopReason};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries the event lines, keep diagnostics out of it
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    let kill_switch = Arc::new(KillSwitch::new());
    let callback = EventCallback::stdout(config.policy, Arc::clone(&kill_switch));

    let mut source = match open_default_source(config.policy, Box::new(callback)) {
        Ok(source) => source,
        Err(e) => {
            error!("cannot install interception point: {e}");
            eprintln!("Error: Failed to create event tap.");
            if let Some(remediation) = e.remediation() {
                eprintln!("{remediation}");
            }
            return ExitCode::FAILURE;
        }
    };

    let interrupt = Interrupt::new();
    if let Err(e) = interrupt.install_handler() {
        warn!("failed to install interrupt handler, only '{KILL_KEY}' will stop the logger: {e}");
    }

    println!("HID Event Logger started.");
    println!(
        "Event suppression: {}",
        if config.policy.is_suppressing() { "ON" } else { "OFF" }
    );
    println!("Press '{KILL_KEY}' to stop logging.");

    let reason = driver::run(&mut source, &kill_switch, &interrupt, config.pump_interval);
    info!("driver loop finished: {reason:?}");

    match reason {
        StopReason::KillSwitch => println!("Logger stopped."),
        StopReason::Interrupted => println!("\nLogger stopped by interrupt."),
    }

    ExitCode::SUCCESS
}

//! Command-line interface

use std::time::Duration;

use clap::Parser;

use crate::callback::SuppressionPolicy;
use crate::driver::PUMP_INTERVAL;

/// HID event logger: print every keyboard and mouse event, optionally keeping them from the OS
#[derive(Parser, Debug)]
#[command(name = "hid-logger")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
  hid-logger            Log events without suppressing them
  hid-logger --catch    Log and suppress events (blocks OS input)

Press 'q' to stop. Diagnostics go to stderr and are filtered with RUST_LOG.")]
pub struct Cli {
    /// Suppress events (prevent them from reaching the OS)
    #[arg(long)]
    pub catch: bool,
}

/// Settings for one run, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub policy: SuppressionPolicy,
    pub pump_interval: Duration,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            policy: SuppressionPolicy::from_catch(self.catch),
            pump_interval: PUMP_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn forwards_by_default() {
        let cli = Cli::try_parse_from(["hid-logger"]).unwrap();

        assert_eq!(
            cli.config(),
            Config {
                policy: SuppressionPolicy::Forward,
                pump_interval: Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn catch_suppresses() {
        let cli = Cli::try_parse_from(["hid-logger", "--catch"]).unwrap();

        assert_eq!(cli.config().policy, SuppressionPolicy::Suppress);
    }

    #[test]
    fn rejects_anything_else() {
        assert!(Cli::try_parse_from(["hid-logger", "--verbose"]).is_err());
        assert!(Cli::try_parse_from(["hid-logger", "out.log"]).is_err());
    }
}

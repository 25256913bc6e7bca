//! Progress display selection
//!
//! Every dualseed command accepts `--progress off|linear|detailed`. The mode
//! only decides *whether* bars are drawn; rendering lives with the callers.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

/// Progress display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// Never draw progress
    Off,
    /// Draw progress only when stdout is an interactive terminal
    #[default]
    Linear,
    /// Always draw progress
    Detailed,
}

impl ProgressMode {
    /// Whether progress output should be shown in this process
    pub fn should_show(self) -> bool {
        self.resolve(std::io::stdout().is_terminal())
    }

    /// Resolve the mode against a known terminal state
    pub fn resolve(self, stdout_is_terminal: bool) -> bool {
        match self {
            ProgressMode::Off => false,
            ProgressMode::Linear => stdout_is_terminal,
            ProgressMode::Detailed => true,
        }
    }

    /// Mode handed to child steps. A linear parent draws the only bar.
    pub fn for_child(self) -> ProgressMode {
        match self {
            ProgressMode::Linear => ProgressMode::Off,
            other => other,
        }
    }

    /// Command-line spelling of the mode
    pub fn as_arg(self) -> &'static str {
        match self {
            ProgressMode::Off => "off",
            ProgressMode::Linear => "linear",
            ProgressMode::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_arg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert!(!ProgressMode::Off.resolve(true));
        assert!(ProgressMode::Linear.resolve(true));
        assert!(!ProgressMode::Linear.resolve(false));
        assert!(ProgressMode::Detailed.resolve(false));
    }

    #[test]
    fn test_child_mode() {
        assert_eq!(ProgressMode::Linear.for_child(), ProgressMode::Off);
        assert_eq!(ProgressMode::Detailed.for_child(), ProgressMode::Detailed);
        assert_eq!(ProgressMode::Off.for_child(), ProgressMode::Off);
    }

    #[test]
    fn test_as_arg_round_trips_through_clap() {
        for mode in [ProgressMode::Off, ProgressMode::Linear, ProgressMode::Detailed] {
            assert_eq!(ProgressMode::from_str(mode.as_arg(), false), Ok(mode));
        }
    }
}

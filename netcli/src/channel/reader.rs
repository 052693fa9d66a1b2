//! Output completion strategies.
//!
//! A device shell never says "this response is finished". The reader
//! decides when to stop draining the channel.

use std::time::Duration;

use regex::bytes::Regex;
use serde::Serialize;

/// How the shell decides a command's output is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadStrategy {
    /// Always wait the full window, then return whatever arrived.
    FixedWait,

    /// Return as soon as the prompt reappears on the last line. Pauses in
    /// the output do not end the read; the wait window is the upper bound.
    #[default]
    Adaptive,

    /// Return once bytes have arrived and the channel has then been silent
    /// for `idle`, ignoring the prompt. For devices whose prompt cannot be
    /// matched; the result is never reported as complete.
    Quiescence { idle: Duration },
}

impl std::str::FromStr for ReadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "fixed-wait" => Ok(ReadStrategy::FixedWait),
            "adaptive" | "prompt" => Ok(ReadStrategy::Adaptive),
            "idle" | "quiescence" => Ok(ReadStrategy::Quiescence {
                idle: Duration::from_millis(500),
            }),
            other => Err(format!(
                "unknown read strategy '{other}' (expected adaptive, idle or fixed)"
            )),
        }
    }
}

/// Why reading stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// The device prompt was seen at the end of the output.
    Prompt,
    /// Output arrived, then the channel went quiet for the idle window.
    /// The device may still have been working.
    Idle,
    /// The wait window elapsed. Output may be truncated, or the device
    /// may simply have had nothing to say.
    WaitElapsed,
}

/// Interactive shell tuning.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Completion strategy.
    pub strategy: ReadStrategy,

    /// Sleep between non-blocking drains of the channel.
    pub poll_interval: Duration,

    /// Delay after opening the shell before the banner is discarded.
    pub settle: Duration,

    /// Prompt pattern overriding the platform's combined pattern.
    pub prompt_pattern: Option<Regex>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            strategy: ReadStrategy::default(),
            poll_interval: Duration::from_millis(50),
            settle: Duration::from_secs(1),
            prompt_pattern: None,
        }
    }
}

/// Per-command-class wait windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitProfile {
    /// Configuration steps and simple commands.
    pub short: Duration,

    /// Interface listings and detail dumps.
    pub long: Duration,

    /// Full configuration dumps.
    pub dump: Duration,
}

impl Default for WaitProfile {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(1),
            long: Duration::from_secs(2),
            dump: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        assert_eq!(
            "fixed".parse::<ReadStrategy>().unwrap(),
            ReadStrategy::FixedWait
        );
        assert_eq!(
            "Adaptive".parse::<ReadStrategy>().unwrap(),
            ReadStrategy::default()
        );
        assert_eq!(
            "idle".parse::<ReadStrategy>().unwrap(),
            ReadStrategy::Quiescence {
                idle: Duration::from_millis(500)
            }
        );
        assert!("sometimes".parse::<ReadStrategy>().is_err());
    }

    #[test]
    fn test_adaptive_is_default() {
        let options = ShellOptions::default();
        assert_eq!(options.strategy, ReadStrategy::Adaptive);
        assert_eq!(options.settle, Duration::from_secs(1));
    }
}

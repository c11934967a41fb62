//! # Terminal Output
//!
//! Styling for the human-readable summaries printed by the CLI. Colors
//! follow the `--color` flag; in `auto` mode they are dropped when
//! `NO_COLOR` is set, `CLICOLOR=0`, `TERM=dumb`, or stdout is not a
//! terminal (unless `CLICOLOR_FORCE` is set).

use std::env;

use console::Style;

use crate::orchestrator::Outcome;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from the environment and the value of
    /// the `--color` flag (`always`, `never` or `auto`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => colors_wanted(),
        };
        Self { use_color }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Marker for a source outcome: a colored symbol, or a bracketed word
    /// without colors.
    pub fn outcome(&self, outcome: Outcome) -> String {
        let (symbol, word, style) = match outcome {
            Outcome::Synced => ("✓", "[ok]", Style::new().green()),
            Outcome::Absent => ("–", "[absent]", Style::new().dim()),
            Outcome::NotCached => ("○", "[not cached]", Style::new().yellow()),
            Outcome::Failed => ("✗", "[failed]", Style::new().red().bold()),
        };
        if self.use_color {
            style.force_styling(true).apply_to(symbol).to_string()
        } else {
            word.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        if self.use_color {
            Style::new().bold().force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

fn colors_wanted() -> bool {
    // https://no-color.org/: presence alone disables colors
    if env::var_os("NO_COLOR").is_some()
        || env::var("CLICOLOR").is_ok_and(|v| v == "0")
        || env::var("TERM").is_ok_and(|v| v == "dumb")
    {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    console::Term::stdout().features().colors_supported()
}

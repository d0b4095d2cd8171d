//! # Output Configuration
//!
//! Controls how the `mono` and `mgit` binaries talk to the terminal:
//! colours and emoji for user-facing progress lines, and the `env_logger`
//! setup behind the `log` facade used throughout the library.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use virtual_monorepo::output::{emoji, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} {}", emoji(&out, "✅", "[OK]"), out.success("Linked 3 files"));
//! ```

use std::env;

use console::style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: "always" forces colours on
    /// (overriding `NO_COLOR`), "never" forces them off, anything else
    /// detects support from the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, |s| style(s).green().force_styling(true).to_string())
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, |s| style(s).yellow().force_styling(true).to_string())
    }

    pub fn failure(&self, text: &str) -> String {
        self.paint(text, |s| style(s).red().force_styling(true).to_string())
    }

    /// Section headings and "running X in Y" progress lines.
    pub fn heading(&self, text: &str) -> String {
        self.paint(text, |s| style(s).blue().force_styling(true).to_string())
    }

    fn paint(&self, text: &str, styler: impl Fn(&str) -> String) -> String {
        if self.use_color {
            styler(text)
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

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Initialise `env_logger` at `level` unless `RUST_LOG` says otherwise.
///
/// Log records go to stderr so they never interleave with command output
/// on stdout. Calling this more than once is harmless.
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level.to_lowercase());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

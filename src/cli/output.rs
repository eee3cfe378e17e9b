//! Output formatting module for Rustible Inventory
//!
//! Provides colored messages and the human/JSON/YAML rendering of command
//! results. Results go to stdout, diagnostics to stderr.

use super::OutputFormat;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Selected result format
    format: OutputFormat,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            format,
            verbosity,
        }
    }

    /// Selected result format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn json_mode(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print a group name in a tree (`@name:`)
    pub fn group_label(&self, prefix: &str, name: &str) {
        if self.use_color {
            println!("{}{}", prefix, format!("@{}:", name).cyan().bold());
        } else {
            println!("{}@{}:", prefix, name);
        }
    }

    /// Print a host name in a tree
    pub fn host_label(&self, prefix: &str, name: &str) {
        if self.use_color {
            println!("{}{}", prefix, name.bright_white());
        } else {
            println!("{}{}", prefix, name);
        }
    }

    /// Print a variable line in a tree
    pub fn var_label(&self, prefix: &str, key: &str, value: &str) {
        if self.use_color {
            println!("{}{{{} = {}}}", prefix, key.bright_black(), value);
        } else {
            println!("{}{{{} = {}}}", prefix, key, value);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.json_mode() {
            let err = serde_json::json!({
                "type": "error",
                "message": message
            });
            eprintln!("{}", err);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.json_mode() {
            let warn = serde_json::json!({
                "type": "warning",
                "message": message
            });
            eprintln!("{}", warn);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 {
            return;
        }

        if self.use_color && !self.json_mode() {
            eprintln!("{} {}", "INFO:".blue(), message);
        } else {
            eprintln!("INFO: {}", message);
        }
    }

    /// Print a debug message (requires higher verbosity)
    pub fn debug(&self, message: &str) {
        if self.verbosity < 2 {
            return;
        }

        if self.use_color && !self.json_mode() {
            eprintln!("{} {}", "DEBUG:".magenta(), message);
        } else {
            eprintln!("DEBUG: {}", message);
        }
    }

    /// Print a plain result line
    pub fn plain(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a serializable value as JSON (pretty) or YAML
    ///
    /// Human mode uses JSON as well, matching `ansible-inventory`.
    pub fn data<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
            OutputFormat::Json | OutputFormat::Human => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_modes() {
        let formatter = OutputFormatter::new(false, OutputFormat::Json, 0);
        assert!(formatter.json_mode());
        assert_eq!(formatter.format(), OutputFormat::Json);

        let formatter = OutputFormatter::new(true, OutputFormat::Human, 2);
        assert!(!formatter.json_mode());
    }

    #[test]
    fn test_data_serializes() {
        let formatter = OutputFormatter::new(false, OutputFormat::Yaml, 0);
        let value = serde_json::json!({"a": 1});
        assert!(formatter.data(&value).is_ok());
    }
}

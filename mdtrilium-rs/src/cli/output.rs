//! Output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::error::Result;
use serde::Serialize;

/// Helper for formatting and printing command output to stdout.
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Serialize a value in the configured format.
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Toml => toml::to_string_pretty(value)?,
        })
    }

    /// Print a serializable value in the configured format.
    pub fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", self.render(value)?);
        Ok(())
    }

    /// Print raw text (not serialized).
    pub fn print_raw(&self, text: &str) {
        print!("{}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        count: usize,
    }

    fn sample() -> Sample {
        Sample {
            name: "notes".to_string(),
            count: 2,
        }
    }

    #[test]
    fn test_render_formats() {
        let json = Output::new(OutputFormat::Json).render(&sample()).unwrap();
        assert!(json.contains("\"count\": 2"));

        let yaml = Output::new(OutputFormat::Yaml).render(&sample()).unwrap();
        assert!(yaml.contains("name: notes"));

        let toml = Output::new(OutputFormat::Toml).render(&sample()).unwrap();
        assert!(toml.contains("count = 2"));
    }
}

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print `value` for the structured formats. Returns `false` for
    /// `Human`, leaving the rendering to the caller.
    pub fn print_structured<T: Serialize>(&self, value: &T) -> Result<bool> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value)?),
            OutputFormat::Human => return Ok(false),
        }
        Ok(true)
    }
}

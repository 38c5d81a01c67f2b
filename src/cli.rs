use crate::config::config::{parse_delimiter, Config};
use crate::data::csv_store::CsvOptions;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for dokumentu
#[derive(Parser, Debug)]
#[command(version, about = "Scroll through large CSV files in the terminal")]
pub struct Args {
    /// CSV files to open; `]` and `[` switch between them
    #[arg(required_unless_present = "generate_config")]
    pub files: Vec<PathBuf>,

    /// Field delimiter, overriding the config (a single character or "tab")
    #[arg(long = "delimiter")]
    pub delimiter: Option<String>,

    /// Keep whitespace around fields
    #[arg(long = "no-trim", action)]
    pub no_trim: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Write a commented default config file and exit
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Log at debug level
    #[arg(long = "debug", action)]
    pub debug: bool,
}

impl Args {
    /// CSV options from the config, with command-line overrides applied
    pub fn csv_options(&self, config: &Config) -> Result<CsvOptions> {
        let mut options = config.behavior.csv_options()?;
        if let Some(delimiter) = &self.delimiter {
            options = options.with_delimiter(parse_delimiter(delimiter)?);
        }
        if self.no_trim {
            options = options.with_trim_whitespace(false);
        }
        Ok(options)
    }
}

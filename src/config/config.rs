use crate::data::csv_store::CsvOptions;
use crate::ui::viewport::cell_label::{DEFAULT_FIRST_PART_CHARS, DEFAULT_HEADER_MAX_CHARS};
use crate::ui::viewport::column_layout::{
    DEFAULT_MAX_COLUMN_WIDTH, DEFAULT_MIN_COLUMN_WIDTH, DEFAULT_SAMPLE_ROWS,
};
use crate::ui::viewport::{CellLabeler, LayoutSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Header names longer than this are shortened
    pub header_max_chars: usize,

    /// Characters kept before the first separator of a shortened header,
    /// capped one below `header_max_chars`
    pub header_first_part_chars: usize,

    /// Narrowest column width
    pub min_column_width: u16,

    /// Widest column width; longer values are truncated
    pub max_column_width: u16,

    /// Leading rows measured when sizing columns
    pub column_sample_rows: usize,

    /// Show row numbers in a gutter left of the grid
    pub show_row_numbers: bool,

    /// Keep the header row on screen while scrolling
    pub pin_header: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Columns moved per horizontal scroll key press
    pub horizontal_step: usize,

    /// Trim whitespace around fields when loading
    pub trim_whitespace: bool,

    /// Field delimiter, a single ASCII character
    pub delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,

    /// Also write logs to a file in the data directory
    pub log_to_file: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            header_max_chars: DEFAULT_HEADER_MAX_CHARS,
            header_first_part_chars: DEFAULT_FIRST_PART_CHARS,
            min_column_width: DEFAULT_MIN_COLUMN_WIDTH,
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            column_sample_rows: DEFAULT_SAMPLE_ROWS,
            show_row_numbers: true,
            pin_header: true,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            horizontal_step: 4,
            trim_whitespace: true,
            delimiter: ",".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: true,
        }
    }
}

impl DisplayConfig {
    pub fn labeler(&self) -> CellLabeler {
        CellLabeler::new(self.header_max_chars, self.header_first_part_chars)
    }

    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            min_width: self.min_column_width,
            max_width: self.max_column_width,
            sample_rows: self.column_sample_rows,
        }
    }
}

impl BehaviorConfig {
    pub fn csv_options(&self) -> Result<CsvOptions> {
        Ok(CsvOptions::default()
            .with_delimiter(parse_delimiter(&self.delimiter)?)
            .with_trim_whitespace(self.trim_whitespace))
    }
}

/// Accepts a single ASCII character, or `\t` / `tab` for tabs
pub fn parse_delimiter(value: &str) -> Result<u8> {
    if matches!(value, "\\t" | "tab") {
        return Ok(b'\t');
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() => Ok(ch as u8),
        _ => Err(anyhow!(
            "Delimiter must be a single ASCII character, got {:?}",
            value
        )),
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("dokumentu").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Dokumentu Configuration File
# Location: ~/.config/dokumentu/config.toml (Linux)
#           ~/Library/Application Support/dokumentu/config.toml (macOS)
#           %APPDATA%\dokumentu\config.toml (Windows)

[display]
# Header names longer than this many characters are shortened.
# "customer_identification" is shown as "customer_ide"
header_max_chars = 12

# Characters kept from the part before the first '_' or space
header_first_part_chars = 8

# Column width limits; wider values are cut with '…'
min_column_width = 6
max_column_width = 40

# Number of leading rows measured to size columns
column_sample_rows = 10

# Show row numbers left of the grid
show_row_numbers = true

# Keep the header row visible while scrolling
pin_header = true

[behavior]
# Columns moved per left/right key press
horizontal_step = 4

# Trim whitespace around fields when loading
trim_whitespace = true

# Field delimiter: a single character, or "tab"
delimiter = ","

[logging]
# Default log level when RUST_LOG is not set: "error", "warn", "info", "debug", "trace"
level = "info"

# Write logs to the data directory in addition to the in-app log view (F5)
log_to_file = true
"#
        .to_string()
    }
}

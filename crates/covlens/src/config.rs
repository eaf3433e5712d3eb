//! Configuration file support for covlens
//!
//! Config file location: `~/.config/covlens/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! [renderer]
//! overscan = 10
//! estimated_row_height = 1
//! pointer_quiet_ms = 150
//!
//! [ui]
//! line_wrap = false
//! scrollbar = true
//! syntax = true
//! warning_marker = "▲"
//! partial_marker = "◐"
//! highlight_marker = "▶"
//!
//! [ui.colors]
//! hit = "#A3BE8C"
//! miss = "#BF616A"
//! partial = "#EBCB8B"
//! ```

use covlens_core::RendererConfig;
use ratatui::style::Color;
use serde::Deserialize;
use std::path::PathBuf;

/// Coverage and chrome colors, as hex strings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub hit: String,
    pub miss: String,
    pub partial: String,
    pub line_number: String,
    pub highlight_bg: String,
    pub added_bg: String,
    pub removed_bg: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            hit: "#A3BE8C".to_string(),
            miss: "#BF616A".to_string(),
            partial: "#EBCB8B".to_string(),
            line_number: "#616E88".to_string(),
            highlight_bg: "#3B4252".to_string(),
            added_bg: "#1F2B1F".to_string(),
            removed_bg: "#2E1E20".to_string(),
        }
    }
}

/// Colors resolved to ratatui values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub hit: Color,
    pub miss: Color,
    pub partial: Color,
    pub line_number: Color,
    pub highlight_bg: Color,
    pub added_bg: Color,
    pub removed_bg: Color,
}

impl Default for Palette {
    fn default() -> Self {
        ColorConfig::default().resolve()
    }
}

impl ColorConfig {
    pub fn resolve(&self) -> Palette {
        Palette {
            hit: parse_hex(&self.hit).unwrap_or(Color::Green),
            miss: parse_hex(&self.miss).unwrap_or(Color::Red),
            partial: parse_hex(&self.partial).unwrap_or(Color::Yellow),
            line_number: parse_hex(&self.line_number).unwrap_or(Color::DarkGray),
            highlight_bg: parse_hex(&self.highlight_bg).unwrap_or(Color::DarkGray),
            added_bg: parse_hex(&self.added_bg).unwrap_or(Color::Reset),
            removed_bg: parse_hex(&self.removed_bg).unwrap_or(Color::Reset),
        }
    }
}

/// Parse `#RRGGBB` (or `RRGGBB`) into an RGB color
pub fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// UI configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Wrap long lines instead of scrolling horizontally
    pub line_wrap: bool,
    /// Show the horizontal scrollbar when content overflows
    pub scrollbar: bool,
    /// Syntax highlighting
    pub syntax: bool,
    /// Gutter icon for uncovered lines
    pub warning_marker: String,
    /// Gutter icon for partially covered lines
    pub partial_marker: String,
    /// Marker next to the highlighted line number
    pub highlight_marker: String,
    pub colors: ColorConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            line_wrap: false,
            scrollbar: true,
            syntax: true,
            warning_marker: "▲".to_string(),
            partial_marker: "◐".to_string(),
            highlight_marker: "▶".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub renderer: RendererConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Get all possible config file paths in priority order
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("covlens").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("covlens").join("config.toml"));
        }

        // Platform-specific config dir (~/Library/Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("covlens").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        paths
    }

    /// Get the first existing config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|p| p.exists())
    }

    /// Load config from the first existing path.
    /// Returns default config if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| {
                Self::parse(&content)
                    .map_err(|e| {
                        tracing::warn!(%e, "failed to parse config");
                        eprintln!("Warning: Failed to parse config: {}", e);
                        e
                    })
                    .ok()
            })
            .unwrap_or_default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/*
 *  config.rs
 *
 *  LCDvu - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	YAML configuration layered under command line overrides
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::*;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Every field is optional so files and
/// command lines only need to carry what they change.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    pub mixer: Option<MixerConfig>,
    pub meter: Option<MeterConfig>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Hd44780,  // 1602/2004 modules behind a PCF8574 I2C backpack
    Terminal, // stdout rendering, no hardware needed
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>,
    pub cols: Option<u8>,
    pub rows: Option<u8>,
    pub backlight: Option<bool>,
    pub i2c: Option<I2cConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct I2cConfig {
    pub bus: Option<String>,    // e.g. "/dev/i2c-1"
    pub address: Option<u8>,    // 7-bit, e.g. 0x27
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MixerBackend {
    /// libasound simple mixer element (alsa-mixer feature)
    Alsa,
    /// parse `amixer sget` output
    Amixer,
    /// no mixer, the meter stays blank
    None,
}

impl Default for MixerBackend {
    fn default() -> Self {
        if cfg!(feature = "alsa-mixer") {
            MixerBackend::Alsa
        } else {
            MixerBackend::Amixer
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MixerConfig {
    pub backend: Option<MixerBackend>,
    pub card: Option<String>,       // ALSA device, "default", "hw:0", ...
    pub control: Option<String>,    // simple element name, "Master", "PCM", ...
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MeterConfig {
    pub refresh_ms: Option<u64>,
    pub splash: Option<bool>,
    pub splash_ms: Option<u64>,
    pub welcome: Option<String>,
    pub row: Option<u8>,
}

impl Config {
    pub fn display(&self) -> DisplayConfig {
        self.display.clone().unwrap_or_default()
    }

    pub fn mixer(&self) -> MixerConfig {
        self.mixer.clone().unwrap_or_default()
    }

    pub fn meter(&self) -> MeterConfig {
        self.meter.clone().unwrap_or_default()
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }
}

impl DisplayConfig {
    pub fn driver(&self) -> DriverKind {
        self.driver.unwrap_or(DriverKind::Hd44780)
    }
    pub fn cols(&self) -> u8 {
        self.cols.unwrap_or(LCD_COLS)
    }
    pub fn rows(&self) -> u8 {
        self.rows.unwrap_or(LCD_ROWS)
    }
    pub fn backlight(&self) -> bool {
        self.backlight.unwrap_or(true)
    }
    pub fn i2c_bus(&self) -> &str {
        self.i2c.as_ref().and_then(|c| c.bus.as_deref()).unwrap_or(DEFAULT_I2C_BUS)
    }
    pub fn i2c_address(&self) -> u8 {
        self.i2c.as_ref().and_then(|c| c.address).unwrap_or(DEFAULT_I2C_ADDRESS)
    }
}

impl MixerConfig {
    pub fn backend(&self) -> MixerBackend {
        self.backend.unwrap_or_default()
    }
    pub fn card(&self) -> &str {
        self.card.as_deref().unwrap_or(DEFAULT_MIXER_CARD)
    }
    pub fn control(&self) -> &str {
        self.control.as_deref().unwrap_or(DEFAULT_MIXER_CONTROL)
    }
}

impl MeterConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.unwrap_or(DEFAULT_REFRESH_MS))
    }
    pub fn show_splash(&self) -> bool {
        self.splash.unwrap_or(true)
    }
    pub fn splash_duration(&self) -> Duration {
        Duration::from_millis(self.splash_ms.unwrap_or(DEFAULT_SPLASH_MS))
    }
    pub fn welcome(&self) -> &str {
        self.welcome.as_deref().unwrap_or(WELCOME_TEXT)
    }
    pub fn row(&self) -> u8 {
        self.row.unwrap_or(METER_ROW)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "lcdvu", version, about = "Stereo volume bar-graph on a 16x2 character LCD")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// I2C bus device path for the LCD (e.g., /dev/i2c-1)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub i2c_bus: Option<String>,
    /// PCF8574 backpack address, hex (0x27) or decimal
    #[arg(long, value_parser = parse_address)]
    pub address: Option<u8>,
    #[arg(long, value_enum)]
    pub mixer: Option<MixerBackend>,
    /// ALSA card/device the mixer lives on
    #[arg(long)]
    pub card: Option<String>,
    /// Mixer control to follow
    #[arg(long)]
    pub control: Option<String>,
    /// Meter refresh interval in milliseconds
    #[arg(long)]
    pub refresh_ms: Option<u64>,
    /// Skip the welcome message
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_splash: bool,
    /// Render to the terminal instead of the LCD
    #[arg(long, action = ArgAction::SetTrue)]
    pub emulated: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid I2C address '{}': {}", s, e))
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of the effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/lcdvu/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/lcdvu/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/lcdvu.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["lcdvu.yaml", "config.yaml", "config/lcdvu.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    Config::from_yaml_str(&s)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.mixer, src.mixer) {
        (None, Some(c)) => dst.mixer = Some(c),
        (Some(d), Some(s)) => merge_mixer(d, s),
        _ => {}
    }
    match (&mut dst.meter, src.meter) {
        (None, Some(c)) => dst.meter = Some(c),
        (Some(d), Some(s)) => merge_meter(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()    { dst.driver = src.driver; }
    if src.cols.is_some()      { dst.cols = src.cols; }
    if src.rows.is_some()      { dst.rows = src.rows; }
    if src.backlight.is_some() { dst.backlight = src.backlight; }
    match (&mut dst.i2c, src.i2c) {
        (None, Some(c)) => dst.i2c = Some(c),
        (Some(d), Some(s)) => {
            if s.bus.is_some()     { d.bus = s.bus; }
            if s.address.is_some() { d.address = s.address; }
        }
        _ => {}
    }
}

fn merge_mixer(dst: &mut MixerConfig, src: MixerConfig) {
    if src.backend.is_some() { dst.backend = src.backend; }
    if src.card.is_some()    { dst.card = src.card; }
    if src.control.is_some() { dst.control = src.control; }
}

fn merge_meter(dst: &mut MeterConfig, src: MeterConfig) {
    if src.refresh_ms.is_some() { dst.refresh_ms = src.refresh_ms; }
    if src.splash.is_some()     { dst.splash = src.splash; }
    if src.splash_ms.is_some()  { dst.splash_ms = src.splash_ms; }
    if src.welcome.is_some()    { dst.welcome = src.welcome; }
    if src.row.is_some()        { dst.row = src.row; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug {
        cfg.log_level = Some("debug".to_string());
    } else if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }

    if cli.i2c_bus.is_some() || cli.address.is_some() || cli.emulated {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.emulated { display.driver = Some(DriverKind::Terminal); }
        if cli.i2c_bus.is_some() || cli.address.is_some() {
            let i2c = display.i2c.get_or_insert_with(I2cConfig::default);
            if cli.i2c_bus.is_some() { i2c.bus = cli.i2c_bus.clone(); }
            if cli.address.is_some() { i2c.address = cli.address; }
        }
    }

    if cli.mixer.is_some() || cli.card.is_some() || cli.control.is_some() {
        let mixer = cfg.mixer.get_or_insert_with(MixerConfig::default);
        if cli.mixer.is_some()   { mixer.backend = cli.mixer; }
        if cli.card.is_some()    { mixer.card = cli.card.clone(); }
        if cli.control.is_some() { mixer.control = cli.control.clone(); }
    }

    if cli.refresh_ms.is_some() || cli.no_splash {
        let meter = cfg.meter.get_or_insert_with(MeterConfig::default);
        if cli.refresh_ms.is_some() { meter.refresh_ms = cli.refresh_ms; }
        if cli.no_splash            { meter.splash = Some(false); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let display = cfg.display();
    if display.cols() < LCD_COLS {
        return Err(ConfigError::Validation(format!(
            "display cols must be at least {} to fit both channels", LCD_COLS
        )));
    }
    if display.rows() == 0 || display.rows() > 4 {
        return Err(ConfigError::Validation("display rows must be 1..=4".into()));
    }
    // HD44780 DDRAM holds 80 cells, at most 40 per line
    if display.cols() > LCD_MAX_COLS
        || display.cols() as u16 * display.rows() as u16 > LCD_DDRAM_CELLS
    {
        return Err(ConfigError::Validation(format!(
            "{}x{} does not fit the controller: at most {} cols and {} cells",
            display.cols(), display.rows(), LCD_MAX_COLS, LCD_DDRAM_CELLS
        )));
    }
    let address = display.i2c_address();
    if !(0x03..=0x77).contains(&address) {
        return Err(ConfigError::Validation(format!(
            "I2C address 0x{:02X} outside the 7-bit range 0x03..=0x77", address
        )));
    }

    let meter = cfg.meter();
    if meter.refresh_interval().is_zero() {
        return Err(ConfigError::Validation("meter refresh_ms must be > 0".into()));
    }
    if meter.row() >= display.rows() {
        return Err(ConfigError::Validation(format!(
            "meter row {} does not exist on a {} row display", meter.row(), display.rows()
        )));
    }

    let mixer = cfg.mixer();
    if mixer.control().is_empty() {
        return Err(ConfigError::Validation("mixer control must not be empty".into()));
    }
    Ok(())
}

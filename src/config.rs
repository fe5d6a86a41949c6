use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::calendar;
use crate::error::{Error, ErrorKind, Result};
use crate::holidays::{BundledHolidays, HolidayDir, HolidaySource};
use crate::i18n::Language;
use crate::layout::AxisOrientation;
use crate::paper::{PageLayoutMode, PageOrientation, PaperSize, PaperSpec};
use crate::store::Defaults;

const CONFIG_PATH_ENV_VAR: &str = "ALMANAC_CONFIG_FILE";
const APP_DIR_NAME: &str = "almanac";
const DEFAULT_TICK_RATE_MS: u64 = 100;

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    let home = dirs::home_dir();

    match env::var("XDG_CONFIG_HOME") {
        Ok(dir) => locations.push([dir.as_str(), APP_DIR_NAME, "config.toml"].iter().collect()),
        Err(_) => {
            if let Some(home) = &home {
                locations.push(home.join(".config").join(APP_DIR_NAME).join("config.toml"));
            }
        }
    }

    if let Some(home) = &home {
        locations.push(home.join(".almanac.toml"));
    }

    locations
}

pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load(path);
    }

    match find_configfile_locations()
        .into_iter()
        .find(|location| location.is_file())
    {
        Some(location) => Config::load(&location),
        None => {
            log::info!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    pub language: Language,
    pub axis: AxisOrientation,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub paper: PaperSize,
    /// Follows the axis when unset.
    pub page_orientation: Option<PageOrientation>,
    pub layout: PageLayoutMode,
    pub font: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            paper: PaperSize::default(),
            page_orientation: None,
            layout: PageLayoutMode::default(),
            font: None,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HolidayConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    tick_rate_ms: u64,
    pub log_file: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    pub calendar: CalendarConfig,
    pub export: ExportConfig,
    pub holidays: HolidayConfig,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            log_file: None,
            data_dir: None,
            calendar: CalendarConfig::default(),
            export: ExportConfig::default(),
            holidays: HolidayConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|err| {
            Error::new(
                ErrorKind::ConfigParse,
                &format!("Could not read '{}': {}", path.display(), err),
            )
        })?;
        let config = Config::from_toml(&content).map_err(|err| {
            Error::new(
                ErrorKind::ConfigParse,
                &format!("'{}': {}", path.display(), err),
            )
        })?;
        log::info!("Loaded configuration from '{}'", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_rate_ms == 0 {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                "tick_rate_ms must be positive",
            ));
        }
        if let Some(year) = self.calendar.year {
            calendar::validate_year(year)?;
        }
        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Preferences used until the store holds its own.
    pub fn defaults(&self, current_year: i32) -> Defaults {
        Defaults {
            year: self.calendar.year.unwrap_or(current_year),
            language: self.calendar.language,
            axis: self.calendar.axis,
        }
    }

    pub fn paper_spec(&self, axis: AxisOrientation) -> PaperSpec {
        PaperSpec {
            paper_size: self.export.paper,
            page_orientation: self
                .export
                .page_orientation
                .unwrap_or_else(|| PageOrientation::suggested_for(axis)),
            page_layout_mode: self.export.layout,
        }
    }

    pub fn holiday_source(&self) -> Box<dyn HolidaySource> {
        match &self.holidays.dir {
            Some(dir) => Box::new(HolidayDir::new(dir)),
            None => Box::new(BundledHolidays),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.tick_rate(), Duration::from_millis(DEFAULT_TICK_RATE_MS));
        assert_eq!(config.calendar.language, Language::Ko);
        assert_eq!(config.export.paper, PaperSize::A4);
        assert_eq!(config.export.output_dir, PathBuf::from("."));
        assert_eq!(config.defaults(2031).year, 2031);
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::from_toml(
            r#"
            tick_rate_ms = 50
            data_dir = "/tmp/almanac"
            [calendar]
            language = "en"
            axis = "vertical"
            year = 2025
            [export]
            paper = "letter"
            page_orientation = "landscape"
            layout = "two-page"
            output_dir = "/tmp/out"
            [holidays]
            dir = "/tmp/holidays"
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_rate(), Duration::from_millis(50));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/almanac"));
        let defaults = config.defaults(2031);
        assert_eq!(defaults.year, 2025);
        assert_eq!(defaults.language, Language::En);
        assert_eq!(defaults.axis, AxisOrientation::Vertical);

        let paper = config.paper_spec(AxisOrientation::Vertical);
        assert_eq!(paper.paper_size, PaperSize::Letter);
        assert_eq!(paper.page_orientation, PageOrientation::Landscape);
        assert_eq!(paper.page_layout_mode, PageLayoutMode::TwoPage);
        assert_eq!(config.holidays.dir, Some(PathBuf::from("/tmp/holidays")));
    }

    #[test]
    fn page_orientation_follows_axis_when_unset() {
        let config = Config::default();
        assert_eq!(
            config.paper_spec(AxisOrientation::Vertical).page_orientation,
            PageOrientation::Portrait
        );
        assert_eq!(
            config.paper_spec(AxisOrientation::Horizontal).page_orientation,
            PageOrientation::Landscape
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Config::from_toml("[export]\npaper = \"A1\"").is_err());
        assert!(Config::from_toml("[calendar]\nyear = 0").is_err());
        assert!(Config::from_toml("tick_rate_ms = 0").is_err());
        assert!(Config::from_toml("unknown = 1").is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[calendar]\nlanguage = \"en\"\n").unwrap();

        let config = load_suitable_config(Some(&path)).unwrap();
        assert_eq!(config.calendar.language, Language::En);

        let missing = dir.path().join("missing.toml");
        assert!(load_suitable_config(Some(&missing)).is_err());
    }
}

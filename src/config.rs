//! Typed settings for the load pipeline.
//!
//! The layout follows the settings file of the collection scripts: a
//! `global_config` table with the output file format and a `data_config` table
//! holding one entry per data series. Settings are plain values handed to
//! [`crate::OnsCarga`] calls, there is no process-wide state.
//!
//! ```toml
//! [global_config]
//! sep = ";"
//! decimal = ","
//!
//! [data_config.Carga]
//! endpoints = ["/cargaverificada", "/cargaprogramada"]
//! days_limit = 31
//! desirable_columns = ["cod_areacarga", "dat_referencia", "din_referenciautc", "val_cargaglobal", "val_cargaglobalprogramada"]
//! df_name = "carga.csv"
//! ```

use crate::types::endpoint::{Endpoint, REQUIRED_RAW_COLUMNS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://apicarga.ons.org.br/prd";

/// Name of the load series in the default settings.
pub const CARGA_SERIES: &str = "Carga";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("No series named '{0}' in data_config")]
    MissingSeries(String),

    #[error("Invalid settings for series '{series}'")]
    InvalidSeries {
        series: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("No endpoints configured")]
    NoEndpoints,

    #[error("Unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    #[error("Required column '{0}' is not in desirable_columns")]
    MissingKeyColumn(String),

    #[error("Field separator must be a single ASCII character, got '{0}'")]
    InvalidSeparator(String),

    #[error("Decimal mark must be '.' or ',', got '{0}'")]
    InvalidDecimal(String),

    #[error("Field separator '{0}' is also the decimal mark")]
    SeparatorIsDecimal(String),

    #[error("Unsupported output encoding '{0}', only UTF-8 is written")]
    UnsupportedEncoding(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub global_config: GlobalConfig,
    pub data_config: BTreeMap<String, SeriesConfig>,
}

/// Output format shared by every series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_sep")]
    pub sep: String,
    #[serde(default = "default_decimal")]
    pub decimal: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Digits written after the decimal mark.
    #[serde(default = "default_round_float")]
    pub round_float: usize,
}

/// Everything needed to fetch and store one data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Endpoint paths below `base_url`, queried in this order.
    pub endpoints: Vec<String>,
    /// Longest span, in days, of a single request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_limit: Option<u32>,
    /// Response fields kept in the normalized tables.
    pub desirable_columns: Vec<String>,
    /// File name of the saved table.
    pub df_name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout; the HTTP client default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_sep() -> String {
    ";".to_owned()
}

fn default_decimal() -> String {
    ".".to_owned()
}

fn default_encoding() -> String {
    "utf8".to_owned()
}

fn default_round_float() -> usize {
    3
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            sep: default_sep(),
            decimal: default_decimal(),
            encoding: default_encoding(),
            round_float: default_round_float(),
        }
    }
}

impl Default for SeriesConfig {
    /// The semi-hourly load series of the DESSEM deck.
    fn default() -> Self {
        Self {
            endpoints: vec!["/cargaverificada".to_owned(), "/cargaprogramada".to_owned()],
            days_limit: Some(31),
            desirable_columns: [
                "cod_areacarga",
                "din_atualizacao",
                "dat_referencia",
                "din_referenciautc",
                "val_cargaglobal",
                "val_cargaglobalprogramada",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            df_name: "carga_dessem_semihoraria.csv".to_owned(),
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_config: GlobalConfig::default(),
            data_config: BTreeMap::from([(CARGA_SERIES.to_owned(), SeriesConfig::default())]),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let settings: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn series(&self, name: &str) -> Result<&SeriesConfig, ConfigError> {
        self.data_config
            .get(name)
            .ok_or_else(|| ConfigError::MissingSeries(name.to_owned()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.global_config.validate()?;
        for (name, series) in &self.data_config {
            series
                .validate()
                .map_err(|e| ConfigError::InvalidSeries {
                    series: name.clone(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}

impl GlobalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.separator()?;
        self.decimal_comma()?;
        if self.sep == self.decimal {
            return Err(ConfigError::SeparatorIsDecimal(self.sep.clone()));
        }
        match self.encoding.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(()),
            _ => Err(ConfigError::UnsupportedEncoding(self.encoding.clone())),
        }
    }

    pub(crate) fn separator(&self) -> Result<u8, ConfigError> {
        match self.sep.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ConfigError::InvalidSeparator(self.sep.clone())),
        }
    }

    pub(crate) fn decimal_comma(&self) -> Result<bool, ConfigError> {
        match self.decimal.as_str() {
            "." => Ok(false),
            "," => Ok(true),
            _ => Err(ConfigError::InvalidDecimal(self.decimal.clone())),
        }
    }
}

impl SeriesConfig {
    /// Checks that the endpoints are known and that the merge key columns are
    /// allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve_endpoints()?;
        match REQUIRED_RAW_COLUMNS
            .into_iter()
            .find(|column| !self.allows(column))
        {
            Some(column) => Err(ConfigError::MissingKeyColumn(column.to_owned())),
            None => Ok(()),
        }
    }

    pub(crate) fn resolve_endpoints(&self) -> Result<Vec<Endpoint>, ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        self.endpoints
            .iter()
            .map(|path| {
                Endpoint::from_path(path).ok_or_else(|| ConfigError::UnknownEndpoint(path.clone()))
            })
            .collect()
    }

    pub(crate) fn allows(&self, column: &str) -> bool {
        self.desirable_columns.iter().any(|c| c == column)
    }

    pub(crate) fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

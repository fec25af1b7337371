//! Processor configuration, read from TOML.
//!
//! Every section has a default, so an empty file (or no file at all) yields a
//! Postgres source running [`DEFAULT_SEGMENT_QUERY`], a stdout report and a
//! placeholder response body.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming the config file when none is passed explicitly.
pub const CONFIG_PATH_ENV: &str = "AIRSPACE_CONFIG";

/// Route segments joined with their order, addresses and driving search.
pub const DEFAULT_SEGMENT_QUERY: &str = r#"
SELECT
    airspace_route.order_id::text AS order_id,
    airspace_orders.company_id::text AS company_id,
    airspace_start_addresses.city AS origin_city,
    airspace_end_addresses.city AS destination_city,
    airspace_orders.pick_up_time::text AS pick_up_time_local,
    airspace_orders.quoted_delivery_time::text AS delivery_time,
    airspace_start_addresses.time_zone AS start_time_zone,
    airspace_orders.created_at::text AS create_time,
    airspace_route.type AS route_type,
    airspace_end_addresses.time_zone AS end_time_zone,
    airspace_searches.miles::float8 AS miles,
    airspace_start_addresses.lat::float8 AS start_lat,
    airspace_start_addresses.lng::float8 AS start_lng,
    airspace_end_addresses.lat::float8 AS end_lat,
    airspace_end_addresses.lng::float8 AS end_lng
FROM airspace_route
FULL OUTER JOIN airspace_start_addresses
    ON airspace_route.start_address_id = airspace_start_addresses.id
FULL OUTER JOIN airspace_end_addresses
    ON airspace_route.end_address_id = airspace_end_addresses.id
FULL OUTER JOIN airspace_orders
    ON airspace_route.order_id = airspace_orders.id
FULL OUTER JOIN airspace_searches
    ON airspace_route.driving_search_id = airspace_searches.id
"#;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProcessorConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub report: ReportDestination,
    #[serde(default)]
    pub response: ResponseConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Csv {
        path: PathBuf,
    },
    Postgres {
        #[serde(default = "default_database_url_env")]
        database_url_env: String,
        #[serde(default = "default_query")]
        query: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Postgres {
            database_url_env: default_database_url_env(),
            query: default_query(),
        }
    }
}

impl SourceConfig {
    /// Resolves the Postgres connection URL from the configured variable.
    pub fn database_url(&self) -> Result<Option<String>> {
        match self {
            SourceConfig::Csv { .. } => Ok(None),
            SourceConfig::Postgres {
                database_url_env, ..
            } => env::var(database_url_env)
                .map(Some)
                .with_context(|| format!("{database_url_env} must be set for the postgres source")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ReportDestination {
    #[default]
    Stdout,
    Json {
        path: PathBuf,
    },
    Csv {
        path: PathBuf,
    },
    Parquet {
        path: PathBuf,
    },
    #[serde(rename = "none")]
    Discard,
}

impl ReportDestination {
    pub fn describe(&self) -> &'static str {
        match self {
            ReportDestination::Stdout => "stdout",
            ReportDestination::Json { .. } => "json",
            ReportDestination::Csv { .. } => "csv",
            ReportDestination::Parquet { .. } => "parquet",
            ReportDestination::Discard => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseBody {
    /// Answer with the configured placeholder string.
    #[default]
    Placeholder,
    /// Answer with the JSON-encoded report.
    Report,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResponseConfig {
    #[serde(default)]
    pub body: ResponseBody,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            body: ResponseBody::default(),
            placeholder: default_placeholder(),
        }
    }
}

impl ProcessorConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("failed to parse processor config TOML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` if given, else the file named by `AIRSPACE_CONFIG`, else
    /// the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }
}

fn default_database_url_env() -> String {
    "DATABASE_URL".to_string()
}

fn default_query() -> String {
    DEFAULT_SEGMENT_QUERY.to_string()
}

fn default_placeholder() -> String {
    "ok".to_string()
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const IMD_CSV_URL: &str = "https://assets.publishing.service.gov.uk/media/5dc407b440f0b6379a7acc8d/File_7_-_All_IoD2019_Scores__Ranks__Deciles_and_Population_Denominators_3.csv";
const ONS_FEATURE_SERVER: &str = "https://services1.arcgis.com/ESMARspQHYMw9BZ9/arcgis/rest/services/LSOA_2011_Boundaries_Super_Generalised_Clipped_BSC_EW_V4/FeatureServer/0/query";

/// Coordinates are serialized as f64, which carries ~15-17 significant digits.
const MAX_PRECISION: u32 = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fetch.batch_size must be at least 1")]
    ZeroBatchSize,
    #[error("filter.regions is empty; no rows could ever match")]
    NoRegions,
    #[error("output.{field} = {value} exceeds the maximum of {max} decimal places", max = MAX_PRECISION)]
    PrecisionTooLarge { field: &'static str, value: u32 },
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub filter: FilterConfig,
    pub columns: ColumnsConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub index_csv_url: String,
    pub feature_server_url: String,
    pub user_agent: String,
    pub csv_timeout_secs: u64,
    pub boundary_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            index_csv_url: IMD_CSV_URL.to_string(),
            feature_server_url: ONS_FEATURE_SERVER.to_string(),
            user_agent: "propmap-builder/1.0".to_string(),
            csv_timeout_secs: 60,
            boundary_timeout_secs: 120,
        }
    }
}

impl SourcesConfig {
    pub fn csv_timeout(&self) -> Duration {
        Duration::from_secs(self.csv_timeout_secs)
    }

    pub fn boundary_timeout(&self) -> Duration {
        Duration::from_secs(self.boundary_timeout_secs)
    }
}

/// Region (local authority) names whose rows are kept. Matched exactly.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FilterConfig {
    pub regions: BTreeSet<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let regions = [
            "Hammersmith and Fulham",
            "Richmond upon Thames",
            "Wandsworth",
            "Hounslow",
            "Kensington and Chelsea",
        ];
        Self {
            regions: regions.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl FilterConfig {
    pub fn contains(&self, region: &str) -> bool {
        self.regions.contains(region)
    }
}

/// CSV header names (matched after trimming and lower-casing) and the
/// feature service's property names.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ColumnsConfig {
    pub region: String,
    pub area_code: String,
    pub area_name: String,
    pub score: String,
    pub decile: String,
    pub code_field: String,
    pub name_field: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            region: "Local Authority District name (2019)".to_string(),
            area_code: "LSOA code (2011)".to_string(),
            area_name: "LSOA name (2011)".to_string(),
            score: "Index of Multiple Deprivation (IMD) Score".to_string(),
            decile: "Index of Multiple Deprivation (IMD) Decile (where 1 is most deprived 10% of LSOAs)"
                .to_string(),
            code_field: "LSOA11CD".to_string(),
            name_field: "LSOA11NM".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FetchConfig {
    pub batch_size: usize,
    pub out_sr: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            out_sr: 4326,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub precision: u32,
    pub score_precision: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("app/data/west-london-imd.geojson"),
            precision: 5,
            score_precision: 2,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.filter.regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        for (field, value) in [
            ("precision", self.output.precision),
            ("score_precision", self.output.score_precision),
        ] {
            if value > MAX_PRECISION {
                return Err(ConfigError::PrecisionTooLarge { field, value });
            }
        }
        Ok(())
    }
}

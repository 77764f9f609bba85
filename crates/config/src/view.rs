// Table view declarations
// Loaded from ~/.config/tabview/views/<name>.toml

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tabview_engine::{AdditionalFilter, Bucket, ColumnFilterSpec, FilterConfig, Matcher, DEFAULT_PAGE_SIZE};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Declarative description of one filtered table view.
///
/// ```toml
/// page_size = 25
/// search_fields = ["name", "phone", "customer.email"]
/// status_field = "status"
///
/// [[additional_filters]]
/// key = "orders"
/// field = "totalOrders"
/// matcher = { kind = "buckets", buckets = [{ name = "high", min = 20 }] }
///
/// [[column_filters]]
/// field = "status"
/// dual = true
/// options = ["Active", "VIP", "New", "Inactive"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub search_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_field: Option<String>,
    #[serde(default)]
    pub additional_filters: Vec<AdditionalFilterConfig>,
    #[serde(default)]
    pub column_filters: Vec<ColumnFilterSpec>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_fields: Vec::new(),
            status_field: None,
            additional_filters: Vec::new(),
            column_filters: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Additional filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalFilterConfig {
    pub key: String,
    pub field: String,
    #[serde(default)]
    pub matcher: MatcherConfig,
}

/// Matchers expressible in a config file.
///
/// Custom predicates can only be attached in code, on the `FilterConfig`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherConfig {
    #[default]
    Equals,
    Buckets { buckets: Vec<Bucket> },
}

impl From<&MatcherConfig> for Matcher {
    fn from(config: &MatcherConfig) -> Self {
        match config {
            MatcherConfig::Equals => Matcher::Equals,
            MatcherConfig::Buckets { buckets } => Matcher::Buckets(buckets.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ViewConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: ViewConfig = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Read and validate a view file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    /// Write the view file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |e: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_toml()?).map_err(io_err)
    }

    /// Directory holding named views: `<config dir>/tabview/views`
    pub fn views_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tabview").join("views"))
    }

    /// Load `<views dir>/<name>.toml`
    pub fn load_named(name: &str) -> Result<Self, ConfigError> {
        let dir = Self::views_dir().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from_dir(&dir, name)
    }

    pub fn load_from_dir(dir: &Path, name: &str) -> Result<Self, ConfigError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ConfigError::Validation(format!("invalid view name '{name}'")));
        }
        Self::load(&dir.join(format!("{name}.toml")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Validation("page_size must be greater than zero".into()));
        }

        for field in &self.search_fields {
            check_field("search_fields", field)?;
        }
        if let Some(field) = &self.status_field {
            check_field("status_field", field)?;
        }

        let mut keys = HashSet::new();
        for filter in &self.additional_filters {
            check_field("additional_filters.key", &filter.key)?;
            check_field("additional_filters.field", &filter.field)?;
            if !keys.insert(filter.key.as_str()) {
                return Err(ConfigError::Duplicate {
                    section: "additional_filters",
                    name: filter.key.clone(),
                });
            }
            if let MatcherConfig::Buckets { buckets } = &filter.matcher {
                validate_buckets(&filter.key, buckets)?;
            }
        }

        let mut fields = HashSet::new();
        for column in &self.column_filters {
            check_field("column_filters.field", &column.field)?;
            if !fields.insert(column.field.as_str()) {
                return Err(ConfigError::Duplicate {
                    section: "column_filters",
                    name: column.field.clone(),
                });
            }
            if column.dual && column.options.is_empty() {
                log::warn!(
                    "column filter '{}' is dual but declares no options; it will only filter by substring",
                    column.field
                );
            }
        }

        Ok(())
    }

    /// Engine configuration for this view
    pub fn to_filter_config(&self) -> FilterConfig {
        let mut config = FilterConfig::new()
            .search_fields(self.search_fields.iter().cloned())
            .page_size(self.page_size);
        if let Some(status) = &self.status_field {
            config = config.status_field(status.clone());
        }
        for filter in &self.additional_filters {
            config = config.additional_filter(
                AdditionalFilter::new(filter.key.clone(), filter.field.clone()).with_matcher((&filter.matcher).into()),
            );
        }
        for column in &self.column_filters {
            config = config.column_filter(column.clone());
        }
        config
    }
}

fn check_field(section: &str, field: &str) -> Result<(), ConfigError> {
    if field.trim().is_empty() || field.split('.').any(str::is_empty) {
        return Err(ConfigError::Validation(format!("{section}: invalid field path '{field}'")));
    }
    Ok(())
}

fn validate_buckets(key: &str, buckets: &[Bucket]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    for bucket in buckets {
        if !names.insert(bucket.name.as_str()) {
            return Err(ConfigError::Duplicate {
                section: "buckets",
                name: format!("{key}.{}", bucket.name),
            });
        }
        if let (Some(min), Some(max)) = (bucket.min, bucket.max) {
            if min >= max {
                return Err(ConfigError::Validation(format!(
                    "filter '{key}': bucket '{}' has min {min} >= max {max}",
                    bucket.name
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

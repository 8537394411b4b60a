//! Configuration: the products document (JSON) and run settings (TOML,
//! environment variables, CLI overrides).

use crate::craigslist::client::DEFAULT_SITE;
use crate::craigslist::models::SearchQuery;
use crate::error::ConfigError;
use crate::evaluator::gemini::DEFAULT_MODEL;
use crate::evaluator::PromptProfile;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default location of the products document.
pub const DEFAULT_PRODUCTS_PATH: &str = "products.json";

/// One entry of the products document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    pub search_term: String,
    #[serde(default)]
    pub criteria: Option<String>,
}

impl From<ProductConfig> for SearchQuery {
    fn from(product: ProductConfig) -> Self {
        SearchQuery::new(product.name, product.search_term, product.criteria)
    }
}

/// The products document: `{ "products": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductsFile {
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

impl ProductsFile {
    /// Loads the products document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading products from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Builds search queries, optionally keeping only products whose name
    /// contains `filter` (case-insensitive).
    pub fn queries(self, filter: Option<&str>) -> Result<Vec<SearchQuery>, ConfigError> {
        let queries: Vec<SearchQuery> = match filter {
            Some(filter) => {
                let needle = filter.to_lowercase();
                let selected: Vec<SearchQuery> = self
                    .products
                    .into_iter()
                    .filter(|p| p.name.to_lowercase().contains(&needle))
                    .map(SearchQuery::from)
                    .collect();
                if selected.is_empty() {
                    return Err(ConfigError::NoMatchingProducts(filter.to_string()));
                }
                selected
            }
            None => self.products.into_iter().map(SearchQuery::from).collect(),
        };

        Ok(queries)
    }
}

/// Run settings with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Craigslist site to search
    #[serde(default = "default_site")]
    pub site: String,

    /// Delay between listing fetches in seconds
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,

    /// Random jitter added to the listing fetch delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Gemini model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Evaluation prompt profile
    #[serde(default)]
    pub profile: PromptProfile,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Email a digest of matches at the end of the run
    #[serde(default)]
    pub notify: bool,
}

fn default_site() -> String {
    DEFAULT_SITE.to_string()
}

fn default_delay_secs() -> f64 {
    1.0
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site: default_site(),
            delay_secs: default_delay_secs(),
            delay_jitter_ms: 0,
            proxy: None,
            model: default_model(),
            profile: PromptProfile::default(),
            format: OutputFormat::default(),
            notify: false,
        }
    }
}

impl Settings {
    /// Creates default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading settings from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads settings with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local = Path::new("cl-scout.toml");
        if local.exists() {
            debug!("Found cl-scout.toml in current directory");
            return Self::from_file(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg = config_dir.join("cl-scout").join("config.toml");
            if xdg.exists() {
                debug!("Found settings in XDG config directory");
                return Self::from_file(xdg);
            }
        }

        debug!("No settings file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparsable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(site) = std::env::var("CL_SCOUT_SITE") {
            self.site = site;
        }

        if let Ok(delay) = std::env::var("CL_SCOUT_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_secs = d;
            }
        }

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                self.model = model;
            }
        }

        self
    }

    /// Rejects settings that cannot drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Duration::try_from_secs_f64(self.delay_secs).is_err() {
            return Err(ConfigError::InvalidSettings(format!(
                "delay must be a non-negative number of seconds, got {}",
                self.delay_secs
            )));
        }

        url::Url::parse(&self.site)
            .map_err(|e| ConfigError::InvalidSettings(format!("site {}: {}", self.site, e)))?;

        Ok(())
    }
}

/// Reads a required credential from the environment.
pub fn credential(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingCredential(name))
}

/// Output format for the final report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: table, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn products_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();
        file
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.site, "https://sfbay.craigslist.org");
        assert_eq!(settings.delay_secs, 1.0);
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.profile, PromptProfile::Strict);
        assert_eq!(settings.format, OutputFormat::Table);
        assert!(!settings.notify);
    }

    #[test]
    fn test_products_from_file() {
        let file = products_file(
            r#"{"products": [
                {"name": "Fujifilm X100V", "search_term": "x100v", "criteria": "X100V only"},
                {"name": "Ricoh GR III", "search_term": "ricoh gr"}
            ]}"#,
        );

        let queries = ProductsFile::from_file(file.path()).unwrap().queries(None).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].criteria, "X100V only");
        assert_eq!(queries[1].criteria, "Must be a Ricoh GR III");
        assert_eq!(queries[1].search_term, "ricoh gr");
    }

    #[test]
    fn test_products_filter_case_insensitive() {
        let file = products_file(
            r#"{"products": [
                {"name": "Fujifilm X100V", "search_term": "x100v"},
                {"name": "Ricoh GR III", "search_term": "ricoh gr"}
            ]}"#,
        );

        let queries = ProductsFile::from_file(file.path()).unwrap().queries(Some("RICOH")).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].product_name, "Ricoh GR III");
    }

    #[test]
    fn test_products_filter_no_match() {
        let file = products_file(r#"{"products": [{"name": "A", "search_term": "a"}]}"#);

        let err = ProductsFile::from_file(file.path()).unwrap().queries(Some("leica")).unwrap_err();
        assert!(matches!(err, ConfigError::NoMatchingProducts(_)));
        assert_eq!(err.to_string(), "No products matching 'leica' found in configuration.");
    }

    #[test]
    fn test_products_missing_key_is_empty() {
        let file = products_file("{}");
        let queries = ProductsFile::from_file(file.path()).unwrap().queries(None).unwrap();
        assert!(queries.is_empty());
    }

    #[test]
    fn test_products_not_found() {
        let err = ProductsFile::from_file("/nonexistent/products.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_products_invalid_json() {
        let file = products_file(r#"{"products": [{"name": "A"}]}"#);
        let err = ProductsFile::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        assert!(err.to_string().contains("search_term"));
    }

    #[test]
    fn test_settings_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            site = "https://portland.craigslist.org"
            delay_secs = 2.5
            profile = "lenient"
            format = "json"
            notify = true
            "#
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.site, "https://portland.craigslist.org");
        assert_eq!(settings.delay_secs, 2.5);
        assert_eq!(settings.profile, PromptProfile::Lenient);
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(settings.notify);
        assert_eq!(settings.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_settings_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_settings_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"model = "gemini-2.5-pro""#).unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_settings_with_env() {
        let orig_site = std::env::var("CL_SCOUT_SITE").ok();
        let orig_delay = std::env::var("CL_SCOUT_DELAY").ok();

        std::env::set_var("CL_SCOUT_SITE", "https://seattle.craigslist.org");
        std::env::set_var("CL_SCOUT_DELAY", "not_a_number");

        let settings = Settings::new().with_env();
        assert_eq!(settings.site, "https://seattle.craigslist.org");
        assert_eq!(settings.delay_secs, 1.0);

        match orig_site {
            Some(v) => std::env::set_var("CL_SCOUT_SITE", v),
            None => std::env::remove_var("CL_SCOUT_SITE"),
        }
        match orig_delay {
            Some(v) => std::env::set_var("CL_SCOUT_DELAY", v),
            None => std::env::remove_var("CL_SCOUT_DELAY"),
        }
    }

    #[test]
    fn test_settings_validate() {
        assert!(Settings::default().validate().is_ok());

        let settings = Settings { delay_secs: -1.0, ..Settings::default() };
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidSettings(_))));

        let settings = Settings { delay_secs: 1e30, ..Settings::default() };
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidSettings(_))));

        let settings = Settings { delay_secs: 0.0, ..Settings::default() };
        assert!(settings.validate().is_ok());

        let settings = Settings { site: "not a url".to_string(), ..Settings::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_credential_missing() {
        let err = credential("CL_SCOUT_TEST_UNSET_CREDENTIAL").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("CL_SCOUT_TEST_UNSET_CREDENTIAL")));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}

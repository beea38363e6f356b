use crate::core::assistant::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECONDS};
use crate::core::similarity::DEFAULT_THRESHOLD;
use crate::domain::ports::{AssistantSettings, ConfigProvider};
use crate::utils::error::{MediBotError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CATALOG_PATH: &str = "data/medical_services.csv";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CATALOG_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    pub system_prompt: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            system_prompt: None,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MediBotError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MediBotError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MediBotError::ConfigError {
            message: e.to_string(),
        })?;

        // unset variables keep their placeholder so validation can name them
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("catalog.path", &self.catalog.path)?;
        validation::validate_range(
            "resolver.similarity_threshold",
            self.resolver.similarity_threshold,
            0.0,
            1.0,
        )?;

        if self.assistant.enabled {
            validation::validate_url("assistant.endpoint", &self.assistant.endpoint)?;
            validation::validate_non_empty_string("assistant.model", &self.assistant.model)?;
            validation::validate_secret("assistant.api_key", self.assistant.api_key.as_deref())?;
            if self.assistant.timeout_seconds == 0 {
                return Err(MediBotError::InvalidConfigValueError {
                    field: "assistant.timeout_seconds".to_string(),
                    value: "0".to_string(),
                    reason: "Timeout must be at least 1 second".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl AssistantSettings for AssistantConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_path(&self) -> &str {
        &self.catalog.path
    }

    fn similarity_threshold(&self) -> f64 {
        self.resolver.similarity_threshold
    }

    fn assistant_enabled(&self) -> bool {
        self.assistant.enabled
    }

    fn assistant(&self) -> &dyn AssistantSettings {
        &self.assistant
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[catalog]
path = "centers.csv"

[resolver]
similarity_threshold = 0.75

[assistant]
enabled = true
endpoint = "https://llm.example.com"
model = "gemini-1.5-pro"
api_key = "secret"
timeout_seconds = 10
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.catalog_path(), "centers.csv");
        assert_eq!(config.similarity_threshold(), 0.75);
        assert!(config.assistant_enabled());
        assert_eq!(config.assistant().model(), "gemini-1.5-pro");
        assert_eq!(config.assistant().timeout_seconds(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.catalog_path(), DEFAULT_CATALOG_PATH);
        assert_eq!(config.similarity_threshold(), DEFAULT_THRESHOLD);
        assert!(!config.assistant_enabled());
        assert_eq!(config.assistant().endpoint(), DEFAULT_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MEDIBOT_TEST_API_KEY", "from-env");

        let toml_content = r#"
[assistant]
enabled = true
api_key = "${MEDIBOT_TEST_API_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.assistant().api_key(), Some("from-env"));

        std::env::remove_var("MEDIBOT_TEST_API_KEY");
    }

    #[test]
    fn test_unset_api_key_variable_fails_validation() {
        let toml_content = r#"
[assistant]
enabled = true
api_key = "${MEDIBOT_TEST_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, MediBotError::MissingConfigError { .. }));
    }

    #[test]
    fn test_disabled_assistant_needs_no_key() {
        let config = TomlConfig::from_toml_str("[assistant]\nenabled = false\n").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range_fails_validation() {
        let config = TomlConfig::from_toml_str("[resolver]\nsimilarity_threshold = 1.2\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[catalog\npath = 1").unwrap_err();
        assert!(matches!(err, MediBotError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[catalog]\npath = \"file-test.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.catalog.path, "file-test.csv");
    }
}

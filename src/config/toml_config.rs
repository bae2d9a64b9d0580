use crate::config::ClientConfig;
use crate::utils::error::{GateError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// 設定檔內容，所有欄位皆可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub upstream: Option<UpstreamConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${HOLIDAY_API_URL})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.upstream.as_ref()?.base_url.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.upstream
            .as_ref()?
            .timeout_ms
            .map(Duration::from_millis)
    }

    pub fn max_retries(&self) -> Option<u32> {
        self.upstream.as_ref()?.max_retries
    }

    /// 以設定檔覆寫預設值後產生 `ClientConfig`
    pub fn to_client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self
                .base_url()
                .map(str::to_string)
                .unwrap_or(defaults.base_url),
            timeout: self.timeout().unwrap_or(defaults.timeout),
            max_retries: self.max_retries().unwrap_or(defaults.max_retries),
        }
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        self.to_client_config()
            .validate()
            .map_err(|e| GateError::ConfigError {
                message: format!("config file: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_upstream_section() {
        let toml_content = r#"
[upstream]
base_url = "https://holidays.example.com/PublicHolidays"
timeout_ms = 800
max_retries = 4
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();
        let client = config.to_client_config();

        assert_eq!(client.base_url, "https://holidays.example.com/PublicHolidays");
        assert_eq!(client.timeout, Duration::from_millis(800));
        assert_eq!(client.max_retries, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_values_fall_back_to_defaults() {
        let config = FileConfig::from_toml_str("[upstream]\nmax_retries = 0\n").unwrap();
        let client = config.to_client_config();

        assert_eq!(client.base_url, crate::config::DEFAULT_BASE_URL);
        assert_eq!(client.timeout, Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS));
        assert_eq!(client.max_retries, 0);

        let empty = FileConfig::from_toml_str("").unwrap();
        assert_eq!(empty.to_client_config(), ClientConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HOLIDAY_GATE_TEST_BASE_URL", "https://test.holidays.com");

        let toml_content = r#"
[upstream]
base_url = "${HOLIDAY_GATE_TEST_BASE_URL}/PublicHolidays"
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.base_url(),
            Some("https://test.holidays.com/PublicHolidays")
        );

        std::env::remove_var("HOLIDAY_GATE_TEST_BASE_URL");
    }

    #[test]
    fn test_unknown_env_var_is_left_intact() {
        let toml_content = r#"
[upstream]
base_url = "${HOLIDAY_GATE_SURELY_UNSET_VAR}"
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_url(), Some("${HOLIDAY_GATE_SURELY_UNSET_VAR}"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = FileConfig::from_toml_str("[upstream\nbase_url = 1");
        assert!(matches!(result, Err(GateError::TomlError(_))));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[upstream]\ntimeout_ms = 250\n")
            .unwrap();

        let config = FileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = FileConfig::from_file("/definitely/not/here/holiday-gate.toml");
        assert!(matches!(result, Err(GateError::IoError(_))));
    }
}

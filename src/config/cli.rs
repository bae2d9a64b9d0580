use crate::config::toml_config::FileConfig;
use crate::config::ClientConfig;
use crate::utils::error::{GateError, Result};
use crate::utils::validation::{validate_country_code, validate_non_empty_string, Validate};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// 接受的輸入日期格式，依序嘗試
const INPUT_DATE_FORMATS: [&str; 2] = ["%Y/%m/%d", "%Y-%m-%d"];
const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "holiday-gate")]
#[command(about = "Check whether a date is free of public holidays across countries")]
pub struct CliArgs {
    #[arg(long, help = "Date to check, YYYY/MM/DD")]
    pub date: String,

    #[arg(long, value_delimiter = ',', required = true, help = "Comma-separated ISO codes, e.g. ES,FR,IT")]
    pub countries: Vec<String>,

    #[arg(long, help = "Holidays API base URL")]
    pub base: Option<String>,

    #[arg(long, help = "Per-request timeout in milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(long, help = "Retries per country")]
    pub retries: Option<u32>,

    #[arg(long, help = "Optional TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

/// 驗證並正規化後的輸入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArgs {
    pub date: String,
    pub countries: Vec<String>,
    pub client: ClientConfig,
}

impl CliArgs {
    /// 合併設定來源：命令列 > 設定檔 > 預設值
    pub fn resolve(&self) -> Result<ResolvedArgs> {
        let file_config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading config file: {}", path.display());
                FileConfig::from_file(path)?
            }
            None => FileConfig::default(),
        };
        self.resolve_with(&file_config)
    }

    pub fn resolve_with(&self, file_config: &FileConfig) -> Result<ResolvedArgs> {
        let date = normalize_date(&self.date)?;
        let countries = normalize_countries(&self.countries)?;

        let mut client = file_config.to_client_config();
        if let Some(base) = &self.base {
            client.base_url = base.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            client.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(retries) = self.retries {
            client.max_retries = retries;
        }
        client.validate()?;

        Ok(ResolvedArgs {
            date,
            countries,
            client,
        })
    }
}

/// `YYYY/MM/DD` (或 `YYYY-MM-DD`) 轉成 `YYYY-MM-DD`，並確認是真實存在的日期
pub fn normalize_date(input: &str) -> Result<String> {
    validate_non_empty_string("date", input)?;
    let trimmed = input.trim();

    INPUT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format(OUTPUT_DATE_FORMAT).to_string())
        .ok_or_else(|| GateError::InvalidConfigValueError {
            field: "date".to_string(),
            value: input.to_string(),
            reason: "expected a calendar date in YYYY/MM/DD format".to_string(),
        })
}

/// 去空白、轉大寫、丟棄空項目；保留順序與重複項
pub fn normalize_countries(raw: &[String]) -> Result<Vec<String>> {
    let codes: Vec<String> = raw
        .iter()
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect();

    if codes.is_empty() {
        return Err(GateError::MissingConfigError {
            field: "countries".to_string(),
        });
    }
    for code in &codes {
        validate_country_code("countries", code)?;
    }
    Ok(codes)
}

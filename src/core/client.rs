use crate::config::ClientConfig;
use crate::domain::model::{contains_public_holiday, Holiday, LookupOutcome, LookupRequest};
use crate::domain::ports::HolidayLookup;
use crate::utils::error::LookupError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const BACKOFF_BASE: Duration = Duration::from_millis(150);
pub const BACKOFF_CAP: Duration = Duration::from_secs(2);

const LANGUAGE_ISO_CODE: &str = "EN";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// 第 `attempt` 次 (從 0 起算) 失敗後的等待時間：`min(150ms * 2^attempt, 2s)`
pub fn backoff_delay(attempt: u32) -> Duration {
    2u32.checked_pow(attempt)
        .and_then(|factor| BACKOFF_BASE.checked_mul(factor))
        .map_or(BACKOFF_CAP, |delay| delay.min(BACKOFF_CAP))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Success,
    Retryable,
    Terminal,
}

pub(crate) fn classify_status(status: StatusCode) -> StatusClass {
    if status == StatusCode::OK {
        StatusClass::Success
    } else if status.as_u16() >= 500 {
        StatusClass::Retryable
    } else {
        StatusClass::Terminal
    }
}

/// 單次嘗試的結果；失敗是否重試由 `LookupError::is_retryable` 決定
#[derive(Debug)]
enum Attempt {
    Hit,
    NoHit,
    Failed(LookupError),
}

/// 對上游假日 API 查詢單一國家，含逾時、重試與退避
#[derive(Debug, Clone)]
pub struct HolidayClient {
    config: ClientConfig,
    client: Client,
}

impl HolidayClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, Client::new())
    }

    /// 注入自訂的 `reqwest::Client` (測試或共用連線池時使用)
    pub fn with_http_client(config: ClientConfig, client: Client) -> Self {
        Self { config, client }
    }

    // 回應在此函式內被讀完或丟棄，不會留到下一次嘗試
    async fn attempt(&self, request: &LookupRequest) -> Attempt {
        let sent = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("countryIsoCode", request.country_code.as_str()),
                ("languageIsoCode", LANGUAGE_ISO_CODE),
                ("validFrom", request.date.as_str()),
                ("validTo", request.date.as_str()),
            ])
            .timeout(self.config.timeout)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => return Attempt::Failed(self.classify_request_error(e)),
        };

        let status = response.status();
        tracing::debug!(
            "📡 {}: API response status: {}",
            request.country_code,
            status
        );

        match classify_status(status) {
            StatusClass::Retryable => Attempt::Failed(LookupError::Server {
                status: status.as_u16(),
            }),
            StatusClass::Terminal => {
                let body = response.text().await.unwrap_or_default();
                Attempt::Failed(LookupError::Client {
                    status: status.as_u16(),
                    body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                })
            }
            StatusClass::Success => {
                let bytes = match response.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => return Attempt::Failed(self.classify_request_error(e)),
                };
                match serde_json::from_slice::<Vec<Holiday>>(&bytes) {
                    Ok(holidays) if contains_public_holiday(&holidays) => Attempt::Hit,
                    Ok(_) => Attempt::NoHit,
                    Err(e) => Attempt::Failed(LookupError::Decode(e.to_string())),
                }
            }
        }
    }

    fn classify_request_error(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(self.config.timeout)
        } else if err.is_builder() {
            LookupError::InvalidRequest(err.to_string())
        } else {
            LookupError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl HolidayLookup for HolidayClient {
    /// 最多嘗試 `max_retries + 1` 次；取消訊號會中斷進行中的請求與退避等待
    async fn check(&self, request: &LookupRequest, cancel: &CancellationToken) -> LookupOutcome {
        let max_attempts = self.config.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => Attempt::Failed(LookupError::Cancelled),
                step = self.attempt(request) => step,
            };

            let err = match step {
                Attempt::Hit => {
                    tracing::debug!("🎉 {}: public holiday on {}", request.country_code, request.date);
                    return LookupOutcome::Hit;
                }
                Attempt::NoHit => return LookupOutcome::NoHit,
                Attempt::Failed(err) if !err.is_retryable() => {
                    tracing::warn!("❌ {}: lookup failed: {}", request.country_code, err);
                    return LookupOutcome::Failure(err);
                }
                Attempt::Failed(err) => err,
            };

            attempt += 1;
            if attempt >= max_attempts {
                tracing::warn!(
                    "❌ {}: giving up after {} attempts: {}",
                    request.country_code,
                    attempt,
                    err
                );
                return LookupOutcome::Failure(err);
            }

            let delay = backoff_delay(attempt - 1);
            tracing::warn!(
                "🔁 {}: attempt {}/{} failed ({}), retrying in {:?}",
                request.country_code,
                attempt,
                max_attempts,
                err,
                delay
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return LookupOutcome::Failure(LookupError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

/// 以給定設定查詢單一國家
pub async fn check(
    country_code: &str,
    date: &str,
    config: ClientConfig,
    cancel: &CancellationToken,
) -> LookupOutcome {
    let client = HolidayClient::new(config);
    client
        .check(&LookupRequest::new(country_code, date), cancel)
        .await
}

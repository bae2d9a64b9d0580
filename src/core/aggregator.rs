use crate::config::ClientConfig;
use crate::core::client::HolidayClient;
use crate::domain::model::{LookupOutcome, LookupRequest, SafetyReport};
use crate::domain::ports::HolidayLookup;
use crate::utils::error::LookupError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Level;

/// 對每個國家並行查詢並彙整成單一判定
pub struct SafetyAggregator<L: HolidayLookup + 'static> {
    lookup: Arc<L>,
}

impl<L: HolidayLookup + 'static> Clone for SafetyAggregator<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<L: HolidayLookup + 'static> SafetyAggregator<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }

    pub fn from_shared(lookup: Arc<L>) -> Self {
        Self { lookup }
    }

    /// 每個輸入項目各開一個 task (不去重)，等待全部完成後才回傳
    pub async fn check_safe(
        &self,
        date: &str,
        countries: &[String],
        cancel: &CancellationToken,
    ) -> SafetyReport {
        if countries.is_empty() {
            return SafetyReport::default();
        }

        tracing::info!(
            "🚀 Checking {} for {} countries",
            date,
            countries.len()
        );
        if tracing::enabled!(Level::DEBUG) {
            let unique: HashSet<&String> = countries.iter().collect();
            if unique.len() < countries.len() {
                tracing::debug!(
                    "Duplicate country codes in input, {} lookups for {} distinct codes",
                    countries.len(),
                    unique.len()
                );
            }
        }

        let (tx, mut rx) = mpsc::channel::<(String, LookupOutcome)>(countries.len());
        let mut handles = Vec::with_capacity(countries.len());

        for country in countries {
            let lookup = Arc::clone(&self.lookup);
            let request = LookupRequest::new(country.clone(), date);
            let cancel = cancel.clone();
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                let outcome = lookup.check(&request, &cancel).await;
                // 容量等於國家數，send 不會阻塞；receiver 只在全部 join 後才被讀取
                let _ = tx.send((request.country_code, outcome)).await;
            });
            handles.push((country.clone(), handle));
        }
        drop(tx);

        let mut report = SafetyReport::default();
        for (country, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!("💥 {}: lookup task failed: {}", country, e);
                report.record(country, LookupOutcome::Failure(LookupError::Task(e.to_string())));
            }
        }

        while let Some((country, outcome)) = rx.recv().await {
            report.record(country, outcome);
        }

        tracing::info!(
            "📊 {}: safe={}, hits={:?}, errors={}",
            date,
            report.safe(),
            report.hit_countries(),
            report.errors().len()
        );
        report
    }
}

/// 以 HTTP 用戶端執行一次完整彙整
pub async fn check_safe(
    date: &str,
    countries: &[String],
    config: ClientConfig,
    cancel: &CancellationToken,
) -> SafetyReport {
    SafetyAggregator::new(HolidayClient::new(config))
        .check_safe(date, countries, cancel)
        .await
}

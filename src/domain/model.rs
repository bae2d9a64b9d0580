use crate::utils::error::LookupError;
use serde::Deserialize;
use std::collections::HashMap;

/// 判定為國定假日的 `type` 值
pub const PUBLIC_HOLIDAY_TYPE: &str = "Public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub country_code: String,
    /// ISO 日期 `YYYY-MM-DD`
    pub date: String,
}

impl LookupRequest {
    pub fn new(country_code: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            date: date.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    NoHit,
    Failure(LookupError),
}

/// 上游回傳的假日記錄，只讀取 `type`；缺少或為 null 時視為非國定假日
#[derive(Debug, Clone, Deserialize)]
pub struct Holiday {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl Holiday {
    pub fn is_public(&self) -> bool {
        self.kind.as_deref() == Some(PUBLIC_HOLIDAY_TYPE)
    }
}

pub fn contains_public_holiday(holidays: &[Holiday]) -> bool {
    holidays.iter().any(Holiday::is_public)
}

/// 彙整結果。`safe` 永遠等於「沒有命中且沒有錯誤」。
#[derive(Debug, Clone)]
pub struct SafetyReport {
    safe: bool,
    hit_countries: Vec<String>,
    errors: HashMap<String, LookupError>,
}

impl SafetyReport {
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (String, LookupOutcome)>,
    {
        let mut report = Self::default();
        for (country, outcome) in outcomes {
            report.record(country, outcome);
        }
        report
    }

    pub(crate) fn record(&mut self, country: String, outcome: LookupOutcome) {
        match outcome {
            LookupOutcome::Hit => self.hit_countries.push(country),
            LookupOutcome::Failure(err) => {
                // 同一國家重複出現時，後寫入的錯誤覆蓋前者
                self.errors.insert(country, err);
            }
            LookupOutcome::NoHit => {}
        }
        self.safe = self.hit_countries.is_empty() && self.errors.is_empty();
    }

    pub fn safe(&self) -> bool {
        self.safe
    }

    pub fn hit_countries(&self) -> &[String] {
        &self.hit_countries
    }

    pub fn errors(&self) -> &HashMap<String, LookupError> {
        &self.errors
    }
}

impl Default for SafetyReport {
    fn default() -> Self {
        Self {
            safe: true,
            hit_countries: Vec::new(),
            errors: HashMap::new(),
        }
    }
}

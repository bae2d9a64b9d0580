use crate::domain::model::SafetyReport;
use serde::Serialize;
use std::collections::BTreeMap;

/// 輸出用的報告，錯誤轉成文字並依國家排序
#[derive(Debug, Serialize)]
pub struct ReportView<'a> {
    pub date: &'a str,
    pub safe: bool,
    pub hit_countries: Vec<&'a str>,
    pub errors: BTreeMap<&'a str, String>,
}

impl<'a> ReportView<'a> {
    pub fn new(date: &'a str, report: &'a SafetyReport) -> Self {
        let mut hit_countries: Vec<&str> = report.hit_countries().iter().map(String::as_str).collect();
        hit_countries.sort_unstable();

        let errors = report
            .errors()
            .iter()
            .map(|(country, err)| (country.as_str(), err.to_string()))
            .collect();

        Self {
            date,
            safe: report.safe(),
            hit_countries,
            errors,
        }
    }
}

pub fn render_text(date: &str, countries: &[String], report: &SafetyReport) -> String {
    let view = ReportView::new(date, report);

    if view.safe {
        return format!(
            "SAFE: {} (no holidays in [{}])",
            date,
            countries.join(", ")
        );
    }

    let mut lines = vec![format!("UNSAFE: {}", date)];
    if !view.hit_countries.is_empty() {
        lines.push(format!("Holidays in: [{}]", view.hit_countries.join(", ")));
    }
    if !view.errors.is_empty() {
        lines.push("Errors:".to_string());
        for (country, message) in &view.errors {
            lines.push(format!("  {}: {}", country, message));
        }
    }
    lines.join("\n")
}

pub fn render_json(date: &str, report: &SafetyReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportView::new(date, report))
}

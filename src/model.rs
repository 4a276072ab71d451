// Core structs: PriceSample, HalvingEvent, CycleAnalysis
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One point of the daily price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Epoch milliseconds, UTC.
    pub timestamp: i64,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalvingEvent {
    pub date: NaiveDate,
    pub cycle: u32,
    /// Informational only.
    pub block_height: u64,
}

impl HalvingEvent {
    pub fn new(date: NaiveDate, cycle: u32, block_height: u64) -> Self {
        Self { date, cycle, block_height }
    }

    /// Midnight UTC of the halving date, in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreHalving {
    /// `None` when the series does not reach back into the lookback window.
    pub start_date: Option<NaiveDate>,
    pub start_price: f64,
    pub halving_price: f64,
    /// `None` when the start price is zero.
    pub percentage_gain: Option<f64>,
    pub days_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHalving {
    pub peak_date: NaiveDate,
    pub peak_price: f64,
    pub percentage_gain: Option<f64>,
    pub days_to_peak: i64,
    pub crash_date: Option<NaiveDate>,
    pub crash_price: Option<f64>,
    pub percentage_from_peak: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleAnalysis {
    pub cycle: u32,
    pub halving_date: NaiveDate,
    pub pre_halving: PreHalving,
    pub post_halving: PostHalving,
}

/// Averages across all analysed cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub cycles: usize,
    pub avg_pre_halving_gain: Option<f64>,
    pub avg_post_halving_gain: Option<f64>,
    pub avg_days_to_peak: Option<f64>,
    pub corrections: usize,
    pub avg_percentage_from_peak: Option<f64>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response status {0}")]
    InvalidResponse(u16),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("malformed JSON payload: {0}")]
    JsonParseError(String),
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("malformed price row {index}: {reason}")]
    MalformedRow { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram API error: {0}")]
    ApiError(String),
    #[error("Telegram unreachable")]
    Unreachable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn analysis_without_correction() -> CycleAnalysis {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        CycleAnalysis {
            cycle: 4,
            halving_date: d(2024, 4, 20),
            pre_halving: PreHalving {
                start_date: Some(d(2023, 4, 21)),
                start_price: 27_000.0,
                halving_price: 64_000.0,
                percentage_gain: Some(137.0),
                days_analyzed: 365,
            },
            post_halving: PostHalving {
                peak_date: d(2024, 12, 17),
                peak_price: 106_000.0,
                percentage_gain: Some(65.6),
                days_to_peak: 241,
                crash_date: None,
                crash_price: None,
                percentage_from_peak: None,
            },
        }
    }

    #[test]
    fn cycle_analysis_uses_camel_case_keys() {
        let value = serde_json::to_value(analysis_without_correction()).unwrap();
        assert_eq!(
            value,
            json!({
                "cycle": 4,
                "halvingDate": "2024-04-20",
                "preHalving": {
                    "startDate": "2023-04-21",
                    "startPrice": 27000.0,
                    "halvingPrice": 64000.0,
                    "percentageGain": 137.0,
                    "daysAnalyzed": 365
                },
                "postHalving": {
                    "peakDate": "2024-12-17",
                    "peakPrice": 106000.0,
                    "percentageGain": 65.6,
                    "daysToPeak": 241,
                    "crashDate": null,
                    "crashPrice": null,
                    "percentageFromPeak": null
                }
            })
        );
    }

    #[test]
    fn undefined_gain_and_missing_start_render_as_null() {
        let mut analysis = analysis_without_correction();
        analysis.pre_halving.start_date = None;
        analysis.pre_halving.start_price = 0.0;
        analysis.pre_halving.percentage_gain = None;

        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["preHalving"]["startDate"], Value::Null);
        assert_eq!(value["preHalving"]["percentageGain"], Value::Null);
        assert_eq!(value["preHalving"]["startPrice"], json!(0.0));
    }

    #[test]
    fn summary_uses_camel_case_keys() {
        let value = serde_json::to_value(CycleSummary::default()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "cycles",
            "avgPreHalvingGain",
            "avgPostHalvingGain",
            "avgDaysToPeak",
            "corrections",
            "avgPercentageFromPeak",
        ] {
            assert!(keys.contains(&key), "missing {}", key);
        }
        assert_eq!(value["avgDaysToPeak"], Value::Null);
    }
}

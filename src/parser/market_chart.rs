// Market-chart JSON parsing
use crate::model::{ParserError, PriceSample};
use chrono::DateTime;
use serde_json::Value;

pub trait Parser {
    fn parse(&self, payload: &str) -> Result<Vec<PriceSample>, ParserError>;
}

/// Parses `{"prices": [[timestamp_ms, price], ...]}` payloads.
pub struct MarketChartParser;

impl MarketChartParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_row(index: usize, row: &Value) -> Result<PriceSample, ParserError> {
        let malformed = |reason: &str| ParserError::MalformedRow {
            index,
            reason: reason.to_string(),
        };

        let pair = row.as_array().ok_or_else(|| malformed("not an array"))?;
        if pair.len() < 2 {
            return Err(malformed("expected [timestamp, price]"));
        }
        // Some providers send timestamps as floats.
        let timestamp = match pair[0].as_i64() {
            Some(t) => t,
            None => {
                let t = pair[0]
                    .as_f64()
                    .ok_or_else(|| malformed("timestamp is not a number"))?;
                if !t.is_finite() || t < i64::MIN as f64 || t >= i64::MAX as f64 {
                    return Err(malformed("timestamp out of range"));
                }
                t as i64
            }
        };
        if DateTime::from_timestamp_millis(timestamp).is_none() {
            return Err(malformed("timestamp out of range"));
        }
        let price = pair[1]
            .as_f64()
            .ok_or_else(|| malformed("price is not a number"))?;

        Ok(PriceSample::new(timestamp, price))
    }
}

impl Default for MarketChartParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for MarketChartParser {
    fn parse(&self, payload: &str) -> Result<Vec<PriceSample>, ParserError> {
        let document: Value =
            serde_json::from_str(payload).map_err(|e| ParserError::JsonParseError(e.to_string()))?;

        let rows = document
            .get("prices")
            .and_then(Value::as_array)
            .ok_or_else(|| ParserError::MissingField("prices".into()))?;

        rows.iter()
            .enumerate()
            .map(|(i, row)| Self::parse_row(i, row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_price_rows() {
        let payload = r#"{
            "prices": [[1367107200000, 135.3], [1367193600000.0, 141]],
            "market_caps": [],
            "total_volumes": []
        }"#;
        let samples = MarketChartParser::new().parse(payload).unwrap();
        assert_eq!(
            samples,
            vec![
                PriceSample::new(1_367_107_200_000, 135.3),
                PriceSample::new(1_367_193_600_000, 141.0),
            ]
        );
    }

    #[test]
    fn missing_prices_field_is_an_error() {
        let err = MarketChartParser::new().parse(r#"{"error": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, ParserError::MissingField(ref f) if f == "prices"));
    }

    #[test]
    fn malformed_row_reports_index() {
        let err = MarketChartParser::new()
            .parse(r#"{"prices": [[1, 2.0], [3, "x"]]}"#)
            .unwrap_err();
        assert!(matches!(err, ParserError::MalformedRow { index: 1, .. }));
    }

    #[test]
    fn out_of_range_timestamps_are_rejected() {
        let parser = MarketChartParser::new();
        for payload in [
            r#"{"prices": [[1e30, 1.0]]}"#,
            r#"{"prices": [[9223372036854775807, 1.0]]}"#,
            r#"{"prices": [[1367107200000, 1.0], [-9.0e18, 2.0]]}"#,
        ] {
            let err = parser.parse(payload).unwrap_err();
            assert!(
                matches!(err, ParserError::MalformedRow { ref reason, .. } if reason == "timestamp out of range"),
                "{}: {:?}",
                payload,
                err
            );
        }
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            MarketChartParser::new().parse("<html>"),
            Err(ParserError::JsonParseError(_))
        ));
    }
}

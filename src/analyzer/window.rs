use crate::model::PriceSample;
use crate::utils::DAY_MS;

pub const PRE_HALVING_DAYS: i64 = 365;
pub const POST_HALVING_DAYS: i64 = 550;

/// Slices the full series into the windows the cycle analyzer works on.
pub struct WindowExtractor;

impl WindowExtractor {
    /// First sample strictly within one day of `event_ts`.
    pub fn nearest_sample(series: &[PriceSample], event_ts: i64) -> Option<&PriceSample> {
        series
            .iter()
            .find(|s| (s.timestamp - event_ts).abs() < DAY_MS)
    }

    /// Samples in `[event_ts - 365d, event_ts]`.
    pub fn pre_event(series: &[PriceSample], event_ts: i64) -> Vec<&PriceSample> {
        let start = event_ts - PRE_HALVING_DAYS * DAY_MS;
        series
            .iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= event_ts)
            .collect()
    }

    /// Upper bound of the post-event window: the earliest of 550 days out,
    /// the next halving (or `now` when there is none) and `now`.
    pub fn post_event_end(event_ts: i64, next_event_ts: Option<i64>, now_ts: i64) -> i64 {
        let horizon = event_ts + POST_HALVING_DAYS * DAY_MS;
        horizon.min(next_event_ts.unwrap_or(now_ts)).min(now_ts)
    }

    /// Samples in `(event_ts, post_event_end]`.
    pub fn post_event(
        series: &[PriceSample],
        event_ts: i64,
        next_event_ts: Option<i64>,
        now_ts: i64,
    ) -> Vec<&PriceSample> {
        let end = Self::post_event_end(event_ts, next_event_ts, now_ts);
        series
            .iter()
            .filter(|s| s.timestamp > event_ts && s.timestamp <= end)
            .collect()
    }
}

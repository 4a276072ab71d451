use crate::analyzer::window::{PRE_HALVING_DAYS, WindowExtractor};
use crate::model::{CycleAnalysis, CycleSummary, HalvingEvent, PriceSample};
use crate::utils::DAY_MS;

/// Chart series for a selected cycle: its pre- and post-halving windows joined.
/// Without a selection the full series is returned; an unknown cycle yields nothing.
pub fn series_for_cycle<'a>(
    series: &'a [PriceSample],
    events: &[HalvingEvent],
    selected: Option<u32>,
    now_ts: i64,
) -> Vec<&'a PriceSample> {
    let Some(cycle) = selected else {
        return series.iter().collect();
    };

    let mut ordered: Vec<&HalvingEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.cycle);
    let Some(pos) = ordered.iter().position(|e| e.cycle == cycle) else {
        return Vec::new();
    };

    let event_ts = ordered[pos].timestamp();
    let next_ts = ordered.get(pos + 1).map(|e| e.timestamp());
    let start = event_ts - PRE_HALVING_DAYS * DAY_MS;
    let end = WindowExtractor::post_event_end(event_ts, next_ts, now_ts);

    series
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp <= end)
        .collect()
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Cross-cycle averages; undefined gains are left out of their averages.
pub fn summarize(results: &[CycleAnalysis]) -> CycleSummary {
    CycleSummary {
        cycles: results.len(),
        avg_pre_halving_gain: average(results.iter().filter_map(|r| r.pre_halving.percentage_gain)),
        avg_post_halving_gain: average(results.iter().filter_map(|r| r.post_halving.percentage_gain)),
        avg_days_to_peak: average(results.iter().map(|r| r.post_halving.days_to_peak as f64)),
        corrections: results
            .iter()
            .filter(|r| r.post_halving.crash_date.is_some())
            .count(),
        avg_percentage_from_peak: average(
            results.iter().filter_map(|r| r.post_halving.percentage_from_peak),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PostHalving, PreHalving};
    use chrono::NaiveDate;

    fn events() -> Vec<HalvingEvent> {
        vec![
            HalvingEvent::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 1, 1),
            HalvingEvent::new(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), 2, 2),
        ]
    }

    fn series() -> Vec<PriceSample> {
        let base = events()[0].timestamp();
        (-500..900)
            .map(|d| PriceSample::new(base + d * DAY_MS, 1.0))
            .collect()
    }

    #[test]
    fn no_selection_returns_full_series() {
        let series = series();
        let view = series_for_cycle(&series, &events(), None, i64::MAX);
        assert_eq!(view.len(), series.len());
    }

    #[test]
    fn selection_spans_lookback_to_next_halving() {
        let series = series();
        let events = events();
        let view = series_for_cycle(&series, &events, Some(1), i64::MAX);
        assert_eq!(view.first().unwrap().timestamp, events[0].timestamp() - 365 * DAY_MS);
        assert_eq!(view.last().unwrap().timestamp, events[1].timestamp());
    }

    #[test]
    fn unknown_cycle_is_empty() {
        let series = series();
        assert!(series_for_cycle(&series, &events(), Some(9), i64::MAX).is_empty());
    }

    fn analysis(cycle: u32, pre: Option<f64>, post: f64, days: i64, from_peak: Option<f64>) -> CycleAnalysis {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        CycleAnalysis {
            cycle,
            halving_date: date,
            pre_halving: PreHalving {
                start_date: None,
                start_price: 0.0,
                halving_price: 1.0,
                percentage_gain: pre,
                days_analyzed: 0,
            },
            post_halving: PostHalving {
                peak_date: date,
                peak_price: 1.0,
                percentage_gain: Some(post),
                days_to_peak: days,
                crash_date: from_peak.map(|_| date),
                crash_price: from_peak.map(|_| 0.5),
                percentage_from_peak: from_peak,
            },
        }
    }

    #[test]
    fn summary_skips_undefined_values() {
        let results = vec![
            analysis(1, None, 100.0, 100, Some(-40.0)),
            analysis(2, Some(50.0), 300.0, 200, None),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.avg_pre_halving_gain, Some(50.0));
        assert_eq!(summary.avg_post_halving_gain, Some(200.0));
        assert_eq!(summary.avg_days_to_peak, Some(150.0));
        assert_eq!(summary.corrections, 1);
        assert_eq!(summary.avg_percentage_from_peak, Some(-40.0));
    }

    #[test]
    fn empty_summary_has_no_averages() {
        assert_eq!(summarize(&[]), CycleSummary::default());
    }
}

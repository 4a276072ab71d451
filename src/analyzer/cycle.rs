use crate::analyzer::window::WindowExtractor;
use crate::model::{CycleAnalysis, HalvingEvent, PostHalving, PreHalving, PriceSample};
use crate::utils::{date_from_millis, days_between};

/// Drawdown from the post-halving peak that marks a correction, in percent.
pub const CORRECTION_THRESHOLD_PCT: f64 = 30.0;

/// `(end - start) / start * 100`, or `None` when undefined (zero or non-finite start).
pub fn percentage_change(start: f64, end: f64) -> Option<f64> {
    let change = (end - start) / start * 100.0;
    if start == 0.0 || !change.is_finite() {
        None
    } else {
        Some(change)
    }
}

/// Running peak over the post-halving window, seeded with the halving day.
#[derive(Debug, Clone, Copy)]
struct Peak {
    timestamp: i64,
    price: f64,
    /// Position in the post-halving window; `None` while the seed still holds.
    index: Option<usize>,
}

fn find_peak(post: &[&PriceSample], seed_ts: i64, seed_price: f64) -> Peak {
    let mut peak = Peak {
        timestamp: seed_ts,
        price: seed_price,
        index: None,
    };
    for (i, sample) in post.iter().enumerate() {
        if sample.price > peak.price {
            peak = Peak {
                timestamp: sample.timestamp,
                price: sample.price,
                index: Some(i),
            };
        }
    }
    peak
}

/// First sample from the peak onwards whose running max drawdown reaches the threshold.
/// The running max keeps updating past that point but the first crossing is what gets reported.
fn find_correction<'a>(
    post: &[&'a PriceSample],
    peak: &Peak,
) -> Option<&'a PriceSample> {
    let start = peak.index.unwrap_or(0);
    let mut max_drawdown = 0.0_f64;
    let mut correction = None;
    for sample in post.iter().skip(start) {
        let drawdown = (peak.price - sample.price) / peak.price * 100.0;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
        if correction.is_none() && max_drawdown >= CORRECTION_THRESHOLD_PCT {
            correction = Some(*sample);
        }
    }
    correction
}

/// Computes the per-halving metrics.
pub struct CycleAnalyzer;

impl CycleAnalyzer {
    /// Returns `None` when no sample lies within a day of the halving date.
    pub fn analyze(
        event: &HalvingEvent,
        series: &[PriceSample],
        next_event_ts: Option<i64>,
        now_ts: i64,
    ) -> Option<CycleAnalysis> {
        let event_ts = event.timestamp();
        let halving = WindowExtractor::nearest_sample(series, event_ts)?;
        let pre = WindowExtractor::pre_event(series, event_ts);
        let post = WindowExtractor::post_event(series, event_ts, next_event_ts, now_ts);

        let start = pre.first();
        let start_price = start.map(|s| s.price).unwrap_or(0.0);

        let peak = find_peak(&post, event_ts, halving.price);
        let correction = find_correction(&post, &peak);

        Some(CycleAnalysis {
            cycle: event.cycle,
            halving_date: event.date,
            pre_halving: PreHalving {
                start_date: start.map(|s| date_from_millis(s.timestamp)),
                start_price,
                halving_price: halving.price,
                percentage_gain: percentage_change(start_price, halving.price),
                days_analyzed: pre.len(),
            },
            post_halving: PostHalving {
                peak_date: date_from_millis(peak.timestamp),
                peak_price: peak.price,
                percentage_gain: percentage_change(halving.price, peak.price),
                days_to_peak: days_between(event_ts, peak.timestamp),
                crash_date: correction.map(|s| date_from_millis(s.timestamp)),
                crash_price: correction.map(|s| s.price),
                percentage_from_peak: correction
                    .and_then(|s| percentage_change(peak.price, s.price)),
            },
        })
    }
}

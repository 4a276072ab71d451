use crate::model::PriceSample;
use tracing::warn;

/// Orders the series chronologically and drops unusable prices.
/// The sort is stable, so samples sharing a timestamp keep their payload order.
pub fn normalize_all(samples: &mut Vec<PriceSample>) {
    let before = samples.len();
    samples.retain(is_valid);
    let dropped = before - samples.len();
    if dropped > 0 {
        warn!("Dropped {} samples with invalid prices", dropped);
    }
    samples.sort_by_key(|s| s.timestamp);
}

fn is_valid(sample: &PriceSample) -> bool {
    sample.price.is_finite() && sample.price > 0.0
}

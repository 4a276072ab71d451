// Plain-text rendering of the cycle table
use crate::model::{CycleAnalysis, CycleSummary};
use chrono::NaiveDate;
use std::fmt::Write;

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v),
        None => "n/a".into(),
    }
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".into())
}

pub fn render_report(results: &[CycleAnalysis], summary: &CycleSummary) -> String {
    if results.is_empty() {
        return "No halving cycles could be analyzed.".into();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<5} {:<10} {:>10} {:<10} {:>12} {:>10} {:>5} {:<10} {:>9}",
        "Cycle", "Halving", "Pre gain", "Peak", "Peak price", "Post gain", "Days", "Correction", "From peak"
    );
    for r in results {
        let post = &r.post_halving;
        let _ = writeln!(
            out,
            "{:<5} {:<10} {:>10} {:<10} {:>12.2} {:>10} {:>5} {:<10} {:>9}",
            r.cycle,
            r.halving_date.format("%Y-%m-%d").to_string(),
            pct(r.pre_halving.percentage_gain),
            post.peak_date.format("%Y-%m-%d").to_string(),
            post.peak_price,
            pct(post.percentage_gain),
            post.days_to_peak,
            date(post.crash_date),
            post.percentage_from_peak.map(|v| format!("{:+.2}%", v)).unwrap_or_else(|| "-".into()),
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Average pre-halving gain: {} | post-halving gain: {} | days to peak: {}",
        pct(summary.avg_pre_halving_gain),
        pct(summary.avg_post_halving_gain),
        summary
            .avg_days_to_peak
            .map(|d| format!("{:.0}", d))
            .unwrap_or_else(|| "n/a".into()),
    );
    let _ = write!(
        out,
        "Corrections of 30%+: {}/{} (average {} from peak)",
        summary.corrections,
        summary.cycles,
        pct(summary.avg_percentage_from_peak),
    );
    out
}

use crate::analyzer::cycle::CycleAnalyzer;
use crate::model::{CycleAnalysis, HalvingEvent, PriceSample};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Source of "now" for bounding the most recent cycle.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Runs the cycle analysis over every configured halving.
pub struct CycleAnalysisRunner<C: Clock> {
    clock: C,
}

impl<C: Clock> CycleAnalysisRunner<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// One result per halving with a halving-day sample, ascending by cycle.
    pub fn run(&self, series: &[PriceSample], events: &[HalvingEvent]) -> Vec<CycleAnalysis> {
        let now_ts = self.clock.now().timestamp_millis();

        let mut ordered: Vec<&HalvingEvent> = events.iter().collect();
        ordered.sort_by_key(|e| e.cycle);

        let results: Vec<CycleAnalysis> = ordered
            .iter()
            .enumerate()
            .filter_map(|(i, event)| {
                let next_ts = ordered.get(i + 1).map(|next| next.timestamp());
                let analysis = CycleAnalyzer::analyze(event, series, next_ts, now_ts);
                if analysis.is_none() {
                    debug!("No price sample near halving {} ({}), skipping", event.cycle, event.date);
                }
                analysis
            })
            .collect();

        info!("Analyzed {} of {} halvings", results.len(), events.len());
        results
    }

    pub fn now_ts(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }
}

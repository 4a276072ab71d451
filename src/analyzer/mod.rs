// Analyzer module: window slicing, per-halving metrics and the runner tying them together.

pub mod cycle;
pub mod runner;
pub mod view;
pub mod window;

pub use runner::{Clock, CycleAnalysisRunner, FixedClock, SystemClock};
pub use view::{series_for_cycle, summarize};

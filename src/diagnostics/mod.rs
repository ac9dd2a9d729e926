//! Run diagnostics: a serialisable summary of one generation run plus the
//! wall-clock timings of the stages the binaries execute.

pub mod report;
pub mod timing;

pub use report::GenerationReport;
pub use timing::{StageTiming, TimingBreakdown};

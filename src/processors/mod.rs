pub mod batch_report;
pub mod normalizer;

pub use batch_report::{BatchReport, RangeViolation};
pub use normalizer::{deduplicate, AlignedRecord, NormalizedBatch, Normalizer};

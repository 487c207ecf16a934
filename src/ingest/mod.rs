//! Ingestion writer
//!
//! Joins the feed, the protocol identifier and the swap extractor into one
//! `dex_aggregator_revenue` row per transaction. See [`IngestionPipeline`]
//! for batch behavior and [`build_record`] for the row layout.

mod pipeline;
mod record;

pub use pipeline::{IngestSummary, IngestionPipeline};
pub use record::{build_record, fee_implied_volume};

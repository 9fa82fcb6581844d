//! Resampling and windowing engine for air-quality forecasting
//!
//! Turns an irregular, gap-prone stream of sensor readings into the
//! fixed-length, evenly spaced window a forecasting model consumes:
//! normalization, synthetic backfill, merging, and grid resampling.

pub mod grid;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod quality;
pub mod resample;
pub mod stats;
pub mod synthetic;
pub mod types;
pub mod window;

pub use grid::*;
pub use merge::*;
pub use normalize::*;
pub use pipeline::*;
pub use quality::*;
pub use resample::*;
pub use stats::*;
pub use synthetic::*;
pub use types::*;
pub use window::*;

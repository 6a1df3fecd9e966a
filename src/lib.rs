#![doc = r#"
SARPAIR: SAR/optical time series pairing and per-pixel stacking.

This crate matches a synthetic-aperture-radar (SAR) time series with an optical
time series by acquisition date, and writes N (SAR, optical) output image pairs in
which every pixel holds the highest-priority pairs where neither image is no-data.
It powers the SARPAIR CLI and can be embedded in your own Rust applications.

How pairs are chosen
--------------------
1. Optical acquisitions are sorted: ascending (`asc`), descending (`des`), or by
   ascending gap to a reference timestamp (`abs`).
2. For each optical acquisition in that order, SAR acquisitions are sorted from
   the closest to the farthest, and every one within `max_gap` seconds forms a
   candidate pair. This list is the priority order.
3. Only the images referenced by candidates are stacked, each once.
4. Per pixel, candidates are tried in priority order; pairs where either side is
   entirely no-data are skipped, the others fill slots 1..N. Unfilled slots keep
   the no-data values.

Because slots are filled per pixel, one output slot can draw from different
source pairs at different pixels.

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Plan pairs without touching rasters
-----------------------------------
```rust
use sarpair::{PairingParams, SortMode, TimeSeriesInputs, plan_time_series};

fn main() -> sarpair::Result<()> {
    let inputs = TimeSeriesInputs {
        sar_images: vec!["s1_a.tif".into(), "s1_b.tif".into()],
        optical_images: vec!["s2_a.tif".into(), "s2_b.tif".into(), "s2_c.tif".into()],
        sar_timestamps: vec!["12".into(), "48".into()],
        optical_timestamps: vec!["10".into(), "50".into(), "90".into()],
    };
    let params = PairingParams {
        sorting: SortMode::Asc,
        max_gap: 5.0,
        ..Default::default()
    };
    let plan = plan_time_series(&inputs, &params)?;
    assert_eq!(plan.selection.sar, vec![0, 1]);
    assert_eq!(plan.selection.optical, vec![0, 1]);
    Ok(())
}
```

Process rasters to files
------------------------
```rust,no_run
use std::path::Path;
use sarpair::{OutputPaths, PairingParams, TimeSeriesInputs, process_time_series};

fn main() -> sarpair::Result<()> {
    let inputs = TimeSeriesInputs {
        sar_images: vec!["/data/s1_0.tif".into(), "/data/s1_1.tif".into()],
        optical_images: vec!["/data/s2_0.tif".into()],
        sar_timestamps: vec!["1600000000".into(), "1600300000".into()],
        optical_timestamps: vec!["1600100000".into()],
    };
    let params = PairingParams { outputs: 2, ..Default::default() };
    let outputs = OutputPaths::in_directory(Path::new("/out"), params.outputs);
    let report = process_time_series(&inputs, &outputs, &params, None)?;
    println!("{} pixels processed", report.stats.pixels);
    Ok(())
}
```

Error handling
--------------
All public functions return `sarpair::Result<T>`. Configuration problems
(`ImageCountMismatch`, `InvalidTimestamp`, `UnknownSortMode`, `NoPairsFound`, ...)
are reported before any raster is streamed.

Useful modules
--------------
- [`api`]: high-level entry points.
- [`core`]: timestamps, pairing, deduplication, functor, slicer, pipeline.
- [`io`]: GDAL readers, stacks and writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::functor::FunctorConfig;
pub use crate::core::params::PairingParams;
pub use crate::core::processing::pipeline::{
    BlockSink, BlockSource, ExecutionPlan, PairingInputs, PairingPlan, RunStats, build_plan,
    plan_pairs, run_tiles,
};
pub use crate::core::slicer::{ChannelRange, OutputSlicer, SlotChannels};
pub use crate::core::timestamps::{SortStrategy, Timestamp};
pub use error::{Error, Result};
pub use types::{IndexPair, Modality, SortMode};

// Readers and writers
pub use io::gdal::{GdalError, GdalMetadata, GdalRaster, GdalStack};
pub use io::writers::metadata::{RunSummary, write_run_summary};
pub use io::writers::tiff::{GdalSlotWriter, GeoReference, OutputPaths};

// High-level API re-exports
pub use api::{
    ProcessReport, TimeSeriesInputs, plan_time_series, process_time_series,
    summarize_time_series,
};

//! Core pairing engine: timestamp ordering, candidate generation, source
//! deduplication, the per-pixel selection functor, output slicing, and the
//! plan/run pipeline that streams it over rasters. These are the primitives
//! consumed by the high-level `api` module.
pub mod dedup;
pub mod functor;
pub mod pairing;
pub mod params;
pub mod processing;
pub mod slicer;
pub mod timestamps;

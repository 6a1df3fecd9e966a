//! Streaming side of the engine: strip tiling and the plan/run pipeline.
pub mod pipeline;
pub mod tiles;

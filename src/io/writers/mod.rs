//! Output writers: float32 GeoTIFF slots and their metadata (embedded items and
//! the JSON run summary sidecar).
pub mod metadata;
pub mod tiff;

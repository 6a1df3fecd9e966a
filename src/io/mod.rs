//! I/O layer: GDAL-backed raster access and stacking (`gdal`), and `writers`
//! for the GeoTIFF outputs and run metadata.
pub mod gdal;
pub use self::gdal::{GdalError, GdalMetadata, GdalRaster, GdalStack};

pub mod writers;

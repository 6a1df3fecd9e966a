use std::path::{Path, PathBuf};

use gdal::{Dataset, errors::GdalError as GdalCrateError};
use ndarray::{Array3, ArrayView2, Axis};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::processing::pipeline::BlockSource;
use crate::core::processing::tiles::TileWindow;
use crate::types::Modality;

/// Errors encountered when using the GDAL raster layer
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),
}

/// Metadata extracted from a GDAL-supported dataset
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients, when the dataset has one
    pub geotransform: Option<[f64; 6]>,
    /// Projection in WKT format (may be empty)
    pub projection: String,
}

/// One input image opened through GDAL
pub struct GdalRaster {
    pub path: PathBuf,
    pub dataset: Dataset,
    pub metadata: GdalMetadata,
}

impl GdalRaster {
    /// Open a GDAL-supported dataset (e.g., GeoTIFF, VRT, JP2)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat(format!(
                "No raster bands found in {}",
                path.as_ref().display()
            )));
        }
        let geotransform = dataset.geo_transform().ok();
        let projection = dataset.projection();
        Ok(GdalRaster {
            path: path.as_ref().to_path_buf(),
            dataset,
            metadata: GdalMetadata {
                size_x: size_x as usize,
                size_y: size_y as usize,
                bands,
                geotransform,
                projection,
            },
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.metadata.size_x, self.metadata.size_y)
    }

    /// Read a window of a single band (1-based index), row-major
    pub fn read_window(&self, index: usize, window: &TileWindow) -> Result<Vec<f32>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "Band index {} out of range",
                index
            )));
        }
        let band = self.dataset.rasterband(index)?;
        let size = (window.width, window.height);
        let buf = band.read_as::<f32>(
            (window.x as isize, window.y as isize), // offset
            size,                                  // window size
            size,                                  // shape, no resampling
            None,
        )?;
        let data = buf.data().to_vec();
        if data.len() != window.pixels() {
            return Err(GdalError::DimensionMismatch(
                window.width,
                window.height,
                data.len(),
                1,
            ));
        }
        Ok(data)
    }
}

/// Band-wise concatenation of several images, in list order.
///
/// Every image must have the same band count and raster size.
pub struct GdalStack {
    modality: Modality,
    rasters: Vec<GdalRaster>,
    bands_per_image: usize,
    size: (usize, usize),
}

impl GdalStack {
    /// Open `indices` out of `paths` as a stack.
    ///
    /// `bands_per_image` and `size` come from the first image of the full list.
    pub fn open(
        modality: Modality,
        paths: &[PathBuf],
        indices: &[usize],
        bands_per_image: usize,
        size: (usize, usize),
    ) -> crate::Result<Self> {
        let mut rasters = Vec::with_capacity(indices.len());
        for &index in indices {
            let path = paths.get(index).ok_or(crate::Error::InvalidArgument {
                arg: "image index",
                value: index.to_string(),
            })?;
            let raster = GdalRaster::open(path)?;
            if raster.metadata.bands != bands_per_image {
                return Err(crate::Error::BandCountMismatch {
                    modality,
                    index,
                    expected: bands_per_image,
                    found: raster.metadata.bands,
                });
            }
            if raster.size() != size {
                return Err(crate::Error::DimensionMismatch {
                    modality,
                    index,
                    expected_x: size.0,
                    expected_y: size.1,
                    found_x: raster.metadata.size_x,
                    found_y: raster.metadata.size_y,
                });
            }
            info!("Stacked {} image #{}: {:?}", modality, index, path);
            rasters.push(raster);
        }
        Ok(Self {
            modality,
            rasters,
            bands_per_image,
            size,
        })
    }

    pub fn rasters(&self) -> &[GdalRaster] {
        &self.rasters
    }
}

impl BlockSource for GdalStack {
    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn band_count(&self) -> usize {
        self.rasters.len() * self.bands_per_image
    }

    fn read_block(&mut self, window: &TileWindow) -> crate::Result<Array3<f32>> {
        let shape = (window.height, window.width);
        let mut block = Array3::<f32>::zeros((self.band_count(), shape.0, shape.1));
        let mut planes = block.axis_iter_mut(Axis(0));
        for raster in &self.rasters {
            for index in 1..=self.bands_per_image {
                let data = raster.read_window(index, window)?;
                let view = ArrayView2::from_shape(shape, &data).map_err(|_| {
                    GdalError::DimensionMismatch(window.width, window.height, data.len(), 1)
                })?;
                if let Some(mut plane) = planes.next() {
                    plane.assign(&view);
                }
            }
        }
        debug!(
            "Read {} block at row {}: {} bands",
            self.modality,
            window.y,
            self.band_count()
        );
        Ok(block)
    }
}

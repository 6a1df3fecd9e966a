use std::path::{Path, PathBuf};

use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager};
use ndarray::{ArrayView3, Axis};
use tempfile::TempPath;
use tracing::{info, warn};

use crate::core::processing::pipeline::{BlockSink, ExecutionPlan};
use crate::core::processing::tiles::TileWindow;
use crate::error::{Error, Result};
use crate::io::gdal::GdalError;
use crate::io::writers::metadata::{embed_slot_metadata, slot_metadata_fields};
use crate::types::Modality;

/// Destination files of the N (SAR, optical) outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub sar: Vec<PathBuf>,
    pub optical: Vec<PathBuf>,
}

impl OutputPaths {
    /// Explicit path lists; both must hold `outputs` entries
    pub fn new(sar: Vec<PathBuf>, optical: Vec<PathBuf>, outputs: usize) -> Result<Self> {
        if sar.len() != outputs {
            return Err(Error::InvalidArgument {
                arg: "outsar",
                value: format!("{} paths for {} outputs", sar.len(), outputs),
            });
        }
        if optical.len() != outputs {
            return Err(Error::InvalidArgument {
                arg: "outopt",
                value: format!("{} paths for {} outputs", optical.len(), outputs),
            });
        }
        Ok(Self { sar, optical })
    }

    /// `outsar1.tif`, `outopt1.tif`, ... inside `dir`
    pub fn in_directory(dir: &Path, outputs: usize) -> Self {
        Self {
            sar: (1..=outputs)
                .map(|i| dir.join(format!("outsar{}.tif", i)))
                .collect(),
            optical: (1..=outputs)
                .map(|i| dir.join(format!("outopt{}.tif", i)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sar.is_empty()
    }
}

/// Georeferencing copied onto every output
#[derive(Debug, Clone, Default)]
pub struct GeoReference {
    pub geotransform: Option<[f64; 6]>,
    pub projection: String,
}

struct PendingOutput {
    dataset: Dataset,
    temp: TempPath,
    target: PathBuf,
}

impl PendingOutput {
    /// Closing the dataset flushes it to disk
    fn close(self) -> (TempPath, PathBuf) {
        let PendingOutput {
            dataset,
            temp,
            target,
        } = self;
        drop(dataset);
        (temp, target)
    }

    fn write(
        &mut self,
        window: &TileWindow,
        block: ArrayView3<'_, f32>,
    ) -> std::result::Result<(), GdalError> {
        for (i, plane) in block.axis_iter(Axis(0)).enumerate() {
            let mut band = self.dataset.rasterband(i + 1)?;
            let mut buf = Buffer::new(
                (window.width, window.height),
                plane.iter().copied().collect::<Vec<f32>>(),
            );
            band.write(
                (window.x as isize, window.y as isize),
                (window.width, window.height),
                &mut buf,
            )?;
        }
        Ok(())
    }
}

/// Float32 GeoTIFF sink for the 2×N outputs.
///
/// Files are written next to their destination under a temporary name and only
/// moved into place by [`commit`](Self::commit); dropping the writer removes them.
pub struct GdalSlotWriter {
    sar: Vec<PendingOutput>,
    optical: Vec<PendingOutput>,
}

impl GdalSlotWriter {
    pub fn create(
        paths: &OutputPaths,
        plan: &ExecutionPlan,
        size: (usize, usize),
        georef: &GeoReference,
    ) -> Result<Self> {
        if paths.len() != plan.outputs() || paths.optical.len() != plan.outputs() {
            return Err(Error::InvalidArgument {
                arg: "outputs",
                value: format!("{} output paths for {} outputs", paths.len(), plan.outputs()),
            });
        }
        let functor = plan.functor();
        let mut sar = Vec::with_capacity(paths.len());
        let mut optical = Vec::with_capacity(paths.len());
        for slot in 0..plan.outputs() {
            sar.push(create_output(
                &paths.sar[slot],
                size,
                functor.sar_bands(),
                functor.sar_nodata(),
                georef,
                slot_metadata_fields(plan, slot, Modality::Sar),
            )?);
            optical.push(create_output(
                &paths.optical[slot],
                size,
                functor.optical_bands(),
                functor.optical_nodata(),
                georef,
                slot_metadata_fields(plan, slot, Modality::Optical),
            )?);
        }
        Ok(Self { sar, optical })
    }

    /// Close every dataset, then move all of them to their destinations.
    ///
    /// If any move fails, the files already moved are removed again so that
    /// either every output exists or none does.
    pub fn commit(self) -> Result<Vec<(PathBuf, PathBuf)>> {
        let outputs = self.sar.len();
        let closed: Vec<(TempPath, PathBuf)> = self
            .sar
            .into_iter()
            .chain(self.optical)
            .map(PendingOutput::close)
            .collect();

        let mut persisted: Vec<PathBuf> = Vec::with_capacity(closed.len());
        for (temp, target) in closed {
            if let Err(e) = temp.persist(&target) {
                for done in &persisted {
                    if let Err(cleanup) = std::fs::remove_file(done) {
                        warn!("Could not remove {:?} after failed commit: {}", done, cleanup);
                    }
                }
                return Err(Error::Io(e.error));
            }
            persisted.push(target);
        }

        let (sar, optical) = persisted.split_at(outputs);
        let written: Vec<(PathBuf, PathBuf)> = sar
            .iter()
            .cloned()
            .zip(optical.iter().cloned())
            .collect();
        for (sar_target, opt_target) in &written {
            info!("Wrote {:?} and {:?}", sar_target, opt_target);
        }
        Ok(written)
    }
}

impl BlockSink for GdalSlotWriter {
    fn write_slot(
        &mut self,
        slot: usize,
        window: &TileWindow,
        sar: ArrayView3<'_, f32>,
        optical: ArrayView3<'_, f32>,
    ) -> Result<()> {
        let (sar_out, opt_out) = match (self.sar.get_mut(slot), self.optical.get_mut(slot)) {
            (Some(s), Some(o)) => (s, o),
            _ => {
                return Err(Error::InvalidArgument {
                    arg: "slot",
                    value: slot.to_string(),
                });
            }
        };
        sar_out.write(window, sar)?;
        opt_out.write(window, optical)?;
        Ok(())
    }
}

fn create_output(
    target: &Path,
    size: (usize, usize),
    bands: usize,
    nodata: f32,
    georef: &GeoReference,
    fields: Vec<(String, String)>,
) -> Result<PendingOutput> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let temp = tempfile::Builder::new()
        .prefix(".sarpair-")
        .suffix(".tif")
        .tempfile_in(&dir)?
        .into_temp_path();

    let dataset = create_dataset(&temp, size, bands, nodata, georef, &fields)?;
    Ok(PendingOutput {
        dataset,
        temp,
        target: target.to_path_buf(),
    })
}

fn create_dataset(
    path: &Path,
    size: (usize, usize),
    bands: usize,
    nodata: f32,
    georef: &GeoReference,
    fields: &[(String, String)],
) -> std::result::Result<Dataset, GdalError> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<f32, _>(path, size.0, size.1, bands)?;
    if let Some(gt) = georef.geotransform {
        ds.set_geo_transform(&gt)?;
        if !georef.projection.is_empty() {
            ds.set_projection(&georef.projection)?;
        }
    }
    for index in 1..=bands {
        let mut band = ds.rasterband(index)?;
        band.set_no_data_value(Some(nodata as f64))?;
    }
    embed_slot_metadata(&mut ds, fields)?;
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::PairingParams;
    use crate::core::processing::pipeline::{PairingInputs, build_plan};

    fn one_pair_plan() -> ExecutionPlan {
        let sar = ["0"];
        let opt = ["1"];
        let inputs = PairingInputs {
            sar_images: 1,
            optical_images: 1,
            sar_timestamps: &sar,
            optical_timestamps: &opt,
        };
        build_plan(&inputs, 1, 1, &PairingParams::default()).unwrap()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn failed_commit_removes_outputs_already_moved() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let blocker = dir.path().join("outopt1.tif");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), b"x").unwrap();

        let paths = OutputPaths::in_directory(dir.path(), 1);
        let plan = one_pair_plan();
        let writer = GdalSlotWriter::create(&paths, &plan, (2, 2), &GeoReference::default()).unwrap();
        assert!(writer.commit().is_err());

        assert_eq!(file_names(dir.path()), vec!["outopt1.tif".to_string()]);
        assert!(blocker.is_dir());
    }

    #[test]
    fn dropped_writer_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::in_directory(dir.path(), 1);
        let plan = one_pair_plan();
        let writer = GdalSlotWriter::create(&paths, &plan, (2, 2), &GeoReference::default()).unwrap();
        assert_eq!(file_names(dir.path()).len(), 2);
        drop(writer);
        assert!(file_names(dir.path()).is_empty());
    }

    #[test]
    fn directory_layout_names_outputs_from_one() {
        let paths = OutputPaths::in_directory(Path::new("/out"), 2);
        assert_eq!(
            paths.sar,
            vec![PathBuf::from("/out/outsar1.tif"), PathBuf::from("/out/outsar2.tif")]
        );
        assert_eq!(paths.optical[1], PathBuf::from("/out/outopt2.tif"));
    }

    #[test]
    fn explicit_paths_must_match_output_count() {
        let sar = vec![PathBuf::from("a.tif")];
        let opt = vec![PathBuf::from("b.tif"), PathBuf::from("c.tif")];
        assert!(OutputPaths::new(sar.clone(), opt, 1).is_err());
        assert!(OutputPaths::new(sar.clone(), vec![PathBuf::from("b.tif")], 1).is_ok());
        assert!(OutputPaths::new(sar, vec![PathBuf::from("b.tif")], 2).is_err());
    }
}

use clap::Parser;
use std::path::PathBuf;

use sarpair::SortMode;

#[derive(Parser, Debug)]
#[command(
    name = "sarpair",
    version,
    about = "Pairs SAR and optical time series and stacks the N best valid pairs per pixel"
)]
pub struct CliArgs {
    /// Input SAR images
    #[arg(long, num_args = 1.., required = true)]
    pub ilsar: Vec<PathBuf>,

    /// Input optical images
    #[arg(long, num_args = 1.., required = true)]
    pub ilopt: Vec<PathBuf>,

    /// SAR acquisition timestamps (seconds), one per SAR image, same order
    #[arg(long, num_args = 1.., required = true, allow_negative_numbers = true)]
    pub timestamps_sar: Vec<String>,

    /// Optical acquisition timestamps (seconds), one per optical image, same order
    #[arg(long, num_args = 1.., required = true, allow_negative_numbers = true)]
    pub timestamps_opt: Vec<String>,

    /// How optical images are ordered (asc, des, abs)
    #[arg(long, value_enum)]
    pub sorting: Option<SortMode>,

    /// Reference timestamp for the `abs` sorting mode
    #[arg(long, allow_negative_numbers = true)]
    pub ref_timestamp: Option<String>,

    /// Maximum gap between SAR and optical images, in seconds
    #[arg(long, conflicts_with = "maxgap_hours")]
    pub maxgap: Option<f64>,

    /// Maximum gap between SAR and optical images, in hours
    #[arg(long)]
    pub maxgap_hours: Option<f64>,

    /// No-data value of SAR images
    #[arg(long, allow_negative_numbers = true)]
    pub nodata_sar: Option<f32>,

    /// No-data value of optical images
    #[arg(long, allow_negative_numbers = true)]
    pub nodata_opt: Option<f32>,

    /// Number of (SAR, optical) output pairs
    #[arg(short = 'n', long)]
    pub outputs: Option<usize>,

    /// Output directory; files are named outsar<i>.tif and outopt<i>.tif
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Explicit SAR output files, one per output pair
    #[arg(long, num_args = 1.., conflicts_with = "out_dir")]
    pub outsar: Vec<PathBuf>,

    /// Explicit optical output files, one per output pair
    #[arg(long, num_args = 1.., conflicts_with = "out_dir")]
    pub outopt: Vec<PathBuf>,

    /// Rows per streamed strip
    #[arg(long)]
    pub strip_height: Option<usize>,

    /// JSON preset with pairing parameters; command line values take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a JSON summary of the pairing decisions
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Only compute and report pairs, do not read or write rasters
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}

use tracing::info;
use tracing_subscriber::EnvFilter;

use sarpair::{
    OutputPaths, PairingParams, TimeSeriesInputs, process_time_series, summarize_time_series,
    write_run_summary,
};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Preset (or defaults) overridden by whatever was given on the command line
fn resolve_params(args: &CliArgs) -> Result<PairingParams, AppError> {
    let mut params = match &args.config {
        Some(path) => PairingParams::from_json_file(path)?,
        None => PairingParams::default(),
    };
    if let Some(sorting) = args.sorting {
        params.sorting = sorting;
    }
    if let Some(reference) = &args.ref_timestamp {
        params.reference_timestamp = Some(reference.clone());
    }
    if let Some(gap) = args.maxgap {
        params.max_gap = gap;
    }
    if let Some(hours) = args.maxgap_hours {
        params.max_gap = hours * 3600.0;
    }
    if let Some(nodata) = args.nodata_sar {
        params.sar_nodata = nodata;
    }
    if let Some(nodata) = args.nodata_opt {
        params.optical_nodata = nodata;
    }
    if let Some(outputs) = args.outputs {
        params.outputs = outputs;
    }
    if let Some(rows) = args.strip_height {
        params.strip_height = rows;
    }
    params.validate()?;
    Ok(params)
}

fn resolve_outputs(args: &CliArgs, outputs: usize) -> Result<OutputPaths, AppError> {
    if let Some(dir) = &args.out_dir {
        return Ok(OutputPaths::in_directory(dir, outputs));
    }
    match (args.outsar.is_empty(), args.outopt.is_empty()) {
        (true, true) => Err(AppError::MissingArgument {
            arg: "--out-dir or --outsar/--outopt".to_string(),
        }),
        (false, true) => Err(AppError::IncompleteArguments {
            arg: "--outsar".to_string(),
            other: "--outopt".to_string(),
        }),
        (true, false) => Err(AppError::IncompleteArguments {
            arg: "--outopt".to_string(),
            other: "--outsar".to_string(),
        }),
        (false, false) => Ok(OutputPaths::new(
            args.outsar.clone(),
            args.outopt.clone(),
            outputs,
        )?),
    }
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    init_logging(args.log);

    let params = resolve_params(&args)?;
    let inputs = TimeSeriesInputs {
        sar_images: args.ilsar.clone(),
        optical_images: args.ilopt.clone(),
        sar_timestamps: args.timestamps_sar.clone(),
        optical_timestamps: args.timestamps_opt.clone(),
    };

    if args.dry_run {
        let summary = summarize_time_series(&inputs, &params)?;
        match &args.summary {
            Some(path) => write_run_summary(path, &summary)?,
            None => println!("{}", serde_json::to_string_pretty(&summary)?),
        }
        return Ok(());
    }

    let outputs = resolve_outputs(&args, params.outputs)?;
    let report = process_time_series(&inputs, &outputs, &params, None)?;
    if let Some(path) = &args.summary {
        write_run_summary(path, &report.summary)?;
    }

    info!(
        "Processed {} pixels in {} strips",
        report.stats.pixels, report.stats.strips
    );
    for (sar, opt) in &report.outputs {
        println!("{}\t{}", sar.display(), opt.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use sarpair::SortMode;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec![
            "sarpair",
            "--ilsar",
            "s1.tif",
            "--ilopt",
            "s2.tif",
            "--timestamps-sar",
            "10",
            "--timestamps-opt",
            "12",
        ];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn timestamp_lists_stop_at_the_next_flag() {
        let args = CliArgs::try_parse_from([
            "sarpair",
            "--timestamps-sar",
            "10",
            "-20",
            "3e2",
            "--ilsar",
            "a.tif",
            "b.tif",
            "c.tif",
            "--timestamps-opt",
            "-5",
            "--ilopt",
            "d.tif",
            "--ref-timestamp",
            "-7",
            "--sorting",
            "abs",
        ])
        .unwrap();
        assert_eq!(args.timestamps_sar, vec!["10", "-20", "3e2"]);
        assert_eq!(args.ilsar.len(), 3);
        assert_eq!(args.timestamps_opt, vec!["-5"]);
        assert_eq!(args.ilopt, vec![std::path::PathBuf::from("d.tif")]);
        assert_eq!(args.ref_timestamp.as_deref(), Some("-7"));
        assert_eq!(args.sorting, Some(SortMode::Abs));
    }

    #[test]
    fn missing_timestamp_list_is_reported() {
        let err = CliArgs::try_parse_from([
            "sarpair",
            "--ilsar",
            "a.tif",
            "--ilopt",
            "b.tif",
            "--timestamps-sar",
            "10",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn command_line_overrides_defaults() {
        let args = parse(&[
            "--sorting",
            "abs",
            "--ref-timestamp",
            "11",
            "--maxgap-hours",
            "72",
            "--nodata-opt",
            "-9999",
            "-n",
            "2",
        ]);
        let params = resolve_params(&args).unwrap();
        assert_eq!(params.sorting, SortMode::Abs);
        assert_eq!(params.reference_timestamp.as_deref(), Some("11"));
        assert_eq!(params.max_gap, 72.0 * 3600.0);
        assert_eq!(params.optical_nodata, -9999.0);
        assert_eq!(params.sar_nodata, 0.0);
        assert_eq!(params.outputs, 2);
    }

    #[test]
    fn zero_outputs_is_rejected() {
        let args = parse(&["--outputs", "0"]);
        assert!(resolve_params(&args).is_err());
    }

    #[test]
    fn output_directory_expands_to_numbered_files() {
        let args = parse(&["--out-dir", "/tmp/out"]);
        let paths = resolve_outputs(&args, 2).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.optical[1].ends_with("outopt2.tif"));
    }

    #[test]
    fn explicit_outputs_need_both_modalities() {
        let args = parse(&["--outsar", "a.tif"]);
        assert!(matches!(
            resolve_outputs(&args, 1),
            Err(AppError::IncompleteArguments { .. })
        ));
        let args = parse(&[]);
        assert!(matches!(
            resolve_outputs(&args, 1),
            Err(AppError::MissingArgument { .. })
        ));
    }
}

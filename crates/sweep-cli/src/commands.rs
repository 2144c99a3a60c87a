use std::path::PathBuf;

use anyhow::Result;
use sweep_cli::pipeline::{
    Input, clean, find_outliers, inspect, sample_artifact, write_artifact,
};
use sweep_cli::recipe::{ExportOverrides, Recipe};
use sweep_transform::Transform;

use crate::cli::{CleanArgs, InspectArgs, OutlierArgs, SampleArgs};
use crate::summary::{print_clean_report, print_inspection, print_outliers};

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let input = Input::read(&args.file)?;
    print_inspection(&inspect(&input, args.rows)?);
    Ok(())
}

pub fn run_clean(args: &CleanArgs) -> Result<()> {
    let input = Input::read(&args.file)?;
    let mut recipe = match &args.recipe {
        Some(path) => Recipe::load(path)?,
        None => Recipe::default(),
    };
    if args.dedup {
        recipe.steps.push(Transform::Dedup);
    }
    if let Some(strategy) = args.fill_numeric {
        recipe.steps.push(Transform::FillNumeric { strategy });
    }
    ExportOverrides {
        format: args.format,
        compression: args.compression,
        columns: args.columns.clone(),
        filter: args.filter.clone(),
        include_index: args.include_index,
    }
    .apply_to(&mut recipe.export);

    let report = clean(&input, &recipe)?;
    let written = if args.dry_run {
        None
    } else {
        let dir = args.output_dir.clone().unwrap_or_else(|| default_output_dir(args));
        Some(write_artifact(&dir, &report.artifact)?)
    };
    print_clean_report(&report, written.as_deref());
    Ok(())
}

fn default_output_dir(args: &CleanArgs) -> PathBuf {
    args.file
        .parent()
        .map(|parent| parent.join("cleaned"))
        .unwrap_or_else(|| PathBuf::from("cleaned"))
}

pub fn run_outliers(args: &OutlierArgs) -> Result<()> {
    let input = Input::read(&args.file)?;
    let rows = find_outliers(&input, &args.column, &args.method())?;
    print_outliers(&args.column, &rows);
    Ok(())
}

pub fn run_sample(args: &SampleArgs) -> Result<()> {
    let path = write_artifact(&args.output_dir, &sample_artifact()?)?;
    print_inspection(&inspect(&Input::read(&path)?, args.rows)?);
    println!("Wrote {}", path.display());
    Ok(())
}

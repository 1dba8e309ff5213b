//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use harmon_cli::pipeline::harmonize_pipeline;
use harmon_common::format_numeric;
use harmon_harmonize::CrosswalkConfig;
use harmon_ingest::{metadata_waves_create, read_survey, read_wave_folder};
use harmon_model::VariableMetadata;
use harmon_report::{
    MissingHandling, category_counts, document_waves, survey_to_dataframe, write_csv,
    write_json, write_sav,
};

use crate::cli::{ConvertFormatArg, ExportArgs, ExportFormatArg, HarmonizeArgs, MetadataArgs,
    WavesArgs};
use crate::summary::{
    print_dataframe, print_harmonize_summary, print_metadata_table, print_wave_table,
};

pub fn run_waves(args: &WavesArgs) -> Result<()> {
    let surveys = read_wave_folder(&args.wave_dir).context("read wave folder")?;
    info!(waves = surveys.len(), "discovered waves");
    let documents = document_waves(&surveys);
    print_wave_table(&documents);
    Ok(())
}

pub fn run_metadata(args: &MetadataArgs) -> Result<()> {
    let surveys = read_wave_folder(&args.wave_dir).context("read wave folder")?;
    let rows = metadata_waves_create(&surveys);
    info!(waves = surveys.len(), variables = rows.len(), "built metadata table");
    match &args.out {
        Some(path) => {
            write_metadata_csv(&rows, path)
                .with_context(|| format!("write metadata to {}", path.display()))?;
            println!("Wrote {} rows to {}", rows.len(), path.display());
        }
        None => print_metadata_table(&rows),
    }
    Ok(())
}

pub fn run_harmonize(args: &HarmonizeArgs) -> Result<()> {
    let span = info_span!("harmonize", wave_dir = %args.wave_dir.display());
    let _guard = span.enter();

    let surveys = read_wave_folder(&args.wave_dir).context("read wave folder")?;
    let crosswalk = CrosswalkConfig::load(&args.crosswalk)
        .with_context(|| format!("load crosswalk {}", args.crosswalk.display()))?
        .compile()
        .context("compile crosswalk")?;
    let result = harmonize_pipeline(&surveys, &crosswalk)?;

    let mut outputs: Vec<PathBuf> = Vec::new();
    if !args.dry_run {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| args.wave_dir.join("output"));
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("create output directory {}", output_dir.display()))?;
        if matches!(args.format, ExportFormatArg::Sav | ExportFormatArg::Both) {
            let path = output_dir.join("harmonized.sav");
            write_sav(&result.bound, &path)?;
            outputs.push(path);
        }
        if matches!(args.format, ExportFormatArg::Csv | ExportFormatArg::Both) {
            let path = output_dir.join("harmonized.csv");
            let frame = survey_to_dataframe(&result.bound, MissingHandling::Keep)?;
            write_csv(&frame, &path)?;
            outputs.push(path);
        }
    }

    print_harmonize_summary(&result, &outputs, args.dry_run);
    for target in result.harmonized_targets() {
        let counts = category_counts(&result.bound, target)?;
        print_dataframe(&format!("Categories: {target}"), &counts);
    }
    Ok(())
}

pub fn run_export(args: &ExportArgs) -> Result<()> {
    let survey =
        read_survey(&args.input).with_context(|| format!("read {}", args.input.display()))?;
    let frame = survey_to_dataframe(&survey, MissingHandling::Keep)?;
    let (path, label) = match args.format {
        ConvertFormatArg::Csv => {
            let path = output_path(args, "csv");
            write_csv(&frame, &path)?;
            (path, "CSV")
        }
        ConvertFormatArg::Json => {
            let path = output_path(args, "json");
            write_json(&frame, &path)?;
            (path, "JSON")
        }
    };
    println!(
        "Wrote {label} with {} rows to {}",
        survey.row_count(),
        path.display()
    );
    Ok(())
}

fn output_path(args: &ExportArgs, extension: &str) -> PathBuf {
    args.out
        .clone()
        .unwrap_or_else(|| args.input.with_extension(extension))
}

fn write_metadata_csv(rows: &[VariableMetadata], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "survey_id",
        "filename",
        "var_name_orig",
        "label_norm",
        "label_orig",
        "class",
        "n_labels",
        "n_valid_labels",
        "n_na_labels",
        "na_range",
    ])?;
    for row in rows {
        let na_range = row
            .na_range
            .map(|(low, high)| format!("{}..{}", format_numeric(low), format_numeric(high)))
            .unwrap_or_default();
        writer.write_record([
            row.survey_id.as_str(),
            row.filename.as_str(),
            row.var_name_orig.as_str(),
            row.label_norm.as_str(),
            row.label_orig.as_deref().unwrap_or(""),
            row.class.as_str(),
            &row.n_labels.to_string(),
            &row.n_valid_labels().to_string(),
            &row.n_na_labels().to_string(),
            &na_range,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

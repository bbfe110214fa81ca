mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{backend_config, Args, Commands};
use formcrop::batch::{run_batch, BatchOptions};
use formcrop::crop::NameResolution;
use formcrop::export::{export_csv, write_batch_json};
use formcrop::normalize::TrimNormalizer;
use formcrop::schema::{fix_columns, ColumnSchema};
use formcrop_ocr::negotiate;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(quiet: bool) {
  let default_level = if quiet { "warn" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    )
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn run(args: Args) -> Result<()> {
  match args.command {
    Commands::Version => {
      println!("formcrop {}", env!("CARGO_PKG_VERSION"));
    }
    Commands::Crop {
      input,
      blueprint,
      output,
      save_root,
      backend,
      det_model,
      rec_model,
      char_dict,
      lang,
      denoise,
      labels,
    } => {
      let config = backend_config(backend, det_model, rec_model, char_dict, lang);
      // Fail before touching any image when no backend can be built.
      let mut recognizer = negotiate(&config).context("No usable OCR backend")?;

      let options = BatchOptions {
        save_root,
        name_resolution: if labels {
          NameResolution::Labels
        } else {
          NameResolution::Template
        },
        denoise,
      };

      let report = run_batch(&input, &blueprint, recognizer.as_mut(), options)?;
      write_batch_json(&report.results, &output)?;

      info!(
        processed = report.stats.images_processed,
        skipped = report.stats.images_skipped,
        fields = report.stats.fields_recognized,
        failed_fields = report.stats.fields_failed,
        "OCR results saved to {}",
        output.display()
      );
    }
    Commands::Csv {
      input_json,
      output_csv,
    } => {
      let summary = export_csv(&input_json, &output_csv, &TrimNormalizer)?;
      info!(rows = summary.rows, columns = summary.columns, "CSV export finished");
    }
    Commands::FixColumns {
      input_csv,
      output_csv,
      schema,
    } => {
      let schema = match schema {
        Some(path) => ColumnSchema::load(&path)?,
        None => ColumnSchema::default(),
      };
      let rows = fix_columns(&input_csv, &output_csv, &schema)
        .with_context(|| format!("Failed to fix columns of {}", input_csv.display()))?;
      info!(rows, "Column fix finished");
    }
  }

  Ok(())
}

fn main() {
  let args = Args::parse();
  init_tracing(args.quiet);

  if let Err(e) = run(args) {
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
  }
}

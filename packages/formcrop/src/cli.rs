//! Command line arguments backing the `formcrop` binary.
use clap::{Parser, Subcommand, ValueEnum};
use formcrop_ocr::{BackendConfig, BackendPreference, NeuralModelPaths};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
  name = "formcrop",
  about = "Crop template fields out of scanned forms, OCR them, and export JSON/CSV",
  version
)]
pub struct Args {
  /// Only log warnings and errors
  #[arg(long, short = 'q', global = true)]
  pub quiet: bool,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
  /// Neural backend when available, otherwise Tesseract
  Auto,
  /// Neural detection + recognition models (oar-ocr)
  Neural,
  /// Tesseract
  Traditional,
}

impl From<BackendArg> for BackendPreference {
  fn from(arg: BackendArg) -> Self {
    match arg {
      BackendArg::Auto => BackendPreference::Auto,
      BackendArg::Neural => BackendPreference::Neural,
      BackendArg::Traditional => BackendPreference::Traditional,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Print version information
  Version,
  /// Crop every blueprint field out of the input images and OCR the crops
  Crop {
    /// Image files or directories of images
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Blueprint JSON file with percentage bounding boxes
    #[arg(long)]
    blueprint: PathBuf,

    /// Output JSON file
    #[arg(long, default_value = "ocr_results.json")]
    output: PathBuf,

    /// Directory receiving the cropped field images
    #[arg(long, default_value = "saved_crops")]
    save_root: PathBuf,

    /// Text recognition backend
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Text detection model for the neural backend
    #[arg(long, requires_all = ["rec_model", "char_dict"])]
    det_model: Option<PathBuf>,

    /// Text recognition model for the neural backend
    #[arg(long, requires_all = ["det_model", "char_dict"])]
    rec_model: Option<PathBuf>,

    /// Character dictionary for the neural backend
    #[arg(long, requires_all = ["det_model", "rec_model"])]
    char_dict: Option<PathBuf>,

    /// Tesseract language
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Denoise each crop before recognition
    #[arg(long)]
    denoise: bool,

    /// Fall back to the first label of unnamed boxes before numbering them
    #[arg(long)]
    labels: bool,
  },
  /// Turn an OCR results JSON file into the final CSV
  Csv {
    /// OCR results JSON file
    #[arg(long = "input_json")]
    input_json: PathBuf,

    /// Final CSV output file
    #[arg(long = "output_csv")]
    output_csv: PathBuf,
  },
  /// Rename field_<n> columns to real names and reorder the CSV
  FixColumns {
    /// CSV produced by the csv command
    #[arg(long)]
    input_csv: PathBuf,

    /// Cleaned CSV output file
    #[arg(long)]
    output_csv: PathBuf,

    /// JSON list of column names, in template order (defaults to the loan form layout)
    #[arg(long)]
    schema: Option<PathBuf>,
  },
}

/// Builds the backend configuration from the crop command's flags.
pub fn backend_config(
  backend: BackendArg,
  det_model: Option<PathBuf>,
  rec_model: Option<PathBuf>,
  char_dict: Option<PathBuf>,
  lang: String,
) -> BackendConfig {
  let neural = match (det_model, rec_model, char_dict) {
    (Some(detection_model), Some(recognition_model), Some(char_dict)) => Some(NeuralModelPaths {
      detection_model,
      recognition_model,
      char_dict,
    }),
    _ => None,
  };

  BackendConfig {
    preference: backend.into(),
    neural,
    language: lang,
  }
}

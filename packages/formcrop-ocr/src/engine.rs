use std::fmt;
use std::path::PathBuf;

use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, info};

/// The two families of text recognition backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Detection + recognition networks (oar-ocr / ONNX Runtime).
    Neural,
    /// Tesseract engine via leptess.
    Traditional,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Neural => f.write_str("neural"),
            BackendKind::Traditional => f.write_str("traditional"),
        }
    }
}

/// Which backend the caller wants. `Auto` prefers neural and falls back to
/// traditional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendPreference {
    #[default]
    Auto,
    Neural,
    Traditional,
}

impl BackendPreference {
    /// Backends to probe, in order.
    pub fn candidates(self) -> &'static [BackendKind] {
        match self {
            BackendPreference::Auto => &[BackendKind::Neural, BackendKind::Traditional],
            BackendPreference::Neural => &[BackendKind::Neural],
            BackendPreference::Traditional => &[BackendKind::Traditional],
        }
    }
}

/// Model files required by the neural backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuralModelPaths {
    pub detection_model: PathBuf,
    pub recognition_model: PathBuf,
    pub char_dict: PathBuf,
}

/// Everything needed to pick and construct a backend once at startup.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub preference: BackendPreference,
    pub neural: Option<NeuralModelPaths>,
    /// Tesseract language code.
    pub language: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            preference: BackendPreference::Auto,
            neural: None,
            language: "eng".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("no OCR backend available ({tried})")]
    NoBackend { tried: String },
    #[error("{0} backend is not compiled into this build")]
    Unsupported(BackendKind),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("engine error: {0}")]
    EngineError(String),
}

/// A constructed recognition backend. One instance is built per process and
/// handed to every recognition call.
pub trait Recognizer {
    fn kind(&self) -> BackendKind;

    /// Returns the trimmed best-guess text for one crop, possibly empty.
    fn recognize(&mut self, crop: &DynamicImage) -> Result<String, OcrError>;
}

/// Probes the backends allowed by `config.preference` and returns the first
/// one that initializes.
pub fn negotiate(config: &BackendConfig) -> Result<Box<dyn Recognizer>, OcrError> {
    let mut failures = Vec::new();

    for &kind in config.preference.candidates() {
        match build_backend(kind, config) {
            Ok(recognizer) => {
                info!(backend = %kind, "OCR backend ready");
                return Ok(recognizer);
            }
            Err(e) => {
                debug!(backend = %kind, error = %e, "OCR backend unavailable");
                failures.push(format!("{kind}: {e}"));
            }
        }
    }

    Err(OcrError::NoBackend {
        tried: failures.join("; "),
    })
}

fn build_backend(kind: BackendKind, config: &BackendConfig) -> Result<Box<dyn Recognizer>, OcrError> {
    match kind {
        BackendKind::Neural => build_neural(config),
        BackendKind::Traditional => build_traditional(config),
    }
}

#[cfg(feature = "neural")]
fn build_neural(config: &BackendConfig) -> Result<Box<dyn Recognizer>, OcrError> {
    let paths = config.neural.as_ref().ok_or_else(|| {
        OcrError::InvalidInput(
            "detection model, recognition model and character dictionary are required".into(),
        )
    })?;
    Ok(Box::new(crate::neural::NeuralRecognizer::new(paths)?))
}

#[cfg(not(feature = "neural"))]
fn build_neural(_config: &BackendConfig) -> Result<Box<dyn Recognizer>, OcrError> {
    Err(OcrError::Unsupported(BackendKind::Neural))
}

#[cfg(feature = "tesseract")]
fn build_traditional(config: &BackendConfig) -> Result<Box<dyn Recognizer>, OcrError> {
    Ok(Box::new(crate::tesseract::TesseractRecognizer::new(
        &config.language,
    )?))
}

#[cfg(not(feature = "tesseract"))]
fn build_traditional(_config: &BackendConfig) -> Result<Box<dyn Recognizer>, OcrError> {
    Err(OcrError::Unsupported(BackendKind::Traditional))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_prefers_neural() {
        assert_eq!(
            BackendPreference::Auto.candidates(),
            &[BackendKind::Neural, BackendKind::Traditional]
        );
        assert_eq!(
            BackendPreference::Traditional.candidates(),
            &[BackendKind::Traditional]
        );
    }

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.preference, BackendPreference::Auto);
        assert!(config.neural.is_none());
        assert_eq!(config.language, "eng");
    }

    #[cfg(not(feature = "neural"))]
    #[test]
    fn test_neural_preference_without_feature_fails() {
        let config = BackendConfig {
            preference: BackendPreference::Neural,
            ..Default::default()
        };
        match negotiate(&config) {
            Err(OcrError::NoBackend { tried }) => {
                assert!(tried.contains("neural backend is not compiled"), "{tried}");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("neural backend should not be available"),
        }
    }

    #[cfg(feature = "neural")]
    #[test]
    fn test_neural_requires_model_paths() {
        let config = BackendConfig {
            preference: BackendPreference::Neural,
            ..Default::default()
        };
        let err = negotiate(&config).err().expect("negotiation should fail");
        assert!(err.to_string().contains("character dictionary"));
    }

    #[cfg(not(any(feature = "neural", feature = "tesseract")))]
    #[test]
    fn test_auto_without_backends_reports_every_attempt() {
        let err = negotiate(&BackendConfig::default())
            .err()
            .expect("no backend compiled in");
        let message = err.to_string();
        assert!(message.starts_with("no OCR backend available"));
        assert!(message.contains("neural"));
        assert!(message.contains("traditional"));
    }
}

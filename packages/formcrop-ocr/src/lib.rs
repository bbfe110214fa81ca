pub mod engine;
pub mod preprocess;
pub mod region;

#[cfg(feature = "neural")]
pub mod neural;

#[cfg(feature = "tesseract")]
pub mod tesseract;

pub use engine::{
    negotiate, BackendConfig, BackendKind, BackendPreference, NeuralModelPaths, OcrError,
    Recognizer,
};
pub use preprocess::denoise;
pub use region::{best_region, TextRegion};

#[cfg(feature = "neural")]
pub use neural::NeuralRecognizer;

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

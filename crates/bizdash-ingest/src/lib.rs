//! Bizdash Ingest - upload analysis and the upload wizard
//!
//! This crate provides:
//! - File type and separator detection from file names and content
//! - Column suggestion dictionaries and the standard field list
//! - CSV and XLSX sampling into small tabular frames
//! - The five-step upload wizard state machine

pub mod detection;
pub mod fields;
pub mod sample;
pub mod wizard;

pub use detection::{Detection, FileKind, Separator, detect};
pub use fields::{STANDARD_FIELDS, UNMAPPED_FIELD};
pub use sample::{FileFormat, Frame, SAMPLE_ROWS, read_sample};
pub use wizard::{
    FileAnalysis, Mappings, PreviewOptions, StepProgress, UploadWizard, UploadedFile, WizardState,
    WizardStep,
};

//! Upload wizard state machine
//!
//! `upload -> headers -> file_type -> preview -> process`. Every state after
//! `upload` carries the payload of the state before it, so stepping back
//! restores exactly what the user saw there.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bizdash_common::{BizdashError, LogContext};

use crate::detection::{FileKind, Separator, detect};
use crate::fields::{default_mappings, is_standard_field, is_unmapped};
use crate::sample::{Frame, read_sample};

/// Column mappings of every file: file name -> source column -> canonical field
pub type Mappings = BTreeMap<String, BTreeMap<String, String>>;

/// A file as received from the client
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub name: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Upload,
    Headers,
    FileType,
    Preview,
    Process,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Upload,
        WizardStep::Headers,
        WizardStep::FileType,
        WizardStep::Preview,
        WizardStep::Process,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            WizardStep::Upload => "upload",
            WizardStep::Headers => "headers",
            WizardStep::FileType => "file_type",
            WizardStep::Preview => "preview",
            WizardStep::Process => "process",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Upload => "Upload",
            WizardStep::Headers => "Headers",
            WizardStep::FileType => "Type",
            WizardStep::Preview => "Preview",
            WizardStep::Process => "Process",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the progress indicator
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepProgress {
    pub index: usize,
    pub name: String,
    pub label: String,
    pub done: bool,
    pub current: bool,
}

/// Detection results and sample of one uploaded file
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub name: String,
    pub size: usize,
    pub kind: FileKind,
    pub separator: Separator,
    pub suggestions: BTreeMap<String, String>,
    /// Suggestions that apply to this file's columns, used as the initial mapping
    pub default_mappings: BTreeMap<String, String>,
    pub sample: Option<Frame>,
    pub error: Option<String>,
}

impl FileAnalysis {
    pub fn analyze(file: &UploadedFile) -> Self {
        let detection = detect(&file.name, &file.content);

        let (sample, error) = match read_sample(&file.name, &file.content, detection.separator) {
            Ok(frame) => (Some(frame), None),
            Err(e) => {
                warn!(file = %file.name, "Failed to read sample: {}", e);
                (None, Some(e.to_string()))
            }
        };

        let default_mappings = sample
            .as_ref()
            .map(|frame| default_mappings(&frame.columns, &detection.suggestions))
            .unwrap_or_default();

        Self {
            name: file.name.clone(),
            size: file.content.len(),
            kind: detection.kind,
            separator: detection.separator,
            suggestions: detection.suggestions,
            default_mappings,
            sample,
            error,
        }
    }

    fn columns(&self) -> &[String] {
        self.sample
            .as_ref()
            .map(|frame| frame.columns.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadersStage {
    pub files: Vec<FileAnalysis>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStage {
    pub headers: HeadersStage,
    pub mappings: Mappings,
}

/// Recorded with the preview; nothing enforces them yet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewOptions {
    pub skip_duplicates: bool,
    pub validate_required: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            skip_duplicates: true,
            validate_required: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePreview {
    pub file_type: FileKind,
    pub separator: Separator,
    pub size: usize,
    /// Whether the columns carry mapped names
    pub mapped: bool,
    pub frame: Option<Frame>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewStage {
    pub types: TypeStage,
    pub file_types: BTreeMap<String, FileKind>,
    pub previews: BTreeMap<String, FilePreview>,
    pub options: PreviewOptions,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub file: String,
    pub file_type: FileKind,
    pub processed: bool,
    pub rows_persisted: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStage {
    pub preview: PreviewStage,
    pub outcomes: Vec<ProcessOutcome>,
}

/// Current step and the payload accumulated so far
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WizardState {
    #[default]
    Upload,
    Headers(HeadersStage),
    FileType(TypeStage),
    Preview(PreviewStage),
    Process(ProcessStage),
}

impl WizardState {
    pub fn step(&self) -> WizardStep {
        match self {
            WizardState::Upload => WizardStep::Upload,
            WizardState::Headers(_) => WizardStep::Headers,
            WizardState::FileType(_) => WizardStep::FileType,
            WizardState::Preview(_) => WizardStep::Preview,
            WizardState::Process(_) => WizardStep::Process,
        }
    }
}

/// The upload wizard of one session
#[derive(Clone, Debug, Default)]
pub struct UploadWizard {
    state: WizardState,
}

impl UploadWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step()
    }

    /// The five steps with done and current markers
    pub fn progress(&self) -> Vec<StepProgress> {
        let current = self.step().index();
        WizardStep::ALL
            .iter()
            .map(|step| StepProgress {
                index: step.index(),
                name: step.name().to_string(),
                label: step.label().to_string(),
                done: step.index() < current,
                current: step.index() == current,
            })
            .collect()
    }

    fn invalid(state: &WizardState, action: &str) -> BizdashError {
        BizdashError::InvalidTransition {
            from: state.step().name().to_string(),
            action: action.to_string(),
        }
    }

    /// Analyze the uploaded files and move to header mapping.
    ///
    /// A file that cannot be read keeps its error in its analysis; the other files are unaffected.
    pub fn upload(&mut self, files: Vec<UploadedFile>) -> Result<&WizardState, BizdashError> {
        if !matches!(self.state, WizardState::Upload) {
            return Err(Self::invalid(&self.state, "upload files"));
        }
        if files.is_empty() {
            return Err(BizdashError::IllegalArgument(
                "at least one file is required".to_string(),
            ));
        }

        let mut names = BTreeSet::new();
        if let Some(duplicate) = files.iter().find(|f| !names.insert(f.name.as_str())) {
            return Err(BizdashError::IllegalArgument(format!(
                "duplicate file name '{}'",
                duplicate.name
            )));
        }

        let ctx = LogContext::enter(format!("ANALYZE_UPLOAD ({} files)", files.len()));
        let files: Vec<FileAnalysis> = files.iter().map(FileAnalysis::analyze).collect();
        drop(ctx);
        for file in &files {
            info!(
                file = %file.name,
                kind = %file.kind,
                separator = %file.separator,
                size = file.size,
                "File analyzed"
            );
        }

        self.state = WizardState::Headers(HeadersStage { files });
        Ok(&self.state)
    }

    /// Record column mappings and move to file type confirmation.
    ///
    /// Without explicit mappings every file takes its default mappings.
    /// Targets that are empty or the placeholder are dropped; at least one
    /// mapped column across all files is required.
    pub fn submit_mappings(
        &mut self,
        mappings: Option<Mappings>,
    ) -> Result<&WizardState, BizdashError> {
        let WizardState::Headers(headers) = &self.state else {
            return Err(Self::invalid(&self.state, "submit mappings"));
        };

        let mappings = match mappings {
            Some(mappings) => clean_mappings(headers, mappings)?,
            None => headers
                .files
                .iter()
                .map(|f| (f.name.clone(), f.default_mappings.clone()))
                .collect(),
        };

        if mappings.values().all(BTreeMap::is_empty) {
            return Err(BizdashError::NoColumnMapped);
        }

        let headers = headers.clone();
        self.state = WizardState::FileType(TypeStage { headers, mappings });
        Ok(&self.state)
    }

    /// Confirm a data type per file and build the previews.
    ///
    /// Files without an entry keep their detected type.
    pub fn confirm_types(
        &mut self,
        types: BTreeMap<String, FileKind>,
        options: PreviewOptions,
    ) -> Result<&WizardState, BizdashError> {
        let WizardState::FileType(stage) = &self.state else {
            return Err(Self::invalid(&self.state, "confirm file types"));
        };

        let mut file_types = BTreeMap::new();
        let mut previews = BTreeMap::new();

        for file in &stage.headers.files {
            let file_type = types.get(&file.name).copied().unwrap_or(file.kind);
            let file_mappings = stage.mappings.get(&file.name).filter(|m| !m.is_empty());

            let frame = file.sample.as_ref().map(|sample| match file_mappings {
                Some(mappings) => sample.rename(mappings),
                None => sample.clone(),
            });

            file_types.insert(file.name.clone(), file_type);
            previews.insert(
                file.name.clone(),
                FilePreview {
                    file_type,
                    separator: file.separator,
                    size: file.size,
                    mapped: file_mappings.is_some() && frame.is_some(),
                    frame,
                    error: file.error.clone(),
                },
            );
        }

        let types = stage.clone();
        self.state = WizardState::Preview(PreviewStage {
            types,
            file_types,
            previews,
            options,
        });
        Ok(&self.state)
    }

    /// Finish the wizard. Rows are not persisted anywhere; every file is reported as processed.
    pub fn process(&mut self) -> Result<&WizardState, BizdashError> {
        let WizardState::Preview(preview) = &self.state else {
            return Err(Self::invalid(&self.state, "process files"));
        };

        let outcomes: Vec<ProcessOutcome> = preview
            .file_types
            .iter()
            .map(|(file, file_type)| {
                info!(
                    file = %file,
                    file_type = %file_type,
                    "File processed, no rows persisted"
                );
                ProcessOutcome {
                    file: file.clone(),
                    file_type: *file_type,
                    processed: true,
                    rows_persisted: 0,
                }
            })
            .collect();

        let preview = preview.clone();
        self.state = WizardState::Process(ProcessStage { preview, outcomes });
        Ok(&self.state)
    }

    /// Return to the previous step with that step's payload. Stays put at `upload`.
    pub fn back(&mut self) -> WizardStep {
        self.state = match std::mem::take(&mut self.state) {
            WizardState::Upload | WizardState::Headers(_) => WizardState::Upload,
            WizardState::FileType(stage) => WizardState::Headers(stage.headers),
            WizardState::Preview(stage) => WizardState::FileType(stage.types),
            WizardState::Process(stage) => WizardState::Preview(stage.preview),
        };
        self.step()
    }

    /// Drop everything and start over
    pub fn reset(&mut self) {
        self.state = WizardState::Upload;
    }
}

/// Keep mappings of known files with a real target. Unknown target fields are rejected.
fn clean_mappings(headers: &HeadersStage, mappings: Mappings) -> Result<Mappings, BizdashError> {
    let mut cleaned = Mappings::new();

    for file in &headers.files {
        let Some(file_mappings) = mappings.get(&file.name) else {
            cleaned.insert(file.name.clone(), BTreeMap::new());
            continue;
        };

        let columns = file.columns();
        let mut kept = BTreeMap::new();
        for (column, field) in file_mappings {
            if is_unmapped(field) || !columns.contains(column) {
                continue;
            }
            if !is_standard_field(field.trim()) {
                return Err(BizdashError::IllegalArgument(format!(
                    "unknown field '{}' for column '{}' of {}",
                    field, column, file.name
                )));
            }
            kept.insert(column.clone(), field.trim().to_string());
        }

        cleaned.insert(file.name.clone(), kept);
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::UNMAPPED_FIELD;

    fn retailer_file() -> UploadedFile {
        UploadedFile::new(
            "retailer_jan.csv",
            "ORGANIZATION ID|ORGANIZATION NAME|REGION\nR1|Toko A|West\nR2|Toko B|East\n",
        )
    }

    fn other_file() -> UploadedFile {
        UploadedFile::new("summary.csv", "col_a,col_b\n1,2\n")
    }

    fn at_headers() -> UploadWizard {
        let mut wizard = UploadWizard::new();
        wizard.upload(vec![retailer_file(), other_file()]).unwrap();
        wizard
    }

    fn mapping(file: &str, column: &str, field: &str) -> Mappings {
        BTreeMap::from([(
            file.to_string(),
            BTreeMap::from([(column.to_string(), field.to_string())]),
        )])
    }

    #[test]
    fn test_upload_analyzes_each_file() {
        let wizard = at_headers();
        let WizardState::Headers(stage) = wizard.state() else {
            panic!("expected headers step");
        };

        let retailer = &stage.files[0];
        assert_eq!(retailer.kind, FileKind::Retailer);
        assert_eq!(retailer.separator, Separator::Pipe);
        assert_eq!(retailer.sample.as_ref().unwrap().rows.len(), 2);
        assert_eq!(retailer.default_mappings.len(), 2);
        assert_eq!(retailer.default_mappings["ORGANIZATION ID"], "retailer_id");

        let other = &stage.files[1];
        assert_eq!(other.kind, FileKind::Other);
        assert!(other.default_mappings.is_empty());
    }

    #[test]
    fn test_upload_requires_files() {
        let mut wizard = UploadWizard::new();
        assert!(wizard.upload(vec![]).is_err());
        assert_eq!(wizard.step(), WizardStep::Upload);

        let duplicate = vec![other_file(), other_file()];
        assert!(wizard.upload(duplicate).is_err());
    }

    #[test]
    fn test_unreadable_file_is_reported_per_file() {
        let mut wizard = UploadWizard::new();
        wizard
            .upload(vec![
                UploadedFile::new("legacy_visit.xls", vec![0xd0, 0xcf, 0x11, 0xe0]),
                other_file(),
            ])
            .unwrap();

        let WizardState::Headers(stage) = wizard.state() else {
            panic!("expected headers step");
        };
        assert!(stage.files[0].sample.is_none());
        assert!(stage.files[0].error.as_deref().unwrap().contains("legacy_visit.xls"));
        assert!(stage.files[1].sample.is_some());
        assert!(stage.files[1].error.is_none());
    }

    #[test]
    fn test_zero_mappings_are_rejected() {
        let mut wizard = at_headers();

        let placeholders = mapping("summary.csv", "col_a", UNMAPPED_FIELD);
        let err = wizard.submit_mappings(Some(placeholders)).unwrap_err();
        assert!(matches!(err, BizdashError::NoColumnMapped));
        assert_eq!(wizard.step(), WizardStep::Headers);

        let err = wizard.submit_mappings(Some(Mappings::new())).unwrap_err();
        assert!(matches!(err, BizdashError::NoColumnMapped));

        wizard
            .submit_mappings(Some(mapping("summary.csv", "col_a", "amount")))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::FileType);
    }

    #[test]
    fn test_default_mappings_are_used_without_input() {
        let mut wizard = at_headers();
        wizard.submit_mappings(None).unwrap();

        let WizardState::FileType(stage) = wizard.state() else {
            panic!("expected file_type step");
        };
        assert_eq!(stage.mappings["retailer_jan.csv"].len(), 2);
        assert!(stage.mappings["summary.csv"].is_empty());
    }

    #[test]
    fn test_default_mappings_can_be_empty() {
        let mut wizard = UploadWizard::new();
        wizard.upload(vec![other_file()]).unwrap();

        let err = wizard.submit_mappings(None).unwrap_err();
        assert!(matches!(err, BizdashError::NoColumnMapped));
    }

    #[test]
    fn test_unknown_target_field_is_rejected() {
        let mut wizard = at_headers();
        let err = wizard
            .submit_mappings(Some(mapping("summary.csv", "col_a", "customer_id")))
            .unwrap_err();
        assert!(matches!(err, BizdashError::IllegalArgument(_)));
    }

    #[test]
    fn test_preview_uses_mapped_names_and_detected_types() {
        let mut wizard = at_headers();
        wizard
            .submit_mappings(Some(mapping("retailer_jan.csv", "REGION", "province")))
            .unwrap();

        let types = BTreeMap::from([("summary.csv".to_string(), FileKind::Visit)]);
        wizard
            .confirm_types(types, PreviewOptions::default())
            .unwrap();

        let WizardState::Preview(stage) = wizard.state() else {
            panic!("expected preview step");
        };
        assert_eq!(stage.file_types["retailer_jan.csv"], FileKind::Retailer);
        assert_eq!(stage.file_types["summary.csv"], FileKind::Visit);
        assert!(stage.options.skip_duplicates);
        assert!(stage.options.validate_required);

        let retailer = &stage.previews["retailer_jan.csv"];
        assert!(retailer.mapped);
        assert_eq!(
            retailer.frame.as_ref().unwrap().columns,
            vec!["ORGANIZATION ID", "ORGANIZATION NAME", "province"]
        );

        let other = &stage.previews["summary.csv"];
        assert!(!other.mapped);
        assert_eq!(other.frame.as_ref().unwrap().columns, vec!["col_a", "col_b"]);
    }

    #[test]
    fn test_process_reports_every_file() {
        let mut wizard = at_headers();
        wizard.submit_mappings(None).unwrap();
        wizard
            .confirm_types(BTreeMap::new(), PreviewOptions::default())
            .unwrap();
        wizard.process().unwrap();

        let WizardState::Process(stage) = wizard.state() else {
            panic!("expected process step");
        };
        assert_eq!(stage.outcomes.len(), 2);
        assert!(stage.outcomes.iter().all(|o| o.processed && o.rows_persisted == 0));
    }

    #[test]
    fn test_wrong_state_transitions_are_rejected() {
        let mut wizard = UploadWizard::new();
        let err = wizard.process().unwrap_err();
        assert!(matches!(err, BizdashError::InvalidTransition { .. }));
        assert_eq!(err.to_string(), "cannot process files while at step 'upload'");

        assert!(wizard.submit_mappings(None).is_err());
        assert!(
            wizard
                .confirm_types(BTreeMap::new(), PreviewOptions::default())
                .is_err()
        );

        let mut wizard = at_headers();
        assert!(wizard.upload(vec![other_file()]).is_err());
        assert_eq!(wizard.step(), WizardStep::Headers);
    }

    #[test]
    fn test_back_restores_previous_payload() {
        let mut wizard = at_headers();
        wizard
            .submit_mappings(Some(mapping("summary.csv", "col_b", "quantity")))
            .unwrap();
        wizard
            .confirm_types(BTreeMap::new(), PreviewOptions::default())
            .unwrap();
        wizard.process().unwrap();

        assert_eq!(wizard.back(), WizardStep::Preview);
        assert_eq!(wizard.back(), WizardStep::FileType);
        let WizardState::FileType(stage) = wizard.state() else {
            panic!("expected file_type step");
        };
        assert_eq!(stage.mappings["summary.csv"]["col_b"], "quantity");

        assert_eq!(wizard.back(), WizardStep::Headers);
        let WizardState::Headers(stage) = wizard.state() else {
            panic!("expected headers step");
        };
        assert_eq!(stage.files.len(), 2);

        assert_eq!(wizard.back(), WizardStep::Upload);
        assert_eq!(wizard.back(), WizardStep::Upload);
    }

    #[test]
    fn test_reset_and_progress() {
        let mut wizard = at_headers();
        wizard.submit_mappings(None).unwrap();

        let progress = wizard.progress();
        assert_eq!(progress.len(), 5);
        assert!(progress[0].done && progress[1].done);
        assert!(progress[2].current && !progress[2].done);
        assert!(!progress[3].done && !progress[3].current);
        assert_eq!(progress[2].name, "file_type");

        wizard.reset();
        assert_eq!(wizard.step(), WizardStep::Upload);
        assert!(wizard.progress()[0].current);
    }

    #[test]
    fn test_state_serializes_with_step_tag() {
        let wizard = at_headers();
        let json = serde_json::to_value(wizard.state()).unwrap();
        assert_eq!(json["step"], "headers");
        assert_eq!(json["files"][0]["kind"], "retailer");
        assert_eq!(json["files"][0]["separator"], "|");
    }
}

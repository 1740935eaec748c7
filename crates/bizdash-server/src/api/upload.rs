//! Upload wizard endpoints
//!
//! The wizard lives in the caller's session. Each endpoint performs one
//! transition and answers with the resulting state and progress markers.

use std::collections::BTreeMap;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use bizdash_ingest::fields::field_options;
use bizdash_ingest::{
    FileKind, Mappings, PreviewOptions, StepProgress, UploadWizard, UploadedFile, WizardState,
};

use crate::error::{AppError, BizdashError};
use crate::model::response;

/// Largest accepted upload, all files together
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTypeOption {
    pub kind: FileKind,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadView {
    pub state: WizardState,
    pub progress: Vec<StepProgress>,
    pub field_options: Vec<&'static str>,
    pub file_types: Vec<FileTypeOption>,
}

impl UploadView {
    fn of(wizard: &UploadWizard) -> Self {
        UploadView {
            state: wizard.state().clone(),
            progress: wizard.progress(),
            field_options: field_options(),
            file_types: FileKind::ALL
                .iter()
                .map(|kind| FileTypeOption {
                    kind: *kind,
                    label: kind.label(),
                    description: kind.description(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MappingsRequest {
    /// Omitted to accept the suggested mappings
    pub mappings: Option<Mappings>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TypesRequest {
    pub types: BTreeMap<String, FileKind>,
    pub options: PreviewOptions,
}

/// Run `f` against the session's wizard and answer with the new view
fn with_wizard<F>(req: &HttpRequest, f: F) -> Result<HttpResponse, AppError>
where
    F: FnOnce(&mut UploadWizard) -> Result<(), BizdashError>,
{
    let session = super::current_session(req)?;
    let mut context = session.context.lock();
    f(&mut context.wizard)?;

    Ok(response::Result::<UploadView>::http_success(UploadView::of(
        &context.wizard,
    )))
}

#[get("")]
async fn state(req: HttpRequest) -> Result<HttpResponse, AppError> {
    with_wizard(&req, |_| Ok(()))
}

/// Collect every multipart field that carries a file name
async fn read_files(mut payload: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();
    let mut total = 0usize;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| BizdashError::IllegalArgument(e.to_string()))?;
        let Some(name) = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
        else {
            continue;
        };

        let mut content: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| BizdashError::IllegalArgument(e.to_string()))?;
            total += chunk.len();
            if total > MAX_UPLOAD_BYTES {
                return Err(BizdashError::IllegalArgument(format!(
                    "upload exceeds {} MB",
                    MAX_UPLOAD_BYTES / 1024 / 1024
                ))
                .into());
            }
            content.extend_from_slice(&chunk);
        }

        files.push(UploadedFile::new(name, content));
    }

    Ok(files)
}

#[post("")]
async fn upload(req: HttpRequest, payload: Multipart) -> Result<HttpResponse, AppError> {
    let files = read_files(payload).await?;
    info!(files = files.len(), "Files uploaded");

    with_wizard(&req, move |wizard| wizard.upload(files).map(|_| ()))
}

#[post("/mappings")]
async fn mappings(
    req: HttpRequest,
    body: Option<web::Json<MappingsRequest>>,
) -> Result<HttpResponse, AppError> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    with_wizard(&req, move |wizard| {
        wizard.submit_mappings(request.mappings).map(|_| ())
    })
}

#[post("/types")]
async fn types(
    req: HttpRequest,
    body: Option<web::Json<TypesRequest>>,
) -> Result<HttpResponse, AppError> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    with_wizard(&req, move |wizard| {
        wizard
            .confirm_types(request.types, request.options)
            .map(|_| ())
    })
}

#[post("/process")]
async fn process(req: HttpRequest) -> Result<HttpResponse, AppError> {
    with_wizard(&req, |wizard| wizard.process().map(|_| ()))
}

#[post("/back")]
async fn back(req: HttpRequest) -> Result<HttpResponse, AppError> {
    with_wizard(&req, |wizard| {
        wizard.back();
        Ok(())
    })
}

#[post("/reset")]
async fn reset(req: HttpRequest) -> Result<HttpResponse, AppError> {
    with_wizard(&req, |wizard| {
        wizard.reset();
        Ok(())
    })
}

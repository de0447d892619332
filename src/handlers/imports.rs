use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::error::{AppError, ImportError};
use crate::importer::{self, ImportFormat, ImportReport, Upload};
use crate::metrics::IMPORT_FAILURES;
use crate::models::{EntityKind, Product};
use crate::state::AppState;

// The first file part of a multipart upload
struct UploadedFile {
    file_name: String,
    body: Bytes,
    encoding: Option<String>,
}

impl UploadedFile {
    fn as_upload(&self) -> Upload<'_> {
        Upload {
            file_name: &self.file_name,
            body: &self.body,
            encoding: self.encoding.as_deref(),
        }
    }
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub count: usize,
    #[serde(flatten)]
    pub report: ImportReport,
}

// An explicit `encoding` part wins over the file part's charset
async fn read_upload(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    let mut file = None;
    let mut declared = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("encoding") {
            declared = Some(field.text().await?);
            continue;
        }
        if file.is_some() {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let charset = field.content_type().and_then(charset_param);
        let body = field.bytes().await?;
        file = Some(UploadedFile {
            file_name,
            body,
            encoding: charset,
        });
    }

    let mut file = file.ok_or(AppError::MissingFile)?;
    if declared.is_some() {
        file.encoding = declared;
    }
    Ok(file)
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn record_failure(file: &UploadedFile, target: EntityKind, err: ImportError) -> ImportError {
    IMPORT_FAILURES.inc();
    warn!(file = %file.file_name, %target, "import failed: {err}");
    err
}

async fn run_import(
    state: &AppState,
    target: EntityKind,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    let file = read_upload(&mut multipart).await?;

    let report = importer::import(&state.store, target, file.as_upload())
        .await
        .map_err(|e| record_failure(&file, target, e))?;

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            message: format!("Data from {} was imported.", report.format.label()),
            count: report.count(),
            report,
        }),
    ))
}

pub async fn import_products_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    run_import(&state, EntityKind::Product, multipart).await
}

pub async fn import_orders_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    run_import(&state, EntityKind::Order, multipart).await
}

// REST upload: always CSV, answers with the created products
pub async fn upload_products_csv_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Vec<Product>>, AppError> {
    let file = read_upload(&mut multipart).await?;

    let report = importer::import_as(&state.store, EntityKind::Product, ImportFormat::Csv, file.as_upload())
        .await
        .map_err(|e| record_failure(&file, EntityKind::Product, e))?;

    Ok(Json(state.store.products_by_ids(&report.created).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_is_read_from_content_type() {
        assert_eq!(charset_param("text/csv; charset=UTF-8"), Some("UTF-8".to_string()));
        assert_eq!(charset_param("text/csv;Charset=\"ascii\""), Some("ascii".to_string()));
        assert_eq!(charset_param("text/csv"), None);
        assert_eq!(charset_param("text/csv; header=present"), None);
    }
}

//! Bulk import of products and orders from uploaded CSV or JSON files.
//!
//! The format is resolved once from the file name. CSV records are all
//! transformed first and inserted as one batch; JSON records are created one
//! by one. Related product names are linked after the owning entity exists.

mod csv_source;
mod json_source;
mod record;

use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ImportError;
use crate::metrics::{IMPORT_LATENCY, IMPORTED_TOTAL};
use crate::models::EntityKind;
use crate::store::Store;

use record::RawRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Csv,
    Json,
}

// How a format's records reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persistence {
    Batch,
    PerRecord,
}

impl ImportFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self, ImportError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(ImportFormat::Csv),
            Some("json") => Ok(ImportFormat::Json),
            _ => Err(ImportError::UnsupportedFormat(file_name.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImportFormat::Csv => "CSV",
            ImportFormat::Json => "JSON",
        }
    }

    fn parse(&self, text: &str) -> Result<Vec<RawRecord>, ImportError> {
        match self {
            ImportFormat::Csv => csv_source::parse(text),
            ImportFormat::Json => json_source::parse(text),
        }
    }

    fn persistence(&self) -> Persistence {
        match self {
            ImportFormat::Csv => Persistence::Batch,
            ImportFormat::Json => Persistence::PerRecord,
        }
    }
}

// An uploaded file as received from the client
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub file_name: &'a str,
    pub body: &'a [u8],
    pub encoding: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub target: EntityKind,
    pub format: ImportFormat,
    pub created: Vec<u64>,
}

impl ImportReport {
    pub fn count(&self) -> usize {
        self.created.len()
    }
}

/// Imports `upload` as entities of kind `target`, choosing the format from
/// the file extension. Unsupported extensions are rejected before the body
/// is read.
pub async fn import(store: &Store, target: EntityKind, upload: Upload<'_>) -> Result<ImportReport, ImportError> {
    let format = ImportFormat::from_file_name(upload.file_name)?;
    import_as(store, target, format, upload).await
}

// Same as `import`, with the format fixed by the caller
pub async fn import_as(
    store: &Store,
    target: EntityKind,
    format: ImportFormat,
    upload: Upload<'_>,
) -> Result<ImportReport, ImportError> {
    let start_time = Instant::now();

    let text = decode(upload.body, upload.encoding)?;
    let records = format.parse(text)?;
    debug!(
        file = upload.file_name,
        format = format.label(),
        records = records.len(),
        "parsed import file"
    );

    let created = persist(store, target, records, format.persistence()).await?;

    IMPORTED_TOTAL
        .with_label_values(&[target.as_str(), format.label()])
        .inc_by(created.len() as f64);
    IMPORT_LATENCY.observe(start_time.elapsed().as_secs_f64());
    info!(
        file = upload.file_name,
        %target,
        format = format.label(),
        created = created.len(),
        "import finished"
    );

    Ok(ImportReport {
        target,
        format,
        created,
    })
}

fn decode<'a>(body: &'a [u8], encoding: Option<&str>) -> Result<&'a str, ImportError> {
    let encoding = encoding.map(|e| e.trim().to_ascii_lowercase());

    let text = match encoding.as_deref() {
        None | Some("") | Some("utf-8") | Some("utf8") => {
            std::str::from_utf8(body).map_err(|_| ImportError::Decode("UTF-8"))?
        }
        Some("ascii") | Some("us-ascii") => {
            if !body.is_ascii() {
                return Err(ImportError::Decode("ASCII"));
            }
            std::str::from_utf8(body).map_err(|_| ImportError::Decode("ASCII"))?
        }
        Some(other) => return Err(ImportError::UnsupportedEncoding(other.to_string())),
    };

    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

async fn persist(
    store: &Store,
    target: EntityKind,
    records: Vec<RawRecord>,
    persistence: Persistence,
) -> Result<Vec<u64>, ImportError> {
    match persistence {
        Persistence::Batch => {
            let mut entities = Vec::with_capacity(records.len());
            let mut relations = Vec::with_capacity(records.len());
            for raw in records {
                let draft = record::prepare(store, target, raw).await?;
                entities.push(draft.entity);
                relations.push(draft.related);
            }

            let ids = store.insert_batch(entities).await?;

            // not covered by the batch: a failure here keeps the inserted rows
            for (id, related) in ids.iter().zip(&relations) {
                attach(store, target, *id, related).await?;
            }
            Ok(ids)
        }
        Persistence::PerRecord => {
            let mut ids = Vec::with_capacity(records.len());
            for raw in records {
                let draft = record::prepare(store, target, raw).await?;
                let id = store.insert(draft.entity).await?;
                attach(store, target, id, &draft.related).await?;
                ids.push(id);
            }
            Ok(ids)
        }
    }
}

async fn attach(store: &Store, target: EntityKind, id: u64, related: &[String]) -> Result<(), ImportError> {
    if related.is_empty() {
        return Ok(());
    }

    match target {
        EntityKind::Order => {
            store.attach_products(id, related).await?;
        }
        // products carry no relation column
        EntityKind::Product => {}
    }
    Ok(())
}

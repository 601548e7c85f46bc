//! Export Routes

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use storage::{
    BioRecognitionLayer, ComponentKind, ImmobilizationLayer, MemristiveLayer, Page, SensorCombination,
    TargetAnalyte,
};

use crate::error::{ApiError, ApiResult};
use crate::export::{to_csv, to_json, ExportFormat};
use crate::extract::ApiQuery;
use crate::AppState;

/// Query parameters for export endpoints
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// `csv` or `json`; csv for single tables and json for `all` by default
    pub format: Option<String>,
}

/// Exportable tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Component(ComponentKind),
    Combinations,
    All,
}

impl Table {
    /// Accepts storage table names, with `-` in place of `_` where it reads better in a URL
    fn parse(name: &str) -> ApiResult<Self> {
        let normalized = name.replace('-', "_");
        if let Some(kind) = ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.table_name() == normalized)
        {
            return Ok(Table::Component(kind));
        }
        match normalized.as_str() {
            "combinations" | "sensor_combinations" => Ok(Table::Combinations),
            "all" => Ok(Table::All),
            _ => Err(ApiError::NotFound(format!("Unknown table '{}'", name))),
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            Table::Component(kind) => kind.table_name(),
            Table::Combinations => "sensor_combinations",
            Table::All => "biosensor_database",
        }
    }
}

/// Every table in one document
#[derive(Debug, Serialize)]
struct FullExport {
    exported_at: chrono::DateTime<Utc>,
    analytes: Vec<TargetAnalyte>,
    bio_recognition: Vec<BioRecognitionLayer>,
    immobilization: Vec<ImmobilizationLayer>,
    memristive: Vec<MemristiveLayer>,
    sensor_combinations: Vec<SensorCombination>,
}

fn render<T: Serialize>(records: &[T], format: ExportFormat) -> ApiResult<String> {
    match format {
        ExportFormat::Csv => to_csv(records),
        ExportFormat::Json => to_json(&records),
    }
}

/// Download one table, or `all` tables as a single JSON document
pub async fn export_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ApiQuery(params): ApiQuery<ExportQuery>,
) -> ApiResult<impl IntoResponse> {
    let table = Table::parse(&name)?;
    let format = match (&params.format, table) {
        (Some(f), _) => f.parse::<ExportFormat>()?,
        (None, Table::All) => ExportFormat::Json,
        (None, _) => ExportFormat::Csv,
    };

    let repo = &state.repository;
    let body = match table {
        Table::Component(ComponentKind::Analyte) => {
            render(&repo.list_analytes(Page::all()).await?, format)?
        }
        Table::Component(ComponentKind::BioRecognition) => {
            render(&repo.list_bio_recognition(Page::all()).await?, format)?
        }
        Table::Component(ComponentKind::Immobilization) => {
            render(&repo.list_immobilization(Page::all()).await?, format)?
        }
        Table::Component(ComponentKind::Memristive) => {
            render(&repo.list_memristive(Page::all()).await?, format)?
        }
        Table::Combinations => render(&repo.list_combinations(Page::all()).await?, format)?,
        Table::All => {
            if format != ExportFormat::Json {
                return Err(ApiError::BadRequest(
                    "Full export is only available as json".to_string(),
                ));
            }
            to_json(&FullExport {
                exported_at: Utc::now(),
                analytes: repo.list_analytes(Page::all()).await?,
                bio_recognition: repo.list_bio_recognition(Page::all()).await?,
                immobilization: repo.list_immobilization(Page::all()).await?,
                memristive: repo.list_memristive(Page::all()).await?,
                sensor_combinations: repo.list_combinations(Page::all()).await?,
            })?
        }
    };

    let filename = format!(
        "{}_{}.{}",
        table.file_stem(),
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    );
    tracing::info!(table = table.file_stem(), bytes = body.len(), "Export generated");

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::pagination::PageMeta;

// ============ Enumerations ============

/// Kind of contact list an enrichment job processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactType {
    Person,
    Company,
}

impl ContactType {
    pub const ALL: [ContactType; 2] = [ContactType::Person, ContactType::Company];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Person => "PERSON",
            ContactType::Company => "COMPANY",
        }
    }
}

/// Processing status reported by the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Processing,
    Completed,
    Failed,
    Canceled,
}

impl ProcessingStatus {
    pub const ALL: [ProcessingStatus; 4] = [
        ProcessingStatus::Processing,
        ProcessingStatus::Completed,
        ProcessingStatus::Failed,
        ProcessingStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Processing => "PROCESSING",
            ProcessingStatus::Completed => "COMPLETED",
            ProcessingStatus::Failed => "FAILED",
            ProcessingStatus::Canceled => "CANCELED",
        }
    }
}

// ============ Source feed ============

/// Record emitted by the simulated upstream feed (`/people/v1/enrichments`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEnrichment {
    pub id_enriquecimento: String,
    pub id_workspace: String,
    pub nome_workspace: String,
    pub total_contatos: i64,
    pub tipo_contato: ContactType,
    pub status_processamento: ProcessingStatus,
    pub data_criacao: DateTime<Utc>,
    pub data_atualizacao: DateTime<Utc>,
}

// ============ Gold table ============

/// One row of `gold_enriquecimentos`.
///
/// Status is kept as text: the ETL writes values outside [`ProcessingStatus`].
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub id_enriquecimento: String,
    pub id_workspace: String,
    pub nome_workspace: Option<String>,
    pub total_contatos: Option<i64>,
    pub tipo_contato: Option<String>,
    pub status_processamento: String,
    pub data_criacao: Option<DateTime<Utc>>,
    pub data_atualizacao: Option<DateTime<Utc>>,
    pub duracao_processamento_minutos: Option<f64>,
    pub tempo_por_contato_minutos: Option<f64>,
    pub processamento_sucesso: Option<bool>,
    pub categoria_tamanho_job: Option<String>,
    pub necessita_reprocessamento: Option<bool>,
    pub data_atualizacao_dw: Option<DateTime<Utc>>,
}

// ============ Aggregate views ============

/// Raw `vw_kpis_resumo` row; every column may come back NULL.
#[derive(Debug, Clone, Default, FromRow)]
pub struct KpiRow {
    pub total_jobs: Option<i64>,
    pub jobs_sucesso: Option<i64>,
    pub percentual_sucesso: Option<f64>,
    pub tempo_medio_minutos: Option<f64>,
    pub tempo_maximo_minutos: Option<f64>,
    pub tempo_minimo_minutos: Option<f64>,
    pub total_contatos_processados: Option<i64>,
}

/// Headline numbers shown on the overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_jobs: i64,
    pub jobs_sucesso: i64,
    pub percentual_sucesso: f64,
    pub tempo_medio_minutos: f64,
    pub tempo_maximo_minutos: f64,
    pub tempo_minimo_minutos: f64,
    pub total_contatos_processados: i64,
}

impl From<Option<KpiRow>> for KpiSummary {
    /// An empty view or NULL columns collapse to zero.
    fn from(row: Option<KpiRow>) -> Self {
        let row = row.unwrap_or_default();
        Self {
            total_jobs: row.total_jobs.unwrap_or(0),
            jobs_sucesso: row.jobs_sucesso.unwrap_or(0),
            percentual_sucesso: row.percentual_sucesso.unwrap_or(0.0),
            tempo_medio_minutos: row.tempo_medio_minutos.unwrap_or(0.0),
            tempo_maximo_minutos: row.tempo_maximo_minutos.unwrap_or(0.0),
            tempo_minimo_minutos: row.tempo_minimo_minutos.unwrap_or(0.0),
            total_contatos_processados: row.total_contatos_processados.unwrap_or(0),
        }
    }
}

/// Raw row shared by `vw_stats_por_status` and `vw_stats_por_categoria`,
/// with the grouping column aliased to `grupo`.
#[derive(Debug, Clone, FromRow)]
pub struct DistributionRow {
    pub grupo: Option<String>,
    pub quantidade: Option<i64>,
    pub percentual: Option<f64>,
    pub total_contatos: Option<i64>,
    pub tempo_medio_minutos: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDistribution {
    pub status: String,
    pub quantidade: i64,
    pub percentual: f64,
    pub total_contatos: i64,
    pub tempo_medio_minutos: f64,
}

impl From<DistributionRow> for StatusDistribution {
    fn from(row: DistributionRow) -> Self {
        Self {
            status: row.grupo.unwrap_or_default(),
            quantidade: row.quantidade.unwrap_or(0),
            percentual: row.percentual.unwrap_or(0.0),
            total_contatos: row.total_contatos.unwrap_or(0),
            tempo_medio_minutos: row.tempo_medio_minutos.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub categoria: String,
    pub quantidade: i64,
    pub percentual: f64,
    pub total_contatos: i64,
    pub tempo_medio_minutos: f64,
}

impl From<DistributionRow> for CategoryDistribution {
    fn from(row: DistributionRow) -> Self {
        Self {
            categoria: row.grupo.unwrap_or_default(),
            quantidade: row.quantidade.unwrap_or(0),
            percentual: row.percentual.unwrap_or(0.0),
            total_contatos: row.total_contatos.unwrap_or(0),
            tempo_medio_minutos: row.tempo_medio_minutos.unwrap_or(0.0),
        }
    }
}

/// One entry of `vw_ranking_workspaces`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WorkspaceRanking {
    pub id_workspace: String,
    pub nome_workspace: Option<String>,
    pub quantidade_jobs: i64,
    pub total_contatos: i64,
    pub taxa_sucesso: f64,
    pub tempo_medio_minutos: f64,
}

// ============ Response bodies ============

/// Body of `GET /analytics/overview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub kpis: KpiSummary,
    pub distribuicao_status: Vec<StatusDistribution>,
    pub distribuicao_categoria: Vec<CategoryDistribution>,
}

/// Page of items plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

/// Body of `GET /analytics/workspaces/top`; deliberately no `meta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopWorkspacesResponse {
    pub data: Vec<WorkspaceRanking>,
}

// ============ Query parameters ============

/// Query string of the paginated endpoints.
///
/// Numbers arrive as text so a malformed value falls back to its default
/// instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub id_workspace: Option<String>,
    pub status_processamento: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

//! Periodic loader: simulated source → `bronze_enriquecimentos` → `gold_enriquecimentos`.

use serde::Serialize;
use sqlx::PgPool;
use std::fmt;
use std::time::Duration;

use crate::api_client::{ApiClient, ClientError};
use crate::models::SourceEnrichment;

/// Page size requested from the source on every cycle.
pub const INGEST_PAGE_SIZE: i64 = 100;

/// Job size bucket derived from the contact count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizeCategory {
    Pequeno,
    Medio,
    Grande,
    MuitoGrande,
}

impl SizeCategory {
    /// Exclusive upper bounds of the first three buckets.
    pub const SMALL_BELOW: i64 = 100;
    pub const MEDIUM_BELOW: i64 = 500;
    pub const LARGE_BELOW: i64 = 1000;

    pub fn from_contacts(total_contatos: i64) -> Self {
        if total_contatos < Self::SMALL_BELOW {
            SizeCategory::Pequeno
        } else if total_contatos < Self::MEDIUM_BELOW {
            SizeCategory::Medio
        } else if total_contatos < Self::LARGE_BELOW {
            SizeCategory::Grande
        } else {
            SizeCategory::MuitoGrande
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeCategory::Pequeno => "PEQUENO",
            SizeCategory::Medio => "MEDIO",
            SizeCategory::Grande => "GRANDE",
            SizeCategory::MuitoGrande => "MUITO_GRANDE",
        }
    }
}

/// Status written to gold for every promoted job.
pub const PROMOTED_STATUS: &str = "CONCLUIDO";

#[derive(Debug)]
pub enum IngestError {
    Client(ClientError),
    Database(sqlx::Error),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Client(e) => write!(f, "Source fetch failed: {}", e),
            IngestError::Database(e) => write!(f, "Warehouse write failed: {}", e),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<ClientError> for IngestError {
    fn from(err: ClientError) -> Self {
        IngestError::Client(err)
    }
}

impl From<sqlx::Error> for IngestError {
    fn from(err: sqlx::Error) -> Self {
        IngestError::Database(err)
    }
}

/// Writes to the bronze and gold tables.
#[derive(Clone)]
pub struct WarehouseWriter {
    pool: PgPool,
}

impl WarehouseWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts records into bronze, skipping ids already present.
    ///
    /// A record that fails is logged and skipped; returns how many rows were
    /// actually inserted.
    pub async fn insert_bronze(&self, records: &[SourceEnrichment]) -> u64 {
        let mut inserted = 0;

        for record in records {
            let payload = match serde_json::to_value(record) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("Could not serialize {}: {}", record.id_enriquecimento, e);
                    continue;
                }
            };

            let result = sqlx::query(
                r#"
                INSERT INTO bronze_enriquecimentos (
                    id_enriquecimento, id_workspace, nome_workspace, total_contatos,
                    tipo_contato, status_processamento, data_criacao, data_atualizacao,
                    payload_original
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id_enriquecimento) DO NOTHING
                "#,
            )
            .bind(&record.id_enriquecimento)
            .bind(&record.id_workspace)
            .bind(&record.nome_workspace)
            .bind(record.total_contatos)
            .bind(record.tipo_contato.as_str())
            .bind(record.status_processamento.as_str())
            .bind(record.data_criacao)
            .bind(record.data_atualizacao)
            .bind(&payload)
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) => inserted += done.rows_affected(),
                Err(e) => tracing::warn!(
                    "Failed to insert bronze record {}: {}",
                    record.id_enriquecimento,
                    e
                ),
            }
        }

        inserted
    }

    /// Upserts bronze rows still `PROCESSING` into gold as completed jobs.
    pub async fn promote_bronze_to_gold(&self) -> Result<u64, sqlx::Error> {
        let done = sqlx::query(
            r#"
            INSERT INTO gold_enriquecimentos (
                id_enriquecimento, id_workspace, nome_workspace, total_contatos,
                tipo_contato, status_processamento, data_criacao, data_atualizacao,
                duracao_processamento_minutos, tempo_por_contato_minutos,
                processamento_sucesso, categoria_tamanho_job, necessita_reprocessamento
            )
            SELECT
                id_enriquecimento, id_workspace, nome_workspace, total_contatos,
                tipo_contato, $1, data_criacao, data_atualizacao,
                0, 0,
                true,
                CASE
                    WHEN total_contatos < $2 THEN $3
                    WHEN total_contatos < $4 THEN $5
                    WHEN total_contatos < $6 THEN $7
                    ELSE $8
                END,
                false
            FROM bronze_enriquecimentos
            WHERE status_processamento = 'PROCESSING'
            ON CONFLICT (id_enriquecimento) DO UPDATE SET
                status_processamento = EXCLUDED.status_processamento
            "#,
        )
        .bind(PROMOTED_STATUS)
        .bind(SizeCategory::SMALL_BELOW)
        .bind(SizeCategory::Pequeno.as_str())
        .bind(SizeCategory::MEDIUM_BELOW)
        .bind(SizeCategory::Medio.as_str())
        .bind(SizeCategory::LARGE_BELOW)
        .bind(SizeCategory::Grande.as_str())
        .bind(SizeCategory::MuitoGrande.as_str())
        .execute(&self.pool)
        .await?;

        Ok(done.rows_affected())
    }
}

/// Outcome of one ingestion cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub inserted: u64,
    pub promoted: u64,
}

pub struct Ingestor {
    client: ApiClient,
    writer: WarehouseWriter,
}

impl Ingestor {
    pub fn new(client: ApiClient, writer: WarehouseWriter) -> Self {
        Self { client, writer }
    }

    /// Fetches the first source page, retrying once after a throttle.
    pub async fn fetch_records(&self) -> Result<Vec<SourceEnrichment>, ClientError> {
        match self.client.get_source_page(1, INGEST_PAGE_SIZE).await {
            Ok(page) => Ok(page.data),
            Err(ClientError::Throttled { retry_after }) => {
                tracing::warn!("Source throttled, waiting {}s before retrying", retry_after);
                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                let page = self.client.get_source_page(1, INGEST_PAGE_SIZE).await?;
                Ok(page.data)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleReport, IngestError> {
        let records = self.fetch_records().await?;
        tracing::info!("Fetched {} records from source", records.len());

        let inserted = self.writer.insert_bronze(&records).await;
        tracing::info!("{} records inserted into bronze", inserted);

        let promoted = self.writer.promote_bronze_to_gold().await?;
        tracing::info!("Bronze -> gold promotion complete ({} rows)", promoted);

        Ok(CycleReport {
            fetched: records.len(),
            inserted,
            promoted,
        })
    }

    /// Runs a cycle every `interval` until `shutdown` resolves. Failed cycles
    /// are logged and the loop goes on.
    pub async fn run<S>(&self, interval: Duration, shutdown: S)
    where
        S: std::future::Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        tokio::pin!(shutdown);
        let mut iteration: u64 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = &mut shutdown => {
                    tracing::info!("Ingestion stopped after {} iterations", iteration);
                    return;
                }
            }

            iteration += 1;
            tracing::info!("Ingestion iteration #{}", iteration);
            if let Err(e) = self.run_cycle().await {
                tracing::error!("Ingestion iteration #{} failed: {}", iteration, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_category_thresholds() {
        assert_eq!(SizeCategory::from_contacts(0), SizeCategory::Pequeno);
        assert_eq!(SizeCategory::from_contacts(99), SizeCategory::Pequeno);
        assert_eq!(SizeCategory::from_contacts(100), SizeCategory::Medio);
        assert_eq!(SizeCategory::from_contacts(499), SizeCategory::Medio);
        assert_eq!(SizeCategory::from_contacts(500), SizeCategory::Grande);
        assert_eq!(SizeCategory::from_contacts(999), SizeCategory::Grande);
        assert_eq!(SizeCategory::from_contacts(1000), SizeCategory::MuitoGrande);
    }

    #[test]
    fn size_category_labels_match_serde() {
        for category in [
            SizeCategory::Pequeno,
            SizeCategory::Medio,
            SizeCategory::Grande,
            SizeCategory::MuitoGrande,
        ] {
            assert_eq!(serde_json::to_value(category).unwrap(), category.as_str());
        }
    }
}

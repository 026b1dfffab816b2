use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::errors::{AppError, ResultExt};
use crate::filters::EnrichmentFilters;
use crate::models::{
    CategoryDistribution, DistributionRow, EnrichmentRecord, KpiRow, KpiSummary,
    OverviewResponse, StatusDistribution, WorkspaceRanking,
};
use crate::pagination::{PageMeta, PageRequest};

/// Column list of the page query. Casts pin the Rust types regardless of how
/// the warehouse declared NUMERIC or timestamp columns.
const ENRICHMENT_COLUMNS: &str = "\
    id_enriquecimento::TEXT AS id_enriquecimento, \
    id_workspace, \
    nome_workspace, \
    total_contatos::BIGINT AS total_contatos, \
    tipo_contato, \
    status_processamento, \
    data_criacao::TIMESTAMPTZ AS data_criacao, \
    data_atualizacao::TIMESTAMPTZ AS data_atualizacao, \
    duracao_processamento_minutos::FLOAT8 AS duracao_processamento_minutos, \
    tempo_por_contato_minutos::FLOAT8 AS tempo_por_contato_minutos, \
    processamento_sucesso, \
    categoria_tamanho_job, \
    necessita_reprocessamento, \
    data_atualizacao_dw::TIMESTAMPTZ AS data_atualizacao_dw";

const KPI_QUERY: &str = "\
    SELECT total_jobs::BIGINT AS total_jobs, \
           jobs_sucesso::BIGINT AS jobs_sucesso, \
           percentual_sucesso::FLOAT8 AS percentual_sucesso, \
           tempo_medio_minutos::FLOAT8 AS tempo_medio_minutos, \
           tempo_maximo_minutos::FLOAT8 AS tempo_maximo_minutos, \
           tempo_minimo_minutos::FLOAT8 AS tempo_minimo_minutos, \
           total_contatos_processados::BIGINT AS total_contatos_processados \
    FROM vw_kpis_resumo";

const STATUS_QUERY: &str = "\
    SELECT status_processamento::TEXT AS grupo, \
           quantidade::BIGINT AS quantidade, \
           percentual::FLOAT8 AS percentual, \
           total_contatos::BIGINT AS total_contatos, \
           tempo_medio_minutos::FLOAT8 AS tempo_medio_minutos \
    FROM vw_stats_por_status";

const CATEGORY_QUERY: &str = "\
    SELECT categoria_tamanho_job::TEXT AS grupo, \
           quantidade::BIGINT AS quantidade, \
           percentual::FLOAT8 AS percentual, \
           total_contatos::BIGINT AS total_contatos, \
           tempo_medio_minutos::FLOAT8 AS tempo_medio_minutos \
    FROM vw_stats_por_categoria";

const RANKING_QUERY: &str = "\
    SELECT id_workspace, \
           nome_workspace, \
           COALESCE(quantidade_jobs, 0)::BIGINT AS quantidade_jobs, \
           COALESCE(total_contatos, 0)::BIGINT AS total_contatos, \
           COALESCE(taxa_sucesso, 0)::FLOAT8 AS taxa_sucesso, \
           COALESCE(tempo_medio_minutos, 0)::FLOAT8 AS tempo_medio_minutos \
    FROM vw_ranking_workspaces \
    LIMIT $1";

/// Read-only access to the gold table and its views.
#[derive(Clone)]
pub struct AnalyticsStorage {
    pool: PgPool,
}

impl AnalyticsStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn fetch_kpis(&self) -> Result<KpiSummary, AppError> {
        let row = sqlx::query_as::<_, KpiRow>(KPI_QUERY)
            .fetch_optional(&self.pool)
            .await
            .context("reading vw_kpis_resumo")?;
        Ok(KpiSummary::from(row))
    }

    pub async fn fetch_status_distribution(&self) -> Result<Vec<StatusDistribution>, AppError> {
        let rows = sqlx::query_as::<_, DistributionRow>(STATUS_QUERY)
            .fetch_all(&self.pool)
            .await
            .context("reading vw_stats_por_status")?;
        Ok(rows.into_iter().map(StatusDistribution::from).collect())
    }

    pub async fn fetch_category_distribution(
        &self,
    ) -> Result<Vec<CategoryDistribution>, AppError> {
        let rows = sqlx::query_as::<_, DistributionRow>(CATEGORY_QUERY)
            .fetch_all(&self.pool)
            .await
            .context("reading vw_stats_por_categoria")?;
        Ok(rows.into_iter().map(CategoryDistribution::from).collect())
    }

    /// Reads the three overview views concurrently; any failure fails the whole.
    pub async fn fetch_overview(&self) -> Result<OverviewResponse, AppError> {
        let (kpis, distribuicao_status, distribuicao_categoria) = tokio::try_join!(
            self.fetch_kpis(),
            self.fetch_status_distribution(),
            self.fetch_category_distribution(),
        )?;

        Ok(OverviewResponse {
            kpis,
            distribuicao_status,
            distribuicao_categoria,
        })
    }

    pub async fn count_enrichments(&self, filters: &EnrichmentFilters) -> Result<i64, AppError> {
        let mut builder = count_query(filters);
        let total: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .context("counting gold_enriquecimentos")?;
        Ok(total)
    }

    pub async fn fetch_enrichments(
        &self,
        filters: &EnrichmentFilters,
        request: PageRequest,
    ) -> Result<Vec<EnrichmentRecord>, AppError> {
        let mut builder = page_query(filters, request);
        let rows = builder
            .build_query_as::<EnrichmentRecord>()
            .fetch_all(&self.pool)
            .await
            .context("reading gold_enriquecimentos page")?;
        Ok(rows)
    }

    /// Count first, then the page: the page alone cannot tell the total.
    pub async fn list_enrichments(
        &self,
        filters: &EnrichmentFilters,
        request: PageRequest,
    ) -> Result<(PageMeta, Vec<EnrichmentRecord>), AppError> {
        let total_items = self.count_enrichments(filters).await?;
        let rows = self.fetch_enrichments(filters, request).await?;
        Ok((PageMeta::new(request, total_items), rows))
    }

    /// Ranking rows in the view's own order.
    pub async fn top_workspaces(&self, limit: i64) -> Result<Vec<WorkspaceRanking>, AppError> {
        let rows = sqlx::query_as::<_, WorkspaceRanking>(RANKING_QUERY)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context("reading vw_ranking_workspaces")?;
        Ok(rows)
    }
}

pub fn count_query(filters: &EnrichmentFilters) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) AS total FROM gold_enriquecimentos");
    filters.push_where(&mut builder);
    builder
}

pub fn page_query(
    filters: &EnrichmentFilters,
    request: PageRequest,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT ");
    builder.push(ENRICHMENT_COLUMNS);
    builder.push(" FROM gold_enriquecimentos");
    filters.push_where(&mut builder);
    builder.push(" ORDER BY data_atualizacao_dw DESC LIMIT ");
    builder.push_bind(request.limit);
    builder.push(" OFFSET ");
    builder.push_bind(request.offset());
    builder
}

//! Polling consumer of the analytics API.
//!
//! Every tick (and every page change) the overview, the current analytics
//! page and the workspace ranking are fetched concurrently. A failed cycle
//! records the error and keeps the last good snapshot on screen.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::api_client::{ApiClient, ClientError, EnrichmentFilterParams};
use crate::models::{EnrichmentRecord, OverviewResponse, WorkspaceRanking};
use crate::pagination::PageMeta;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const DEFAULT_TOP_WORKSPACES: i64 = 10;

/// Current page index, always within `[1, total_pages]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current_page: i64,
    total_pages: i64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl PageState {
    pub fn current_page(&self) -> i64 {
        self.current_page
    }

    pub fn total_pages(&self) -> i64 {
        self.total_pages
    }

    /// Returns true when the page actually moved.
    pub fn next(&mut self) -> bool {
        self.go_to(self.current_page + 1)
    }

    pub fn previous(&mut self) -> bool {
        self.go_to(self.current_page - 1)
    }

    pub fn go_to(&mut self, page: i64) -> bool {
        let target = page.clamp(1, self.total_pages);
        let moved = target != self.current_page;
        self.current_page = target;
        moved
    }

    /// An empty table still counts as one page. A shrinking total pulls the
    /// current page back inside the range.
    pub fn set_total_pages(&mut self, total_pages: i64) {
        self.total_pages = total_pages.max(1);
        self.current_page = self.current_page.clamp(1, self.total_pages);
    }
}

/// Page navigation requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommand {
    Next,
    Previous,
    GoTo(i64),
}

/// Everything one refresh cycle brings back.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub overview: OverviewResponse,
    pub meta: PageMeta,
    pub enrichments: Vec<EnrichmentRecord>,
    pub top_workspaces: Vec<WorkspaceRanking>,
}

pub struct Dashboard {
    client: ApiClient,
    filters: EnrichmentFilterParams,
    page: PageState,
    page_size: i64,
    snapshot: Option<DashboardSnapshot>,
    last_error: Option<String>,
}

impl Dashboard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            filters: EnrichmentFilterParams::default(),
            page: PageState::default(),
            page_size: DEFAULT_PAGE_SIZE,
            snapshot: None,
            last_error: None,
        }
    }

    pub fn with_filters(mut self, filters: EnrichmentFilterParams) -> Self {
        self.filters = filters;
        self
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetches the three sections concurrently; all or nothing.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let result = tokio::try_join!(
            self.client.get_overview(),
            self.client
                .get_enrichments(self.page.current_page(), self.page_size, &self.filters),
            self.client.get_top_workspaces(DEFAULT_TOP_WORKSPACES),
        );

        match result {
            Ok((overview, enrichments, top)) => {
                self.page.set_total_pages(enrichments.meta.total_pages);
                self.snapshot = Some(DashboardSnapshot {
                    overview,
                    meta: enrichments.meta,
                    enrichments: enrichments.data,
                    top_workspaces: top.data,
                });
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Dashboard refresh failed: {}", e);
                self.last_error = Some(format!(
                    "Erro ao carregar dados. Verifique se a API está rodando. ({})",
                    e
                ));
                Err(e)
            }
        }
    }

    /// Applies a navigation command; true when a refetch is needed.
    pub fn apply(&mut self, command: PageCommand) -> bool {
        match command {
            PageCommand::Next => self.page.next(),
            PageCommand::Previous => self.page.previous(),
            PageCommand::GoTo(page) => self.page.go_to(page),
        }
    }

    /// Text rendering of the current state.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(error) = &self.last_error {
            out.push_str(&format!("! {}\n", error));
        }

        let Some(snapshot) = &self.snapshot else {
            out.push_str("Carregando...\n");
            return out;
        };

        let kpis = &snapshot.overview.kpis;
        out.push_str(&format!(
            "Jobs: {} | Sucesso: {} ({}%) | Tempo médio: {} min | Contatos: {}\n",
            kpis.total_jobs,
            kpis.jobs_sucesso,
            kpis.percentual_sucesso,
            kpis.tempo_medio_minutos,
            kpis.total_contatos_processados
        ));

        for row in &snapshot.overview.distribuicao_status {
            out.push_str(&format!(
                "  status {:<12} {:>6} ({:.1}%)\n",
                row.status, row.quantidade, row.percentual
            ));
        }
        for row in &snapshot.overview.distribuicao_categoria {
            out.push_str(&format!(
                "  categoria {:<12} {:>6} ({:.1}%)\n",
                row.categoria, row.quantidade, row.percentual
            ));
        }

        out.push_str("Top workspaces:\n");
        for (position, ws) in snapshot.top_workspaces.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} {} jobs, {:.1}% sucesso\n",
                position + 1,
                ws.nome_workspace.as_deref().unwrap_or(&ws.id_workspace),
                ws.quantidade_jobs,
                ws.taxa_sucesso
            ));
        }

        out.push_str(&format!(
            "Enriquecimentos (página {} de {}, {} no total):\n",
            self.page.current_page(),
            self.page.total_pages(),
            snapshot.meta.total_items
        ));
        for record in &snapshot.enrichments {
            out.push_str(&format!(
                "  {} {} {} contatos {}\n",
                record.id_enriquecimento,
                record.id_workspace,
                record.total_contatos.unwrap_or(0),
                record.status_processamento
            ));
        }

        out
    }

    /// Polls until `shutdown` resolves.
    ///
    /// Ticks and page changes both trigger a refresh; a slow cycle delays the
    /// next tick rather than overlapping it.
    pub async fn run<S>(
        mut self,
        interval: Duration,
        mut commands: mpsc::Receiver<PageCommand>,
        shutdown: S,
    ) where
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                Some(command) = commands.recv() => {
                    if !self.apply(command) {
                        continue;
                    }
                }
                () = &mut shutdown => {
                    tracing::info!("Dashboard stopped");
                    return;
                }
            }

            // Errors are already recorded for rendering
            let _ = self.refresh().await;
            tracing::info!("\n{}", self.render());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_state_starts_at_one() {
        let state = PageState::default();
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_pages(), 1);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut state = PageState::default();
        state.set_total_pages(3);

        assert!(!state.previous());
        assert_eq!(state.current_page(), 1);

        assert!(state.next());
        assert!(state.next());
        assert!(!state.next());
        assert_eq!(state.current_page(), 3);

        assert!(state.go_to(-5));
        assert_eq!(state.current_page(), 1);
        assert!(state.go_to(99));
        assert_eq!(state.current_page(), 3);
    }

    #[test]
    fn zero_pages_still_allows_page_one() {
        let mut state = PageState::default();
        state.set_total_pages(0);
        assert_eq!(state.total_pages(), 1);
        assert!(!state.next());
    }

    #[test]
    fn shrinking_total_pulls_current_page_back() {
        let mut state = PageState::default();
        state.set_total_pages(10);
        state.go_to(8);

        state.set_total_pages(3);
        assert_eq!(state.current_page(), 3);
        assert!(!state.next());

        state.set_total_pages(0);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn render_before_first_fetch() {
        let client = ApiClient::new("http://localhost:3000", "k").unwrap();
        let dashboard = Dashboard::new(client);
        assert_eq!(dashboard.render(), "Carregando...\n");
    }
}

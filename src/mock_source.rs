//! Simulated upstream enrichment feed.
//!
//! Records are synthesized on every call and never persisted, so two calls
//! for the same page return different data. A [`ThrottlePolicy`] decides when
//! the feed pretends to be overloaded.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::errors::AppError;
use crate::models::{ContactType, Paginated, ProcessingStatus, SourceEnrichment};
use crate::pagination::{PageMeta, PageRequest};

/// Size of the simulated feed.
pub const TOTAL_ITEMS: i64 = 5000;
/// Page size when the caller does not ask for one.
pub const DEFAULT_LIMIT: i64 = 50;
/// Seconds suggested to a throttled caller.
pub const RETRY_AFTER_SECS: u64 = 5;
/// Throttle chance used when nothing is configured.
pub const DEFAULT_THROTTLE_PROBABILITY: f64 = 0.05;

const WORKSPACES: [(&str, &str); 10] = [
    ("WS001", "Workspace Alpha"),
    ("WS002", "Workspace Beta"),
    ("WS003", "Workspace Gamma"),
    ("WS004", "Workspace Delta"),
    ("WS005", "Workspace Epsilon"),
    ("WS006", "Workspace Zeta"),
    ("WS007", "Workspace Eta"),
    ("WS008", "Workspace Theta"),
    ("WS009", "Workspace Iota"),
    ("WS010", "Workspace Kappa"),
];

const CREATED_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;
const UPDATE_WINDOW_MS: i64 = 6 * 60 * 60 * 1000;

/// Decides whether a request to the simulated feed gets a 429.
pub trait ThrottlePolicy: Send + Sync {
    fn should_throttle(&self) -> bool;
}

/// Throttles with a fixed probability drawn from the thread RNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomThrottle {
    probability: f64,
}

impl RandomThrottle {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_PROBABILITY)
    }
}

impl ThrottlePolicy for RandomThrottle {
    fn should_throttle(&self) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverThrottle;

impl ThrottlePolicy for NeverThrottle {
    fn should_throttle(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysThrottle;

impl ThrottlePolicy for AlwaysThrottle {
    fn should_throttle(&self) -> bool {
        true
    }
}

/// Serves one page of the feed.
///
/// The throttle check runs first, then the page is validated against
/// `[1, ceil(TOTAL_ITEMS / limit)]`.
pub fn serve_page(
    policy: &dyn ThrottlePolicy,
    request: PageRequest,
) -> Result<Paginated<SourceEnrichment>, AppError> {
    if policy.should_throttle() {
        tracing::info!("Simulated source throttling page {}", request.page);
        return Err(AppError::Throttled {
            retry_after: RETRY_AFTER_SECS,
        });
    }

    let meta = PageMeta::new(request, TOTAL_ITEMS);
    if request.page < 1 || request.page > meta.total_pages {
        return Err(AppError::bad_request(
            "Página inválida",
            format!("Página deve estar entre 1 e {}", meta.total_pages),
        ));
    }

    let data = generate_page(&mut rand::thread_rng(), Utc::now(), request);
    Ok(Paginated { meta, data })
}

/// Builds `request.limit` records for `request.page`.
///
/// Workspace and status follow the absolute record index; everything else is
/// random.
pub fn generate_page<R: Rng>(
    rng: &mut R,
    now: DateTime<Utc>,
    request: PageRequest,
) -> Vec<SourceEnrichment> {
    let start = (request.page - 1) * request.limit;

    (0..request.limit)
        .map(|i| {
            let index = (start + i) as usize;
            let (id_workspace, nome_workspace) = WORKSPACES[index % WORKSPACES.len()];
            let status = ProcessingStatus::ALL[(index / 10) % ProcessingStatus::ALL.len()];
            let tipo_contato = ContactType::ALL[rng.gen_range(0..ContactType::ALL.len())];

            let data_criacao = now - Duration::milliseconds(rng.gen_range(0..CREATED_WINDOW_MS));
            let data_atualizacao =
                data_criacao + Duration::milliseconds(rng.gen_range(0..UPDATE_WINDOW_MS));

            SourceEnrichment {
                id_enriquecimento: uuid::Builder::from_random_bytes(rng.gen())
                    .into_uuid()
                    .to_string(),
                id_workspace: id_workspace.to_string(),
                nome_workspace: nome_workspace.to_string(),
                total_contatos: rng.gen_range(10..1510),
                tipo_contato,
                status_processamento: status,
                data_criacao,
                data_atualizacao,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use uuid::Uuid;

    #[test]
    fn always_throttle_yields_429() {
        let err = serve_page(&AlwaysThrottle, PageRequest { page: 1, limit: 50 }).unwrap_err();
        assert!(matches!(err, AppError::Throttled { retry_after: 5 }));
    }

    #[test]
    fn throttle_check_precedes_page_validation() {
        let err = serve_page(
            &AlwaysThrottle,
            PageRequest {
                page: 1_000_000,
                limit: 50,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Throttled { .. }));
    }

    #[test]
    fn page_outside_range_is_rejected() {
        let err = serve_page(
            &NeverThrottle,
            PageRequest {
                page: 1_000_000,
                limit: 50,
            },
        )
        .unwrap_err();
        match err {
            AppError::BadRequest { message, .. } => {
                assert_eq!(message, "Página deve estar entre 1 e 100")
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = serve_page(&NeverThrottle, PageRequest { page: -1, limit: 50 }).unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn last_page_is_valid() {
        let page = serve_page(&NeverThrottle, PageRequest { page: 100, limit: 50 }).unwrap();
        assert_eq!(page.data.len(), 50);
        assert!(!page.meta.has_next);
        assert!(page.meta.has_previous);
        assert_eq!(page.meta.total_items, TOTAL_ITEMS);
    }

    #[test]
    fn records_follow_index_layout() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let records = generate_page(&mut rng, now, PageRequest { page: 2, limit: 15 });

        assert_eq!(records.len(), 15);
        // index 15 -> workspace 5, status bucket 1
        assert_eq!(records[0].id_workspace, "WS006");
        assert_eq!(records[0].nome_workspace, "Workspace Zeta");
        assert_eq!(records[0].status_processamento, ProcessingStatus::Completed);
        // index 20 -> status bucket 2
        assert_eq!(records[5].status_processamento, ProcessingStatus::Failed);

        for record in &records {
            assert!((10..1510).contains(&record.total_contatos));
            assert!(record.data_criacao <= now);
            assert!(record.data_criacao >= now - Duration::days(7));
            assert!(record.data_atualizacao >= record.data_criacao);
            assert!(record.data_atualizacao - record.data_criacao < Duration::hours(6));
            assert!(Uuid::parse_str(&record.id_enriquecimento).is_ok());
        }
    }

    #[test]
    fn consecutive_calls_differ() {
        let request = PageRequest { page: 1, limit: 5 };
        let first = serve_page(&NeverThrottle, request).unwrap();
        let second = serve_page(&NeverThrottle, request).unwrap();
        assert_ne!(
            first.data[0].id_enriquecimento,
            second.data[0].id_enriquecimento
        );
    }

    #[test]
    fn random_throttle_extremes() {
        assert!(!RandomThrottle::new(0.0).should_throttle());
        assert!(RandomThrottle::new(1.0).should_throttle());
        assert_eq!(RandomThrottle::new(3.0).probability(), 1.0);
        assert_eq!(RandomThrottle::default().probability(), 0.05);
    }
}

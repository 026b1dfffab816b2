//! Optional filters of `GET /analytics/enrichments` and their SQL predicates.
//!
//! Every filter becomes one `AND <column> <op> $n` fragment with the value
//! bound as a parameter; user input is never spliced into the SQL text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlx::{Postgres, QueryBuilder};

use crate::errors::AppError;
use crate::models::AnalyticsQuery;

/// One active filter and its bound value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Workspace(String),
    Status(String),
    UpdatedFrom(NaiveDateTime),
    UpdatedUntil(NaiveDateTime),
}

impl Predicate {
    /// SQL text preceding the bound placeholder.
    pub fn fragment(&self) -> &'static str {
        match self {
            Predicate::Workspace(_) => "id_workspace = ",
            Predicate::Status(_) => "status_processamento = ",
            Predicate::UpdatedFrom(_) => "data_atualizacao_dw >= ",
            Predicate::UpdatedUntil(_) => "data_atualizacao_dw <= ",
        }
    }

    fn push_onto(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" AND ").push(self.fragment());
        match self {
            Predicate::Workspace(value) | Predicate::Status(value) => {
                builder.push_bind(value.clone());
            }
            Predicate::UpdatedFrom(ts) | Predicate::UpdatedUntil(ts) => {
                builder.push_bind(*ts);
            }
        }
    }
}

/// Conjunction of the filters present in a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentFilters {
    pub id_workspace: Option<String>,
    pub status_processamento: Option<String>,
    pub data_inicio: Option<NaiveDateTime>,
    pub data_fim: Option<NaiveDateTime>,
}

impl EnrichmentFilters {
    /// Reads the filters from a query string. Empty values count as absent;
    /// a date that does not parse is a 400.
    pub fn from_query(query: &AnalyticsQuery) -> Result<Self, AppError> {
        Ok(Self {
            id_workspace: non_empty(query.id_workspace.as_deref()),
            status_processamento: non_empty(query.status_processamento.as_deref()),
            data_inicio: non_empty(query.data_inicio.as_deref())
                .map(|raw| parse_bound("data_inicio", &raw))
                .transpose()?,
            data_fim: non_empty(query.data_fim.as_deref())
                .map(|raw| parse_bound("data_fim", &raw))
                .transpose()?,
        })
    }

    /// Active predicates in a fixed order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(ws) = &self.id_workspace {
            predicates.push(Predicate::Workspace(ws.clone()));
        }
        if let Some(status) = &self.status_processamento {
            predicates.push(Predicate::Status(status.clone()));
        }
        if let Some(from) = self.data_inicio {
            predicates.push(Predicate::UpdatedFrom(from));
        }
        if let Some(until) = self.data_fim {
            predicates.push(Predicate::UpdatedUntil(until));
        }
        predicates
    }

    /// Appends ` WHERE 1=1` and one bound predicate per active filter.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE 1=1");
        for predicate in self.predicates() {
            predicate.push_onto(builder);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts RFC 3339 (converted to UTC), `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM:SS` or a bare date (midnight).
pub fn parse_bound(field: &str, raw: &str) -> Result<NaiveDateTime, AppError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }

    Err(AppError::bad_request(
        "Data inválida",
        format!(
            "{} deve estar no formato YYYY-MM-DD ou ISO 8601, recebido '{}'",
            field, raw
        ),
    ))
}

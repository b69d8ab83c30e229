//! Anonymous page-view tracking and the dashboard's visitor summary.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::database::ListQuery;
use crate::error::{ApiError, LogOperation, VALIDATION_MESSAGE};
use crate::middleware::{ApiResponse, ApiResult, RequireSession, ValidJson};
use crate::models::Visit;

const TOP_PATHS: usize = 10;
const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Deserialize, Validate)]
pub struct VisitRequest {
    #[validate(length(min = 1, max = 500))]
    pub path: String,
    #[validate(length(max = 1000))]
    pub referrer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordedVisit {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathCount {
    pub path: String,
    pub visits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorStats {
    pub total_visits: usize,
    pub unique_visitors: usize,
    pub today_visits: usize,
    pub window_days: Option<i64>,
    pub top_paths: Vec<PathCount>,
}

/// First address in `X-Forwarded-For`, then `X-Real-IP`
fn client_ip(headers: &HeaderMap) -> String {
    ["x-forwarded-for", "x-real-ip"]
        .iter()
        .filter_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .filter_map(|v| v.split(',').next().map(str::trim))
        .find(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Salted SHA-256 of address and user agent, lowercase hex
pub fn visitor_hash(salt: &str, ip: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"|");
    hasher.update(ip.as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

/// Aggregate visits, optionally limited to the last `days` days
pub fn summarize(visits: &[Visit], now: DateTime<Utc>, days: Option<i64>) -> VisitorStats {
    let since = days.map(|d| now - Duration::days(d));
    let in_window: Vec<&Visit> = visits
        .iter()
        .filter(|v| since.map_or(true, |since| v.created_at >= since))
        .collect();

    let today = now.date_naive();
    let unique: HashSet<&str> = in_window.iter().map(|v| v.visitor_hash.as_str()).collect();

    let mut per_path: HashMap<&str, usize> = HashMap::new();
    for visit in &in_window {
        *per_path.entry(visit.path.as_str()).or_default() += 1;
    }
    let mut top_paths: Vec<PathCount> = per_path
        .into_iter()
        .map(|(path, visits)| PathCount {
            path: path.to_string(),
            visits,
        })
        .collect();
    top_paths.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.path.cmp(&b.path)));
    top_paths.truncate(TOP_PATHS);

    VisitorStats {
        total_visits: in_window.len(),
        unique_visitors: unique.len(),
        today_visits: in_window.iter().filter(|v| v.created_at.date_naive() == today).count(),
        window_days: days,
        top_paths,
    }
}

/// POST /api/visitors - open to anonymous callers
pub async fn record_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<VisitRequest>,
) -> ApiResult<RecordedVisit> {
    if !request.path.starts_with('/') {
        return Err(ApiError::validation(VALIDATION_MESSAGE)
            .with_field("path", "harus diawali '/'")
            .into());
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ip = client_ip(&headers);

    let visit = Visit {
        id: Uuid::new_v4(),
        path: request.path,
        visitor_hash: visitor_hash(&state.config.analytics.visitor_salt, &ip, user_agent.as_deref().unwrap_or("")),
        user_agent,
        referrer: request.referrer.filter(|r| !r.trim().is_empty()),
        created_at: Utc::now(),
    };

    let saved = state.stores.visits.create(&visit).await.log_operation("visitors.record")?;
    Ok(ApiResponse::created(RecordedVisit { id: saved.id }))
}

/// GET /api/visitors/stats?days=N
pub async fn stats(
    State(state): State<AppState>,
    _session: RequireSession,
    Query(query): Query<StatsQuery>,
) -> ApiResult<VisitorStats> {
    if let Some(days) = query.days {
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(ApiError::validation(VALIDATION_MESSAGE)
                .with_field("days", format!("harus angka 1 sampai {MAX_WINDOW_DAYS}"))
                .into());
        }
    }

    let visits = state
        .stores
        .visits
        .find_many(&ListQuery::new())
        .await
        .log_operation("visitors.stats")?;
    Ok(ApiResponse::success(summarize(&visits, Utc::now(), query.days)))
}

//! REST backend serving mock banking data from JSON files
//!
//! Every handler reads its collections fresh from disk. User-scoped routes
//! normalize the user id and answer 404 for unknown users and `[]` for known
//! users with nothing matching.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::StewardError;

pub mod accounts;
pub mod catalog;
pub mod financials;
pub mod goals;
pub mod meetings;
pub mod partners;
pub mod schedules;
pub mod store;
pub mod transactions;
pub mod users;

pub use store::{Collection, JsonStore};

/// Result type for axum handlers
pub type ApiResult<T> = std::result::Result<T, StewardError>;

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<JsonStore>,
    pub api_prefix: String,
}

/// =============================
/// Error Mapping
/// =============================

impl IntoResponse for StewardError {
    fn into_response(self) -> Response {
        let status = match &self {
            StewardError::NotFound(_) => StatusCode::NOT_FOUND,
            StewardError::Conflict(_) => StatusCode::CONFLICT,
            StewardError::BadRequest(_) | StewardError::InvalidToolInput(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Welcome to the AI Financial Steward API"
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(store: Arc<JsonStore>, api_prefix: &str) -> Router {
    let state = ApiState {
        store,
        api_prefix: api_prefix.to_string(),
    };

    let api = Router::new()
        .merge(users::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(financials::routes())
        .merge(goals::routes())
        .merge(partners::routes())
        .merge(schedules::routes())
        .merge(meetings::routes())
        .merge(catalog::routes());

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health));

    let router = if api_prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(api_prefix, api)
    };

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    db_dir: PathBuf,
    api_prefix: &str,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    info!(db_dir = %db_dir.display(), "Serving data directory");

    let router = create_router(Arc::new(JsonStore::new(db_dir)), api_prefix);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Backend listening on http://0.0.0.0:{}{}", port, api_prefix);
    info!("Local: http://127.0.0.1:{}{}", port, api_prefix);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Seeded data directory and request helpers shared by handler tests.

    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    pub struct TestBackend {
        pub dir: TempDir,
        pub router: Router,
    }

    fn days_ago(days: i64) -> String {
        (Utc::now() - Duration::days(days)).to_rfc3339()
    }

    pub fn seed(dir: &std::path::Path) {
        let files = [
            (
                "users.json",
                json!([
                    {
                        "user_id": "user-001",
                        "name": "Marcus Webb",
                        "age": 24,
                        "risk_tolerance": "moderate",
                        "credit_score": 710,
                        "financial_blurb": "Early career, building savings.",
                        "goals": ["Emergency fund"]
                    },
                    {
                        "user_id": "user-002",
                        "name": "Elena Rossi",
                        "age": 41,
                        "risk_tolerance": "low",
                        "credit_score": 640,
                        "financial_blurb": "Paying down debt.",
                        "goals": []
                    }
                ]),
            ),
            (
                "accounts.json",
                json!([
                    {"account_id": "acc-mw-c-001", "user_id": "user-001", "category": "asset", "type": "checking", "sub_type": "checking", "description": "Everyday", "balance": 2500.0},
                    {"account_id": "acc-mw-i-001", "user_id": "user-001", "category": "asset", "type": "investment", "sub_type": "brokerage", "description": "Brokerage", "balance": 12000.0, "holdings": [{"symbol": "GOOG", "value": 12000.0}]},
                    {"account_id": "acc-mw-d-001", "user_id": "user-001", "category": "liability", "type": "credit card", "sub_type": "credit card", "description": "Card", "balance": -1500.0, "interest_rate": 0.24}
                ]),
            ),
            (
                "transactions.json",
                json!([
                    {"transaction_id": "tx-1", "account_id": "acc-mw-c-001", "merchant_id": "m-1", "date": days_ago(2), "description": "Groceries", "amount": -120.0, "category": "groceries"},
                    {"transaction_id": "tx-2", "account_id": "acc-mw-c-001", "merchant_id": "m-2", "date": days_ago(10), "description": "Salary", "amount": 3000.0, "category": "income"},
                    {"transaction_id": "tx-3", "account_id": "acc-mw-d-001", "merchant_id": "m-3", "date": days_ago(60), "description": "Flight", "amount": -600.0, "category": "travel"},
                    {"transaction_id": "tx-4", "account_id": "acc-mw-c-001", "merchant_id": "m-4", "date": days_ago(200), "description": "Old", "amount": -50.0, "category": "other"},
                    {"transaction_id": "tx-5", "account_id": "acc-orphan", "merchant_id": "m-5", "date": days_ago(1), "description": "Orphan", "amount": -999.0, "category": "other"}
                ]),
            ),
            (
                "life_goals.json",
                json!([
                    {"goal_id": "goal-001", "user_id": "user-001", "description": "Emergency fund", "target_amount": 10000.0, "target_date": "2026-12-31", "current_amount_saved": 2500.0}
                ]),
            ),
            (
                "bank_partners.json",
                json!([
                    {"partner_id": "partner-1", "merchant_id": "m-9", "name": "Cymbal Air", "category": "travel", "benefit_type": "cashback", "benefit_value": 5.0},
                    {"partner_id": "partner-2", "merchant_id": "m-8", "name": "Cymbal Motors", "category": "auto", "benefit_type": "discount", "benefit_value": 2.5, "eligibility_criteria": {"minimum_credit_score": 700}}
                ]),
            ),
            (
                "advisors.json",
                json!([
                    {"advisor_id": "adv-001", "name": "John Smith", "advisor_type": "financial_planner", "availability": ["2025-12-20T10:00:00"]},
                    {"advisor_id": "adv-002", "name": "Ana Ortiz", "advisor_type": "tax_advisor", "availability": []}
                ]),
            ),
        ];

        for (name, body) in files {
            std::fs::write(dir.join(name), serde_json::to_vec_pretty(&body).unwrap()).unwrap();
        }
    }

    impl TestBackend {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            seed(dir.path());
            let router = create_router(Arc::new(JsonStore::new(dir.path())), "/api");
            Self { dir, router }
        }

        pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json");
            let request = match body {
                Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.call("GET", uri, None).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::TestBackend;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_root_and_health() {
        let backend = TestBackend::new();

        let (status, body) = backend.get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = backend.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_missing_file_maps_to_404_detail() {
        let backend = TestBackend::new();
        std::fs::remove_file(backend.dir.path().join("accounts.json")).unwrap();

        let (status, body) = backend.get("/api/users/user-001/networth").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "accounts.json not found");
    }

    #[tokio::test]
    async fn test_malformed_file_maps_to_500() {
        let backend = TestBackend::new();
        std::fs::write(backend.dir.path().join("users.json"), "{not json").unwrap();

        let (status, body) = backend.get("/api/users").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("users.json"));
    }
}

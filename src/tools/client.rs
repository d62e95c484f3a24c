//! Typed HTTP client for the steward backend
//!
//! Every method issues exactly one request and hands back the JSON body as
//! the backend sent it, error statuses included, so the model sees the
//! backend's own `detail` messages.

use crate::error::StewardError;
use crate::Result;
use reqwest::{Client, Method, Url};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct FinancialApi {
    client: Client,
    base_url: String,
    base: Url,
}

impl FinancialApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| {
            StewardError::ConfigError(format!("Invalid API_BASE_URL {}: {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(StewardError::ConfigError(format!(
                "API_BASE_URL cannot take a path: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            base,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url_for(segments);
        let path = url.path().to_string();
        debug!(%method, %url, "Calling backend");

        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            StewardError::ToolError(format!("Backend request failed for {}: {}", path, e))
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            StewardError::ToolError(format!("Failed to read backend response: {}", e))
        })?;

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(json!({ "status": status.as_u16() }));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            StewardError::ToolError(format!(
                "Backend returned non-JSON body ({}) for {}: {}",
                status, path, e
            ))
        })
    }

    async fn get(&self, segments: &[&str]) -> Result<Value> {
        self.request(Method::GET, segments, &[], None).await
    }

    //
    // ================= Users & Accounts =================
    //

    pub async fn get_user_profile(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id]).await
    }

    pub async fn get_user_accounts(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "accounts"]).await
    }

    pub async fn create_user_account(&self, user_id: &str, account: &Value) -> Result<Value> {
        self.request(
            Method::POST,
            &["users", user_id, "accounts"],
            &[],
            Some(account),
        )
        .await
    }

    pub async fn get_user_transactions(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "transactions"]).await
    }

    pub async fn get_user_transactions_with_history(
        &self,
        user_id: &str,
        history_days: i64,
    ) -> Result<Value> {
        self.request(
            Method::GET,
            &["users", user_id, "transactions"],
            &[("history", history_days.to_string())],
            None,
        )
        .await
    }

    pub async fn get_user_debts(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "debts"]).await
    }

    pub async fn get_user_investments(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "investments"]).await
    }

    pub async fn get_user_networth(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "networth"]).await
    }

    pub async fn get_user_cashflow(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "cashflow"]).await
    }

    pub async fn get_user_average_cashflow(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "average_cashflow"]).await
    }

    //
    // ================= Goals =================
    //

    pub async fn get_user_goals(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "goals"]).await
    }

    pub async fn create_user_goal(&self, goal: &Value) -> Result<Value> {
        self.request(Method::POST, &["goals"], &[], Some(goal)).await
    }

    pub async fn update_user_goal(&self, goal_id: &str, patch: &Value) -> Result<Value> {
        self.request(Method::PUT, &["goals", goal_id], &[], Some(patch))
            .await
    }

    pub async fn delete_user_goal(&self, goal_id: &str) -> Result<Value> {
        self.request(Method::DELETE, &["goals", goal_id], &[], None)
            .await
    }

    //
    // ================= Partners =================
    //

    pub async fn get_bank_partners(&self) -> Result<Value> {
        self.get(&["partners"]).await
    }

    pub async fn get_user_eligible_partners(&self, user_id: &str) -> Result<Value> {
        self.get(&["partners", "user", user_id]).await
    }

    //
    // ================= Schedules =================
    //

    pub async fn get_user_schedules(&self, user_id: &str) -> Result<Value> {
        self.get(&["users", user_id, "schedules"]).await
    }

    pub async fn create_user_schedule(&self, user_id: &str, schedule: &Value) -> Result<Value> {
        self.request(
            Method::POST,
            &["users", user_id, "schedules"],
            &[],
            Some(schedule),
        )
        .await
    }

    pub async fn update_user_schedule(&self, schedule_id: &str, patch: &Value) -> Result<Value> {
        self.request(
            Method::PUT,
            &["schedules", schedule_id],
            &[],
            Some(patch),
        )
        .await
    }

    pub async fn delete_user_schedule(&self, schedule_id: &str) -> Result<Value> {
        self.request(
            Method::DELETE,
            &["schedules", schedule_id],
            &[],
            None,
        )
        .await
    }

    //
    // ================= Advisors & Meetings =================
    //

    pub async fn get_all_advisors(&self) -> Result<Value> {
        self.get(&["advisors"]).await
    }

    pub async fn get_advisors_by_type(&self, advisor_type: &str) -> Result<Value> {
        self.get(&["advisors", advisor_type]).await
    }

    pub async fn schedule_meeting(&self, meeting: &Value) -> Result<Value> {
        self.request(Method::POST, &["meetings"], &[], Some(meeting))
            .await
    }

    pub async fn get_user_meetings(&self, user_id: &str) -> Result<Value> {
        self.get(&["meetings", user_id]).await
    }

    pub async fn cancel_meeting(&self, meeting_id: &str) -> Result<Value> {
        self.request(Method::DELETE, &["meetings", meeting_id], &[], None)
            .await
    }

    //
    // ================= Service Catalog =================
    //

    /// Route table from the backend's catalog.
    pub async fn get_all_endpoints(&self) -> Result<Value> {
        let catalog = self.get(&["openapi.json"]).await?;
        Ok(catalog.get("paths").cloned().unwrap_or_else(|| json!({})))
    }

    /// Record schemas from the backend's catalog.
    pub async fn get_all_data_schemas(&self) -> Result<Value> {
        let catalog = self.get(&["openapi.json"]).await?;
        Ok(catalog.get("components").cloned().unwrap_or_else(|| json!({})))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::backend::{create_router, JsonStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Seeded backend on an ephemeral port plus a client pointed at it.
    pub struct LiveBackend {
        pub dir: TempDir,
        pub api: FinancialApi,
    }

    impl LiveBackend {
        pub async fn start() -> Self {
            let dir = tempfile::tempdir().unwrap();
            crate::backend::test_support::seed(dir.path());

            let router = create_router(Arc::new(JsonStore::new(dir.path())), "/api");
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });

            let api = FinancialApi::new(
                &format!("http://{}/api/", addr),
                Duration::from_secs(5),
            )
            .unwrap();

            Self { dir, api }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::LiveBackend;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_success_bodies_are_returned_verbatim() {
        let live = LiveBackend::start().await;
        assert!(!live.api.base_url().ends_with('/'));

        let profile = tokio_test::assert_ok!(live.api.get_user_profile("user_001").await);
        assert_eq!(profile["user_id"], "user-001");
        assert_eq!(profile["net_worth"], 13000.0);

        let history = live
            .api
            .get_user_transactions_with_history("user-001", 0)
            .await
            .unwrap();
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_error_bodies_are_not_errors() {
        let live = LiveBackend::start().await;

        let missing = live.api.get_user_profile("user-999").await.unwrap();
        assert_eq!(missing, json!({"detail": "User not found"}));

        let missing_goal = live
            .api
            .update_user_goal("no-such-goal", &json!({"description": "x"}))
            .await
            .unwrap();
        assert_eq!(missing_goal["detail"], "Goal not found");
    }

    #[tokio::test]
    async fn test_empty_body_becomes_status_object() {
        let live = LiveBackend::start().await;

        let deleted = live.api.delete_user_goal("goal-001").await.unwrap();
        assert_eq!(deleted, json!({"status": 204}));
    }

    #[tokio::test]
    async fn test_ids_stay_inside_their_path_segment() {
        let live = LiveBackend::start().await;

        let deleted = live.api.delete_user_goal("goal-001?force=1").await.unwrap();
        assert_eq!(deleted, json!({"detail": "Goal not found"}));

        let deleted = live.api.delete_user_goal("goal-001/extra").await.unwrap();
        assert_eq!(deleted, json!({"detail": "Goal not found"}));

        let goals = live.api.get_user_goals("user-001").await.unwrap();
        assert_eq!(goals[0]["goal_id"], "goal-001");
    }

    #[test]
    fn test_base_url_must_be_hierarchical() {
        for base in ["not a url", "mailto:ops@example.com"] {
            assert!(super::FinancialApi::new(base, Duration::from_secs(1)).is_err());
        }
    }

    #[tokio::test]
    async fn test_catalog_helpers() {
        let live = LiveBackend::start().await;

        let endpoints = live.api.get_all_endpoints().await.unwrap();
        assert!(endpoints["/api/users/{user_id}/networth"]["get"].is_object());

        let schemas = live.api.get_all_data_schemas().await.unwrap();
        assert!(schemas["schemas"]["LifeGoal"].is_object());
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let api = super::FinancialApi::new("http://127.0.0.1:9", Duration::from_millis(500))
            .unwrap();
        assert!(api.get_bank_partners().await.is_err());
    }
}

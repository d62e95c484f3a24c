//! Tools describing the backend itself

use super::{parameters, FinancialApi, Tool, ToolInput, ToolOutput};
use crate::Result;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogQuery {
    Endpoints,
    DataSchemas,
}

impl CatalogQuery {
    pub const ALL: [CatalogQuery; 2] = [CatalogQuery::Endpoints, CatalogQuery::DataSchemas];

    pub fn name(self) -> &'static str {
        match self {
            CatalogQuery::Endpoints => "get_all_endpoints",
            CatalogQuery::DataSchemas => "get_all_data_schemas",
        }
    }
}

pub struct CatalogTool {
    query: CatalogQuery,
    api: FinancialApi,
}

impl CatalogTool {
    pub fn new(query: CatalogQuery, api: FinancialApi) -> Self {
        Self { query, api }
    }
}

#[async_trait::async_trait]
impl Tool for CatalogTool {
    fn name(&self) -> &'static str {
        self.query.name()
    }

    fn description(&self) -> &'static str {
        match self.query {
            CatalogQuery::Endpoints => "Lists every endpoint the banking backend serves.",
            CatalogQuery::DataSchemas => "Lists every data schema the banking backend defines.",
        }
    }

    fn parameters(&self) -> Value {
        parameters(json!({}), &[])
    }

    async fn execute(&self, _input: &ToolInput) -> Result<ToolOutput> {
        let data = match self.query {
            CatalogQuery::Endpoints => self.api.get_all_endpoints().await?,
            CatalogQuery::DataSchemas => self.api.get_all_data_schemas().await?,
        };
        Ok(ToolOutput::ok(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::client::test_support::LiveBackend;

    #[tokio::test]
    async fn test_endpoint_listing() {
        let live = LiveBackend::start().await;
        let tool = CatalogTool::new(CatalogQuery::Endpoints, live.api.clone());

        let output = tool
            .execute(&ToolInput {
                tool_name: tool.name().to_string(),
                parameters: json!({}),
            })
            .await
            .unwrap();

        assert!(output.data["/api/advisors/{advisor_type}"]["get"].is_object());
    }
}

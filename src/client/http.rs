// src/client/http.rs

//! REST implementation of [`Ga4Client`].
//!
//! Admin API calls go to `api.admin_base_url`, reports to
//! `api.data_base_url`. List calls follow `nextPageToken` until exhausted.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::Ga4Client;
use crate::error::{AppError, Result};
use crate::models::{
    Account, ApiConfig, AudienceDefinition, Property, ReportRequest, ReportResponse,
};
use crate::utils::http::create_async_client;

/// Google API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// GA4 client speaking the Admin and Data REST APIs.
#[derive(Clone)]
pub struct HttpGa4Client {
    client: Client,
    admin_base_url: String,
    data_base_url: String,
    access_token: String,
    page_size: u32,
}

impl HttpGa4Client {
    /// Create a client with an explicit access token.
    pub fn new(client: Client, config: &ApiConfig, access_token: impl Into<String>) -> Self {
        Self {
            client,
            admin_base_url: config.admin_base_url.trim_end_matches('/').to_string(),
            data_base_url: config.data_base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            page_size: config.page_size,
        }
    }

    /// Create a client reading the token from `api.access_token_env`.
    pub fn from_env(config: &ApiConfig) -> Result<Self> {
        let token = std::env::var(&config.access_token_env).map_err(|_| {
            AppError::config(format!(
                "access token variable {} is not set",
                config.access_token_env
            ))
        })?;
        let client = create_async_client(config)?;
        Ok(Self::new(client, config, token))
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/{}", self.admin_base_url, path)
    }

    fn data_url(&self, path: &str) -> String {
        format!("{}/{}", self.data_base_url, path)
    }

    /// Send an authorized request and map non-2xx statuses to errors.
    async fn send(&self, request: RequestBuilder, context: &str) -> Result<Response> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        Self::check(response, context).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = self.send(request, context).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{context}: {message}")));
        }
        Err(AppError::Api {
            status: status.as_u16(),
            message: format!("{context}: {message}"),
        })
    }

    /// Collect every page of a list call.
    async fn list_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        field: &str,
        context: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url)
                .query(query)
                .query(&[("pageSize", self.page_size.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let mut page: Value = self.send_json(request, context).await?;
            if let Some(values) = page.get_mut(field).map(Value::take) {
                items.extend(serde_json::from_value::<Vec<T>>(values)?);
            }

            page_token = page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl Ga4Client for HttpGa4Client {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.list_all(&self.admin_url("accounts"), &[], "accounts", "accounts")
            .await
    }

    async fn list_properties(&self, account: &str) -> Result<Vec<Property>> {
        let filter = format!("parent:{account}");
        self.list_all(
            &self.admin_url("properties"),
            &[("filter", filter)],
            "properties",
            account,
        )
        .await
    }

    async fn list_audiences(&self, property: &str) -> Result<Vec<AudienceDefinition>> {
        let url = self.admin_url(&format!("{property}/audiences"));
        self.list_all(&url, &[], "audiences", property).await
    }

    async fn get_audience(&self, name: &str) -> Result<AudienceDefinition> {
        let request = self.client.get(self.admin_url(name));
        self.send_json(request, name).await
    }

    async fn create_audience(
        &self,
        property: &str,
        audience: &AudienceDefinition,
    ) -> Result<AudienceDefinition> {
        let url = self.admin_url(&format!("{property}/audiences"));
        let request = self.client.post(url).json(audience);
        self.send_json(request, property).await
    }

    async fn update_audience(
        &self,
        audience: &AudienceDefinition,
        update_mask: &[String],
    ) -> Result<AudienceDefinition> {
        let name = audience
            .name
            .as_deref()
            .ok_or_else(|| AppError::validation("name", "update requires a resource name"))?;
        let request = self
            .client
            .patch(self.admin_url(name))
            .query(&[("updateMask", update_mask.join(","))])
            .json(audience);
        self.send_json(request, name).await
    }

    async fn archive_audience(&self, name: &str) -> Result<()> {
        let url = self.admin_url(&format!("{name}:archive"));
        let request = self.client.post(url).json(&serde_json::json!({}));
        self.send(request, name).await?;
        Ok(())
    }

    async fn run_report(&self, property: &str, request: &ReportRequest) -> Result<ReportResponse> {
        let url = self.data_url(&format!("{property}:runReport"));
        let builder = self.client.post(url).json(request);
        self.send_json(builder, property).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpGa4Client {
        let config = ApiConfig {
            admin_base_url: server.uri(),
            data_base_url: format!("{}/data", server.uri()),
            ..ApiConfig::default()
        };
        HttpGa4Client::new(Client::new(), &config, "test-token")
    }

    #[tokio::test]
    async fn test_list_accounts_follows_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts"))
            .and(header("authorization", "Bearer test-token"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accounts": [{ "name": "accounts/1", "displayName": "One" }],
                "nextPageToken": "page-2"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/accounts"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accounts": [{ "name": "accounts/2", "displayName": "Two" }]
            })))
            .mount(&server)
            .await;

        let accounts = client_for(&server).list_accounts().await.unwrap();
        let names: Vec<_> = accounts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["accounts/1", "accounts/2"]);
    }

    #[tokio::test]
    async fn test_list_properties_filters_by_parent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/properties"))
            .and(query_param("filter", "parent:accounts/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": [{ "name": "properties/123", "displayName": "Site", "parent": "accounts/9" }]
            })))
            .mount(&server)
            .await;

        let properties = client_for(&server)
            .list_properties("accounts/9")
            .await
            .unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].parent, "accounts/9");
    }

    #[tokio::test]
    async fn test_empty_list_has_no_field() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/properties/1/audiences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let audiences = client_for(&server)
            .list_audiences("properties/1")
            .await
            .unwrap();
        assert!(audiences.is_empty());
    }

    #[tokio::test]
    async fn test_create_audience_posts_definition() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/properties/1/audiences"))
            .and(body_partial_json(json!({
                "displayName": "Buyers",
                "membershipDurationDays": 30
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "properties/1/audiences/77",
                "displayName": "Buyers",
                "membershipDurationDays": 30,
                "filterClauses": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let audience = AudienceDefinition {
            name: None,
            display_name: "Buyers".into(),
            description: String::new(),
            membership_duration_days: 30,
            ads_personalization_enabled: None,
            exclusion_duration_mode: None,
            filter_clauses: Vec::new(),
            create_time: None,
        };

        let created = client_for(&server)
            .create_audience("properties/1", &audience)
            .await
            .unwrap();
        assert_eq!(created.audience_id(), Some("77"));
    }

    #[tokio::test]
    async fn test_update_audience_sends_mask() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/properties/1/audiences/77"))
            .and(query_param("updateMask", "displayName,description"))
            .and(body_partial_json(json!({ "displayName": "Renamed" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "properties/1/audiences/77",
                "displayName": "Renamed",
                "description": "new",
                "membershipDurationDays": 30
            })))
            .expect(1)
            .mount(&server)
            .await;

        let audience = AudienceDefinition {
            name: Some("properties/1/audiences/77".into()),
            display_name: "Renamed".into(),
            description: "new".into(),
            membership_duration_days: 30,
            ads_personalization_enabled: None,
            exclusion_duration_mode: None,
            filter_clauses: Vec::new(),
            create_time: None,
        };

        let updated = client_for(&server)
            .update_audience(&audience, &["displayName".into(), "description".into()])
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Renamed");
    }

    #[tokio::test]
    async fn test_archive_audience() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/properties/1/audiences/77:archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .archive_audience("properties/1/audiences/77")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_not_found_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/properties/404/audiences"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Property not found", "status": "NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_audiences("properties/404")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Property not found"));
    }

    #[tokio::test]
    async fn test_api_error_keeps_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/properties/1/audiences/2"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_audience("properties/1/audiences/2")
            .await
            .unwrap_err();
        match err {
            AppError::Api { status, message } => {
                assert_eq!(status, 429);
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_report_uses_data_api() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/data/properties/1:runReport"))
            .and(body_partial_json(json!({
                "dimensions": [{ "name": "audienceName" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dimensionHeaders": [{ "name": "audienceName" }],
                "metricHeaders": [{ "name": "activeUsers" }],
                "rows": [{
                    "dimensionValues": [{ "value": "Buyers" }],
                    "metricValues": [{ "value": "12" }]
                }],
                "rowCount": 1
            })))
            .mount(&server)
            .await;

        let report = client_for(&server)
            .run_report(
                "properties/1",
                &ReportRequest::audience_users("2025-01-01", "2025-01-15"),
            )
            .await
            .unwrap();
        assert_eq!(report.row_count, 1);
        assert_eq!(report.rows[0].metric_values[0].value, "12");
    }
}

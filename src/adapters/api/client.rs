//! HTTP implementation of the remote gateway
//!
//! Reads are retried with exponential backoff on transient failures. Writes
//! are sent once; a failed write is reconciled by the caller's resync.

use super::gateway::RemoteGateway;
use super::models::{
    DailyReportResponse, DepartmentFeedResponse, DeriveRequest, DeriveResponse, LoginResponse,
    PatientCreateRequest, PatientListResponse, PatientOut, VisitCreateRequest,
    VisitCreatedResponse,
};
use crate::config::{ApiConfig, RetryConfig, SecretString};
use crate::domain::{
    DailyReport, Department, DepartmentFilter, NationalId, NetworkError, PatientDetail, PatientId,
    Result, RoundsError, ScopeItem, Session, VisitId, VisitOps, VisitPatch,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Gateway talking to the Rounds API over HTTP
///
/// # Example
///
/// ```no_run
/// use rounds::adapters::api::HttpGateway;
/// use rounds::config::ApiConfig;
///
/// let gateway = HttpGateway::new(&ApiConfig::default(), 200).expect("valid config");
/// assert_eq!(gateway.base_url().as_str(), "http://localhost:8000/");
/// ```
pub struct HttpGateway {
    base_url: Url,
    client: Client,
    retry: RetryConfig,
    feed_limit: u32,
}

impl HttpGateway {
    /// Create a gateway from the API configuration
    ///
    /// `feed_limit` caps the number of visits requested for the department feed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ApiConfig, feed_limit: u32) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RoundsError::Configuration(format!("Invalid api.base_url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RoundsError::Configuration(format!(
                "api.base_url '{}' cannot be used as a base URL",
                config.base_url
            )));
        }

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the API client");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            RoundsError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url,
            client,
            retry: config.retry.clone(),
            feed_limit,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RoundsError::Configuration(format!(
                    "api.base_url '{}' cannot be used as a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, session.bearer())
    }

    /// Retry a request with exponential backoff
    ///
    /// Only transient network failures are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_attempts = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    let transient = matches!(&e, RoundsError::Network(net) if net.is_transient());
                    if !transient || attempt >= max_attempts {
                        return Err(e);
                    }

                    let delay_ms = (self.retry.initial_delay_ms as f64
                        * self.retry.backoff_multiplier.powf((attempt - 1) as f64))
                        as u64;
                    let delay_ms = delay_ms.min(self.retry.max_delay_ms);

                    crate::log_retry_attempt!(attempt, max_attempts, e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    /// GET a JSON body, retrying transient failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.retry_request(|| async {
            let request = self.authorized(self.client.get(url.clone()).query(query), session);
            let response = send(request).await?;
            decode(response).await
        })
        .await
    }

    async fn fetch_report_summary(
        &self,
        session: &Session,
        query: &[(&str, String)],
    ) -> Result<DailyReportResponse> {
        let url = self.endpoint(&["reports", "daily"])?;
        self.get_json(session, url, query).await
    }

    async fn fetch_department_feed(
        &self,
        session: &Session,
        query: &[(&str, String)],
    ) -> Result<DepartmentFeedResponse> {
        let url = self.endpoint(&["visits", "by_department"])?;
        let mut query = query.to_vec();
        query.push(("limit", self.feed_limit.to_string()));
        self.get_json(session, url, &query).await
    }
}

fn scope_query(day: NaiveDate, department: &DepartmentFilter) -> Vec<(&'static str, String)> {
    vec![
        ("department", department.as_query_value().to_string()),
        ("day", day.format(DAY_FORMAT).to_string()),
    ]
}

/// Send a request and turn non-2xx responses into [`NetworkError`]s
async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            NetworkError::Timeout(e.to_string())
        } else {
            NetworkError::ConnectionFailed(e.to_string())
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %body, "API request failed");
    Err(NetworkError::from_status(status.as_u16(), error_detail(&body)).into())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| NetworkError::InvalidResponse(e.to_string()).into())
}

async fn read_bytes(response: Response) -> Result<Vec<u8>> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Pull the `detail` message out of an error body when there is one
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn login(&self, username: &str, password: &SecretString) -> Result<Session> {
        let url = self.endpoint(&["auth", "login"])?;
        let username = username.trim().to_lowercase();
        let form = [
            ("username", username.as_str()),
            ("password", password.expose_secret().as_ref()),
        ];

        let response = match send(self.client.post(url).form(&form)).await {
            // The API answers bad credentials with 400
            Err(RoundsError::Network(NetworkError::ClientError {
                status: 400,
                message,
            })) => {
                return Err(NetworkError::Unauthorized {
                    status: 400,
                    message,
                }
                .into())
            }
            other => other?,
        };
        let body: LoginResponse = decode(response).await?;

        tracing::info!(username = %body.username, role = %body.role, "Signed in");
        Ok(Session::new(
            body.username,
            body.display_name,
            body.access_token,
            body.role,
        ))
    }

    async fn list_patients(
        &self,
        session: &Session,
        day: NaiveDate,
        department: &DepartmentFilter,
    ) -> Result<Vec<ScopeItem>> {
        let url = self.endpoint(&["patients", "list"])?;
        let body: PatientListResponse = self
            .get_json(session, url, &scope_query(day, department))
            .await?;
        tracing::debug!(
            day = %day,
            department = %department,
            count = body.items.len(),
            "Fetched patient list"
        );
        Ok(body.items)
    }

    async fn fetch_patient_visits(
        &self,
        session: &Session,
        patient_id: &PatientId,
        day: NaiveDate,
    ) -> Result<PatientDetail> {
        let url = self.endpoint(&["patients", patient_id.as_str(), "visits"])?;
        let query = [("day", day.format(DAY_FORMAT).to_string())];
        self.get_json(session, url, &query).await
    }

    async fn create_visit(
        &self,
        session: &Session,
        patient_id: &PatientId,
        text: &str,
        ops: VisitOps,
        department: &Department,
    ) -> Result<VisitId> {
        let url = self.endpoint(&["visits"])?;
        let body = VisitCreateRequest {
            patient_id,
            text,
            ops_drug: ops.drug,
            ops_test: ops.test,
            ops_consult: ops.consult,
            ops_critical: ops.critical,
            department: department.as_str(),
        };
        let response = send(self.authorized(self.client.post(url).json(&body), session)).await?;
        let created: VisitCreatedResponse = decode(response).await?;
        Ok(VisitId::Server(created.id))
    }

    async fn update_visit(
        &self,
        session: &Session,
        visit_id: i64,
        patch: &VisitPatch,
    ) -> Result<()> {
        let url = self.endpoint(&["visits", &visit_id.to_string()])?;
        send(self.authorized(self.client.put(url).json(patch), session)).await?;
        Ok(())
    }

    async fn delete_visit(&self, session: &Session, visit_id: i64) -> Result<()> {
        let url = self.endpoint(&["visits", &visit_id.to_string()])?;
        send(self.authorized(self.client.delete(url), session)).await?;
        Ok(())
    }

    async fn derive_and_create_patient(
        &self,
        session: &Session,
        national_id: &NationalId,
        label: &str,
    ) -> Result<PatientId> {
        let derive_url = self.endpoint(&["patients", "derive"])?;
        let response = send(self.authorized(
            self.client.post(derive_url).json(&DeriveRequest {
                tc: national_id.as_str(),
            }),
            session,
        ))
        .await?;
        let derived: DeriveResponse = decode(response).await?;

        let create_url = self.endpoint(&["patients"])?;
        let response = send(self.authorized(
            self.client.post(create_url).json(&PatientCreateRequest {
                patient_id: &derived.patient_id,
                label,
            }),
            session,
        ))
        .await?;
        let patient: PatientOut = decode(response).await?;
        Ok(patient.patient_id)
    }

    async fn fetch_daily_report(
        &self,
        session: &Session,
        day: NaiveDate,
        department: &DepartmentFilter,
    ) -> Result<DailyReport> {
        let query = scope_query(day, department);
        let (summary, feed) = futures::try_join!(
            self.fetch_report_summary(session, &query),
            self.fetch_department_feed(session, &query)
        )?;
        Ok(summary.with_feed(feed))
    }

    async fn download_report_pdf(
        &self,
        session: &Session,
        day: NaiveDate,
        department: &DepartmentFilter,
    ) -> Result<Vec<u8>> {
        let url = self.endpoint(&["reports", "daily_pdf"])?;
        let query = scope_query(day, department);
        self.retry_request(|| async {
            let request = self.authorized(self.client.get(url.clone()).query(&query), session);
            let response = send(request).await?;
            read_bytes(response).await
        })
        .await
    }
}

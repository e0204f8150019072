// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Connect client for fetching activities.
//!
//! Handles:
//! - SSO sign-in (CSRF token, credential post, service ticket)
//! - Session establishment on Connect via the ticket
//! - Activity list retrieval
//! - Rate limit detection

use crate::error::{AppError, Result};
use crate::models::GarminActivity;
use async_trait::async_trait;
use tokio::sync::OnceCell;

const SSO_URL: &str = "https://sso.garmin.com/sso";
const CONNECT_URL: &str = "https://connect.garmin.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Provider of raw activities.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch up to `limit` activities starting at `offset`, newest first.
    async fn fetch_activities(&self, offset: u32, limit: u32) -> Result<Vec<GarminActivity>>;
}

/// Garmin Connect API client.
///
/// Signs in lazily on the first request; the session lives in the client's
/// cookie store for the rest of the run.
pub struct GarminClient {
    http: reqwest::Client,
    sso_url: String,
    connect_url: String,
    email: String,
    password: String,
    session: OnceCell<()>,
}

impl GarminClient {
    /// Create a new Garmin client with account credentials.
    pub fn new(email: String, password: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Garmin(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            sso_url: SSO_URL.to_string(),
            connect_url: CONNECT_URL.to_string(),
            email,
            password,
            session: OnceCell::new(),
        })
    }

    /// Point the client at different SSO and Connect roots (local proxies, tests).
    pub fn with_endpoints(mut self, sso_url: impl Into<String>, connect_url: impl Into<String>) -> Self {
        self.sso_url = sso_url.into();
        self.connect_url = connect_url.into();
        self
    }

    /// Sign in through SSO and redeem the service ticket on Connect.
    async fn login(&self) -> Result<()> {
        let service = format!("{}/modern/", self.connect_url);
        let params = [
            ("service", service.as_str()),
            ("gauthHost", self.sso_url.as_str()),
            ("source", service.as_str()),
            ("redirectAfterAccountLoginUrl", service.as_str()),
            ("redirectAfterAccountCreationUrl", service.as_str()),
            ("clientId", "GarminConnect"),
            ("locale", "en_US"),
            ("embedWidget", "true"),
            ("consumeServiceTicket", "false"),
            ("generateExtraServiceTicket", "true"),
        ];
        let signin_url = format!("{}/signin", self.sso_url);

        // 1. Sign-in form carries the CSRF token
        let form = self
            .http
            .get(&signin_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::GarminAuth(e.to_string()))?;
        let form = check_response(form).await?.text().await.map_err(|e| AppError::GarminAuth(e.to_string()))?;

        let csrf = extract_between(&form, r#"name="_csrf" value=""#, "\"")
            .ok_or_else(|| AppError::GarminAuth("CSRF token not found on sign-in page".to_string()))?;

        // 2. Post credentials
        let response = self
            .http
            .post(&signin_url)
            .query(&params)
            .header("Referer", signin_url.as_str())
            .form(&[
                ("username", self.email.as_str()),
                ("password", self.password.as_str()),
                ("embed", "true"),
                ("_csrf", csrf),
            ])
            .send()
            .await
            .map_err(|e| AppError::GarminAuth(e.to_string()))?;
        let body = check_response(response).await?.text().await.map_err(|e| AppError::GarminAuth(e.to_string()))?;

        let ticket = extract_between(&body, "ticket=", "\"")
            .ok_or_else(|| AppError::GarminAuth("Sign-in rejected (no service ticket)".to_string()))?;

        // 3. Redeem ticket; the session cookies land in the cookie store
        let response = self
            .http
            .get(&service)
            .query(&[("ticket", ticket)])
            .send()
            .await
            .map_err(|e| AppError::GarminAuth(e.to_string()))?;
        check_response(response).await?;

        tracing::info!("Signed in to Garmin Connect");
        Ok(())
    }
}

#[async_trait]
impl ActivitySource for GarminClient {
    async fn fetch_activities(&self, offset: u32, limit: u32) -> Result<Vec<GarminActivity>> {
        self.session.get_or_try_init(|| self.login()).await?;

        let url = format!(
            "{}/activitylist-service/activities/search/activities",
            self.connect_url
        );
        let response = self
            .http
            .get(&url)
            .header("NK", "NT")
            .query(&[("start", offset), ("limit", limit)])
            .send()
            .await
            .map_err(|e| AppError::Garmin(e.to_string()))?;

        let activities: Vec<GarminActivity> = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Garmin(format!("JSON parse error: {}", e)))?;

        tracing::info!(offset, limit, count = activities.len(), "Fetched Garmin activities");
        Ok(activities)
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == 429 {
        tracing::warn!("Garmin rate limit hit (429)");
        return Err(AppError::Garmin(AppError::RATE_LIMITED.to_string()));
    }

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(AppError::GarminAuth(format!("HTTP {}", status)));
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Garmin(format!("HTTP {}: {}", status, body)))
}

/// Text between the first `start` marker and the following `end` marker.
fn extract_between<'a>(haystack: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = haystack.find(start)? + start.len();
    let len = haystack[from..].find(end)?;
    Some(&haystack[from..from + len]).filter(|s| !s.is_empty())
}

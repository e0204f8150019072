// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notion database client with typed activity operations.
//!
//! Provides:
//! - Filtered and full database queries (cursor paginated)
//! - Page creation under the activity database
//! - Page property and icon updates
//!
//! Property encoding and decoding are plain functions over `serde_json::Value`
//! so they can be tested without a network.

use crate::db::{properties, ActivityStore, RecordFilter};
use crate::error::{AppError, Result};
use crate::models::{ActivityFields, ActivityRecord, NaturalKey, StoredActivity, StoredFields};
use crate::time_utils::date_portion;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
/// Largest page size the query endpoint accepts.
const PAGE_SIZE: u32 = 100;

/// Notion database client.
#[derive(Clone)]
pub struct NotionDb {
    http: reqwest::Client,
    base_url: String,
    token: String,
    database_id: String,
}

impl NotionDb {
    /// Create a client for one activity database.
    pub fn new(token: String, database_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: NOTION_API.to_string(),
            token,
            database_id,
        }
    }

    /// Point the client at a different API root (local proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn query_page(&self, filter: Option<&Value>, cursor: Option<&str>) -> Result<QueryPage> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);

        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(filter) = filter {
            body["filter"] = filter.clone();
        }
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Notion(e.to_string()))?;

        check_response_json(response).await
    }

    async fn send_page(&self, request: reqwest::RequestBuilder, body: &Value) -> Result<StoredActivity> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Notion(e.to_string()))?;

        let page: Value = check_response_json(response).await?;
        decode_page(&page)
            .ok_or_else(|| AppError::Notion("Response is not a page object".to_string()))
    }
}

#[async_trait]
impl ActivityStore for NotionDb {
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredActivity>> {
        let filter_json = match filter {
            RecordFilter::All => None,
            RecordFilter::Key(key) => Some(key_filter(key)),
        };

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .query_page(filter_json.as_ref(), cursor.as_deref())
                .await?;
            records.extend(page.results.iter().filter_map(decode_page));

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(filter = ?filter, count = records.len(), "Queried Notion database");
        Ok(records)
    }

    async fn create(&self, record: &ActivityRecord) -> Result<StoredActivity> {
        let url = format!("{}/pages", self.base_url);
        let body = create_body(&self.database_id, record);
        self.send_page(self.http.post(&url), &body).await
    }

    async fn update(&self, id: &str, record: &ActivityRecord) -> Result<StoredActivity> {
        let url = format!("{}/pages/{}", self.base_url, id);
        let body = update_body(record);
        self.send_page(self.http.patch(&url), &body).await
    }
}

/// One page of database query results.
#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Notion rate limit hit (429)");
            return Err(AppError::Notion(AppError::RATE_LIMITED.to_string()));
        }

        return Err(AppError::Notion(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Notion(format!("JSON parse error: {}", e)))
}

// ─── Encoding ────────────────────────────────────────────────────────

/// Exact-match filter on the three natural key properties.
pub fn key_filter(key: &NaturalKey) -> Value {
    json!({
        "and": [
            { "property": properties::DATE, "date": { "equals": key.date.to_string() } },
            { "property": properties::ACTIVITY_TYPE, "select": { "equals": key.activity_type } },
            { "property": properties::ACTIVITY_NAME, "title": { "equals": key.activity_name } },
        ]
    })
}

/// Properties for the derived fields.
pub fn field_properties(fields: &ActivityFields) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(properties::DISTANCE_KM.into(), json!({ "number": fields.distance_km }));
    props.insert(properties::DURATION_MIN.into(), json!({ "number": fields.duration_min }));
    props.insert(properties::CALORIES.into(), json!({ "number": fields.calories }));
    props.insert(properties::AVG_PACE.into(), rich_text(&fields.avg_pace));
    props.insert(properties::TRAINING_EFFECT.into(), select(&fields.training_effect));
    props.insert(properties::AEROBIC.into(), json!({ "number": fields.aerobic }));
    props.insert(properties::AEROBIC_EFFECT.into(), select(&fields.aerobic_effect));
    props.insert(properties::ANAEROBIC.into(), json!({ "number": fields.anaerobic }));
    props.insert(properties::ANAEROBIC_EFFECT.into(), select(&fields.anaerobic_effect));
    props.insert(properties::PR.into(), json!({ "checkbox": fields.pr }));
    props
}

/// Request body for `POST /pages`.
pub fn create_body(database_id: &str, record: &ActivityRecord) -> Value {
    let mut props = field_properties(&record.fields);
    props.insert(properties::DATE.into(), json!({ "date": { "start": record.start } }));
    props.insert(properties::ACTIVITY_TYPE.into(), select(&record.key.activity_type));
    props.insert(
        properties::ACTIVITY_NAME.into(),
        json!({ "title": [{ "text": { "content": record.key.activity_name } }] }),
    );

    let mut body = json!({
        "parent": { "database_id": database_id },
        "properties": props,
    });
    if let Some(icon) = &record.icon {
        body["icon"] = external_icon(icon);
    }
    body
}

/// Request body for `PATCH /pages/{id}`.
///
/// The key properties are left untouched; they matched the lookup.
pub fn update_body(record: &ActivityRecord) -> Value {
    let mut body = json!({ "properties": field_properties(&record.fields) });
    if let Some(icon) = &record.icon {
        body["icon"] = external_icon(icon);
    }
    body
}

fn rich_text(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

fn select(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

fn external_icon(url: &str) -> Value {
    json!({ "type": "external", "external": { "url": url } })
}

// ─── Decoding ────────────────────────────────────────────────────────

/// Decode a page object. Returns `None` if it has no ID.
pub fn decode_page(page: &Value) -> Option<StoredActivity> {
    let id = page.get("id")?.as_str()?.to_string();
    let props = page.get("properties");
    let prop = |name: &str| props.and_then(|p| p.get(name));

    let key = decode_key(props);

    let fields = StoredFields {
        distance_km: number(prop(properties::DISTANCE_KM)),
        duration_min: number(prop(properties::DURATION_MIN)),
        calories: number(prop(properties::CALORIES)),
        avg_pace: text_content(prop(properties::AVG_PACE), "rich_text"),
        training_effect: select_name(prop(properties::TRAINING_EFFECT)),
        aerobic: number(prop(properties::AEROBIC)),
        aerobic_effect: select_name(prop(properties::AEROBIC_EFFECT)),
        anaerobic: number(prop(properties::ANAEROBIC)),
        anaerobic_effect: select_name(prop(properties::ANAEROBIC_EFFECT)),
        pr: prop(properties::PR)
            .and_then(|p| p.get("checkbox"))
            .and_then(Value::as_bool),
    };

    Some(StoredActivity { id, key, fields })
}

/// Natural key from the `Date`, `Activity Type`, and `Activity Name` properties.
fn decode_key(props: Option<&Value>) -> Option<NaturalKey> {
    let props = props?;
    let date = props
        .get(properties::DATE)?
        .get("date")?
        .get("start")?
        .as_str()
        .and_then(date_portion)?;
    Some(NaturalKey {
        date,
        activity_type: select_name(props.get(properties::ACTIVITY_TYPE))?,
        activity_name: text_content(props.get(properties::ACTIVITY_NAME), "title")?,
    })
}

fn number(prop: Option<&Value>) -> Option<f64> {
    prop?.get("number")?.as_f64()
}

fn select_name(prop: Option<&Value>) -> Option<String> {
    Some(prop?.get("select")?.get("name")?.as_str()?.to_string())
}

/// Concatenate the text runs of a `title` or `rich_text` property.
///
/// An empty run list decodes as the empty string, which is how an empty
/// pace is stored.
fn text_content(prop: Option<&Value>, kind: &str) -> Option<String> {
    let runs = prop?.get(kind)?.as_array()?;
    Some(
        runs.iter()
            .filter_map(|run| {
                run.get("plain_text")
                    .or_else(|| run.get("text").and_then(|t| t.get("content")))
                    .and_then(Value::as_str)
            })
            .collect(),
    )
}

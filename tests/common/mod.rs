// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use garmin_notion_sync::db::{ActivityStore, RecordFilter};
use garmin_notion_sync::error::{AppError, Result};
use garmin_notion_sync::models::{
    ActivityRecord, ActivityType, GarminActivity, StoredActivity, StoredFields,
};
use garmin_notion_sync::services::ActivitySource;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Activity source that serves a fixed list.
#[allow(dead_code)]
pub struct FixedSource {
    pub activities: Vec<GarminActivity>,
}

#[async_trait]
impl ActivitySource for FixedSource {
    async fn fetch_activities(&self, offset: u32, limit: u32) -> Result<Vec<GarminActivity>> {
        Ok(self
            .activities
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// A store call observed by [`MemoryStore`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum StoreOp {
    Query(RecordFilter),
    Create(ActivityRecord),
    Update(String, ActivityRecord),
}

#[derive(Default)]
struct MemoryState {
    pages: Vec<StoredActivity>,
    ops: Vec<StoreOp>,
    next_id: usize,
    fail_writes: bool,
}

/// In-memory activity store. Clones share state.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page directly, without recording an operation.
    pub fn insert_page(&self, page: StoredActivity) {
        self.state.lock().unwrap().pages.push(page);
    }

    pub fn pages(&self) -> Vec<StoredActivity> {
        self.state.lock().unwrap().pages.clone()
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Create and update operations only.
    pub fn writes(&self) -> Vec<StoreOp> {
        self.ops()
            .into_iter()
            .filter(|op| !matches!(op, StoreOp::Query(_)))
            .collect()
    }

    pub fn clear_ops(&self) {
        self.state.lock().unwrap().ops.clear();
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredActivity>> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(StoreOp::Query(filter.clone()));
        Ok(state
            .pages
            .iter()
            .filter(|page| match filter {
                RecordFilter::All => true,
                RecordFilter::Key(key) => page.key.as_ref() == Some(key),
            })
            .cloned()
            .collect())
    }

    async fn create(&self, record: &ActivityRecord) -> Result<StoredActivity> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(AppError::Notion("HTTP 502 Bad Gateway".to_string()));
        }
        state.ops.push(StoreOp::Create(record.clone()));
        state.next_id += 1;
        let page = StoredActivity {
            id: format!("page-{}", state.next_id),
            key: Some(record.key.clone()),
            fields: StoredFields::from(&record.fields),
        };
        state.pages.push(page.clone());
        Ok(page)
    }

    async fn update(&self, id: &str, record: &ActivityRecord) -> Result<StoredActivity> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(AppError::Notion("HTTP 502 Bad Gateway".to_string()));
        }
        state.ops.push(StoreOp::Update(id.to_string(), record.clone()));
        let page = state
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::Notion(format!("HTTP 404: page {} not found", id)))?;
        page.fields = StoredFields::from(&record.fields);
        Ok(page.clone())
    }
}

/// A morning run on 2024-05-01 with typical Garmin values.
#[allow(dead_code)]
pub fn morning_run() -> GarminActivity {
    GarminActivity {
        activity_id: Some(14_900_000_001),
        start_time_gmt: Some("2024-05-01 10:30:00".to_string()),
        activity_type: Some(ActivityType {
            type_key: Some("running".to_string()),
        }),
        activity_name: Some("Morning Run".to_string()),
        distance: Some(10234.0),
        duration: Some(2731.0),
        calories: Some(310.0),
        average_speed: Some(3.747),
        training_effect_label: Some("TEMPO".to_string()),
        aerobic_training_effect: Some(3.4),
        aerobic_training_effect_message: Some("IMPROVING_AEROBIC_BASE_8".to_string()),
        anaerobic_training_effect: Some(0.6),
        anaerobic_training_effect_message: Some("NO_ANAEROBIC_BENEFIT_1".to_string()),
        pr: Some(false),
    }
}

/// Activity with the given start, type key, and name; everything else default.
#[allow(dead_code)]
pub fn activity(start: &str, type_key: &str, name: &str) -> GarminActivity {
    GarminActivity {
        start_time_gmt: Some(start.to_string()),
        activity_type: Some(ActivityType {
            type_key: Some(type_key.to_string()),
        }),
        activity_name: Some(name.to_string()),
        ..GarminActivity::default()
    }
}

/// An HTTP request seen by [`CannedServer`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    /// Path including any query string
    pub path: String,
    pub body: String,
}

#[allow(dead_code)]
impl SeenRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// Local HTTP server that answers each connection with the next canned
/// `(status, body)` reply, then closes it.
#[allow(dead_code)]
pub struct CannedServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

#[allow(dead_code)]
impl CannedServer {
    pub async fn start(replies: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind local port");
        let addr = listener.local_addr().expect("local address");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        tokio::spawn(async move {
            for (status, body) in replies {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut socket).await;
                log.lock().unwrap().push(request);

                let reply = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason(status),
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            seen,
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[allow(dead_code)]
fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        429 => "Too Many Requests",
        _ => "Error",
    }
}

#[allow(dead_code)]
async fn read_request(socket: &mut TcpStream) -> SeenRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.split_whitespace();
    SeenRequest {
        method: request_line.next().unwrap_or_default().to_string(),
        path: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    }
}

//! Shared fixtures for catalog and view tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::{CatalogSource, FetchError, VideoId, VideoRecord};

/// Record whose timestamp is `day` days into 2024
pub fn record(id: u64, day: u32) -> VideoRecord {
    VideoRecord {
        id: VideoId(id),
        title: format!("Video {id}"),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day as i64),
        image_url: format!("https://img.example/{id}.jpg"),
        drive_url: format!("https://drive.example/{id}/preview"),
    }
}

/// Records with ids 1..=n, each a day newer than the last
pub fn catalog(n: u64) -> Vec<VideoRecord> {
    (1..=n).map(|id| record(id, id as u32)).collect()
}

/// Source that replays scripted responses, then keeps returning the last one
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<VideoRecord>, String>>>,
    last: Mutex<Result<Vec<VideoRecord>, String>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<Vec<VideoRecord>, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(Err("no scripted response".to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ok(records: Vec<VideoRecord>) -> Self {
        Self::new(vec![Ok(records)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_catalog(&self) -> Result<Vec<VideoRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self.responses.lock().unwrap().pop_front();
        let response = match next {
            Some(response) => {
                *self.last.lock().unwrap() = response.clone();
                response
            }
            None => self.last.lock().unwrap().clone(),
        };

        // a failing script entry surfaces as an unreadable body
        response.map_err(|_| {
            FetchError::Decode(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
        })
    }
}

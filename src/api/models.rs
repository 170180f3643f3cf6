//! Catalog API response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Numeric identifier of a video record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub u64);

/// Errors produced while reading a selection out of an address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("invalid video identifier: {0:?}")]
    InvalidIdentifier(String),
}

impl FromStr for VideoId {
    type Err = SelectionError;

    /// Only plain unsigned decimal text is accepted; no trimming, no partial parses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SelectionError::InvalidIdentifier(s.to_string()));
        }

        s.parse::<u64>()
            .map(VideoId)
            .map_err(|_| SelectionError::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Video from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    #[serde(rename = "Nombre")]
    pub title: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "driveURL")]
    pub drive_url: String,
}

/// Top-level catalog document
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub data: Option<Vec<VideoRecord>>,
}

impl CatalogResponse {
    /// Records carried by the response; a missing or null `data` is an empty catalog
    pub fn into_records(self) -> Vec<VideoRecord> {
        self.data.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id() {
        assert_eq!("42".parse::<VideoId>(), Ok(VideoId(42)));
        assert_eq!("0".parse::<VideoId>(), Ok(VideoId(0)));
    }

    #[test]
    fn test_reject_malformed_video_id() {
        for raw in ["", "abc", "2abc", " 2", "-1", "1.5", "99999999999999999999999"] {
            assert_eq!(
                raw.parse::<VideoId>(),
                Err(SelectionError::InvalidIdentifier(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_deserialize_catalog() {
        let json = r#"{
            "data": [
                {
                    "id": 7,
                    "Nombre": "Episodio 1",
                    "createdAt": "2024-01-15T10:30:00.000Z",
                    "imageURL": "https://img.example/7.jpg",
                    "driveURL": "https://drive.example/7/preview"
                }
            ]
        }"#;

        let response: CatalogResponse = serde_json::from_str(json).unwrap();
        let records = response.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, VideoId(7));
        assert_eq!(records[0].title, "Episodio 1");
        assert_eq!(records[0].created_at.to_rfc3339(), "2024-01-15T10:30:00+00:00");
        assert_eq!(records[0].drive_url, "https://drive.example/7/preview");
    }

    #[test]
    fn test_missing_data_is_empty_catalog() {
        let response: CatalogResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_records().is_empty());

        let response: CatalogResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(response.into_records().is_empty());
    }
}

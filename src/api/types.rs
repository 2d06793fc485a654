use serde::Serialize;

use crate::store::TableInfo;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub started_at: String,
    pub data_dir: String,
    pub movie_service: MovieServiceStatus,
    pub genre_cache_entries: usize,
    pub tables: Vec<TableInfo>,
}

#[derive(Debug, Serialize)]
pub struct MovieServiceStatus {
    pub base_url: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovieLinksDto {
    pub movie_id: i64,
    pub imdb_url: String,
    pub poster_url: String,
}

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

pub mod favorite;

pub use favorite::FavoriteEntry;

/// TMDB identifier of a movie or TV show
pub type ContentId = i64;

/// Kind of content a result refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment TMDB uses for this kind
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// A movie or TV show normalized from any provider endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultItem {
    pub content_id: ContentId,
    pub title: String,
    /// `None` renders as "unknown"
    pub release_year: Option<u16>,
    /// 0–10, `None` renders as "none"
    pub rating: Option<f64>,
    pub synopsis: Option<String>,
    pub poster_path: Option<String>,
    pub media_kind: MediaKind,
}

/// Derives a year from the first four characters of a provider date string.
///
/// Anything that does not start with four ASCII digits yields `None`.
pub fn release_year(date: Option<&str>) -> Option<u16> {
    let prefix = date?.get(..4)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Entry of a paged TMDB endpoint (`/search/multi`, `/movie/popular`, ...)
///
/// Movies carry `title`/`release_date`, TV shows `name`/`first_air_date`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListItem {
    #[serde(default)]
    pub id: Option<ContentId>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbListItem {
    /// Normalizes a list entry.
    ///
    /// `fallback_kind` applies when the endpoint does not tag entries with
    /// `media_type`. Entries tagged with anything other than movie/tv (people)
    /// and entries without an id are dropped.
    pub fn into_result_item(self, fallback_kind: MediaKind) -> Option<ResultItem> {
        let media_kind = match self.media_type.as_deref() {
            Some(tag) => MediaKind::from_path(tag)?,
            None => fallback_kind,
        };
        let content_id = self.id?;

        let title = non_empty(self.title)
            .or_else(|| non_empty(self.name))
            .unwrap_or_else(|| "Untitled".to_string());
        let date = non_empty(self.release_date).or_else(|| non_empty(self.first_air_date));

        Some(ResultItem {
            content_id,
            title,
            release_year: release_year(date.as_deref()),
            rating: self.vote_average,
            synopsis: non_empty(self.overview),
            poster_path: non_empty(self.poster_path),
            media_kind,
        })
    }
}

/// Parses the `results` array of a paged TMDB response.
///
/// Entries that fail to deserialize are skipped; a response without a
/// `results` array is a [`AppError::MalformedResponse`].
pub fn parse_result_page(
    body: &serde_json::Value,
    fallback_kind: MediaKind,
) -> AppResult<Vec<ResultItem>> {
    let results = body
        .get("results")
        .and_then(|r| r.as_array())
        .ok_or_else(|| AppError::MalformedResponse("missing `results` array".to_string()))?;

    Ok(results
        .iter()
        .filter_map(|entry| serde_json::from_value::<TmdbListItem>(entry.clone()).ok())
        .filter_map(|item| item.into_result_item(fallback_kind))
        .collect())
}

/// Flat object returned by `/movie/{id}` and `/tv/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetail {
    pub id: ContentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Provider-independent detail used when saving a favorite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDetail {
    pub content_id: ContentId,
    pub title: String,
    pub poster_path: Option<String>,
}

impl From<TmdbDetail> for ContentDetail {
    fn from(detail: TmdbDetail) -> Self {
        ContentDetail {
            content_id: detail.id,
            title: detail.display_title(),
            poster_path: non_empty(detail.poster_path),
        }
    }
}

impl TmdbDetail {
    pub fn display_title(&self) -> String {
        non_empty(self.title.clone())
            .or_else(|| non_empty(self.name.clone()))
            .unwrap_or_else(|| "Unknown title".to_string())
    }

    pub fn parse(body: serde_json::Value) -> AppResult<Self> {
        serde_json::from_value(body)
            .map_err(|e| AppError::MalformedResponse(format!("detail object: {}", e)))
    }
}

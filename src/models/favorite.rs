use serde::{Deserialize, Serialize};

use super::{ContentId, MediaKind, ResultItem};

/// A title a user bookmarked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct FavoriteEntry {
    /// Surrogate key assigned by the database
    pub id: i64,
    #[sqlx(rename = "user_id")]
    pub owner_user_id: i64,
    #[sqlx(rename = "movie_id")]
    pub content_id: ContentId,
    pub title: String,
    pub poster_path: Option<String>,
}

impl From<FavoriteEntry> for ResultItem {
    /// Favorites only keep id, title and poster; everything else renders as unknown.
    fn from(entry: FavoriteEntry) -> Self {
        ResultItem {
            content_id: entry.content_id,
            title: entry.title,
            release_year: None,
            rating: None,
            synopsis: None,
            poster_path: entry.poster_path.filter(|p| !p.is_empty()),
            media_kind: MediaKind::Movie,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_to_result_item() {
        let entry = FavoriteEntry {
            id: 1,
            owner_user_id: 42,
            content_id: 27205,
            title: "Inception".to_string(),
            poster_path: Some(String::new()),
        };

        let item: ResultItem = entry.into();
        assert_eq!(item.content_id, 27205);
        assert_eq!(item.title, "Inception");
        assert_eq!(item.rating, None);
        assert_eq!(item.poster_path, None);
    }
}

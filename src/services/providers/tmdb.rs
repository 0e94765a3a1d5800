/// TMDB v3 provider
///
/// Endpoints:
/// - `/search/multi` for free-text search (movies, TV shows and people)
/// - `/movie/popular`, `/tv/popular` for recommendations and random picks
/// - `/movie/{id}/similar` for "show similar"
/// - `/movie/{id}`, `/tv/{id}` for favorite details
///
/// Every request goes through the [`ResilientFetcher`].
use rand::Rng;
use reqwest::Url;

use crate::{
    error::{AppError, AppResult},
    models::{parse_result_page, ContentDetail, ContentId, MediaKind, ResultItem, TmdbDetail},
    services::{fetcher::ResilientFetcher, providers::MetadataProvider},
};

/// TMDB serves at most 500 pages of any list
const MAX_RANDOM_PAGE: u32 = 500;

#[derive(Clone)]
pub struct TmdbProvider {
    fetcher: ResilientFetcher,
    api_key: String,
    api_url: String,
    language: String,
}

impl TmdbProvider {
    pub fn new(fetcher: ResilientFetcher, api_key: String, api_url: String, language: String) -> Self {
        Self {
            fetcher,
            api_key,
            api_url,
            language,
        }
    }

    /// Builds an endpoint URL with the key, locale and extra query params encoded
    fn url(&self, path: &str, extra: &[(&str, &str)]) -> AppResult<Url> {
        let mut params = vec![
            ("api_key", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        params.extend_from_slice(extra);

        Url::parse_with_params(&format!("{}{}", self.api_url.trim_end_matches('/'), path), &params)
            .map_err(|e| AppError::InvalidInput(format!("Invalid TMDB URL for {}: {}", path, e)))
    }

    async fn fetch_page(&self, url: Url, fallback_kind: MediaKind) -> AppResult<Vec<ResultItem>> {
        let body = self.fetcher.fetch(url.as_str()).await?;
        parse_result_page(&body, fallback_kind)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search(&self, query: &str) -> AppResult<Vec<ResultItem>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let url = self.url("/search/multi", &[("query", query.trim()), ("page", "1")])?;
        // `media_type` is always present here, the fallback only matters for odd entries
        let items = self.fetch_page(url, MediaKind::Movie).await?;

        tracing::info!(
            query = %query,
            results = items.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(items)
    }

    async fn popular(&self, kind: MediaKind) -> AppResult<Vec<ResultItem>> {
        let url = self.url(&format!("/{}/popular", kind.as_path()), &[("page", "1")])?;
        let items = self.fetch_page(url, kind).await?;

        tracing::info!(kind = %kind, results = items.len(), provider = "tmdb", "Popular list fetched");

        Ok(items)
    }

    async fn similar(&self, content_id: ContentId) -> AppResult<Vec<ResultItem>> {
        let url = self.url(&format!("/movie/{}/similar", content_id), &[("page", "1")])?;
        let items = self.fetch_page(url, MediaKind::Movie).await?;

        tracing::info!(content_id, results = items.len(), provider = "tmdb", "Similar titles fetched");

        Ok(items)
    }

    async fn detail(&self, kind: MediaKind, content_id: ContentId) -> AppResult<ContentDetail> {
        let url = self.url(&format!("/{}/{}", kind.as_path(), content_id), &[])?;
        let body = self.fetcher.fetch(url.as_str()).await?;
        Ok(TmdbDetail::parse(body)?.into())
    }

    async fn random(&self, kind: MediaKind) -> AppResult<Option<ResultItem>> {
        let page = rand::thread_rng().gen_range(1..=MAX_RANDOM_PAGE).to_string();
        let url = self.url(&format!("/{}/popular", kind.as_path()), &[("page", page.as_str())])?;
        let mut items = self.fetch_page(url, kind).await?;

        if items.is_empty() {
            return Ok(None);
        }
        let pick = rand::thread_rng().gen_range(0..items.len());

        tracing::debug!(kind = %kind, page = %page, "Random pick");

        Ok(Some(items.swap_remove(pick)))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, TransportError};
    use crate::services::fetcher::{MockHttpTransport, RawResponse, RetryPolicy};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Provider over a mock that answers every request with `body` and records URLs
    fn create_test_provider(status: u16, body: &'static str) -> (TmdbProvider, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();

        let mut mock = MockHttpTransport::new();
        mock.expect_get().returning(move |url| {
            recorder.lock().unwrap().push(url.to_string());
            Ok::<_, TransportError>(RawResponse {
                status,
                retry_after: None,
                body: body.to_string(),
            })
        });

        let fetcher = ResilientFetcher::new(
            Arc::new(mock),
            RetryPolicy {
                max_retries: 3,
                retry_delay: Duration::from_millis(1),
            },
        );
        let provider = TmdbProvider::new(
            fetcher,
            "test_key".to_string(),
            "http://tmdb.test/3".to_string(),
            "ru-RU".to_string(),
        );

        (provider, seen)
    }

    #[tokio::test]
    async fn test_search_encodes_query_and_filters_people() {
        let (provider, seen) = create_test_provider(
            200,
            r#"{"results": [
                {"id": 1, "media_type": "movie", "title": "Dune"},
                {"id": 2, "media_type": "person", "name": "Denis Villeneuve"},
                {"id": 3, "media_type": "tv", "name": "Dune: Prophecy"}
            ]}"#,
        );

        let items = provider.search("dune & co").await.unwrap();

        assert_eq!(items.iter().map(|i| i.content_id).collect::<Vec<_>>(), vec![1, 3]);
        let url = seen.lock().unwrap()[0].clone();
        assert!(url.starts_with("http://tmdb.test/3/search/multi?"));
        assert!(url.contains("api_key=test_key"));
        assert!(url.contains("language=ru-RU"));
        assert!(url.contains("query=dune+%26+co"));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let (provider, seen) = create_test_provider(200, "{}");

        let result = provider.search("   ").await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_popular_tv_uses_tv_endpoint_and_kind() {
        let (provider, seen) = create_test_provider(200, r#"{"results": [{"id": 1399, "name": "Game of Thrones"}]}"#);

        let items = provider.popular(MediaKind::Tv).await.unwrap();

        assert_eq!(items[0].media_kind, MediaKind::Tv);
        assert!(seen.lock().unwrap()[0].contains("/tv/popular?"));
    }

    #[tokio::test]
    async fn test_similar_uses_movie_endpoint() {
        let (provider, seen) = create_test_provider(200, r#"{"results": []}"#);

        let items = provider.similar(27205).await.unwrap();

        assert!(items.is_empty());
        assert!(seen.lock().unwrap()[0].contains("/movie/27205/similar?"));
    }

    #[tokio::test]
    async fn test_detail_for_tv_show() {
        let (provider, seen) =
            create_test_provider(200, r#"{"id": 1396, "name": "Breaking Bad", "poster_path": "/bb.jpg"}"#);

        let detail = provider.detail(MediaKind::Tv, 1396).await.unwrap();

        assert_eq!(detail.title, "Breaking Bad");
        assert_eq!(detail.poster_path.as_deref(), Some("/bb.jpg"));
        assert!(seen.lock().unwrap()[0].contains("/tv/1396?"));
    }

    #[tokio::test]
    async fn test_random_picks_from_page() {
        let (provider, seen) = create_test_provider(200, r#"{"results": [{"id": 10, "title": "Only"}]}"#);

        let item = provider.random(MediaKind::Movie).await.unwrap();

        assert_eq!(item.map(|i| i.content_id), Some(10));
        let url = seen.lock().unwrap()[0].clone();
        assert!(url.contains("/movie/popular?"));
        assert!(url.contains("page="));
    }

    #[tokio::test]
    async fn test_random_on_empty_page_is_none() {
        let (provider, _) = create_test_provider(200, r#"{"results": []}"#);
        assert_eq!(provider.random(MediaKind::Tv).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_surfaces_as_fetch_error() {
        let (provider, _) = create_test_provider(401, r#"{"status_code": 7}"#);

        let result = provider.popular(MediaKind::Movie).await;

        assert!(matches!(result, Err(AppError::Fetch(FetchError::Status(401)))));
    }
}

/// Movie/TV metadata source
///
/// The bot talks to exactly one provider (TMDB). The trait is the seam the
/// conversation controller is tested against.
use crate::{
    error::AppResult,
    models::{ContentDetail, ContentId, MediaKind, ResultItem},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Multi-type search; people are filtered out, provider order is kept
    async fn search(&self, query: &str) -> AppResult<Vec<ResultItem>>;

    /// First page of the provider's popular list for `kind`
    async fn popular(&self, kind: MediaKind) -> AppResult<Vec<ResultItem>>;

    /// First page of movies similar to `content_id`
    async fn similar(&self, content_id: ContentId) -> AppResult<Vec<ResultItem>>;

    /// Title and poster for saving a favorite
    async fn detail(&self, kind: MediaKind, content_id: ContentId) -> AppResult<ContentDetail>;

    /// One random entry from a random page of the popular list
    async fn random(&self, kind: MediaKind) -> AppResult<Option<ResultItem>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

pub mod fetcher;
pub mod pagination;
pub mod providers;
pub mod render;

pub use fetcher::{HttpTransport, ReqwestTransport, ResilientFetcher, RetryPolicy};
pub use pagination::{BrowseKind, BrowseSession};
pub use providers::{MetadataProvider, TmdbProvider};
pub use render::{Action, DisplayPayload, Renderer};

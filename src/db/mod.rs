pub mod favorites;
pub mod sqlite;

pub use favorites::{AddOutcome, DuplicatePolicy, FavoritesStore};
pub use sqlite::create_pool;

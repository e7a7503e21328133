// Infrastructure - persistence and request plumbing
pub mod database; // Store interface and query types
pub mod middleware; // Viewer context middleware and extractor
pub mod sqlite_database; // SQLite store
pub mod viewer; // Viewer context

pub use database::{CommentPage, CommentQuery, CommentStore, Page};
pub use sqlite_database::SqliteDatabase;
pub use viewer::ViewerContext;

mod follow_repository;
mod post_repository;
mod story_repository;

pub use follow_repository::FollowRepository;
pub use post_repository::PostRepository;
pub use story_repository::StoryRepository;

use rusqlite::Row;
use uuid::Uuid;

/// Read a TEXT column holding a UUID
pub(crate) fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

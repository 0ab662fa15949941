use anyhow::{Context, Result};
use socialseed_types::{EntityKind, OwnerStories, UserFollowCounts};
use uuid::Uuid;

use super::repositories::{FollowRepository, PostRepository, StoryRepository};
use super::rows::TableRow;
use super::Database;

/// The relational sink the loader writes into.
///
/// Writes are chunked by the caller; each `insert_chunk` call must either
/// commit every row or none.
pub trait SeedStore {
    /// Insert one chunk of rows atomically, returning the rows written
    fn insert_chunk<R: TableRow>(&self, rows: &[R]) -> Result<usize>;

    /// Recompute users.followers_count / following_count from follows
    fn reconcile_follow_counts(&self) -> Result<usize>;

    /// Recompute posts.likes_count from post_likes
    fn reconcile_like_counts(&self) -> Result<usize>;

    /// Stored counters: id, following_count, followers_count
    fn users_with_follow_counts(&self) -> Result<Vec<UserFollowCounts>>;

    /// Counters derived from the follows table
    fn materialized_follow_counts(&self) -> Result<Vec<UserFollowCounts>>;

    /// Stories grouped by owner
    fn stories_by_owner(&self) -> Result<Vec<OwnerStories>>;

    fn followers_of(&self, user_id: &Uuid) -> Result<Vec<Uuid>>;

    fn story_viewers(&self, story_id: &Uuid) -> Result<Vec<Uuid>>;
}

/// SQLite-backed store
pub struct SqliteStore {
    db: Database,
    follows: FollowRepository,
    posts: PostRepository,
    stories: StoryRepository,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        let pool = db.pool.clone();
        Self {
            follows: FollowRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            stories: StoryRepository::new(pool),
            db,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Stored vs materialized like counts per post
    pub fn like_counts(&self) -> Result<Vec<(i64, i64, i64)>> {
        self.posts.like_counts()
    }

    /// Row count of every entity table
    pub fn table_counts(&self) -> Result<Vec<(EntityKind, i64)>> {
        let conn = self.db.connection()?;
        EntityKind::ALL
            .iter()
            .map(|kind| {
                let count: i64 = conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", kind.as_str()), [], |row| row.get(0))
                    .with_context(|| format!("Failed to count {}", kind))?;
                Ok::<_, anyhow::Error>((*kind, count))
            })
            .collect()
    }
}

impl SeedStore for SqliteStore {
    fn insert_chunk<R: TableRow>(&self, rows: &[R]) -> Result<usize> {
        let mut conn = self.db.connection()?;
        let tx = conn
            .transaction()
            .with_context(|| format!("Failed to open transaction for {}", R::KIND))?;

        let mut written = 0;
        {
            let mut stmt = tx
                .prepare_cached(R::INSERT_SQL)
                .with_context(|| format!("Failed to prepare insert into {}", R::KIND))?;
            for row in rows {
                written += row
                    .insert(&mut stmt)
                    .with_context(|| format!("Failed to insert row into {}", R::KIND))?;
            }
        }

        tx.commit()
            .with_context(|| format!("Failed to commit chunk into {}", R::KIND))?;
        Ok(written)
    }

    fn reconcile_follow_counts(&self) -> Result<usize> {
        self.follows.reconcile_follow_counts()
    }

    fn reconcile_like_counts(&self) -> Result<usize> {
        self.posts.reconcile_like_counts()
    }

    fn users_with_follow_counts(&self) -> Result<Vec<UserFollowCounts>> {
        self.follows.users_with_follow_counts()
    }

    fn materialized_follow_counts(&self) -> Result<Vec<UserFollowCounts>> {
        self.follows.materialized_follow_counts()
    }

    fn stories_by_owner(&self) -> Result<Vec<OwnerStories>> {
        self.stories.stories_by_owner()
    }

    fn followers_of(&self, user_id: &Uuid) -> Result<Vec<Uuid>> {
        self.follows.get_followers(user_id)
    }

    fn story_viewers(&self, story_id: &Uuid) -> Result<Vec<Uuid>> {
        self.stories.get_viewers(story_id)
    }
}

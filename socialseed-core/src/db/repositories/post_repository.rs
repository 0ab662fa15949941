use anyhow::{Context, Result};

use crate::db::DbPool;

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// (post id, stored likes_count, rows in post_likes) for every post
    pub fn like_counts(&self) -> Result<Vec<(i64, i64, i64)>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.likes_count,
                    (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id)
             FROM posts p
             ORDER BY p.id",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// Overwrite each post's likes_count with its row count in post_likes.
    /// Returns the number of posts updated.
    pub fn reconcile_like_counts(&self) -> Result<usize> {
        let counts = self.like_counts()?;

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare("UPDATE posts SET likes_count = ?1 WHERE id = ?2")?;
            for (post_id, _, materialized) in &counts {
                updated += stmt
                    .execute((materialized, post_id))
                    .with_context(|| format!("Failed to reconcile likes for post {}", post_id))?;
            }
        }
        tx.commit().context("Failed to commit like count reconciliation")?;

        Ok(updated)
    }
}

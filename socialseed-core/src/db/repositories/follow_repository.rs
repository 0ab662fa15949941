use anyhow::{Context, Result};
use socialseed_types::UserFollowCounts;
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get list of users that follow this user, in insertion order
    pub fn get_followers(&self, user_id: &Uuid) -> Result<Vec<Uuid>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT follower_id FROM follows WHERE following_id = ? ORDER BY rowid",
        )?;

        let followers = stmt
            .query_map([user_id.to_string()], |row| parse_uuid(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(followers)
    }

    /// The denormalized counters as currently stored on each user
    pub fn users_with_follow_counts(&self) -> Result<Vec<UserFollowCounts>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT id, following_count, followers_count FROM users ORDER BY id")?;

        let users = stmt
            .query_map([], |row| {
                Ok(UserFollowCounts {
                    user_id: parse_uuid(row, 0)?,
                    following_count: row.get(1)?,
                    followers_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Counts derived from the follows table itself
    pub fn materialized_follow_counts(&self) -> Result<Vec<UserFollowCounts>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id,
                    (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id),
                    (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id)
             FROM users u
             ORDER BY u.id",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(UserFollowCounts {
                    user_id: parse_uuid(row, 0)?,
                    following_count: row.get(1)?,
                    followers_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// Overwrite every user's follow counters with the materialized totals.
    /// Returns the number of users updated.
    pub fn reconcile_follow_counts(&self) -> Result<usize> {
        let counts = self.materialized_follow_counts()?;

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE users SET following_count = ?1, followers_count = ?2 WHERE id = ?3",
            )?;
            for user in &counts {
                updated += stmt
                    .execute((
                        user.following_count,
                        user.followers_count,
                        user.user_id.to_string(),
                    ))
                    .with_context(|| format!("Failed to reconcile follow counts for {}", user.user_id))?;
            }
        }
        tx.commit().context("Failed to commit follow count reconciliation")?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn insert_user(db: &Database, id: &Uuid, name: &str, following: i64, followers: i64) {
        let conn = db.connection().expect("Failed to get connection");
        conn.execute(
            "INSERT INTO users (id, username, following_count, followers_count, created_at) VALUES (?, ?, ?, ?, ?)",
            (id.to_string(), name, following, followers, "2024-01-01T00:00:00Z"),
        )
        .expect("Failed to insert user");
    }

    fn follow(db: &Database, follower: &Uuid, following: &Uuid) {
        let conn = db.connection().expect("Failed to get connection");
        conn.execute(
            "INSERT INTO follows (follower_id, following_id) VALUES (?, ?)",
            (follower.to_string(), following.to_string()),
        )
        .expect("Failed to insert follow");
    }

    fn setup() -> (Database, FollowRepository, Vec<Uuid>) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            insert_user(&db, id, &format!("user{}", i), 50, 50);
        }
        let repo = FollowRepository::new(db.pool.clone());
        (db, repo, ids)
    }

    #[test]
    fn test_followers_in_insertion_order() {
        let (db, repo, ids) = setup();
        follow(&db, &ids[2], &ids[0]);
        follow(&db, &ids[1], &ids[0]);

        let followers = repo.get_followers(&ids[0]).expect("Failed to get followers");
        assert_eq!(followers, vec![ids[2], ids[1]]);
    }

    #[test]
    fn test_reconcile_overwrites_targets() {
        let (db, repo, ids) = setup();
        follow(&db, &ids[0], &ids[1]);
        follow(&db, &ids[2], &ids[1]);
        follow(&db, &ids[1], &ids[0]);

        let updated = repo.reconcile_follow_counts().expect("Failed to reconcile");
        assert_eq!(updated, 3);

        let stored = repo.users_with_follow_counts().expect("Failed to read counts");
        let materialized = repo.materialized_follow_counts().expect("Failed to count edges");
        assert_eq!(stored, materialized);

        let second = stored.iter().find(|u| u.user_id == ids[1]).unwrap();
        assert_eq!(second.followers_count, 2);
        assert_eq!(second.following_count, 1);

        // A user with no edges drops to zero, not left at its seed target
        let third = stored.iter().find(|u| u.user_id == ids[2]).unwrap();
        assert_eq!(third.followers_count, 0);
        assert_eq!(third.following_count, 1);
    }
}

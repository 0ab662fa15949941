use anyhow::{Context, Result};
use socialseed_types::OwnerStories;
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DbPool;

pub struct StoryRepository {
    pool: DbPool,
}

impl StoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// All stories grouped by owner, each group as a nested list of story ids
    pub fn stories_by_owner(&self) -> Result<Vec<OwnerStories>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, json_group_array(id)
             FROM (SELECT user_id, id FROM stories ORDER BY user_id, created_at, id)
             GROUP BY user_id
             ORDER BY user_id",
        )?;

        let groups = stmt
            .query_map([], |row| {
                let user_id = parse_uuid(row, 0)?;
                let ids_json: String = row.get(1)?;
                Ok((user_id, ids_json))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        groups
            .into_iter()
            .map(|(user_id, ids_json)| {
                let story_ids: Vec<Uuid> = serde_json::from_str(&ids_json)
                    .with_context(|| format!("Malformed story list for user {}", user_id))?;
                Ok(OwnerStories { user_id, story_ids })
            })
            .collect()
    }

    /// Viewers of a story in insertion order
    pub fn get_viewers(&self, story_id: &Uuid) -> Result<Vec<Uuid>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT viewer_id FROM story_views WHERE story_id = ? ORDER BY rowid")?;

        let viewers = stmt
            .query_map([story_id.to_string()], |row| parse_uuid(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(viewers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_stories_grouped_by_owner() {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");

        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let alice_stories = [Uuid::new_v4(), Uuid::new_v4()];
        let bob_story = Uuid::new_v4();
        {
            let conn = db.connection().expect("Failed to get connection");
            for (id, name) in [(&alice, "alice"), (&bob, "bob")] {
                conn.execute(
                    "INSERT INTO users (id, username, created_at) VALUES (?, ?, ?)",
                    (id.to_string(), name, "2024-01-01T00:00:00Z"),
                )
                .expect("Failed to insert user");
            }
            for (i, story) in alice_stories.iter().enumerate() {
                conn.execute(
                    "INSERT INTO stories (id, user_id, media_url, created_at) VALUES (?, ?, 'm', ?)",
                    (story.to_string(), alice.to_string(), format!("2024-01-0{}T00:00:00Z", i + 1)),
                )
                .expect("Failed to insert story");
            }
            conn.execute(
                "INSERT INTO stories (id, user_id, media_url, created_at) VALUES (?, ?, 'm', '2024-01-01T00:00:00Z')",
                (bob_story.to_string(), bob.to_string()),
            )
            .expect("Failed to insert story");
            conn.execute(
                "INSERT INTO story_views (story_id, viewer_id, is_liked) VALUES (?, ?, 1)",
                (bob_story.to_string(), alice.to_string()),
            )
            .expect("Failed to insert view");
        }

        let repo = StoryRepository::new(db.pool.clone());
        let groups = repo.stories_by_owner().expect("Failed to group stories");
        assert_eq!(groups.len(), 2);

        let alice_group = groups.iter().find(|g| g.user_id == alice).unwrap();
        assert_eq!(alice_group.story_ids, alice_stories.to_vec());
        let bob_group = groups.iter().find(|g| g.user_id == bob).unwrap();
        assert_eq!(bob_group.story_ids, vec![bob_story]);

        assert_eq!(repo.get_viewers(&bob_story).unwrap(), vec![alice]);
        assert!(repo.get_viewers(&alice_stories[0]).unwrap().is_empty());
    }
}

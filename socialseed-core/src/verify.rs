use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

use crate::db::SeedStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    FollowCounts {
        user_id: Uuid,
        stored_following: i64,
        stored_followers: i64,
        actual_following: i64,
        actual_followers: i64,
    },
    ViewerNotFollower {
        story_id: Uuid,
        viewer_id: Uuid,
        owner_id: Uuid,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::FollowCounts {
                user_id,
                stored_following,
                stored_followers,
                actual_following,
                actual_followers,
            } => write!(
                f,
                "user {} stores {}/{} following/followers but has {}/{} edges",
                user_id, stored_following, stored_followers, actual_following, actual_followers
            ),
            Mismatch::ViewerNotFollower {
                story_id,
                viewer_id,
                owner_id,
            } => write!(
                f,
                "story {} viewed by {} who does not follow owner {}",
                story_id, viewer_id, owner_id
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub users_checked: usize,
    pub stories_checked: usize,
    pub views_checked: usize,
    pub mismatches: Vec<Mismatch>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Check a persisted store: stored follow counters must equal the edge
/// counts, and every story viewer must follow the story's owner.
pub fn verify_store<S: SeedStore>(store: &S) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    let actual: HashMap<Uuid, (i64, i64)> = store
        .materialized_follow_counts()?
        .into_iter()
        .map(|c| (c.user_id, (c.following_count, c.followers_count)))
        .collect();
    for stored in store.users_with_follow_counts()? {
        report.users_checked += 1;
        let (actual_following, actual_followers) = actual.get(&stored.user_id).copied().unwrap_or((0, 0));
        if stored.following_count != actual_following || stored.followers_count != actual_followers {
            report.mismatches.push(Mismatch::FollowCounts {
                user_id: stored.user_id,
                stored_following: stored.following_count,
                stored_followers: stored.followers_count,
                actual_following,
                actual_followers,
            });
        }
    }

    for owner in store.stories_by_owner()? {
        let followers: HashSet<Uuid> = store.followers_of(&owner.user_id)?.into_iter().collect();
        for story_id in owner.story_ids {
            report.stories_checked += 1;
            for viewer_id in store.story_viewers(&story_id)? {
                report.views_checked += 1;
                if !followers.contains(&viewer_id) {
                    report.mismatches.push(Mismatch::ViewerNotFollower {
                        story_id,
                        viewer_id,
                        owner_id: owner.user_id,
                    });
                }
            }
        }
    }

    tracing::info!(
        "Verified {} users, {} stories, {} views: {} mismatches",
        report.users_checked,
        report.stories_checked,
        report.views_checked,
        report.mismatches.len()
    );
    Ok(report)
}

use socialseed_types::EntityKind;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use uuid::Uuid;

use crate::dataset::Dataset;
use crate::error::{InvariantViolation, SeedResult};

/// Check the generated dataset before anything is written.
///
/// Relationship rows must be unique on their natural key, follow edges never
/// point at their own follower, engagers follow the owner they engage with,
/// each post has exactly `min(likes_count, followers)` likes, and every
/// post's comments form a forest whose parents precede their children.
pub fn validate_dataset(dataset: &Dataset) -> SeedResult<()> {
    ensure_unique(EntityKind::Follows, &dataset.follows, |e| (e.follower_id, e.following_id))?;
    ensure_unique(EntityKind::PostLikes, &dataset.post_likes, |l| (l.post_id, l.user_id))?;
    ensure_unique(EntityKind::StoryViews, &dataset.story_views, |v| (v.story_id, v.viewer_id))?;
    ensure_unique(EntityKind::CommentLikes, &dataset.comment_likes, |l| (l.comment_id, l.user_id))?;
    ensure_unique(EntityKind::PostTags, &dataset.post_tags, |t| (t.post_id, t.tag_id))?;
    ensure_unique(EntityKind::StoryTags, &dataset.story_tags, |t| (t.story_id, t.tag_id))?;
    ensure_unique(EntityKind::HighlightStories, &dataset.highlight_stories, |h| {
        (h.highlight_id, h.story_id)
    })?;

    if let Some(edge) = dataset.follows.iter().find(|e| e.follower_id == e.following_id) {
        return Err(InvariantViolation::SelfFollow(edge.follower_id).into());
    }

    let follows: HashSet<(Uuid, Uuid)> = dataset
        .follows
        .iter()
        .map(|e| (e.follower_id, e.following_id))
        .collect();
    let mut follower_counts: HashMap<Uuid, usize> = HashMap::new();
    for edge in &dataset.follows {
        *follower_counts.entry(edge.following_id).or_default() += 1;
    }

    validate_post_likes(dataset, &follows, &follower_counts)?;

    let story_owner: HashMap<Uuid, Uuid> = dataset.stories.iter().map(|s| (s.id, s.user_id)).collect();
    for view in &dataset.story_views {
        let owner = story_owner.get(&view.story_id);
        if !owner.is_some_and(|owner| follows.contains(&(view.viewer_id, *owner))) {
            return Err(InvariantViolation::NotAFollower {
                kind: EntityKind::StoryViews,
                key: format!("({}, {})", view.story_id, view.viewer_id),
            }
            .into());
        }
    }

    validate_comments(dataset, &follows)?;

    tracing::info!("Validated {} rows", dataset.total_rows());
    Ok(())
}

fn ensure_unique<T, K, F>(kind: EntityKind, rows: &[T], key: F) -> SeedResult<()>
where
    K: Hash + Eq + Debug,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        let k = key(row);
        if seen.contains(&k) {
            return Err(InvariantViolation::Duplicate {
                kind,
                key: format!("{:?}", k),
            }
            .into());
        }
        seen.insert(k);
    }
    Ok(())
}

fn validate_post_likes(
    dataset: &Dataset,
    follows: &HashSet<(Uuid, Uuid)>,
    follower_counts: &HashMap<Uuid, usize>,
) -> SeedResult<()> {
    let post_owner: HashMap<i64, Uuid> = dataset.posts.iter().map(|p| (p.id, p.user_id)).collect();
    let mut likes_per_post: HashMap<i64, usize> = HashMap::new();

    for like in &dataset.post_likes {
        let owner = post_owner.get(&like.post_id);
        if !owner.is_some_and(|owner| follows.contains(&(like.user_id, *owner))) {
            return Err(InvariantViolation::NotAFollower {
                kind: EntityKind::PostLikes,
                key: format!("({}, {})", like.post_id, like.user_id),
            }
            .into());
        }
        *likes_per_post.entry(like.post_id).or_default() += 1;
    }

    // Exactly min(followers, target): capped only when followers run out
    for post in &dataset.posts {
        let likes = likes_per_post.get(&post.id).copied().unwrap_or(0);
        let followers = follower_counts.get(&post.user_id).copied().unwrap_or(0);
        let bound = followers.min(post.likes_count.max(0) as usize);
        if likes > bound {
            return Err(InvariantViolation::LikesAboveBound {
                post_id: post.id,
                likes,
                bound,
            }
            .into());
        }
        if likes < bound {
            return Err(InvariantViolation::LikesBelowTarget {
                post_id: post.id,
                likes,
                expected: bound,
            }
            .into());
        }
    }
    Ok(())
}

fn validate_comments(dataset: &Dataset, follows: &HashSet<(Uuid, Uuid)>) -> SeedResult<()> {
    let expected: usize = dataset.posts.iter().map(|p| p.comments_count.max(0) as usize).sum();
    if dataset.comments.len() != expected {
        return Err(InvariantViolation::AllocationMismatch {
            allocated: dataset.comments.len(),
            expected,
        }
        .into());
    }

    let post_of: HashMap<i64, i64> = dataset.comments.iter().map(|c| (c.id, c.post_id)).collect();
    if post_of.len() != dataset.comments.len() {
        ensure_unique(EntityKind::Comments, &dataset.comments, |c| c.id)?;
    }

    for comment in &dataset.comments {
        if let Some(parent_id) = comment.parent_comment_id {
            if parent_id >= comment.id || post_of.get(&parent_id) != Some(&comment.post_id) {
                return Err(InvariantViolation::InvalidParent {
                    comment_id: comment.id,
                    parent_id,
                }
                .into());
            }
        }
    }

    let commenter: HashMap<i64, Uuid> = dataset.comments.iter().map(|c| (c.id, c.user_id)).collect();
    for like in &dataset.comment_likes {
        let author = commenter.get(&like.comment_id);
        if !author.is_some_and(|author| follows.contains(&(like.user_id, *author))) {
            return Err(InvariantViolation::NotAFollower {
                kind: EntityKind::CommentLikes,
                key: format!("({}, {})", like.comment_id, like.user_id),
            }
            .into());
        }
    }
    Ok(())
}

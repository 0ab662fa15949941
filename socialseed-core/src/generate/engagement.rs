use socialseed_types::{Comment, CommentLike, Post, PostLike, ShortfallPolicy, Story, StoryView};
use uuid::Uuid;

use super::{apply_shortfall_policy, FollowGraph};
use crate::error::SeedResult;

/// Decides the `is_liked` flag of a story view from the viewer's position
/// in the story's viewer list.
pub trait StoryLikePolicy: Send + Sync {
    fn is_liked(&self, position: usize) -> bool;
}

/// Even positions like the story, odd positions only view it
#[derive(Debug, Clone, Copy, Default)]
pub struct AlternatingLikes;

impl StoryLikePolicy for AlternatingLikes {
    fn is_liked(&self, position: usize) -> bool {
        position % 2 == 0
    }
}

impl<F> StoryLikePolicy for F
where
    F: Fn(usize) -> bool + Send + Sync,
{
    fn is_liked(&self, position: usize) -> bool {
        self(position)
    }
}

/// The first `count` followers in stored order. No shuffling, so a fixed
/// follower ordering always yields the same engagers.
fn engagers<'g>(
    graph: &'g FollowGraph,
    owner_id: &Uuid,
    target: i64,
    policy: ShortfallPolicy,
    subject: impl FnOnce() -> String,
) -> SeedResult<&'g [Uuid]> {
    let followers = graph.followers_of(owner_id);
    let count = apply_shortfall_policy(policy, subject, target.max(0) as usize, followers.len())?;
    Ok(&followers[..count])
}

/// Likes for every post, drawn from the owner's followers and capped at
/// `min(likes_count, followers)`.
pub fn sample_post_likes(
    posts: &[Post],
    graph: &FollowGraph,
    policy: ShortfallPolicy,
) -> SeedResult<Vec<PostLike>> {
    let mut likes = Vec::new();
    let mut capped = 0usize;

    for post in posts {
        let likers = engagers(graph, &post.user_id, post.likes_count, policy, || {
            format!("post {} likes", post.id)
        })?;
        if (likers.len() as i64) < post.likes_count {
            capped += 1;
        }
        likes.extend(likers.iter().map(|user_id| PostLike {
            post_id: post.id,
            user_id: *user_id,
        }));
    }

    tracing::info!(
        "Sampled {} post likes across {} posts ({} capped below target)",
        likes.len(),
        posts.len(),
        capped
    );
    Ok(likes)
}

/// Views for every story from the owner's followers; `like_policy` sets
/// `is_liked` per viewer position.
pub fn sample_story_views(
    stories: &[Story],
    graph: &FollowGraph,
    like_policy: &dyn StoryLikePolicy,
    policy: ShortfallPolicy,
) -> SeedResult<Vec<StoryView>> {
    let mut views = Vec::new();

    for story in stories {
        let viewers = engagers(graph, &story.user_id, story.target_views, policy, || {
            format!("story {} views", story.id)
        })?;
        views.extend(viewers.iter().enumerate().map(|(position, viewer_id)| StoryView {
            story_id: story.id,
            viewer_id: *viewer_id,
            is_liked: like_policy.is_liked(position),
        }));
    }

    tracing::info!("Sampled {} story views across {} stories", views.len(), stories.len());
    Ok(views)
}

/// Comment likes from the commenter's followers
pub fn sample_comment_likes(
    comments: &[Comment],
    graph: &FollowGraph,
    policy: ShortfallPolicy,
) -> SeedResult<Vec<CommentLike>> {
    let mut likes = Vec::new();

    for comment in comments {
        if comment.likes_target <= 0 {
            continue;
        }
        let likers = engagers(graph, &comment.user_id, comment.likes_target, policy, || {
            format!("comment {} likes", comment.id)
        })?;
        likes.extend(likers.iter().map(|user_id| CommentLike {
            comment_id: comment.id,
            user_id: *user_id,
        }));
    }

    tracing::info!("Sampled {} comment likes", likes.len());
    Ok(likes)
}

use rand::seq::SliceRandom;
use rand::Rng;
use socialseed_types::{Comment, Post};

use super::FollowGraph;
use crate::error::{InvariantViolation, SeedResult};
use crate::seed::CommentRecord;

/// Parent position of `position` in a complete binary tree laid out in
/// array order. The root (position 0) has none.
pub fn binary_tree_parent(position: usize) -> Option<usize> {
    (position > 0).then(|| (position - 1) / 2)
}

/// Split the comment pool across posts and thread each post's share.
///
/// Posts consume consecutive slices of the pool sized by their
/// `comments_count`, so every pool entry is used at most once. Within a
/// post the slice is shuffled, numbered with run-wide sequential ids and
/// arranged as a complete binary tree (position `i` replies to position
/// `(i - 1) / 2`). Each comment's author is a uniformly drawn follower of
/// the post owner, with replacement.
pub fn build_comment_threads<R: Rng>(
    posts: &[Post],
    pool: &[CommentRecord],
    graph: &FollowGraph,
    rng: &mut R,
) -> SeedResult<Vec<Comment>> {
    let required: usize = posts.iter().map(|p| p.comments_count.max(0) as usize).sum();
    if pool.len() < required {
        return Err(InvariantViolation::CommentPoolTooSmall {
            available: pool.len(),
            required,
        }
        .into());
    }
    if pool.len() > required {
        tracing::warn!(
            "Comment pool has {} entries but posts declare {}; ignoring the surplus",
            pool.len(),
            required
        );
    }

    let mut comments = Vec::with_capacity(required);
    let mut offset = 0usize;
    let mut next_id: i64 = 1;

    for post in posts {
        let count = post.comments_count.max(0) as usize;
        if count == 0 {
            continue;
        }

        let followers = graph.followers_of(&post.user_id);
        if followers.is_empty() {
            return Err(InvariantViolation::NoEligibleCommenters {
                post_id: post.id,
                owner_id: post.user_id,
                required: count,
            }
            .into());
        }

        let mut allocation: Vec<&CommentRecord> = pool[offset..offset + count].iter().collect();
        offset += count;
        allocation.shuffle(rng);

        let base_id = next_id;
        for (position, record) in allocation.into_iter().enumerate() {
            let commenter = followers[rng.gen_range(0..followers.len())];
            comments.push(Comment {
                id: base_id + position as i64,
                post_id: post.id,
                user_id: commenter,
                parent_comment_id: binary_tree_parent(position).map(|p| base_id + p as i64),
                text: record.comment.clone(),
                likes_target: record.likes.max(0),
            });
        }
        next_id += count as i64;
    }

    tracing::info!(
        "Threaded {} comments across {} posts",
        comments.len(),
        posts.iter().filter(|p| p.comments_count > 0).count()
    );
    Ok(comments)
}

use chrono::{DateTime, Utc};
use rand::Rng;
use socialseed_types::{Highlight, HighlightStory, Post, PostImage, Story, User};
use std::collections::HashMap;
use uuid::Uuid;

use crate::seed::mapper::random_uuid;
use crate::seed::MediaRecord;

/// `per_user` stories for every user, media taken round-robin from `pool`.
///
/// A story expects `round(followers_count * view_ratio)` views; the engagement
/// sampler later caps that at the owner's realized followers.
pub fn generate_stories<R: Rng>(
    users: &[User],
    pool: &[MediaRecord],
    per_user: usize,
    view_ratio: f64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Story> {
    if pool.is_empty() || per_user == 0 {
        if per_user > 0 {
            tracing::warn!("Story media pool is empty; no stories generated");
        }
        return Vec::new();
    }

    let mut media = pool.iter().cycle();
    let mut stories = Vec::with_capacity(users.len() * per_user);

    for user in users {
        let target_views = (user.followers_count.max(0) as f64 * view_ratio.max(0.0)).round() as i64;
        for record in media.by_ref().take(per_user) {
            stories.push(Story {
                id: random_uuid(rng),
                user_id: user.id,
                media_url: record.url.clone(),
                caption: record.caption.clone(),
                target_views,
                created_at: now,
            });
        }
    }

    tracing::info!("Generated {} stories for {} users", stories.len(), users.len());
    stories
}

/// Link each highlight to one of its owner's stories. The k-th highlight of
/// an owner gets the owner's story `k mod n`; owners without stories get no
/// links.
pub fn link_highlight_stories(highlights: &[Highlight], stories: &[Story]) -> Vec<HighlightStory> {
    let mut by_owner: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for story in stories {
        by_owner.entry(story.user_id).or_default().push(story.id);
    }

    let mut position: HashMap<Uuid, usize> = HashMap::new();
    let links: Vec<HighlightStory> = highlights
        .iter()
        .filter_map(|highlight| {
            let owned = by_owner.get(&highlight.user_id)?;
            let k = position.entry(highlight.user_id).or_insert(0);
            let story_id = owned[*k % owned.len()];
            *k += 1;
            Some(HighlightStory {
                highlight_id: highlight.id,
                story_id,
            })
        })
        .collect();

    tracing::debug!("Linked {} of {} highlights to stories", links.len(), highlights.len());
    links
}

/// Image rows for every post: the primary image at order 1 when the post
/// has one, then up to `max_extra` images from `pool` at orders 2, 3, ...
pub fn attach_post_images<R: Rng>(
    posts: &[Post],
    pool: &[MediaRecord],
    max_extra: usize,
    rng: &mut R,
) -> Vec<PostImage> {
    let mut images = Vec::new();
    let mut extras = pool.iter().cycle();

    for post in posts {
        let mut order = 1;
        if !post.primary_image_url.is_empty() {
            images.push(PostImage {
                id: images.len() as i64 + 1,
                post_id: post.id,
                image_url: post.primary_image_url.clone(),
                post_order: order,
            });
            order += 1;
        }

        if pool.is_empty() {
            continue;
        }
        let extra = rng.gen_range(0..=max_extra);
        for record in extras.by_ref().take(extra) {
            images.push(PostImage {
                id: images.len() as i64 + 1,
                post_id: post.id,
                image_url: record.url.clone(),
                post_order: order,
            });
            order += 1;
        }
    }

    tracing::info!("Attached {} images to {} posts", images.len(), posts.len());
    images
}

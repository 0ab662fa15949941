use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use socialseed_types::{Comment, CommentLike, PostLike, PostTag, Story, StoryTag, StoryView, Tag};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::{Generation, Settings};
use crate::dataset::Dataset;
use crate::db::SeedStore;
use crate::error::{SeedError, SeedResult};
use crate::generate::{
    associate_tags, attach_post_images, build_comment_threads, ensure_running,
    generate_follow_graph, generate_stories, link_highlight_stories, sample_comment_likes,
    sample_post_likes, sample_story_views, AlternatingLikes, CancelSignal, CountDivergence,
    FollowGeneration, StoryLikePolicy,
};
use crate::persist::{BatchDriver, PersistReport};
use crate::seed::{map_profiles, MappedSeed, SeedInput};
use crate::validate::validate_dataset;

/// A validated, not yet persisted dataset
#[derive(Debug, Clone)]
pub struct GeneratedRun {
    pub dataset: Dataset,
    /// Users whose realized follow counts differ from their seed targets
    pub divergences: Vec<CountDivergence>,
}

/// Outcome of a full load
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub run: GeneratedRun,
    pub report: PersistReport,
}

struct Relationships {
    follow: FollowGeneration,
    comments: Vec<Comment>,
    post_likes: Vec<PostLike>,
    story_views: Vec<StoryView>,
    comment_likes: Vec<CommentLike>,
}

type TagTask<K> = JoinHandle<SeedResult<HashSet<(K, i64)>>>;

/// Generate with the default alternating story-like policy
pub async fn generate_dataset(
    input: &SeedInput,
    settings: &Generation,
    now: DateTime<Utc>,
    cancel: CancelSignal,
) -> SeedResult<GeneratedRun> {
    generate_dataset_with(input, settings, now, &AlternatingLikes, cancel).await
}

/// Derive every entity and relationship from the seed input, then validate.
///
/// Tag association over post and story captions runs on the worker pool
/// while the follow graph, comment threads and engagement are generated
/// on the current task. All randomness comes from one ChaCha generator,
/// seeded from `settings.rng_seed` when set.
pub async fn generate_dataset_with(
    input: &SeedInput,
    settings: &Generation,
    now: DateTime<Utc>,
    like_policy: &dyn StoryLikePolicy,
    cancel: CancelSignal,
) -> SeedResult<GeneratedRun> {
    let mut rng = match settings.rng_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mapped = map_profiles(&input.profiles, now, &mut rng);
    let stories = generate_stories(
        &mapped.users,
        &input.story_media,
        settings.stories_per_user,
        settings.story_view_ratio,
        now,
        &mut rng,
    );
    let highlight_stories = link_highlight_stories(&mapped.highlights, &stories);
    let post_images = attach_post_images(
        &mapped.posts,
        &input.post_media,
        settings.max_extra_post_images,
        &mut rng,
    );

    let post_captions: HashMap<i64, String> = mapped
        .posts
        .iter()
        .map(|post| (post.id, post.caption.clone()))
        .collect();
    let story_captions: HashMap<uuid::Uuid, String> = stories
        .iter()
        .filter_map(|story| story.caption.clone().map(|caption| (story.id, caption)))
        .collect();
    let post_tag_task = spawn_tag_task(&mapped.tags, post_captions, settings.tag_workers, &cancel);
    let story_tag_task = spawn_tag_task(&mapped.tags, story_captions, settings.tag_workers, &cancel);

    let relationships = generate_relationships(
        input,
        &mapped,
        &stories,
        like_policy,
        settings,
        &mut rng,
        &cancel,
    );
    let Relationships {
        follow,
        comments,
        post_likes,
        story_views,
        comment_likes,
    } = match relationships {
        Ok(generated) => generated,
        Err(e) => {
            // Dropping the collectors closes the result channels, which
            // stops the workers at their next tag
            post_tag_task.abort();
            story_tag_task.abort();
            return Err(e);
        }
    };

    let mut post_tags: Vec<PostTag> = join_tag_task(post_tag_task)
        .await?
        .into_iter()
        .map(|(post_id, tag_id)| PostTag { post_id, tag_id })
        .collect();
    post_tags.sort();
    let mut story_tags: Vec<StoryTag> = join_tag_task(story_tag_task)
        .await?
        .into_iter()
        .map(|(story_id, tag_id)| StoryTag { story_id, tag_id })
        .collect();
    story_tags.sort_by_key(|t| (t.story_id, t.tag_id));

    for divergence in follow.divergences.iter().take(10) {
        tracing::debug!(
            "User {} follows {} (target {}) and has {} followers (target {})",
            divergence.user_id,
            divergence.actual_following,
            divergence.target_following,
            divergence.actual_followers,
            divergence.target_followers
        );
    }

    let dataset = Dataset {
        users: mapped.users,
        businesses: mapped.businesses,
        locations: mapped.locations,
        posts: mapped.posts,
        post_images,
        highlights: mapped.highlights,
        stories,
        highlight_stories,
        tags: mapped.tags,
        post_tags,
        story_tags,
        follows: follow.graph.edges().to_vec(),
        post_likes,
        story_views,
        comments,
        comment_likes,
    };
    validate_dataset(&dataset)?;

    Ok(GeneratedRun {
        dataset,
        divergences: follow.divergences,
    })
}

/// Everything that depends on the follow graph. The cancel signal is
/// checked between phases.
fn generate_relationships(
    input: &SeedInput,
    mapped: &MappedSeed,
    stories: &[Story],
    like_policy: &dyn StoryLikePolicy,
    settings: &Generation,
    rng: &mut ChaCha8Rng,
    cancel: &CancelSignal,
) -> SeedResult<Relationships> {
    let policy = settings.shortfall_policy;
    let posts = &mapped.posts;
    ensure_running(cancel)?;
    let follow = generate_follow_graph(&mapped.users, policy, rng)?;
    ensure_running(cancel)?;
    let comments = build_comment_threads(posts, &input.comments, &follow.graph, rng)?;
    ensure_running(cancel)?;
    let post_likes = sample_post_likes(posts, &follow.graph, policy)?;
    let story_views = sample_story_views(stories, &follow.graph, like_policy, policy)?;
    ensure_running(cancel)?;
    let comment_likes = sample_comment_likes(&comments, &follow.graph, policy)?;
    Ok(Relationships {
        follow,
        comments,
        post_likes,
        story_views,
        comment_likes,
    })
}

fn spawn_tag_task<K>(
    tags: &[Tag],
    captions: HashMap<K, String>,
    workers: usize,
    cancel: &CancelSignal,
) -> TagTask<K>
where
    K: Copy + Eq + Hash + Send + Sync + 'static,
{
    let tags = tags.to_vec();
    let cancel = cancel.clone();
    tokio::spawn(async move { associate_tags(&tags, Arc::new(captions), workers, cancel).await })
}

async fn join_tag_task<K>(task: TagTask<K>) -> SeedResult<HashSet<(K, i64)>> {
    task.await
        .map_err(|e| SeedError::Worker(format!("tag association task failed: {}", e)))?
}

/// Read, generate, validate and persist one run
pub async fn load<S: SeedStore>(
    store: &S,
    settings: &Settings,
    cancel: CancelSignal,
) -> SeedResult<LoadSummary> {
    let input = SeedInput::read(&settings.seed)?;
    let run = generate_dataset(&input, &settings.generation, Utc::now(), cancel.clone()).await?;
    let report = BatchDriver::new(store, &settings.batches)
        .with_cancel(cancel)
        .persist(&run.dataset)?;
    Ok(LoadSummary { run, report })
}

use config::{Config, ConfigError, File};
use serde::Deserialize;
use socialseed_types::{EntityKind, ShortfallPolicy};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
    pub profiles_path: String,
    pub comments_path: String,
    pub story_media_path: String,
    pub post_media_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    /// Fixed seed for reproducible runs; entropy when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,
    pub tag_workers: usize,
    pub stories_per_user: usize,
    pub story_view_ratio: f64,
    pub max_extra_post_images: usize,
    pub shortfall_policy: ShortfallPolicy,
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            rng_seed: None,
            tag_workers: 8,
            stories_per_user: 2,
            story_view_ratio: 0.5,
            max_extra_post_images: 2,
            shortfall_policy: ShortfallPolicy::default(),
        }
    }
}

/// Rows per insert chunk, per entity kind
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSizes {
    pub users: usize,
    pub businesses: usize,
    pub locations: usize,
    pub posts: usize,
    pub post_images: usize,
    pub highlights: usize,
    pub stories: usize,
    pub highlight_stories: usize,
    pub tags: usize,
    pub post_tags: usize,
    pub story_tags: usize,
    pub follows: usize,
    pub post_likes: usize,
    pub story_views: usize,
    pub comments: usize,
    pub comment_likes: usize,
}

impl BatchSizes {
    pub fn for_kind(&self, kind: EntityKind) -> usize {
        let size = match kind {
            EntityKind::Users => self.users,
            EntityKind::Businesses => self.businesses,
            EntityKind::Locations => self.locations,
            EntityKind::Posts => self.posts,
            EntityKind::PostImages => self.post_images,
            EntityKind::Highlights => self.highlights,
            EntityKind::Stories => self.stories,
            EntityKind::HighlightStories => self.highlight_stories,
            EntityKind::Tags => self.tags,
            EntityKind::PostTags => self.post_tags,
            EntityKind::StoryTags => self.story_tags,
            EntityKind::Follows => self.follows,
            EntityKind::PostLikes => self.post_likes,
            EntityKind::StoryViews => self.story_views,
            EntityKind::Comments => self.comments,
            EntityKind::CommentLikes => self.comment_likes,
        };
        // A zero chunk size would never make progress
        size.max(1)
    }

    /// Same chunk size for every kind (handy in tests)
    pub fn uniform(size: usize) -> Self {
        Self {
            users: size,
            businesses: size,
            locations: size,
            posts: size,
            post_images: size,
            highlights: size,
            stories: size,
            highlight_stories: size,
            tags: size,
            post_tags: size,
            story_tags: size,
            follows: size,
            post_likes: size,
            story_views: size,
            comments: size,
            comment_likes: size,
        }
    }
}

impl Default for BatchSizes {
    fn default() -> Self {
        Self {
            posts: 4000,
            post_images: 5000,
            comments: 2000,
            ..Self::uniform(10000)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub seed: Seed,
    pub generation: Generation,
    pub batches: BatchSizes,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Optional socialseed.toml in the working directory
        let config_file_name = "socialseed.toml";
        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        let generation = Generation::default();
        let batches = BatchSizes::default();
        builder = builder
            .set_default("database.path", "socialseed.db")?
            .set_default("seed.profiles_path", "data/profiles.json")?
            .set_default("seed.comments_path", "data/comments.json")?
            .set_default("seed.story_media_path", "data/story_media.json")?
            .set_default("seed.post_media_path", "data/post_media.json")?
            .set_default("generation.tag_workers", generation.tag_workers as u64)?
            .set_default("generation.stories_per_user", generation.stories_per_user as u64)?
            .set_default("generation.story_view_ratio", generation.story_view_ratio)?
            .set_default(
                "generation.max_extra_post_images",
                generation.max_extra_post_images as u64,
            )?
            .set_default(
                "generation.shortfall_policy",
                generation.shortfall_policy.as_str(),
            )?;

        for kind in EntityKind::ALL {
            builder = builder.set_default(
                format!("batches.{}", kind.as_str()),
                batches.for_kind(kind) as u64,
            )?;
        }

        // 2. Environment variables (highest priority)
        let overrides = [
            ("SOCIALSEED_DATABASE_PATH", "database.path"),
            ("SOCIALSEED_PROFILES_PATH", "seed.profiles_path"),
            ("SOCIALSEED_COMMENTS_PATH", "seed.comments_path"),
            ("SOCIALSEED_STORY_MEDIA_PATH", "seed.story_media_path"),
            ("SOCIALSEED_POST_MEDIA_PATH", "seed.post_media_path"),
            ("SOCIALSEED_RNG_SEED", "generation.rng_seed"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_sizes_favor_narrow_rows() {
        let sizes = BatchSizes::default();
        assert_eq!(sizes.for_kind(EntityKind::Tags), 10000);
        assert_eq!(sizes.for_kind(EntityKind::Locations), 10000);
        assert_eq!(sizes.for_kind(EntityKind::Posts), 4000);
        assert!(sizes.for_kind(EntityKind::Comments) < sizes.for_kind(EntityKind::Follows));
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let sizes = BatchSizes::uniform(0);
        assert_eq!(sizes.for_kind(EntityKind::Users), 1);
    }

    #[test]
    fn test_settings_defaults_load() {
        let settings = Settings::new().expect("Failed to load settings");
        assert_eq!(settings.generation.shortfall_policy, ShortfallPolicy::CapToAvailablePopulation);
        assert!(settings.generation.tag_workers > 0);
        assert_eq!(settings.batches.for_kind(EntityKind::Comments), 2000);
    }
}

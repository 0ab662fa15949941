use serde::{Deserialize, Serialize};

/// What to do when a target count exceeds the eligible population
/// (other users for follows, followers for likes, views and comments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Clamp to the population and record the divergence
    #[default]
    CapToAvailablePopulation,
    /// Treat any shortfall as an invariant violation
    FailOnShortfall,
}

impl ShortfallPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortfallPolicy::CapToAvailablePopulation => "cap_to_available_population",
            ShortfallPolicy::FailOnShortfall => "fail_on_shortfall",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cap_to_available_population" | "cap" => Some(ShortfallPolicy::CapToAvailablePopulation),
            "fail_on_shortfall" | "fail" => Some(ShortfallPolicy::FailOnShortfall),
            _ => None,
        }
    }
}

/// Every table the loader writes, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Businesses,
    Locations,
    Posts,
    PostImages,
    Highlights,
    Stories,
    HighlightStories,
    Tags,
    PostTags,
    StoryTags,
    Follows,
    PostLikes,
    StoryViews,
    Comments,
    CommentLikes,
}

impl EntityKind {
    pub const ALL: [EntityKind; 16] = [
        EntityKind::Users,
        EntityKind::Businesses,
        EntityKind::Locations,
        EntityKind::Posts,
        EntityKind::PostImages,
        EntityKind::Highlights,
        EntityKind::Stories,
        EntityKind::HighlightStories,
        EntityKind::Tags,
        EntityKind::PostTags,
        EntityKind::StoryTags,
        EntityKind::Follows,
        EntityKind::PostLikes,
        EntityKind::StoryViews,
        EntityKind::Comments,
        EntityKind::CommentLikes,
    ];

    /// Table name in the relational schema
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Businesses => "businesses",
            EntityKind::Locations => "locations",
            EntityKind::Posts => "posts",
            EntityKind::PostImages => "post_images",
            EntityKind::Highlights => "highlights",
            EntityKind::Stories => "stories",
            EntityKind::HighlightStories => "highlight_stories",
            EntityKind::Tags => "tags",
            EntityKind::PostTags => "post_tags",
            EntityKind::StoryTags => "story_tags",
            EntityKind::Follows => "follows",
            EntityKind::PostLikes => "post_likes",
            EntityKind::StoryViews => "story_views",
            EntityKind::Comments => "comments",
            EntityKind::CommentLikes => "comment_likes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

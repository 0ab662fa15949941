use socialseed_types::{
    Business, Comment, CommentLike, EntityKind, FollowEdge, Highlight, HighlightStory, Location, Post,
    PostImage, PostLike, PostTag, Story, StoryTag, StoryView, Tag, User,
};

/// Every row of one generated run, held in memory until persistence
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub businesses: Vec<Business>,
    pub locations: Vec<Location>,
    pub posts: Vec<Post>,
    pub post_images: Vec<PostImage>,
    pub highlights: Vec<Highlight>,
    pub stories: Vec<Story>,
    pub highlight_stories: Vec<HighlightStory>,
    pub tags: Vec<Tag>,
    pub post_tags: Vec<PostTag>,
    pub story_tags: Vec<StoryTag>,
    pub follows: Vec<FollowEdge>,
    pub post_likes: Vec<PostLike>,
    pub story_views: Vec<StoryView>,
    pub comments: Vec<Comment>,
    pub comment_likes: Vec<CommentLike>,
}

impl Dataset {
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Users => self.users.len(),
            EntityKind::Businesses => self.businesses.len(),
            EntityKind::Locations => self.locations.len(),
            EntityKind::Posts => self.posts.len(),
            EntityKind::PostImages => self.post_images.len(),
            EntityKind::Highlights => self.highlights.len(),
            EntityKind::Stories => self.stories.len(),
            EntityKind::HighlightStories => self.highlight_stories.len(),
            EntityKind::Tags => self.tags.len(),
            EntityKind::PostTags => self.post_tags.len(),
            EntityKind::StoryTags => self.story_tags.len(),
            EntityKind::Follows => self.follows.len(),
            EntityKind::PostLikes => self.post_likes.len(),
            EntityKind::StoryViews => self.story_views.len(),
            EntityKind::Comments => self.comments.len(),
            EntityKind::CommentLikes => self.comment_likes.len(),
        }
    }

    /// Row counts in `EntityKind::ALL` order
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        EntityKind::ALL.iter().map(|kind| (*kind, self.count(*kind))).collect()
    }

    pub fn total_rows(&self) -> usize {
        EntityKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }
}

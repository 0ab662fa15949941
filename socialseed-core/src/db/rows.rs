use rusqlite::{params, Statement};
use socialseed_types::{
    Business, Comment, CommentLike, EntityKind, FollowEdge, Highlight, HighlightStory, Location,
    Post, PostImage, PostLike, PostTag, Story, StoryTag, StoryView, Tag, User,
};

/// A row type the store knows how to bulk-insert.
pub trait TableRow {
    const KIND: EntityKind;
    const INSERT_SQL: &'static str;

    /// Execute the prepared `INSERT_SQL` statement with this row's values
    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

impl TableRow for User {
    const KIND: EntityKind = EntityKind::Users;
    const INSERT_SQL: &'static str = "INSERT INTO users (id, username, name, bio, following_count, followers_count, posts_count, highlights_count, profile_image_link, is_business, is_verified, country, region, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id.to_string(),
            self.username,
            self.name,
            self.bio,
            self.following_count,
            self.followers_count,
            self.posts_count,
            self.highlights_count,
            self.profile_image_link,
            self.is_business,
            self.is_verified,
            self.country,
            self.region,
            self.created_at.to_rfc3339(),
        ])
    }
}

impl TableRow for Business {
    const KIND: EntityKind = EntityKind::Businesses;
    const INSERT_SQL: &'static str = "INSERT INTO businesses (id, user_id, city_name, latitude, longitude, street_address, zip_code) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id.to_string(),
            self.user_id.to_string(),
            self.city_name,
            self.latitude,
            self.longitude,
            self.street_address,
            self.zip_code,
        ])
    }
}

impl TableRow for Location {
    const KIND: EntityKind = EntityKind::Locations;
    const INSERT_SQL: &'static str =
        "INSERT INTO locations (id, name, slug, has_public_page) VALUES (?1, ?2, ?3, ?4)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.name, self.slug, self.has_public_page])
    }
}

impl TableRow for Post {
    const KIND: EntityKind = EntityKind::Posts;
    const INSERT_SQL: &'static str = "INSERT INTO posts (id, user_id, caption, likes_count, comments_count, video_view_count, primary_image_url, primary_video_url, location_id, is_sponsored, url, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.user_id.to_string(),
            self.caption,
            self.likes_count,
            self.comments_count,
            self.video_view_count,
            self.primary_image_url,
            self.primary_video_url,
            self.location_id,
            self.is_sponsored,
            self.url,
            self.created_at.to_rfc3339(),
        ])
    }
}

impl TableRow for PostImage {
    const KIND: EntityKind = EntityKind::PostImages;
    const INSERT_SQL: &'static str =
        "INSERT INTO post_images (id, post_id, image_url, post_order) VALUES (?1, ?2, ?3, ?4)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.post_id, self.image_url, self.post_order])
    }
}

impl TableRow for Highlight {
    const KIND: EntityKind = EntityKind::Highlights;
    const INSERT_SQL: &'static str =
        "INSERT INTO highlights (id, user_id, title, image) VALUES (?1, ?2, ?3, ?4)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.user_id.to_string(), self.title, self.image])
    }
}

impl TableRow for Story {
    const KIND: EntityKind = EntityKind::Stories;
    const INSERT_SQL: &'static str =
        "INSERT INTO stories (id, user_id, media_url, caption, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id.to_string(),
            self.user_id.to_string(),
            self.media_url,
            self.caption,
            self.created_at.to_rfc3339(),
        ])
    }
}

impl TableRow for HighlightStory {
    const KIND: EntityKind = EntityKind::HighlightStories;
    const INSERT_SQL: &'static str =
        "INSERT INTO highlight_stories (highlight_id, story_id) VALUES (?1, ?2)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.highlight_id, self.story_id.to_string()])
    }
}

impl TableRow for Tag {
    const KIND: EntityKind = EntityKind::Tags;
    const INSERT_SQL: &'static str = "INSERT INTO tags (id, name) VALUES (?1, ?2)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.name])
    }
}

impl TableRow for PostTag {
    const KIND: EntityKind = EntityKind::PostTags;
    const INSERT_SQL: &'static str = "INSERT INTO post_tags (post_id, tag_id) VALUES (?1, ?2)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.post_id, self.tag_id])
    }
}

impl TableRow for StoryTag {
    const KIND: EntityKind = EntityKind::StoryTags;
    const INSERT_SQL: &'static str = "INSERT INTO story_tags (story_id, tag_id) VALUES (?1, ?2)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.story_id.to_string(), self.tag_id])
    }
}

impl TableRow for FollowEdge {
    const KIND: EntityKind = EntityKind::Follows;
    const INSERT_SQL: &'static str =
        "INSERT INTO follows (follower_id, following_id) VALUES (?1, ?2)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.follower_id.to_string(), self.following_id.to_string()])
    }
}

impl TableRow for PostLike {
    const KIND: EntityKind = EntityKind::PostLikes;
    const INSERT_SQL: &'static str = "INSERT INTO post_likes (post_id, user_id) VALUES (?1, ?2)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.post_id, self.user_id.to_string()])
    }
}

impl TableRow for StoryView {
    const KIND: EntityKind = EntityKind::StoryViews;
    const INSERT_SQL: &'static str =
        "INSERT INTO story_views (story_id, viewer_id, is_liked) VALUES (?1, ?2, ?3)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.story_id.to_string(),
            self.viewer_id.to_string(),
            self.is_liked,
        ])
    }
}

impl TableRow for Comment {
    const KIND: EntityKind = EntityKind::Comments;
    const INSERT_SQL: &'static str = "INSERT INTO comments (id, post_id, user_id, parent_comment_id, comment_text) VALUES (?1, ?2, ?3, ?4, ?5)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.post_id,
            self.user_id.to_string(),
            self.parent_comment_id,
            self.text,
        ])
    }
}

impl TableRow for CommentLike {
    const KIND: EntityKind = EntityKind::CommentLikes;
    const INSERT_SQL: &'static str =
        "INSERT INTO comment_likes (comment_id, user_id) VALUES (?1, ?2)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.comment_id, self.user_id.to_string()])
    }
}

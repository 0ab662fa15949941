use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

/// A profile. The follow counts start out as seed targets and are
/// overwritten with realized totals by the reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub following_count: i64,
    pub followers_count: i64,
    pub posts_count: i64,
    pub highlights_count: i64,
    pub profile_image_link: String,
    pub is_business: bool,
    pub is_verified: bool,
    pub country: String,
    pub region: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: Uuid,
    pub user_id: Uuid,
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub street_address: String,
    /// None when the seed zip code is not numeric
    #[serde(default)]
    pub zip_code: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub has_public_page: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: Uuid,
    pub caption: String,
    /// Target like count; reconciled against post_likes after insertion
    pub likes_count: i64,
    /// Target comment count; sizes the post's slice of the comment pool
    pub comments_count: i64,
    pub video_view_count: i64,
    pub primary_image_url: String,
    #[serde(default)]
    pub primary_video_url: Option<String>,
    #[serde(default)]
    pub location_id: Option<i64>,
    pub is_sponsored: bool,
    pub url: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostImage {
    pub id: i64,
    pub post_id: i64,
    pub image_url: String,
    pub post_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    /// Target number of views, capped by the owner's followers
    pub target_views: i64,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightStory {
    pub highlight_id: i64,
    pub story_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostTag {
    pub post_id: i64,
    pub tag_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryTag {
    pub story_id: Uuid,
    pub tag_id: i64,
}

/// "follower follows following"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: Uuid,
    pub following_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostLike {
    pub post_id: i64,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentLike {
    pub comment_id: i64,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryView {
    pub story_id: Uuid,
    pub viewer_id: Uuid,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: Uuid,
    /// None for the root of a post's thread
    #[serde(default)]
    pub parent_comment_id: Option<i64>,
    pub text: String,
    /// Target like count carried over from the comment pool
    #[serde(default)]
    pub likes_target: i64,
}

// Read models returned by the store's projected queries

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFollowCounts {
    pub user_id: Uuid,
    pub following_count: i64,
    pub followers_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerStories {
    pub user_id: Uuid,
    pub story_ids: Vec<Uuid>,
}

//! Raw input records as they appear in the seed and pool files.
//!
//! Every field is optional in the source data, so the structs default
//! missing values instead of failing the whole file.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub account: String,
    pub biography: String,
    pub business_address_json: Option<BusinessAddressRecord>,
    pub business_category_name: String,
    pub business_email: String,
    pub external_url: String,
    pub followers: i64,
    pub following: i64,
    pub highlights: Vec<HighlightRecord>,
    pub id: String,
    pub is_business_account: bool,
    pub is_professional_account: bool,
    pub is_verified: bool,
    pub posts: Vec<PostRecord>,
    pub posts_count: i64,
    pub profile_image_link: String,
    pub profile_name: String,
    pub highlights_count: i64,
    pub country_code: String,
    pub region: String,
    pub post_hashtags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BusinessAddressRecord {
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub street_address: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HighlightRecord {
    pub id: String,
    pub title: String,
    pub image: String,
    pub owner: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostRecord {
    pub caption: String,
    pub likes: i64,
    /// Unix seconds
    pub datetime: Option<i64>,
    pub image_url: String,
    pub id: String,
    pub location: Option<LocationRecord>,
    pub url: String,
    pub comments: i64,
    pub video_view_count: i64,
    pub video_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationRecord {
    pub id: String,
    pub has_public_page: bool,
    pub name: String,
    pub slug: String,
}

/// One entry of the comment-text pool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentRecord {
    #[serde(alias = "text", alias = "comment_text")]
    pub comment: String,
    #[serde(alias = "likes_number")]
    pub likes: i64,
}

/// One entry of a story or post-image media pool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaRecord {
    #[serde(alias = "image_url", alias = "media_url")]
    pub url: String,
    pub caption: Option<String>,
}

pub mod mapper;
pub mod records;

pub use mapper::{map_profiles, MappedSeed, SPONSORED_LOCATION};
pub use records::{CommentRecord, MediaRecord, ProfileRecord};

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{SeedError, SeedResult};

/// Read a JSON array file into typed records
pub fn read_json_array<T: DeserializeOwned>(path: impl AsRef<Path>) -> SeedResult<Vec<T>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| SeedError::input(path, e))?;
    let records: Vec<T> = serde_json::from_slice(&bytes).map_err(|e| SeedError::input(path, e))?;
    tracing::info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Every input file consumed by a run
#[derive(Debug, Clone, Default)]
pub struct SeedInput {
    pub profiles: Vec<ProfileRecord>,
    pub comments: Vec<CommentRecord>,
    pub story_media: Vec<MediaRecord>,
    pub post_media: Vec<MediaRecord>,
}

impl SeedInput {
    pub fn read(settings: &crate::config::Seed) -> SeedResult<Self> {
        Ok(Self {
            profiles: read_json_array(&settings.profiles_path)?,
            comments: read_json_array(&settings.comments_path)?,
            story_media: read_json_array(&settings.story_media_path)?,
            post_media: read_json_array(&settings.post_media_path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("socialseed-{}-{}", uuid::Uuid::new_v4(), name));
        std::fs::write(&path, contents).expect("Failed to write temp file");
        path
    }

    #[test]
    fn test_read_comment_pool_with_aliases() {
        let path = temp_file(
            "comments.json",
            r#"[{"comment": "nice", "likes": 2}, {"text": "wow"}, {"comment_text": "ok", "likes_number": 1}]"#,
        );
        let comments: Vec<CommentRecord> = read_json_array(&path).expect("Failed to read pool");
        let _ = std::fs::remove_file(&path);

        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].likes, 2);
        assert_eq!(comments[1].comment, "wow");
        assert_eq!(comments[1].likes, 0);
        assert_eq!(comments[2].likes, 1);
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let result: SeedResult<Vec<MediaRecord>> = read_json_array("/nonexistent/socialseed/pool.json");
        assert!(matches!(result, Err(SeedError::Input { .. })));
    }

    #[test]
    fn test_malformed_file_is_input_error() {
        let path = temp_file("broken.json", "{not json");
        let result: SeedResult<Vec<ProfileRecord>> = read_json_array(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(SeedError::Input { .. })));
    }

    #[test]
    fn test_profile_with_sparse_fields() {
        let path = temp_file(
            "profiles.json",
            r#"[{"account": "jo", "followers": 3, "posts": [{"caption": "hi", "location": null}]}]"#,
        );
        let profiles: Vec<ProfileRecord> = read_json_array(&path).expect("Failed to read profiles");
        let _ = std::fs::remove_file(&path);

        assert_eq!(profiles[0].account, "jo");
        assert_eq!(profiles[0].following, 0);
        assert!(profiles[0].posts[0].location.is_none());
        assert!(profiles[0].business_address_json.is_none());
    }
}

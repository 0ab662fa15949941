use chrono::{DateTime, Utc};
use rand::Rng;
use socialseed_types::{Business, Highlight, Location, Post, Tag, User};
use std::collections::{BTreeSet, HashMap, HashSet};
use uuid::Uuid;

use super::records::{PostRecord, ProfileRecord};

/// Location name the seed data uses to mark sponsored posts (sic)
pub const SPONSORED_LOCATION: &str = "Sponsered";

/// Primary entities derived from the profile records
#[derive(Debug, Clone, Default)]
pub struct MappedSeed {
    pub users: Vec<User>,
    pub businesses: Vec<Business>,
    pub locations: Vec<Location>,
    pub posts: Vec<Post>,
    pub highlights: Vec<Highlight>,
    /// Distinct tag names across the corpus, ids assigned in name order
    pub tags: Vec<Tag>,
}

/// Random v4 UUID drawn from the run's generator so seeded runs repeat
pub fn random_uuid<R: Rng>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Convert profile records into users, businesses, locations, posts,
/// highlights and tag candidates.
///
/// Profiles repeating an already seen account name are skipped; usernames
/// are unique in the store.
pub fn map_profiles<R: Rng>(
    profiles: &[ProfileRecord],
    now: DateTime<Utc>,
    rng: &mut R,
) -> MappedSeed {
    let mut seed = MappedSeed::default();
    let mut location_ids: HashMap<String, i64> = HashMap::new();
    let mut usernames: HashSet<&str> = HashSet::new();
    let mut tag_names: BTreeSet<&str> = BTreeSet::new();

    for profile in profiles {
        if !usernames.insert(profile.account.as_str()) {
            tracing::warn!("Skipping duplicate profile for account '{}'", profile.account);
            continue;
        }

        let user_id = random_uuid(rng);
        seed.users.push(User {
            id: user_id,
            username: profile.account.clone(),
            name: profile.profile_name.clone(),
            bio: profile.biography.clone(),
            following_count: profile.following.max(0),
            followers_count: profile.followers.max(0),
            posts_count: profile.posts_count,
            highlights_count: profile.highlights_count,
            profile_image_link: profile.profile_image_link.clone(),
            is_business: profile.is_business_account,
            is_verified: profile.is_verified,
            country: profile.country_code.clone(),
            region: profile.region.clone(),
            created_at: now,
        });

        if profile.is_business_account {
            let address = profile.business_address_json.clone().unwrap_or_default();
            seed.businesses.push(Business {
                id: random_uuid(rng),
                user_id,
                city_name: address.city_name,
                latitude: address.latitude,
                longitude: address.longitude,
                street_address: address.street_address,
                zip_code: address.zip_code.trim().parse().ok(),
            });
        }

        tag_names.extend(
            profile
                .post_hashtags
                .iter()
                .map(String::as_str)
                .filter(|tag| !tag.is_empty()),
        );

        for record in &profile.posts {
            let location_id = record.location.as_ref().map(|location| {
                let next_id = location_ids.len() as i64 + 1;
                *location_ids
                    .entry(location.name.clone())
                    .or_insert_with(|| {
                        seed.locations.push(Location {
                            id: next_id,
                            name: location.name.clone(),
                            slug: location.slug.clone(),
                            has_public_page: location.has_public_page,
                        });
                        next_id
                    })
            });

            let post_id = seed.posts.len() as i64 + 1;
            seed.posts.push(map_post(record, post_id, user_id, location_id, now));
        }

        for highlight in &profile.highlights {
            seed.highlights.push(Highlight {
                id: seed.highlights.len() as i64 + 1,
                user_id,
                title: highlight.title.clone(),
                image: highlight.image.clone(),
            });
        }
    }

    seed.tags = tag_names
        .into_iter()
        .enumerate()
        .map(|(i, name)| Tag {
            id: i as i64 + 1,
            name: name.to_string(),
        })
        .collect();

    tracing::info!(
        "Mapped {} users, {} businesses, {} locations, {} posts, {} highlights, {} tags",
        seed.users.len(),
        seed.businesses.len(),
        seed.locations.len(),
        seed.posts.len(),
        seed.highlights.len(),
        seed.tags.len()
    );

    seed
}

fn map_post(
    record: &PostRecord,
    id: i64,
    user_id: Uuid,
    location_id: Option<i64>,
    now: DateTime<Utc>,
) -> Post {
    let created_at = record
        .datetime
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or(now);

    Post {
        id,
        user_id,
        caption: record.caption.clone(),
        likes_count: record.likes.max(0),
        comments_count: record.comments.max(0),
        video_view_count: record.video_view_count.max(0),
        primary_image_url: record.image_url.clone(),
        primary_video_url: (!record.video_url.is_empty()).then(|| record.video_url.clone()),
        location_id,
        is_sponsored: record
            .location
            .as_ref()
            .is_some_and(|location| location.name == SPONSORED_LOCATION),
        url: record.url.clone(),
        created_at,
    }
}

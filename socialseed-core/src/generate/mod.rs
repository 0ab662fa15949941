pub mod comments;
pub mod engagement;
pub mod follow_graph;
pub mod media;
pub mod tags;

pub use comments::build_comment_threads;
pub use engagement::{
    sample_comment_likes, sample_post_likes, sample_story_views, AlternatingLikes,
    StoryLikePolicy,
};
pub use follow_graph::{generate_follow_graph, CountDivergence, FollowGeneration, FollowGraph};
pub use media::{attach_post_images, generate_stories, link_highlight_stories};
pub use tags::{associate_tags, cancellation, ensure_running, CancelSignal};

use socialseed_types::ShortfallPolicy;

use crate::error::{InvariantViolation, SeedResult};

/// Resolve how many rows to generate for `target` when only `available`
/// candidates exist.
pub(crate) fn apply_shortfall_policy(
    policy: ShortfallPolicy,
    subject: impl FnOnce() -> String,
    target: usize,
    available: usize,
) -> SeedResult<usize> {
    if target <= available {
        return Ok(target);
    }
    match policy {
        ShortfallPolicy::CapToAvailablePopulation => Ok(available),
        ShortfallPolicy::FailOnShortfall => Err(InvariantViolation::Shortfall {
            subject: subject(),
            target,
            available,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeedError;

    #[test]
    fn test_cap_policy_clamps() {
        let count = apply_shortfall_policy(
            ShortfallPolicy::CapToAvailablePopulation,
            || "post 1 likes".to_string(),
            10,
            3,
        )
        .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_fail_policy_reports_subject() {
        let err = apply_shortfall_policy(
            ShortfallPolicy::FailOnShortfall,
            || "post 1 likes".to_string(),
            10,
            3,
        )
        .unwrap_err();
        match err {
            SeedError::Invariant(InvariantViolation::Shortfall { subject, target, available }) => {
                assert_eq!(subject, "post 1 likes");
                assert_eq!((target, available), (10, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_target_within_population_is_untouched() {
        for policy in [ShortfallPolicy::CapToAvailablePopulation, ShortfallPolicy::FailOnShortfall] {
            assert_eq!(apply_shortfall_policy(policy, String::new, 2, 3).unwrap(), 2);
        }
    }
}

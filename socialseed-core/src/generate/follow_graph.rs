use rand::seq::index;
use rand::Rng;
use socialseed_types::{FollowEdge, ShortfallPolicy, User};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::apply_shortfall_policy;
use crate::error::SeedResult;

/// Deduplicated directed follow edges with per-user adjacency kept in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct FollowGraph {
    edges: Vec<FollowEdge>,
    seen: HashSet<(Uuid, Uuid)>,
    followers: HashMap<Uuid, Vec<Uuid>>,
    following: HashMap<Uuid, Vec<Uuid>>,
}

impl FollowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `follower -> following`. Self edges and pairs already present are
    /// skipped; returns whether the edge was added.
    pub fn insert(&mut self, follower_id: Uuid, following_id: Uuid) -> bool {
        if follower_id == following_id || !self.seen.insert((follower_id, following_id)) {
            return false;
        }
        self.edges.push(FollowEdge {
            follower_id,
            following_id,
        });
        self.followers.entry(following_id).or_default().push(follower_id);
        self.following.entry(follower_id).or_default().push(following_id);
        true
    }

    pub fn contains(&self, follower_id: &Uuid, following_id: &Uuid) -> bool {
        self.seen.contains(&(*follower_id, *following_id))
    }

    /// Followers of `user_id` in the order their edges were created
    pub fn followers_of(&self, user_id: &Uuid) -> &[Uuid] {
        self.followers.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn following_of(&self, user_id: &Uuid) -> &[Uuid] {
        self.following.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edges(&self) -> &[FollowEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Target vs realized follow counts for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountDivergence {
    pub user_id: Uuid,
    pub target_following: usize,
    pub actual_following: usize,
    pub target_followers: usize,
    pub actual_followers: usize,
}

#[derive(Debug, Clone)]
pub struct FollowGeneration {
    pub graph: FollowGraph,
    /// Users whose realized counts differ from their seed targets
    pub divergences: Vec<CountDivergence>,
}

/// Build the follow graph from each user's declared counts.
///
/// For every user, `following_count` distinct other users are sampled as
/// accounts it follows and, separately, `followers_count` distinct other
/// users as its followers. A sampled pair that already exists (from either
/// pass of any user) is skipped rather than resampled, so realized counts
/// are ceilings, not guarantees. Targets above the population size minus
/// one are handled by `policy`.
pub fn generate_follow_graph<R: Rng>(
    users: &[User],
    policy: ShortfallPolicy,
    rng: &mut R,
) -> SeedResult<FollowGeneration> {
    let population = users.len().saturating_sub(1);
    let mut graph = FollowGraph::new();

    for (idx, user) in users.iter().enumerate() {
        let following = apply_shortfall_policy(
            policy,
            || format!("user {} following", user.id),
            user.following_count.max(0) as usize,
            population,
        )?;
        for other in sample_others(rng, population, following, idx) {
            graph.insert(user.id, users[other].id);
        }

        let followers = apply_shortfall_policy(
            policy,
            || format!("user {} followers", user.id),
            user.followers_count.max(0) as usize,
            population,
        )?;
        for other in sample_others(rng, population, followers, idx) {
            graph.insert(users[other].id, user.id);
        }
    }

    let divergences: Vec<CountDivergence> = users
        .iter()
        .map(|user| CountDivergence {
            user_id: user.id,
            target_following: user.following_count.max(0) as usize,
            actual_following: graph.following_of(&user.id).len(),
            target_followers: user.followers_count.max(0) as usize,
            actual_followers: graph.followers_of(&user.id).len(),
        })
        .filter(|d| d.target_following != d.actual_following || d.target_followers != d.actual_followers)
        .collect();

    tracing::info!(
        "Generated {} follow edges for {} users ({} below target)",
        graph.len(),
        users.len(),
        divergences.len()
    );

    Ok(FollowGeneration { graph, divergences })
}

/// `amount` distinct indices of `0..=population` excluding `skip`, uniformly
fn sample_others<R: Rng>(
    rng: &mut R,
    population: usize,
    amount: usize,
    skip: usize,
) -> impl Iterator<Item = usize> {
    index::sample(rng, population, amount)
        .into_iter()
        .map(move |i| if i >= skip { i + 1 } else { i })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvariantViolation, SeedError};
    use chrono::Utc;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn users(targets: &[(i64, i64)]) -> Vec<User> {
        targets
            .iter()
            .enumerate()
            .map(|(i, (following, followers))| User {
                id: Uuid::from_u128(i as u128 + 1),
                username: format!("user{}", i),
                name: String::new(),
                bio: String::new(),
                following_count: *following,
                followers_count: *followers,
                posts_count: 0,
                highlights_count: 0,
                profile_image_link: String::new(),
                is_business: false,
                is_verified: false,
                country: String::new(),
                region: String::new(),
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_following_clamped_to_population() {
        // 1 user wants to follow 5 but only 3 others exist
        let users = users(&[(5, 0), (0, 0), (0, 0), (0, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let generation = generate_follow_graph(&users, ShortfallPolicy::CapToAvailablePopulation, &mut rng)
            .expect("capping must not fail");

        assert_eq!(generation.graph.following_of(&users[0].id).len(), 3);
        assert_eq!(generation.graph.len(), 3);
        let divergence = generation
            .divergences
            .iter()
            .find(|d| d.user_id == users[0].id)
            .expect("clamped user is reported");
        assert_eq!(divergence.target_following, 5);
        assert_eq!(divergence.actual_following, 3);
    }

    #[test]
    fn test_fail_on_shortfall_rejects_clamping() {
        let users = users(&[(5, 0), (0, 0), (0, 0), (0, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let result = generate_follow_graph(&users, ShortfallPolicy::FailOnShortfall, &mut rng);
        assert!(matches!(
            result,
            Err(SeedError::Invariant(InvariantViolation::Shortfall { target: 5, available: 3, .. }))
        ));
    }

    #[test]
    fn test_single_user_gets_no_edges() {
        let users = users(&[(10, 10)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let generation =
            generate_follow_graph(&users, ShortfallPolicy::CapToAvailablePopulation, &mut rng).unwrap();
        assert!(generation.graph.is_empty());
    }

    #[test]
    fn test_collisions_are_skipped_not_resampled() {
        // Both users want the same edge from opposite sides
        let users = users(&[(1, 0), (0, 1)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let generation =
            generate_follow_graph(&users, ShortfallPolicy::CapToAvailablePopulation, &mut rng).unwrap();

        assert_eq!(generation.graph.len(), 1);
        assert!(generation.graph.contains(&users[0].id, &users[1].id));
        assert!(generation.divergences.is_empty());
    }

    #[test]
    fn test_dense_targets_diverge_below_target() {
        // Every user wants everyone as follower and followee; dedup keeps one
        // edge per ordered pair, so realized counts equal the population.
        let users = users(&[(3, 3), (3, 3), (3, 3), (3, 3)]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let generation =
            generate_follow_graph(&users, ShortfallPolicy::CapToAvailablePopulation, &mut rng).unwrap();

        assert_eq!(generation.graph.len(), 12);
        assert!(generation.divergences.is_empty());
    }

    #[test]
    fn test_insert_rejects_self_and_duplicates() {
        let mut graph = FollowGraph::new();
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        assert!(!graph.insert(a, a));
        assert!(graph.insert(a, b));
        assert!(!graph.insert(a, b));
        assert!(graph.insert(b, a));
        assert_eq!(graph.followers_of(&b), &[a]);
        assert_eq!(graph.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_edges_unique_and_never_self(
            targets in proptest::collection::vec((0i64..12, 0i64..12), 0..10),
            seed in any::<u64>(),
        ) {
            let users = users(&targets);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let generation = generate_follow_graph(&users, ShortfallPolicy::CapToAvailablePopulation, &mut rng).unwrap();

            let mut seen = HashSet::new();
            for edge in generation.graph.edges() {
                prop_assert_ne!(edge.follower_id, edge.following_id);
                prop_assert!(seen.insert((edge.follower_id, edge.following_id)));
            }

            // Adjacency agrees with the edge list
            for user in &users {
                let followers = generation.graph.edges().iter().filter(|e| e.following_id == user.id).count();
                prop_assert_eq!(followers, generation.graph.followers_of(&user.id).len());
            }
        }

        #[test]
        fn prop_realized_counts_at_least_own_sample(
            targets in proptest::collection::vec((0i64..6, 0i64..6), 2..8),
            seed in any::<u64>(),
        ) {
            // Every pair a user samples exists afterwards, whoever created it
            // first, so the clamped target is a floor per side.
            let users = users(&targets);
            let population = users.len() - 1;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let generation = generate_follow_graph(&users, ShortfallPolicy::CapToAvailablePopulation, &mut rng).unwrap();

            for user in &users {
                let following = generation.graph.following_of(&user.id).len();
                let followers = generation.graph.followers_of(&user.id).len();
                prop_assert!(following <= population);
                prop_assert!(followers <= population);
                prop_assert!(following >= (user.following_count as usize).min(population));
                prop_assert!(followers >= (user.followers_count as usize).min(population));
            }
        }
    }
}

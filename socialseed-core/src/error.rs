use socialseed_types::EntityKind;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

pub type SeedResult<T> = Result<T, SeedError>;

/// Every failure is fatal for the run; the variants only tell the operator
/// where it happened.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Input error in {path}: {message}")]
    Input { path: PathBuf, message: String },

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Persistence error writing {kind} chunk {chunk}: {source:#}")]
    Persistence {
        kind: EntityKind,
        chunk: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("Reconciliation failed: {0:#}")]
    Reconciliation(anyhow::Error),

    #[error("Tag worker failed: {0}")]
    Worker(String),

    #[error("Generation cancelled")]
    Cancelled,
}

impl SeedError {
    pub fn input(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        SeedError::Input {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Short label used in logs and the loader summary
    pub fn kind(&self) -> &'static str {
        match self {
            SeedError::Input { .. } => "input",
            SeedError::Invariant(_) => "invariant",
            SeedError::Persistence { .. } | SeedError::Reconciliation(_) => "persistence",
            SeedError::Worker(_) | SeedError::Cancelled => "generation",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("post {post_id} needs {required} comments but its owner {owner_id} has no followers")]
    NoEligibleCommenters {
        post_id: i64,
        owner_id: Uuid,
        required: usize,
    },

    #[error("comment pool holds {available} comments but posts declare {required}")]
    CommentPoolTooSmall { available: usize, required: usize },

    #[error("{subject}: target {target} exceeds eligible population {available}")]
    Shortfall {
        subject: String,
        target: usize,
        available: usize,
    },

    #[error("duplicate {kind} row: {key}")]
    Duplicate { kind: EntityKind, key: String },

    #[error("self follow edge for user {0}")]
    SelfFollow(Uuid),

    #[error("{kind} row {key} references a user who does not follow the owner")]
    NotAFollower { kind: EntityKind, key: String },

    #[error("post {post_id} has {likes} likes, above its bound {bound}")]
    LikesAboveBound { post_id: i64, likes: usize, bound: usize },

    #[error("post {post_id} has {likes} likes but {expected} eligible likers were available")]
    LikesBelowTarget { post_id: i64, likes: usize, expected: usize },

    #[error("comment {comment_id} has invalid parent {parent_id}")]
    InvalidParent { comment_id: i64, parent_id: i64 },

    #[error("comment allocation consumed {allocated} comments, expected {expected}")]
    AllocationMismatch { allocated: usize, expected: usize },

    #[error("dependency cycle among entity kinds: {0:?}")]
    DependencyCycle(Vec<EntityKind>),
}

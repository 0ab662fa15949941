use socialseed_types::EntityKind;

use crate::config::BatchSizes;
use crate::dataset::Dataset;
use crate::db::{SeedStore, TableRow};
use crate::error::{InvariantViolation, SeedError, SeedResult};
use crate::generate::{ensure_running, CancelSignal};

/// Entity kinds whose rows must be committed before rows of `kind` can
/// reference them.
pub fn dependencies(kind: EntityKind) -> &'static [EntityKind] {
    use EntityKind::*;
    match kind {
        Users | Locations | Tags => &[],
        Businesses | Highlights | Stories | Follows => &[Users],
        Posts => &[Users, Locations],
        PostImages => &[Posts],
        HighlightStories => &[Highlights, Stories],
        PostTags => &[Posts, Tags],
        StoryTags => &[Stories, Tags],
        PostLikes | Comments => &[Posts, Users],
        StoryViews => &[Stories, Users],
        CommentLikes => &[Comments, Users],
    }
}

/// Topological write order over every entity kind
pub fn plan_order() -> SeedResult<Vec<EntityKind>> {
    plan_order_with(dependencies)
}

/// Kahn's algorithm; among ready kinds the earliest in `EntityKind::ALL`
/// goes first, so the plan is stable.
pub fn plan_order_with<F>(deps: F) -> SeedResult<Vec<EntityKind>>
where
    F: Fn(EntityKind) -> &'static [EntityKind],
{
    let mut order: Vec<EntityKind> = Vec::with_capacity(EntityKind::ALL.len());
    let mut pending: Vec<EntityKind> = EntityKind::ALL.to_vec();

    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|kind| deps(*kind).iter().all(|dep| order.contains(dep)));
        match ready {
            Some(idx) => order.push(pending.remove(idx)),
            None => return Err(InvariantViolation::DependencyCycle(pending).into()),
        }
    }
    Ok(order)
}

/// What a persistence run wrote
#[derive(Debug, Clone, Default)]
pub struct PersistReport {
    /// Rows written per kind, in write order
    pub rows: Vec<(EntityKind, usize)>,
    pub chunks: usize,
    pub users_reconciled: usize,
    pub posts_reconciled: usize,
}

impl PersistReport {
    pub fn total_rows(&self) -> usize {
        self.rows.iter().map(|(_, n)| n).sum()
    }
}

/// Writes a dataset chunk by chunk in dependency order, then reconciles
/// the denormalized counters. The first failing chunk aborts the run, and so
/// does a flipped cancel signal, checked before every chunk.
pub struct BatchDriver<'a, S: SeedStore> {
    store: &'a S,
    sizes: &'a BatchSizes,
    cancel: Option<CancelSignal>,
}

impl<'a, S: SeedStore> BatchDriver<'a, S> {
    pub fn new(store: &'a S, sizes: &'a BatchSizes) -> Self {
        Self {
            store,
            sizes,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn ensure_running(&self) -> SeedResult<()> {
        match &self.cancel {
            Some(cancel) => ensure_running(cancel),
            None => Ok(()),
        }
    }

    pub fn persist(&self, dataset: &Dataset) -> SeedResult<PersistReport> {
        let mut report = PersistReport::default();

        for kind in plan_order()? {
            let written = match kind {
                EntityKind::Users => self.write(&dataset.users, &mut report)?,
                EntityKind::Businesses => self.write(&dataset.businesses, &mut report)?,
                EntityKind::Locations => self.write(&dataset.locations, &mut report)?,
                EntityKind::Posts => self.write(&dataset.posts, &mut report)?,
                EntityKind::PostImages => self.write(&dataset.post_images, &mut report)?,
                EntityKind::Highlights => self.write(&dataset.highlights, &mut report)?,
                EntityKind::Stories => self.write(&dataset.stories, &mut report)?,
                EntityKind::HighlightStories => self.write(&dataset.highlight_stories, &mut report)?,
                EntityKind::Tags => self.write(&dataset.tags, &mut report)?,
                EntityKind::PostTags => self.write(&dataset.post_tags, &mut report)?,
                EntityKind::StoryTags => self.write(&dataset.story_tags, &mut report)?,
                EntityKind::Follows => self.write(&dataset.follows, &mut report)?,
                EntityKind::PostLikes => self.write(&dataset.post_likes, &mut report)?,
                EntityKind::StoryViews => self.write(&dataset.story_views, &mut report)?,
                EntityKind::Comments => self.write(&dataset.comments, &mut report)?,
                EntityKind::CommentLikes => self.write(&dataset.comment_likes, &mut report)?,
            };
            report.rows.push((kind, written));
        }

        self.ensure_running()?;
        report.users_reconciled = self
            .store
            .reconcile_follow_counts()
            .map_err(SeedError::Reconciliation)?;
        self.ensure_running()?;
        report.posts_reconciled = self
            .store
            .reconcile_like_counts()
            .map_err(SeedError::Reconciliation)?;

        tracing::info!(
            "Persisted {} rows in {} chunks; reconciled {} users and {} posts",
            report.total_rows(),
            report.chunks,
            report.users_reconciled,
            report.posts_reconciled
        );
        Ok(report)
    }

    fn write<R: TableRow>(&self, rows: &[R], report: &mut PersistReport) -> SeedResult<usize> {
        let size = self.sizes.for_kind(R::KIND);
        let mut written = 0;

        for (chunk, batch) in rows.chunks(size).enumerate() {
            self.ensure_running()?;
            written += self
                .store
                .insert_chunk(batch)
                .map_err(|source| SeedError::Persistence {
                    kind: R::KIND,
                    chunk,
                    source,
                })?;
            report.chunks += 1;
            tracing::debug!("Wrote {} chunk {} ({} rows)", R::KIND, chunk, batch.len());
        }

        tracing::info!("Wrote {} {} rows", written, R::KIND);
        Ok(written)
    }
}

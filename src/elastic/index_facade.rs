use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, warn};

use super::alias::{ensure_bound_to, resolve_current_index, switch_alias};
use super::cluster::Cluster;
use super::error::{ElasticError, Result, Stage};
use super::index_name::{next_index_name, system_clock, Clock};
use super::reindex::{close_old_generation, reindex};
use super::template::{publish_template, TemplateOutcome, TemplatePolicy, TemplateSource};

/// Everything one run needs to know besides the cluster itself.
#[derive(Debug, Clone)]
pub struct ReindexRequest {
    pub alias: String,
    pub secondary_alias: Option<String>,
    pub template: TemplateSource,
    pub template_policy: TemplatePolicy,
    pub reindex_timeout: Option<Duration>,
}

impl ReindexRequest {
    pub fn new(alias: &str) -> Self {
        ReindexRequest {
            alias: alias.to_string(),
            secondary_alias: None,
            template: TemplateSource::default(),
            template_policy: TemplatePolicy::default(),
            reindex_timeout: None,
        }
    }
}

#[derive(Debug)]
pub struct ReindexReport {
    pub alias: String,
    pub secondary_alias: Option<String>,
    pub current: String,
    pub next: String,
    pub template: TemplateOutcome,
    /// `OldClosed`, or `AliasSwitched` when closing the old index failed.
    pub stage: Stage,
    pub close_error: Option<ElasticError>,
    pub elapsed: Duration,
}

/// Runs the generation swap behind an alias: publish template, resolve the
/// current index, copy it into a new one, repoint the alias, close the old one.
pub struct IndexFacade<'a> {
    cluster: &'a dyn Cluster,
    clock: Clock,
}

impl<'a> IndexFacade<'a> {
    pub fn new(cluster: &'a dyn Cluster) -> Self {
        IndexFacade {
            cluster,
            clock: system_clock,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Stops at the first failing stage and reports the last committed one
    /// in `ElasticError::Aborted`.
    pub async fn reindex_alias(&self, request: &ReindexRequest) -> Result<ReindexReport> {
        let started = Instant::now();
        let alias = request.alias.as_str();
        let secondary_alias = request.secondary_alias.as_deref();
        let mut stage = Stage::Start;

        if alias.is_empty() {
            return Err(abort(
                stage,
                ElasticError::Configuration("alias name is missing".to_string()),
            ));
        }

        let template = publish_template(self.cluster, &request.template, request.template_policy)
            .await
            .map_err(|err| abort(stage, err))?;
        stage = Stage::TemplatePublished;

        let current = resolve_current_index(self.cluster, alias)
            .await
            .map_err(|err| abort(stage, err))?;
        info!(alias, index = current.as_str(), "alias resolved");
        stage = Stage::CurrentResolved;

        if let Some(secondary_alias) = secondary_alias {
            ensure_bound_to(self.cluster, secondary_alias, &current)
                .await
                .map_err(|err| abort(stage, err))?;
        }

        let next = next_index_name(&current, (self.clock)());
        stage = Stage::NextNameComputed;

        reindex(self.cluster, &current, &next, request.reindex_timeout)
            .await
            .map_err(|err| abort(stage, err))?;
        stage = Stage::Reindexed;

        switch_alias(self.cluster, alias, &current, &next, secondary_alias)
            .await
            .map_err(|err| abort(stage, err))?;
        stage = Stage::AliasSwitched;

        let close_error = match close_old_generation(self.cluster, &current).await {
            Ok(()) => {
                stage = Stage::OldClosed;
                None
            }
            Err(err) => {
                warn!(index = current.as_str(), error = %err, "old index left open");
                Some(err)
            }
        };

        Ok(ReindexReport {
            alias: alias.to_string(),
            secondary_alias: secondary_alias.map(str::to_string),
            current,
            next,
            template,
            stage,
            close_error,
            elapsed: started.elapsed(),
        })
    }
}

fn abort(stage: Stage, err: ElasticError) -> ElasticError {
    error!(%stage, error = %err, "reindex aborted");
    ElasticError::aborted(stage, err)
}

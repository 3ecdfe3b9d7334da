use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde_json::Value;
use tracing::{info, warn};

use super::cluster::Cluster;
use super::error::{ElasticError, Result};

/// What to do when the template cannot be published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TemplatePolicy {
    /// Abort the run before any index is touched.
    #[default]
    FailFast,
    /// Log the failure and reindex with whatever template the cluster has.
    BestEffort,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateSource {
    pub name: Option<String>,
    pub location: Option<PathBuf>,
}

#[derive(Debug)]
pub enum TemplateOutcome {
    Skipped,
    Published(String),
    Failed(ElasticError),
}

/// Pushes the index template so the next generation is created with the
/// right mappings. Does nothing when no template file is configured.
pub async fn publish_template(
    cluster: &dyn Cluster,
    source: &TemplateSource,
    policy: TemplatePolicy,
) -> Result<TemplateOutcome> {
    let Some(location) = source.location.as_deref() else {
        return Ok(TemplateOutcome::Skipped);
    };
    let name = source.name.as_deref().ok_or_else(|| {
        ElasticError::Configuration("a template location needs a template name".to_string())
    })?;

    match put_template(cluster, name, location).await {
        Ok(()) => {
            info!(template = name, path = %location.display(), "index template published");
            Ok(TemplateOutcome::Published(name.to_string()))
        }
        Err(err) => match policy {
            TemplatePolicy::FailFast => Err(err),
            TemplatePolicy::BestEffort => {
                warn!(template = name, error = %err, "index template not published, continuing");
                Ok(TemplateOutcome::Failed(err))
            }
        },
    }
}

async fn put_template(cluster: &dyn Cluster, name: &str, location: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(location).await?;
    if contents.trim().is_empty() {
        return Err(ElasticError::EmptyTemplate(location.to_path_buf()));
    }
    let body: Value = serde_json::from_str(&contents)?;

    let response = cluster.put_index_template(name, body).await?;
    if !response.acknowledged {
        return Err(ElasticError::TemplateCreationFailed(name.to_string()));
    }
    Ok(())
}

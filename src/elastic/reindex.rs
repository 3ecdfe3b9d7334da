use std::time::Duration;

use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use tokio::time::Instant;
use tracing::{info, warn};

use super::cluster::{Cluster, ReindexResponse};
use super::error::{ElasticError, Result};

/// Copies every document of `source` into the not yet existing `dest`.
///
/// Blocks until the cluster reports the copy as finished. There is no retry,
/// and the only deadline is `timeout` when one is configured.
pub async fn reindex(
    cluster: &dyn Cluster,
    source: &str,
    dest: &str,
    timeout: Option<Duration>,
) -> Result<ReindexResponse> {
    if cluster.index_exists(dest).await? {
        return Err(ElasticError::IndexAlreadyExists(dest.to_string()));
    }

    info!(source, dest, "reindexing");
    let bar = spinner(source, dest);
    let started = Instant::now();
    let response = cluster.reindex(source, dest, timeout).await;
    bar.finish_and_clear();
    let response = response?;

    if response.timed_out {
        return Err(failed(source, dest, "cluster reported timed_out".to_string()));
    }
    if !response.failures.is_empty() {
        return Err(failed(
            source,
            dest,
            format!("{} failures, first: {}", response.failures.len(), response.failures[0]),
        ));
    }

    info!(
        source,
        dest,
        total = response.total,
        created = response.created,
        updated = response.updated,
        took_ms = response.took,
        "reindexed in {}",
        HumanDuration(started.elapsed())
    );
    Ok(response)
}

/// Closes the retired generation. Only called once the alias has moved.
pub async fn close_old_generation(cluster: &dyn Cluster, index: &str) -> Result<()> {
    let response = cluster.close_index(index).await?;
    if !response.acknowledged {
        return Err(ElasticError::IndexCloseFailed(index.to_string()));
    }
    info!(index, "old index closed");
    Ok(())
}

fn failed(source: &str, dest: &str, reason: String) -> ElasticError {
    warn!(source, dest, reason = %reason, "reindex failed, '{}' may be a partial orphan", dest);
    ElasticError::ReindexFailed {
        source_index: source.to_string(),
        dest_index: dest.to_string(),
        reason,
    }
}

fn spinner(source: &str, dest: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("[{elapsed_precise}] {spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(format!("{} -> {}", source, dest));
    bar.enable_steady_tick(Duration::from_millis(200));
    bar
}

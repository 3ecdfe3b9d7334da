use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::cluster::Cluster;
use super::error::{ElasticError, Result};

/// Index name from one `_cat/aliases` row.
///
/// Rows look like `alias index filter routing.index routing.search is_write_index`,
/// so the index is the second whitespace separated column. Rows with fewer
/// than three columns are not trusted.
pub fn current_index_name(cat_aliases_row: &str) -> Option<String> {
    let columns: Vec<&str> = cat_aliases_row.split_whitespace().collect();
    if columns.len() < 3 {
        return None;
    }
    Some(columns[1].to_string())
}

/// Index currently bound to `alias`, which must be exactly one.
pub async fn resolve_current_index(cluster: &dyn Cluster, alias: &str) -> Result<String> {
    let body = cluster.cat_aliases(alias).await?;
    debug!(alias, body = body.trim(), "cat aliases");

    let mut indices: Vec<String> = Vec::new();
    for row in body.lines().filter(|row| !row.trim().is_empty()) {
        if let Some(index) = current_index_name(row) {
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
    }

    match indices.len() {
        0 => Err(ElasticError::NoIndexFoundForAlias(alias.to_string())),
        1 => Ok(indices.remove(0)),
        _ => Err(ElasticError::MoreThanOneIndexFoundForAlias {
            alias: alias.to_string(),
            indices,
        }),
    }
}

/// Fails unless `alias` is bound to `index` and nothing else, so that its
/// `remove` action cannot reject the switch after the copy.
pub async fn ensure_bound_to(cluster: &dyn Cluster, alias: &str, index: &str) -> Result<()> {
    let found = resolve_current_index(cluster, alias).await?;
    if found != index {
        return Err(ElasticError::AliasBoundElsewhere {
            alias: alias.to_string(),
            expected: index.to_string(),
            found,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasTarget {
    pub index: String,
    pub alias: String,
}

/// One entry of the `_aliases` actions list, e.g. `{"add": {"index": .., "alias": ..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasAction {
    Add(AliasTarget),
    Remove(AliasTarget),
}

impl AliasAction {
    pub fn add(index: &str, alias: &str) -> Self {
        AliasAction::Add(AliasTarget {
            index: index.to_string(),
            alias: alias.to_string(),
        })
    }

    pub fn remove(index: &str, alias: &str) -> Self {
        AliasAction::Remove(AliasTarget {
            index: index.to_string(),
            alias: alias.to_string(),
        })
    }
}

/// Ordered actions moving one or two aliases from `current` to `next`.
/// The plan is always submitted as a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSwitchPlan {
    actions: Vec<AliasAction>,
}

impl AliasSwitchPlan {
    pub fn new(alias: &str, current: &str, next: &str, secondary_alias: Option<&str>) -> Self {
        let mut actions = vec![AliasAction::add(next, alias), AliasAction::remove(current, alias)];
        if let Some(secondary_alias) = secondary_alias {
            actions.push(AliasAction::add(next, secondary_alias));
            actions.push(AliasAction::remove(current, secondary_alias));
        }
        AliasSwitchPlan { actions }
    }

    pub fn actions(&self) -> &[AliasAction] {
        &self.actions
    }

    pub fn body(&self) -> Value {
        json!({ "actions": self.actions })
    }
}

/// Repoints the alias (and the secondary alias) from `current` to `next`
/// in one atomic `_aliases` call.
pub async fn switch_alias(
    cluster: &dyn Cluster,
    alias: &str,
    current: &str,
    next: &str,
    secondary_alias: Option<&str>,
) -> Result<AliasSwitchPlan> {
    let plan = AliasSwitchPlan::new(alias, current, next, secondary_alias);
    info!(
        alias,
        secondary_alias,
        from = current,
        to = next,
        actions = plan.actions().len(),
        "switching alias"
    );

    let response = cluster.update_aliases(&plan).await?;
    if !response.acknowledged {
        return Err(ElasticError::AliasUpdateFailed(alias.to_string()));
    }
    Ok(plan)
}

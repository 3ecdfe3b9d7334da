//! In-memory stand-in for an Elasticsearch cluster, used by the tests.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::alias::{AliasAction, AliasSwitchPlan, AliasTarget};
use super::cluster::{Acknowledged, Cluster, ReindexResponse};
use super::error::{ElasticError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CatAliases(String),
    PutIndexTemplate(String),
    IndexExists(String),
    Reindex {
        source: String,
        dest: String,
        timeout: Option<Duration>,
    },
    UpdateAliases(Vec<AliasAction>),
    CloseIndex(String),
}

#[derive(Debug, Clone)]
struct FakeIndex {
    documents: u64,
    open: bool,
}

#[derive(Debug, Default)]
struct State {
    indices: BTreeMap<String, FakeIndex>,
    aliases: BTreeMap<String, BTreeSet<String>>,
    templates: BTreeMap<String, Value>,
    requests: Vec<Request>,
}

#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<State>>,
    failing: HashSet<&'static str>,
    unacknowledged: HashSet<&'static str>,
    reindex_failures: Vec<Value>,
    reindex_timed_out: bool,
    switch_delay: Option<Duration>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(self, name: &str, documents: u64) -> Self {
        self.lock().indices.insert(
            name.to_string(),
            FakeIndex {
                documents,
                open: true,
            },
        );
        self
    }

    pub fn with_alias(self, alias: &str, index: &str) -> Self {
        self.lock()
            .aliases
            .entry(alias.to_string())
            .or_default()
            .insert(index.to_string());
        self
    }

    /// Answer `operation` with a 500.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Answer `operation` with `{"acknowledged": false}` and change nothing.
    pub fn unacknowledged(mut self, operation: &'static str) -> Self {
        self.unacknowledged.insert(operation);
        self
    }

    pub fn with_reindex_failures(mut self, failures: Vec<Value>) -> Self {
        self.reindex_failures = failures;
        self
    }

    /// Answer the reindex with `"timed_out": true` and an empty destination.
    pub fn with_reindex_timed_out(mut self) -> Self {
        self.reindex_timed_out = true;
        self
    }

    /// Time between validating and committing an alias update.
    pub fn with_switch_delay(mut self, delay: Duration) -> Self {
        self.switch_delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    pub fn alias_members(&self, alias: &str) -> BTreeSet<String> {
        self.lock().aliases.get(alias).cloned().unwrap_or_default()
    }

    /// Members of several aliases read under one lock.
    pub fn alias_snapshot(&self, aliases: &[&str]) -> Vec<BTreeSet<String>> {
        let state = self.lock();
        aliases
            .iter()
            .map(|alias| state.aliases.get(*alias).cloned().unwrap_or_default())
            .collect()
    }

    pub fn document_count(&self, index: &str) -> Option<u64> {
        self.lock().indices.get(index).map(|index| index.documents)
    }

    pub fn is_open(&self, index: &str) -> Option<bool> {
        self.lock().indices.get(index).map(|index| index.open)
    }

    pub fn template(&self, name: &str) -> Option<Value> {
        self.lock().templates.get(name).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            return Err(ElasticError::RequestFailed {
                operation,
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn acknowledged(&self, operation: &'static str) -> bool {
        !self.unacknowledged.contains(operation)
    }
}

fn not_found(operation: &'static str, what: &str) -> ElasticError {
    ElasticError::RequestFailed {
        operation,
        status: 404,
        body: format!("{} not found", what),
    }
}

#[async_trait]
impl Cluster for FakeCluster {
    async fn cat_aliases(&self, alias: &str) -> Result<String> {
        let mut state = self.lock();
        state.requests.push(Request::CatAliases(alias.to_string()));
        self.check("cat_aliases")?;

        let rows = state
            .aliases
            .get(alias)
            .map(|indices| {
                indices
                    .iter()
                    .map(|index| format!("{} {} - - - -\n", alias, index))
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn put_index_template(&self, name: &str, body: Value) -> Result<Acknowledged> {
        let mut state = self.lock();
        state.requests.push(Request::PutIndexTemplate(name.to_string()));
        self.check("put_index_template")?;

        let acknowledged = self.acknowledged("put_index_template");
        if acknowledged {
            state.templates.insert(name.to_string(), body);
        }
        Ok(Acknowledged { acknowledged })
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let mut state = self.lock();
        state.requests.push(Request::IndexExists(index.to_string()));
        self.check("index_exists")?;
        Ok(state.indices.contains_key(index))
    }

    async fn reindex(
        &self,
        source: &str,
        dest: &str,
        timeout: Option<Duration>,
    ) -> Result<ReindexResponse> {
        let mut state = self.lock();
        state.requests.push(Request::Reindex {
            source: source.to_string(),
            dest: dest.to_string(),
            timeout,
        });
        self.check("reindex")?;

        let documents = match state.indices.get(source) {
            Some(index) if index.open => index.documents,
            _ => return Err(not_found("reindex", source)),
        };
        let copied = if self.reindex_failures.is_empty() && !self.reindex_timed_out {
            documents
        } else {
            0
        };
        state.indices.insert(
            dest.to_string(),
            FakeIndex {
                documents: copied,
                open: true,
            },
        );

        Ok(ReindexResponse {
            took: 1,
            timed_out: self.reindex_timed_out,
            total: documents,
            created: copied,
            updated: 0,
            failures: self.reindex_failures.clone(),
        })
    }

    async fn update_aliases(&self, plan: &AliasSwitchPlan) -> Result<Acknowledged> {
        // validate against a private copy, then publish it in one step
        let staged = {
            let mut state = self.lock();
            state
                .requests
                .push(Request::UpdateAliases(plan.actions().to_vec()));
            self.check("update_aliases")?;
            if !self.acknowledged("update_aliases") {
                return Ok(Acknowledged {
                    acknowledged: false,
                });
            }

            let mut staged = state.aliases.clone();
            for action in plan.actions() {
                match action {
                    AliasAction::Add(AliasTarget { index, alias }) => {
                        if !state.indices.get(index).is_some_and(|index| index.open) {
                            return Err(not_found("update_aliases", index));
                        }
                        staged.entry(alias.clone()).or_default().insert(index.clone());
                    }
                    AliasAction::Remove(AliasTarget { index, alias }) => {
                        let removed = staged
                            .get_mut(alias)
                            .is_some_and(|members| members.remove(index));
                        if !removed {
                            return Err(not_found("update_aliases", alias));
                        }
                    }
                }
            }
            staged.retain(|_, members| !members.is_empty());
            staged
        };

        if let Some(delay) = self.switch_delay {
            tokio::time::sleep(delay).await;
        }
        self.lock().aliases = staged;
        Ok(Acknowledged { acknowledged: true })
    }

    async fn close_index(&self, index: &str) -> Result<Acknowledged> {
        let mut state = self.lock();
        state.requests.push(Request::CloseIndex(index.to_string()));
        self.check("close_index")?;

        let acknowledged = self.acknowledged("close_index");
        match state.indices.get_mut(index) {
            Some(existing) => {
                if acknowledged {
                    existing.open = false;
                }
                Ok(Acknowledged { acknowledged })
            }
            None => Err(not_found("close_index", index)),
        }
    }
}

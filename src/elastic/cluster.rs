use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::alias::AliasSwitchPlan;
use super::error::Result;

/// The subset of the Elasticsearch API the reindex pipeline talks to.
///
/// Non-2xx responses are reported as `ElasticError::RequestFailed`; the body
/// of a successful response is handed back for the caller to judge.
#[async_trait]
pub trait Cluster: Send + Sync {
    /// `GET _cat/aliases/{alias}` as plain text.
    async fn cat_aliases(&self, alias: &str) -> Result<String>;

    /// `PUT _index_template/{name}`
    async fn put_index_template(&self, name: &str, body: Value) -> Result<Acknowledged>;

    /// `HEAD {index}`
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// `POST _reindex?wait_for_completion=true`, blocking until the copy is done.
    async fn reindex(
        &self,
        source: &str,
        dest: &str,
        timeout: Option<Duration>,
    ) -> Result<ReindexResponse>;

    /// `POST _aliases` with every action of the plan in one request.
    async fn update_aliases(&self, plan: &AliasSwitchPlan) -> Result<Acknowledged>;

    /// `POST {index}/_close`
    async fn close_index(&self, index: &str) -> Result<Acknowledged>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledged {
    #[serde(default)]
    pub acknowledged: bool,
}

/// Body of a synchronous `_reindex` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReindexResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub failures: Vec<Value>,
}

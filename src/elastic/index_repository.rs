use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cat::CatAliasesParts;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::http::{StatusCode, Url};
use elasticsearch::indices::{IndicesCloseParts, IndicesExistsParts, IndicesPutIndexTemplateParts};
use elasticsearch::Elasticsearch;
use serde_json::{json, Value};

use super::alias::AliasSwitchPlan;
use super::cluster::{Acknowledged, Cluster, ReindexResponse};
use super::error::{ElasticError, Result};

/// `Cluster` backed by a real Elasticsearch node.
#[derive(Clone)]
pub struct IndexRepository {
    pub(crate) client: Elasticsearch,
}

impl IndexRepository {
    pub fn new(client: Elasticsearch) -> Self {
        IndexRepository { client }
    }

    /// Builds a client for a single node. Basic auth is only sent when both
    /// username and password are given.
    pub fn connect(url: Url, username: Option<&str>, password: Option<&str>) -> Result<Self> {
        let mut builder = TransportBuilder::new(SingleNodeConnectionPool::new(url));
        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.auth(Credentials::Basic(username.to_string(), password.to_string()));
        }
        let transport = builder.build()?;
        Ok(IndexRepository::new(Elasticsearch::new(transport)))
    }
}

/// Turns a non-2xx response into `ElasticError::RequestFailed`.
async fn successful(operation: &'static str, response: Response) -> Result<Response> {
    let status = response.status_code();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ElasticError::RequestFailed {
        operation,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Cluster for IndexRepository {
    async fn cat_aliases(&self, alias: &str) -> Result<String> {
        let response = self
            .client
            .cat()
            .aliases(CatAliasesParts::Name(&[alias]))
            .send()
            .await?;
        let response = successful("cat_aliases", response).await?;
        Ok(response.text().await?)
    }

    async fn put_index_template(&self, name: &str, body: Value) -> Result<Acknowledged> {
        let response = self
            .client
            .indices()
            .put_index_template(IndicesPutIndexTemplateParts::Name(name))
            .body(body)
            .send()
            .await?;
        let response = successful("put_index_template", response).await?;
        Ok(response.json::<Acknowledged>().await?)
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;
        if response.status_code() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        successful("index_exists", response).await?;
        Ok(true)
    }

    async fn reindex(
        &self,
        source: &str,
        dest: &str,
        timeout: Option<Duration>,
    ) -> Result<ReindexResponse> {
        let mut request = self
            .client
            .reindex()
            .body(json!({
                "source": { "index": source },
                "dest": { "index": dest }
            }))
            .wait_for_completion(true)
            .refresh(true);
        if let Some(timeout) = timeout {
            request = request.request_timeout(timeout);
        }

        let response = successful("reindex", request.send().await?).await?;
        Ok(response.json::<ReindexResponse>().await?)
    }

    async fn update_aliases(&self, plan: &AliasSwitchPlan) -> Result<Acknowledged> {
        let response = self
            .client
            .indices()
            .update_aliases()
            .body(plan.body())
            .send()
            .await?;
        let response = successful("update_aliases", response).await?;
        Ok(response.json::<Acknowledged>().await?)
    }

    async fn close_index(&self, index: &str) -> Result<Acknowledged> {
        let response = self
            .client
            .indices()
            .close(IndicesCloseParts::Index(&[index]))
            .send()
            .await?;
        let response = successful("close_index", response).await?;
        Ok(response.json::<Acknowledged>().await?)
    }
}

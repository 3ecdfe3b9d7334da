use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use elasticsearch::http::Url;

use crate::elastic::error::{ElasticError, Result};
use crate::elastic::index_facade::ReindexRequest;
use crate::elastic::template::{TemplatePolicy, TemplateSource};

/// Copy the index behind an alias into a fresh generation and repoint the alias.
///
/// Every flag can also be set through the environment (or a `.env` file).
#[derive(Debug, Clone, Parser)]
#[command(name = "es_reindex", version)]
pub struct Settings {
    /// Alias that client traffic queries
    #[arg(long, env = "ALIAS")]
    pub alias: String,

    /// Additional alias moved to the new index in the same request
    #[arg(long, env = "EXTRA_ALIAS")]
    pub extra_alias: Option<String>,

    #[arg(long, env = "ELASTIC_URL", default_value = "http://localhost:9200")]
    pub elastic_url: Url,

    #[arg(long, env = "ELASTIC_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "ELASTIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Name of the index template to publish before reindexing
    #[arg(long, env = "TEMPLATE_NAME")]
    pub template_name: Option<String>,

    /// Path of the JSON index template file
    #[arg(long, env = "TEMPLATE_LOCATION")]
    pub template_location: Option<PathBuf>,

    #[arg(long, env = "TEMPLATE_POLICY", value_enum, default_value_t = TemplatePolicy::FailFast)]
    pub template_policy: TemplatePolicy,

    /// Client side deadline for the reindex call, in seconds
    #[arg(long, env = "REINDEX_TIMEOUT")]
    pub reindex_timeout: Option<u64>,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.alias.trim().is_empty() {
            return Err(ElasticError::Configuration("alias name is missing".to_string()));
        }
        if let Some(extra_alias) = self.extra_alias.as_deref() {
            if extra_alias == self.alias {
                return Err(ElasticError::Configuration(format!(
                    "extra alias '{}' is the same as the alias",
                    extra_alias
                )));
            }
        }
        if self.template_location.is_some() && self.template_name.is_none() {
            return Err(ElasticError::Configuration(
                "template location given without a template name".to_string(),
            ));
        }
        Ok(())
    }

    pub fn reindex_request(&self) -> ReindexRequest {
        ReindexRequest {
            secondary_alias: self.extra_alias.clone().filter(|alias| !alias.is_empty()),
            template: TemplateSource {
                name: self.template_name.clone(),
                location: self.template_location.clone(),
            },
            template_policy: self.template_policy,
            reindex_timeout: self.reindex_timeout.map(Duration::from_secs),
            ..ReindexRequest::new(&self.alias)
        }
    }
}

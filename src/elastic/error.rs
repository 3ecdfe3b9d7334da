use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElasticError>;

/// Last stage of the reindex pipeline that committed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    TemplatePublished,
    CurrentResolved,
    NextNameComputed,
    Reindexed,
    AliasSwitched,
    OldClosed,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::TemplatePublished => "template published",
            Stage::CurrentResolved => "current index resolved",
            Stage::NextNameComputed => "next index name computed",
            Stage::Reindexed => "reindexed",
            Stage::AliasSwitched => "alias switched",
            Stage::OldClosed => "old index closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ElasticError {
    #[error("Elasticsearch error: {0}")]
    Elasticsearch(#[from] elasticsearch::Error),

    #[error("Elasticsearch client builder error: {0}")]
    ClientBuilder(#[from] elasticsearch::http::transport::BuildError),

    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Request '{operation}' failed with status {status}: {body}")]
    RequestFailed {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("No index found for alias '{0}'")]
    NoIndexFoundForAlias(String),

    #[error("More than one index found for alias '{alias}': {indices:?}")]
    MoreThanOneIndexFoundForAlias { alias: String, indices: Vec<String> },

    #[error("Alias '{alias}' points to '{found}', expected '{expected}'")]
    AliasBoundElsewhere {
        alias: String,
        expected: String,
        found: String,
    },

    #[error("Index '{0}' already exists")]
    IndexAlreadyExists(String),

    #[error("Template file '{0}' is empty")]
    EmptyTemplate(PathBuf),

    #[error("Failed to create elasticsearch template '{0}'")]
    TemplateCreationFailed(String),

    #[error("Reindex from '{source_index}' to '{dest_index}' failed: {reason}")]
    ReindexFailed {
        source_index: String,
        dest_index: String,
        reason: String,
    },

    #[error("Failed to update elasticsearch alias '{0}'")]
    AliasUpdateFailed(String),

    #[error("Failed to close elasticsearch index '{0}'")]
    IndexCloseFailed(String),

    #[error("Reindex aborted after stage '{stage}': {source}")]
    Aborted {
        stage: Stage,
        #[source]
        source: Box<ElasticError>,
    },
}

impl ElasticError {
    pub fn aborted(stage: Stage, source: ElasticError) -> Self {
        ElasticError::Aborted {
            stage,
            source: Box::new(source),
        }
    }
}

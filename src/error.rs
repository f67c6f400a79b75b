use std::path::PathBuf;

use thiserror::Error;

use crate::parser::Rule;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {file}:\n{source}")]
    Parse {
        file: String,
        #[source]
        source: Box<pest::error::Error<Rule>>,
    },

    #[error("invalid plugin list {}: {message}", .path.display())]
    PluginList { path: PathBuf, message: String },

    #[error("invalid template `{template}`:\n{source}")]
    Template {
        template: String,
        #[source]
        source: Box<pest::error::Error<Rule>>,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

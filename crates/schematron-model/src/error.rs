use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchematronError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{}: does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("{}: not a regular file", path.display())]
    NotAFile { path: PathBuf },
    #[error("xml parse error: {0}")]
    Parse(String),
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),
    #[error("unsupported query binding '{0}' (only xslt/xslt1 are accepted)")]
    UnsupportedQueryBinding(String),
    #[error("schema declares no patterns")]
    EmptySchema,
    #[error("unknown phase '{0}'")]
    UnknownPhase(String),
    #[error("xpath evaluation failed: {expression}")]
    Xpath { expression: String },
    #[error("stylesheet rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, SchematronError>;

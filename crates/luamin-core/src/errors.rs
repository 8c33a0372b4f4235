use luamin_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse module '{module}': {source}")]
    Parse {
        module: String,
        #[source]
        source: ParseError,
    },

    #[error("module '{name}' not found (looked for {})", path.display())]
    ModuleNotFound { name: String, path: PathBuf },

    #[error("cyclic module dependency: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("source map serialization failed: {0}")]
    SourceMap(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MinifyError>;

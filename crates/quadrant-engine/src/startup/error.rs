use std::fmt;

use crate::device::ContextError;
use crate::shader::{BuildError, CompileError, LinkError, LoadError};

/// Fatal startup failures. None is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    ContextUnavailable(ContextError),
    ResourceFetchFailed(LoadError),
    ShaderCompileFailed(CompileError),
    ProgramLinkFailed(LinkError),
}

impl InitError {
    /// Short heading for the user notification.
    pub fn title(&self) -> &'static str {
        match self {
            Self::ContextUnavailable(_) => "Unable to initialize GPU context",
            Self::ResourceFetchFailed(_) => "Unable to load shader sources",
            Self::ShaderCompileFailed(_) => "Shader compilation failed",
            Self::ProgramLinkFailed(_) => "Unable to initialize shader program",
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextUnavailable(e) => write!(f, "{e}"),
            Self::ResourceFetchFailed(e) => write!(f, "{e}"),
            Self::ShaderCompileFailed(e) => write!(f, "{e}"),
            Self::ProgramLinkFailed(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ContextUnavailable(e) => Some(e),
            Self::ResourceFetchFailed(e) => Some(e),
            Self::ShaderCompileFailed(e) => Some(e),
            Self::ProgramLinkFailed(e) => Some(e),
        }
    }
}

impl From<BuildError> for InitError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::Compile(e) => Self::ShaderCompileFailed(e),
            BuildError::Link(e) => Self::ProgramLinkFailed(e),
        }
    }
}

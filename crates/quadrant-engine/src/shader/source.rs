use std::fmt;
use std::path::{Path, PathBuf};

/// Where the two shader stages are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// WGSL text for both stages.
///
/// Loaded once and consumed by compilation; never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads both stages from disk.
    ///
    /// Both reads finish before this returns. The first failing path is
    /// reported; the other stage is not read afterwards.
    pub fn load(paths: &ShaderPaths) -> Result<Self, LoadError> {
        let vertex = read_text(&paths.vertex)?;
        let fragment = read_text(&paths.fragment)?;
        log::debug!(
            "loaded shader sources ({} + {} bytes)",
            vertex.len(),
            fragment.len()
        );
        Ok(Self { vertex, fragment })
    }
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// A shader resource could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load `{}`: {}", self.path.display(), self.reason)
    }
}

impl std::error::Error for LoadError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("quadrant-{}-{name}", std::process::id()))
    }

    #[test]
    fn loads_both_stages() {
        let vs = scratch("load.vert.wgsl");
        let fs = scratch("load.frag.wgsl");
        std::fs::write(&vs, "// vertex").unwrap();
        std::fs::write(&fs, "// fragment").unwrap();

        let src = ShaderSource::load(&ShaderPaths::new(&vs, &fs)).unwrap();
        assert_eq!(src, ShaderSource::new("// vertex", "// fragment"));

        let _ = std::fs::remove_file(vs);
        let _ = std::fs::remove_file(fs);
    }

    #[test]
    fn missing_fragment_reports_its_path() {
        let vs = scratch("present.vert.wgsl");
        let fs = scratch("absent.frag.wgsl");
        std::fs::write(&vs, "// vertex").unwrap();

        let err = ShaderSource::load(&ShaderPaths::new(&vs, &fs)).unwrap_err();
        assert_eq!(err.path, fs);
        assert!(err.to_string().contains("absent.frag.wgsl"));

        let _ = std::fs::remove_file(vs);
    }
}

use std::path::{Path, PathBuf};

use tracing::debug;

use super::scaffolder::TESTS_DIR;
use crate::domain::enrichment::GeneratedArtifact;
use crate::domain::error::Result;
use crate::infrastructure::storage::write_atomic;

const MAX_SLUG_CHARS: usize = 80;
pub const ARTIFACT_EXTENSION: &str = "spec.js";

/// Lower-cased scenario with every non-alphanumeric character turned into `-`.
pub fn slugify(scenario: &str) -> String {
    let slug: String = scenario
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .take(MAX_SLUG_CHARS)
        .collect();
    if slug.is_empty() {
        "sin-escenario".to_string()
    } else {
        slug
    }
}

/// `test<NNN>-<slug>.spec.js` for a 1-based sequence number.
pub fn artifact_file_name(sequence: usize, scenario: &str) -> String {
    format!("test{:03}-{}.{}", sequence, slugify(scenario), ARTIFACT_EXTENSION)
}

pub struct ArtifactEmitter;

impl ArtifactEmitter {
    /// Writes the artifact under `tests/`, replacing any file of the same name.
    pub async fn emit(
        project: &Path,
        sequence: usize,
        artifact: &GeneratedArtifact,
        scenario: &str,
    ) -> Result<PathBuf> {
        let path = project
            .join(TESTS_DIR)
            .join(artifact_file_name(sequence, scenario));
        write_atomic(&path, &artifact.code).await?;
        debug!(path = %path.display(), bytes = artifact.code.len(), "Artifact written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::PayloadSource;

    #[test]
    fn test_file_name() {
        assert_eq!(
            artifact_file_name(7, "Login exitoso (admin)"),
            "test007-login-exitoso--admin-.spec.js"
        );
        assert_eq!(artifact_file_name(12, "Búsqueda"), "test012-b-squeda.spec.js");
        assert_eq!(artifact_file_name(1, "  "), "test001-sin-escenario.spec.js");
    }

    #[test]
    fn test_slug_is_capped() {
        assert_eq!(slugify(&"a".repeat(200)).len(), MAX_SLUG_CHARS);
    }

    #[tokio::test]
    async fn test_emit_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(TESTS_DIR)).unwrap();
        let mut artifact = GeneratedArtifact {
            code: "// v1".to_string(),
            source: PayloadSource::Generated,
        };

        let first = ArtifactEmitter::emit(dir.path(), 1, &artifact, "Login").await.unwrap();
        artifact.code = "// v2".to_string();
        let second = ArtifactEmitter::emit(dir.path(), 1, &artifact, "Login").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(second).unwrap(), "// v2");
    }
}

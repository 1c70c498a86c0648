use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::domain::archetype::{ArchetypeLabel, ArchetypeTemplate};
use crate::domain::error::Result;

fn builtin_template(label: ArchetypeLabel) -> Option<&'static str> {
    match label {
        ArchetypeLabel::Login => Some(include_str!("templates/login.js")),
        ArchetypeLabel::Ecommerce => Some(include_str!("templates/ecommerce.js")),
        ArchetypeLabel::Form => Some(include_str!("templates/form.js")),
        ArchetypeLabel::Responsive => Some(include_str!("templates/responsive.js")),
        ArchetypeLabel::Generic => None,
    }
}

/// Reference templates kept as editable files in the archetypes directory.
#[derive(Debug, Clone)]
pub struct ArchetypeStore {
    dir: PathBuf,
}

impl ArchetypeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes the base templates that are not on disk yet. Existing files are left
    /// untouched so local edits survive restarts. Returns how many were written.
    pub async fn seed_base(&self) -> Result<usize> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut written = 0;
        for label in ArchetypeLabel::TEMPLATED {
            let (Some(file), Some(code)) = (label.template_file(), builtin_template(label)) else {
                continue;
            };
            let path = self.dir.join(file);
            if tokio::fs::try_exists(&path).await? {
                debug!(path = %path.display(), "Archetype already present");
                continue;
            }
            tokio::fs::write(&path, code).await?;
            written += 1;
        }

        if written > 0 {
            info!(count = written, dir = %self.dir.display(), "Seeded base archetypes");
        }
        Ok(written)
    }

    /// Template for `label`, read from disk and falling back to the built-in copy.
    pub async fn template(&self, label: ArchetypeLabel) -> Option<ArchetypeTemplate> {
        let file = label.template_file()?;
        let path = self.dir.join(file);

        let code = match tokio::fs::read_to_string(&path).await {
            Ok(code) if !code.trim().is_empty() => code,
            Ok(_) => builtin_template(label)?.to_string(),
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %err, path = %path.display(), "Failed to read archetype");
                }
                builtin_template(label)?.to_string()
            }
        };

        Some(ArchetypeTemplate { label, code })
    }
}

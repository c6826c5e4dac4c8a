use crate::domain::error::ConfigError;
use crate::domain::models::{Classification, EntryKind};
use crate::domain::rules::ExclusionRuleSet;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::trace;
use std::path::{Component, Path};

/// Decides per entry whether it belongs in the context.
///
/// Decisions depend only on the relative path and entry kind; file content is
/// never inspected, so a text file with an unknown extension is dropped and a
/// binary file with a source extension is kept.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    rules: ExclusionRuleSet,
    excluded_files: GlobSet,
}

impl PathClassifier {
    pub fn new(rules: ExclusionRuleSet) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &rules.excluded_file_patterns {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let excluded_files = builder
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: rules.excluded_file_patterns.join(","),
                source,
            })?;

        Ok(Self {
            rules,
            excluded_files,
        })
    }

    pub fn classify(&self, relative_path: &Path, kind: EntryKind) -> Classification {
        let name = match relative_path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return Classification::Include,
        };

        if self.has_excluded_ancestor(relative_path) {
            trace!("Under excluded directory: {}", relative_path.display());
            return match kind {
                EntryKind::Directory => Classification::ExcludeDirectory,
                _ => Classification::ExcludeFile,
            };
        }

        match kind {
            EntryKind::Directory => {
                if self.rules.is_excluded_dir(&name) {
                    trace!("Excluded directory: {}", relative_path.display());
                    Classification::ExcludeDirectory
                } else {
                    Classification::Include
                }
            }
            EntryKind::File => {
                if self.excluded_files.is_match(name.as_ref()) {
                    trace!("Denylisted file: {}", relative_path.display());
                    return Classification::ExcludeFile;
                }
                let allowed = relative_path
                    .extension()
                    .map(|ext| self.rules.is_allowed_extension(&ext.to_string_lossy()))
                    .unwrap_or(false);
                if allowed {
                    Classification::Include
                } else {
                    trace!("Unsupported extension: {}", relative_path.display());
                    Classification::ExcludeFile
                }
            }
            EntryKind::Other => Classification::ExcludeFile,
        }
    }

    fn has_excluded_ancestor(&self, relative_path: &Path) -> bool {
        let Some(parent) = relative_path.parent() else {
            return false;
        };
        parent.components().any(|component| match component {
            Component::Normal(part) => self.rules.is_excluded_dir(&part.to_string_lossy()),
            _ => false,
        })
    }
}

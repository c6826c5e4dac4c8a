use crate::domain::error::{ConfigError, SkipReason};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Include,
    ExcludeDirectory,
    ExcludeFile,
}

/// One visited filesystem entry. Excluded directories keep no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub name: String,
    pub relative_path: String,
    pub kind: EntryKind,
    pub classification: Classification,
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    pub fn new(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        kind: EntryKind,
        classification: Classification,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            kind,
            classification,
            children: Vec::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_included(&self) -> bool {
        self.classification == Classification::Include
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative_path: String,
    pub content: String,
    pub original_bytes: u64,
    /// Chars decoded from the bytes read. Exact unless `truncated`, where the
    /// read was capped and this is only a lower bound.
    pub original_chars: usize,
    pub truncated: bool,
    pub encoding: TextEncoding,
}

impl FileRecord {
    pub fn extension(&self) -> Option<&str> {
        let name = self.relative_path.rsplit('/').next()?;
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files_included: usize,
    pub files_truncated: usize,
    pub files_omitted: usize,
    pub excluded_directories: usize,
    pub excluded_files: usize,
    pub directories_visited: usize,
    pub bytes_read: u64,
    pub skipped: Vec<SkippedEntry>,
}

impl ScanSummary {
    pub fn files_skipped(&self) -> usize {
        self.skipped.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedContext {
    pub root_name: String,
    pub tree: DirectoryNode,
    pub tree_text: String,
    pub files: Vec<FileRecord>,
    pub summary: ScanSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub max_chars_per_file: usize,
    pub max_files: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_chars_per_file: ContextConfig::DEFAULT_MAX_CHARS,
            max_files: ContextConfig::DEFAULT_MAX_FILES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub root_path: PathBuf,
    pub max_chars: usize,
    pub max_files: usize,
    pub extra_extensions: Vec<String>,
    pub extra_excludes: Vec<String>,
    pub dry_run: bool,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
    pub cooldown: Duration,
    pub output_path: Option<String>,
    pub clipboard: bool,
}

impl ContextConfig {
    pub const DEFAULT_MAX_CHARS: usize = 5000;
    pub const DEFAULT_MAX_FILES: usize = 500;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta/";

    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            max_chars: Self::DEFAULT_MAX_CHARS,
            max_files: Self::DEFAULT_MAX_FILES,
            extra_extensions: Vec::new(),
            extra_excludes: Vec::new(),
            dry_run: false,
            model: Self::DEFAULT_MODEL.to_string(),
            api_base: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            cooldown: Duration::ZERO,
            output_path: None,
            clipboard: false,
        }
    }

    pub fn limits(&self) -> ScanLimits {
        ScanLimits {
            max_chars_per_file: self.max_chars,
            max_files: self.max_files,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chars == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "max-chars",
                value: self.max_chars,
            });
        }
        if self.max_files == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "max-files",
                value: self.max_files,
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidLimit {
                name: "timeout",
                value: 0,
            });
        }
        if !self.root_path.exists() {
            return Err(ConfigError::DirectoryNotFound(self.root_path.clone()));
        }
        if !self.root_path.is_dir() {
            return Err(ConfigError::NotADirectory(self.root_path.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_validate_accepts_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = ContextConfig::new(temp_dir.path());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = ContextConfig::new(temp_dir.path().join("missing"));

        assert!(matches!(
            config.validate(),
            Err(ConfigError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("main.py");
        File::create(&file_path).unwrap();

        let config = ContextConfig::new(&file_path);
        assert!(matches!(config.validate(), Err(ConfigError::NotADirectory(_))));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let temp_dir = TempDir::new().unwrap();

        let mut config = ContextConfig::new(temp_dir.path());
        config.max_chars = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit { name: "max-chars", .. })
        ));

        let mut config = ContextConfig::new(temp_dir.path());
        config.max_files = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit { name: "max-files", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = ContextConfig::new(temp_dir.path());
        config.timeout = Duration::ZERO;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit { name: "timeout", value: 0 })
        ));
    }

    #[test]
    fn test_file_record_extension() {
        let mut record = FileRecord {
            relative_path: "src/app/main.PY".to_string(),
            content: String::new(),
            original_bytes: 0,
            original_chars: 0,
            truncated: false,
            encoding: TextEncoding::Utf8,
        };
        assert_eq!(record.extension(), Some("PY"));

        record.relative_path = "Makefile".to_string();
        assert_eq!(record.extension(), None);

        record.relative_path = "config/.env".to_string();
        assert_eq!(record.extension(), None);
    }
}

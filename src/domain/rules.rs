use std::collections::BTreeSet;

const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    "node_modules",
    "venv",
    ".venv",
    "env",
    ".env",
    ".idea",
    ".vscode",
    "dist",
    "build",
    "coverage",
    "target",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    ".cache",
    ".next",
];

const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "md", "txt", "html", "css", "json", "yml", "yaml", "toml",
    "java", "c", "cpp", "h", "hpp", "rs", "go", "rb", "sh", "sql", "kt", "swift", "cs", "php",
    "scala", "cfg", "ini", "xml", "vue", "svelte", "proto",
];

// Matched against the file name only.
const DEFAULT_EXCLUDED_FILE_PATTERNS: &[&str] = &[
    ".env",
    "*.lock",
    "package-lock.json",
    "pnpm-lock.yaml",
    "*.min.js",
    "*.min.css",
    "*.map",
    "*.pyc",
    "*.pyo",
];

/// Fixed inclusion/exclusion configuration consulted by the path classifier.
///
/// Built once per run (defaults plus CLI additions) and never mutated after
/// the classifier is constructed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRuleSet {
    pub excluded_dirs: BTreeSet<String>,
    /// Lowercase, without the leading dot.
    pub allowed_extensions: BTreeSet<String>,
    pub excluded_file_patterns: Vec<String>,
}

impl Default for ExclusionRuleSet {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_file_patterns: DEFAULT_EXCLUDED_FILE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExclusionRuleSet {
    /// Accepts `.rs`, `rs` or `RS`; empty entries are ignored.
    pub fn with_extra_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() {
                self.allowed_extensions.insert(ext);
            }
        }
        self
    }

    pub fn with_extra_excluded_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dir in dirs {
            let dir = dir.as_ref().trim().trim_matches('/');
            if !dir.is_empty() {
                self.excluded_dirs.insert(dir.to_string());
            }
        }
        self
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.contains(name)
    }

    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .contains(extension.to_lowercase().as_str())
    }
}

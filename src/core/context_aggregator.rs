use crate::core::path_classifier::PathClassifier;
use crate::core::tree_renderer::{compare_entries, render_tree_text};
use crate::domain::error::SkipReason;
use crate::domain::models::{
    AggregatedContext, Classification, DirectoryNode, EntryKind, FileRecord, ScanLimits,
    ScanSummary, SkippedEntry,
};
use crate::infra::file_system::{ScanProgress, load_file};
use log::{debug, info, warn};
use std::fs;
use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

/// Walks `root` once and produces the tree, the loaded files and the counters.
///
/// The walk is sorted directories-first, so file records come out in the same
/// order the tree renders them. Excluded directories are pruned and never
/// entered. Per-entry failures land in `summary.skipped`.
pub fn aggregate(
    root: &Path,
    classifier: &PathClassifier,
    limits: &ScanLimits,
    progress: &mut ScanProgress,
) -> AggregatedContext {
    info!("Gathering project context from {}", root.display());

    let root_name = root_display_name(root);
    let mut summary = ScanSummary {
        directories_visited: 1,
        ..ScanSummary::default()
    };
    let mut files: Vec<FileRecord> = Vec::new();
    let mut stack = vec![DirectoryNode::new(
        root_name.clone(),
        "",
        EntryKind::Directory,
        Classification::Include,
    )];

    let mut walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by(compare_dir_entries)
        .into_iter();

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| relative_display(root, p))
                    .unwrap_or_else(|| root_name.clone());
                let reason = if err.loop_ancestor().is_some() {
                    SkipReason::FilesystemLoop
                } else if let Some(io_err) = err.io_error() {
                    SkipReason::from_io(io_err)
                } else {
                    SkipReason::Io(err.to_string())
                };
                warn!("Skipping {}: {}", path, reason);
                summary.skipped.push(SkippedEntry { path, reason });
                continue;
            }
        };

        while stack.len() > entry.depth() {
            fold_top(&mut stack);
        }

        let relative = relative_display(root, entry.path());
        let name = entry.file_name().to_string_lossy().into_owned();
        let kind = entry_kind(&entry);
        let classification = classifier.classify(Path::new(&relative), kind);
        progress.update(classification == Classification::Include);

        let node = DirectoryNode::new(name, relative.clone(), kind, classification);
        match (kind, classification) {
            (EntryKind::Directory, Classification::Include) => {
                summary.directories_visited += 1;
                stack.push(node);
            }
            (EntryKind::Directory, _) => {
                debug!("Pruning excluded directory {}", relative);
                walker.skip_current_dir();
                summary.excluded_directories += 1;
                push_child(&mut stack, node);
            }
            (_, Classification::Include) => {
                if files.len() >= limits.max_files {
                    debug!("File limit reached, omitting {}", relative);
                    summary.files_omitted += 1;
                } else {
                    match load_file(entry.path(), &relative, limits.max_chars_per_file) {
                        Ok(record) => {
                            if record.truncated {
                                summary.files_truncated += 1;
                            }
                            summary.bytes_read += record.content.len() as u64;
                            files.push(record);
                        }
                        Err(reason) => summary.skipped.push(SkippedEntry {
                            path: relative.clone(),
                            reason,
                        }),
                    }
                }
                push_child(&mut stack, node);
            }
            _ => {
                summary.excluded_files += 1;
                push_child(&mut stack, node);
            }
        }
    }
    progress.finish();

    while stack.len() > 1 {
        fold_top(&mut stack);
    }
    let tree = stack.pop().unwrap_or_else(|| {
        DirectoryNode::new(root_name.clone(), "", EntryKind::Directory, Classification::Include)
    });

    summary.files_included = files.len();
    info!(
        "Found {} valid files to analyze ({} truncated, {} skipped)",
        summary.files_included,
        summary.files_truncated,
        summary.files_skipped()
    );

    AggregatedContext {
        root_name,
        tree_text: render_tree_text(&tree),
        tree,
        files,
        summary,
    }
}

fn compare_dir_entries(a: &DirEntry, b: &DirEntry) -> std::cmp::Ordering {
    compare_entries(
        sorts_as_dir(a),
        &a.file_name().to_string_lossy(),
        sorts_as_dir(b),
        &b.file_name().to_string_lossy(),
    )
}

// walkdir sorts before following links, so a symlinked directory still
// reports a symlink type here.
fn sorts_as_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn entry_kind(entry: &DirEntry) -> EntryKind {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

fn push_child(stack: &mut [DirectoryNode], node: DirectoryNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn fold_top(stack: &mut Vec<DirectoryNode>) {
    if let Some(done) = stack.pop() {
        push_child(stack, done);
    }
}

/// Root-relative path joined with `/` on every platform.
fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn root_display_name(root: &Path) -> String {
    fs::canonicalize(root)
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| root.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

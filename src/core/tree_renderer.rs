use crate::domain::models::DirectoryNode;
use std::cmp::Ordering;

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Directories first, then case-insensitive name order. Exact byte order
/// breaks ties so `A.md` and `a.md` always land the same way.
pub fn compare_entries(a_is_dir: bool, a_name: &str, b_is_dir: bool, b_name: &str) -> Ordering {
    b_is_dir
        .cmp(&a_is_dir)
        .then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
        .then_with(|| a_name.cmp(b_name))
}

pub fn render_tree(root: &DirectoryNode) -> Vec<String> {
    let mut lines = vec![format!("{}/", root.name)];
    render_children(root, "", &mut lines);
    lines
}

pub fn render_tree_text(root: &DirectoryNode) -> String {
    render_tree(root).join("\n")
}

fn render_children(node: &DirectoryNode, prefix: &str, lines: &mut Vec<String>) {
    let mut children: Vec<&DirectoryNode> =
        node.children.iter().filter(|c| c.is_included()).collect();
    children.sort_by(|a, b| compare_entries(a.is_dir(), &a.name, b.is_dir(), &b.name));

    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { CORNER } else { BRANCH };
        let suffix = if child.is_dir() { "/" } else { "" };
        lines.push(format!("{prefix}{connector}{}{suffix}", child.name));

        if child.is_dir() {
            let extension = if is_last { SPACE } else { PIPE };
            render_children(child, &format!("{prefix}{extension}"), lines);
        }
    }
}

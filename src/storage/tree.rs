//! In-memory directory tree synthesized from a backend listing.
//!
//! Every backend family lists differently (prefix/delimiter pages, real nested
//! directories, flat listings with folder metadata). Adapters fold whatever they
//! receive into a [`TreeNode`] so that lookups, existence checks and rendering
//! behave the same everywhere.

use crate::error::{NotFoundSnafu, Result};
use crate::storage::utils::path::segments;
use snafu::OptionExt;
use std::collections::{BTreeMap, BTreeSet};

/// One entry of a nested listing: a file name, or a directory with its own entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    File(String),
    Dir(String, Vec<ListingEntry>),
}

impl ListingEntry {
    pub fn file(name: impl Into<String>) -> Self {
        ListingEntry::File(name.into())
    }

    pub fn dir(name: impl Into<String>, children: Vec<ListingEntry>) -> Self {
        ListingEntry::Dir(name.into(), children)
    }
}

/// A directory: its sorted file names and its sorted child directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    name: String,
    files: BTreeSet<String>,
    dirs: BTreeMap<String, TreeNode>,
}

enum RenderItem<'a> {
    Dir(&'a TreeNode),
    File(&'a str),
}

impl TreeNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeSet::new(),
            dirs: BTreeMap::new(),
        }
    }

    /// Build a tree from a nested listing. Input order does not matter.
    pub fn build(name: impl Into<String>, listing: Vec<ListingEntry>) -> Self {
        let mut root = Self::new(name);
        let mut pending: Vec<(Vec<String>, Vec<ListingEntry>)> = vec![(Vec::new(), listing)];

        while let Some((prefix, entries)) = pending.pop() {
            for entry in entries {
                match entry {
                    ListingEntry::File(file) => {
                        root.ensure_dir(&prefix).files.insert(file);
                    }
                    ListingEntry::Dir(dir, children) => {
                        let mut path = prefix.clone();
                        path.push(dir);
                        root.ensure_dir(&path);
                        pending.push((path, children));
                    }
                }
            }
        }
        root
    }

    fn ensure_dir<S: AsRef<str>>(&mut self, path: &[S]) -> &mut TreeNode {
        let mut node = self;
        for segment in path {
            let segment = segment.as_ref();
            node = node
                .dirs
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::new(segment));
        }
        node
    }

    /// Record a file at `path`, creating intermediate directories.
    pub fn insert_file(&mut self, path: &str) {
        let segs = segments(path);
        if let Some((file, dirs)) = segs.split_last() {
            self.ensure_dir(dirs).files.insert(file.to_string());
        }
    }

    /// Record a directory at `path`, creating intermediate directories.
    pub fn insert_dir(&mut self, path: &str) {
        self.ensure_dir(&segments(path));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn dirs(&self) -> impl Iterator<Item = &TreeNode> {
        self.dirs.values()
    }

    /// True when the directory holds neither files nor subdirectories.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    /// Walk down child directories one segment at a time.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Result<&TreeNode> {
        let mut node = self;
        for (depth, segment) in path.iter().enumerate() {
            node = node.dirs.get(segment.as_ref()).with_context(|| NotFoundSnafu {
                path: path[..=depth]
                    .iter()
                    .map(|s| s.as_ref())
                    .collect::<Vec<_>>()
                    .join("/"),
            })?;
        }
        Ok(node)
    }

    /// [`lookup`](Self::lookup) on a slash-delimited path; "" and "/" are the root.
    pub fn lookup_path(&self, path: &str) -> Result<&TreeNode> {
        self.lookup(&segments(path))
    }

    /// Whether a file exists at `path`. Missing directories mean "no".
    pub fn file_exists(&self, path: &str) -> bool {
        if path.ends_with('/') {
            return false;
        }
        let segs = segments(path);
        let Some((file, dirs)) = segs.split_last() else {
            return false;
        };
        self.lookup(dirs)
            .map(|node| node.files.contains(*file))
            .unwrap_or(false)
    }

    pub fn dir_exists(&self, path: &str) -> bool {
        self.lookup_path(path).is_ok()
    }

    /// Immediate children: directories with a trailing slash first, then files.
    pub fn listing(&self) -> String {
        self.dirs
            .keys()
            .map(|dir| format!("{dir}/"))
            .chain(self.files.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Relative paths of every file below this node, depth-first in name order.
    pub fn file_paths(&self) -> Vec<String> {
        self.collect_paths(true)
    }

    /// Relative paths of every directory below this node, parents before children.
    pub fn dir_paths(&self) -> Vec<String> {
        self.collect_paths(false)
    }

    fn collect_paths(&self, files: bool) -> Vec<String> {
        let mut out = Vec::new();
        let mut pending: Vec<(String, &TreeNode)> = vec![(String::new(), self)];
        while let Some((prefix, node)) = pending.pop() {
            if files {
                out.extend(node.files.iter().map(|f| format!("{prefix}{f}")));
            }
            for child in node.dirs.values().rev() {
                let child_path = format!("{prefix}{}/", child.name);
                if !files {
                    out.push(child_path.trim_end_matches('/').to_string());
                }
                pending.push((child_path, child));
            }
        }
        if !files {
            out.sort();
        }
        out
    }

    /// Tree-drawing rendering rooted at this node's name.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.name);
        out.push('\n');

        let mut stack: Vec<(RenderItem<'_>, String, bool)> = Vec::new();
        Self::push_children(&mut stack, self, "");

        while let Some((item, prefix, last)) = stack.pop() {
            let branch = if last { "└── " } else { "├── " };
            match item {
                RenderItem::File(name) => {
                    out.push_str(&format!("{prefix}{branch}{name}\n"));
                }
                RenderItem::Dir(node) => {
                    out.push_str(&format!("{prefix}{branch}{}\n", node.name));
                    let indent = if last { "    " } else { "│   " };
                    Self::push_children(&mut stack, node, &format!("{prefix}{indent}"));
                }
            }
        }

        out.pop();
        out
    }

    fn push_children<'a>(
        stack: &mut Vec<(RenderItem<'a>, String, bool)>,
        node: &'a TreeNode,
        prefix: &str,
    ) {
        let items: Vec<RenderItem<'a>> = node
            .dirs
            .values()
            .map(RenderItem::Dir)
            .chain(node.files.iter().map(|f| RenderItem::File(f.as_str())))
            .collect();
        let count = items.len();
        for (index, item) in items.into_iter().enumerate().rev() {
            stack.push((item, prefix.to_string(), index + 1 == count));
        }
    }
}

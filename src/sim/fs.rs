//! Simulated filesystem
//!
//! A tree of files and directories keyed by normalized absolute paths.
//! All lookups are misses (`None`) rather than errors; the shell layer
//! turns misses into the familiar "No such file or directory" text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single filesystem entry.
///
/// Children are kept in a `BTreeMap` so listings iterate in a stable
/// order — replaying the same commands must print the same bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FsNode {
    File {
        size: u64,
        mode: u32,
        content: String,
    },
    Dir {
        mode: u32,
        children: BTreeMap<String, FsNode>,
    },
}

impl FsNode {
    /// A regular file whose size is its content length.
    pub fn file(content: &str) -> Self {
        FsNode::File {
            size: content.len() as u64,
            mode: 0o644,
            content: content.to_string(),
        }
    }

    /// A file with a declared size independent of its content, for
    /// simulating multi-gigabyte logs without storing them.
    pub fn file_sized(content: &str, size: u64) -> Self {
        FsNode::File {
            size,
            mode: 0o644,
            content: content.to_string(),
        }
    }

    /// An empty directory.
    pub fn dir() -> Self {
        FsNode::Dir {
            mode: 0o755,
            children: BTreeMap::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FsNode::Dir { .. })
    }

    pub fn size(&self) -> u64 {
        match self {
            FsNode::File { size, .. } => *size,
            // Directories report the sum of their entries, like `du`.
            FsNode::Dir { children, .. } => children.values().map(FsNode::size).sum(),
        }
    }

    pub fn mode(&self) -> u32 {
        match self {
            FsNode::File { mode, .. } | FsNode::Dir { mode, .. } => *mode,
        }
    }

    pub fn set_mode(&mut self, new_mode: u32) {
        match self {
            FsNode::File { mode, .. } | FsNode::Dir { mode, .. } => *mode = new_mode,
        }
    }

    /// Render the mode like `ls -l`: `drwxr-xr-x`, `-rw-r--r--`.
    pub fn mode_string(&self) -> String {
        let kind = if self.is_dir() { 'd' } else { '-' };
        let mut out = String::with_capacity(10);
        out.push(kind);
        let mode = self.mode();
        for shift in [6u32, 3, 0] {
            let bits = (mode >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        out
    }
}

/// Normalize a path to absolute form with no trailing slash: `/var/log`.
/// The root itself normalizes to `/`.
pub fn normalize(path: &str) -> String {
    let parts = components(path);
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Split a path into its non-empty components.
pub fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|p| !p.is_empty()).collect()
}

/// The simulated filesystem tree. The root is always a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsTree {
    root: FsNode,
}

impl Default for FsTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FsTree {
    pub fn new() -> Self {
        Self { root: FsNode::dir() }
    }

    /// Look up the node at `path`, if any.
    pub fn node_at(&self, path: &str) -> Option<&FsNode> {
        let mut node = &self.root;
        for part in components(path) {
            match node {
                FsNode::Dir { children, .. } => node = children.get(part)?,
                FsNode::File { .. } => return None,
            }
        }
        Some(node)
    }

    fn node_at_mut(&mut self, path: &str) -> Option<&mut FsNode> {
        let mut node = &mut self.root;
        for part in components(path) {
            match node {
                FsNode::Dir { children, .. } => node = children.get_mut(part)?,
                FsNode::File { .. } => return None,
            }
        }
        Some(node)
    }

    /// Read a file's content. `None` for missing paths and directories.
    pub fn read_file(&self, path: &str) -> Option<&str> {
        match self.node_at(path)? {
            FsNode::File { content, .. } => Some(content),
            FsNode::Dir { .. } => None,
        }
    }

    /// List a directory's entries in stable (sorted) order.
    pub fn list_dir(&self, path: &str) -> Option<Vec<(&String, &FsNode)>> {
        match self.node_at(path)? {
            FsNode::Dir { children, .. } => Some(children.iter().collect()),
            FsNode::File { .. } => None,
        }
    }

    /// Insert `node` at `path`. The parent must already exist and be a
    /// directory; an existing entry at `path` is replaced.
    pub fn insert(&mut self, path: &str, node: FsNode) -> bool {
        let parts = components(path);
        let Some((name, parent)) = parts.split_last() else {
            return false; // cannot replace the root
        };
        let parent_path = format!("/{}", parent.join("/"));
        match self.node_at_mut(&parent_path) {
            Some(FsNode::Dir { children, .. }) => {
                children.insert(name.to_string(), node);
                true
            }
            _ => false,
        }
    }

    /// Create an empty directory at `path`. Fails if the entry already
    /// exists or the parent is missing, mirroring `mkdir` without `-p`.
    pub fn mkdir(&mut self, path: &str) -> bool {
        if self.node_at(path).is_some() {
            return false;
        }
        self.insert(path, FsNode::dir())
    }

    /// Remove the entry at `path`, returning it.
    pub fn remove(&mut self, path: &str) -> Option<FsNode> {
        let parts = components(path);
        let (name, parent) = parts.split_last()?;
        let parent_path = format!("/{}", parent.join("/"));
        match self.node_at_mut(&parent_path)? {
            FsNode::Dir { children, .. } => children.remove(*name),
            FsNode::File { .. } => None,
        }
    }

    /// Move an entry. The destination parent must be an existing directory.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if self.node_at(from).is_none() {
            return false;
        }
        // Validate the destination before detaching the source.
        let to_parts = components(to);
        let Some((_, to_parent)) = to_parts.split_last() else {
            return false;
        };
        let to_parent_path = format!("/{}", to_parent.join("/"));
        if !self.node_at(&to_parent_path).map(FsNode::is_dir).unwrap_or(false) {
            return false;
        }
        match self.remove(from) {
            Some(node) => self.insert(to, node),
            None => false,
        }
    }

    /// Copy an entry (deep — directories bring their children).
    pub fn copy(&mut self, from: &str, to: &str) -> bool {
        match self.node_at(from).cloned() {
            Some(node) => self.insert(to, node),
            None => false,
        }
    }

    /// Change mode bits at `path`.
    pub fn set_mode(&mut self, path: &str, mode: u32) -> bool {
        match self.node_at_mut(path) {
            Some(node) => {
                node.set_mode(mode);
                true
            }
            None => false,
        }
    }

    /// Depth-first search under `start` for names containing `pattern`
    /// (case-insensitive). Returns full paths in traversal order.
    pub fn find_names(&self, start: &str, pattern: &str) -> Option<Vec<String>> {
        let node = self.node_at(start)?;
        if !node.is_dir() {
            return None;
        }
        let mut found = Vec::new();
        let pattern = pattern.to_lowercase();
        let prefix = normalize(start);
        let prefix = if prefix == "/" { String::new() } else { prefix };
        search(node, &prefix, &pattern, &mut found);
        Some(found)
    }
}

fn search(node: &FsNode, prefix: &str, pattern: &str, found: &mut Vec<String>) {
    if let FsNode::Dir { children, .. } = node {
        for (name, child) in children {
            let full = format!("{}/{}", prefix, name);
            if name.to_lowercase().contains(pattern) {
                found.push(full.clone());
            }
            search(child, &full, pattern, found);
        }
    }
}

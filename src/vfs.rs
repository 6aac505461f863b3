use crate::error::FsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub user: u8,  // bits: rwx
    pub group: u8, // bits: rwx
    pub other: u8, // bits: rwx
}

impl Permissions {
    pub fn new(user: u8, group: u8, other: u8) -> Self {
        Self { user, group, other }
    }
    pub fn default_file() -> Self {
        Self::new(0b110, 0b100, 0b100) // rw-r--r--
    }
    pub fn default_dir() -> Self {
        Self::new(0b111, 0b101, 0b101) // rwxr-xr-x
    }

    /// Octal mode, e.g. `0o644`.
    pub fn bits(&self) -> u16 {
        (u16::from(self.user & 0b111) << 6) | (u16::from(self.group & 0b111) << 3) | u16::from(self.other & 0b111)
    }

    /// `rwxr-xr-x` style rendering without the type character.
    pub fn rwx(&self) -> String {
        fn triple(bits: u8) -> [char; 3] {
            [
                if bits & 0b100 != 0 { 'r' } else { '-' },
                if bits & 0b010 != 0 { 'w' } else { '-' },
                if bits & 0b001 != 0 { 'x' } else { '-' },
            ]
        }
        [self.user, self.group, self.other]
            .into_iter()
            .flat_map(triple)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// Flat, path-keyed view of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub path: String,
    pub kind: NodeKind,
    pub size: usize,
    pub modified_at: DateTime<Utc>,
    pub permissions_bits: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VfsNode {
    File {
        name: String,
        content: String,
        permissions: Permissions,
        mtime: DateTime<Utc>,
    },
    Directory {
        name: String,
        children: BTreeMap<String, VfsNode>,
        permissions: Permissions,
        mtime: DateTime<Utc>,
    },
}

impl VfsNode {
    pub fn file(name: &str, content: String, mtime: DateTime<Utc>) -> Self {
        VfsNode::File {
            name: name.to_string(),
            content,
            permissions: Permissions::default_file(),
            mtime,
        }
    }

    pub fn directory(name: &str, mtime: DateTime<Utc>) -> Self {
        VfsNode::Directory {
            name: name.to_string(),
            children: BTreeMap::new(),
            permissions: Permissions::default_dir(),
            mtime,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VfsNode::File { name, .. } | VfsNode::Directory { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            VfsNode::File { .. } => NodeKind::File,
            VfsNode::Directory { .. } => NodeKind::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, VfsNode::Directory { .. })
    }

    pub fn permissions(&self) -> Permissions {
        match self {
            VfsNode::File { permissions, .. } | VfsNode::Directory { permissions, .. } => *permissions,
        }
    }

    pub fn mtime(&self) -> DateTime<Utc> {
        match self {
            VfsNode::File { mtime, .. } | VfsNode::Directory { mtime, .. } => *mtime,
        }
    }

    /// Bytes of content for files; directories report a fixed block size.
    pub fn size(&self) -> usize {
        match self {
            VfsNode::File { content, .. } => content.len(),
            VfsNode::Directory { .. } => 4096,
        }
    }

    pub fn set_name(&mut self, new_name: &str) {
        match self {
            VfsNode::File { name, .. } | VfsNode::Directory { name, .. } => *name = new_name.to_string(),
        }
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        match self {
            VfsNode::File { mtime, .. } | VfsNode::Directory { mtime, .. } => *mtime = at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualFileSystem {
    pub root: VfsNode,
}

impl VirtualFileSystem {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            root: VfsNode::directory("/", created_at),
        }
    }

    pub fn resolve_path(&self, path: &str) -> Option<&VfsNode> {
        let mut node = &self.root;
        for comp in components(path) {
            match node {
                VfsNode::Directory { children, .. } => node = children.get(comp)?,
                VfsNode::File { .. } => return None,
            }
        }
        Some(node)
    }

    pub fn resolve_path_mut(&mut self, path: &str) -> Option<&mut VfsNode> {
        let mut node = &mut self.root;
        for comp in components(path) {
            match node {
                VfsNode::Directory { children, .. } => node = children.get_mut(comp)?,
                VfsNode::File { .. } => return None,
            }
        }
        Some(node)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve_path(path).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.resolve_path(path).is_some_and(VfsNode::is_dir)
    }

    /// Children map of the directory at `path`.
    fn children_mut(&mut self, path: &str) -> Result<&mut BTreeMap<String, VfsNode>, FsError> {
        match self.resolve_path_mut(path) {
            Some(VfsNode::Directory { children, .. }) => Ok(children),
            Some(VfsNode::File { .. }) => Err(FsError::NotADirectory),
            None => Err(FsError::NotFound),
        }
    }

    pub fn create_file(&mut self, path: &str, content: String, at: DateTime<Utc>) -> Result<(), FsError> {
        let (parent_path, file_name) = split_path(path)?;
        let parent = self.children_mut(&parent_path)?;
        if parent.contains_key(&file_name) {
            return Err(FsError::AlreadyExists);
        }
        parent.insert(file_name.clone(), VfsNode::file(&file_name, content, at));
        Ok(())
    }

    pub fn create_dir(&mut self, path: &str, at: DateTime<Utc>) -> Result<(), FsError> {
        let (parent_path, dir_name) = split_path(path)?;
        let parent = self.children_mut(&parent_path)?;
        if parent.contains_key(&dir_name) {
            return Err(FsError::AlreadyExists);
        }
        parent.insert(dir_name.clone(), VfsNode::directory(&dir_name, at));
        Ok(())
    }

    pub fn read_file(&self, path: &str) -> Result<&str, FsError> {
        match self.resolve_path(path) {
            Some(VfsNode::File { content, .. }) => Ok(content),
            Some(VfsNode::Directory { .. }) => Err(FsError::IsADirectory),
            None => Err(FsError::NotFound),
        }
    }

    /// Detach the node at `path` and hand it back.
    pub fn remove(&mut self, path: &str) -> Result<VfsNode, FsError> {
        let (parent_path, name) = split_path(path)?;
        let parent = self.children_mut(&parent_path)?;
        parent.remove(&name).ok_or(FsError::NotFound)
    }

    /// Place `node` at `path`, renaming it to the last path component and
    /// replacing whatever was there.
    pub fn insert(&mut self, path: &str, mut node: VfsNode) -> Result<(), FsError> {
        let (parent_path, name) = split_path(path)?;
        let parent = self.children_mut(&parent_path)?;
        node.set_name(&name);
        parent.insert(name, node);
        Ok(())
    }

    /// Every node keyed by absolute path, root included.
    pub fn entries(&self) -> BTreeMap<String, FileNode> {
        let mut out = BTreeMap::new();
        collect_entries(&self.root, "/".to_string(), &mut out);
        out
    }
}

fn collect_entries(node: &VfsNode, path: String, out: &mut BTreeMap<String, FileNode>) {
    if let VfsNode::Directory { children, .. } = node {
        for (name, child) in children {
            collect_entries(child, join_path(&path, name), out);
        }
    }
    out.insert(
        path.clone(),
        FileNode {
            path,
            kind: node.kind(),
            size: node.size(),
            modified_at: node.mtime(),
            permissions_bits: node.permissions().bits(),
        },
    );
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

/// Parent directory and final component of an absolute path. The root has
/// neither, so splitting it is an error.
pub fn split_path(path: &str) -> Result<(String, String), FsError> {
    let normalized = normalize_path(path);
    if normalized == "/" {
        return Err(FsError::InvalidPath);
    }
    match normalized.rfind('/') {
        Some(0) => Ok(("/".to_string(), normalized[1..].to_string())),
        Some(idx) => Ok((normalized[..idx].to_string(), normalized[idx + 1..].to_string())),
        None => Ok(("/".to_string(), normalized)),
    }
}

pub fn join_path(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

/// Collapse `.`, `..` and repeated slashes. Always returns an absolute path
/// and never climbs above the root.
pub fn normalize_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for comp in path.split('/') {
        match comp {
            "" | "." => continue,
            ".." => {
                stack.pop();
            }
            comp => stack.push(comp),
        }
    }
    if stack.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", stack.join("/"))
    }
}

/// Resolve a user-supplied path against `cwd`. `~` is the vault home, which
/// is the root.
pub fn absolute_path(cwd: &str, target: &str) -> String {
    if target == "~" {
        return "/".to_string();
    }
    if let Some(rest) = target.strip_prefix("~/") {
        return normalize_path(&format!("/{}", rest));
    }
    if target.starts_with('/') {
        normalize_path(target)
    } else {
        normalize_path(&join_path(cwd, target))
    }
}

/// True when `path` equals `ancestor` or lies beneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    ancestor == "/" || path == ancestor || path.starts_with(&format!("{}/", ancestor))
}

/// Deterministic stand-in content for a vault object, keyed by file name.
pub fn placeholder_content(name: &str) -> String {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => format!(
            "id,label,updated\n1,{name} record 1,2024-01-01\n2,{name} record 2,2024-01-02\n3,{name} record 3,2024-01-03\n"
        ),
        Some("json") => format!("{{\n  \"name\": \"{name}\",\n  \"encrypted\": true,\n  \"records\": []\n}}\n"),
        Some("zip") | Some("docx") | Some("pdf") | Some("png") | Some("jpg") | Some("jpeg") => {
            format!("[encrypted binary object: {name}]\n")
        }
        _ => format!(
            "# {name}\nThis file lives in your private vault.\nIts contents are simulated for this terminal session.\n"
        ),
    }
}

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier assigned to each node in the collection tree. Ids are
/// unique across the whole forest, not merely within one parent.
/// 集合樹中每個節點的穩定識別碼；在整座森林中唯一，而非僅限於同一父節點。
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generates a fresh process-local identifier.
    /// 產生新的行程內識別碼。
    pub fn new() -> Self {
        let id = NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("{id:016x}"))
    }

    /// Wraps an identifier supplied by an importer or the UI.
    /// 封裝由匯入器或 UI 提供的識別碼。
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of collection node. Folders carry their ordered children inside
/// the kind; files never have a children list (an empty folder is still a
/// folder, not a file).
/// 集合節點的類型。資料夾的子節點依序存放在類型之中；檔案沒有子節點清單
/// （空資料夾仍是資料夾，不會被視為檔案）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NodeKind {
    Folder {
        #[serde(default)]
        children: Vec<CollectionNode>,
    },
    File,
}

impl NodeKind {
    pub fn is_folder(&self) -> bool {
        matches!(self, NodeKind::Folder { .. })
    }
}

fn selectable_default() -> bool {
    true
}

/// One file or folder entry in the hierarchy. A node never carries its text
/// payload; payloads live in the [`ContentIndex`](crate::ContentIndex).
/// 階層中的單一檔案或資料夾項目。節點本身不攜帶文字內容；內容一律存放在
/// 內容索引之中。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Advisory logical path; never interpreted by the model.
    /// 僅供參考的邏輯路徑；模型不會解讀它。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default = "selectable_default")]
    pub selectable: bool,
}

impl CollectionNode {
    /// Constructs a leaf (file) node.
    /// 建立葉節點（檔案）。
    pub fn file(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::File,
            path: None,
            selectable: true,
        }
    }

    /// Constructs an empty folder node.
    /// 建立空的資料夾節點。
    pub fn folder(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Folder {
                children: Vec::new(),
            },
            path: None,
            selectable: true,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    pub fn is_file(&self) -> bool {
        !self.kind.is_folder()
    }

    /// Returns the ordered children for folders, `None` for files.
    /// 資料夾回傳依序的子節點；檔案回傳 `None`。
    pub fn children(&self) -> Option<&[CollectionNode]> {
        match &self.kind {
            NodeKind::Folder { children } => Some(children),
            NodeKind::File => None,
        }
    }
}

/// The forest backing the sidebar: an ordered list of root nodes plus a
/// revision counter bumped on every structural change. Mutations take the
/// current tree by reference and return the next tree (value semantics), so
/// callers replace the handle they hold.
/// 側邊欄背後的森林：依序的根節點清單，加上每次結構變動遞增的修訂號。
/// 變動操作以值語意回傳新的樹，呼叫端以回傳值取代手上的舊樹。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CollectionTree {
    pub revision: u64,
    pub items: Vec<CollectionNode>,
}

impl CollectionTree {
    /// Constructs an empty forest.
    /// 建立空的森林。
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a forest from already-normalized root nodes.
    /// 以已正規化的根節點建立森林。
    pub fn from_items(items: Vec<CollectionNode>) -> Self {
        Self { revision: 0, items }
    }

    /// Inserts `node` either at the end of the root list (`parent_id` absent)
    /// or under the folder whose id matches `parent_id`, wherever it sits in
    /// the forest. The root fallback is applied exactly once, at this level;
    /// it is never re-evaluated inside the recursion. Rejects the whole
    /// insert if any id in the incoming subtree already exists (or repeats
    /// within the subtree itself).
    /// 將節點插入根清單尾端（未提供 `parent_id` 時），或插入森林中任意深度
    /// 對應識別碼的資料夾之下。根層級的後備行為只在此處套用一次，遞迴內不再
    /// 重複判斷。若傳入子樹中任何識別碼已存在（或子樹內部重複），整筆插入
    /// 會被拒絕。
    pub fn insert(
        &self,
        parent_id: Option<&NodeId>,
        node: CollectionNode,
    ) -> Result<(Self, TreeDiff), TreeError> {
        let mut incoming = Vec::new();
        collect_ids(&node, &mut incoming);
        let mut seen = HashSet::new();
        for id in &incoming {
            if self.contains(id) || !seen.insert(id.clone()) {
                return Err(TreeError::DuplicateId(id.clone()));
            }
        }

        let mut diff = TreeDiff::default();
        diff.added = incoming;

        let items = match parent_id {
            None => {
                let mut items = self.items.clone();
                items.push(node);
                items
            }
            Some(parent) => {
                let (items, inserted) = insert_recursive(&self.items, parent, node, &mut diff)?;
                if !inserted {
                    return Err(TreeError::NodeNotFound(parent.clone()));
                }
                items
            }
        };

        let next = Self {
            revision: self.revision.wrapping_add(1),
            items,
        };
        Ok((next, diff))
    }

    /// Deletes the node with the given id wherever it occurs, discarding its
    /// whole subtree. `diff.removed` reports the node and every descendant so
    /// the caller can cascade content-index deletions.
    /// 刪除森林中任意位置上符合識別碼的節點，連同整個子樹一併捨棄。
    /// `diff.removed` 會列出該節點與所有子孫，供呼叫端連動清除內容索引。
    pub fn remove(&self, id: &NodeId) -> Result<(Self, TreeDiff), TreeError> {
        let mut diff = TreeDiff::default();
        let items = remove_recursive(&self.items, id, &mut diff);
        if diff.removed.is_empty() {
            return Err(TreeError::NodeNotFound(id.clone()));
        }
        let next = Self {
            revision: self.revision.wrapping_add(1),
            items,
        };
        Ok((next, diff))
    }

    /// Finds a node by identifier, depth-first pre-order.
    /// 以深度優先前序尋找節點。
    pub fn find(&self, id: &NodeId) -> Option<&CollectionNode> {
        find_in(&self.items, id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Ordered root nodes of the forest.
    /// 森林中依序排列的根節點。
    pub fn roots(&self) -> &[CollectionNode] {
        &self.items
    }

    /// Total number of nodes in the forest.
    /// 森林中的節點總數。
    pub fn len(&self) -> usize {
        fn count(nodes: &[CollectionNode]) -> usize {
            nodes
                .iter()
                .map(|node| 1 + node.children().map_or(0, count))
                .sum()
        }
        count(&self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn find_in<'a>(nodes: &'a [CollectionNode], id: &NodeId) -> Option<&'a CollectionNode> {
    for node in nodes {
        if node.id == *id {
            return Some(node);
        }
        if let Some(children) = node.children() {
            if let Some(found) = find_in(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_ids(node: &CollectionNode, out: &mut Vec<NodeId>) {
    out.push(node.id.clone());
    if let Some(children) = node.children() {
        for child in children {
            collect_ids(child, out);
        }
    }
}

fn insert_recursive(
    nodes: &[CollectionNode],
    parent_id: &NodeId,
    new_node: CollectionNode,
    diff: &mut TreeDiff,
) -> Result<(Vec<CollectionNode>, bool), TreeError> {
    let mut inserted = false;
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        if inserted {
            out.push(node.clone());
            continue;
        }
        if node.id == *parent_id {
            let children = match &node.kind {
                NodeKind::Folder { children } => children,
                NodeKind::File => return Err(TreeError::InvalidParent(parent_id.clone())),
            };
            let mut children = children.clone();
            children.push(new_node.clone());
            let mut updated = node.clone();
            updated.kind = NodeKind::Folder { children };
            diff.updated.push(parent_id.clone());
            out.push(updated);
            inserted = true;
            continue;
        }
        match &node.kind {
            NodeKind::Folder { children } => {
                let (children, did_insert) =
                    insert_recursive(children, parent_id, new_node.clone(), diff)?;
                if did_insert {
                    let mut updated = node.clone();
                    updated.kind = NodeKind::Folder { children };
                    out.push(updated);
                    inserted = true;
                } else {
                    out.push(node.clone());
                }
            }
            NodeKind::File => out.push(node.clone()),
        }
    }
    Ok((out, inserted))
}

fn remove_recursive(nodes: &[CollectionNode], id: &NodeId, diff: &mut TreeDiff) -> Vec<CollectionNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.id == *id {
            collect_ids(node, &mut diff.removed);
            continue;
        }
        match &node.kind {
            NodeKind::Folder { children } => {
                let before = diff.removed.len();
                let children = remove_recursive(children, id, diff);
                if diff.removed.len() != before {
                    let mut updated = node.clone();
                    updated.kind = NodeKind::Folder { children };
                    diff.updated.push(updated.id.clone());
                    out.push(updated);
                } else {
                    out.push(node.clone());
                }
            }
            NodeKind::File => out.push(node.clone()),
        }
    }
    out
}

/// Captures the ids touched by a tree mutation.
/// 紀錄一次樹狀變動所涉及的識別碼。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub updated: Vec<NodeId>,
}

/// Tree-manipulation errors. All are non-fatal: the tree held by the caller
/// is unchanged whenever an error is returned.
/// 樹狀操作錯誤。全部皆可恢復：回傳錯誤時呼叫端持有的樹維持不變。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("node {0} already exists in the tree")]
    DuplicateId(NodeId),
    #[error("node {0} cannot accept children")]
    InvalidParent(NodeId),
    #[error("node {0} is not a file")]
    NotAFile(NodeId),
}

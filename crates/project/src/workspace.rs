use tracing::{debug, warn};

use crate::content::ContentIndex;
use crate::import::{normalize, RawNode};
use crate::session::{FileView, SessionState};
use crate::tree::{CollectionNode, CollectionTree, NodeId, TreeDiff, TreeError};

/// One workspace-model instance: the collection tree, the content index and
/// the session state, with the operation sequencing that keeps them
/// consistent. Constructed explicitly at application start and replaced
/// wholesale when a project is imported; there is no global store.
/// 單一工作區模型實例：集合樹、內容索引與工作階段狀態，並負責維持三者
/// 一致的操作順序。於應用程式啟動時明確建構，匯入專案時整體取代；不存在
/// 全域儲存區。
#[derive(Debug, Default)]
pub struct Workspace {
    tree: CollectionTree,
    contents: ContentIndex,
    session: SessionState,
}

impl Workspace {
    /// Constructs an empty, unconfigured workspace.
    /// 建立空白且尚未設定專案的工作區。
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &CollectionTree {
        &self.tree
    }

    pub fn content(&self, id: &NodeId) -> Option<&str> {
        self.contents.get(id)
    }

    pub fn active_file(&self) -> Option<&FileView> {
        self.session.active_file()
    }

    pub fn tabs(&self) -> &[FileView] {
        self.session.tabs()
    }

    pub fn is_project_configured(&self) -> bool {
        self.session.is_project_configured()
    }

    /// Inserts a node, at the root when `parent_id` is absent, and stores the
    /// initial content for leaf nodes once the structural insert succeeded.
    /// Duplicate ids are rejected with the tree untouched and flagged in the
    /// log.
    /// 插入節點；未提供 `parent_id` 時插入根層級。結構插入成功後才為葉節點
    /// 寫入初始內容。識別碼重複時拒絕插入、樹維持不變，並記錄於日誌。
    pub fn create_file(
        &mut self,
        parent_id: Option<&NodeId>,
        node: CollectionNode,
        content: Option<String>,
    ) -> Result<TreeDiff, TreeError> {
        let node_id = node.id.clone();
        let is_file = node.is_file();
        match self.tree.insert(parent_id, node) {
            Ok((next, diff)) => {
                self.tree = next;
                if is_file {
                    if let Some(text) = content {
                        self.contents.set(node_id, text);
                    }
                }
                Ok(diff)
            }
            Err(err) => {
                if let TreeError::DuplicateId(id) = &err {
                    warn!(id = %id, "rejected insert with duplicate node id");
                }
                Err(err)
            }
        }
    }

    /// Removes a node wherever it occurs, then cascades: content entries of
    /// every removed leaf are deleted and the session drops any tab or active
    /// pointer referencing a removed id.
    /// 移除森林中任意位置的節點並連動清理：刪除所有被移除葉節點的內容條目，
    /// 工作階段亦移除引用到被移除識別碼的分頁與使用中指標。
    pub fn remove_file(&mut self, id: &NodeId) -> Result<TreeDiff, TreeError> {
        let (next, diff) = self.tree.remove(id)?;
        self.tree = next;
        self.contents.remove_all(diff.removed.iter());
        self.session.remove_references(diff.removed.iter());
        Ok(diff)
    }

    /// Selects a file for editing, snapshotting its current content.
    /// 選取檔案進行編輯，並對其目前內容建立快照。
    pub fn set_active_file(&mut self, id: &NodeId) -> Result<(), TreeError> {
        let view = self.resolve_file(id)?;
        self.session.set_active_file(view);
        Ok(())
    }

    /// Opens a tab for a file; a second open of the same id is a no-op and
    /// returns `false`.
    /// 為檔案開啟分頁；重複開啟相同識別碼不會有任何變化並回傳 `false`。
    pub fn open_tab(&mut self, id: &NodeId) -> Result<bool, TreeError> {
        let view = self.resolve_file(id)?;
        Ok(self.session.open_tab(view))
    }

    /// Closes a tab; the active pointer is cleared when its tab closes.
    /// 關閉分頁；若該分頁為使用中的檔案，一併清除使用中指標。
    pub fn close_tab(&mut self, id: &NodeId) -> bool {
        self.session.close_tab(id)
    }

    /// The single write-path into the content index, invoked on every edit
    /// event from the editor surface. Folder ids are rejected so that only
    /// leaves ever hold content.
    /// 內容索引唯一的寫入路徑，編輯介面的每次修改事件都經由此處。資料夾
    /// 識別碼會被拒絕，確保只有葉節點持有內容。
    pub fn update_content_by_id(
        &mut self,
        id: &NodeId,
        text: impl Into<String>,
    ) -> Result<(), TreeError> {
        match self.tree.find(id) {
            Some(node) if node.is_file() => {
                self.contents.set(id.clone(), text);
                Ok(())
            }
            Some(_) => Err(TreeError::NotAFile(id.clone())),
            None => Err(TreeError::NodeNotFound(id.clone())),
        }
    }

    /// Bulk-populates the workspace from a raw imported forest: normalizes
    /// it, replaces the tree and the content index wholesale, clears session
    /// references to the previous project and marks the project configured.
    /// The configured flag stays true for the rest of the session.
    /// 以原始匯入森林大量填入工作區：正規化後整體取代集合樹與內容索引，
    /// 清除指向先前專案的工作階段引用，並標記專案已設定。該旗標於本工作
    /// 階段剩餘期間維持為真。
    pub fn init_file_tree(&mut self, raw: Vec<RawNode>) -> &CollectionTree {
        let normalized = normalize(raw);
        debug!(
            roots = normalized.items.len(),
            entries = normalized.contents.len(),
            "replacing workspace from imported project"
        );
        self.tree = CollectionTree::from_items(normalized.items);
        self.contents = normalized.contents;
        self.session.reset_references();
        self.session.mark_project_configured();
        &self.tree
    }

    fn resolve_file(&self, id: &NodeId) -> Result<FileView, TreeError> {
        let node = self
            .tree
            .find(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        if node.is_folder() {
            return Err(TreeError::NotAFile(id.clone()));
        }
        Ok(FileView::snapshot(node, &self.contents))
    }
}

use serde::{Deserialize, Serialize};

use crate::content::ContentIndex;
use crate::tree::{CollectionNode, NodeId};

/// Projection of a leaf node handed to the editor surface: metadata plus the
/// content resolved at selection time. This is a snapshot; later index
/// writes do not flow back into a view already handed out, and the UI
/// re-reads when it wants a fresh copy.
/// 交給編輯介面的葉節點投影：節點資訊加上選取當下解析的內容。此為快照，
/// 之後寫入索引不會回流到已交出的投影；UI 需要最新內容時應重新讀取。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileView {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub selectable: bool,
    pub content: String,
}

impl FileView {
    /// Builds a snapshot for a leaf node, resolving content from the index.
    /// A missing entry resolves to the empty string.
    /// 為葉節點建立快照，並自索引解析內容；缺少條目時視為空字串。
    pub fn snapshot(node: &CollectionNode, contents: &ContentIndex) -> Self {
        let content = contents.get(&node.id).unwrap_or_default().to_string();
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            path: node.path.clone(),
            selectable: node.selectable,
            content,
        }
    }
}

/// Transient per-session UI state: the active file, the ordered open tabs,
/// and the project-configured flag. Reads the other stores by id but never
/// mutates them.
/// 工作階段的暫時性 UI 狀態：使用中的檔案、依序排列的開啟分頁，以及專案
/// 已設定旗標。僅依識別碼讀取其他儲存區，絕不改動它們。
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    active_file: Option<FileView>,
    tabs: Vec<FileView>,
    project_configured: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_file(&self) -> Option<&FileView> {
        self.active_file.as_ref()
    }

    pub fn tabs(&self) -> &[FileView] {
        &self.tabs
    }

    pub fn is_project_configured(&self) -> bool {
        self.project_configured
    }

    pub fn set_active_file(&mut self, view: FileView) {
        self.active_file = Some(view);
    }

    /// Appends a tab unless one with the same id is already open. Returns
    /// whether the tab was added; order is first-insertion and untouched by
    /// repeated opens.
    /// 除非已有相同識別碼的分頁，否則附加新分頁並回傳是否加入成功。分頁
    /// 依首次開啟順序排列，重複開啟不會改變順序。
    pub fn open_tab(&mut self, view: FileView) -> bool {
        if self.tabs.iter().any(|tab| tab.id == view.id) {
            return false;
        }
        self.tabs.push(view);
        true
    }

    /// Closes the tab with the given id. If it was the active file, the
    /// active pointer is cleared (clear-on-close).
    /// 關閉指定識別碼的分頁；若該分頁正是使用中的檔案，一併清除使用中
    /// 指標（關閉即清除）。
    pub fn close_tab(&mut self, id: &NodeId) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|tab| tab.id != *id);
        let closed = self.tabs.len() != before;
        if closed && self.active_file.as_ref().is_some_and(|view| view.id == *id) {
            self.active_file = None;
        }
        closed
    }

    /// Drops tabs and the active pointer for ids that left the tree, so the
    /// session never references a node that no longer exists.
    /// 移除指向已離開樹的識別碼之分頁與使用中指標，避免工作階段引用不存在
    /// 的節點。
    pub fn remove_references<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) {
        let gone: Vec<&NodeId> = ids.into_iter().collect();
        self.tabs.retain(|tab| !gone.contains(&&tab.id));
        if self
            .active_file
            .as_ref()
            .is_some_and(|view| gone.contains(&&view.id))
        {
            self.active_file = None;
        }
    }

    /// Clears tabs and the active pointer wholesale; used when an import
    /// replaces the project.
    /// 一次清空分頁與使用中指標；匯入取代整個專案時使用。
    pub fn reset_references(&mut self) {
        self.tabs.clear();
        self.active_file = None;
    }

    /// Flips the project-configured flag; it stays true for the rest of the
    /// session.
    /// 設定專案已設定旗標；在本工作階段剩餘期間維持為真。
    pub fn mark_project_configured(&mut self) {
        self.project_configured = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CollectionNode;

    fn view(value: &str) -> FileView {
        let node = CollectionNode::file(NodeId::from_string(value), format!("{value}.toml"));
        FileView::snapshot(&node, &ContentIndex::new())
    }

    #[test]
    fn open_tab_twice_keeps_length_and_order() {
        let mut session = SessionState::new();
        assert!(session.open_tab(view("2")));
        assert!(session.open_tab(view("3")));
        assert!(!session.open_tab(view("2")));
        assert_eq!(session.tabs().len(), 2);
        assert_eq!(session.tabs()[0].id, NodeId::from_string("2"));
        assert_eq!(session.tabs()[1].id, NodeId::from_string("3"));
    }

    #[test]
    fn closing_the_active_tab_clears_the_active_pointer() {
        let mut session = SessionState::new();
        session.open_tab(view("2"));
        session.set_active_file(view("2"));
        assert!(session.close_tab(&NodeId::from_string("2")));
        assert!(session.tabs().is_empty());
        assert!(session.active_file().is_none());
    }

    #[test]
    fn closing_another_tab_keeps_the_active_pointer() {
        let mut session = SessionState::new();
        session.open_tab(view("2"));
        session.open_tab(view("3"));
        session.set_active_file(view("2"));
        assert!(session.close_tab(&NodeId::from_string("3")));
        assert_eq!(
            session.active_file().map(|v| v.id.clone()),
            Some(NodeId::from_string("2"))
        );
    }

    #[test]
    fn remove_references_drops_tabs_and_active_file() {
        let mut session = SessionState::new();
        session.open_tab(view("2"));
        session.open_tab(view("3"));
        session.set_active_file(view("3"));

        let gone = [NodeId::from_string("3")];
        session.remove_references(gone.iter());
        assert_eq!(session.tabs().len(), 1);
        assert!(session.active_file().is_none());
    }

    #[test]
    fn snapshot_resolves_missing_content_to_empty() {
        let node = CollectionNode::file(NodeId::from_string("9"), "a.toml");
        let snapshot = FileView::snapshot(&node, &ContentIndex::new());
        assert_eq!(snapshot.content, "");
    }
}

use std::collections::HashMap;

use crate::tree::NodeId;

/// Id-keyed store of leaf text payloads, kept apart from the hierarchy so
/// structural edits never copy or move payloads. Only leaf ids are valid
/// keys; the workspace facade enforces that.
/// 以識別碼為鍵的葉節點文字內容儲存區，與階層分離，結構編輯因此不會搬動
/// 內容。只有葉節點識別碼是合法的鍵；由工作區外觀負責維持此約束。
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContentIndex {
    entries: HashMap<NodeId, String>,
}

impl ContentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &NodeId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Upserts the payload for a leaf id.
    /// 寫入（或覆寫）葉節點的文字內容。
    pub fn set(&mut self, id: NodeId, text: impl Into<String>) {
        self.entries.insert(id, text.into());
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<String> {
        self.entries.remove(id)
    }

    /// Drops every entry named in `ids`; absent ids are ignored. Used by the
    /// removal cascade, where the removed-id list also contains folder ids
    /// that were never keys.
    /// 移除 `ids` 中列出的所有條目；不存在的識別碼會被忽略。刪除連動會帶入
    /// 從未作為鍵的資料夾識別碼，在此一併略過。
    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) {
        for id in ids {
            self.entries.remove(id);
        }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the ids currently holding a payload.
    /// 走訪目前持有內容的識別碼。
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.entries.keys()
    }
}

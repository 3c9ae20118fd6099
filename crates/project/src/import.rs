use serde::{Deserialize, Serialize};

use crate::content::ContentIndex;
use crate::tree::{CollectionNode, NodeId, NodeKind};

fn selectable_default() -> bool {
    true
}

/// Explicit node kind on the raw shape. When given it wins over `children`
/// presence; importers that omit it fall back to the children rule.
/// 原始形狀上的明確節點類型。提供時優先於 `children` 是否存在的判斷；
/// 匯入器未提供時退回以子節點清單判定。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RawNodeKind {
    File,
    Folder,
}

/// The importer-facing node shape: the tree's node fields plus an optional
/// inline `content` payload on leaves, an optional explicit `kind`, and an
/// optional `children` list whose presence decides folder-ness when no kind
/// is given. This is what a project import hands over before normalization.
/// 匯入器使用的節點形狀：樹節點欄位，加上葉節點可選的行內 `content`、
/// 可選的明確 `kind`，以及在未提供類型時以「是否存在」決定資料夾身分的
/// 可選 `children` 清單。專案匯入在正規化前交付的便是此形狀。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RawNodeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default = "selectable_default")]
    pub selectable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    pub fn is_folder(&self) -> bool {
        match self.kind {
            Some(kind) => kind == RawNodeKind::Folder,
            None => self.children.is_some(),
        }
    }
}

impl From<CollectionNode> for RawNode {
    /// A normalized node converts back to the raw shape without content, so
    /// feeding an already-normalized forest through [`normalize`] again is a
    /// no-op.
    /// 已正規化的節點轉回原始形狀時不帶內容，因此把正規化過的森林再次送入
    /// [`normalize`] 不會有任何變化。
    fn from(node: CollectionNode) -> Self {
        let (kind, children) = match node.kind {
            NodeKind::Folder { children } => (
                RawNodeKind::Folder,
                Some(children.into_iter().map(RawNode::from).collect()),
            ),
            NodeKind::File => (RawNodeKind::File, None),
        };
        Self {
            id: node.id,
            name: node.name,
            kind: Some(kind),
            path: node.path,
            selectable: node.selectable,
            content: None,
            children,
        }
    }
}

/// The result of normalizing a raw forest: stripped nodes plus the content
/// index extracted from them.
/// 原始森林正規化後的結果：去除內容的節點，以及自其抽出的內容索引。
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NormalizedProject {
    pub items: Vec<CollectionNode>,
    pub contents: ContentIndex,
}

/// Walks the raw forest depth-first, moving each leaf's inline content (when
/// present) into the content index under the leaf's id and stripping it from
/// the node. Folders recurse with no extraction; inline content on a folder
/// is dropped, since folder ids are never index keys. Absent content is
/// legal and simply produces no entry.
/// 以深度優先走訪原始森林，將每個葉節點的行內內容（若有）移入內容索引並
/// 自節點移除。資料夾僅遞迴處理、不抽取內容；資料夾上的行內內容會被捨棄，
/// 因為資料夾識別碼不得作為索引鍵。沒有內容是合法情況，僅不產生條目。
pub fn normalize(raw: Vec<RawNode>) -> NormalizedProject {
    let mut contents = ContentIndex::new();
    let items = raw
        .into_iter()
        .map(|node| strip(node, &mut contents))
        .collect();
    NormalizedProject { items, contents }
}

fn strip(raw: RawNode, contents: &mut ContentIndex) -> CollectionNode {
    let is_folder = raw.is_folder();
    let RawNode {
        id,
        name,
        kind: _,
        path,
        selectable,
        content,
        children,
    } = raw;
    let kind = if is_folder {
        // An explicit folder may arrive without a children list; its inline
        // content is dropped either way.
        // 明確標示的資料夾可能沒有子節點清單；其行內內容一律捨棄。
        NodeKind::Folder {
            children: children
                .unwrap_or_default()
                .into_iter()
                .map(|child| strip(child, contents))
                .collect(),
        }
    } else {
        // An explicit file keeps no children, whatever the raw node carried.
        // 明確標示的檔案不保留子節點，無論原始節點帶了什麼。
        if let Some(text) = content {
            contents.set(id.clone(), text);
        }
        NodeKind::File
    };
    CollectionNode {
        id,
        name,
        kind,
        path,
        selectable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> NodeId {
        NodeId::from_string(value)
    }

    fn raw_file(value: &str, name: &str, content: Option<&str>) -> RawNode {
        RawNode {
            id: id(value),
            name: name.into(),
            kind: None,
            path: None,
            selectable: true,
            content: content.map(str::to_string),
            children: None,
        }
    }

    #[test]
    fn leaf_content_moves_into_the_index() {
        let raw = vec![raw_file("5", "a.env", Some("A=1"))];
        let normalized = normalize(raw);

        assert_eq!(normalized.items.len(), 1);
        let node = &normalized.items[0];
        assert_eq!(node.id, id("5"));
        assert_eq!(node.name, "a.env");
        assert!(node.is_file());
        assert_eq!(normalized.contents.get(&id("5")), Some("A=1"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = vec![
            raw_file("1", "get_products.toml", Some("[get] products.url")),
            RawNode {
                id: id("3"),
                name: "users".into(),
                kind: None,
                path: None,
                selectable: true,
                content: None,
                children: Some(vec![
                    raw_file("4", "get_users.toml", Some("[get] users.url")),
                    raw_file("5", "post_users.toml", Some("[post] users.url")),
                ]),
            },
        ];

        let first = normalize(raw);
        let again: Vec<RawNode> = first.items.iter().cloned().map(RawNode::from).collect();
        let second = normalize(again);

        assert_eq!(first.items, second.items);
        // The second pass has nothing left to extract.
        // 第二次走訪已無內容可抽取。
        assert!(second.contents.is_empty());
        assert_eq!(first.contents.len(), 3);
        assert_eq!(first.contents.get(&id("4")), Some("[get] users.url"));
    }

    #[test]
    fn absent_content_produces_no_entry() {
        let normalized = normalize(vec![raw_file("7", "empty.toml", None)]);
        assert!(normalized.contents.is_empty());
        assert!(normalized.items[0].is_file());
    }

    #[test]
    fn folder_content_is_dropped() {
        let raw = vec![RawNode {
            id: id("9"),
            name: "users".into(),
            kind: None,
            path: None,
            selectable: true,
            content: Some("should never be indexed".into()),
            children: Some(Vec::new()),
        }];
        let normalized = normalize(raw);
        assert!(normalized.items[0].is_folder());
        assert!(normalized.contents.is_empty());
    }

    #[test]
    fn explicit_folder_kind_wins_without_a_children_list() {
        let raw: Vec<RawNode> = serde_json::from_value(serde_json::json!([
            { "id": "9", "name": "users", "kind": "folder", "content": "oops" }
        ]))
        .unwrap();
        assert!(raw[0].is_folder());

        let normalized = normalize(raw);
        let node = &normalized.items[0];
        assert!(node.is_folder());
        assert_eq!(node.children(), Some(&[][..]));
        // Folder ids never enter the index, however the content arrived.
        // 無論內容如何到達，資料夾識別碼都不得進入索引。
        assert!(normalized.contents.is_empty());
    }

    #[test]
    fn explicit_file_kind_wins_over_children_presence() {
        let raw = vec![RawNode {
            id: id("8"),
            name: "solo.toml".into(),
            kind: Some(RawNodeKind::File),
            path: None,
            selectable: true,
            content: Some("[get]".into()),
            children: Some(vec![raw_file("x", "stray.toml", Some("never"))]),
        }];
        let normalized = normalize(raw);
        let node = &normalized.items[0];
        assert!(node.is_file());
        assert!(node.children().is_none());
        assert_eq!(normalized.contents.get(&id("8")), Some("[get]"));
        assert!(!normalized.contents.contains(&id("x")));
    }

    #[test]
    fn raw_forest_deserializes_from_importer_json() {
        let raw: Vec<RawNode> = serde_json::from_value(serde_json::json!([
            {
                "id": "3",
                "name": "users",
                "children": [
                    { "id": "4", "name": "get_users.toml", "content": "[get] users.url" }
                ]
            }
        ]))
        .unwrap();

        assert!(raw[0].is_folder());
        assert!(raw[0].selectable);
        let normalized = normalize(raw);
        let folder = &normalized.items[0];
        assert_eq!(folder.children().unwrap()[0].id, id("4"));
        assert_eq!(normalized.contents.get(&id("4")), Some("[get] users.url"));
    }
}

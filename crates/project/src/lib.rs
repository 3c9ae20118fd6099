//! In-memory workspace model backing the Panda client UI: the collection
//! tree, the id-keyed content index and the editor session state.
//! 支撐 Panda 客戶端 UI 的記憶體工作區模型：集合樹、以識別碼為鍵的內容
//! 索引，以及編輯器工作階段狀態。

pub mod content;
pub mod import;
pub mod session;
pub mod tree;
pub mod workspace;

pub use content::ContentIndex;
pub use import::{normalize, NormalizedProject, RawNode, RawNodeKind};
pub use session::{FileView, SessionState};
pub use tree::{CollectionNode, CollectionTree, NodeId, NodeKind, TreeDiff, TreeError};
pub use workspace::Workspace;

pub mod activity;
pub mod event;
pub mod file_tree;

pub use activity::{ActivityEntry, ActivityKind};
pub use event::{FileEventData, GenerateRequest, ServerEvent, StatusValue};
pub use file_tree::{FileContentResponse, FileKind, FileNode, FilesResponse};

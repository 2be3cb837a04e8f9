//! Events - 状态文本发布

mod status_board;

pub use status_board::{StatusBoard, StatusEvent};

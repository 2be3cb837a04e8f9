//! 应用层 - 命令
//!
//! 宿主下发的 Start / Stop 命令

mod download_commands;

pub use download_commands::*;

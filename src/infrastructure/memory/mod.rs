//! Memory Layer - In-Memory State Management
//!
//! 运行中可修改的语音设置

mod runtime_settings;

pub use runtime_settings::{RuntimeSettings, SettingsUpdate};

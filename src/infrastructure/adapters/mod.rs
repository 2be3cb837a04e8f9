//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod content;
pub mod storage;
pub mod tts;

pub use content::*;
pub use storage::*;
pub use tts::*;

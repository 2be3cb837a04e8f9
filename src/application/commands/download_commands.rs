//! Download Commands - 预缓存命令
//!
//! 宿主发来的命令：`{"action": "start", "bookId", "start", "end"}`
//! 或 `{"action": "stop"}`（可选 `bookId`，只停止该书）

use serde::{Deserialize, Serialize};

use crate::application::download::StartReceipt;

/// 下载命令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DownloadCommand {
    #[serde(rename_all = "camelCase")]
    Start { book_id: String, start: u32, end: u32 },

    #[serde(rename_all = "camelCase")]
    Stop {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        book_id: Option<String>,
    },
}

impl DownloadCommand {
    pub fn start(book_id: impl Into<String>, start: u32, end: u32) -> Self {
        Self::Start {
            book_id: book_id.into(),
            start,
            end,
        }
    }

    pub fn stop_all() -> Self {
        Self::Stop { book_id: None }
    }
}

/// 命令执行结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Started(StartReceipt),
    Stopped { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_command_wire_format() {
        let cmd: DownloadCommand =
            serde_json::from_str(r#"{"action":"start","bookId":"B1","start":0,"end":2}"#).unwrap();
        assert_eq!(cmd, DownloadCommand::start("B1", 0, 2));
    }

    #[test]
    fn test_stop_command_book_is_optional() {
        let all: DownloadCommand = serde_json::from_str(r#"{"action":"stop"}"#).unwrap();
        assert_eq!(all, DownloadCommand::stop_all());

        let one: DownloadCommand =
            serde_json::from_str(r#"{"action":"stop","bookId":"B1"}"#).unwrap();
        assert_eq!(
            one,
            DownloadCommand::Stop {
                book_id: Some("B1".into())
            }
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(serde_json::from_str::<DownloadCommand>(r#"{"action":"pause"}"#).is_err());
    }
}

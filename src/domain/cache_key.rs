//! Cache Key - 语音缓存 key
//!
//! key = md5_16(章节标题) + "_" + md5_16(backend_id + "|" + 语速 + "|" + 段落文本)
//!
//! 第一段按章节划分命名空间，第二段保证只有在后端、语速、文本都不变时才命中缓存。

use serde::Serialize;

/// 后端标识、语速、文本之间的分隔符
const FIELD_SEPARATOR: &str = "|";

/// 16 位 MD5（取 32 位十六进制摘要的中间 16 位）
pub fn md5_16(input: &str) -> String {
    let digest = format!("{:x}", md5::compute(input.as_bytes()));
    digest[8..24].to_string()
}

/// 语音缓存 key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// 由章节标题、后端标识、语速和段落文本生成 key
    pub fn derive(chapter_title: &str, backend_id: &str, speech_rate: i32, text: &str) -> Self {
        let payload = format!(
            "{}{sep}{}{sep}{}",
            backend_id,
            speech_rate,
            text,
            sep = FIELD_SEPARATOR
        );
        Self(format!("{}_{}", md5_16(chapter_title), md5_16(&payload)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 缓存文件名
    pub fn file_name(&self) -> String {
        format!("{}.audio", self.0)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

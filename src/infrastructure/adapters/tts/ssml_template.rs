//! SSML Template - 云端合成的语音标记模板
//!
//! 模板使用 `${text}` 和 `${rate}` 两个占位符，`${text}` 必须出现。
//! 文本在替换前做 XML 转义，渲染结果必须是良构的 XML。

use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use thiserror::Error;

const TEXT_PLACEHOLDER: &str = "text";
const RATE_PLACEHOLDER: &str = "rate";

/// 默认模板
pub const DEFAULT_SSML_TEMPLATE: &str = r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="zh-CN">
  <voice name="zh-CN-XiaoxiaoNeural">
    <prosody rate="${rate}%">${text}</prosody>
  </voice>
</speak>"#;

/// 模板错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template is missing placeholder ${{{0}}}")]
    MissingPlaceholder(&'static str),

    #[error("Unknown placeholder ${{{0}}}")]
    UnknownPlaceholder(String),

    #[error("Unterminated placeholder at byte {0}")]
    Unterminated(usize),

    #[error("Malformed markup: {0}")]
    Malformed(String),
}

/// 模板片段
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Text,
    Rate,
}

/// 已解析的 SSML 模板
#[derive(Debug, Clone)]
pub struct SsmlTemplate {
    source: String,
    pieces: Vec<Piece>,
}

impl SsmlTemplate {
    /// 解析模板
    ///
    /// 检查占位符，并用示例值试渲染一次确认结构良构
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let pieces = parse_pieces(&source)?;
        if !pieces.contains(&Piece::Text) {
            return Err(TemplateError::MissingPlaceholder(TEXT_PLACEHOLDER));
        }

        let template = Self { source, pieces };
        template.render("sample", 0)?;
        Ok(template)
    }

    /// 从文件加载模板
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| TemplateError::NotFound(format!("{}: {}", path.display(), e)))?;
        Self::parse(source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 渲染模板
    pub fn render(&self, text: &str, speech_rate: i32) -> Result<String, TemplateError> {
        let escaped = quick_xml::escape::escape(text);
        let rate = speech_rate.to_string();

        let mut out = String::with_capacity(self.source.len() + escaped.len());
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Text => out.push_str(&escaped),
                Piece::Rate => out.push_str(&rate),
            }
        }

        check_well_formed(&out)?;
        Ok(out)
    }
}

impl Default for SsmlTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_SSML_TEMPLATE.to_string(),
            pieces: parse_pieces(DEFAULT_SSML_TEMPLATE).unwrap_or_default(),
        }
    }
}

fn parse_pieces(source: &str) -> Result<Vec<Piece>, TemplateError> {
    let mut pieces = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find("${") {
        if start > 0 {
            pieces.push(Piece::Literal(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or(TemplateError::Unterminated(offset + start))?;
        let name = after[..end].trim();
        pieces.push(match name {
            TEXT_PLACEHOLDER => Piece::Text,
            RATE_PLACEHOLDER => Piece::Rate,
            other => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
        });

        let consumed = start + 2 + end + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest.to_string()));
    }
    Ok(pieces)
}

fn check_well_formed(xml: &str) -> Result<(), TemplateError> {
    let mut reader = Reader::from_str(xml);
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                saw_root = true;
            }
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(TemplateError::Malformed(format!(
                    "{} at byte {}",
                    e,
                    reader.error_position()
                )))
            }
        }
    }

    if !saw_root {
        return Err(TemplateError::Malformed("no root element".to_string()));
    }
    if depth != 0 {
        return Err(TemplateError::Malformed("unclosed element".to_string()));
    }
    Ok(())
}

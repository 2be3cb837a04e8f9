//! 段落分割器
//!
//! 将章节正文切分为朗读段落：按行分段，过长的段落在句末标点处再切分

/// 默认单段最大字符数
/// 超过该长度的段落会在句末标点处切开，避免单次合成请求过大
pub const DEFAULT_MAX_PARAGRAPH_CHARS: usize = 500;

/// 段落分割配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// 单段最大字符数
    pub max_paragraph_chars: usize,
    /// 是否去掉与章节标题相同的首行
    pub strip_title_line: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_paragraph_chars: DEFAULT_MAX_PARAGRAPH_CHARS,
            strip_title_line: true,
        }
    }
}

/// 检查是否为强分隔符（句末标点）
#[inline]
fn is_strong_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!' | '…')
}

/// 检查片段是否只包含引号或空白（不值得单独合成）
#[inline]
fn is_trivial_segment(s: &str) -> bool {
    s.chars().all(|c| {
        matches!(
            c,
            '"' | '\u{201C}' | '\u{201D}' | '\'' | '\u{2018}' | '\u{2019}' | ' ' | '\t' | '\u{3000}'
        )
    })
}

/// 将过长的一行按句末标点切成不超过 max_chars 的若干段
///
/// 单句本身超过 max_chars 时保持整句，不在句中硬切
fn split_long_line(line: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || line.chars().count() <= max_chars {
        return vec![line.to_string()];
    }

    let mut sentences: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        current.push(ch);
        if is_strong_delimiter(ch) {
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current);
    }

    let mut result: Vec<String> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0;
    for sentence in sentences {
        let len = sentence.chars().count();
        if buffer_chars > 0 && buffer_chars + len > max_chars {
            result.push(std::mem::take(&mut buffer).trim().to_string());
            buffer_chars = 0;
        }
        buffer.push_str(&sentence);
        buffer_chars += len;
    }
    if !buffer.trim().is_empty() {
        result.push(buffer.trim().to_string());
    }

    result
}

/// 对章节正文进行分段
///
/// 分段策略：
/// 1. 按行分割（支持 \n 和 \r\n），去掉首尾空白（含全角空格）
/// 2. 去掉与章节标题相同的首行
/// 3. 过长的行在句末标点处切开
/// 4. 只有引号的行合并到前一段
pub fn split_paragraphs(title: &str, text: &str, config: &SegmentConfig) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    let title = title.trim();

    let mut lines = text
        .lines()
        .map(|s| s.trim_matches(|c: char| c.is_whitespace() || c == '\u{3000}'))
        .filter(|s| !s.is_empty())
        .peekable();

    if config.strip_title_line {
        if let Some(first) = lines.peek() {
            if *first == title {
                lines.next();
            }
        }
    }

    for line in lines {
        if is_trivial_segment(line) {
            if let Some(last) = paragraphs.last_mut() {
                last.push_str(line);
            }
            continue;
        }
        paragraphs.extend(split_long_line(line, config.max_paragraph_chars));
    }

    paragraphs
}

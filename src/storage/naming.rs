//! 文件名模板
//!
//! # 设计思路
//!
//! 模板是一个封闭的小语法：字面量片段 + 有限的占位符（目前只有 `{timestamp}`）。
//! 解析一次得到结构化的片段序列，渲染时不做通用字符串替换，
//! 以后新增占位符只需扩展 `Segment`。
//!
//! # 实现思路
//!
//! - 模板自带的扩展名在解析时去掉，最终扩展名由源文件决定。
//! - 字面量中的路径分隔符与 Windows 非法字符替换为 `-`，文件名不会逃出保存目录。
//! - 未知的 `{xxx}` 原样保留为字面量。

use chrono::{DateTime, Utc};

use crate::settings::DEFAULT_FILE_NAME_PATTERN;

const TIMESTAMP_TOKEN: &str = "timestamp";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp,
}

/// 解析后的文件名模板（不含扩展名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNamePattern {
    segments: Vec<Segment>,
}

/// 文件系统安全的时间戳：`YYYY-MM-DD_HH-MM-SS-mmm`
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d_%H-%M-%S-%3f").to_string()
}

fn sanitize_literal(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

fn tokenize(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(start) = rest.find('{') {
        literal.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) if &after[..end] == TIMESTAMP_TOKEN => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Timestamp);
                rest = &after[end + 1..];
            }
            Some(end) => {
                log::warn!("⚠️ 文件名模板中的未知占位符 {{{}}} 将按原样保留", &after[..end]);
                literal.push_str(&rest[start..start + end + 2]);
                rest = &after[end + 1..];
            }
            None => {
                literal.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// 去掉模板末尾字面量中的扩展名（最后一个 `.` 之后的部分）
fn strip_extension(segments: &mut Vec<Segment>) {
    if let Some(Segment::Literal(text)) = segments.last_mut() {
        if let Some(dot) = text.rfind('.') {
            text.truncate(dot);
            if text.is_empty() {
                segments.pop();
            }
        }
    }
}

impl FileNamePattern {
    pub fn parse(pattern: &str) -> Self {
        let mut segments = tokenize(pattern.trim());
        strip_extension(&mut segments);
        if segments.is_empty() {
            log::warn!("⚠️ 文件名模板 '{}' 为空，使用默认模板", pattern);
            let mut fallback = tokenize(DEFAULT_FILE_NAME_PATTERN);
            strip_extension(&mut fallback);
            return Self { segments: fallback };
        }
        Self { segments }
    }

    /// 渲染文件名主干（不含扩展名）
    pub fn render_stem(&self, now: DateTime<Utc>) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => sanitize_literal(text),
                Segment::Timestamp => format_timestamp(now),
            })
            .collect()
    }

    /// 完整文件名；`attempt > 0` 时追加 `-N` 以避开已存在的文件
    pub fn file_name(&self, now: DateTime<Utc>, extension: &str, attempt: u32) -> String {
        let stem = self.render_stem(now);
        if attempt == 0 {
            format!("{}.{}", stem, extension)
        } else {
            format!("{}-{}.{}", stem, attempt, extension)
        }
    }
}

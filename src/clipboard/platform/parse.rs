//! 剪贴板工具输出解析
//!
//! 纯函数，不依赖平台，便于在任意系统上测试。

// 各平台只用到其中一部分
#![cfg_attr(not(test), allow(dead_code))]

use std::path::PathBuf;

/// 解析 `text/uri-list`，返回第一个本地文件路径
///
/// 跳过 `#` 注释行；只接受 `file://` 且主机为空或 `localhost` 的地址。
pub(crate) fn first_file_uri(uri_list: &str) -> Option<PathBuf> {
    uri_list
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find_map(file_uri_to_path)
}

fn file_uri_to_path(uri: &str) -> Option<PathBuf> {
    let rest = uri.strip_prefix("file://")?;
    let path = if rest.starts_with('/') {
        rest
    } else {
        rest.strip_prefix("localhost")?
    };
    if !path.starts_with('/') {
        return None;
    }
    let bytes = percent_decode(path)?;
    Some(PathBuf::from(String::from_utf8(bytes).ok()?))
}

/// `%XX` 解码；遇到非法转义返回 `None`
pub(crate) fn percent_decode(input: &str) -> Option<Vec<u8>> {
    let raw = input.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    Some(out)
}

/// 解析 AppleScript 打印的数据字面量 `«data PNGf89504E47…»`
pub(crate) fn applescript_data_literal(output: &str) -> Option<Vec<u8>> {
    let body = output.trim().strip_prefix("«data ")?.strip_suffix('»')?;
    // 前 4 个字符是类型码（如 PNGf、TIFF）
    let hex = body.get(4..)?;
    decode_hex(hex)
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| hex.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

/// 可直接保存的栅格图片类型，按优先级排列
const RASTER_TARGETS: [&str; 8] = [
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/bmp",
    "image/x-bmp",
    "image/tiff",
    "image/webp",
];

/// 从目标类型列表中选出栅格图片类型，优先 `image/png`
///
/// `image/svg+xml` 等矢量或未知类型不参与选择。
pub(crate) fn pick_image_target(targets: &[String]) -> Option<&str> {
    RASTER_TARGETS
        .iter()
        .copied()
        .find(|wanted| targets.iter().any(|t| t.eq_ignore_ascii_case(wanted)))
}

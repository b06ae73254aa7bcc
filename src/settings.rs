//! 设置读取模块
//!
//! # 设计思路
//!
//! 核心流水线只依赖 `ConfigReader` 这个最小接口：按键读取 JSON 值。
//! 宿主（编辑器、终端、本仓库自带的命令行）各自实现它，
//! 每次调用都重新读取，不做缓存。
//!
//! # 实现思路
//!
//! - `JsonSettings` 从项目根目录的 `.terminal-image-paste.json` 加载。
//! - 文件不存在视为全部默认值；解析失败记录警告后同样回退默认值。
//! - 键缺失或类型不对时回退该键的默认值，不让一个坏配置项拖垮整次粘贴。

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::AppError;

/// 项目内设置文件名
pub const SETTINGS_FILE_NAME: &str = ".terminal-image-paste.json";

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_SAVE_DIR: &str = "saveDir";
pub const KEY_FILE_NAME_PATTERN: &str = "fileNamePattern";

pub const DEFAULT_SAVE_DIR: &str = "images";
pub const DEFAULT_FILE_NAME_PATTERN: &str = "clipboard-{timestamp}.png";

/// 配置读取接口
pub trait ConfigReader: Send + Sync {
    /// 读取原始值，键不存在时返回 `None`
    fn get(&self, key: &str) -> Option<Value>;

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }
}

/// 文件命名配置（每次调用重新读取）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    /// 相对项目根目录的保存目录
    pub save_dir: String,
    /// 文件名模板，支持 `{timestamp}`
    pub file_name_pattern: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            save_dir: DEFAULT_SAVE_DIR.to_string(),
            file_name_pattern: DEFAULT_FILE_NAME_PATTERN.to_string(),
        }
    }
}

impl NamingConfig {
    pub fn from_reader(reader: &dyn ConfigReader) -> Self {
        Self {
            save_dir: reader.get_string(KEY_SAVE_DIR, DEFAULT_SAVE_DIR),
            file_name_pattern: reader.get_string(KEY_FILE_NAME_PATTERN, DEFAULT_FILE_NAME_PATTERN),
        }
    }
}

/// 是否启用图片粘贴（默认启用）
pub fn is_enabled(reader: &dyn ConfigReader) -> bool {
    reader.get_bool(KEY_ENABLED, true)
}

/// 基于 JSON 对象的设置实现
#[derive(Debug, Clone, Default)]
pub struct JsonSettings {
    values: Map<String, Value>,
}

impl JsonSettings {
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(AppError::Settings(format!("设置必须是 JSON 对象，实际为: {}", other))),
        }
    }

    /// 从指定文件加载；不存在或损坏时返回空设置
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(AppError::from)
            .and_then(|content| {
                serde_json::from_str::<Value>(&content)
                    .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))
            })
            .and_then(Self::from_value);

        match parsed {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("⚠️ 设置文件 {} 不可用，使用默认值: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// 加载项目根目录下的设置文件；没有项目时返回空设置
    pub fn load_for_project(project_root: Option<&Path>) -> Self {
        match project_root {
            Some(root) => Self::load_from_path(&root.join(SETTINGS_FILE_NAME)),
            None => Self::default(),
        }
    }
}

impl ConfigReader for JsonSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::*;

    fn unique_temp_dir() -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("terminal-image-paste-settings-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings = JsonSettings::default();

        assert!(is_enabled(&settings));
        assert_eq!(NamingConfig::from_reader(&settings), NamingConfig::default());
    }

    #[test]
    fn configured_values_are_used() {
        let settings = JsonSettings::from_value(json!({
            "enabled": false,
            "saveDir": "docs/shots",
            "fileNamePattern": "shot-{timestamp}.png",
        }))
        .expect("object settings");

        assert!(!is_enabled(&settings));
        let naming = NamingConfig::from_reader(&settings);
        assert_eq!(naming.save_dir, "docs/shots");
        assert_eq!(naming.file_name_pattern, "shot-{timestamp}.png");
    }

    #[test]
    fn wrong_types_fall_back_per_key() {
        let settings = JsonSettings::from_value(json!({ "enabled": "no", "saveDir": 42 }))
            .expect("object settings");

        assert!(is_enabled(&settings));
        assert_eq!(NamingConfig::from_reader(&settings).save_dir, DEFAULT_SAVE_DIR);
    }

    #[test]
    fn non_object_settings_are_rejected() {
        assert!(matches!(JsonSettings::from_value(json!([1, 2])), Err(AppError::Settings(_))));
    }

    #[test]
    fn load_bad_file_falls_back_to_empty() {
        let dir = unique_temp_dir();
        std::fs::write(dir.join(SETTINGS_FILE_NAME), "not-json").expect("write invalid settings");

        let settings = JsonSettings::load_for_project(Some(&dir));
        assert!(settings.get(KEY_ENABLED).is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn load_project_file_roundtrip() {
        let dir = unique_temp_dir();
        std::fs::write(dir.join(SETTINGS_FILE_NAME), r#"{"saveDir":"assets"}"#)
            .expect("write settings");

        let settings = JsonSettings::load_for_project(Some(&dir));
        assert_eq!(NamingConfig::from_reader(&settings).save_dir, "assets");

        let _ = std::fs::remove_dir_all(dir);
    }
}

//! # 粘贴编排模块
//!
//! ## 设计思路
//!
//! 命令入口，流程是线性的，首个成功或回退即结束：
//! 1. 读取 `enabled`，关闭时直接普通粘贴
//! 2. 探测剪贴板图片；没有图片或探测失败 → 普通粘贴
//! 3. 保存到项目；失败 → 提示错误，**不**回退普通粘贴（图片已检测到，静默回退会掩盖丢失）
//! 4. 成功 → 向终端输入相对路径（不回车），并提示已保存
//!
//! ## 实现思路
//!
//! - 宿主能力全部经 `PasteContext` 显式传入，便于用假实现测试整条链路。
//! - 终端输入失败等意外情况按“探测失败”处理：回退普通粘贴，保证终端仍可用。
//! - 返回 `PasteOutcome` 只用于日志与测试，调用方可以忽略。

use crate::clipboard::{probe_clipboard_image, ClipboardImageSource, ClipboardProbeResult, TempArea};
use crate::error::AppError;
use crate::host::{DefaultPaste, Notifier, ProjectRoots, TerminalSink};
use crate::settings::{is_enabled, ConfigReader, NamingConfig};
use crate::storage::{save_to_workspace, SavedImage};

/// 单次粘贴所需的全部外部上下文
pub struct PasteContext<'a, S> {
    pub settings: &'a dyn ConfigReader,
    pub project_roots: &'a dyn ProjectRoots,
    pub clipboard: &'a S,
    pub temp_area: &'a TempArea,
    /// 当前活动终端；没有时只保存图片并提示
    pub terminal: Option<&'a dyn TerminalSink>,
    pub notifier: &'a dyn Notifier,
    pub fallback: &'a dyn DefaultPaste,
}

/// 回退普通粘贴的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    Disabled,
    NoImage,
    Acquisition,
    Unexpected,
}

/// 单次粘贴的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// 已执行普通粘贴
    FellBack(FallbackReason),
    /// 图片已保存并输入到终端
    Saved(SavedImage),
    /// 检测到图片但保存失败，已提示用户
    SaveFailed(String),
}

/// 终端中引用保存文件的文本；含空白时加单引号
pub fn terminal_reference(relative: &str) -> String {
    if relative.chars().any(char::is_whitespace) {
        format!("'{}'", relative.replace('\'', r"'\''"))
    } else {
        relative.to_string()
    }
}

/// 执行普通粘贴；普通粘贴本身失败只能记录日志
pub fn fall_back(fallback: &dyn DefaultPaste, reason: FallbackReason) -> PasteOutcome {
    log::info!("↩️ 执行普通粘贴（原因: {:?}）", reason);
    if let Err(e) = fallback.paste() {
        log::error!("普通粘贴失败: {}", e);
    }
    PasteOutcome::FellBack(reason)
}

fn save_error_message(error: &AppError) -> String {
    match error {
        AppError::NoWorkspace => error.to_string(),
        other => format!("保存图片失败: {}", other),
    }
}

/// 粘贴命令主入口
pub async fn paste_image<S>(ctx: &PasteContext<'_, S>) -> PasteOutcome
where
    S: ClipboardImageSource,
{
    if !is_enabled(ctx.settings) {
        return fall_back(ctx.fallback, FallbackReason::Disabled);
    }

    let image = match probe_clipboard_image(ctx.clipboard, ctx.temp_area).await {
        Ok(ClipboardProbeResult::ImagePath(image)) => image,
        Ok(ClipboardProbeResult::NoImage) => {
            return fall_back(ctx.fallback, FallbackReason::NoImage);
        }
        Err(e) => {
            log::warn!("⚠️ 剪贴板探测失败: {}", e);
            return fall_back(ctx.fallback, FallbackReason::Acquisition);
        }
    };

    log::debug!("保存剪贴板图片: {} ({:?})", image.path().display(), image.origin());
    let project_root = ctx.project_roots.roots().into_iter().next();
    let naming = NamingConfig::from_reader(ctx.settings);
    let saved = match save_to_workspace(&image, project_root.as_deref(), &naming).await {
        Ok(saved) => saved,
        Err(e) => {
            log::error!("❌ 保存剪贴板图片失败: {}", e);
            let message = save_error_message(&e);
            ctx.notifier.show_error(&message);
            return PasteOutcome::SaveFailed(message);
        }
    };

    if let Some(terminal) = ctx.terminal {
        if let Err(e) = terminal.send_text(&terminal_reference(saved.relative()), false) {
            log::error!("向终端输入路径失败: {}", e);
            return fall_back(ctx.fallback, FallbackReason::Unexpected);
        }
    }

    ctx.notifier.show_info(&format!("图片已保存: {}", saved.relative()));
    PasteOutcome::Saved(saved)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::*;
    use crate::clipboard::testing::FakeClipboard;
    use crate::settings::JsonSettings;

    #[derive(Default)]
    struct Recorder {
        pastes: Mutex<usize>,
        sent: Mutex<Vec<(String, bool)>>,
        infos: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
        terminal_broken: bool,
    }

    impl Recorder {
        fn pastes(&self) -> usize {
            *self.pastes.lock().unwrap()
        }
    }

    impl DefaultPaste for Recorder {
        fn paste(&self) -> Result<(), AppError> {
            *self.pastes.lock().unwrap() += 1;
            Ok(())
        }
    }

    impl TerminalSink for Recorder {
        fn send_text(&self, text: &str, execute: bool) -> Result<(), AppError> {
            if self.terminal_broken {
                return Err(AppError::Input("terminal gone".to_string()));
            }
            self.sent.lock().unwrap().push((text.to_string(), execute));
            Ok(())
        }
    }

    impl Notifier for Recorder {
        fn show_info(&self, message: &str) {
            self.infos.lock().unwrap().push(message.to_string());
        }

        fn show_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    struct FixedRoots(Vec<PathBuf>);

    impl ProjectRoots for FixedRoots {
        fn roots(&self) -> Vec<PathBuf> {
            self.0.clone()
        }
    }

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("{}_{}", prefix, nanos));
        let _ = std::fs::create_dir_all(&dir);
        dir
    }

    async fn run(
        settings: &JsonSettings,
        roots: &FixedRoots,
        clipboard: &FakeClipboard,
        area: &TempArea,
        recorder: &Recorder,
    ) -> PasteOutcome {
        let ctx = PasteContext {
            settings,
            project_roots: roots,
            clipboard,
            temp_area: area,
            terminal: Some(recorder),
            notifier: recorder,
            fallback: recorder,
        };
        paste_image(&ctx).await
    }

    #[test]
    fn terminal_reference_quotes_whitespace() {
        assert_eq!(terminal_reference("images/a.png"), "images/a.png");
        assert_eq!(terminal_reference("my images/a.png"), "'my images/a.png'");
        assert_eq!(terminal_reference("it's here/a b.png"), r"'it'\''s here/a b.png'");
    }

    #[tokio::test]
    async fn disabled_only_pastes() {
        let dir = unique_temp_dir("tip_paste_disabled");
        let settings = JsonSettings::from_value(json!({ "enabled": false })).unwrap();
        let clipboard = FakeClipboard::with_bytes(vec![1, 2, 3]);
        let recorder = Recorder::default();

        let outcome = run(
            &settings,
            &FixedRoots(vec![dir.clone()]),
            &clipboard,
            &TempArea::new(dir.join("area")),
            &recorder,
        )
        .await;

        assert_eq!(outcome, PasteOutcome::FellBack(FallbackReason::Disabled));
        assert_eq!(recorder.pastes(), 1);
        assert_eq!(clipboard.calls(), 0, "clipboard must not be probed");
        assert!(!dir.join("images").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn text_clipboard_falls_back_without_writing_files() {
        let dir = unique_temp_dir("tip_paste_text");
        let area = TempArea::new(dir.join("area"));
        let recorder = Recorder::default();

        let outcome = run(
            &JsonSettings::default(),
            &FixedRoots(vec![dir.clone()]),
            &FakeClipboard::text_only(),
            &area,
            &recorder,
        )
        .await;

        assert_eq!(outcome, PasteOutcome::FellBack(FallbackReason::NoImage));
        assert_eq!(recorder.pastes(), 1);
        assert!(recorder.sent.lock().unwrap().is_empty());
        assert!(!dir.join("images").exists());
        assert!(!area.dir().exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn acquisition_error_falls_back() {
        let dir = unique_temp_dir("tip_paste_broken");
        let recorder = Recorder::default();

        let outcome = run(
            &JsonSettings::default(),
            &FixedRoots(vec![dir.clone()]),
            &FakeClipboard::broken(),
            &TempArea::new(dir.join("area")),
            &recorder,
        )
        .await;

        assert_eq!(outcome, PasteOutcome::FellBack(FallbackReason::Acquisition));
        assert_eq!(recorder.pastes(), 1);
        assert!(recorder.errors.lock().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn file_reference_is_saved_and_sent_unexecuted() {
        let dir = unique_temp_dir("tip_paste_reference");
        let root = dir.join("project");
        let picture = dir.join("pic.png");
        std::fs::write(&picture, b"png-bytes").expect("write picture");
        let recorder = Recorder::default();

        let outcome = run(
            &JsonSettings::default(),
            &FixedRoots(vec![root.clone()]),
            &FakeClipboard::with_file(&picture),
            &TempArea::new(dir.join("area")),
            &recorder,
        )
        .await;

        let PasteOutcome::Saved(saved) = outcome else {
            panic!("expected saved outcome");
        };
        assert!(saved.relative().starts_with("images/clipboard-"));
        assert!(saved.relative().ends_with(".png"));
        assert_eq!(std::fs::read(saved.path()).expect("read saved"), b"png-bytes");
        assert_eq!(*recorder.sent.lock().unwrap(), vec![(saved.relative().to_string(), false)]);
        assert_eq!(recorder.infos.lock().unwrap().len(), 1);
        assert!(recorder.infos.lock().unwrap()[0].contains(saved.relative()));
        assert_eq!(recorder.pastes(), 0);
        assert!(picture.exists(), "referenced file must not be deleted");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn save_failure_shows_error_and_keeps_temp_file() {
        let dir = unique_temp_dir("tip_paste_save_fail");
        let root = dir.join("project");
        std::fs::create_dir_all(&root).expect("create root");
        // 保存目录位置被普通文件占用，创建目录必然失败
        std::fs::write(root.join("images"), b"blocker").expect("write blocker");
        let area = TempArea::new(dir.join("area"));
        let recorder = Recorder::default();

        let outcome = run(
            &JsonSettings::default(),
            &FixedRoots(vec![root.clone()]),
            &FakeClipboard::with_bytes(vec![9, 8, 7]),
            &area,
            &recorder,
        )
        .await;

        assert!(matches!(outcome, PasteOutcome::SaveFailed(_)));
        assert_eq!(recorder.pastes(), 0, "no fallback paste after a detected image");
        assert_eq!(recorder.errors.lock().unwrap().len(), 1);
        let remaining = std::fs::read_dir(area.dir()).expect("list area").flatten().count();
        assert_eq!(remaining, 1, "temp file stays when the save fails");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_project_reports_error_without_paste() {
        let dir = unique_temp_dir("tip_paste_no_project");
        let picture = dir.join("pic.png");
        std::fs::write(&picture, b"png").expect("write picture");
        let recorder = Recorder::default();

        let outcome = run(
            &JsonSettings::default(),
            &FixedRoots(Vec::new()),
            &FakeClipboard::with_file(&picture),
            &TempArea::new(dir.join("area")),
            &recorder,
        )
        .await;

        assert!(matches!(outcome, PasteOutcome::SaveFailed(_)));
        assert_eq!(recorder.pastes(), 0);
        assert_eq!(*recorder.errors.lock().unwrap(), vec![AppError::NoWorkspace.to_string()]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn terminal_failure_falls_back() {
        let dir = unique_temp_dir("tip_paste_terminal");
        let picture = dir.join("pic.png");
        std::fs::write(&picture, b"png").expect("write picture");
        let recorder = Recorder {
            terminal_broken: true,
            ..Recorder::default()
        };

        let outcome = run(
            &JsonSettings::default(),
            &FixedRoots(vec![dir.join("project")]),
            &FakeClipboard::with_file(&picture),
            &TempArea::new(dir.join("area")),
            &recorder,
        )
        .await;

        assert_eq!(outcome, PasteOutcome::FellBack(FallbackReason::Unexpected));
        assert_eq!(recorder.pastes(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

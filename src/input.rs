//! 键盘模拟：向聚焦的终端输入文本、触发普通粘贴

use enigo::{
    Direction::{Click, Press, Release},
    Enigo, Key, Keyboard, Settings,
};

use crate::error::AppError;
use crate::host::{DefaultPaste, TerminalSink};

/// 终端粘贴快捷键的修饰键
///
/// 终端里 `Ctrl+V` 是“字面输入下一个字符”，Linux 终端普遍使用 `Ctrl+Shift+V`。
pub fn paste_modifiers() -> &'static [Key] {
    #[cfg(target_os = "macos")]
    {
        &[Key::Meta]
    }
    #[cfg(target_os = "linux")]
    {
        &[Key::Control, Key::Shift]
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        &[Key::Control]
    }
}

fn new_enigo() -> Result<Enigo, AppError> {
    Enigo::new(&Settings::default())
        .map_err(|e| AppError::Input(format!("初始化输入模拟失败: {}", e)))
}

/// 基于 `enigo` 的终端输入
#[derive(Debug, Default)]
pub struct EnigoTerminal;

impl TerminalSink for EnigoTerminal {
    fn send_text(&self, text: &str, execute: bool) -> Result<(), AppError> {
        let mut enigo = new_enigo()?;
        enigo
            .text(text)
            .map_err(|e| AppError::Input(format!("模拟文本输入失败: {}", e)))?;
        if execute {
            enigo
                .key(Key::Return, Click)
                .map_err(|e| AppError::Input(format!("模拟回车失败: {}", e)))?;
        }
        log::debug!("已向终端输入 {} 个字符", text.chars().count());
        Ok(())
    }
}

impl DefaultPaste for EnigoTerminal {
    fn paste(&self) -> Result<(), AppError> {
        let mut enigo = new_enigo()?;
        let modifiers = paste_modifiers();

        let pressed = modifiers
            .iter()
            .try_for_each(|key| enigo.key(*key, Press))
            .and_then(|_| enigo.key(Key::Unicode('v'), Click));

        // 无论按键是否成功都释放修饰键，避免键盘状态卡住
        let released = modifiers
            .iter()
            .rev()
            .try_for_each(|key| enigo.key(*key, Release));

        pressed
            .and(released)
            .map_err(|e| AppError::Input(format!("模拟粘贴按键失败: {}", e)))?;
        log::debug!("已执行普通粘贴");
        Ok(())
    }
}

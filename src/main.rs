//! # 终端图片粘贴 — 命令入口
//!
//! 绑定到终端的粘贴快捷键上运行：剪贴板里有图片时保存进项目并输入其路径，
//! 否则执行普通粘贴。没有命令行参数，行为完全由项目内的设置文件决定。

use terminal_image_paste::clipboard::{SystemClipboard, TempArea};
use terminal_image_paste::host::{ConsoleNotifier, GitProjectRoots, ProjectRoots};
use terminal_image_paste::input::EnigoTerminal;
use terminal_image_paste::paste::{fall_back, paste_image, FallbackReason, PasteContext};
use terminal_image_paste::settings::JsonSettings;

/// 单次调用持有的桌面环境
struct Desktop {
    settings: JsonSettings,
    roots: GitProjectRoots,
    clipboard: SystemClipboard,
    temp_area: TempArea,
    terminal: EnigoTerminal,
    notifier: ConsoleNotifier,
}

impl Desktop {
    fn load() -> Self {
        let roots = GitProjectRoots::from_env();
        let project_root = roots.roots().into_iter().next();
        match &project_root {
            Some(root) => log::info!("项目根目录: {}", root.display()),
            None => log::info!("未找到项目根目录"),
        }

        Self {
            settings: JsonSettings::load_for_project(project_root.as_deref()),
            roots,
            clipboard: SystemClipboard::new(),
            temp_area: TempArea::system(),
            terminal: EnigoTerminal,
            notifier: ConsoleNotifier,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let desktop = Desktop::load();
    let task = tokio::spawn(async move {
        let ctx = PasteContext {
            settings: &desktop.settings,
            project_roots: &desktop.roots,
            clipboard: &desktop.clipboard,
            temp_area: &desktop.temp_area,
            terminal: Some(&desktop.terminal),
            notifier: &desktop.notifier,
            fallback: &desktop.terminal,
        };
        paste_image(&ctx).await
    });

    match task.await {
        Ok(outcome) => log::debug!("粘贴完成: {:?}", outcome),
        Err(err) => {
            // 流水线内部 panic：保证终端至少得到一次普通粘贴
            log::error!("粘贴流程异常中止: {}", err);
            fall_back(&EnigoTerminal, FallbackReason::Unexpected);
        }
    }
}

//! Internationalization (i18n) module
//!
//! Provides language detection and localized strings for the CLI summary.
//! Supports English and Chinese Simplified.
//! Note: Log messages remain in English for consistency.

use std::sync::OnceLock;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    ChineseSimplified,
}

/// Global language instance
static LANGUAGE: OnceLock<Language> = OnceLock::new();

/// Initialize and get the current language based on system locale
pub fn get_language() -> Language {
    *LANGUAGE.get_or_init(detect_language)
}

/// Detect the system language, preferring the OS locale over environment
/// variables
fn detect_language() -> Language {
    let locale = sys_locale::get_locale()
        .or_else(|| std::env::var("LC_ALL").ok())
        .or_else(|| std::env::var("LC_MESSAGES").ok())
        .or_else(|| std::env::var("LANG").ok())
        .unwrap_or_default();

    language_for_locale(&locale)
}

/// Map a locale identifier (`zh-CN`, `zh_CN.UTF-8`, `en-US`...) to a language
pub fn language_for_locale(locale: &str) -> Language {
    let locale = locale.to_lowercase();
    if locale.starts_with("zh") || locale.contains("hans") || locale.contains("chinese") {
        Language::ChineseSimplified
    } else {
        Language::English
    }
}

/// Localized strings for the CLI interface
pub struct Strings;

impl Strings {
    pub fn starting_run() -> &'static str {
        match get_language() {
            Language::English => "Starting stereo pipeline",
            Language::ChineseSimplified => "开始处理立体图像",
        }
    }

    pub fn summary_workflow() -> &'static str {
        match get_language() {
            Language::English => "Workflow",
            Language::ChineseSimplified => "工作流程",
        }
    }

    pub fn summary_left() -> &'static str {
        match get_language() {
            Language::English => "Left directory",
            Language::ChineseSimplified => "左侧目录",
        }
    }

    pub fn summary_right() -> &'static str {
        match get_language() {
            Language::English => "Right directory",
            Language::ChineseSimplified => "右侧目录",
        }
    }

    pub fn processing_complete() -> &'static str {
        match get_language() {
            Language::English => "Processing Complete",
            Language::ChineseSimplified => "处理完成",
        }
    }

    pub fn stage_results() -> &'static str {
        match get_language() {
            Language::English => "Stage results",
            Language::ChineseSimplified => "各阶段结果",
        }
    }

    pub fn stat_processed() -> &'static str {
        match get_language() {
            Language::English => "Processed",
            Language::ChineseSimplified => "已处理",
        }
    }

    pub fn stat_skipped() -> &'static str {
        match get_language() {
            Language::English => "Skipped",
            Language::ChineseSimplified => "已跳过",
        }
    }

    pub fn stat_failed() -> &'static str {
        match get_language() {
            Language::English => "Failed",
            Language::ChineseSimplified => "失败",
        }
    }

    pub fn stat_total() -> &'static str {
        match get_language() {
            Language::English => "Total",
            Language::ChineseSimplified => "总计",
        }
    }

    pub fn detailed_results() -> &'static str {
        match get_language() {
            Language::English => "Detailed results:",
            Language::ChineseSimplified => "详细结果：",
        }
    }

    pub fn failed_files(n: usize) -> String {
        match get_language() {
            Language::English => format!("Failed files: {} files", n),
            Language::ChineseSimplified => format!("失败的文件：{} 个", n),
        }
    }

    pub fn no_message() -> &'static str {
        match get_language() {
            Language::English => "unknown error",
            Language::ChineseSimplified => "未知错误",
        }
    }

    pub fn run_aborted() -> &'static str {
        match get_language() {
            Language::English => "Run aborted",
            Language::ChineseSimplified => "运行已中止",
        }
    }

    pub fn spatial_skipped_notice() -> &'static str {
        match get_language() {
            Language::English => "Spatial encoding skipped (--skip-spatial).",
            Language::ChineseSimplified => "已跳过空间照片编码（--skip-spatial）。",
        }
    }

    pub fn log_saved_to() -> &'static str {
        match get_language() {
            Language::English => "Log saved to",
            Language::ChineseSimplified => "日志已保存至",
        }
    }

    pub fn log_file_unavailable() -> &'static str {
        match get_language() {
            Language::English => "Could not create log file, logging to console only",
            Language::ChineseSimplified => "无法创建日志文件，仅输出到控制台",
        }
    }

    pub fn report_saved_to() -> &'static str {
        match get_language() {
            Language::English => "Report saved to",
            Language::ChineseSimplified => "报告已保存至",
        }
    }
}

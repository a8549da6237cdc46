//! Stereo Spatial - Turn paired camera shots into spatial photos
//!
//! Runs one of the stereo workflows over a left/right directory pair and
//! prints a per-stage summary of what happened to every file.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use stereo_spatial::i18n::Strings;
use stereo_spatial::report::FileStatus;
use stereo_spatial::{Cli, Pipeline, RunReport};
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! 命令行输出样式
    //!
    //! 摘要、阶段统计和失败列表共用的颜色与格式。

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;
    use stereo_spatial::report::BatchSummary;

    /// CLI 主题颜色
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    /// 打印居中的标题
    pub fn print_title(title: &str) {
        let width: usize = 60;
        let padding = width.saturating_sub(title.chars().count()) / 2;
        let _ = stdout().execute(Print(" ".repeat(padding)));
        let _ = stdout().execute(Print(style(title).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 错误信息输出到 stderr
    pub fn print_error(msg: &str) {
        let _ = std::io::stderr().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = std::io::stderr().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 打印键值对
    pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = match value_color {
            Some(color) => style(value).with(color),
            None => style(value).bold(),
        };
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// 一个阶段的统计：名称后跟三种计数
    pub fn print_stage(name: &str, summary: &BatchSummary, labels: [&str; 3]) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(format!("{:<22}", name)).with(CliTheme::ACCENT)));
        let counts = [
            (labels[0], summary.processed, CliTheme::SUCCESS),
            (labels[1], summary.skipped, CliTheme::WARNING),
            (labels[2], summary.failed, CliTheme::ERROR),
        ];
        for (label, count, color) in counts {
            let _ = stdout().execute(Print(style(format!(" {}: ", label)).with(CliTheme::HINT)));
            let _ = stdout().execute(Print(style(count.to_string()).with(color).bold()));
        }
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印处理结果行
    pub fn print_result(status_icon: &str, status_color: Color, source: &str, detail: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(status_icon).with(status_color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(detail).with(CliTheme::HINT)));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印文件路径（日志、报告）
    pub fn print_path(label: &str, path: &str) {
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style(format!("{}: ", label)).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match cli.log_dir {
        Some(ref dir) => dir.clone(),
        None => get_executable_dir()?.join("Log"),
    };
    let log_path = get_log_path(&log_dir);
    let (_guard, log_file) = setup_logging(&cli, &log_path);

    info!(version = env!("CARGO_PKG_VERSION"), "Stereo Spatial starting");

    let config = cli.to_config();
    if cli.verbose {
        info!(?config, "Configuration loaded");
    }
    if let Some(ref path) = log_file {
        info!(log_file = %path.display(), "Log file location");
    }

    {
        use cli_output::*;
        print_separator();
        print_title(Strings::starting_run());
        print_separator();
        print_key_value(Strings::summary_workflow(), &format!("{:?}", config.workflow), Some(CliTheme::ACCENT));
        print_key_value(Strings::summary_left(), &config.left_dir.display().to_string(), None);
        print_key_value(Strings::summary_right(), &config.right_dir.display().to_string(), None);
        print_blank();
    }

    let skip_spatial = config.encoder.is_none();
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;

    match pipeline.run() {
        Ok(report) => {
            print_report(&report, cli.verbose);

            if skip_spatial {
                cli_output::print_warning(Strings::spatial_skipped_notice());
            }

            if let Some(ref path) = cli.report {
                report
                    .write_json(path)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                cli_output::print_path(Strings::report_saved_to(), &path.display().to_string());
            }

            if let Some(ref path) = log_file {
                cli_output::print_path(Strings::log_saved_to(), &path.display().to_string());
                info!(log_file = %path.display(), "Processing complete. Log saved to");
            }

            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            cli_output::print_error(&format!("{}: {}", Strings::run_aborted(), e));
            std::process::exit(1);
        }
    }
}

/// Print the per-stage summary, failures and (verbose) every result
fn print_report(report: &RunReport, verbose: bool) {
    use cli_output::*;

    let labels = [Strings::stat_processed(), Strings::stat_skipped(), Strings::stat_failed()];

    print_separator();
    print_title(Strings::processing_complete());
    print_separator();
    print_hint(Strings::stage_results());
    for stage in &report.stages {
        print_stage(stage.stage.name(), &stage.summary(), labels);
    }
    print_blank();
    print_stage(Strings::stat_total(), &report.totals(), labels);
    print_blank();

    if verbose {
        print_separator();
        print_hint(Strings::detailed_results());
        for stage in &report.stages {
            print_blank();
            print_key_value(stage.stage.name(), &stage.summary().to_string(), Some(CliTheme::ACCENT));
            for result in &stage.batch.results {
                let source = result.source.display().to_string();
                let detail = match result.status {
                    FileStatus::Processed => result
                        .destination
                        .as_ref()
                        .map(|p| format!("→ {}", p.display()))
                        .unwrap_or_default(),
                    _ => result.message.clone().unwrap_or_default(),
                };
                let (icon, color) = match result.status {
                    FileStatus::Processed => ("✓", CliTheme::SUCCESS),
                    FileStatus::Skipped => ("⊘", CliTheme::WARNING),
                    FileStatus::Failed => ("✗", CliTheme::ERROR),
                };
                print_result(icon, color, &source, &detail);
            }
        }
    }

    let failed: Vec<_> = report
        .stages
        .iter()
        .flat_map(|s| s.batch.failures().map(move |r| (s.stage.name(), r)))
        .collect();

    if !failed.is_empty() {
        print_separator();
        print_error(&Strings::failed_files(failed.len()));
        print_blank();
        for (stage, result) in &failed {
            let message = result.message.as_deref().unwrap_or(Strings::no_message());
            print_key_value(
                &format!("[{}] {}", stage, result.source.display()),
                message,
                Some(CliTheme::ERROR),
            );
        }
    }
    print_separator();
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

fn get_log_path(log_dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("SpatialRun_{}.log", timestamp))
}

fn open_log_file(log_path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
}

/// Setup logging (file + console)
///
/// Falls back to console-only logging when the log file can't be created.
/// Returns the appender guard and the log path actually in use.
fn setup_logging(cli: &Cli, log_path: &Path) -> (Option<WorkerGuard>, Option<PathBuf>) {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let file = match open_log_file(log_path) {
        Ok(file) => file,
        Err(e) => {
            subscriber.with(fmt::layer().with_writer(std::io::stderr)).init();
            warn!(
                log_file = %log_path.display(),
                error = %e,
                "{}",
                Strings::log_file_unavailable()
            );
            return (None, None);
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    (Some(guard), Some(log_path.to_path_buf()))
}

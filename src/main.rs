use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use log::{error, info};
use slideshow_render::component::SlideshowRenderer;
use slideshow_render::config::Config;
use slideshow_render::init;
use slideshow_render::signal::setup_shutdown_signal;
use slideshow_render::tools::validate_directory_exists;
use std::path::PathBuf;
use std::process::ExitCode;

/// 將資料夾內的圖片與音訊合成為單一影片
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// 根目錄，需包含 assets/images/ 與 assets/audio.mp3
    root: PathBuf,

    /// 每個外部程序的執行期限（秒）
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// 失敗時保留未完成的影片檔
    #[arg(long)]
    keep_partial: bool,
}

fn main() -> ExitCode {
    init::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("執行失敗: {e:#}");
            eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    validate_directory_exists(&cli.root)?;
    let shutdown_signal = setup_shutdown_signal()?;

    let mut config = Config::new(&cli.root)?;
    if cli.timeout.is_some() {
        config.settings.process_timeout_secs = cli.timeout;
    }
    if cli.keep_partial {
        config.settings.keep_partial_artifacts = true;
    }

    let mut renderer = SlideshowRenderer::new(config, shutdown_signal);
    let report = renderer
        .run()
        .with_context(|| format!("無法處理 {}", cli.root.display()))?;

    println!();
    println!("{}", style("=== 影片摘要 ===").cyan().bold());
    println!("  圖片數量: {}", report.image_count);
    println!("  音訊長度: {} 秒", report.timing.audio_seconds);
    println!("  每張圖片: {} 秒", report.timing.per_image_seconds);
    println!(
        "  影片長度: {} 秒 (差距 {} 秒)",
        report.timing.displayed_seconds(),
        report.timing.drift_seconds()
    );
    println!("  輸出檔案: {}", style(report.output_path.display()).green());

    info!(
        "影片完成 - {} 張圖片, {} 秒: {}",
        report.image_count,
        report.timing.displayed_seconds(),
        report.output_path.display()
    );
    Ok(())
}

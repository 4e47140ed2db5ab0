use super::artifact_guard::ArtifactGuard;
use super::ffmpeg_command::FfmpegCommand;
use super::timing::TimingPlan;
use crate::config::{Config, RenderPaths};
use crate::error::{EncodePass, RenderError, RenderResult};
use crate::tools::{
    ImageManifest, ProcessRunner, enumerate_images, get_audio_duration, remove_file_if_exists,
};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Enumerating,
    Probing,
    ComputingTiming,
    EncodingImages,
    MergingAudio,
    CleaningUp,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enumerating => "掃描圖片",
            Self::Probing => "取得音訊長度",
            Self::ComputingTiming => "計算圖片時長",
            Self::EncodingImages => "圖片轉影片",
            Self::MergingAudio => "合併音訊",
            Self::CleaningUp => "清理暫存檔",
        };
        f.write_str(name)
    }
}

/// 流程狀態：依序前進，任何階段失敗即停在 `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running(PipelineStage),
    Done,
    Failed(PipelineStage),
}

#[derive(thiserror::Error, Debug)]
#[error("[{stage}] 階段失敗: {source}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub source: RenderError,
}

/// 一次成功執行的摘要
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub image_count: usize,
    pub timing: TimingPlan,
    pub manifest_path: PathBuf,
    pub output_path: PathBuf,
}

/// 圖片與音訊合成影片
///
/// 流程：
/// 1. 掃描圖片並寫出 concat 清單
/// 2. ffprobe 取得音訊長度
/// 3. 計算每張圖片的顯示秒數
/// 4. 圖片清單轉為無聲暫存影片
/// 5. 暫存影片與音訊合併為最終輸出
/// 6. 刪除暫存影片
pub struct SlideshowRenderer {
    config: Config,
    runner: ProcessRunner,
    ffmpeg: FfmpegCommand,
    state: PipelineState,
}

impl SlideshowRenderer {
    #[must_use]
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let runner = ProcessRunner::new(config.settings.process_timeout(), shutdown_signal);
        let ffmpeg = FfmpegCommand::new(&config.settings);
        Self {
            config,
            runner,
            ffmpeg,
            state: PipelineState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    pub fn run(&mut self) -> Result<RenderReport, PipelineError> {
        println!("{}", style("=== 圖片與音訊合成影片 ===").cyan().bold());

        let paths = self.config.paths.clone();
        let mut guard = ArtifactGuard::new(self.config.settings.keep_partial_artifacts);

        let manifest = self.run_stage(PipelineStage::Enumerating, |r| r.enumerate(&paths))?;

        let audio_seconds = self.run_stage(PipelineStage::Probing, |r| {
            get_audio_duration(&r.runner, &r.config.settings.ffprobe_path, &paths.audio)
        })?;

        let timing = self.run_stage(PipelineStage::ComputingTiming, |_| {
            TimingPlan::compute(audio_seconds, manifest.len())
        })?;
        info!(
            "每張圖片 {} 秒，共 {} 秒（與音訊相差 {} 秒）",
            timing.per_image_seconds,
            timing.displayed_seconds(),
            timing.drift_seconds()
        );

        self.run_stage(PipelineStage::EncodingImages, |r| {
            r.encode_images(&paths, &timing, &mut guard)
        })?;

        self.run_stage(PipelineStage::MergingAudio, |r| {
            r.merge_audio(&paths, &timing, &mut guard)
        })?;
        guard.release(&paths.output);

        self.run_stage(PipelineStage::CleaningUp, |_| {
            cleanup_intermediate(&paths.intermediate)
        })?;
        guard.release(&paths.intermediate);

        self.state = PipelineState::Done;
        println!(
            "{}",
            style(format!("已產生影片: {}", paths.output.display())).green()
        );

        Ok(RenderReport {
            image_count: manifest.len(),
            timing,
            manifest_path: paths.manifest,
            output_path: paths.output,
        })
    }

    fn run_stage<T, F>(&mut self, stage: PipelineStage, f: F) -> Result<T, PipelineError>
    where
        F: FnOnce(&Self) -> RenderResult<T>,
    {
        self.state = PipelineState::Running(stage);
        println!("{}", style(format!("[{stage}]")).dim());

        let result = if self.runner.is_shutdown_requested() {
            Err(RenderError::Cancelled)
        } else {
            f(&*self)
        };

        result.map_err(|source| {
            self.state = PipelineState::Failed(stage);
            error!("[{stage}] 失敗: {source}");
            PipelineError { stage, source }
        })
    }

    fn enumerate(&self, paths: &RenderPaths) -> RenderResult<ImageManifest> {
        let manifest = enumerate_images(&paths.images_dir, &paths.manifest, &self.config.settings)?;
        info!("找到 {} 張圖片", manifest.len());
        Ok(manifest)
    }

    /// 暫存影片在 ffmpeg 啟動前才交給 guard，先前執行留下的檔案不受影響
    fn encode_images(
        &self,
        paths: &RenderPaths,
        timing: &TimingPlan,
        guard: &mut ArtifactGuard,
    ) -> RenderResult<()> {
        let command = self.ffmpeg.image_sequence(
            &paths.manifest,
            timing.per_image_seconds,
            &paths.intermediate,
        )?;

        let bar = stage_progress_bar(
            progress_total_ms(timing.displayed_seconds()),
            "圖片序列轉影片中...",
        );
        guard.track(&paths.intermediate);
        let result = self.runner.run_with_progress(command, Some(&bar));
        bar.finish_and_clear();

        result.map_err(|source| RenderError::Encode {
            pass: EncodePass::ImageSequence,
            source,
        })?;
        info!("已產生暫存影片: {}", paths.intermediate.display());
        Ok(())
    }

    fn merge_audio(
        &self,
        paths: &RenderPaths,
        timing: &TimingPlan,
        guard: &mut ArtifactGuard,
    ) -> RenderResult<()> {
        let command = self
            .ffmpeg
            .merge_audio(&paths.intermediate, &paths.audio, &paths.output);

        let bar = stage_progress_bar(progress_total_ms(timing.audio_seconds), "合併音訊中...");
        guard.track(&paths.output);
        let result = self.runner.run_with_progress(command, Some(&bar));
        bar.finish_and_clear();

        result.map_err(|source| RenderError::Encode {
            pass: EncodePass::AudioMerge,
            source,
        })?;
        info!("已合併音訊: {}", paths.output.display());
        Ok(())
    }
}

fn cleanup_intermediate(path: &Path) -> RenderResult<()> {
    match remove_file_if_exists(path) {
        Ok(true) => {
            info!("已刪除暫存影片: {}", path.display());
            Ok(())
        }
        Ok(false) => {
            warn!("暫存影片已不存在: {}", path.display());
            Ok(())
        }
        Err(source) => Err(RenderError::Cleanup {
            path: path.to_path_buf(),
            source,
        }),
    }
}

const fn progress_total_ms(seconds: u64) -> u64 {
    seconds.saturating_mul(1000)
}

fn stage_progress_bar(total_ms: u64, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(total_ms);
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
    {
        bar.set_style(bar_style.progress_chars("#>-"));
    }
    bar.set_message(message);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSettings;
    use std::fs;
    use tempfile::TempDir;

    fn renderer_for(root: &Path) -> SlideshowRenderer {
        let config = Config::with_settings(root, RenderSettings::default());
        SlideshowRenderer::new(config, Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn test_missing_images_directory_fails_while_enumerating() {
        let temp_dir = TempDir::new().unwrap();
        let mut renderer = renderer_for(temp_dir.path());

        let err = renderer.run().unwrap_err();

        assert_eq!(err.stage, PipelineStage::Enumerating);
        assert!(matches!(err.source, RenderError::Traversal { .. }));
        assert_eq!(
            renderer.state(),
            PipelineState::Failed(PipelineStage::Enumerating)
        );
    }

    #[test]
    fn test_missing_audio_fails_while_probing() {
        let temp_dir = TempDir::new().unwrap();
        let images = temp_dir.path().join("assets/images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("1.jpg"), "jpeg").unwrap();
        let mut renderer = renderer_for(temp_dir.path());

        let err = renderer.run().unwrap_err();

        assert_eq!(err.stage, PipelineStage::Probing);
        assert!(matches!(err.source, RenderError::Probe { .. }));
        assert!(temp_dir.path().join("images.txt").exists());
        assert!(!temp_dir.path().join("temp_output.mp4").exists());
        assert!(!temp_dir.path().join("output.mp4").exists());
    }

    #[test]
    fn test_shutdown_before_start_is_cancelled() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::with_settings(temp_dir.path(), RenderSettings::default());
        let mut renderer = SlideshowRenderer::new(config, Arc::new(AtomicBool::new(true)));

        let err = renderer.run().unwrap_err();

        assert_eq!(err.stage, PipelineStage::Enumerating);
        assert!(matches!(err.source, RenderError::Cancelled));
        assert!(!temp_dir.path().join("images.txt").exists());
    }

    #[test]
    fn test_pipeline_error_names_stage() {
        let err = PipelineError {
            stage: PipelineStage::ComputingTiming,
            source: RenderError::degenerate("找不到任何圖片"),
        };
        assert!(err.to_string().starts_with("[計算圖片時長]"));
    }

    #[test]
    fn test_progress_total_saturates() {
        assert_eq!(progress_total_ms(9), 9_000);
        assert_eq!(progress_total_ms(20_000_000_000_000_000), u64::MAX);
    }

    #[test]
    fn test_cancelled_run_keeps_previous_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let previous_output = temp_dir.path().join("output.mp4");
        let previous_temp = temp_dir.path().join("temp_output.mp4");
        fs::write(&previous_output, "earlier render").unwrap();
        fs::write(&previous_temp, "earlier temp").unwrap();
        let config = Config::with_settings(temp_dir.path(), RenderSettings::default());
        let mut renderer = SlideshowRenderer::new(config, Arc::new(AtomicBool::new(true)));

        assert!(renderer.run().is_err());

        assert!(previous_output.exists());
        assert!(previous_temp.exists());
    }

    #[test]
    fn test_cleanup_tolerates_absent_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(cleanup_intermediate(&temp_dir.path().join("temp_output.mp4")).is_ok());
    }

    #[test]
    fn test_cleanup_of_directory_is_cleanup_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = cleanup_intermediate(temp_dir.path());
        assert!(matches!(result, Err(RenderError::Cleanup { .. })));
    }
}

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const IMAGES_DIR: &str = "assets/images";
pub const AUDIO_FILE: &str = "assets/audio.mp3";
pub const MANIFEST_FILE: &str = "images.txt";
pub const INTERMEDIATE_FILE: &str = "temp_output.mp4";
pub const OUTPUT_FILE: &str = "output.mp4";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// 帶點號的副檔名，例如 ".jpg"
    pub image_extensions: Vec<String>,
    pub output_frame_rate: u32,
    pub video_codec: String,
    /// 外部程序的執行期限（秒），未設定表示不限時
    pub process_timeout_secs: Option<u64>,
    /// 失敗時保留未完成的影片檔
    pub keep_partial_artifacts: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            image_extensions: vec![".jpg".to_string()],
            output_frame_rate: 30,
            video_codec: "libx264".to_string(),
            process_timeout_secs: None,
            keep_partial_artifacts: false,
        }
    }
}

impl RenderSettings {
    #[must_use]
    pub fn process_timeout(&self) -> Option<Duration> {
        self.process_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let wanted = format!(".{}", ext.to_lowercase());
                self.image_extensions
                    .iter()
                    .any(|candidate| candidate.to_lowercase() == wanted)
            })
    }
}

/// 一次執行所使用的固定檔案配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPaths {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub audio: PathBuf,
    pub manifest: PathBuf,
    pub intermediate: PathBuf,
    pub output: PathBuf,
}

impl RenderPaths {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            images_dir: root.join(IMAGES_DIR),
            audio: root.join(AUDIO_FILE),
            manifest: root.join(MANIFEST_FILE),
            intermediate: root.join(INTERMEDIATE_FILE),
            output: root.join(OUTPUT_FILE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: RenderSettings,
    pub paths: RenderPaths,
}

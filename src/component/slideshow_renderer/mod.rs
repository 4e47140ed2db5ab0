//! 圖片與音訊合成影片元件
//!
//! 將圖片資料夾依音訊長度平均分配時間，透過 ffmpeg 兩次編碼產生影片

mod artifact_guard;
mod ffmpeg_command;
mod main;
mod timing;

pub use artifact_guard::ArtifactGuard;
pub use ffmpeg_command::FfmpegCommand;
pub use main::{PipelineError, PipelineStage, PipelineState, RenderReport, SlideshowRenderer};
pub use timing::TimingPlan;

use crate::config::RenderSettings;
use crate::error::{RenderError, RenderResult};
use std::path::Path;
use std::process::Command;

/// 組出兩次 ffmpeg 編碼的指令
pub struct FfmpegCommand {
    program: String,
    output_frame_rate: u32,
    video_codec: String,
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            program: settings.ffmpeg_path.clone(),
            output_frame_rate: settings.output_frame_rate,
            video_codec: settings.video_codec.clone(),
        }
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "-hide_banner",
            "-nostdin",
            "-loglevel", "error",
            "-progress", "pipe:1",
            "-nostats",
            "-y",
        ]);
        cmd
    }

    /// 第一次編碼：圖片清單轉為無聲影片，每張圖片停留 `per_image_seconds` 秒
    pub fn image_sequence(
        &self,
        manifest_path: &Path,
        per_image_seconds: u64,
        output_path: &Path,
    ) -> RenderResult<Command> {
        if per_image_seconds == 0 {
            return Err(RenderError::configuration(
                "每張圖片的顯示時間為 0 秒，音訊長度短於圖片數量",
            ));
        }
        if self.output_frame_rate == 0 {
            return Err(RenderError::configuration("輸出幀率必須大於 0"));
        }

        let mut cmd = self.base_command();
        cmd.args(["-safe", "0"])
            .arg("-r")
            .arg(format!("1/{per_image_seconds}"))
            .args(["-f", "concat"])
            .arg("-i")
            .arg(manifest_path)
            .arg("-c:v")
            .arg(&self.video_codec)
            .arg("-r")
            .arg(self.output_frame_rate.to_string())
            .arg(output_path);

        Ok(cmd)
    }

    /// 第二次編碼：無聲影片加上原始音訊，交由 ffmpeg 預設行為處理串流
    #[must_use]
    pub fn merge_audio(&self, video_path: &Path, audio_path: &Path, output_path: &Path) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("-i")
            .arg(video_path)
            .arg("-i")
            .arg(audio_path)
            .arg(output_path);
        cmd
    }
}

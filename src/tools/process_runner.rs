use indicatif::ProgressBar;
use log::{debug, warn};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("無法啟動 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("無法檢查 {program} 的程序狀態: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} 執行失敗 ({status}): {stderr}")]
    NonZeroExit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{program} 超過 {} 秒未結束，已強制終止", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} 因中斷信號被終止")]
    Cancelled { program: String },
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// 以阻塞方式執行外部程序，並在等待期間檢查期限與中斷信號
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    shutdown_signal: Arc<AtomicBool>,
}

impl ProcessRunner {
    #[must_use]
    pub const fn new(timeout: Option<Duration>, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            timeout,
            shutdown_signal,
        }
    }

    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }

    pub fn run(&self, command: Command) -> Result<ProcessOutput, ProcessError> {
        self.run_with_progress(command, None)
    }

    /// 執行程序；若提供進度條，會從 stdout 的 `-progress` 輸出更新位置（毫秒）
    pub fn run_with_progress(
        &self,
        mut command: Command,
        progress: Option<&ProgressBar>,
    ) -> Result<ProcessOutput, ProcessError> {
        let program = command.get_program().to_string_lossy().into_owned();
        debug!("執行外部程序: {command:?}");

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout_reader = spawn_stdout_reader(&mut child, progress.cloned());
        let stderr_reader = spawn_stderr_reader(&mut child);

        let status = match self.wait_for_exit(&mut child, &program) {
            Ok(status) => status,
            Err(e) => {
                // 讀取執行緒在管線關閉後自行結束，不等待
                terminate(&mut child);
                return Err(e);
            }
        };

        let output = ProcessOutput {
            stdout: join_reader(stdout_reader),
            stderr: join_reader(stderr_reader),
        };

        if !status.success() {
            return Err(ProcessError::NonZeroExit {
                program,
                status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }

    fn wait_for_exit(&self, child: &mut Child, program: &str) -> Result<ExitStatus, ProcessError> {
        let started = Instant::now();

        loop {
            if self.is_shutdown_requested() {
                warn!("收到中斷信號，終止 {program} [{}]", child.id());
                return Err(ProcessError::Cancelled {
                    program: program.to_string(),
                });
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    warn!("{program} [{}] 執行逾時，強制終止", child.id());
                    return Err(ProcessError::TimedOut {
                        program: program.to_string(),
                        timeout,
                    });
                }
            }

            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    return Err(ProcessError::Wait {
                        program: program.to_string(),
                        source,
                    });
                }
            }
        }
    }
}

fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_stdout_reader(
    child: &mut Child,
    progress: Option<ProgressBar>,
) -> Option<JoinHandle<String>> {
    let stdout = child.stdout.take()?;
    Some(thread::spawn(move || {
        let mut reader = BufReader::new(stdout);
        let mut collected = String::new();
        let mut line = String::new();

        while let Ok(bytes) = reader.read_line(&mut line) {
            if bytes == 0 {
                break;
            }
            if let (Some(bar), Some(ms)) = (progress.as_ref(), parse_progress_ms(line.trim())) {
                bar.set_position(ms);
            }
            collected.push_str(&line);
            line.clear();
        }

        collected
    }))
}

fn spawn_stderr_reader(child: &mut Child) -> Option<JoinHandle<String>> {
    let mut stderr = child.stderr.take()?;
    Some(thread::spawn(move || {
        let mut collected = String::new();
        let _ = stderr.read_to_string(&mut collected);
        collected
    }))
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// 解析 ffmpeg `-progress` 的一行，回傳已輸出的毫秒數
///
/// `out_time_ms` 與 `out_time_us` 的單位其實都是微秒。
fn parse_progress_ms(line: &str) -> Option<u64> {
    let (key, value) = line.split_once('=')?;
    match key {
        "out_time_ms" | "out_time_us" => value.trim().parse::<u64>().ok().map(|us| us / 1000),
        "out_time" => parse_clock_ms(value.trim()),
        _ => None,
    }
}

/// 解析 `HH:MM:SS.frac`，小數部分補齊或截成 6 位微秒
fn parse_clock_ms(raw: &str) -> Option<u64> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let h = parts[0].parse::<u64>().ok()?;
    let m = parts[1].parse::<u64>().ok()?;
    let (s, frac) = match parts[2].split_once('.') {
        Some((sec, frac)) => {
            let digits: String = frac.chars().take(6).collect();
            let micros = format!("{digits:0<6}").parse::<u64>().unwrap_or(0);
            (sec.parse::<u64>().ok()?, micros)
        }
        None => (parts[2].parse::<u64>().ok()?, 0),
    };
    Some((h * 3600 + m * 60 + s) * 1000 + frac / 1000)
}

//! 手部关键点检测器接入
//!
//! 检测器是一个外部进程（自带相机采集），启动后先输出一行 READY，
//! 随后每处理一帧输出一行 JSON：
//! `{"width": 640, "hands": [{"landmarks": [{"x": 0.1, "y": 0.2}, ...]}]}`

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread;

use anyhow::{Context, Result};
use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::domain::landmark::HandFrame;

/// 检测器子进程
pub struct DetectorProcess {
    process: Child,
    stdout_reader: BufReader<ChildStdout>,
}

impl DetectorProcess {
    /// 按配置的命令启动检测器并等待就绪信号
    pub fn new(command: &[String]) -> Result<Self> {
        if command.is_empty() {
            anyhow::bail!("tracking.command is not configured");
        }

        info!("Starting hand detector: {}", command.join(" "));

        let mut process = Command::new(&command[0])
            .args(&command[1..])
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to start hand detector: {}", command[0]))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to take detector stdout"))?;
        let mut stdout_reader = BufReader::new(stdout);

        // 等待 READY 信号
        let mut ready_line = String::new();
        stdout_reader.read_line(&mut ready_line)?;
        if ready_line.trim() != "READY" {
            anyhow::bail!("Hand detector did not signal ready, got: {}", ready_line);
        }

        info!("Hand detector ready");

        Ok(Self {
            process,
            stdout_reader,
        })
    }

    /// 读取下一帧
    ///
    /// 无法解析的行记录后跳过；检测器退出时返回 None
    pub fn next_frame(&mut self) -> Result<Option<HandFrame>> {
        loop {
            let mut line = String::new();
            let n = self.stdout_reader.read_line(&mut line)?;
            if n == 0 {
                return Ok(None);
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<HandFrame>(line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => warn!("Skipping malformed detector line: {}", e),
            }
        }
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        // 随检测器一起退出
        let _ = self.process.kill();
    }
}

/// 在阻塞线程中读取检测器输出并推入通道
///
/// 接收端关闭或检测器退出时线程结束
pub fn spawn_frame_reader(
    mut detector: DetectorProcess,
    tx: mpsc::Sender<HandFrame>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        match detector.next_frame() {
            Ok(Some(frame)) => {
                if tx.blocking_send(frame).is_err() {
                    break;
                }
            }
            Ok(None) => {
                warn!("Hand detector exited");
                break;
            }
            Err(e) => {
                error!("Failed to read detector output: {}", e);
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_detector_handshake_and_frames() {
        let command = sh(
            r#"echo READY; \
               echo '{"width": 640, "hands": [{"landmarks": [{"x": 0.1, "y": 0.2}]}]}'; \
               echo 'garbage line'; \
               echo '{"width": 640, "hands": []}'"#,
        );
        let mut detector = DetectorProcess::new(&command).unwrap();

        let frame = detector.next_frame().unwrap().unwrap();
        assert_eq!(frame.width, 640);
        assert_eq!(frame.hands.len(), 1);

        // 坏行被跳过，直接读到下一帧
        let frame = detector.next_frame().unwrap().unwrap();
        assert!(frame.hands.is_empty());

        // 进程退出
        assert!(detector.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_detector_without_ready_signal_fails() {
        let command = sh("echo NOT_READY");
        assert!(DetectorProcess::new(&command).is_err());
    }

    #[test]
    fn test_empty_command_fails() {
        assert!(DetectorProcess::new(&[]).is_err());
    }

    #[tokio::test]
    async fn test_frame_reader_feeds_channel() {
        let command = sh(r#"echo READY; echo '{"width": 320, "hands": []}'"#);
        let detector = DetectorProcess::new(&command).unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn_frame_reader(detector, tx);

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.width, 320);

        // 检测器退出后通道关闭
        assert!(rx.recv().await.is_none());
        handle.join().unwrap();
    }
}

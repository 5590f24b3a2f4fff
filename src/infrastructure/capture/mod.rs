//! 屏幕截图
//!
//! 截图本身交给外部命令完成；这里负责把产物缩放并重编码为 JPEG，
//! 控制上线传输的负载体积。

use std::io::Cursor;
use std::process::Command;
use std::{env, fs};

use anyhow::{Context, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use log::info;

use crate::config::setting::CaptureSetting;

/// 一次抓屏的结果
#[derive(Debug, Clone)]
pub struct Capture {
    pub bytes: Bytes,
    pub content_type: String,
}

/// 抓屏来源
pub trait CaptureSource: Send {
    fn capture(&mut self) -> Result<Capture>;
}

/// 调用外部截图命令的抓屏实现
///
/// 命令中的 "{output}" 会被替换为临时输出文件路径
pub struct CommandCapture {
    command: Vec<String>,
    max_width: u32,
    max_height: u32,
    jpeg_quality: u8,
}

impl CommandCapture {
    pub fn from_setting(setting: &CaptureSetting) -> Result<Self> {
        if setting.command.is_empty() {
            anyhow::bail!("capture.command is not configured for this platform");
        }
        Ok(Self {
            command: setting.command.clone(),
            max_width: setting.max_width,
            max_height: setting.max_height,
            jpeg_quality: setting.jpeg_quality,
        })
    }
}

impl CaptureSource for CommandCapture {
    fn capture(&mut self) -> Result<Capture> {
        let output_path =
            env::temp_dir().join(format!("pinchdrop-{:08x}.png", rand::random::<u32>()));
        let output_str = output_path.to_string_lossy();

        let program = &self.command[0];
        let args: Vec<String> = self.command[1..]
            .iter()
            .map(|arg| arg.replace("{output}", &output_str))
            .collect();

        let status = Command::new(program)
            .args(&args)
            .status()
            .with_context(|| format!("Failed to run capture command: {}", program))?;
        if !status.success() {
            anyhow::bail!("Capture command exited with {}", status);
        }

        let raw = fs::read(&output_path)
            .with_context(|| format!("Capture command produced no file: {:?}", output_path))?;
        let _ = fs::remove_file(&output_path);

        let encoded = encode_capture(&raw, self.max_width, self.max_height, self.jpeg_quality)?;
        info!("Encoded capture size: {:.2} KB", encoded.len() as f64 / 1024.0);

        Ok(Capture {
            bytes: Bytes::from(encoded),
            content_type: "image".to_string(),
        })
    }
}

/// 缩放并重编码为 JPEG
///
/// 超出边界的图像按比例缩小到 max_width x max_height 以内
pub fn encode_capture(raw: &[u8], max_width: u32, max_height: u32, quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(raw).with_context(|| "Failed to decode captured image")?;

    let img = if img.width() > max_width || img.height() > max_height {
        img.thumbnail(max_width, max_height)
    } else {
        img
    };

    let mut out = Vec::new();
    let mut cursor = Cursor::new(&mut out);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    // JPEG 不带 alpha 通道
    img.to_rgb8()
        .write_with_encoder(encoder)
        .with_context(|| "Failed to encode capture as JPEG")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([128, 64, 32]),
        ));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_encode_shrinks_oversized_capture() {
        let raw = png_bytes(2560, 1440);
        let encoded = encode_capture(&raw, 1280, 720, 70).unwrap();

        // JPEG 魔数
        assert_eq!(&encoded[..2], &[0xFF, 0xD8]);

        let result = image::load_from_memory(&encoded).unwrap();
        assert!(result.width() <= 1280);
        assert!(result.height() <= 720);
    }

    #[test]
    fn test_encode_keeps_small_capture_dimensions() {
        let raw = png_bytes(320, 200);
        let encoded = encode_capture(&raw, 1280, 720, 70).unwrap();

        let result = image::load_from_memory(&encoded).unwrap();
        assert_eq!(result.width(), 320);
        assert_eq!(result.height(), 200);
    }

    #[test]
    fn test_encode_rejects_garbage() {
        assert!(encode_capture(b"not an image", 1280, 720, 70).is_err());
    }

    #[test]
    fn test_from_setting_rejects_empty_command() {
        let setting = CaptureSetting {
            command: Vec::new(),
            max_width: 1280,
            max_height: 720,
            jpeg_quality: 70,
        };
        assert!(CommandCapture::from_setting(&setting).is_err());
    }
}

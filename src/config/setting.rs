use super::utils::get_setting_path;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

// 全局设置实例
pub static SETTING: Lazy<RwLock<Setting>> = Lazy::new(|| RwLock::new(Setting::default()));

// 网络设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSetting {
    // 服务端监听端口
    pub webserver_port: u16,
    // 客户端连接的服务端地址
    pub server_url: String,
}

// 手势设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureSetting {
    // 捏合触发距离（像素）
    pub grab_threshold: f64,
    // 张开释放距离（像素），必须大于捏合距离
    pub drop_threshold: f64,
    // 两次动作之间的最小间隔（毫秒）
    pub cooldown_ms: u64,
}

// 截图设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSetting {
    // 截图命令，"{output}" 会被替换为输出文件路径
    pub command: Vec<String>,
    // 重编码的最大宽度
    pub max_width: u32,
    // 重编码的最大高度
    pub max_height: u32,
    // JPEG 质量 (1-100)
    pub jpeg_quality: u8,
}

// 手部检测设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSetting {
    // 检测器进程启动命令，按行输出 JSON 帧
    pub command: Vec<String>,
}

// 主设置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub network: NetworkSetting,
    pub gesture: GestureSetting,
    pub capture: CaptureSetting,
    pub tracking: TrackingSetting,
}

fn default_capture_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec![
            "screencapture".to_string(),
            "-x".to_string(),
            "{output}".to_string(),
        ]
    } else if cfg!(target_os = "linux") {
        vec!["grim".to_string(), "{output}".to_string()]
    } else {
        // 其他平台需要用户自行配置截图命令
        Vec::new()
    }
}

impl Setting {
    /// 获取当前设置的克隆
    pub fn get_instance() -> Self {
        SETTING.read().unwrap().clone()
    }

    /// 创建默认设置
    pub fn default() -> Self {
        Self {
            network: NetworkSetting {
                webserver_port: 5000,
                server_url: "ws://localhost:5000/ws".to_string(),
            },
            gesture: GestureSetting {
                grab_threshold: 40.0,
                drop_threshold: 120.0,
                cooldown_ms: 2000,
            },
            capture: CaptureSetting {
                command: default_capture_command(),
                max_width: 1280,
                max_height: 720,
                jpeg_quality: 70,
            },
            tracking: TrackingSetting {
                command: vec!["python3".to_string(), "hand_stream.py".to_string()],
            },
        }
    }

    /// 加载设置
    ///
    /// 如果指定了设置文件路径，则从该路径加载设置
    /// 否则从默认配置目录加载设置
    pub fn load(setting_path: Option<PathBuf>) -> Result<Self> {
        let _setting_path = if let Some(path) = setting_path {
            path
        } else {
            get_setting_path()?
        };

        if let Some(setting_str) = fs::read_to_string(&_setting_path).ok() {
            let setting: Setting =
                serde_json::from_str(&setting_str).with_context(|| "无法解析设置文件")?;

            // 更新全局设置
            SETTING.write().unwrap().clone_from(&setting);

            Ok(setting)
        } else {
            // 如果设置文件不存在，则创建默认设置并保存
            let default_setting = Setting::default();
            default_setting.save(Some(_setting_path))?;
            Ok(default_setting)
        }
    }

    /// 保存设置
    ///
    /// 如果指定了设置文件路径，则保存到该路径
    /// 否则保存到默认配置目录
    pub fn save(&self, setting_path: Option<PathBuf>) -> Result<()> {
        let _setting_path = if let Some(path) = setting_path {
            path
        } else {
            get_setting_path()?
        };

        // 确保目录存在
        if let Some(parent) = _setting_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // 将设置序列化为 JSON 格式
        let setting_str = serde_json::to_string_pretty(self)?;

        // 写入文件
        fs::write(&_setting_path, setting_str)
            .with_context(|| format!("无法写入设置文件: {:?}", _setting_path))?;
        // 更新全局设置
        SETTING.write().unwrap().clone_from(self);

        Ok(())
    }
}

//! 手部关键点数据
//!
//! 关键点由外部检测器产生，坐标归一化到 [0,1]。
//! 索引遵循 MediaPipe 手部模型约定。

use serde::Deserialize;

/// 拇指指尖关键点索引
pub const THUMB_TIP: usize = 4;
/// 食指指尖关键点索引
pub const INDEX_TIP: usize = 8;

/// 归一化的 2D 关键点坐标
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// 单只手的关键点集合
#[derive(Debug, Clone, Deserialize)]
pub struct Hand {
    pub landmarks: Vec<Point>,
}

impl Hand {
    /// 取拇指指尖与食指指尖，关键点不足时返回 None
    pub fn pinch_points(&self) -> Option<(Point, Point)> {
        let thumb = self.landmarks.get(THUMB_TIP)?;
        let index = self.landmarks.get(INDEX_TIP)?;
        Some((*thumb, *index))
    }
}

/// 检测器输出的一帧结果
#[derive(Debug, Clone, Deserialize)]
pub struct HandFrame {
    /// 相机帧宽度（像素）
    pub width: u32,
    /// 检测到的手，可能为空
    #[serde(default)]
    pub hands: Vec<Hand>,
}

impl HandFrame {
    /// 只评估第一只检测到的手
    pub fn first_hand(&self) -> Option<&Hand> {
        self.hands.first()
    }
}

/// 捏合距离：归一化空间的欧氏距离按帧宽度缩放到像素空间
///
/// NaN 坐标按原样传播，由调用方在阈值比较前过滤
pub fn pinch_distance(p1: Point, p2: Point, frame_width: u32) -> f64 {
    (p2.x - p1.x).hypot(p2.y - p1.y) * frame_width as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinch_distance_scales_with_frame_width() {
        let p1 = Point { x: 0.0, y: 0.0 };
        let p2 = Point { x: 0.3, y: 0.4 };
        // 归一化距离 0.5，宽度 640 → 320 像素
        let d = pinch_distance(p1, p2, 640);
        assert!((d - 320.0).abs() < 1e-9);
    }

    #[test]
    fn test_pinch_distance_zero() {
        let p = Point { x: 0.5, y: 0.5 };
        assert_eq!(pinch_distance(p, p, 1280), 0.0);
    }

    #[test]
    fn test_pinch_distance_nan_propagates() {
        let p1 = Point {
            x: f64::NAN,
            y: 0.0,
        };
        let p2 = Point { x: 0.1, y: 0.1 };
        assert!(pinch_distance(p1, p2, 640).is_nan());
    }

    #[test]
    fn test_hand_pinch_points_missing_landmarks() {
        let hand = Hand {
            landmarks: vec![Point { x: 0.0, y: 0.0 }; 5],
        };
        // 只有 5 个关键点，缺少食指指尖（索引 8）
        assert!(hand.pinch_points().is_none());
    }

    #[test]
    fn test_frame_first_hand() {
        let frame = HandFrame {
            width: 640,
            hands: vec![],
        };
        assert!(frame.first_hand().is_none());
    }
}

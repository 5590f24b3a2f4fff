//! 手势状态机
//!
//! 把连续、含噪的指尖距离信号转换为离散的抓取/释放事件。
//! 两个阈值之间留有迟滞带，配合冷却时间抑制边界抖动。

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::setting::GestureSetting;
use crate::domain::gesture::{GestureState, PinchMeasurement};

/// 状态机输出的动作意图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// 捏合触发抓取
    Grab,
    /// 张开手释放（仅本地状态复位）
    Release,
}

/// 阈值与冷却参数
#[derive(Debug, Clone)]
pub struct GestureTuning {
    grab_threshold: f64,
    drop_threshold: f64,
    cooldown: Duration,
}

impl GestureTuning {
    /// 创建参数，校验迟滞带：捏合阈值必须小于释放阈值
    pub fn new(grab_threshold: f64, drop_threshold: f64, cooldown: Duration) -> Result<Self> {
        if !(grab_threshold < drop_threshold) {
            anyhow::bail!(
                "grab_threshold ({}) must be less than drop_threshold ({})",
                grab_threshold,
                drop_threshold
            );
        }
        Ok(Self {
            grab_threshold,
            drop_threshold,
            cooldown,
        })
    }

    pub fn from_setting(setting: &GestureSetting) -> Result<Self> {
        Self::new(
            setting.grab_threshold,
            setting.drop_threshold,
            Duration::from_millis(setting.cooldown_ms),
        )
    }
}

/// 手势状态机
///
/// 每帧调用一次 `evaluate`，每次最多产生一个转换。
/// `transfer_completed` 到达时由 `complete_transfer` 无条件复位。
pub struct GestureStateMachine {
    tuning: GestureTuning,
    state: GestureState,
    // 上一次成功转换的时刻，冷却计时的基准
    last_action_time: Option<Instant>,
}

impl GestureStateMachine {
    pub fn new(tuning: GestureTuning) -> Self {
        Self {
            tuning,
            state: GestureState::Idle,
            last_action_time: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// 用一帧测量值驱动状态机
    ///
    /// 返回本帧触发的动作；保持当前状态是默认行为。
    /// 没有检测到手的帧不会产生测量值，状态原样保持。
    pub fn evaluate(&mut self, measurement: PinchMeasurement) -> Option<GestureEvent> {
        // 检测器偶发的 NaN 不参与阈值比较
        if measurement.distance.is_nan() {
            return None;
        }

        match self.state {
            GestureState::Idle
                if measurement.distance < self.tuning.grab_threshold
                    && self.cooldown_elapsed(measurement.at) =>
            {
                self.state = GestureState::Holding;
                self.last_action_time = Some(measurement.at);
                Some(GestureEvent::Grab)
            }
            GestureState::Holding
                if measurement.distance > self.tuning.drop_threshold
                    && self.cooldown_elapsed(measurement.at) =>
            {
                self.state = GestureState::Idle;
                self.last_action_time = Some(measurement.at);
                Some(GestureEvent::Release)
            }
            _ => None,
        }
    }

    /// 服务端确认传输完成，无条件回到 Idle
    ///
    /// 这是服务端确认的事实而非含噪的传感读数，不受冷却约束。
    /// 返回状态是否发生了变化。
    pub fn complete_transfer(&mut self) -> bool {
        if self.state == GestureState::Holding {
            self.state = GestureState::Idle;
            true
        } else {
            false
        }
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.last_action_time {
            None => true,
            Some(t) => now.duration_since(t) > self.tuning.cooldown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(cooldown_ms: u64) -> GestureStateMachine {
        GestureStateMachine::new(
            GestureTuning::new(40.0, 120.0, Duration::from_millis(cooldown_ms)).unwrap(),
        )
    }

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_tuning_rejects_inverted_thresholds() {
        assert!(GestureTuning::new(120.0, 40.0, Duration::from_secs(2)).is_err());
        assert!(GestureTuning::new(40.0, 40.0, Duration::from_secs(2)).is_err());
        assert!(GestureTuning::new(40.0, 120.0, Duration::from_secs(2)).is_ok());
    }

    #[test]
    fn test_grab_then_release() {
        let mut sm = machine(100);
        let base = Instant::now();

        let ev = sm.evaluate(PinchMeasurement::new(10.0, at(base, 0)));
        assert_eq!(ev, Some(GestureEvent::Grab));
        assert_eq!(sm.state(), GestureState::Holding);

        let ev = sm.evaluate(PinchMeasurement::new(200.0, at(base, 500)));
        assert_eq!(ev, Some(GestureEvent::Release));
        assert_eq!(sm.state(), GestureState::Idle);
    }

    #[test]
    fn test_hysteresis_band_fires_nothing() {
        // 在两个阈值之间震荡的序列不触发任何转换
        let base = Instant::now();

        let mut sm = machine(0);
        for (i, d) in [50.0, 110.0, 60.0, 100.0, 41.0, 119.0].iter().enumerate() {
            let ev = sm.evaluate(PinchMeasurement::new(*d, at(base, i as u64 * 1000)));
            assert_eq!(ev, None);
            assert_eq!(sm.state(), GestureState::Idle);
        }

        // Holding 状态下同样保持
        let mut sm = machine(0);
        sm.evaluate(PinchMeasurement::new(10.0, base));
        assert_eq!(sm.state(), GestureState::Holding);
        for (i, d) in [50.0, 110.0, 60.0, 100.0].iter().enumerate() {
            let ev = sm.evaluate(PinchMeasurement::new(*d, at(base, 1000 + i as u64 * 1000)));
            assert_eq!(ev, None);
            assert_eq!(sm.state(), GestureState::Holding);
        }
    }

    #[test]
    fn test_cooldown_suppresses_second_transition() {
        let mut sm = machine(2000);
        let base = Instant::now();

        assert_eq!(
            sm.evaluate(PinchMeasurement::new(10.0, at(base, 0))),
            Some(GestureEvent::Grab)
        );
        // 冷却期内的释放被抑制
        assert_eq!(sm.evaluate(PinchMeasurement::new(200.0, at(base, 1000))), None);
        assert_eq!(sm.state(), GestureState::Holding);
        // 冷却结束后才允许
        assert_eq!(
            sm.evaluate(PinchMeasurement::new(200.0, at(base, 2001))),
            Some(GestureEvent::Release)
        );
    }

    #[test]
    fn test_measurement_sequence_with_cooldown() {
        // 序列 [10, 10, 200]：首帧抓取，第二帧保持，第三帧冷却后释放
        let mut sm = machine(2000);
        let base = Instant::now();

        assert_eq!(
            sm.evaluate(PinchMeasurement::new(10.0, at(base, 0))),
            Some(GestureEvent::Grab)
        );
        assert_eq!(sm.evaluate(PinchMeasurement::new(10.0, at(base, 100))), None);
        assert_eq!(sm.state(), GestureState::Holding);
        assert_eq!(
            sm.evaluate(PinchMeasurement::new(200.0, at(base, 2500))),
            Some(GestureEvent::Release)
        );
        assert_eq!(sm.state(), GestureState::Idle);
    }

    #[test]
    fn test_complete_transfer_forces_idle_without_cooldown() {
        let mut sm = machine(60_000);
        let base = Instant::now();

        sm.evaluate(PinchMeasurement::new(10.0, base));
        assert_eq!(sm.state(), GestureState::Holding);

        // 冷却远未结束，服务端确认仍然立即复位
        assert!(sm.complete_transfer());
        assert_eq!(sm.state(), GestureState::Idle);

        // Idle 状态下的确认是空操作
        assert!(!sm.complete_transfer());
        assert_eq!(sm.state(), GestureState::Idle);
    }

    #[test]
    fn test_nan_distance_fires_nothing() {
        let mut sm = machine(0);
        let base = Instant::now();

        assert_eq!(sm.evaluate(PinchMeasurement::new(f64::NAN, base)), None);
        assert_eq!(sm.state(), GestureState::Idle);
    }

    #[test]
    fn test_first_grab_needs_no_prior_action() {
        // 启动后第一次捏合不受冷却限制
        let mut sm = machine(60_000);
        assert_eq!(
            sm.evaluate(PinchMeasurement::new(5.0, Instant::now())),
            Some(GestureEvent::Grab)
        );
    }
}

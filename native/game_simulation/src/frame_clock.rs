//! Path: native/game_simulation/src/frame_clock.rs
//! Summary: フレーム dt の平滑化（EMA）と固定／可変ティックの計画

use crate::config::{TimestepConfig, TimestepMode};

/// 浮動小数点の積み残しで 1 ティック落とさないための余裕
const TICK_EPSILON: f32 = 1e-6;

/// 1 フレームで実行するティック数と 1 ティックの dt（秒）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickPlan {
    pub ticks: u32,
    pub dt:    f32,
}

pub struct FrameClock {
    config:      TimestepConfig,
    smoothed_dt: Option<f32>,
    accumulator: f32,
}

impl FrameClock {
    pub fn new(config: TimestepConfig) -> Self {
        Self { config, smoothed_dt: None, accumulator: 0.0 }
    }

    pub fn smoothed_dt(&self) -> f32 {
        self.smoothed_dt.unwrap_or(0.0)
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// 描画補間用。固定モードは積み残し / tick、可変モードは常に 1.0
    pub fn alpha(&self) -> f32 {
        match self.config.mode {
            TimestepMode::Fixed => (self.accumulator / self.config.tick_secs.max(1e-4)).clamp(0.0, 1.0),
            TimestepMode::Variable => 1.0,
        }
    }

    fn smooth(&mut self, raw_dt: f32) -> f32 {
        let raw = if raw_dt.is_finite() { raw_dt.clamp(0.0, self.config.max_frame_dt) } else { 0.0 };
        let alpha = self.config.smoothing.clamp(0.0, 1.0);
        // 最初のサンプルはそのまま採用
        let s = match self.smoothed_dt {
            None => raw,
            Some(prev) => prev + alpha * (raw - prev),
        };
        let s = s.min(self.config.max_frame_dt);
        self.smoothed_dt = Some(s);
        s
    }

    pub fn advance(&mut self, raw_dt: f32) -> TickPlan {
        let dt = self.smooth(raw_dt);
        match self.config.mode {
            TimestepMode::Variable => TickPlan { ticks: u32::from(dt > 0.0), dt },
            TimestepMode::Fixed => {
                let tick = self.config.tick_secs.max(1e-4);
                self.accumulator += dt;
                let due = ((self.accumulator + TICK_EPSILON) / tick).floor() as u32;
                let ticks = due.min(self.config.max_ticks_per_frame);
                self.accumulator = (self.accumulator - ticks as f32 * tick).max(0.0);
                if due > ticks {
                    log::debug!("dropping {} backlog ticks", due - ticks);
                    self.accumulator = self.accumulator.min(tick - TICK_EPSILON).max(0.0);
                }
                TickPlan { ticks, dt: tick }
            }
        }
    }
}

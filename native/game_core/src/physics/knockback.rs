//! Path: native/game_core/src/physics/knockback.rs
//! Summary: ノックバック状態（継続時間とクールダウン）

use crate::constants::{KNOCKBACK_COOLDOWN, KNOCKBACK_DURATION};

/// 敵 1 体分のノックバック状態。
///
/// 有効中（`remaining > 0`）は通常移動を上書きする。終了時に速度を 0 にして
/// `cooldown` を開始するので、`cooldown > 0` の間は常に速度 0。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KnockbackState {
    pub vx:        f32,
    pub vy:        f32,
    pub remaining: f32,
    pub cooldown:  f32,
}

impl KnockbackState {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// 新しいインパルスを受け付けるか。`cooldown == 0` ちょうどは受け付ける。
    pub fn is_eligible(&self) -> bool {
        self.cooldown <= 0.0 && !self.is_active()
    }

    /// 攻撃元 → 敵 方向へ `magnitude` の速度を与える。受け付けなかったら false。
    pub fn try_apply(
        &mut self,
        source_x: f32, source_y: f32,
        target_x: f32, target_y: f32,
        magnitude: f32,
    ) -> bool {
        if magnitude <= 0.0 || !self.is_eligible() {
            return false;
        }
        let dx = target_x - source_x;
        let dy = target_y - source_y;
        let dist = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if dist > 1e-4 { (dx / dist, dy / dist) } else { (1.0, 0.0) };
        self.vx = nx * magnitude;
        self.vy = ny * magnitude;
        self.remaining = KNOCKBACK_DURATION;
        true
    }

    /// `dt` 進める。有効中なら今ティックの変位を返す。
    pub fn tick(&mut self, dt: f32) -> Option<(f32, f32)> {
        if self.is_active() {
            let step = dt.min(self.remaining);
            let disp = (self.vx * step, self.vy * step);
            self.remaining -= dt;
            if self.remaining <= 0.0 {
                self.remaining = 0.0;
                self.vx = 0.0;
                self.vy = 0.0;
                self.cooldown = KNOCKBACK_COOLDOWN;
            }
            Some(disp)
        } else {
            self.cooldown = (self.cooldown - dt).max(0.0);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_exactly_zero_is_eligible() {
        let mut kb = KnockbackState { cooldown: 0.0, ..Default::default() };
        assert!(kb.try_apply(0.0, 0.0, 10.0, 0.0, 300.0));
        assert!((kb.vx - 300.0).abs() < 1e-4);
    }

    #[test]
    fn positive_cooldown_refuses_and_keeps_zero_velocity() {
        let mut kb = KnockbackState { cooldown: 0.01, ..Default::default() };
        assert!(!kb.try_apply(0.0, 0.0, 10.0, 0.0, 300.0));
        assert_eq!(kb.vx, 0.0);
        assert_eq!(kb.vy, 0.0);
        assert!(!kb.is_active());
    }

    #[test]
    fn expiry_zeroes_velocity_and_starts_cooldown() {
        let mut kb = KnockbackState::default();
        kb.try_apply(0.0, 0.0, 0.0, 5.0, 100.0);
        let d = kb.tick(KNOCKBACK_DURATION + 0.05).unwrap_or_default();
        assert!((d.1 - 100.0 * KNOCKBACK_DURATION).abs() < 1e-4);
        assert!(!kb.is_active());
        assert_eq!((kb.vx, kb.vy), (0.0, 0.0));
        assert!((kb.cooldown - KNOCKBACK_COOLDOWN).abs() < 1e-6);
        // クールダウン明けまで拒否
        assert!(!kb.try_apply(0.0, 0.0, 0.0, 5.0, 100.0));
        kb.tick(KNOCKBACK_COOLDOWN);
        assert!(kb.is_eligible());
    }

    #[test]
    fn zero_distance_uses_unit_x() {
        let mut kb = KnockbackState::default();
        assert!(kb.try_apply(5.0, 5.0, 5.0, 5.0, 50.0));
        assert_eq!((kb.vx, kb.vy), (50.0, 0.0));
    }
}

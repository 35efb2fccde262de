//! Path: native/game_simulation/src/world/enemy_projectile.rs
//! Summary: 敵弾 SoA（EnemyProjectileWorld）。ボス弾はプレイヤーの攻撃で相殺されない。

use game_core::constants::{ENEMY_PROJECTILE_LIFETIME, ENEMY_PROJECTILE_RADIUS};

/// 敵弾 SoA（Structure of Arrays）
#[derive(Clone, Default)]
pub struct EnemyProjectileWorld {
    pub positions_x:  Vec<f32>,
    pub positions_y:  Vec<f32>,
    pub velocities_x: Vec<f32>,
    pub velocities_y: Vec<f32>,
    pub damage:       Vec<i32>,
    /// 残り寿命（秒）
    pub lifetime:     Vec<f32>,
    pub radius:       Vec<f32>,
    pub from_boss:    Vec<bool>,
    pub alive:        Vec<bool>,
    pub count:        usize,
    /// 空きスロットのインデックススタック（O(1) で取得・返却）
    free_list:        Vec<usize>,
}

impl EnemyProjectileWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn spawn(&mut self, x: f32, y: f32, vx: f32, vy: f32, damage: i32, from_boss: bool) -> usize {
        let i = if let Some(i) = self.free_list.pop() {
            self.positions_x[i]  = x;
            self.positions_y[i]  = y;
            self.velocities_x[i] = vx;
            self.velocities_y[i] = vy;
            self.damage[i]       = damage;
            self.lifetime[i]     = ENEMY_PROJECTILE_LIFETIME;
            self.radius[i]       = ENEMY_PROJECTILE_RADIUS;
            self.from_boss[i]    = from_boss;
            self.alive[i]        = true;
            i
        } else {
            self.positions_x.push(x);
            self.positions_y.push(y);
            self.velocities_x.push(vx);
            self.velocities_y.push(vy);
            self.damage.push(damage);
            self.lifetime.push(ENEMY_PROJECTILE_LIFETIME);
            self.radius.push(ENEMY_PROJECTILE_RADIUS);
            self.from_boss.push(from_boss);
            self.alive.push(true);
            self.len() - 1
        };
        self.count += 1;
        i
    }

    pub fn kill(&mut self, i: usize) {
        if self.alive[i] {
            self.alive[i] = false;
            self.count = self.count.saturating_sub(1);
            self.free_list.push(i);
        }
    }

    pub fn live_slots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.alive[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_kill_recycles_slot() {
        let mut w = EnemyProjectileWorld::new();
        let a = w.spawn(0.0, 0.0, 10.0, 0.0, 5, false);
        let b = w.spawn(0.0, 0.0, 10.0, 0.0, 5, true);
        w.kill(a);
        assert_eq!(w.count, 1);
        assert_eq!(w.live_slots(), vec![b]);
        let c = w.spawn(1.0, 1.0, 0.0, 0.0, 3, false);
        assert_eq!(c, a);
        assert!(!w.from_boss[c]);
        assert_eq!(w.lifetime[c], ENEMY_PROJECTILE_LIFETIME);
    }
}

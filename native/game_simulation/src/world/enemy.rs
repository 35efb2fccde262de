//! Path: native/game_simulation/src/world/enemy.rs
//! Summary: 敵 SoA（EnemyWorld）。スロットはフリーリストで再利用し、ヒット記録は uid で引く。

use game_core::enemy::{Behavior, Facing};
use game_core::entity_params::{DistanceBand, EnemyParams, ProjectileParams};
use game_core::physics::knockback::KnockbackState;

/// 敵 SoA（Structure of Arrays）
#[derive(Clone, Default)]
pub struct EnemyWorld {
    /// ラン内で一意（スロット再利用後も重複しない）
    pub uid:                Vec<u32>,
    pub archetype_id:       Vec<u16>,
    pub behavior:           Vec<Behavior>,
    pub is_boss:            Vec<bool>,
    pub positions_x:        Vec<f32>,
    pub positions_y:        Vec<f32>,
    pub hp:                 Vec<i32>,
    pub max_hp:             Vec<i32>,
    pub base_speed:         Vec<f32>,
    pub speed:              Vec<f32>,
    pub radius:             Vec<f32>,
    pub contact_damage:     Vec<i32>,
    pub attack_cooldown_ms: Vec<f64>,
    pub last_attack_ms:     Vec<Option<f64>>,
    pub avoidance:          Vec<f32>,
    pub exp_reward:         Vec<u32>,
    pub color:              Vec<[f32; 4]>,
    pub projectile:         Vec<Option<ProjectileParams>>,
    pub band:               Vec<Option<DistanceBand>>,
    pub facing:             Vec<Facing>,
    /// 被弾フラッシュ残り（秒）
    pub hit_flash:          Vec<f32>,
    pub knockback:          Vec<KnockbackState>,
    /// 出現時の経過秒（寿命カリング用）
    pub spawn_secs:         Vec<f32>,
    /// RushThrough の固定進行方向
    pub locked_dir:         Vec<Option<(f32, f32)>>,
    pub alive:              Vec<bool>,
    pub count:              usize,
    boss_count:             usize,
    /// これまでに出た最大半径（縮めない）。広域判定の余白に使う。
    widest_radius:          f32,
    next_uid:               u32,
    /// 空きスロットのインデックススタック（O(1) で取得・返却）
    free_list:              Vec<usize>,
}

impl EnemyWorld {
    pub fn new() -> Self {
        Self { next_uid: 1, ..Self::default() }
    }

    pub fn len(&self) -> usize {
        self.positions_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn boss_count(&self) -> usize {
        self.boss_count
    }

    /// 当たり判定候補を漏らさないための探索半径の上乗せ分
    pub fn widest_radius(&self) -> f32 {
        self.widest_radius
    }

    /// 人口上限の対象（ボスを除く）
    pub fn live_non_boss(&self) -> usize {
        self.count - self.boss_count
    }

    pub fn live_slots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.alive[i]).collect()
    }

    pub fn kill(&mut self, i: usize) {
        if self.alive[i] {
            self.alive[i] = false;
            self.count = self.count.saturating_sub(1);
            if self.is_boss[i] {
                self.boss_count = self.boss_count.saturating_sub(1);
            }
            self.free_list.push(i);
        }
    }

    /// `params` から 1 体生成してスロット番号を返す
    pub fn spawn(&mut self, params: &EnemyParams, is_boss: bool, x: f32, y: f32, now_secs: f32) -> usize {
        let uid = self.next_uid.max(1);
        self.next_uid = uid.wrapping_add(1);
        let max_hp = params.max_hp.max(1);

        let i = if let Some(i) = self.free_list.pop() {
            // O(1): フリーリストから再利用
            self.uid[i]                = uid;
            self.archetype_id[i]       = params.id;
            self.behavior[i]           = params.behavior;
            self.is_boss[i]            = is_boss;
            self.positions_x[i]        = x;
            self.positions_y[i]        = y;
            self.hp[i]                 = max_hp;
            self.max_hp[i]             = max_hp;
            self.base_speed[i]         = params.speed;
            self.speed[i]              = params.speed;
            self.radius[i]             = params.radius;
            self.contact_damage[i]     = params.contact_damage;
            self.attack_cooldown_ms[i] = params.attack_cooldown_ms as f64;
            self.last_attack_ms[i]     = None;
            self.avoidance[i]          = params.avoidance;
            self.exp_reward[i]         = params.exp_reward;
            self.color[i]              = params.color;
            self.projectile[i]         = params.projectile;
            self.band[i]               = params.band;
            self.facing[i]             = Facing::default();
            self.hit_flash[i]          = 0.0;
            self.knockback[i]          = KnockbackState::default();
            self.spawn_secs[i]         = now_secs;
            self.locked_dir[i]         = None;
            self.alive[i]              = true;
            i
        } else {
            self.uid.push(uid);
            self.archetype_id.push(params.id);
            self.behavior.push(params.behavior);
            self.is_boss.push(is_boss);
            self.positions_x.push(x);
            self.positions_y.push(y);
            self.hp.push(max_hp);
            self.max_hp.push(max_hp);
            self.base_speed.push(params.speed);
            self.speed.push(params.speed);
            self.radius.push(params.radius);
            self.contact_damage.push(params.contact_damage);
            self.attack_cooldown_ms.push(params.attack_cooldown_ms as f64);
            self.last_attack_ms.push(None);
            self.avoidance.push(params.avoidance);
            self.exp_reward.push(params.exp_reward);
            self.color.push(params.color);
            self.projectile.push(params.projectile);
            self.band.push(params.band);
            self.facing.push(Facing::default());
            self.hit_flash.push(0.0);
            self.knockback.push(KnockbackState::default());
            self.spawn_secs.push(now_secs);
            self.locked_dir.push(None);
            self.alive.push(true);
            self.len() - 1
        };
        self.count += 1;
        self.widest_radius = self.widest_radius.max(params.radius);
        if is_boss {
            self.boss_count += 1;
        }
        i
    }

    /// hp を減らす（0 未満にはしない）。0 になったら true。
    pub fn apply_damage(&mut self, i: usize, amount: i32) -> bool {
        self.hp[i] = (self.hp[i] - amount.max(0)).max(0);
        self.hp[i] == 0
    }

    pub fn hp_ratio(&self, i: usize) -> f32 {
        if self.max_hp[i] <= 0 {
            return 0.0;
        }
        (self.hp[i] as f32 / self.max_hp[i] as f32).clamp(0.0, 1.0)
    }

    pub fn slot_of_uid(&self, uid: u32) -> Option<usize> {
        (0..self.len()).find(|&i| self.alive[i] && self.uid[i] == uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn killed_slot_is_reused_with_fresh_uid() {
        let p = EnemyParams::fallback(1);
        let mut w = EnemyWorld::new();
        let a = w.spawn(&p, false, 0.0, 0.0, 0.0);
        let uid_a = w.uid[a];
        w.kill(a);
        assert_eq!(w.count, 0);
        let b = w.spawn(&p, false, 5.0, 5.0, 1.0);
        assert_eq!(a, b);
        assert_ne!(w.uid[b], uid_a);
        assert_eq!(w.hp[b], p.max_hp);
    }

    #[test]
    fn damage_never_goes_below_zero() {
        let p = EnemyParams::fallback(1);
        let mut w = EnemyWorld::new();
        let i = w.spawn(&p, false, 0.0, 0.0, 0.0);
        assert!(!w.apply_damage(i, 5));
        assert!(w.apply_damage(i, 1_000));
        assert_eq!(w.hp[i], 0);
        assert_eq!(w.hp_ratio(i), 0.0);
    }

    #[test]
    fn bosses_are_not_counted_against_the_cap() {
        let p = EnemyParams::fallback(101);
        let mut w = EnemyWorld::new();
        w.spawn(&p, true, 0.0, 0.0, 0.0);
        let n = w.spawn(&p, false, 0.0, 0.0, 0.0);
        assert_eq!(w.live_non_boss(), 1);
        assert_eq!(w.boss_count(), 1);
        w.kill(0);
        assert_eq!(w.boss_count(), 0);
        assert_eq!(w.slot_of_uid(w.uid[n]), Some(n));
    }

    #[test]
    fn widest_radius_survives_the_kill() {
        let small = EnemyParams { radius: 12.0, ..EnemyParams::fallback(1) };
        let huge = EnemyParams { radius: 100.0, ..EnemyParams::fallback(101) };
        let mut w = EnemyWorld::new();
        w.spawn(&small, false, 0.0, 0.0, 0.0);
        assert_eq!(w.widest_radius(), 12.0);
        let b = w.spawn(&huge, true, 0.0, 0.0, 0.0);
        w.kill(b);
        assert_eq!(w.widest_radius(), 100.0);
    }

    #[test]
    fn double_kill_is_harmless() {
        let p = EnemyParams::fallback(1);
        let mut w = EnemyWorld::new();
        let i = w.spawn(&p, false, 0.0, 0.0, 0.0);
        w.kill(i);
        w.kill(i);
        assert_eq!(w.count, 0);
        assert_eq!(w.spawn(&p, false, 0.0, 0.0, 0.0), i);
        assert_eq!(w.len(), 1);
    }
}

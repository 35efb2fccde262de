//! Path: native/game_core/src/weapon.rs
//! Summary: 武器種類・クールダウン・レベル補正・発射パターン（AttackInstance の生成）

use serde::{Deserialize, Serialize};

use crate::attack::{heading, AttackInstance, AttackMotion, HitPolicy, TIME_EPSILON_MS};
use crate::constants::{MAX_WEAPON_LEVEL, PLAYER_RADIUS, WEAPON_SEARCH_RADIUS};
use crate::enemy::Facing;
use crate::physics::rng::SimpleRng;

// ─── WeaponKind ───────────────────────────────────────────────
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// 向いている方向への薙ぎ払い（Lv4 以上で逆方向にも遅れて出る）
    Whip,
    /// 自分中心のオーラ（一定間隔で再ヒット・回復）
    Garlic,
    /// 最寄りの敵に向けて直進、命中で消える
    MagicWand,
    /// 画面端で跳ね返る投擲
    Axe,
    /// 周囲を回転
    Bible,
    /// 照準方向へ平行に貫通弾
    Fireball,
    /// 落雷（着弾まで対象を追跡）
    Lightning,
}

pub const ALL_WEAPONS: [WeaponKind; 7] = [
    WeaponKind::Whip,
    WeaponKind::Garlic,
    WeaponKind::MagicWand,
    WeaponKind::Axe,
    WeaponKind::Bible,
    WeaponKind::Fireball,
    WeaponKind::Lightning,
];

/// 武器の基礎パラメータ
#[derive(Clone, Copy, Debug)]
pub struct WeaponParams {
    pub cooldown_ms: f64,
    pub damage:      i32,
    pub knockback:   f32,
    pub lifetime_ms: f64,
    pub speed:       f32,
    /// [0]=未使用, [1..8]=Lv1..Lv8 の発射数
    pub count_table: [usize; 9],
}

const WHIP: WeaponParams = WeaponParams {
    cooldown_ms: 1000.0, damage: 30, knockback: 220.0, lifetime_ms: 200.0, speed: 0.0,
    count_table: [0, 1, 1, 1, 2, 2, 2, 2, 2],
};
const GARLIC: WeaponParams = WeaponParams {
    cooldown_ms: 3000.0, damage: 5, knockback: 90.0, lifetime_ms: 3000.0, speed: 0.0,
    count_table: [0, 1, 1, 1, 1, 1, 1, 1, 1],
};
const MAGIC_WAND: WeaponParams = WeaponParams {
    cooldown_ms: 1000.0, damage: 10, knockback: 60.0, lifetime_ms: 2000.0, speed: 500.0,
    count_table: [0, 1, 1, 2, 2, 3, 3, 4, 4],
};
const AXE: WeaponParams = WeaponParams {
    cooldown_ms: 1500.0, damage: 25, knockback: 120.0, lifetime_ms: 4000.0, speed: 350.0,
    count_table: [0, 1, 1, 1, 2, 2, 2, 3, 3],
};
const BIBLE: WeaponParams = WeaponParams {
    cooldown_ms: 5000.0, damage: 12, knockback: 160.0, lifetime_ms: 3000.0, speed: 3.0,
    count_table: [0, 1, 2, 2, 3, 3, 4, 4, 5],
};
const FIREBALL: WeaponParams = WeaponParams {
    cooldown_ms: 1000.0, damage: 20, knockback: 100.0, lifetime_ms: 1500.0, speed: 420.0,
    count_table: [0, 1, 1, 2, 2, 3, 3, 4, 4],
};
const LIGHTNING: WeaponParams = WeaponParams {
    cooldown_ms: 1500.0, damage: 15, knockback: 0.0, lifetime_ms: 150.0, speed: 0.0,
    count_table: [0, 2, 3, 3, 4, 4, 5, 5, 6],
};

/// Whip の逆方向の遅延
pub const WHIP_REVERSE_DELAY_MS: f64 = 150.0;
/// Garlic 回復の独立クールダウン
pub const GARLIC_HEAL_COOLDOWN_MS: f64 = 2000.0;
pub const GARLIC_HEAL_AMOUNT: i32 = 1;
/// Lightning の落下時間
pub const LIGHTNING_FALL_MS: f64 = 300.0;
/// 敵がいないときの落雷の散布半径
pub const LIGHTNING_SCATTER_RADIUS: f32 = 200.0;
/// Fireball の横方向 1 列あたりの遅延
pub const FIREBALL_STAGGER_MS: f64 = 60.0;
pub const BIBLE_ORBIT_RADIUS: f32 = 90.0;

impl WeaponKind {
    pub fn params(self) -> &'static WeaponParams {
        match self {
            WeaponKind::Whip      => &WHIP,
            WeaponKind::Garlic    => &GARLIC,
            WeaponKind::MagicWand => &MAGIC_WAND,
            WeaponKind::Axe       => &AXE,
            WeaponKind::Bible     => &BIBLE,
            WeaponKind::Fireball  => &FIREBALL,
            WeaponKind::Lightning => &LIGHTNING,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Whip      => "whip",
            WeaponKind::Garlic    => "garlic",
            WeaponKind::MagicWand => "magic_wand",
            WeaponKind::Axe       => "axe",
            WeaponKind::Bible     => "bible",
            WeaponKind::Fireball  => "fireball",
            WeaponKind::Lightning => "lightning",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_WEAPONS.iter().copied().find(|k| k.name() == name)
    }

    pub fn hit_policy(self) -> HitPolicy {
        match self {
            WeaponKind::Garlic    => HitPolicy::Persistent { retrigger_ms: 200.0 },
            WeaponKind::Bible     => HitPolicy::Persistent { retrigger_ms: 500.0 },
            WeaponKind::MagicWand => HitPolicy::ConsumedOnHit,
            WeaponKind::Whip
            | WeaponKind::Axe
            | WeaponKind::Fireball
            | WeaponKind::Lightning => HitPolicy::OneShot { penetrating: true },
        }
    }
}

/// 使用者のパッシブ補正
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub damage_bonus:      i32,
    pub range_mult:        f32,
    pub duration_mult:     f32,
    pub extra_projectiles: u32,
    pub speed_mult:        f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            damage_bonus:      0,
            range_mult:        1.0,
            duration_mult:     1.0,
            extra_projectiles: 0,
            speed_mult:        1.0,
        }
    }
}

/// 発射時点の使用者の状態
#[derive(Clone, Copy, Debug)]
pub struct WielderState {
    pub x:      f32,
    pub y:      f32,
    pub facing: Facing,
    /// マウス照準など（無ければ向きを使う）
    pub aim:    Option<(f32, f32)>,
    pub now_ms: f64,
}

/// 照準用の敵情報（読み取り専用）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetView {
    pub uid: u32,
    pub x:   f32,
    pub y:   f32,
}

/// 距離の近い順に最大 `n` 体（同距離は uid 順）
pub fn nearest_targets(targets: &[TargetView], x: f32, y: f32, radius: f32, n: usize) -> Vec<TargetView> {
    let r2 = radius * radius;
    let mut v: Vec<(f32, TargetView)> = targets
        .iter()
        .map(|t| {
            let dx = t.x - x;
            let dy = t.y - y;
            (dx * dx + dy * dy, *t)
        })
        .filter(|(d2, _)| *d2 <= r2)
        .collect();
    v.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.uid.cmp(&b.1.uid)));
    v.into_iter().take(n).map(|(_, t)| t).collect()
}

// ─── WeaponSlot ───────────────────────────────────────────────
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponSlot {
    pub kind:         WeaponKind,
    pub level:        u32,
    /// None ならすぐ撃てる
    pub last_fire_ms: Option<f64>,
    pub last_heal_ms: Option<f64>,
}

impl WeaponSlot {
    pub fn new(kind: WeaponKind) -> Self {
        Self { kind, level: 1, last_fire_ms: None, last_heal_ms: None }
    }

    pub fn level_up(&mut self) -> bool {
        if self.level < MAX_WEAPON_LEVEL {
            self.level += 1;
            true
        } else {
            false
        }
    }

    pub fn effective_cooldown_ms(&self) -> f64 {
        let base = self.kind.params().cooldown_ms;
        (base * (1.0 - (self.level as f64 - 1.0) * 0.07)).max(base * 0.5)
    }

    pub fn effective_damage(&self) -> i32 {
        let base = self.kind.params().damage;
        base + (self.level as i32 - 1) * (base / 4).max(1)
    }

    /// 補正前の発射数
    pub fn base_count(&self) -> usize {
        let lv = self.level.clamp(1, MAX_WEAPON_LEVEL) as usize;
        self.kind.params().count_table[lv]
    }

    pub fn is_ready(&self, now_ms: f64) -> bool {
        match self.last_fire_ms {
            None => true,
            Some(last) => now_ms - last + TIME_EPSILON_MS >= self.effective_cooldown_ms(),
        }
    }

    /// Garlic の回復を試みる。独立クールダウンが明けていれば回復量を返す。
    pub fn try_heal(&mut self, now_ms: f64) -> Option<i32> {
        if self.kind != WeaponKind::Garlic {
            return None;
        }
        if let Some(last) = self.last_heal_ms {
            if now_ms - last + TIME_EPSILON_MS < GARLIC_HEAL_COOLDOWN_MS {
                return None;
            }
        }
        self.last_heal_ms = Some(now_ms);
        Some(GARLIC_HEAL_AMOUNT + (self.level as i32 - 1) / 3)
    }

    /// クールダウン中なら空。撃てる場合は（対象がいなくても）クールダウンをリセットする。
    pub fn fire(
        &mut self,
        wielder: &WielderState,
        mods: &Modifiers,
        targets: &[TargetView],
        rng: &mut SimpleRng,
    ) -> Vec<AttackInstance> {
        let now = wielder.now_ms;
        if !self.is_ready(now) {
            return Vec::new();
        }
        self.last_fire_ms = Some(now);

        let p = self.kind.params();
        let damage = (self.effective_damage() + mods.damage_bonus).max(1);
        let count = self.base_count() + mods.extra_projectiles as usize;
        let range = mods.range_mult.max(0.0);
        let lifetime = p.lifetime_ms * mods.duration_mult.max(0.0) as f64;
        let speed = p.speed * mods.speed_mult;
        let policy = self.kind.hit_policy();
        let level = self.level as f32;
        let origin = (wielder.x, wielder.y);

        let make = |x: f32, y: f32, hw: f32, hh: f32, life: f64, motion: AttackMotion| {
            AttackInstance::new(self.kind, x, y, hw, hh, damage, p.knockback, now, life, policy, motion)
        };

        match self.kind {
            WeaponKind::Whip => {
                let reach = (120.0 + (level - 1.0) * 20.0) * range;
                let half_w = reach / 2.0;
                let half_h = 24.0 * range;
                (0..count)
                    .map(|k| {
                        // 偶数: 前方、奇数: 後方
                        let dir = if k % 2 == 0 { wielder.facing.sign() } else { -wielder.facing.sign() };
                        let offset_x = dir * (PLAYER_RADIUS + half_w);
                        make(
                            wielder.x + offset_x, wielder.y, half_w, half_h, lifetime,
                            AttackMotion::FollowWielder { offset_x, offset_y: 0.0 },
                        )
                        .with_delay(k as f64 * WHIP_REVERSE_DELAY_MS)
                    })
                    .collect()
            }
            WeaponKind::Garlic => {
                let radius = (80.0 + (level - 1.0) * 15.0) * range;
                // 常時 1 つだけ出ているように寿命 = クールダウン
                let life = self.effective_cooldown_ms();
                vec![make(
                    wielder.x, wielder.y, radius, radius, life,
                    AttackMotion::FollowWielder { offset_x: 0.0, offset_y: 0.0 },
                )]
            }
            WeaponKind::MagicWand => {
                let half = 6.0 * range;
                nearest_targets(targets, wielder.x, wielder.y, WEAPON_SEARCH_RADIUS, count)
                    .into_iter()
                    .map(|t| {
                        let (ux, uy) = heading(origin, (t.x, t.y));
                        make(
                            wielder.x, wielder.y, half, half, lifetime,
                            AttackMotion::Linear { vx: ux * speed, vy: uy * speed },
                        )
                    })
                    .collect()
            }
            WeaponKind::Axe => {
                let half = 14.0 * range;
                let bounces = 2 + self.level as i32 / 3;
                (0..count)
                    .map(|_| {
                        let angle = rng.range_f32(0.0, std::f32::consts::TAU);
                        make(
                            wielder.x, wielder.y, half, half, lifetime,
                            AttackMotion::Ricochet {
                                vx: angle.cos() * speed,
                                vy: angle.sin() * speed,
                                bounces_left: bounces,
                                trail: Vec::new(),
                            },
                        )
                    })
                    .collect()
            }
            WeaponKind::Bible => {
                let half = 16.0 * range;
                let radius = BIBLE_ORBIT_RADIUS * range;
                let n = count.max(1);
                (0..n)
                    .map(|k| {
                        let angle = k as f32 / n as f32 * std::f32::consts::TAU;
                        make(
                            wielder.x + angle.cos() * radius,
                            wielder.y + angle.sin() * radius,
                            half, half, lifetime,
                            AttackMotion::Orbit { angle, radius, angular_speed: speed },
                        )
                    })
                    .collect()
            }
            WeaponKind::Fireball => {
                let half = 12.0 * range;
                let spacing = 24.0 * range;
                let (ax, ay) = match wielder.aim {
                    Some((x, y)) if x * x + y * y > 1e-8 => heading((0.0, 0.0), (x, y)),
                    _ => (wielder.facing.sign(), 0.0),
                };
                let (px, py) = (-ay, ax);
                let center = (count as f32 - 1.0) / 2.0;
                (0..count)
                    .map(|k| {
                        let lateral = k as f32 - center;
                        let ox = px * lateral * spacing;
                        let oy = py * lateral * spacing;
                        make(
                            wielder.x + ox, wielder.y + oy, half, half, lifetime,
                            AttackMotion::Linear { vx: ax * speed, vy: ay * speed },
                        )
                        .with_delay(lateral.abs() as f64 * FIREBALL_STAGGER_MS)
                    })
                    .collect()
            }
            WeaponKind::Lightning => {
                let half = 40.0 * range;
                let life = LIGHTNING_FALL_MS + lifetime;
                let picked = nearest_targets(targets, wielder.x, wielder.y, WEAPON_SEARCH_RADIUS, count);
                if picked.is_empty() {
                    // 敵がいなければ近くの地面にランダムに落とす
                    let angle = rng.range_f32(0.0, std::f32::consts::TAU);
                    let dist = rng.range_f32(0.0, LIGHTNING_SCATTER_RADIUS);
                    let (tx, ty) = (wielder.x + angle.cos() * dist, wielder.y + angle.sin() * dist);
                    return vec![make(
                        tx, ty, half, half, life,
                        AttackMotion::Strike { target_uid: None, target_x: tx, target_y: ty, fall_ms: LIGHTNING_FALL_MS, impacted: false },
                    )];
                }
                picked
                    .into_iter()
                    .map(|t| {
                        make(
                            t.x, t.y, half, half, life,
                            AttackMotion::Strike {
                                target_uid: Some(t.uid),
                                target_x: t.x,
                                target_y: t.y,
                                fall_ms: LIGHTNING_FALL_MS,
                                impacted: false,
                            },
                        )
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wielder(now_ms: f64) -> WielderState {
        WielderState {
            x: 0.0,
            y: 0.0,
            facing: Facing::Right,
            aim: None,
            now_ms,
        }
    }

    fn targets() -> Vec<TargetView> {
        vec![
            TargetView { uid: 1, x: 300.0, y: 0.0 },
            TargetView { uid: 2, x: 0.0, y: 100.0 },
            TargetView { uid: 3, x: -200.0, y: 0.0 },
        ]
    }

    #[test]
    fn level_scaling_follows_slot_rules() {
        let mut slot = WeaponSlot::new(WeaponKind::MagicWand);
        assert_eq!(slot.effective_damage(), 10);
        slot.level = 2;
        assert_eq!(slot.effective_damage(), 12);
        assert!((slot.effective_cooldown_ms() - 930.0).abs() < 1e-6);
        slot.level = 8;
        assert!((slot.effective_cooldown_ms() - 510.0).abs() < 1e-6);
        assert_eq!(slot.base_count(), 4);
        assert!(!slot.level_up());
    }

    #[test]
    fn cooldown_gates_and_resets_even_without_targets() {
        let mut slot = WeaponSlot::new(WeaponKind::MagicWand);
        let mut rng = SimpleRng::new(1);
        let shots = slot.fire(&wielder(0.0), &Modifiers::default(), &[], &mut rng);
        assert!(shots.is_empty());
        assert_eq!(slot.last_fire_ms, Some(0.0));
        assert!(slot.fire(&wielder(500.0), &Modifiers::default(), &targets(), &mut rng).is_empty());
        assert_eq!(slot.fire(&wielder(1000.0), &Modifiers::default(), &targets(), &mut rng).len(), 1);
    }

    #[test]
    fn magic_wand_aims_at_nearest_at_fire_time() {
        let mut slot = WeaponSlot::new(WeaponKind::MagicWand);
        let mut rng = SimpleRng::new(1);
        let mods = Modifiers { extra_projectiles: 1, ..Default::default() };
        let shots = slot.fire(&wielder(0.0), &mods, &targets(), &mut rng);
        assert_eq!(shots.len(), 2);
        // uid 2 (距離 100) → +Y、uid 3 (距離 200) → -X
        match shots[0].motion {
            AttackMotion::Linear { vx, vy } => assert!(vx.abs() < 1e-3 && vy > 0.0),
            _ => panic!("expected linear motion"),
        }
        match shots[1].motion {
            AttackMotion::Linear { vx, vy } => assert!(vx < 0.0 && vy.abs() < 1e-3),
            _ => panic!("expected linear motion"),
        }
        assert_eq!(shots[0].hit_policy, HitPolicy::ConsumedOnHit);
    }

    #[test]
    fn whip_adds_delayed_reverse_sweep_from_level_four() {
        let mut slot = WeaponSlot::new(WeaponKind::Whip);
        let mut rng = SimpleRng::new(1);
        assert_eq!(slot.fire(&wielder(0.0), &Modifiers::default(), &[], &mut rng).len(), 1);
        slot.level = 4;
        let sweeps = slot.fire(&wielder(5000.0), &Modifiers::default(), &[], &mut rng);
        assert_eq!(sweeps.len(), 2);
        assert!(sweeps[0].x > 0.0);
        assert!(sweeps[1].x < 0.0);
        assert_eq!(sweeps[1].spawn_delay_ms, WHIP_REVERSE_DELAY_MS);
    }

    #[test]
    fn modifiers_scale_damage_extents_and_lifetime() {
        let mut slot = WeaponSlot::new(WeaponKind::Axe);
        let mut rng = SimpleRng::new(1);
        let mods = Modifiers { damage_bonus: 5, range_mult: 2.0, duration_mult: 0.5, speed_mult: 2.0, extra_projectiles: 2 };
        let axes = slot.fire(&wielder(0.0), &mods, &[], &mut rng);
        assert_eq!(axes.len(), 3);
        let a = &axes[0];
        assert_eq!(a.damage, 30);
        assert_eq!(a.half_w, 28.0);
        assert_eq!(a.lifetime_ms, 2000.0);
        if let AttackMotion::Ricochet { vx, vy, bounces_left, .. } = a.motion {
            assert!(((vx * vx + vy * vy).sqrt() - 700.0).abs() < 0.1);
            assert_eq!(bounces_left, 2);
        } else {
            panic!("expected ricochet");
        }
    }

    #[test]
    fn fireball_fires_parallel_with_lateral_stagger() {
        let mut slot = WeaponSlot::new(WeaponKind::Fireball);
        slot.level = 5; // 3 発
        let mut rng = SimpleRng::new(1);
        let mut w = wielder(0.0);
        w.aim = Some((0.0, -2.0));
        let balls = slot.fire(&w, &Modifiers::default(), &[], &mut rng);
        assert_eq!(balls.len(), 3);
        for b in &balls {
            match b.motion {
                AttackMotion::Linear { vx, vy } => assert!(vx.abs() < 1e-3 && vy < 0.0),
                _ => panic!("expected linear motion"),
            }
        }
        // 照準 (0,-1) に垂直なのは X 方向
        assert!((balls[0].x - balls[2].x).abs() > 1.0);
        assert_eq!(balls[1].spawn_delay_ms, 0.0);
        assert_eq!(balls[0].spawn_delay_ms, FIREBALL_STAGGER_MS);
        assert_eq!(balls[2].spawn_delay_ms, FIREBALL_STAGGER_MS);
    }

    #[test]
    fn bible_instances_are_evenly_spaced() {
        let mut slot = WeaponSlot::new(WeaponKind::Bible);
        slot.level = 4; // 3 冊
        let mut rng = SimpleRng::new(1);
        let books = slot.fire(&wielder(0.0), &Modifiers::default(), &[], &mut rng);
        assert_eq!(books.len(), 3);
        for b in &books {
            let r = (b.x * b.x + b.y * b.y).sqrt();
            assert!((r - BIBLE_ORBIT_RADIUS).abs() < 1e-3);
            assert_eq!(b.hit_policy, HitPolicy::Persistent { retrigger_ms: 500.0 });
        }
    }

    #[test]
    fn lightning_targets_enemies_or_scatters() {
        let mut slot = WeaponSlot::new(WeaponKind::Lightning);
        let mut rng = SimpleRng::new(1);
        let strikes = slot.fire(&wielder(0.0), &Modifiers::default(), &targets(), &mut rng);
        assert_eq!(strikes.len(), 2);
        assert!(matches!(strikes[0].motion, AttackMotion::Strike { target_uid: Some(2), .. }));
        let ground = slot.fire(&wielder(10_000.0), &Modifiers::default(), &[], &mut rng);
        assert_eq!(ground.len(), 1);
        let g = &ground[0];
        assert!(matches!(g.motion, AttackMotion::Strike { target_uid: None, .. }));
        assert!((g.x * g.x + g.y * g.y).sqrt() <= LIGHTNING_SCATTER_RADIUS + 1e-3);
    }

    #[test]
    fn garlic_heal_has_its_own_cooldown() {
        let mut slot = WeaponSlot::new(WeaponKind::Garlic);
        assert_eq!(slot.try_heal(0.0), Some(1));
        assert_eq!(slot.try_heal(1000.0), None);
        assert_eq!(slot.try_heal(2000.0), Some(1));
        assert_eq!(WeaponSlot::new(WeaponKind::Whip).try_heal(0.0), None);
    }

    #[test]
    fn names_roundtrip() {
        for k in ALL_WEAPONS {
            assert_eq!(WeaponKind::from_name(k.name()), Some(k));
        }
    }
}

//! Path: native/game_core/src/attack.rs
//! Summary: AttackInstance（武器が生成する攻撃判定）とその移動ルール・ヒット記録
//!
//! 種類ごとの一時状態はすべて `AttackMotion` のペイロードとして生成時に持たせる。

use rustc_hash::FxHashMap;

use crate::enemy::unit_or_default;
use crate::physics::obstacle_resolve::ObstacleMap;
use crate::util::Viewport;
use crate::weapon::WeaponKind;

/// 時刻比較の許容誤差（ms）。dt の浮動小数点誤差で境界ちょうどを取りこぼさないため。
pub const TIME_EPSILON_MS: f64 = 1e-3;

/// Ricochet の軌跡に残す点数
pub const TRAIL_LEN: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitPolicy {
    /// 同じ敵には生存中 1 回だけ
    OneShot { penetrating: bool },
    /// 同じ敵に `retrigger_ms` ごとに再ヒット
    Persistent { retrigger_ms: f64 },
    /// 最初のヒットで消滅
    ConsumedOnHit,
}

impl HitPolicy {
    /// 1 フレームで複数の敵に当たり続けるか
    pub fn is_penetrating(self) -> bool {
        match self {
            HitPolicy::OneShot { penetrating } => penetrating,
            HitPolicy::Persistent { .. } => true,
            HitPolicy::ConsumedOnHit => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttackMotion {
    /// 使用者の位置 + オフセットに追従
    FollowWielder { offset_x: f32, offset_y: f32 },
    /// 直進（生成時に向きを固定）
    Linear { vx: f32, vy: f32 },
    /// 画面端・障害物で跳ね返る。`bounces_left < 0` で消滅
    Ricochet { vx: f32, vy: f32, bounces_left: i32, trail: Vec<(f32, f32)> },
    /// 使用者の周囲を回転
    Orbit { angle: f32, radius: f32, angular_speed: f32 },
    /// 上空から落下（着弾までは対象を追跡）、着弾後に短時間の判定
    Strike { target_uid: Option<u32>, target_x: f32, target_y: f32, fall_ms: f64, impacted: bool },
}

#[derive(Clone, Debug)]
pub struct AttackInstance {
    /// ワールドに登録した時点で採番される
    pub id:             u64,
    pub weapon:         WeaponKind,
    pub x:              f32,
    pub y:              f32,
    pub half_w:         f32,
    pub half_h:         f32,
    pub damage:         i32,
    pub knockback:      f32,
    pub created_ms:     f64,
    /// Strike は落下時間を含む
    pub lifetime_ms:    f64,
    /// この間は判定なし
    pub spawn_delay_ms: f64,
    pub hit_policy:     HitPolicy,
    pub motion:         AttackMotion,
    /// 敵 uid → 最後にヒットした時刻
    pub hits:           FxHashMap<u32, f64>,
    pub alive:          bool,
}

/// 移動更新に必要な読み取り専用の状態
pub struct MotionContext<'a> {
    pub now_ms:    f64,
    pub dt:        f32,
    pub wielder:   (f32, f32),
    /// Ricochet が跳ね返る境界
    pub bounds:    Viewport,
    pub obstacles: &'a dyn ObstacleMap,
}

/// 1 ティック分の移動結果（並列フェーズの戻り値）
#[derive(Clone, Debug, PartialEq)]
pub struct MotionStep {
    pub x:       f32,
    pub y:       f32,
    pub motion:  AttackMotion,
    pub expired: bool,
}

impl AttackInstance {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        weapon: WeaponKind,
        x: f32, y: f32,
        half_w: f32, half_h: f32,
        damage: i32,
        knockback: f32,
        now_ms: f64,
        lifetime_ms: f64,
        hit_policy: HitPolicy,
        motion: AttackMotion,
    ) -> Self {
        Self {
            id: 0,
            weapon,
            x, y,
            half_w, half_h,
            damage,
            knockback,
            created_ms: now_ms,
            lifetime_ms,
            spawn_delay_ms: 0.0,
            hit_policy,
            motion,
            hits: FxHashMap::default(),
            alive: true,
        }
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.spawn_delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn is_pending(&self, now_ms: f64) -> bool {
        now_ms < self.created_ms + self.spawn_delay_ms
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        if !self.alive {
            return true;
        }
        if let AttackMotion::Ricochet { bounces_left, .. } = self.motion {
            if bounces_left < 0 {
                return true;
            }
        }
        now_ms >= self.created_ms + self.spawn_delay_ms + self.lifetime_ms
    }

    /// 当たり判定が有効か（遅延中・着弾前は無効）
    pub fn is_active(&self, now_ms: f64) -> bool {
        if !self.alive || self.is_pending(now_ms) || self.is_expired(now_ms) {
            return false;
        }
        match self.motion {
            AttackMotion::Strike { impacted, .. } => impacted,
            _ => true,
        }
    }

    /// 描画用の進行度 [0, 1]
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.lifetime_ms <= 0.0 {
            return 1.0;
        }
        let t = (now_ms - self.created_ms - self.spawn_delay_ms) / self.lifetime_ms;
        t.clamp(0.0, 1.0) as f32
    }

    pub fn can_hit(&self, uid: u32, now_ms: f64) -> bool {
        match (self.hit_policy, self.hits.get(&uid)) {
            (_, None) => true,
            (HitPolicy::Persistent { retrigger_ms }, Some(&last)) => {
                now_ms - last + TIME_EPSILON_MS >= retrigger_ms
            }
            (HitPolicy::OneShot { .. } | HitPolicy::ConsumedOnHit, Some(_)) => false,
        }
    }

    pub fn record_hit(&mut self, uid: u32, now_ms: f64) {
        self.hits.insert(uid, now_ms);
        if self.hit_policy == HitPolicy::ConsumedOnHit {
            self.alive = false;
        }
    }

    /// 矩形と円の重なり
    pub fn overlaps_circle(&self, cx: f32, cy: f32, r: f32) -> bool {
        let nx = cx.clamp(self.x - self.half_w, self.x + self.half_w);
        let ny = cy.clamp(self.y - self.half_h, self.y + self.half_h);
        let dx = cx - nx;
        let dy = cy - ny;
        dx * dx + dy * dy <= r * r
    }

    /// 近傍検索に使う外接半径
    pub fn reach(&self) -> f32 {
        self.half_w.max(self.half_h)
    }

    /// 1 ティック進めた結果を返す（自身は変更しない）。
    /// `target_pos` は Strike の追跡用で、対象が死んでいれば None を返すこと。
    pub fn step<F>(&self, ctx: &MotionContext<'_>, target_pos: F) -> MotionStep
    where
        F: Fn(u32) -> Option<(f32, f32)>,
    {
        let pending = self.is_pending(ctx.now_ms);
        let dt = ctx.dt;
        let (mut x, mut y) = (self.x, self.y);
        let mut expired = self.is_expired(ctx.now_ms);

        let motion = match &self.motion {
            AttackMotion::FollowWielder { offset_x, offset_y } => {
                x = ctx.wielder.0 + offset_x;
                y = ctx.wielder.1 + offset_y;
                self.motion.clone()
            }
            AttackMotion::Linear { vx, vy } => {
                if !pending {
                    x += vx * dt;
                    y += vy * dt;
                    if ctx.obstacles.is_blocked(x, y, self.reach()) {
                        expired = true;
                    }
                }
                self.motion.clone()
            }
            AttackMotion::Ricochet { vx, vy, bounces_left, trail } => {
                let (mut vx, mut vy, mut bounces) = (*vx, *vy, *bounces_left);
                let mut trail = trail.clone();
                if !pending {
                    trail.push((x, y));
                    if trail.len() > TRAIL_LEN {
                        trail.remove(0);
                    }
                    let (nx, ny) = (x + vx * dt, y + vy * dt);
                    let r = self.reach();
                    let mut contact = false;

                    if ctx.obstacles.is_blocked(nx, ny, r) {
                        // どちらの軸で当たったかで反射方向を決める
                        let hit_x = ctx.obstacles.is_blocked(nx, y, r);
                        let hit_y = ctx.obstacles.is_blocked(x, ny, r);
                        if hit_x || !hit_y {
                            vx = -vx;
                        }
                        if hit_y || !hit_x {
                            vy = -vy;
                        }
                        contact = true;
                    } else {
                        x = nx;
                        y = ny;
                    }

                    let b = ctx.bounds;
                    if x - r < b.min_x {
                        x = b.min_x + r;
                        vx = vx.abs();
                        contact = true;
                    } else if x + r > b.max_x {
                        x = b.max_x - r;
                        vx = -vx.abs();
                        contact = true;
                    }
                    if y - r < b.min_y {
                        y = b.min_y + r;
                        vy = vy.abs();
                        contact = true;
                    } else if y + r > b.max_y {
                        y = b.max_y - r;
                        vy = -vy.abs();
                        contact = true;
                    }
                    if contact {
                        bounces -= 1;
                        if bounces < 0 {
                            expired = true;
                        }
                    }
                }
                AttackMotion::Ricochet { vx, vy, bounces_left: bounces, trail }
            }
            AttackMotion::Orbit { angle, radius, angular_speed } => {
                let angle = if pending { *angle } else { angle + angular_speed * dt };
                x = ctx.wielder.0 + angle.cos() * radius;
                y = ctx.wielder.1 + angle.sin() * radius;
                AttackMotion::Orbit { angle, radius: *radius, angular_speed: *angular_speed }
            }
            AttackMotion::Strike { target_uid, target_x, target_y, fall_ms, impacted } => {
                let (mut tx, mut ty) = (*target_x, *target_y);
                let mut impacted = *impacted;
                if !impacted {
                    if let Some(p) = target_uid.and_then(&target_pos) {
                        tx = p.0;
                        ty = p.1;
                    }
                    let impact_at = self.created_ms + self.spawn_delay_ms + fall_ms;
                    if ctx.now_ms + TIME_EPSILON_MS >= impact_at {
                        impacted = true;
                    }
                }
                x = tx;
                y = ty;
                AttackMotion::Strike {
                    target_uid: *target_uid,
                    target_x: tx,
                    target_y: ty,
                    fall_ms: *fall_ms,
                    impacted,
                }
            }
        };

        MotionStep { x, y, motion, expired }
    }

    pub fn apply_step(&mut self, step: MotionStep) {
        self.x = step.x;
        self.y = step.y;
        self.motion = step.motion;
        if step.expired {
            self.alive = false;
        }
    }
}

/// 発射方向ベクトル（速度 0 の場合も単位ベクトルを返す）
pub fn heading(from: (f32, f32), to: (f32, f32)) -> (f32, f32) {
    let (ux, uy, _) = unit_or_default(to.0 - from.0, to.1 - from.1);
    (ux, uy)
}

//! Path: native/game_core/src/enemy.rs
//! Summary: 敵の行動クラス（移動ルール・射撃判定・カリング閾値）と向き

use serde::{Deserialize, Serialize};

use crate::entity_params::{DistanceBand, ProjectilePattern};

/// 行動クラス。アーキタイプで固定され、実行中に遷移しない。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Behavior {
    Chase            = 1,
    RushThrough      = 2,
    KiteAndShoot     = 3,
    ApproachAndShoot = 4,
}

impl TryFrom<u8> for Behavior {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Chase),
            2 => Ok(Self::RushThrough),
            3 => Ok(Self::KiteAndShoot),
            4 => Ok(Self::ApproachAndShoot),
            _ => Err(format!("unknown behavior class {id}")),
        }
    }
}

impl From<Behavior> for u8 {
    fn from(b: Behavior) -> u8 {
        b as u8
    }
}

impl Behavior {
    /// 画面外でこの距離（プレイヤー中心から）を超えたらカリング
    pub fn cull_distance(self) -> f32 {
        match self {
            Self::Chase            => 1400.0,
            Self::RushThrough      => 1000.0,
            Self::KiteAndShoot     => 1600.0,
            Self::ApproachAndShoot => 1400.0,
        }
    }

    /// 交戦しなくてもこの時間で消える（Rush / Kite のみ）
    pub fn max_lifetime_secs(self) -> Option<f32> {
        match self {
            Self::RushThrough  => Some(15.0),
            Self::KiteAndShoot => Some(45.0),
            Self::Chase | Self::ApproachAndShoot => None,
        }
    }

    /// 射撃する距離の上限。バンド指定が無い場合は画面半分程度。
    pub fn fire_range(self, band: Option<DistanceBand>) -> f32 {
        const DEFAULT_FIRE_RANGE: f32 = 600.0;
        match (self, band) {
            (Self::KiteAndShoot | Self::ApproachAndShoot, Some(b)) => b.target + b.tolerance,
            _ => DEFAULT_FIRE_RANGE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// 水平移動量から向きを決める。ほぼ 0 なら現状維持。
    pub fn from_dx(dx: f32, current: Facing) -> Facing {
        if dx > 1e-3 {
            Facing::Right
        } else if dx < -1e-3 {
            Facing::Left
        } else {
            current
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// (dx, dy) の単位ベクトルと長さ。長さ 0 のときは (1, 0) を返す。
pub fn unit_or_default(dx: f32, dy: f32) -> (f32, f32, f32) {
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > 1e-6 {
        (dx / dist, dy / dist, dist)
    } else {
        (1.0, 0.0, 0.0)
    }
}

/// 1 ティック分の移動意図
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveIntent {
    pub dx: f32,
    pub dy: f32,
    /// RushThrough が最初の更新で固定した進行方向
    pub locked_dir: Option<(f32, f32)>,
}

/// 行動クラスごとの移動ルール（敵位置 `e`、プレイヤー中心 `p`）
pub fn movement_intent(
    behavior: Behavior,
    e: (f32, f32),
    p: (f32, f32),
    speed: f32,
    dt: f32,
    locked_dir: Option<(f32, f32)>,
    band: Option<DistanceBand>,
) -> MoveIntent {
    let (ux, uy, dist) = unit_or_default(p.0 - e.0, p.1 - e.1);
    let step = speed * dt;
    match behavior {
        // ApproachAndShoot のバンドは射程にだけ効き、移動は常に接近
        Behavior::Chase | Behavior::ApproachAndShoot => {
            // 追い越さない
            let s = if dist > 0.0 { step.min(dist) } else { step };
            MoveIntent { dx: ux * s, dy: uy * s, locked_dir: None }
        }
        Behavior::RushThrough => {
            let (lx, ly) = locked_dir.unwrap_or((ux, uy));
            MoveIntent { dx: lx * step, dy: ly * step, locked_dir: Some((lx, ly)) }
        }
        Behavior::KiteAndShoot => {
            let band = band.unwrap_or_default();
            if dist < band.target - band.tolerance {
                MoveIntent { dx: -ux * step, dy: -uy * step, locked_dir: None }
            } else if dist > band.target + band.tolerance {
                let s = step.min(dist - band.target);
                MoveIntent { dx: ux * s, dy: uy * s, locked_dir: None }
            } else {
                MoveIntent::default()
            }
        }
    }
}

/// 射撃パターンごとの弾速ベクトル（Aimed: プレイヤー方向 1 発、Radial: 等間隔 n 発）
pub fn projectile_velocities(
    pattern: ProjectilePattern,
    e: (f32, f32),
    p: (f32, f32),
    speed: f32,
) -> Vec<(f32, f32)> {
    let (ux, uy, _) = unit_or_default(p.0 - e.0, p.1 - e.1);
    match pattern {
        ProjectilePattern::Aimed => vec![(ux * speed, uy * speed)],
        ProjectilePattern::Radial { count } => {
            let n = count.max(1);
            let base = uy.atan2(ux);
            (0..n)
                .map(|k| {
                    let a = base + k as f32 / n as f32 * std::f32::consts::TAU;
                    (a.cos() * speed, a.sin() * speed)
                })
                .collect()
        }
    }
}

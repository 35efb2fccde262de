//! Path: native/game_core/src/physics/separation.rs
//! Summary: 敵同士の重なり解消（Separation）と障害物を考慮した移動確定
//!
//! 並列フェーズから呼ばれるため、ここの関数はすべて読み取り専用。
//! 近傍はティック開始時点のスナップショットを渡す。

use crate::constants::{
    BOSS_PUSH_WEIGHT, BOSS_RESIST_WEIGHT, SEPARATION_FACTOR, SEPARATION_STRENGTH,
};
use super::obstacle_resolve::ObstacleMap;

/// 近傍の敵（スナップショット）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeighborBody {
    pub x:       f32,
    pub y:       f32,
    pub radius:  f32,
    pub is_boss: bool,
}

/// 目標位置 `(desired_x, desired_y)` が近傍と重なる場合の押し出しベクトルを返す。
///
/// 重なり判定距離は `(r_a + r_b) * SEPARATION_FACTOR`。押し出し量は重なりの深さで重み付けし、
/// ボスに押される側は `BOSS_PUSH_WEIGHT` 倍、ボス自身は `BOSS_RESIST_WEIGHT` 倍になる。
/// 呼び出し側は自分自身を `neighbors` から除外しておくこと。
pub fn separation_push(
    desired_x: f32,
    desired_y: f32,
    radius: f32,
    is_boss: bool,
    neighbors: &[NeighborBody],
) -> (f32, f32) {
    let mut push_x = 0.0;
    let mut push_y = 0.0;
    for n in neighbors {
        let min_dist = (radius + n.radius) * SEPARATION_FACTOR;
        if min_dist <= 0.0 {
            continue;
        }
        let dx = desired_x - n.x;
        let dy = desired_y - n.y;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq >= min_dist * min_dist {
            continue;
        }
        let dist = dist_sq.sqrt();
        // 完全に重なった場合は固定方向へ逃がす
        let (nx, ny) = if dist > 1e-4 { (dx / dist, dy / dist) } else { (1.0, 0.0) };
        let overlap = min_dist - dist;
        let severity = overlap / min_dist;
        let weight = match (is_boss, n.is_boss) {
            (false, true) => BOSS_PUSH_WEIGHT,
            (true, false) => BOSS_RESIST_WEIGHT,
            _ => 1.0,
        };
        let amount = overlap * (0.5 + severity) * weight;
        push_x += nx * amount;
        push_y += ny * amount;
    }
    (push_x * SEPARATION_STRENGTH, push_y * SEPARATION_STRENGTH)
}

fn first_free<M: ObstacleMap + ?Sized>(
    map: &M,
    radius: f32,
    candidates: &[(f32, f32)],
) -> Option<(f32, f32)> {
    candidates
        .iter()
        .copied()
        .find(|&(x, y)| !map.is_blocked(x, y, radius))
}

/// 移動を確定する。
///
/// 1. 障害物チェック: `desired` → X のみ → Y のみ → 移動なし
/// 2. 分離: 1 の結果に `push` を足した位置 → X のみ → Y のみ → 分離なし
pub fn resolve_movement<M: ObstacleMap + ?Sized>(
    map: &M,
    from: (f32, f32),
    desired: (f32, f32),
    push: (f32, f32),
    radius: f32,
) -> (f32, f32) {
    let moved = first_free(
        map,
        radius,
        &[desired, (desired.0, from.1), (from.0, desired.1)],
    )
    .unwrap_or(from);

    if push.0 == 0.0 && push.1 == 0.0 {
        return moved;
    }
    let sep = (moved.0 + push.0, moved.1 + push.1);
    first_free(map, radius, &[sep, (sep.0, moved.1), (moved.0, sep.1)]).unwrap_or(moved)
}

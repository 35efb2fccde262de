//! Path: native/game_core/src/physics/obstacle_resolve.rs
//! Summary: 障害物クエリ（ObstacleMap）・空き位置探索・プレイヤー押し出し

use crate::constants::FREE_POSITION_SEARCH_RADIUS;
use super::spatial_hash::CollisionWorld;

/// 地形・障害物の問い合わせ口。マップが無い／無効なら常に false / そのまま を返す。
pub trait ObstacleMap: Sync {
    fn is_obstacle_at(&self, x: f32, y: f32) -> bool;

    /// 半径 `radius` の円が障害物と重なるか
    fn is_blocked(&self, x: f32, y: f32, radius: f32) -> bool {
        let _ = radius;
        self.is_obstacle_at(x, y)
    }

    fn find_nearest_free_position(&self, x: f32, y: f32, size: f32) -> (f32, f32);
}

/// 障害物なしのマップ
#[derive(Clone, Copy, Debug, Default)]
pub struct NoObstacles;

impl ObstacleMap for NoObstacles {
    fn is_obstacle_at(&self, _x: f32, _y: f32) -> bool {
        false
    }

    fn find_nearest_free_position(&self, x: f32, y: f32, _size: f32) -> (f32, f32) {
        (x, y)
    }
}

impl ObstacleMap for CollisionWorld {
    fn is_obstacle_at(&self, x: f32, y: f32) -> bool {
        self.overlaps_circle(x, y, 0.0)
    }

    fn is_blocked(&self, x: f32, y: f32, radius: f32) -> bool {
        self.overlaps_circle(x, y, radius)
    }

    /// 同心リング上を 16 方向ずつ探索する。範囲内に空きが無ければ元の位置を返す。
    fn find_nearest_free_position(&self, x: f32, y: f32, size: f32) -> (f32, f32) {
        if !self.is_blocked(x, y, size) {
            return (x, y);
        }
        const DIRECTIONS: usize = 16;
        let step = size.max(8.0);
        let mut dist = step;
        while dist <= FREE_POSITION_SEARCH_RADIUS {
            for k in 0..DIRECTIONS {
                let angle = k as f32 / DIRECTIONS as f32 * std::f32::consts::TAU;
                let cx = x + angle.cos() * dist;
                let cy = y + angle.sin() * dist;
                if !self.is_blocked(cx, cy, size) {
                    return (cx, cy);
                }
            }
            dist += step;
        }
        log::debug!("no free position near ({x:.0}, {y:.0}) within {FREE_POSITION_SEARCH_RADIUS}");
        (x, y)
    }
}

/// プレイヤー（中心座標）が障害物と重なっている場合に押し出す（複数障害物対応）
pub fn resolve_obstacles_player(
    collision: &CollisionWorld,
    player_x: &mut f32,
    player_y: &mut f32,
    radius: f32,
    buf: &mut Vec<usize>,
) {
    for _ in 0..5 {
        collision.query_static_nearby_into(*player_x, *player_y, radius, buf);
        let mut pushed = false;
        for &idx in buf.iter() {
            if let Some(o) = collision.obstacles.get(idx) {
                let dx = *player_x - o.x;
                let dy = *player_y - o.y;
                let dist = (dx * dx + dy * dy).sqrt();
                let (nx, ny) = if dist > 1e-3 { (dx / dist, dy / dist) } else { (1.0, 0.0) };
                let overlap = (radius + o.radius) - dist;
                if overlap > 0.0 {
                    // 境界ちょうどに止まると次の判定でも重なり扱いになるので僅かに余分に押す
                    *player_x += nx * (overlap + 0.01);
                    *player_y += ny * (overlap + 0.01);
                    pushed = true;
                    break;
                }
            }
        }
        if !pushed {
            break;
        }
    }
}

//! Path: native/game_core/src/util.rs
//! Summary: 経験値計算・カメラビューポート・画面外スポーン位置などの共通ユーティリティ

use crate::constants::{MAP_HEIGHT, MAP_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH, SPAWN_EDGE_MARGIN};
use crate::physics::rng::SimpleRng;

/// 現在の `level` から次のレベルに上がるために必要な累積 EXP を返す。
pub fn exp_required_for_next(level: u32) -> u32 {
    const EXP_TABLE: [u32; 10] = [0, 10, 25, 45, 70, 100, 135, 175, 220, 270];
    let idx = level as usize;
    if idx < EXP_TABLE.len() {
        EXP_TABLE[idx]
    } else {
        270 + (idx as u32 - 9) * 50
    }
}

/// カメラの可視矩形（ワールド座標）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Viewport {
    /// プレイヤー中心のビューポート
    pub fn centered_on(cx: f32, cy: f32) -> Self {
        Self {
            min_x: cx - SCREEN_WIDTH / 2.0,
            min_y: cy - SCREEN_HEIGHT / 2.0,
            max_x: cx + SCREEN_WIDTH / 2.0,
            max_y: cy + SCREEN_HEIGHT / 2.0,
        }
    }

    /// `margin` だけ広げた矩形に点が入るか
    pub fn contains(&self, x: f32, y: f32, margin: f32) -> bool {
        x >= self.min_x - margin
            && x <= self.max_x + margin
            && y >= self.min_y - margin
            && y <= self.max_y + margin
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.min_x + self.max_x) * 0.5, (self.min_y + self.max_y) * 0.5)
    }
}

pub fn clamp_to_world(x: f32, y: f32) -> (f32, f32) {
    (x.clamp(0.0, MAP_WIDTH), y.clamp(0.0, MAP_HEIGHT))
}

/// ビューポートの四辺いずれかの外側（`SPAWN_EDGE_MARGIN` 分）にランダム配置し、ワールド内にクランプする
pub fn spawn_position_outside_viewport(rng: &mut SimpleRng, view: &Viewport) -> (f32, f32) {
    let m = SPAWN_EDGE_MARGIN;
    let (x, y) = match rng.next_below(4) {
        0 => (rng.range_f32(view.min_x, view.max_x), view.min_y - m),
        1 => (rng.range_f32(view.min_x, view.max_x), view.max_y + m),
        2 => (view.min_x - m, rng.range_f32(view.min_y, view.max_y)),
        _ => (view.max_x + m, rng.range_f32(view.min_y, view.max_y)),
    };
    clamp_to_world(x, y)
}

use crate::world::GameWorldInner;
use game_core::constants::{MAP_HEIGHT, MAP_WIDTH};
use game_core::enemy::Facing;
use game_core::physics::obstacle_resolve::resolve_obstacles_player;

/// 入力による移動・障害物押し出し・ワールド境界クランプ・無敵タイマー
pub(crate) fn update_player(w: &mut GameWorldInner, dt: f32) {
    let dx = w.player.input_dx;
    let dy = w.player.input_dy;

    // 斜め移動を正規化して速度を一定に保つ
    let len = (dx * dx + dy * dy).sqrt();
    if len > 0.001 {
        let vx = dx / len * w.player.speed * dt;
        let vy = dy / len * w.player.speed * dt;
        w.player.x += vx;
        w.player.y += vy;
        w.player.facing = Facing::from_dx(vx, w.player.facing);
    }

    let r = w.player.radius;
    resolve_obstacles_player(
        &w.collision,
        &mut w.player.x,
        &mut w.player.y,
        r,
        &mut w.obstacle_query_buf,
    );

    w.player.x = w.player.x.clamp(r, MAP_WIDTH - r);
    w.player.y = w.player.y.clamp(r, MAP_HEIGHT - r);

    if w.player.invincible_timer > 0.0 {
        w.player.invincible_timer = (w.player.invincible_timer - dt).max(0.0);
    }
}

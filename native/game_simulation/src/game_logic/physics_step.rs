//! Path: native/game_simulation/src/game_logic/physics_step.rs
//! Summary: 1 ティック分の更新順序
//!
//! 並列フェーズ（敵移動・敵弾・攻撃移動・当たり候補・パーティクル）はワーカーが
//! スナップショットを読むだけ。変更はすべて各システムの逐次適用ステップで行う。

use super::systems::attacks::update_attacks;
use super::systems::collision::{intercept_projectiles, resolve_attack_hits};
use super::systems::cull::update_culling;
use super::systems::effects::update_particles;
use super::systems::enemy_fire::update_enemy_fire;
use super::systems::leveling::update_leveling;
use super::systems::movement::update_enemy_movement;
use super::systems::player::update_player;
use super::systems::player_damage::resolve_player_hits;
use super::systems::projectiles::update_enemy_projectiles;
use super::systems::spawn::update_spawning;
use super::systems::weapons::update_weapons;
use super::StepContext;
use crate::world::GameWorldInner;

pub(crate) fn physics_step_inner(w: &mut GameWorldInner, ctx: &StepContext<'_>, dt: f32) {
    // trace にしておき、RUST_LOG=trace のときだけ毎ティック出力
    log::trace!("physics_step: dt={:.4}s frame_id={}", dt, w.frame_id);
    let t_start = std::time::Instant::now();

    w.frame_id = w.frame_id.wrapping_add(1);
    w.tick += 1;
    w.elapsed_seconds += dt;
    w.now_ms += dt as f64 * 1000.0;

    update_player(w, dt);

    update_spawning(w, ctx.table, dt);
    w.rebuild_enemy_hash();
    update_enemy_movement(w, ctx, dt);
    update_enemy_fire(w);
    update_enemy_projectiles(w, ctx, dt);
    update_culling(w);

    update_weapons(w);
    update_attacks(w, ctx, dt);

    // 移動後の位置で当たり判定
    w.rebuild_enemy_hash();
    resolve_attack_hits(w, ctx);
    intercept_projectiles(w);
    w.attacks.sweep(w.now_ms);

    resolve_player_hits(w);
    update_leveling(w);

    update_particles(w, ctx, dt);

    ctx.metrics.record_tick(t_start.elapsed(), w.enemies.count);
}

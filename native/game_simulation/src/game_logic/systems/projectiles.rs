use super::super::StepContext;
use crate::scheduler::Phase;
use crate::world::GameWorldInner;
use game_core::constants::{MAP_HEIGHT, MAP_WIDTH};
use game_core::physics::obstacle_resolve::ObstacleMap;

/// 画面外判定のマージン
const OUT_OF_WORLD_MARGIN: f32 = 100.0;

#[derive(Clone, Copy, Debug)]
struct ProjectileStep {
    x:        f32,
    y:        f32,
    lifetime: f32,
    expired:  bool,
}

fn step_projectile(w: &GameWorldInner, i: usize, dt: f32) -> ProjectileStep {
    let p = &w.projectiles;
    let x = p.positions_x[i] + p.velocities_x[i] * dt;
    let y = p.positions_y[i] + p.velocities_y[i] * dt;
    let lifetime = p.lifetime[i] - dt;
    let out = x < -OUT_OF_WORLD_MARGIN
        || x > MAP_WIDTH + OUT_OF_WORLD_MARGIN
        || y < -OUT_OF_WORLD_MARGIN
        || y > MAP_HEIGHT + OUT_OF_WORLD_MARGIN;
    // 障害物に当たった弾は消す
    let expired = lifetime <= 0.0 || out || w.collision.is_blocked(x, y, p.radius[i]);
    ProjectileStep { x, y, lifetime, expired }
}

pub(crate) fn update_enemy_projectiles(w: &mut GameWorldInner, ctx: &StepContext<'_>, dt: f32) {
    let slots = w.projectiles.live_slots();
    let steps = {
        let snapshot = &*w;
        ctx.metrics.time_phase(Phase::ProjectileUpdate, || {
            ctx.scheduler
                .map_phase(Phase::ProjectileUpdate, &slots, |&i| step_projectile(snapshot, i, dt))
        })
    };

    for (&i, s) in slots.iter().zip(steps) {
        w.projectiles.positions_x[i] = s.x;
        w.projectiles.positions_y[i] = s.y;
        w.projectiles.lifetime[i] = s.lifetime;
        if s.expired {
            w.projectiles.kill(i);
        }
    }
}

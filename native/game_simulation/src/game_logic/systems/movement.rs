//! 敵の移動（並列フェーズ）。ワーカーはティック開始時点のスナップショットだけを読み、
//! 結果の適用はスロット順に逐次で行う。

use super::super::StepContext;
use crate::scheduler::Phase;
use crate::world::GameWorldInner;
use game_core::enemy::{movement_intent, Facing};
use game_core::physics::knockback::KnockbackState;
use game_core::physics::separation::{resolve_movement, separation_push, NeighborBody};
use game_core::util::clamp_to_world;

#[derive(Clone, Copy, Debug)]
struct MoveResult {
    x:          f32,
    y:          f32,
    facing:     Facing,
    locked_dir: Option<(f32, f32)>,
    knockback:  KnockbackState,
}

fn step_enemy(w: &GameWorldInner, i: usize, dt: f32, own_cell_only: bool) -> MoveResult {
    let e = &w.enemies;
    let from = (e.positions_x[i], e.positions_y[i]);
    let radius = e.radius[i];
    let mut knockback = e.knockback[i];

    // ノックバック中は通常移動を上書き（障害物は見る）
    if let Some((kx, ky)) = knockback.tick(dt) {
        let (x, y) = resolve_movement(&w.collision, from, (from.0 + kx, from.1 + ky), (0.0, 0.0), radius);
        let (x, y) = clamp_to_world(x, y);
        return MoveResult { x, y, facing: e.facing[i], locked_dir: e.locked_dir[i], knockback };
    }

    let intent = movement_intent(
        e.behavior[i],
        from,
        (w.player.x, w.player.y),
        e.speed[i],
        dt,
        e.locked_dir[i],
        e.band[i],
    );
    let desired = (from.0 + intent.dx, from.1 + intent.dy);

    let mut ids = Vec::new();
    w.enemy_hash.query_neighborhood_into(desired.0, desired.1, own_cell_only, &mut ids);
    let neighbors: Vec<NeighborBody> = ids
        .iter()
        .filter(|&&j| j != i && e.alive[j])
        .map(|&j| NeighborBody {
            x:       e.positions_x[j],
            y:       e.positions_y[j],
            radius:  e.radius[j],
            is_boss: e.is_boss[j],
        })
        .collect();
    let push = separation_push(desired.0, desired.1, radius, e.is_boss[i], &neighbors);

    let (x, y) = resolve_movement(&w.collision, from, desired, push, radius);
    let (x, y) = clamp_to_world(x, y);
    MoveResult {
        x,
        y,
        facing: Facing::from_dx(x - from.0, e.facing[i]),
        locked_dir: intent.locked_dir,
        knockback,
    }
}

pub(crate) fn update_enemy_movement(w: &mut GameWorldInner, ctx: &StepContext<'_>, dt: f32) {
    let slots = w.enemies.live_slots();
    let own_cell_only = w.high_load();
    let results = {
        let snapshot = &*w;
        ctx.metrics.time_phase(Phase::EnemyMovement, || {
            ctx.scheduler
                .map_phase(Phase::EnemyMovement, &slots, |&i| step_enemy(snapshot, i, dt, own_cell_only))
        })
    };

    let e = &mut w.enemies;
    for (&i, r) in slots.iter().zip(results) {
        e.positions_x[i] = r.x;
        e.positions_y[i] = r.y;
        e.facing[i] = r.facing;
        e.locked_dir[i] = r.locked_dir;
        e.knockback[i] = r.knockback;
        if e.hit_flash[i] > 0.0 {
            e.hit_flash[i] = (e.hit_flash[i] - dt).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::frame_metrics::FrameMetrics;
    use crate::scheduler::ConcurrencyScheduler;
    use game_core::entity_params::{ArchetypeTable, EnemyParams};
    use game_core::physics::obstacle_resolve::ObstacleMap;
    use game_core::physics::spatial_hash::StaticObstacle;

    fn setup() -> (GameWorldInner, ArchetypeTable) {
        let table = ArchetypeTable::default();
        (GameWorldInner::new(&SimConfig::default(), &table), table)
    }

    fn chaser(speed: f32) -> EnemyParams {
        EnemyParams { speed, ..EnemyParams::fallback(1) }
    }

    #[test]
    fn chaser_closes_in_on_the_player() {
        let (mut w, table) = setup();
        let (px, py) = (w.player.x, w.player.y);
        let i = w.enemies.spawn(&chaser(100.0), false, px + 300.0, py, 0.0);
        w.rebuild_enemy_hash();
        let scheduler = ConcurrencyScheduler::sequential();
        let metrics = FrameMetrics::default();
        let ctx = StepContext { table: &table, scheduler: &scheduler, metrics: &metrics };
        update_enemy_movement(&mut w, &ctx, 0.5);
        assert!((w.enemies.positions_x[i] - (px + 250.0)).abs() < 1e-3);
        assert_eq!(w.enemies.facing[i], Facing::Left);
    }

    #[test]
    fn knockback_overrides_movement() {
        let (mut w, table) = setup();
        let (px, py) = (w.player.x, w.player.y);
        let i = w.enemies.spawn(&chaser(100.0), false, px + 300.0, py, 0.0);
        assert!(w.enemies.knockback[i].try_apply(px, py, px + 300.0, py, 200.0));
        w.rebuild_enemy_hash();
        let scheduler = ConcurrencyScheduler::sequential();
        let metrics = FrameMetrics::default();
        let ctx = StepContext { table: &table, scheduler: &scheduler, metrics: &metrics };
        update_enemy_movement(&mut w, &ctx, 0.05);
        // 離れる方向に押される（向きは変えない）
        assert!(w.enemies.positions_x[i] > px + 300.0);
        assert_eq!(w.enemies.facing[i], Facing::Right);
    }

    #[test]
    fn knockback_cannot_push_through_an_obstacle() {
        let (mut w, table) = setup();
        let (px, py) = (w.player.x, w.player.y);
        let still = chaser(0.0);
        let i = w.enemies.spawn(&still, false, px + 300.0, py, 0.0);
        let r = w.enemies.radius[i];
        // 押し出し方向（+x）をふさぐ岩
        let rock = StaticObstacle { x: px + 360.0, y: py, radius: 30.0, kind: 0 };
        w.set_obstacles(&[rock]);
        assert!(w.enemies.knockback[i].try_apply(px, py, px + 300.0, py, 2000.0));

        let scheduler = ConcurrencyScheduler::sequential();
        let metrics = FrameMetrics::default();
        let ctx = StepContext { table: &table, scheduler: &scheduler, metrics: &metrics };
        while w.enemies.knockback[i].is_active() {
            w.rebuild_enemy_hash();
            update_enemy_movement(&mut w, &ctx, 0.05);
            let (x, y) = (w.enemies.positions_x[i], w.enemies.positions_y[i]);
            assert!(!w.collision.is_blocked(x, y, r), "enemy entered the obstacle at ({x}, {y})");
            assert!(x < rock.x);
        }
    }

    #[test]
    fn overlapping_enemies_are_pushed_apart() {
        let (mut w, table) = setup();
        let (px, py) = (w.player.x, w.player.y);
        let still = chaser(0.0);
        let a = w.enemies.spawn(&still, false, px + 400.0, py, 0.0);
        let b = w.enemies.spawn(&still, false, px + 405.0, py, 0.0);
        w.rebuild_enemy_hash();
        let scheduler = ConcurrencyScheduler::sequential();
        let metrics = FrameMetrics::default();
        let ctx = StepContext { table: &table, scheduler: &scheduler, metrics: &metrics };
        update_enemy_movement(&mut w, &ctx, 0.016);
        let gap = w.enemies.positions_x[b] - w.enemies.positions_x[a];
        assert!(gap > 5.0);
    }
}

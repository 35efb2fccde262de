use crate::world::{FrameEvent, GameWorldInner};
use game_core::constants::CULL_PROTECT_MARGIN;
use game_core::entity_params::ArchetypeTable;
use game_core::physics::obstacle_resolve::ObstacleMap;
use game_core::spawn::{plan_admission, population_cap, SpawnRequest};
use game_core::util::spawn_position_outside_viewport;

pub(crate) fn update_spawning(w: &mut GameWorldInner, table: &ArchetypeTable, dt: f32) {
    let requests = w.spawn.decide_spawns(w.elapsed_seconds, dt, table, &mut w.rng);
    if !requests.is_empty() {
        admit_spawns(w, table, &requests);
    }
}

/// 画面外のランダムな端に置き、障害物と重なっていれば近くの空きへずらす
pub(crate) fn place_offscreen(w: &mut GameWorldInner, radius: f32) -> (f32, f32) {
    let view = w.viewport();
    let (x, y) = spawn_position_outside_viewport(&mut w.rng, &view);
    w.collision.find_nearest_free_position(x, y, radius)
}

/// ボスは上限の対象外。通常敵は上限に収まるよう画面外の遠い敵から退去させ、
/// それでも足りなければバッチを削る。生成したスロットを返す。
pub(crate) fn admit_spawns(
    w: &mut GameWorldInner,
    table: &ArchetypeTable,
    requests: &[SpawnRequest],
) -> Vec<usize> {
    let mut spawned = Vec::with_capacity(requests.len());
    let (bosses, normals): (Vec<&SpawnRequest>, Vec<&SpawnRequest>) =
        requests.iter().partition(|r| r.is_boss);

    for r in bosses {
        spawned.push(spawn_boss(w, table, r.archetype_id));
    }
    if normals.is_empty() {
        return spawned;
    }

    let cap = population_cap(w.base_cap, w.cap_per_level, w.player.level);
    let view = w.viewport();
    let (px, py) = (w.player.x, w.player.y);
    let offscreen: Vec<(usize, f32)> = (0..w.enemies.len())
        .filter(|&i| w.enemies.alive[i] && !w.enemies.is_boss[i])
        .filter(|&i| !view.contains(w.enemies.positions_x[i], w.enemies.positions_y[i], CULL_PROTECT_MARGIN))
        .map(|i| {
            let dx = w.enemies.positions_x[i] - px;
            let dy = w.enemies.positions_y[i] - py;
            (i, dx * dx + dy * dy)
        })
        .collect();

    let plan = plan_admission(normals.len(), w.enemies.live_non_boss(), cap, &offscreen);
    for &slot in &plan.evict {
        w.remove_enemy(slot);
    }
    if !plan.evict.is_empty() {
        log::debug!("evicted {} off-screen enemies to make room (cap={cap})", plan.evict.len());
    }
    if plan.admit < normals.len() {
        log::debug!("population cap {cap} reached; trimmed batch {} -> {}", normals.len(), plan.admit);
    }

    for r in normals.into_iter().take(plan.admit) {
        let params = table.stats(r.archetype_id);
        let (x, y) = place_offscreen(w, params.radius);
        spawned.push(w.enemies.spawn(params, false, x, y, w.elapsed_seconds));
    }
    spawned
}

fn spawn_boss(w: &mut GameWorldInner, table: &ArchetypeTable, id: u16) -> usize {
    let params = table.stats(id);
    let (x, y) = place_offscreen(w, params.radius);
    let i = w.enemies.spawn(params, true, x, y, w.elapsed_seconds);
    log::info!("boss {} ({}) spawned at ({x:.0}, {y:.0}), t={:.1}s", id, params.name, w.elapsed_seconds);
    w.frame_events.push(FrameEvent::BossSpawned { archetype_id: id });
    w.frame_events.push(FrameEvent::PlaySound { name: "boss_spawn" });
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use game_core::constants::{MAP_HEIGHT, MAP_WIDTH};

    fn world(base_cap: usize) -> (GameWorldInner, ArchetypeTable) {
        let table = ArchetypeTable::default();
        let mut config = SimConfig::default();
        config.spawn.base_cap = base_cap;
        config.spawn.cap_per_level = 0;
        (GameWorldInner::new(&config, &table), table)
    }

    fn normal(id: u16) -> SpawnRequest {
        SpawnRequest { archetype_id: id, is_boss: false }
    }

    #[test]
    fn normals_land_off_screen() {
        let (mut w, table) = world(100);
        let slots = admit_spawns(&mut w, &table, &[normal(1), normal(2), normal(1)]);
        assert_eq!(slots.len(), 3);
        let view = w.viewport();
        for i in slots {
            assert!(!view.contains(w.enemies.positions_x[i], w.enemies.positions_y[i], 0.0));
        }
    }

    #[test]
    fn batch_is_trimmed_when_nothing_can_be_evicted() {
        let (mut w, table) = world(2);
        let (cx, cy) = (MAP_WIDTH / 2.0, MAP_HEIGHT / 2.0);
        w.enemies.spawn(table.stats(1), false, cx + 10.0, cy, 0.0);
        let slots = admit_spawns(&mut w, &table, &[normal(1), normal(1), normal(1)]);
        assert_eq!(slots.len(), 1);
        assert_eq!(w.enemies.live_non_boss(), 2);
    }

    #[test]
    fn bosses_ignore_the_cap() {
        let (mut w, table) = world(0);
        let boss = table.bosses[0].stats.id;
        let slots = admit_spawns(
            &mut w,
            &table,
            &[SpawnRequest { archetype_id: boss, is_boss: true }, normal(1)],
        );
        assert_eq!(slots.len(), 1);
        assert!(w.enemies.is_boss[slots[0]]);
        assert!(w.frame_events.contains(&FrameEvent::BossSpawned { archetype_id: boss }));
    }
}

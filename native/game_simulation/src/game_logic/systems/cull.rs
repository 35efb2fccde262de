use super::spawn::place_offscreen;
use crate::world::GameWorldInner;
use game_core::constants::{BOSS_RESPAWN_DISTANCE, CULL_PROTECT_MARGIN};

/// 遠く離れた敵・寿命切れの敵を消す。ボスは消さずに画面外の別の端へ置き直す（hp はそのまま）。
/// 再補充の借りは距離で消した分だけ。寿命切れは役目を終えたものとして補充しない。
/// 消した数を返す。
pub(crate) fn update_culling(w: &mut GameWorldInner) -> usize {
    let view = w.viewport();
    let (px, py) = (w.player.x, w.player.y);
    let now = w.elapsed_seconds;
    let mut culled = 0;
    let mut owed = 0;

    for i in 0..w.enemies.len() {
        if !w.enemies.alive[i] {
            continue;
        }
        let (ex, ey) = (w.enemies.positions_x[i], w.enemies.positions_y[i]);
        let dx = ex - px;
        let dy = ey - py;
        let dist2 = dx * dx + dy * dy;

        if w.enemies.is_boss[i] {
            if dist2 > BOSS_RESPAWN_DISTANCE * BOSS_RESPAWN_DISTANCE {
                let (nx, ny) = place_offscreen(w, w.enemies.radius[i]);
                log::debug!(
                    "boss {} drifted {:.0} away; moved to ({nx:.0}, {ny:.0})",
                    w.enemies.archetype_id[i],
                    dist2.sqrt()
                );
                w.enemies.positions_x[i] = nx;
                w.enemies.positions_y[i] = ny;
                w.enemies.locked_dir[i] = None;
            }
            continue;
        }

        let behavior = w.enemies.behavior[i];
        let expired = behavior
            .max_lifetime_secs()
            .is_some_and(|max| now - w.enemies.spawn_secs[i] >= max);
        let too_far = !view.contains(ex, ey, CULL_PROTECT_MARGIN)
            && dist2 > behavior.cull_distance() * behavior.cull_distance();
        if expired || too_far {
            w.remove_enemy(i);
            culled += 1;
            if too_far {
                owed += 1;
            }
        }
    }

    if culled > 0 {
        log::trace!("culled {culled} enemies ({owed} owed)");
        w.spawn.add_repopulation_debt(owed);
    }
    culled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use game_core::enemy::Behavior;
    use game_core::entity_params::{ArchetypeTable, EnemyParams};

    fn world() -> GameWorldInner {
        GameWorldInner::new(&SimConfig::default(), &ArchetypeTable::default())
    }

    #[test]
    fn far_off_screen_enemies_are_culled_and_owed() {
        let mut w = world();
        let (px, py) = (w.player.x, w.player.y);
        let far = w.enemies.spawn(&EnemyParams::fallback(1), false, px + 1500.0, py, 0.0);
        let near = w.enemies.spawn(&EnemyParams::fallback(1), false, px + 100.0, py, 0.0);
        assert_eq!(update_culling(&mut w), 1);
        assert!(!w.enemies.alive[far]);
        assert!(w.enemies.alive[near]);
        assert_eq!(w.spawn.repopulation_debt(), 1);
    }

    #[test]
    fn rushers_expire_even_on_screen() {
        let mut w = world();
        let (px, py) = (w.player.x, w.player.y);
        let rush = EnemyParams { behavior: Behavior::RushThrough, ..EnemyParams::fallback(2) };
        let i = w.enemies.spawn(&rush, false, px + 50.0, py, 0.0);
        w.elapsed_seconds = 14.9;
        update_culling(&mut w);
        assert!(w.enemies.alive[i]);
        w.elapsed_seconds = 15.0;
        assert_eq!(update_culling(&mut w), 1);
        assert!(!w.enemies.alive[i]);
        // 寿命切れは補充しない
        assert_eq!(w.spawn.repopulation_debt(), 0);
    }

    #[test]
    fn bosses_are_relocated_not_culled() {
        let mut w = world();
        let (px, py) = (w.player.x, w.player.y);
        let i = w.enemies.spawn(&EnemyParams::fallback(101), true, px + 1500.0, py + 1000.0, 0.0);
        w.enemies.hp[i] = 7;
        assert_eq!(update_culling(&mut w), 0);
        assert!(w.enemies.alive[i]);
        assert_eq!(w.enemies.hp[i], 7);
        let dx = w.enemies.positions_x[i] - px;
        let dy = w.enemies.positions_y[i] - py;
        assert!((dx * dx + dy * dy).sqrt() < BOSS_RESPAWN_DISTANCE);
        assert!(!w.viewport().contains(w.enemies.positions_x[i], w.enemies.positions_y[i], 0.0));
    }
}

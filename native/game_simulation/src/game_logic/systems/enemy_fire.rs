use crate::world::GameWorldInner;
use game_core::attack::TIME_EPSILON_MS;
use game_core::enemy::projectile_velocities;

/// 射撃持ちの敵がレンジ内かつクールダウン明けなら弾を撃つ
pub(crate) fn update_enemy_fire(w: &mut GameWorldInner) {
    let now = w.now_ms;
    let (px, py) = (w.player.x, w.player.y);
    for i in 0..w.enemies.len() {
        if !w.enemies.alive[i] {
            continue;
        }
        let Some(proj) = w.enemies.projectile[i] else {
            continue;
        };
        let (ex, ey) = (w.enemies.positions_x[i], w.enemies.positions_y[i]);
        let dx = px - ex;
        let dy = py - ey;
        let range = w.enemies.behavior[i].fire_range(w.enemies.band[i]);
        if dx * dx + dy * dy > range * range {
            continue;
        }
        if let Some(last) = w.enemies.last_attack_ms[i] {
            if now - last + TIME_EPSILON_MS < w.enemies.attack_cooldown_ms[i] {
                continue;
            }
        }
        w.enemies.last_attack_ms[i] = Some(now);

        let from_boss = w.enemies.is_boss[i];
        for (vx, vy) in projectile_velocities(proj.pattern, (ex, ey), (px, py), proj.speed) {
            w.projectiles.spawn(ex, ey, vx, vy, proj.damage, from_boss);
        }
    }
}

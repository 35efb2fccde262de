use super::effects::{HURT_COLOR, HURT_PARTICLES};
use crate::world::{FrameEvent, GameWorldInner};
use game_core::constants::INVINCIBLE_DURATION;

/// プレイヤーへのダメージ。無敵中・死亡後は無視、回避判定 → 防御で軽減（最低 1）→ 無敵時間。
/// 実際に受けたダメージを返す。`raw` が 0 以下（無害な接触）は何もしない。
pub(crate) fn damage_player(w: &mut GameWorldInner, raw: i32) -> i32 {
    if raw <= 0 || w.player.is_dead() || w.player.invincible_timer > 0.0 {
        return 0;
    }
    let (px, py) = (w.player.x, w.player.y);
    if w.rng.chance(w.player.avoidance) {
        w.frame_events.push(FrameEvent::Evaded { x: px, y: py });
        return 0;
    }

    let damage = (raw - w.player.defense).max(1);
    w.player.hp = (w.player.hp - damage).max(0);
    w.player.invincible_timer = INVINCIBLE_DURATION;
    w.frame_events.push(FrameEvent::PlayerDamaged { damage });
    w.frame_events.push(FrameEvent::DamageNumber { x: px, y: py, amount: damage, to_player: true });
    w.frame_events.push(FrameEvent::PlaySound { name: "player_hurt" });
    w.particles.emit(px, py, HURT_PARTICLES, HURT_COLOR);

    if w.player.is_dead() {
        log::info!(
            "player died at t={:.1}s (level {}, kills {})",
            w.elapsed_seconds,
            w.player.level,
            w.kill_count
        );
        w.frame_events.push(FrameEvent::PlayerDied);
    }
    damage
}

/// 接触ダメージと敵弾。敵弾は当たった時点で消える（無敵中でも）。
pub(crate) fn resolve_player_hits(w: &mut GameWorldInner) {
    let (px, py, pr) = (w.player.x, w.player.y, w.player.radius);

    let mut ids = Vec::new();
    w.enemy_hash.query_nearby_into(px, py, pr + w.enemies.widest_radius(), &mut ids);
    ids.sort_unstable();
    for i in ids {
        if !w.enemies.alive[i] {
            continue;
        }
        let dx = w.enemies.positions_x[i] - px;
        let dy = w.enemies.positions_y[i] - py;
        let reach = pr + w.enemies.radius[i];
        if dx * dx + dy * dy <= reach * reach {
            let d = w.enemies.contact_damage[i];
            damage_player(w, d);
        }
    }

    for i in 0..w.projectiles.len() {
        if !w.projectiles.alive[i] {
            continue;
        }
        let dx = w.projectiles.positions_x[i] - px;
        let dy = w.projectiles.positions_y[i] - py;
        let reach = pr + w.projectiles.radius[i];
        if dx * dx + dy * dy <= reach * reach {
            let d = w.projectiles.damage[i];
            w.projectiles.kill(i);
            damage_player(w, d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlayerConfig, SimConfig};
    use game_core::entity_params::{ArchetypeTable, EnemyParams};

    fn world(defense: i32, avoidance: f32) -> GameWorldInner {
        let config = SimConfig {
            player: PlayerConfig { defense, avoidance, ..PlayerConfig::default() },
            ..SimConfig::default()
        };
        GameWorldInner::new(&config, &ArchetypeTable::default())
    }

    #[test]
    fn defense_never_reduces_below_one() {
        let mut w = world(50, 0.0);
        assert_eq!(damage_player(&mut w, 0), 0);
        assert_eq!(w.player.invincible_timer, 0.0);
        assert_eq!(damage_player(&mut w, 10), 1);
        assert!(w.player.invincible_timer > 0.0);
        // 無敵中は無視
        assert_eq!(damage_player(&mut w, 10), 0);
    }

    #[test]
    fn evasion_grants_no_invincibility() {
        let mut w = world(0, 1.0);
        assert_eq!(damage_player(&mut w, 10), 0);
        assert_eq!(w.player.invincible_timer, 0.0);
        assert_eq!(w.player.hp, w.player.max_hp);
        assert_eq!(w.frame_events, vec![FrameEvent::Evaded { x: w.player.x, y: w.player.y }]);
    }

    #[test]
    fn lethal_damage_emits_player_died_once() {
        let mut w = world(0, 0.0);
        w.player.hp = 3;
        damage_player(&mut w, 10);
        assert_eq!(w.player.hp, 0);
        w.player.invincible_timer = 0.0;
        damage_player(&mut w, 10);
        let died = w.frame_events.iter().filter(|e| **e == FrameEvent::PlayerDied).count();
        assert_eq!(died, 1);
    }

    #[test]
    fn touching_enemies_and_projectiles_hurt() {
        let mut w = world(0, 0.0);
        let (px, py) = (w.player.x, w.player.y);
        let e = EnemyParams { contact_damage: 7, ..EnemyParams::fallback(1) };
        w.enemies.spawn(&e, false, px + 10.0, py, 0.0);
        w.rebuild_enemy_hash();
        let proj = w.projectiles.spawn(px, py + 5.0, 0.0, 0.0, 4, false);
        resolve_player_hits(&mut w);
        // 接触で無敵になるので弾は消えるだけ
        assert_eq!(w.player.hp, w.player.max_hp - 7);
        assert!(!w.projectiles.alive[proj]);
    }

    #[test]
    fn wide_boss_touching_the_player_hurts() {
        let mut w = world(0, 0.0);
        let (px, py) = (w.player.x, w.player.y);
        let boss = EnemyParams { radius: 260.0, contact_damage: 9, ..EnemyParams::fallback(101) };
        // 中心は 3 セル先だが半径で重なっている
        w.enemies.spawn(&boss, true, px + 250.0, py, 0.0);
        w.rebuild_enemy_hash();
        resolve_player_hits(&mut w);
        assert_eq!(w.player.hp, w.player.max_hp - 9);
    }
}

//! 攻撃 → 敵 の当たり判定。
//!
//! 候補探索（読み取りのみ）は CollisionCheck フェーズで並列化し、ダメージ・撃破などの
//! 変更は攻撃の登録順 → 候補の距離順で逐次に適用する。

use super::super::StepContext;
use super::effects::{BOSS_KILL_PARTICLES, KILL_PARTICLES};
use crate::scheduler::Phase;
use crate::world::{FrameEvent, GameWorldInner, LootEvent};
use game_core::attack::AttackInstance;
use game_core::constants::{DAMAGE_JITTER, HIT_FLASH_DURATION};
use game_core::weapon::WeaponKind;

/// 攻撃 1 つ分の候補（距離の近い順、同距離は uid 順）
fn hit_candidates(w: &GameWorldInner, a: &AttackInstance) -> Vec<usize> {
    let e = &w.enemies;
    let mut ids = Vec::new();
    let r = (a.half_w * a.half_w + a.half_h * a.half_h).sqrt() + e.widest_radius();
    w.enemy_hash.query_nearby_into(a.x, a.y, r, &mut ids);
    let now = w.now_ms;

    let mut found: Vec<(f32, u32, usize)> = ids
        .into_iter()
        .filter(|&i| e.alive[i])
        .filter(|&i| a.overlaps_circle(e.positions_x[i], e.positions_y[i], e.radius[i]))
        .filter(|&i| a.can_hit(e.uid[i], now))
        .map(|i| {
            let dx = e.positions_x[i] - a.x;
            let dy = e.positions_y[i] - a.y;
            (dx * dx + dy * dy, e.uid[i], i)
        })
        .collect();
    found.sort_by(|l, r| l.0.total_cmp(&r.0).then(l.1.cmp(&r.1)));
    found.into_iter().map(|(_, _, i)| i).collect()
}

pub(crate) fn resolve_attack_hits(w: &mut GameWorldInner, ctx: &StepContext<'_>) {
    let now = w.now_ms;
    let active: Vec<usize> = (0..w.attacks.len())
        .filter(|&k| w.attacks.attacks[k].is_active(now))
        .collect();
    if active.is_empty() || w.enemies.is_empty() {
        return;
    }

    let candidates = {
        let snapshot = &*w;
        ctx.metrics.time_phase(Phase::CollisionCheck, || {
            ctx.scheduler.map_phase(Phase::CollisionCheck, &active, |&k| {
                hit_candidates(snapshot, &snapshot.attacks.attacks[k])
            })
        })
    };

    for (&k, slots) in active.iter().zip(candidates) {
        for slot in slots {
            if !w.attacks.attacks[k].alive {
                break;
            }
            // 先に処理した攻撃で倒れている
            if !w.enemies.alive[slot] {
                continue;
            }
            if apply_hit(w, k, slot) && !w.attacks.attacks[k].hit_policy.is_penetrating() {
                break;
            }
        }
    }
}

/// 1 回分のヒット処理。回避されたら false（攻撃は消費されない）。
fn apply_hit(w: &mut GameWorldInner, k: usize, slot: usize) -> bool {
    let now = w.now_ms;
    let uid = w.enemies.uid[slot];
    let (ex, ey) = (w.enemies.positions_x[slot], w.enemies.positions_y[slot]);

    let avoidance = w.enemies.avoidance[slot];
    if avoidance > 0.0 && w.rng.chance(avoidance) {
        // 回避も同じ敵への再判定を止める
        w.attacks.attacks[k].hits.insert(uid, now);
        w.frame_events.push(FrameEvent::Evaded { x: ex, y: ey });
        return false;
    }

    let jitter = 1.0 + w.rng.range_f32(-DAMAGE_JITTER, DAMAGE_JITTER);
    let attack = &mut w.attacks.attacks[k];
    let damage = ((attack.damage as f32 * jitter).round() as i32).max(1);
    attack.record_hit(uid, now);
    let (weapon, ax, ay, knockback) = (attack.weapon, attack.x, attack.y, attack.knockback);

    let dealt = damage.min(w.enemies.hp[slot]);
    *w.weapon_damage.entry(weapon).or_insert(0) += dealt.max(0) as u64;
    let died = w.enemies.apply_damage(slot, damage);
    w.enemies.hit_flash[slot] = HIT_FLASH_DURATION;
    w.frame_events.push(FrameEvent::DamageNumber { x: ex, y: ey, amount: damage, to_player: false });

    // ボスはノックバック無効
    if !w.enemies.is_boss[slot] && knockback > 0.0 {
        w.enemies.knockback[slot].try_apply(ax, ay, ex, ey, knockback);
    }

    if weapon == WeaponKind::Garlic {
        let heal = w
            .player
            .weapon_slots
            .iter_mut()
            .find(|s| s.kind == WeaponKind::Garlic)
            .and_then(|s| s.try_heal(now));
        if let Some(amount) = heal {
            w.player.heal(amount);
        }
    }

    if died {
        kill_enemy(w, slot, Some(weapon));
    }
    true
}

/// 撃破: ライブ集合と空間ハッシュから即座に外し、経験値・イベント・ドロップ通知を出す
pub(crate) fn kill_enemy(w: &mut GameWorldInner, slot: usize, weapon: Option<WeaponKind>) {
    if !w.enemies.alive[slot] {
        return;
    }
    let (x, y) = (w.enemies.positions_x[slot], w.enemies.positions_y[slot]);
    let archetype_id = w.enemies.archetype_id[slot];
    let is_boss = w.enemies.is_boss[slot];
    let color = w.enemies.color[slot];

    w.remove_enemy(slot);
    w.kill_count += 1;
    w.player.exp += w.enemies.exp_reward[slot];

    w.frame_events.push(FrameEvent::EnemyKilled { archetype_id, weapon, is_boss });
    w.frame_events.push(FrameEvent::PlaySound { name: "enemy_death" });
    if is_boss {
        w.bosses_defeated += 1;
        log::info!("boss {archetype_id} defeated at t={:.1}s", w.elapsed_seconds);
        w.frame_events.push(FrameEvent::BossDefeated { archetype_id });
    }
    w.loot.push(LootEvent { x, y, color, archetype_id, is_boss });
    let n = if is_boss { BOSS_KILL_PARTICLES } else { KILL_PARTICLES };
    w.particles.emit(x, y, n, color);
}

/// プレイヤーの攻撃で敵弾を相殺する（ボス弾は対象外）
pub(crate) fn intercept_projectiles(w: &mut GameWorldInner) {
    if w.projectiles.is_empty() {
        return;
    }
    let now = w.now_ms;
    for a in w.attacks.attacks.iter_mut() {
        if !a.is_active(now) {
            continue;
        }
        for i in 0..w.projectiles.len() {
            if !w.projectiles.alive[i] || w.projectiles.from_boss[i] {
                continue;
            }
            if a.overlaps_circle(w.projectiles.positions_x[i], w.projectiles.positions_y[i], w.projectiles.radius[i]) {
                w.projectiles.kill(i);
                if !a.hit_policy.is_penetrating() {
                    a.alive = false;
                    break;
                }
            }
        }
    }
}

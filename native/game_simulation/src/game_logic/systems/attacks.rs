use super::super::StepContext;
use crate::scheduler::Phase;
use crate::world::GameWorldInner;
use game_core::attack::MotionContext;
use rustc_hash::FxHashMap;

/// 攻撃判定の移動（並列フェーズ）。Strike の追跡先は uid で引く。
pub(crate) fn update_attacks(w: &mut GameWorldInner, ctx: &StepContext<'_>, dt: f32) {
    if w.attacks.is_empty() {
        return;
    }
    let e = &w.enemies;
    let positions: FxHashMap<u32, (f32, f32)> = (0..e.len())
        .filter(|&i| e.alive[i])
        .map(|i| (e.uid[i], (e.positions_x[i], e.positions_y[i])))
        .collect();

    let steps = {
        let motion = MotionContext {
            now_ms:    w.now_ms,
            dt,
            wielder:   (w.player.x, w.player.y),
            bounds:    w.viewport(),
            obstacles: &w.collision,
        };
        let attacks = &w.attacks.attacks;
        ctx.metrics.time_phase(Phase::AttackUpdate, || {
            ctx.scheduler.map_phase(Phase::AttackUpdate, attacks, |a| {
                a.step(&motion, |uid| positions.get(&uid).copied())
            })
        })
    };

    for (a, s) in w.attacks.attacks.iter_mut().zip(steps) {
        a.apply_step(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::frame_metrics::FrameMetrics;
    use crate::scheduler::ConcurrencyScheduler;
    use game_core::attack::{AttackInstance, AttackMotion, HitPolicy};
    use game_core::entity_params::ArchetypeTable;
    use game_core::weapon::WeaponKind;

    #[test]
    fn follow_attacks_track_the_player() {
        let table = ArchetypeTable::default();
        let mut w = GameWorldInner::new(&SimConfig::default(), &table);
        let scheduler = ConcurrencyScheduler::sequential();
        let metrics = FrameMetrics::default();
        let ctx = StepContext { table: &table, scheduler: &scheduler, metrics: &metrics };

        w.attacks.push(AttackInstance::new(
            WeaponKind::Garlic, 0.0, 0.0, 50.0, 50.0, 5, 0.0, 0.0, 1000.0,
            HitPolicy::Persistent { retrigger_ms: 200.0 },
            AttackMotion::FollowWielder { offset_x: 10.0, offset_y: 0.0 },
        ));
        w.player.x += 7.0;
        update_attacks(&mut w, &ctx, 0.016);
        let a = &w.attacks.attacks[0];
        assert_eq!((a.x, a.y), (w.player.x + 10.0, w.player.y));
    }

    #[test]
    fn strike_follows_its_target_until_impact() {
        let table = ArchetypeTable::default();
        let mut w = GameWorldInner::new(&SimConfig::default(), &table);
        let scheduler = ConcurrencyScheduler::sequential();
        let metrics = FrameMetrics::default();
        let ctx = StepContext { table: &table, scheduler: &scheduler, metrics: &metrics };

        let i = w.enemies.spawn(table.stats(1), false, 500.0, 500.0, 0.0);
        let uid = w.enemies.uid[i];
        w.attacks.push(AttackInstance::new(
            WeaponKind::Lightning, 500.0, 500.0, 40.0, 40.0, 10, 0.0, 0.0, 400.0,
            HitPolicy::OneShot { penetrating: true },
            AttackMotion::Strike { target_uid: Some(uid), target_x: 500.0, target_y: 500.0, fall_ms: 300.0, impacted: false },
        ));
        w.enemies.positions_x[i] = 540.0;
        update_attacks(&mut w, &ctx, 0.016);
        assert_eq!(w.attacks.attacks[0].x, 540.0);
        assert!(!w.attacks.attacks[0].is_active(w.now_ms));
    }
}

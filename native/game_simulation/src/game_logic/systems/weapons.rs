use crate::world::GameWorldInner;
use game_core::weapon::{TargetView, WielderState};

/// 全スロットを発射判定し、生成された攻撃をワールドに登録する
pub(crate) fn update_weapons(w: &mut GameWorldInner) {
    if w.player.weapon_slots.is_empty() || w.player.is_dead() {
        return;
    }
    let e = &w.enemies;
    let targets: Vec<TargetView> = (0..e.len())
        .filter(|&i| e.alive[i])
        .map(|i| TargetView { uid: e.uid[i], x: e.positions_x[i], y: e.positions_y[i] })
        .collect();
    let wielder = WielderState {
        x:      w.player.x,
        y:      w.player.y,
        facing: w.player.facing,
        aim:    w.player.aim,
        now_ms: w.now_ms,
    };
    let mods = w.player.modifiers;

    for slot in w.player.weapon_slots.iter_mut() {
        let fired = slot.fire(&wielder, &mods, &targets, &mut w.rng);
        if !fired.is_empty() {
            log::trace!("{} lv{} fired {} attacks", slot.kind.name(), slot.level, fired.len());
            w.attacks.extend(fired);
        }
    }
}

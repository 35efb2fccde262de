use crate::world::{FrameEvent, GameWorldInner, PlayerState};
use game_core::constants::{MAX_WEAPON_LEVEL, MAX_WEAPON_SLOTS};
use game_core::util::exp_required_for_next;
use game_core::weapon::{WeaponKind, ALL_WEAPONS};

/// 累積経験値が閾値を超えている間レベルを上げる（1 ティックで複数回もありうる）
pub(crate) fn update_leveling(w: &mut GameWorldInner) {
    while w.player.exp >= exp_required_for_next(w.player.level) {
        w.player.level += 1;
        log::debug!("level up -> {} (exp {})", w.player.level, w.player.exp);
        w.frame_events.push(FrameEvent::LevelUp { new_level: w.player.level });
        w.frame_events.push(FrameEvent::PlaySound { name: "level_up" });
    }
}

/// レベルアップ時の武器候補（未所持優先 → 低レベル順、最大レベルは除外、最大 3 つ）
pub fn compute_weapon_choices(player: &PlayerState) -> Vec<WeaponKind> {
    let slots_full = player.weapon_slots.len() >= MAX_WEAPON_SLOTS;
    let mut choices: Vec<(i32, WeaponKind)> = ALL_WEAPONS
        .iter()
        .filter_map(|&kind| {
            let lv = player.weapon_level(kind);
            if lv >= MAX_WEAPON_LEVEL || (lv == 0 && slots_full) {
                return None;
            }
            let sort_key = if lv == 0 { -1 } else { lv as i32 };
            Some((sort_key, kind))
        })
        .collect();

    choices.sort_by_key(|&(k, kind)| (k, kind));
    choices.into_iter().take(3).map(|(_, kind)| kind).collect()
}

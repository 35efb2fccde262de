//! Path: native/game_simulation/src/game_logic/events.rs
//! Summary: フレームイベント・ドロップ通知の drain

use crate::world::{FrameEvent, GameWorldInner, LootEvent};

/// 溜まったフレームイベントを発生順に取り出す
pub(crate) fn drain_frame_events_inner(w: &mut GameWorldInner) -> Vec<FrameEvent> {
    std::mem::take(&mut w.frame_events)
}

pub(crate) fn drain_loot_inner(w: &mut GameWorldInner) -> Vec<LootEvent> {
    std::mem::take(&mut w.loot)
}

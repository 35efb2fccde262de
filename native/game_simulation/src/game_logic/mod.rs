//! Path: native/game_simulation/src/game_logic/mod.rs
//! Summary: 1 ティック分の更新（システム群）とイベント drain

mod events;
mod physics_step;
pub(crate) mod systems;

use game_core::entity_params::ArchetypeTable;

use crate::frame_metrics::FrameMetrics;
use crate::scheduler::ConcurrencyScheduler;

pub(crate) use events::{drain_frame_events_inner, drain_loot_inner};
pub(crate) use physics_step::physics_step_inner;
pub use systems::leveling::compute_weapon_choices;

/// ティック中に読み取り専用で参照する共有物
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub table:     &'a ArchetypeTable,
    pub scheduler: &'a ConcurrencyScheduler,
    pub metrics:   &'a FrameMetrics,
}

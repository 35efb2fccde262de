//! Path: native/game_simulation/src/lib.rs
//! Summary: モジュール宣言と pub use のみ
//!
//! ワールド（SoA）・ティック内のシステム群・フェーズ並列スケジューラ・SimulationLoop。
//! 純粋なロジックは `game_core` 側。

pub mod asset;
pub mod config;
pub mod frame_clock;
pub mod frame_metrics;
mod game_logic;
pub mod game_loop;
pub mod persistence;
pub mod render_snapshot;
pub mod scheduler;
pub mod world;

pub use asset::{AssetRegistry, DirectoryProvider, NullProvider, ResourceProvider, SoundId, SpriteRef};
pub use config::{PlayerConfig, SchedulerConfig, SimConfig, SpawnConfig, TimestepConfig, TimestepMode};
pub use frame_clock::{FrameClock, TickPlan};
pub use frame_metrics::{FrameMetrics, MetricsSnapshot};
pub use game_logic::{compute_weapon_choices, StepContext};
pub use game_loop::SimulationLoop;
pub use persistence::{LogRecorder, MemoryRecorder, RecordedRuns, RunRecorder, RunSummary};
pub use render_snapshot::{build_render_frame, RenderFrame};
pub use scheduler::{ConcurrencyScheduler, Phase};
pub use world::{
    AttackWorld, EnemyProjectileWorld, EnemyWorld, FrameEvent, GameLoopControl, GameWorld,
    GameWorldInner, LootEvent, ParticleWorld, PlayerState,
};

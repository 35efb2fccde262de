//! Path: native/game_simulation/src/world/mod.rs
//! Summary: ワールド型（PlayerState, EnemyWorld, EnemyProjectileWorld, AttackWorld, ParticleWorld, GameWorld）

mod attack;
mod enemy;
mod enemy_projectile;
mod frame_event;
mod game_loop_control;
mod game_world;
mod particle;
mod player;

pub use attack::AttackWorld;
pub use enemy::EnemyWorld;
pub use enemy_projectile::EnemyProjectileWorld;
pub use frame_event::{FrameEvent, LootEvent};
pub use game_loop_control::GameLoopControl;
pub use game_world::{GameWorld, GameWorldInner};
pub use particle::{ParticleStep, ParticleWorld};
pub use player::PlayerState;

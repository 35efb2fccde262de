//! Path: native/game_core/src/physics/mod.rs
//! Summary: 物理モジュールの再エクスポート（衝突・分離・ノックバック・RNG・空間ハッシュ）

pub mod knockback;
pub mod obstacle_resolve;
pub mod rng;
pub mod separation;
pub mod spatial_hash;

pub use obstacle_resolve::{NoObstacles, ObstacleMap};
pub use spatial_hash::{CollisionWorld, SpatialHash, StaticObstacle};

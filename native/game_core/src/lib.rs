//! Path: native/game_core/src/lib.rs
//! Summary: ゲームコア共通ロジック（定数・アーキタイプ・スポーン方針・武器と攻撃判定・物理プリミティブ）
//!
//! スレッドを持たない純粋なロジックのみ。ワールドの保持と並列実行は `game_simulation` 側。

pub mod attack;
pub mod boss;
pub mod constants;
pub mod enemy;
pub mod entity_params;
pub mod error;
pub mod physics;
pub mod spawn;
pub mod util;
pub mod weapon;

pub use error::{SimError, SimResult};

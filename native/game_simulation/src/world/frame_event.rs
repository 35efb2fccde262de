//! Path: native/game_simulation/src/world/frame_event.rs
//! Summary: フレーム内で発生したゲームイベントと撃破時のドロップ通知

use game_core::weapon::WeaponKind;

/// フレーム内で発生したゲームイベント（毎フレーム drain される）
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// 回避（敵・プレイヤーどちらも）
    Evaded        { x: f32, y: f32 },
    DamageNumber  { x: f32, y: f32, amount: i32, to_player: bool },
    EnemyKilled   { archetype_id: u16, weapon: Option<WeaponKind>, is_boss: bool },
    PlayerDamaged { damage: i32 },
    LevelUp       { new_level: u32 },
    BossSpawned   { archetype_id: u16 },
    BossDefeated  { archetype_id: u16 },
    PlayerDied,
    PlaySound     { name: &'static str },
}

/// 撃破位置でのドロップ判定は外側に任せる
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LootEvent {
    pub x:            f32,
    pub y:            f32,
    pub color:        [f32; 4],
    pub archetype_id: u16,
    pub is_boss:      bool,
}

//! Path: native/game_simulation/src/world/player.rs
//! Summary: プレイヤー状態（座標・入力・HP・防御・回避・無敵タイマー・レベル・武器スロット）

use game_core::constants::{MAX_WEAPON_SLOTS, PLAYER_RADIUS};
use game_core::enemy::Facing;
use game_core::weapon::{Modifiers, WeaponKind, WeaponSlot};

use crate::config::PlayerConfig;

/// プレイヤー状態（座標は中心）
#[derive(Clone, Debug)]
pub struct PlayerState {
    pub x:                f32,
    pub y:                f32,
    pub radius:           f32,
    pub speed:            f32,
    pub input_dx:         f32,
    pub input_dy:         f32,
    pub facing:           Facing,
    /// 照準ベクトル（None なら facing 方向）
    pub aim:              Option<(f32, f32)>,
    pub hp:               i32,
    pub max_hp:           i32,
    pub defense:          i32,
    pub avoidance:        f32,
    pub invincible_timer: f32,
    pub level:            u32,
    /// 累積経験値
    pub exp:              u32,
    pub modifiers:        Modifiers,
    pub weapon_slots:     Vec<WeaponSlot>,
}

impl PlayerState {
    pub fn new(config: &PlayerConfig, x: f32, y: f32) -> Self {
        let mut p = Self {
            x,
            y,
            radius:           PLAYER_RADIUS,
            speed:            config.speed,
            input_dx:         0.0,
            input_dy:         0.0,
            facing:           Facing::Right,
            aim:              None,
            hp:               config.max_hp.max(1),
            max_hp:           config.max_hp.max(1),
            defense:          config.defense.max(0),
            avoidance:        config.avoidance.clamp(0.0, 1.0),
            invincible_timer: 0.0,
            level:            1,
            exp:              0,
            modifiers:        Modifiers::default(),
            weapon_slots:     Vec::new(),
        };
        for &kind in &config.starting_weapons {
            p.add_or_upgrade_weapon(kind);
        }
        p
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
    }

    /// 所持済みならレベルアップ、未所持なら空きスロットに追加。変化がなければ false。
    pub fn add_or_upgrade_weapon(&mut self, kind: WeaponKind) -> bool {
        if let Some(slot) = self.weapon_slots.iter_mut().find(|s| s.kind == kind) {
            return slot.level_up();
        }
        if self.weapon_slots.len() >= MAX_WEAPON_SLOTS {
            log::warn!("weapon slots full; cannot add {}", kind.name());
            return false;
        }
        self.weapon_slots.push(WeaponSlot::new(kind));
        true
    }

    pub fn weapon_level(&self, kind: WeaponKind) -> u32 {
        self.weapon_slots.iter().find(|s| s.kind == kind).map_or(0, |s| s.level)
    }
}

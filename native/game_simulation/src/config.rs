//! Path: native/game_simulation/src/config.rs
//! Summary: 実行時設定（JSON + 環境変数）。未指定の項目は game_core::constants の値。

use std::path::Path;

use game_core::constants::{
    BASE_POPULATION_CAP, CAP_PER_LEVEL, DT_SMOOTHING, FIXED_TICK_SECS, MAX_FRAME_DT,
    MAX_TICKS_PER_FRAME, PLAYER_MAX_HP, PLAYER_SPEED, SURVIVAL_WINDOW_SECS,
};
use game_core::weapon::WeaponKind;
use game_core::{SimError, SimResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub parallel_enabled:   bool,
    /// ワーカー上限（実際は available_parallelism との小さい方）
    pub max_workers:        usize,
    /// これ未満の要素数なら逐次実行
    pub parallel_threshold: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { parallel_enabled: true, max_workers: 8, parallel_threshold: 64 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestepMode {
    /// 固定ティックを積み立てて複数回実行
    Fixed,
    /// 平滑化した dt で 1 回だけ実行
    Variable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestepConfig {
    pub mode:                TimestepMode,
    pub tick_secs:           f32,
    pub max_frame_dt:        f32,
    pub max_ticks_per_frame: u32,
    /// EMA の係数（1.0 で平滑化なし）
    pub smoothing:           f32,
}

impl Default for TimestepConfig {
    fn default() -> Self {
        Self {
            mode:                TimestepMode::Fixed,
            tick_secs:           FIXED_TICK_SECS,
            max_frame_dt:        MAX_FRAME_DT,
            max_ticks_per_frame: MAX_TICKS_PER_FRAME,
            smoothing:           DT_SMOOTHING,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub normal_spawning: bool,
    pub boss_spawning:   bool,
    pub base_cap:        usize,
    pub cap_per_level:   usize,
    /// サバイバル時間（バッチサイズの曲線に使う）
    pub run_secs:        f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            normal_spawning: true,
            boss_spawning:   true,
            base_cap:        BASE_POPULATION_CAP,
            cap_per_level:   CAP_PER_LEVEL,
            run_secs:        SURVIVAL_WINDOW_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_hp:           i32,
    pub defense:          i32,
    /// 回避確率 [0, 1]
    pub avoidance:        f32,
    pub speed:            f32,
    pub starting_weapons: Vec<WeaponKind>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_hp:           PLAYER_MAX_HP,
            defense:          0,
            avoidance:        0.0,
            speed:            PLAYER_SPEED,
            starting_weapons: vec![WeaponKind::Whip],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed:      u64,
    pub scheduler: SchedulerConfig,
    pub timestep:  TimestepConfig,
    pub spawn:     SpawnConfig,
    pub player:    PlayerConfig,
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(|source| SimError::ConfigParse { what: "simulation config", source })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// `GAME_PARALLEL_ENABLED` / `GAME_WORKERS` / `GAME_SEED` で上書きする
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, get: F) {
        if let Some(v) = get("GAME_PARALLEL_ENABLED") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => self.scheduler.parallel_enabled = true,
                "0" | "false" | "off" => self.scheduler.parallel_enabled = false,
                other => log::warn!("ignoring GAME_PARALLEL_ENABLED={other}"),
            }
        }
        if let Some(v) = get("GAME_WORKERS") {
            match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.scheduler.max_workers = n,
                _ => log::warn!("ignoring GAME_WORKERS={v}"),
            }
        }
        if let Some(v) = get("GAME_SEED") {
            match v.trim().parse::<u64>() {
                Ok(seed) => self.seed = seed,
                Err(_) => log::warn!("ignoring GAME_SEED={v}"),
            }
        }
    }
}

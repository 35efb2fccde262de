//! Path: native/game_core/src/entity_params.rs
//! Summary: 敵・ボスの ID ベースパラメータテーブル（ArchetypeTable）と時間帯別出現テーブル
//!
//! 起動時に 1 度だけ構築し、以降は参照で渡す。JSON から読み込むか
//! `ArchetypeTable::default()` の組み込みデータを使う。

use serde::{Deserialize, Serialize};

use crate::constants::BOSS_INTERVAL_SECS;
use crate::enemy::Behavior;
use crate::error::{SimError, SimResult};
use crate::physics::rng::SimpleRng;

/// ボス ID の下限（これ未満は通常敵）
pub const BOSS_ID_MIN: u16 = 101;

/// Kite / Approach 系の距離帯（target ± tolerance）
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceBand {
    pub target:    f32,
    pub tolerance: f32,
}

impl Default for DistanceBand {
    fn default() -> Self {
        Self { target: 300.0, tolerance: 60.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectilePattern {
    Aimed,
    Radial { count: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileParams {
    pub speed:   f32,
    pub damage:  i32,
    pub pattern: ProjectilePattern,
}

/// 敵 1 種類分のステータス
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyParams {
    pub id:                 u16,
    pub name:               String,
    pub max_hp:             i32,
    pub speed:              f32,
    pub radius:             f32,
    pub contact_damage:     i32,
    pub attack_cooldown_ms: u32,
    pub behavior:           Behavior,
    pub exp_reward:         u32,
    /// パーティクル色 [r, g, b, a]
    pub color:              [f32; 4],
    /// 被弾時の回避確率（0.0 で無効）
    #[serde(default)]
    pub avoidance:          f32,
    #[serde(default)]
    pub projectile:         Option<ProjectileParams>,
    #[serde(default)]
    pub band:               Option<DistanceBand>,
    /// スプライト名（無ければプリミティブ描画）
    #[serde(default)]
    pub sprite:             Option<String>,
}

impl EnemyParams {
    /// ID が見つからなかったときの控えめなステータス
    pub fn fallback(id: u16) -> Self {
        Self {
            id,
            name:               "unknown".to_string(),
            max_hp:             20,
            speed:              60.0,
            radius:             16.0,
            contact_damage:     5,
            attack_cooldown_ms: 1000,
            behavior:           Behavior::Chase,
            exp_reward:         1,
            color:              [0.8, 0.8, 0.8, 1.0],
            avoidance:          0.0,
            projectile:         None,
            band:               None,
            sprite:             None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossParams {
    #[serde(flatten)]
    pub stats: EnemyParams,
    /// 省略時は `BOSS_INTERVAL_SECS * 順番`
    #[serde(default)]
    pub spawn_time_secs: Option<f32>,
}

/// 経過時間帯ごとの重み付き出現テーブル。`until_secs` 以下の時間帯に適用（None は以降すべて）。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnBand {
    pub until_secs: Option<f32>,
    pub weights:    Vec<(u16, u32)>,
}

impl SpawnBand {
    pub fn roll(&self, rng: &mut SimpleRng) -> Option<u16> {
        let total: u32 = self.weights.iter().map(|&(_, w)| w).sum();
        if total == 0 {
            return None;
        }
        let mut r = rng.next_below(total);
        for &(id, w) in &self.weights {
            if r < w {
                return Some(id);
            }
            r -= w;
        }
        None
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchetypeTable {
    pub enemies: Vec<EnemyParams>,
    pub bosses:  Vec<BossParams>,
    #[serde(default = "default_spawn_bands")]
    pub spawn_bands: Vec<SpawnBand>,
    #[serde(skip, default = "fallback_params")]
    fallback: EnemyParams,
}

fn fallback_params() -> EnemyParams {
    EnemyParams::fallback(0)
}

impl ArchetypeTable {
    pub fn new(enemies: Vec<EnemyParams>, bosses: Vec<BossParams>, spawn_bands: Vec<SpawnBand>) -> SimResult<Self> {
        let table = Self { enemies, bosses, spawn_bands, fallback: fallback_params() };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let table: Self = serde_json::from_str(json)
            .map_err(|source| SimError::ConfigParse { what: "archetype table", source })?;
        table.validate()?;
        Ok(table)
    }

    /// 起動前チェック。テーブルが空なら致命的エラー。
    pub fn validate(&self) -> SimResult<()> {
        if self.enemies.is_empty() {
            return Err(SimError::EmptyArchetypeTable("enemy"));
        }
        if self.bosses.is_empty() {
            return Err(SimError::EmptyArchetypeTable("boss"));
        }
        if self.spawn_bands.is_empty() {
            return Err(SimError::EmptyArchetypeTable("spawn band"));
        }
        for e in &self.enemies {
            if e.id == 0 || e.id >= BOSS_ID_MIN {
                return Err(SimError::InvalidArchetype { id: e.id, reason: "normal ids must be 1..=100" });
            }
            if e.max_hp <= 0 {
                return Err(SimError::InvalidArchetype { id: e.id, reason: "max_hp must be positive" });
            }
        }
        for b in &self.bosses {
            if b.stats.id < BOSS_ID_MIN {
                return Err(SimError::InvalidArchetype { id: b.stats.id, reason: "boss ids start at 101" });
            }
            if b.stats.max_hp <= 0 {
                return Err(SimError::InvalidArchetype { id: b.stats.id, reason: "max_hp must be positive" });
            }
        }
        // 出現テーブルの未知 ID は実行時にフォールバックするので警告のみ
        for band in &self.spawn_bands {
            for &(id, _) in &band.weights {
                if self.try_enemy(id).is_err() {
                    log::warn!("spawn band references unknown archetype {id}");
                }
            }
        }
        Ok(())
    }

    pub fn try_enemy(&self, id: u16) -> SimResult<&EnemyParams> {
        self.enemies
            .iter()
            .find(|e| e.id == id)
            .ok_or(SimError::UnknownArchetype { id })
    }

    pub fn try_boss(&self, id: u16) -> SimResult<&BossParams> {
        self.bosses
            .iter()
            .find(|b| b.stats.id == id)
            .ok_or(SimError::UnknownBoss { id })
    }

    /// 通常敵・ボスのどちらでも引ける。見つからなければ警告してデフォルト値。
    pub fn stats(&self, id: u16) -> &EnemyParams {
        let found = if id >= BOSS_ID_MIN {
            self.try_boss(id).map(|b| &b.stats)
        } else {
            self.try_enemy(id)
        };
        match found {
            Ok(p) => p,
            Err(e) => {
                log::warn!("{e}; using default stat block");
                &self.fallback
            }
        }
    }

    /// ボスの出現時刻。明示指定が無ければ表の順番 × インターバル。
    pub fn boss_spawn_time(&self, index: usize) -> Option<f32> {
        self.bosses.get(index).map(|b| {
            b.spawn_time_secs
                .unwrap_or(BOSS_INTERVAL_SECS * (index as f32 + 1.0))
        })
    }

    pub fn band_for(&self, elapsed_secs: f32) -> Option<&SpawnBand> {
        self.spawn_bands
            .iter()
            .find(|b| b.until_secs.map_or(true, |until| elapsed_secs <= until))
            .or_else(|| self.spawn_bands.last())
    }

    /// 経過時間に応じたアーキタイプ抽選
    pub fn roll_archetype(&self, elapsed_secs: f32, rng: &mut SimpleRng) -> u16 {
        self.band_for(elapsed_secs)
            .and_then(|band| band.roll(rng))
            .or_else(|| self.enemies.first().map(|e| e.id))
            .unwrap_or(1)
    }
}

fn default_spawn_bands() -> Vec<SpawnBand> {
    vec![
        SpawnBand { until_secs: Some(30.0), weights: vec![(1, 70), (2, 30)] },
        SpawnBand { until_secs: Some(70.0), weights: vec![(1, 30), (2, 40), (3, 20), (4, 10)] },
        SpawnBand {
            until_secs: None,
            weights: vec![(1, 10), (2, 20), (3, 20), (4, 15), (5, 20), (6, 15)],
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn enemy(
    id: u16, name: &str, max_hp: i32, speed: f32, radius: f32,
    contact_damage: i32, attack_cooldown_ms: u32, behavior: Behavior,
    exp_reward: u32, color: [f32; 4],
) -> EnemyParams {
    EnemyParams {
        id,
        name: name.to_string(),
        max_hp,
        speed,
        radius,
        contact_damage,
        attack_cooldown_ms,
        behavior,
        exp_reward,
        color,
        avoidance: 0.0,
        projectile: None,
        band: None,
        sprite: Some(name.to_lowercase().replace(' ', "_")),
    }
}

fn boss(stats: EnemyParams, spawn_time_secs: f32) -> BossParams {
    BossParams { stats, spawn_time_secs: Some(spawn_time_secs) }
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        let aimed = |speed, damage| Some(ProjectileParams { speed, damage, pattern: ProjectilePattern::Aimed });
        let radial = |speed, damage, count| Some(ProjectileParams { speed, damage, pattern: ProjectilePattern::Radial { count } });

        let enemies = vec![
            enemy(1, "Slime",    30,  80.0,  20.0, 10, 1000, Behavior::Chase,            5,  [1.0, 0.5, 0.1, 1.0]),
            enemy(2, "Bat",      15,  160.0, 12.0, 6,  1000, Behavior::Chase,            3,  [0.7, 0.2, 0.9, 1.0]),
            enemy(3, "Charger",  40,  220.0, 18.0, 14, 1000, Behavior::RushThrough,      6,  [0.9, 0.2, 0.2, 1.0]),
            EnemyParams {
                projectile: aimed(220.0, 10),
                band: Some(DistanceBand { target: 320.0, tolerance: 60.0 }),
                avoidance: 0.1,
                ..enemy(4, "Skeleton", 60, 70.0, 22.0, 8, 2500, Behavior::KiteAndShoot, 10, [0.9, 0.85, 0.7, 1.0])
            },
            enemy(5, "Golem",    150, 40.0,  32.0, 20, 1000, Behavior::Chase,            20, [0.6, 0.6, 0.6, 1.0]),
            EnemyParams {
                projectile: aimed(260.0, 8),
                band: Some(DistanceBand { target: 200.0, tolerance: 30.0 }),
                ..enemy(6, "Imp", 45, 90.0, 16.0, 8, 1500, Behavior::ApproachAndShoot, 8, [0.5, 0.5, 1.0, 1.0])
            },
        ];

        let bosses = vec![
            boss(EnemyParams {
                projectile: radial(180.0, 12, 8),
                ..enemy(101, "Slime King", 1000, 60.0, 48.0, 25, 5000, Behavior::Chase, 200, [0.2, 1.0, 0.2, 1.0])
            }, 60.0),
            boss(enemy(102, "Bat Lord", 2000, 110.0, 48.0, 30, 1000, Behavior::Chase, 400, [0.6, 0.1, 0.8, 1.0]), 120.0),
            boss(EnemyParams {
                projectile: radial(150.0, 20, 12),
                band: Some(DistanceBand { target: 250.0, tolerance: 40.0 }),
                ..enemy(103, "Stone Golem", 5000, 30.0, 64.0, 40, 6000, Behavior::ApproachAndShoot, 800, [0.5, 0.5, 0.5, 1.0])
            }, 180.0),
            boss(EnemyParams {
                projectile: aimed(300.0, 15),
                band: Some(DistanceBand { target: 380.0, tolerance: 60.0 }),
                avoidance: 0.15,
                ..enemy(104, "Lich", 4000, 50.0, 48.0, 20, 1200, Behavior::KiteAndShoot, 1000, [0.3, 0.9, 0.9, 1.0])
            }, 240.0),
            boss(EnemyParams {
                projectile: radial(200.0, 18, 16),
                ..enemy(105, "Reaper", 8000, 90.0, 56.0, 50, 4000, Behavior::Chase, 2000, [0.1, 0.1, 0.1, 1.0])
            }, 300.0),
        ];

        Self { enemies, bosses, spawn_bands: default_spawn_bands(), fallback: fallback_params() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        let t = ArchetypeTable::default();
        assert!(t.validate().is_ok());
        assert_eq!(t.stats(1).name, "Slime");
        assert_eq!(t.stats(101).name, "Slime King");
        assert_eq!(t.boss_spawn_time(0), Some(60.0));
    }

    #[test]
    fn unknown_id_falls_back_to_default_block() {
        let t = ArchetypeTable::default();
        assert!(matches!(t.try_enemy(99), Err(SimError::UnknownArchetype { id: 99 })));
        let p = t.stats(99);
        assert_eq!(p.max_hp, EnemyParams::fallback(0).max_hp);
        assert_eq!(p.behavior, Behavior::Chase);
        assert!(matches!(t.try_boss(199), Err(SimError::UnknownBoss { id: 199 })));
        assert_eq!(t.stats(199).max_hp, 20);
    }

    #[test]
    fn empty_tables_are_rejected() {
        let t = ArchetypeTable::default();
        let err = ArchetypeTable::new(Vec::new(), t.bosses.clone(), t.spawn_bands.clone()).unwrap_err();
        assert!(matches!(err, SimError::EmptyArchetypeTable("enemy")));
        let err = ArchetypeTable::new(t.enemies.clone(), Vec::new(), t.spawn_bands.clone()).unwrap_err();
        assert!(matches!(err, SimError::EmptyArchetypeTable("boss")));
    }

    #[test]
    fn bands_follow_elapsed_time() {
        let t = ArchetypeTable::default();
        let mut rng = SimpleRng::new(42);
        for _ in 0..200 {
            let id = t.roll_archetype(10.0, &mut rng);
            assert!(id == 1 || id == 2);
        }
        assert_eq!(t.band_for(30.0).and_then(|b| b.until_secs), Some(30.0));
        assert_eq!(t.band_for(30.5).and_then(|b| b.until_secs), Some(70.0));
        assert_eq!(t.band_for(500.0).and_then(|b| b.until_secs), None);
    }

    #[test]
    fn json_table_loads_with_defaults() {
        let json = r#"{
            "enemies": [
                { "id": 1, "name": "Blob", "max_hp": 10, "speed": 1.5, "radius": 8.0,
                  "contact_damage": 1, "attack_cooldown_ms": 500, "behavior": 1,
                  "exp_reward": 1, "color": [1.0, 1.0, 1.0, 1.0] }
            ],
            "bosses": [
                { "id": 101, "name": "Big Blob", "max_hp": 100, "speed": 1.0, "radius": 30.0,
                  "contact_damage": 5, "attack_cooldown_ms": 2000, "behavior": 4,
                  "exp_reward": 50, "color": [1.0, 0.0, 0.0, 1.0],
                  "projectile": { "speed": 100.0, "damage": 3, "pattern": { "kind": "radial", "count": 6 } } }
            ]
        }"#;
        let t = ArchetypeTable::from_json_str(json).unwrap();
        assert_eq!(t.stats(1).speed, 1.5);
        assert_eq!(t.stats(101).behavior, Behavior::ApproachAndShoot);
        assert_eq!(t.boss_spawn_time(0), Some(BOSS_INTERVAL_SECS));
        assert_eq!(t.spawn_bands.len(), 3);
    }

    #[test]
    fn bad_behavior_id_is_a_parse_error() {
        let json = r#"{ "enemies": [ { "id": 1, "name": "x", "max_hp": 1, "speed": 1.0,
            "radius": 1.0, "contact_damage": 1, "attack_cooldown_ms": 1, "behavior": 9,
            "exp_reward": 1, "color": [0,0,0,0] } ], "bosses": [] }"#;
        assert!(matches!(
            ArchetypeTable::from_json_str(json),
            Err(SimError::ConfigParse { .. })
        ));
    }
}

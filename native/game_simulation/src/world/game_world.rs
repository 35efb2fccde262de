//! Path: native/game_simulation/src/world/game_world.rs
//! Summary: ゲームワールド（GameWorldInner, GameWorld）

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use game_core::constants::{
    CELL_SIZE, HIGH_LOAD_ENEMY_COUNT, MAP_HEIGHT, MAP_WIDTH, PARTICLE_RNG_SEED,
};
use game_core::entity_params::ArchetypeTable;
use game_core::physics::rng::SimpleRng;
use game_core::physics::spatial_hash::{CollisionWorld, SpatialHash, StaticObstacle};
use game_core::spawn::SpawnPolicy;
use game_core::util::Viewport;
use game_core::weapon::WeaponKind;
use game_core::{SimError, SimResult};
use rustc_hash::FxHashMap;

use super::{AttackWorld, EnemyProjectileWorld, EnemyWorld, FrameEvent, LootEvent, ParticleWorld, PlayerState};
use crate::config::SimConfig;

/// ゲームワールド内部状態
pub struct GameWorldInner {
    pub frame_id:           u32,
    /// 実行済みティック数
    pub tick:               u64,
    /// ゲーム開始からの経過時間（秒）
    pub elapsed_seconds:    f32,
    /// 同じ時刻のミリ秒表現（f64 で積算して境界判定の誤差を抑える）
    pub now_ms:             f64,
    pub player:             PlayerState,
    pub enemies:            EnemyWorld,
    pub projectiles:        EnemyProjectileWorld,
    pub attacks:            AttackWorld,
    pub particles:          ParticleWorld,
    pub rng:                SimpleRng,
    /// 静的障害物
    pub collision:          CollisionWorld,
    /// 生存敵の空間ハッシュ（フェーズごとに再構築）
    pub enemy_hash:         SpatialHash,
    /// 障害物クエリ用バッファ（毎フレーム再利用）
    pub obstacle_query_buf: Vec<usize>,
    pub spawn:              SpawnPolicy,
    pub base_cap:           usize,
    pub cap_per_level:      usize,
    /// 武器ごとの累計ダメージ（ラン終了時に記録）
    pub weapon_damage:      FxHashMap<WeaponKind, u64>,
    pub kill_count:         u32,
    pub bosses_defeated:    u32,
    /// このフレームで発生したイベント（毎フレーム drain される）
    pub frame_events:       Vec<FrameEvent>,
    pub loot:               Vec<LootEvent>,
}

impl GameWorldInner {
    pub fn new(config: &SimConfig, table: &ArchetypeTable) -> Self {
        let mut spawn = SpawnPolicy::new(table).with_run_secs(config.spawn.run_secs);
        spawn.normal_enabled = config.spawn.normal_spawning;
        spawn.boss_enabled = config.spawn.boss_spawning;

        Self {
            frame_id:           0,
            tick:               0,
            elapsed_seconds:    0.0,
            now_ms:             0.0,
            player:             PlayerState::new(&config.player, MAP_WIDTH / 2.0, MAP_HEIGHT / 2.0),
            enemies:            EnemyWorld::new(),
            projectiles:        EnemyProjectileWorld::new(),
            attacks:            AttackWorld::new(),
            particles:          ParticleWorld::new(PARTICLE_RNG_SEED ^ config.seed),
            rng:                SimpleRng::new(config.seed),
            collision:          CollisionWorld::new(CELL_SIZE),
            enemy_hash:         SpatialHash::new(CELL_SIZE),
            obstacle_query_buf: Vec::new(),
            spawn,
            base_cap:           config.spawn.base_cap,
            cap_per_level:      config.spawn.cap_per_level,
            weapon_damage:      FxHashMap::default(),
            kill_count:         0,
            bosses_defeated:    0,
            frame_events:       Vec::new(),
            loot:               Vec::new(),
        }
    }

    /// プレイヤー中心のカメラ矩形
    pub fn viewport(&self) -> Viewport {
        Viewport::centered_on(self.player.x, self.player.y)
    }

    /// 高負荷時は近傍探索を自セルのみに絞る
    pub fn high_load(&self) -> bool {
        self.enemies.count > HIGH_LOAD_ENEMY_COUNT
    }

    pub fn set_obstacles(&mut self, obstacles: &[StaticObstacle]) {
        self.collision.rebuild_static(obstacles);
    }

    /// 生存敵の Spatial Hash を再構築する
    pub(crate) fn rebuild_enemy_hash(&mut self) {
        self.enemy_hash.clear();
        for i in 0..self.enemies.len() {
            if self.enemies.alive[i] {
                self.enemy_hash.insert(i, self.enemies.positions_x[i], self.enemies.positions_y[i]);
            }
        }
    }

    /// 撃破以外の理由で消す（ハッシュからも外す）
    pub(crate) fn remove_enemy(&mut self, i: usize) {
        if self.enemies.alive[i] {
            self.enemy_hash.remove(i, self.enemies.positions_x[i], self.enemies.positions_y[i]);
            self.enemies.kill(i);
        }
    }
}

/// ゲームワールド（RwLock で保護された内部状態）。描画側は read、ループは write。
pub struct GameWorld(pub RwLock<GameWorldInner>);

impl GameWorld {
    pub fn new(inner: GameWorldInner) -> Self {
        Self(RwLock::new(inner))
    }

    pub fn read(&self) -> SimResult<RwLockReadGuard<'_, GameWorldInner>> {
        self.0.read().map_err(|_| SimError::LockPoisoned { context: "world read" })
    }

    pub fn write(&self) -> SimResult<RwLockWriteGuard<'_, GameWorldInner>> {
        self.0.write().map_err(|_| SimError::LockPoisoned { context: "world write" })
    }
}

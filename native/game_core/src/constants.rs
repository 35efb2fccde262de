//! Path: native/game_core/src/constants.rs
//! Summary: 画面解像度・ワールドサイズ・物理定数・スポーン/カリング定数の定義

// Window resolution（カメラのビューポートサイズ）
pub const SCREEN_WIDTH:  f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

// World size
pub const MAP_WIDTH:  f32 = 4096.0;
pub const MAP_HEIGHT: f32 = 4096.0;

// Player
pub const PLAYER_RADIUS:     f32 = 24.0;
pub const PLAYER_SPEED:      f32 = 200.0;
pub const PLAYER_MAX_HP:     i32 = 100;
pub const INVINCIBLE_DURATION: f32 = 0.5;

// Frame budget / timestep
pub const FRAME_BUDGET_MS:     f64 = 1000.0 / 60.0;
pub const FIXED_TICK_SECS:     f32 = 1.0 / 60.0;
pub const MAX_FRAME_DT:        f32 = 0.25;
pub const MAX_TICKS_PER_FRAME: u32 = 5;
/// dt の指数移動平均の係数（1.0 で平滑化なし）
pub const DT_SMOOTHING:        f32 = 0.2;

// Spatial hash cell size
pub const CELL_SIZE: f32 = 80.0;
/// 生存敵数がこれを超えたら近傍探索を自セルのみに絞る
pub const HIGH_LOAD_ENEMY_COUNT: usize = 400;

// Enemy separation: 敵同士が重ならないための押し出し係数
pub const SEPARATION_FACTOR:   f32 = 0.9;
pub const SEPARATION_STRENGTH: f32 = 0.5;
pub const BOSS_PUSH_WEIGHT:    f32 = 2.0;
pub const BOSS_RESIST_WEIGHT:  f32 = 0.25;

// Knockback
pub const KNOCKBACK_DURATION: f32 = 0.15;
pub const KNOCKBACK_COOLDOWN: f32 = 0.5;

// Enemy cosmetic
pub const HIT_FLASH_DURATION: f32 = 0.1;

// Damage jitter ±10%
pub const DAMAGE_JITTER: f32 = 0.1;

// Spawning
pub const SURVIVAL_WINDOW_SECS: f32 = 180.0;
pub const SPAWN_EDGE_MARGIN:    f32 = 60.0;
pub const MAX_SPAWN_BATCH:      usize = 8;
pub const SPAWN_THRESHOLD_START: f32 = 2.0;
pub const SPAWN_THRESHOLD_FLOOR: f32 = 0.35;
pub const BASE_POPULATION_CAP:  usize = 150;
pub const CAP_PER_LEVEL:        usize = 5;
pub const BOSS_INTERVAL_SECS:   f32 = 60.0;
/// 障害物を避けてスポーン位置を探す最大半径
pub const FREE_POSITION_SEARCH_RADIUS: f32 = 256.0;

// Culling
/// 画面内判定の保護マージン（この範囲の敵は距離カリングしない）
pub const CULL_PROTECT_MARGIN:    f32 = 100.0;
/// ボスがこの距離より離れたら画面外の別の端へ再配置する
pub const BOSS_RESPAWN_DISTANCE:  f32 = 1400.0;

// Enemy projectiles
pub const ENEMY_PROJECTILE_RADIUS:   f32 = 8.0;
pub const ENEMY_PROJECTILE_LIFETIME: f32 = 5.0;

// Weapons
/// 武器の最近接敵探索半径（MagicWand / Lightning 用）
pub const WEAPON_SEARCH_RADIUS: f32 = SCREEN_WIDTH / 2.0;
pub const MAX_WEAPON_LEVEL: u32 = 8;
pub const MAX_WEAPON_SLOTS: usize = 6;

// Particles
/// パーティクル用 RNG シード
pub const PARTICLE_RNG_SEED: u64 = 67890;
pub const PARTICLE_GRAVITY:  f32 = 200.0;

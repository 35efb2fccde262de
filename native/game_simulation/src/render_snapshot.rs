//! Path: native/game_simulation/src/render_snapshot.rs
//! Summary: GameWorld から描画用スナップショットを構築
//!
//! 描画側が world.read() を保持する時間を最小化するため、
//! 必要なデータを RenderFrame にコピーしてからロックを解放する。

use game_core::attack::AttackMotion;
use game_core::constants::INVINCIBLE_DURATION;
use game_core::enemy::Facing;
use game_core::util::{exp_required_for_next, Viewport};
use game_core::weapon::WeaponKind;

use crate::asset::{AssetRegistry, SpriteRef};
use crate::world::GameWorldInner;

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSprite {
    pub x:          f32,
    pub y:          f32,
    pub radius:     f32,
    pub facing:     Facing,
    /// 無敵中の点滅用
    pub invincible: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemySprite {
    pub uid:          u32,
    pub archetype_id: u16,
    pub x:            f32,
    pub y:            f32,
    pub radius:       f32,
    pub facing:       Facing,
    /// [0, 1] にクランプ済み
    pub hp_ratio:     f32,
    pub hit_flash:    f32,
    pub is_boss:      bool,
    pub sprite:       SpriteRef,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttackSprite {
    pub weapon:   WeaponKind,
    pub x:        f32,
    pub y:        f32,
    pub half_w:   f32,
    pub half_h:   f32,
    pub progress: f32,
    /// Ricochet の軌跡（古い順）
    pub trail:    Vec<(f32, f32)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSprite {
    pub x:         f32,
    pub y:         f32,
    pub radius:    f32,
    pub from_boss: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSprite {
    pub x:     f32,
    pub y:     f32,
    pub color: [f32; 4],
    pub alpha: f32,
    pub size:  f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossHudInfo {
    pub archetype_id: u16,
    pub hp:           i32,
    pub max_hp:       i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudData {
    pub hp:                 i32,
    pub max_hp:             i32,
    pub elapsed_seconds:    f32,
    pub level:              u32,
    pub exp:                u32,
    pub exp_to_next:        u32,
    pub enemy_count:        usize,
    pub projectile_count:   usize,
    pub kill_count:         u32,
    pub weapon_levels:      Vec<(WeaponKind, u32)>,
    pub boss_info:          Option<BossHudInfo>,
    /// 次のボスまでの残り秒数（予定が尽きたら None）
    pub next_boss_in:       Option<f32>,
    pub screen_flash_alpha: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    pub frame_id:    u32,
    pub camera:      Viewport,
    /// 固定ティックの積み残し比率（補間用、0.0..1.0）
    pub alpha:       f32,
    pub player:      PlayerSprite,
    pub enemies:     Vec<EnemySprite>,
    pub attacks:     Vec<AttackSprite>,
    pub projectiles: Vec<ProjectileSprite>,
    pub particles:   Vec<ParticleSprite>,
    pub obstacles:   Vec<(f32, f32, f32, u8)>,
    pub hud:         HudData,
}

pub fn build_render_frame(w: &GameWorldInner, assets: &AssetRegistry, alpha: f32) -> RenderFrame {
    let e = &w.enemies;
    let mut enemies = Vec::with_capacity(e.count);
    let mut boss_info = None;
    for i in 0..e.len() {
        if !e.alive[i] {
            continue;
        }
        if e.is_boss[i] && boss_info.is_none() {
            boss_info = Some(BossHudInfo {
                archetype_id: e.archetype_id[i],
                hp:           e.hp[i].max(0),
                max_hp:       e.max_hp[i],
            });
        }
        enemies.push(EnemySprite {
            uid:          e.uid[i],
            archetype_id: e.archetype_id[i],
            x:            e.positions_x[i],
            y:            e.positions_y[i],
            radius:       e.radius[i],
            facing:       e.facing[i],
            hp_ratio:     e.hp_ratio(i),
            hit_flash:    e.hit_flash[i],
            is_boss:      e.is_boss[i],
            sprite:       assets.sprite(e.archetype_id[i]),
        });
    }

    // 遅延中の攻撃はまだ描かない
    let attacks = w
        .attacks
        .attacks
        .iter()
        .filter(|a| a.alive && !a.is_pending(w.now_ms))
        .map(|a| AttackSprite {
            weapon:   a.weapon,
            x:        a.x,
            y:        a.y,
            half_w:   a.half_w,
            half_h:   a.half_h,
            progress: a.progress(w.now_ms),
            trail:    match &a.motion {
                AttackMotion::Ricochet { trail, .. } => trail.clone(),
                _ => Vec::new(),
            },
        })
        .collect();

    let p = &w.projectiles;
    let projectiles = (0..p.len())
        .filter(|&i| p.alive[i])
        .map(|i| ProjectileSprite {
            x:         p.positions_x[i],
            y:         p.positions_y[i],
            radius:    p.radius[i],
            from_boss: p.from_boss[i],
        })
        .collect();

    let pt = &w.particles;
    let particles = (0..pt.len())
        .filter(|&i| pt.alive[i])
        .map(|i| ParticleSprite {
            x:     pt.positions_x[i],
            y:     pt.positions_y[i],
            color: pt.color[i],
            alpha: pt.alpha(i),
            size:  pt.size[i],
        })
        .collect();

    let obstacles = w.collision.obstacles.iter().map(|o| (o.x, o.y, o.radius, o.kind)).collect();

    let screen_flash_alpha = if w.player.invincible_timer > 0.0 && INVINCIBLE_DURATION > 0.0 {
        // 被弾直後に強く、無敵時間の減衰にあわせて弱くする（最大 0.5）
        (w.player.invincible_timer / INVINCIBLE_DURATION).clamp(0.0, 1.0) * 0.5
    } else {
        0.0
    };

    let hud = HudData {
        hp:               w.player.hp.max(0),
        max_hp:           w.player.max_hp,
        elapsed_seconds:  w.elapsed_seconds,
        level:            w.player.level,
        exp:              w.player.exp,
        exp_to_next:      exp_required_for_next(w.player.level).saturating_sub(w.player.exp),
        enemy_count:      e.count,
        projectile_count: p.count,
        kill_count:       w.kill_count,
        weapon_levels:    w.player.weapon_slots.iter().map(|s| (s.kind, s.level)).collect(),
        boss_info,
        next_boss_in:     w
            .spawn
            .next_boss_time()
            .filter(|_| w.spawn.boss_enabled)
            .map(|t| (t - w.elapsed_seconds).max(0.0)),
        screen_flash_alpha,
    };

    RenderFrame {
        frame_id: w.frame_id,
        camera: w.viewport(),
        alpha: alpha.clamp(0.0, 1.0),
        player: PlayerSprite {
            x:          w.player.x,
            y:          w.player.y,
            radius:     w.player.radius,
            facing:     w.player.facing,
            invincible: w.player.invincible_timer > 0.0,
        },
        enemies,
        attacks,
        projectiles,
        particles,
        obstacles,
        hud,
    }
}

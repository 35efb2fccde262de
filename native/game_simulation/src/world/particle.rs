//! Path: native/game_simulation/src/world/particle.rs
//! Summary: パーティクル SoA（ParticleWorld）と 1 粒子分の更新（並列フェーズ用）

use game_core::constants::PARTICLE_GRAVITY;
use game_core::physics::rng::SimpleRng;

/// 1 ティック後の粒子状態（ワーカーの戻り値）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleStep {
    pub x:        f32,
    pub y:        f32,
    pub vy:       f32,
    pub lifetime: f32,
}

/// パーティクル SoA（Structure of Arrays）
pub struct ParticleWorld {
    pub positions_x:  Vec<f32>,
    pub positions_y:  Vec<f32>,
    pub velocities_x: Vec<f32>,
    pub velocities_y: Vec<f32>,
    pub lifetime:     Vec<f32>,
    pub max_lifetime: Vec<f32>,
    pub color:        Vec<[f32; 4]>,
    pub size:         Vec<f32>,
    pub alive:        Vec<bool>,
    pub count:        usize,
    /// 見た目専用の乱数系列（ゲーム進行用の乱数とは分ける）
    rng:              SimpleRng,
    free_list:        Vec<usize>,
}

impl ParticleWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            positions_x:  Vec::new(),
            positions_y:  Vec::new(),
            velocities_x: Vec::new(),
            velocities_y: Vec::new(),
            lifetime:     Vec::new(),
            max_lifetime: Vec::new(),
            color:        Vec::new(),
            size:         Vec::new(),
            alive:        Vec::new(),
            count:        0,
            rng:          SimpleRng::new(seed),
            free_list:    Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[allow(clippy::too_many_arguments)]
    pub fn spawn_one(
        &mut self,
        x: f32, y: f32,
        vx: f32, vy: f32,
        lifetime: f32,
        color: [f32; 4],
        size: f32,
    ) {
        if let Some(i) = self.free_list.pop() {
            self.positions_x[i]  = x;
            self.positions_y[i]  = y;
            self.velocities_x[i] = vx;
            self.velocities_y[i] = vy;
            self.lifetime[i]     = lifetime;
            self.max_lifetime[i] = lifetime;
            self.color[i]        = color;
            self.size[i]         = size;
            self.alive[i]        = true;
        } else {
            self.positions_x.push(x);
            self.positions_y.push(y);
            self.velocities_x.push(vx);
            self.velocities_y.push(vy);
            self.lifetime.push(lifetime);
            self.max_lifetime.push(lifetime);
            self.color.push(color);
            self.size.push(size);
            self.alive.push(true);
        }
        self.count += 1;
    }

    /// 放射状にばら撒く（撃破・被弾エフェクト）
    pub fn emit(&mut self, x: f32, y: f32, count: usize, color: [f32; 4]) {
        for _ in 0..count {
            let angle = self.rng.next_f32() * std::f32::consts::TAU;
            let speed = 50.0 + self.rng.next_f32() * 150.0;
            let lifetime = 0.3 + self.rng.next_f32() * 0.4;
            let size = 4.0 + self.rng.next_f32() * 4.0;
            self.spawn_one(x, y, angle.cos() * speed, angle.sin() * speed, lifetime, color, size);
        }
    }

    pub fn kill(&mut self, i: usize) {
        if self.alive[i] {
            self.alive[i] = false;
            self.count = self.count.saturating_sub(1);
            self.free_list.push(i);
        }
    }

    pub fn live_slots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.alive[i]).collect()
    }

    /// 移動 + 重力 + 寿命（読み取りのみ）
    pub fn step_one(&self, i: usize, dt: f32) -> ParticleStep {
        ParticleStep {
            x:        self.positions_x[i] + self.velocities_x[i] * dt,
            y:        self.positions_y[i] + self.velocities_y[i] * dt,
            vy:       self.velocities_y[i] + PARTICLE_GRAVITY * dt,
            lifetime: self.lifetime[i] - dt,
        }
    }

    pub fn apply_step(&mut self, i: usize, step: ParticleStep) {
        self.positions_x[i]  = step.x;
        self.positions_y[i]  = step.y;
        self.velocities_y[i] = step.vy;
        self.lifetime[i]     = step.lifetime;
        if step.lifetime <= 0.0 {
            self.kill(i);
        }
    }

    /// フェードアウト用のアルファ
    pub fn alpha(&self, i: usize) -> f32 {
        if self.max_lifetime[i] <= 0.0 {
            return 0.0;
        }
        (self.lifetime[i] / self.max_lifetime[i]).clamp(0.0, 1.0)
    }
}

use super::super::StepContext;
use crate::scheduler::Phase;
use crate::world::GameWorldInner;

/// 撃破時のパーティクル数
pub(crate) const KILL_PARTICLES: usize = 8;
pub(crate) const BOSS_KILL_PARTICLES: usize = 32;
/// 被弾時（プレイヤー）
pub(crate) const HURT_PARTICLES: usize = 6;
pub(crate) const HURT_COLOR: [f32; 4] = [1.0, 0.15, 0.15, 1.0];

pub(crate) fn update_particles(w: &mut GameWorldInner, ctx: &StepContext<'_>, dt: f32) {
    if w.particles.is_empty() {
        return;
    }
    let slots = w.particles.live_slots();
    let steps = {
        let particles = &w.particles;
        ctx.metrics.time_phase(Phase::ParticleUpdate, || {
            ctx.scheduler
                .map_phase(Phase::ParticleUpdate, &slots, |&i| particles.step_one(i, dt))
        })
    };
    for (&i, s) in slots.iter().zip(steps) {
        w.particles.apply_step(i, s);
    }
}

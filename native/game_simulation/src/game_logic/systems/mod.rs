pub(crate) mod attacks;
pub(crate) mod collision;
pub(crate) mod cull;
pub(crate) mod effects;
pub(crate) mod enemy_fire;
pub(crate) mod leveling;
pub(crate) mod movement;
pub(crate) mod player;
pub(crate) mod player_damage;
pub(crate) mod projectiles;
pub(crate) mod spawn;
pub(crate) mod weapons;

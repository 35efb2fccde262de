//! Path: native/game_simulation/src/world/attack.rs
//! Summary: 生存中の AttackInstance 一覧（ID 採番・期限切れの掃除）

use game_core::attack::AttackInstance;

#[derive(Clone, Debug)]
pub struct AttackWorld {
    pub attacks: Vec<AttackInstance>,
    next_id:     u64,
}

impl Default for AttackWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl AttackWorld {
    pub fn new() -> Self {
        Self { attacks: Vec::new(), next_id: 1 }
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// ID を振って追加する
    pub fn push(&mut self, mut attack: AttackInstance) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        attack.id = id;
        self.attacks.push(attack);
        id
    }

    pub fn extend<I: IntoIterator<Item = AttackInstance>>(&mut self, attacks: I) {
        for a in attacks {
            self.push(a);
        }
    }

    /// 消滅・期限切れを取り除く（順序は保つ）
    pub fn sweep(&mut self, now_ms: f64) -> usize {
        let before = self.attacks.len();
        self.attacks.retain(|a| a.alive && !a.is_expired(now_ms));
        before - self.attacks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::attack::AttackMotion;
    use game_core::weapon::WeaponKind;

    fn pulse(now: f64, life: f64) -> AttackInstance {
        AttackInstance::new(
            WeaponKind::Garlic, 0.0, 0.0, 10.0, 10.0, 5, 0.0, now, life,
            WeaponKind::Garlic.hit_policy(),
            AttackMotion::FollowWielder { offset_x: 0.0, offset_y: 0.0 },
        )
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut w = AttackWorld::new();
        let a = w.push(pulse(0.0, 100.0));
        let b = w.push(pulse(0.0, 100.0));
        assert!(b > a);
        let ids: Vec<u64> = w.attacks.iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn sweep_drops_expired_and_dead() {
        let mut w = AttackWorld::new();
        w.push(pulse(0.0, 100.0));
        let keep = w.push(pulse(0.0, 1_000.0));
        let dead = w.push(pulse(0.0, 1_000.0));
        if let Some(a) = w.attacks.iter_mut().find(|a| a.id == dead) {
            a.alive = false;
        }
        assert_eq!(w.sweep(500.0), 2);
        assert_eq!(w.attacks.len(), 1);
        assert_eq!(w.attacks[0].id, keep);
    }
}

//! Path: native/game_simulation/src/world/game_loop_control.rs
//! Summary: ループ制御用（pause/resume）。別スレッドから Arc 経由で操作できる。

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct GameLoopControl {
    paused: AtomicBool,
}

impl GameLoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn pause_is_visible_across_threads() {
        let c = Arc::new(GameLoopControl::new());
        let c2 = Arc::clone(&c);
        std::thread::spawn(move || c2.pause()).join().unwrap();
        assert!(c.is_paused());
        c.resume();
        assert!(!c.is_paused());
    }
}

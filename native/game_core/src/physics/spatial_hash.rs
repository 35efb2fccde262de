//! Path: native/game_core/src/physics/spatial_hash.rs
//! Summary: 一様グリッドの空間ハッシュ（近傍クエリ）と静的障害物ワールド

use rustc_hash::FxHashMap;

pub struct SpatialHash {
    pub cell_size: f32,
    cells: FxHashMap<(i32, i32), Vec<usize>>,
    len: usize,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: FxHashMap::default(),
            len: 0,
        }
    }

    /// 全バケットを空にする（Vec の容量は再利用する）
    pub fn clear(&mut self) {
        for ids in self.cells.values_mut() {
            ids.clear();
        }
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, id: usize, x: f32, y: f32) {
        let key = self.cell_key(x, y);
        self.cells.entry(key).or_default().push(id);
        self.len += 1;
    }

    /// 撃破された敵をバケットから外す。見つからなければ false
    pub fn remove(&mut self, id: usize, x: f32, y: f32) -> bool {
        let key = self.cell_key(x, y);
        if let Some(ids) = self.cells.get_mut(&key) {
            if let Some(pos) = ids.iter().position(|&v| v == id) {
                ids.swap_remove(pos);
                self.len = self.len.saturating_sub(1);
                return true;
            }
        }
        false
    }

    pub fn cell_key(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// 指定円の範囲内にあるセルのエンティティ ID を `buf` に書き込む（アロケーションなし）。
    /// 呼び出し前に `buf` をクリアする必要はない（内部で `clear()` する）。
    pub fn query_nearby_into(&self, x: f32, y: f32, radius: f32, buf: &mut Vec<usize>) {
        buf.clear();
        let r = (radius / self.cell_size).ceil() as i32;
        let (cx, cy) = self.cell_key(x, y);
        for ix in (cx - r)..=(cx + r) {
            for iy in (cy - r)..=(cy + r) {
                if let Some(ids) = self.cells.get(&(ix, iy)) {
                    buf.extend_from_slice(ids);
                }
            }
        }
    }

    pub fn query_nearby(&self, x: f32, y: f32, radius: f32) -> Vec<usize> {
        let mut buf = Vec::new();
        self.query_nearby_into(x, y, radius, &mut buf);
        buf
    }

    /// 自セル + 周囲 8 セル。`own_cell_only` のときは自セルのみ（高負荷時）
    pub fn query_neighborhood_into(&self, x: f32, y: f32, own_cell_only: bool, buf: &mut Vec<usize>) {
        buf.clear();
        let (cx, cy) = self.cell_key(x, y);
        if own_cell_only {
            if let Some(ids) = self.cells.get(&(cx, cy)) {
                buf.extend_from_slice(ids);
            }
            return;
        }
        for ix in (cx - 1)..=(cx + 1) {
            for iy in (cy - 1)..=(cy + 1) {
                if let Some(ids) = self.cells.get(&(ix, iy)) {
                    buf.extend_from_slice(ids);
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticObstacle {
    pub x:      f32,
    pub y:      f32,
    pub radius: f32,
    pub kind:   u8,
}

/// 静的障害物（円）の集合と、その検索用ハッシュ
pub struct CollisionWorld {
    pub static_hash: SpatialHash,
    pub obstacles:   Vec<StaticObstacle>,
    max_radius:      f32,
}

impl CollisionWorld {
    pub fn new(cell_size: f32) -> Self {
        Self {
            static_hash: SpatialHash::new(cell_size),
            obstacles:   Vec::new(),
            max_radius:  0.0,
        }
    }

    pub fn rebuild_static(&mut self, obstacles: &[StaticObstacle]) {
        self.obstacles.clear();
        self.static_hash.clear();
        self.max_radius = 0.0;
        for o in obstacles {
            let idx = self.obstacles.len();
            self.obstacles.push(*o);
            self.static_hash.insert(idx, o.x, o.y);
            self.max_radius = self.max_radius.max(o.radius);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// 半径 `radius` の円と重なる障害物を `buf` に集める
    pub fn query_static_nearby_into(
        &self,
        x: f32, y: f32, radius: f32,
        buf: &mut Vec<usize>,
    ) {
        buf.clear();
        if self.obstacles.is_empty() {
            return;
        }
        self.static_hash.query_nearby_into(x, y, radius + self.max_radius, buf);
        let obstacles = &self.obstacles;
        buf.retain(|&idx| {
            if let Some(o) = obstacles.get(idx) {
                let hit_r = radius + o.radius;
                let dx = x - o.x;
                let dy = y - o.y;
                dx * dx + dy * dy <= hit_r * hit_r
            } else {
                false
            }
        });
    }

    /// 円が障害物と重なるか（バッファを使わない判定用）
    pub fn overlaps_circle(&self, x: f32, y: f32, radius: f32) -> bool {
        if self.obstacles.is_empty() {
            return false;
        }
        let mut buf = Vec::new();
        self.query_static_nearby_into(x, y, radius, &mut buf);
        !buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighborhood_covers_adjacent_cells_only() {
        let mut h = SpatialHash::new(10.0);
        h.insert(0, 5.0, 5.0);   // (0,0)
        h.insert(1, 15.0, 5.0);  // (1,0)
        h.insert(2, 35.0, 5.0);  // (3,0)
        let mut buf = Vec::new();
        h.query_neighborhood_into(5.0, 5.0, false, &mut buf);
        buf.sort();
        assert_eq!(buf, vec![0, 1]);
        h.query_neighborhood_into(5.0, 5.0, true, &mut buf);
        assert_eq!(buf, vec![0]);
    }

    #[test]
    fn negative_coordinates_bucket_separately() {
        let mut h = SpatialHash::new(10.0);
        h.insert(0, -1.0, -1.0);
        assert_eq!(h.cell_key(-1.0, -1.0), (-1, -1));
        assert_eq!(h.query_nearby(-5.0, -5.0, 1.0), vec![0]);
    }

    #[test]
    fn remove_drops_only_that_id() {
        let mut h = SpatialHash::new(10.0);
        h.insert(3, 1.0, 1.0);
        h.insert(4, 2.0, 2.0);
        assert!(h.remove(3, 1.0, 1.0));
        assert!(!h.remove(3, 1.0, 1.0));
        assert_eq!(h.len(), 1);
        assert_eq!(h.query_nearby(1.0, 1.0, 1.0), vec![4]);
    }

    #[test]
    fn clear_keeps_nothing() {
        let mut h = SpatialHash::new(10.0);
        h.insert(0, 1.0, 1.0);
        h.clear();
        assert!(h.is_empty());
        assert!(h.query_nearby(1.0, 1.0, 50.0).is_empty());
    }

    #[test]
    fn static_query_filters_by_real_overlap() {
        let mut w = CollisionWorld::new(80.0);
        w.rebuild_static(&[
            StaticObstacle { x: 100.0, y: 100.0, radius: 20.0, kind: 0 },
            StaticObstacle { x: 300.0, y: 100.0, radius: 20.0, kind: 0 },
        ]);
        let mut buf = Vec::new();
        w.query_static_nearby_into(125.0, 100.0, 10.0, &mut buf);
        assert_eq!(buf, vec![0]);
        assert!(!w.overlaps_circle(200.0, 100.0, 10.0));
    }
}

//! Per-frame corner keyframes
//!
//! A [`CornerKeyframes`] store maps frame numbers to quads. Looking up a
//! frame returns the quad at the greatest key at or before it. Key 0 is
//! the fallback and exists as soon as anything has been stored, so every
//! frame resolves once the store is non-empty.
//!
//! In fixed mode only key 0 is used: reads resolve to it and writes land
//! on it whatever frame they name.

use rectify_core::Quad;
use std::collections::BTreeMap;

/// Sparse corner data as stored on disk: frame -> `[[x, y]; 4]`
pub type SparseCorners = BTreeMap<u32, [[f64; 2]; 4]>;

/// Frame-indexed quads with an optional fixed mode
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CornerKeyframes {
    keys: BTreeMap<u32, Quad>,
    fixed: bool,
}

impl CornerKeyframes {
    /// Create an empty store in per-frame mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store in fixed mode
    pub fn new_fixed() -> Self {
        Self {
            keys: BTreeMap::new(),
            fixed: true,
        }
    }

    /// Create a fixed store holding `quad` for every frame
    pub fn with_fixed_quad(quad: Quad) -> Self {
        let mut store = Self::new_fixed();
        store.set(0, quad);
        store
    }

    /// Returns `true` in fixed mode
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Returns `true` if no quad has been stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of keyframes
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Iterate over `(frame, quad)` in frame order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Quad)> {
        self.keys.iter().map(|(&k, q)| (k, q))
    }

    /// The key a read of `frame` resolves to: 0 in fixed mode, otherwise
    /// the greatest key at or before `frame`, or 0 when there is none.
    pub fn key_frame(&self, frame: u32) -> u32 {
        if self.fixed {
            return 0;
        }
        self.keys
            .range(..=frame)
            .next_back()
            .map(|(&k, _)| k)
            .unwrap_or(0)
    }

    /// The key a write at `frame` lands on
    #[inline]
    pub fn write_key(&self, frame: u32) -> u32 {
        if self.fixed { 0 } else { frame }
    }

    /// The quad in effect at `frame`, or `None` if the store is empty.
    pub fn resolve(&self, frame: u32) -> Option<Quad> {
        self.keys.get(&self.key_frame(frame)).copied()
    }

    /// Store `quad` at `frame` (key 0 in fixed mode).
    ///
    /// The first write into an empty store also lands on key 0, so the
    /// fallback always exists.
    pub fn set(&mut self, frame: u32, quad: Quad) {
        let key = self.write_key(frame);
        if self.keys.is_empty() && key != 0 {
            self.keys.insert(0, quad);
        }
        self.keys.insert(key, quad);
    }

    /// Remove the keyframe that `frame` resolves to.
    ///
    /// Key 0 is never removed. Returns the removed key.
    pub fn delete(&mut self, frame: u32) -> Option<u32> {
        let key = self.key_frame(frame);
        if key == 0 {
            return None;
        }
        self.keys.remove(&key).map(|_| key)
    }

    /// Switch between fixed and per-frame mode.
    ///
    /// Entering fixed mode keeps the quad in effect at `current_frame` as
    /// key 0 and drops every other key. Leaving it keeps key 0 as is.
    pub fn set_fixed(&mut self, fixed: bool, current_frame: u32) {
        if fixed
            && !self.fixed
            && let Some(quad) = self.resolve(current_frame)
        {
            self.keys.clear();
            self.keys.insert(0, quad);
        }
        self.fixed = fixed;
    }

    /// Export as a sparse frame -> coordinates map
    pub fn to_sparse(&self) -> SparseCorners {
        self.keys.iter().map(|(&k, q)| (k, q.to_coords())).collect()
    }

    /// Build from a sparse frame -> coordinates map.
    ///
    /// If key 0 is missing, the earliest stored quad is copied to it. In
    /// fixed mode only the quad in effect at frame 0 is kept.
    pub fn from_sparse(sparse: &SparseCorners, fixed: bool) -> Self {
        let mut keys: BTreeMap<u32, Quad> = sparse
            .iter()
            .map(|(&k, c)| (k, Quad::from_coords(*c)))
            .collect();
        if let Some((_, &first)) = keys.iter().next() {
            keys.entry(0).or_insert(first);
        }
        let mut store = Self { keys, fixed: false };
        store.set_fixed(fixed, 0);
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(v: f64) -> Quad {
        Quad::rectangle(v, v, v + 10.0, v + 10.0)
    }

    #[test]
    fn test_empty_store() {
        let store = CornerKeyframes::new();
        assert!(store.resolve(0).is_none());
        assert_eq!(store.key_frame(7), 0);
    }

    #[test]
    fn test_first_write_seeds_key_zero() {
        let mut store = CornerKeyframes::new();
        store.set(12, q(1.0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.resolve(0), Some(q(1.0)));
        assert_eq!(store.resolve(12), Some(q(1.0)));
    }

    #[test]
    fn test_resolve_last_key_at_or_before() {
        let mut store = CornerKeyframes::new();
        store.set(0, q(0.0));
        store.set(10, q(10.0));
        store.set(25, q(25.0));
        assert_eq!(store.resolve(5), Some(q(0.0)));
        assert_eq!(store.resolve(10), Some(q(10.0)));
        assert_eq!(store.resolve(24), Some(q(10.0)));
        assert_eq!(store.resolve(25), Some(q(25.0)));
        assert_eq!(store.resolve(1000), Some(q(25.0)));
    }

    #[test]
    fn test_delete_never_removes_key_zero() {
        let mut store = CornerKeyframes::new();
        store.set(0, q(0.0));
        store.set(10, q(10.0));
        assert_eq!(store.delete(3), None);
        assert_eq!(store.delete(14), Some(10));
        assert_eq!(store.resolve(14), Some(q(0.0)));
        assert_eq!(store.delete(14), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fixed_mode_collapses() {
        let mut store = CornerKeyframes::new();
        store.set(0, q(0.0));
        store.set(10, q(10.0));
        store.set(25, q(25.0));

        store.set_fixed(true, 12);
        assert_eq!(store.len(), 1);
        assert_eq!(store.resolve(0), Some(q(10.0)));
        assert_eq!(store.resolve(99), Some(q(10.0)));

        store.set(40, q(40.0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.resolve(3), Some(q(40.0)));

        store.set_fixed(false, 0);
        store.set(5, q(5.0));
        assert_eq!(store.resolve(2), Some(q(40.0)));
        assert_eq!(store.resolve(6), Some(q(5.0)));
    }

    #[test]
    fn test_sparse_roundtrip() {
        let mut store = CornerKeyframes::new();
        store.set(0, q(0.0));
        store.set(8, q(8.0));
        let sparse = store.to_sparse();
        assert_eq!(sparse.keys().copied().collect::<Vec<_>>(), vec![0, 8]);
        assert_eq!(CornerKeyframes::from_sparse(&sparse, false), store);
    }

    #[test]
    fn test_from_sparse_without_key_zero() {
        let mut sparse = SparseCorners::new();
        sparse.insert(4, q(4.0).to_coords());
        sparse.insert(9, q(9.0).to_coords());
        let store = CornerKeyframes::from_sparse(&sparse, false);
        assert_eq!(store.resolve(0), Some(q(4.0)));

        let fixed = CornerKeyframes::from_sparse(&sparse, true);
        assert!(fixed.is_fixed());
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed.resolve(9), Some(q(4.0)));
    }
}

//! Two growing, parallel buffers — frequencies and per-point
//! payloads — with the reshape policy used at the data-to-noise
//! transition.

const INITIAL_POINTS_CAPACITY: usize = 512;

/// Holds the accumulated sweep since the last flush. `frequencies()[i]`
/// is the i-th point's frequency in Hz; `data()[i*E..(i+1)*E]` is its
/// payload, where `E` is the current element size.
pub struct SweepStore {
    freq: Vec<f64>,
    data: Vec<f64>,
    element_size: usize,
}

impl SweepStore {
    pub fn new(element_size: usize) -> Self {
        SweepStore {
            freq: Vec::with_capacity(INITIAL_POINTS_CAPACITY),
            data: Vec::with_capacity(INITIAL_POINTS_CAPACITY * element_size),
            element_size,
        }
    }

    pub fn count(&self) -> usize {
        self.freq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.freq
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Appends one sweep point. `payload.len()` must equal the
    /// store's current element size.
    pub fn push(&mut self, freq_hz: f64, payload: &[f64]) {
        debug_assert_eq!(payload.len(), self.element_size);
        self.freq.push(freq_hz);
        self.data.extend_from_slice(payload);
    }

    /// Resets point count to zero, retaining buffer capacity.
    pub fn clear(&mut self) {
        self.freq.clear();
        self.data.clear();
    }

    /// Rescales the data buffer's capacity for a new element size,
    /// keeping the same point-count capacity (mirrors the original "shrink the
    /// remaining capacity as `sweep_size * 2N^2 / 5`" generalizes to
    /// "keep point capacity, rescale element width").
    pub fn reshape(&mut self, new_element_size: usize) {
        let points_capacity = self.freq.capacity().max(INITIAL_POINTS_CAPACITY);
        self.element_size = new_element_size;
        self.data = Vec::with_capacity(points_capacity * new_element_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_grows_both_buffers_in_parallel() {
        let mut store = SweepStore::new(2);
        store.push(1e9, &[0.5, 1.0]);
        store.push(2e9, &[0.6, 1.1]);
        assert_eq!(store.count(), 2);
        assert_eq!(store.frequencies(), &[1e9, 2e9]);
        assert_eq!(store.data(), &[0.5, 1.0, 0.6, 1.1]);
    }

    #[test]
    fn clear_resets_count_but_keeps_capacity() {
        let mut store = SweepStore::new(2);
        store.push(1e9, &[0.5, 1.0]);
        let cap_before = store.data.capacity();
        store.clear();
        assert_eq!(store.count(), 0);
        assert_eq!(store.data.capacity(), cap_before);
    }

    #[test]
    fn reshape_changes_element_size_for_next_pushes() {
        let mut store = SweepStore::new(8);
        store.clear();
        store.reshape(4);
        store.push(1e9, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(store.data(), &[1.0, 2.0, 3.0, 4.0]);
    }
}

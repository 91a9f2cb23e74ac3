//! Holds the in-progress value set for one sweep point and detects
//! when it is complete, plus the version-1 port-count
//! inference helper.

/// Growable buffer of doubles for the sweep point currently being
/// assembled. The first token is always a frequency in option-line
/// units; the rest is the matrix (or noise) payload.
#[derive(Default)]
pub struct SweepAccumulator {
    data_set: Vec<f64>,
}

impl SweepAccumulator {
    pub fn new() -> Self {
        SweepAccumulator {
            data_set: Vec::with_capacity(512),
        }
    }

    pub fn len(&self) -> usize {
        self.data_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_set.is_empty()
    }

    pub fn extend(&mut self, tokens: &[f64]) {
        self.data_set.extend_from_slice(tokens);
    }

    /// Removes and returns the first `n` values as a completed set,
    /// leaving any remaining values buffered for the next set.
    /// The second element of the tuple is `true` when there were more
    /// than `n` values buffered (more tokens than expected).
    pub fn take_set(&mut self, n: usize) -> (Vec<f64>, bool) {
        let excess = self.data_set.len() > n;
        let split_at = n.min(self.data_set.len());
        let rest = self.data_set.split_off(split_at);
        let done = std::mem::replace(&mut self.data_set, rest);
        (done, excess)
    }

    /// Drains every buffered value, regardless of expected length.
    /// Used by end-of-stream port-count inference.
    pub fn take_all(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.data_set)
    }
}

/// Infers `num_ports` from a completed version-1 data set whose total
/// length (frequency + payload) is `len`. Succeeds iff
/// `(len - 1) / 2` is a perfect square.
pub fn infer_num_ports(len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let payload = len - 1;
    if payload % 2 != 0 {
        return None;
    }
    let half = payload / 2;
    let n = isqrt(half);
    if n * n == half {
        Some(n)
    } else {
        None
    }
}

fn isqrt(x: usize) -> usize {
    if x == 0 {
        return 0;
    }
    let mut r = (x as f64).sqrt() as usize;
    while r * r > x {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= x {
        r += 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_set_splits_exact_length() {
        let mut acc = SweepAccumulator::new();
        acc.extend(&[1.0, 0.5, 90.0]);
        let (set, excess) = acc.take_set(3);
        assert_eq!(set, vec![1.0, 0.5, 90.0]);
        assert!(!excess);
        assert!(acc.is_empty());
    }

    #[test]
    fn take_set_buffers_overshoot_for_next_set() {
        let mut acc = SweepAccumulator::new();
        acc.extend(&[1.0, 0.5, 90.0, 2.0]);
        let (set, excess) = acc.take_set(3);
        assert_eq!(set, vec![1.0, 0.5, 90.0]);
        assert!(excess);
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn infers_one_port() {
        // 1 freq + 2 values (re, im)
        assert_eq!(infer_num_ports(3), Some(1));
    }

    #[test]
    fn infers_two_port() {
        // 1 freq + 8 values
        assert_eq!(infer_num_ports(9), Some(2));
    }

    #[test]
    fn rejects_non_square_payload() {
        assert_eq!(infer_num_ports(6), None);
    }

    #[test]
    fn rejects_odd_payload() {
        assert_eq!(infer_num_ports(4), None);
    }
}

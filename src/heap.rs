//! A small hand-rolled binary min-heap keyed by `f64`.
//!
//! Mirrors the teacher's `MinHeap`/sift-up/sift-down idiom (a plain `Vec`
//! with explicit sift operations) rather than wrapping the standard
//! library's max-heap `BinaryHeap` with a per-call-site `Ord`-reversing
//! newtype. Shared by the IP growth queue and the CCO candidate queue,
//! both of which pop entries in ascending key order.

pub struct MinHeap<T> {
    data: Vec<(f64, T)>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        MinHeap { data: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        MinHeap { data: Vec::with_capacity(cap) }
    }

    pub fn push(&mut self, key: f64, value: T) {
        self.data.push((key, value));
        self.sift_up(self.data.len() - 1);
    }

    pub fn pop(&mut self) -> Option<(f64, T)> {
        let n = self.data.len();
        if n == 0 {
            return None;
        }
        self.data.swap(0, n - 1);
        let out = self.data.pop();
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = (i - 1) / 2;
            if self.data[i].0 < self.data[p].0 {
                self.data.swap(i, p);
                i = p;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.data.len();
        loop {
            let l = i * 2 + 1;
            if l >= n {
                break;
            }
            let r = l + 1;
            let mut best = l;
            if r < n && self.data[r].0 < self.data[l].0 {
                best = r;
            }
            if self.data[best].0 < self.data[i].0 {
                self.data.swap(i, best);
                i = best;
            } else {
                break;
            }
        }
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_ascending_key_order() {
        let mut h = MinHeap::new();
        for (k, v) in [(5.0, 'e'), (1.0, 'a'), (3.0, 'c'), (2.0, 'b'), (4.0, 'd')] {
            h.push(k, v);
        }
        let mut out = Vec::new();
        while let Some((_, v)) = h.pop() {
            out.push(v);
        }
        assert_eq!(out, vec!['a', 'b', 'c', 'd', 'e']);
    }

    #[test]
    fn empty_heap_pops_none() {
        let mut h: MinHeap<()> = MinHeap::new();
        assert!(h.is_empty());
        assert!(h.pop().is_none());
    }
}

/// Keep every `n`-th element of a sequence, starting with the first.
///
/// `n` is coerced to at least 1, so a zero factor is a no-op rather than a
/// panic. Order-preserving; empty input yields empty output. The result has
/// exactly `ceil(len / n)` elements.
pub fn decimate<T: Clone>(seq: &[T], n: usize) -> Vec<T> {
    seq.iter().step_by(n.max(1)).cloned().collect()
}

use rand::Rng;

/// Source of message indices. Implementations must return a value in
/// `0..len`; `len` is never zero.
pub trait IndexSource: Send + Sync {
    fn next_index(&self, len: usize) -> usize;
}

/// Uniform draw from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
    fn next_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_rng_stays_in_range() {
        let source = ThreadRngSource;
        for len in [1, 2, 3, 17] {
            for _ in 0..500 {
                assert!(source.next_index(len) < len);
            }
        }
    }

    #[test]
    fn single_entry_catalog_always_draws_zero() {
        assert_eq!(ThreadRngSource.next_index(1), 0);
    }
}

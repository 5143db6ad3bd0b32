//! Seeded train/test split.

/// Row indices for the training and held-out partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n` with a seeded generator and holds out
/// `ceil(n * test_fraction)` rows. The same seed always yields the same split.
#[must_use]
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = oorandom::Rand64::new(u128::from(seed));
    for i in (1..indices.len()).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        indices.swap(i, j);
    }

    let n_test = ((n as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = n_test.min(n);
    let train = indices.split_off(n_test);
    Split {
        train,
        test: indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_fraction() {
        let split = train_test_split(10, 0.2, 42);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let split = train_test_split(11, 0.2, 42);
        assert_eq!(split.test.len(), 3);
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let split = train_test_split(100, 0.2, 7);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn deterministic_for_seed() {
        assert_eq!(train_test_split(50, 0.2, 42), train_test_split(50, 0.2, 42));
        assert_ne!(
            train_test_split(50, 0.2, 42).test,
            train_test_split(50, 0.2, 43).test
        );
    }

    #[test]
    fn empty_input() {
        let split = train_test_split(0, 0.2, 42);
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
    }
}

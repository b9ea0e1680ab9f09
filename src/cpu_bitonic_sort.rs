//! Single-threaded reference bitonic network.
//!
//! The classic iterative formulation: for every block size `k` and every partner
//! distance `j`, element `i` is compared with `i ^ j`. It computes the same network
//! as the pooled sort without any coordination, which makes it the oracle for tests
//! and the baseline for benchmarks.
//!
//! Complexity: O(n * log²n) comparisons

use crate::polarity::{Polarity, SwapDecision};

/// Sort a slice in place into `polarity` order using the bitonic network.
///
/// # Panics
/// Panics if the length is not a power of two (an empty slice is accepted).
pub fn sort(data: &mut [i32], polarity: Polarity) {
    let n = data.len();
    if n <= 1 {
        return;
    }

    assert!(n.is_power_of_two(), "Bitonic sort requires power of 2 length, got {}", n);

    // k is the size of the bitonic sequence being merged
    let mut k = 2;
    while k <= n {
        // j is the distance between compared elements
        let mut j = k / 2;
        while j > 0 {
            for i in 0..n {
                let partner = i ^ j;
                if partner > i {
                    // The first block of each pair of k-blocks goes the target way
                    let direction = if (i & k) == 0 {
                        polarity
                    } else {
                        polarity.opposite()
                    };
                    if direction.should_swap(data[i], data[partner]) {
                        data.swap(i, partner);
                    }
                }
            }
            j /= 2;
        }
        k *= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_sort_empty() {
        let mut data: Vec<i32> = vec![];
        sort(&mut data, Polarity::Ascending);
        assert!(data.is_empty());
    }

    #[test]
    fn test_sort_single() {
        let mut data = vec![42];
        sort(&mut data, Polarity::Descending);
        assert_eq!(data, vec![42]);
    }

    #[test]
    fn test_sort_power_of_2() {
        let mut data: Vec<i32> = (0..16).rev().collect();
        sort(&mut data, Polarity::Ascending);
        assert_eq!(data, (0..16).collect::<Vec<i32>>());

        sort(&mut data, Polarity::Descending);
        assert_eq!(data, (0..16).rev().collect::<Vec<i32>>());
    }

    #[test]
    fn test_sort_random_power_of_2() {
        let mut rng = rand::thread_rng();
        for polarity in [Polarity::Ascending, Polarity::Descending] {
            let mut data: Vec<i32> = (0..1024).map(|_| rng.gen()).collect();
            sort(&mut data, polarity);
            assert!(polarity.is_ordered(&data));
        }
    }

    #[test]
    fn test_sort_duplicates_and_negatives() {
        let mut data = vec![5, -3, 5, 1, -3, 5, 1, 1];
        sort(&mut data, Polarity::Ascending);
        assert_eq!(data, vec![-3, -3, 1, 1, 1, 5, 5, 5]);
    }

    #[test]
    #[should_panic(expected = "Bitonic sort requires power of 2 length")]
    fn test_sort_non_power_of_2_panics() {
        let mut data = vec![1, 2, 3];
        sort(&mut data, Polarity::Ascending);
    }
}

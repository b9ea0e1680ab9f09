//! End-to-end checks of the public sort API.

use bitonic_pool::{cpu_bitonic_sort, sort, Polarity, SortConfig, SortError};
use rand::Rng;
use rstest::rstest;

fn random_data(len: usize) -> Vec<i32> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(-1000..1000)).collect()
}

#[rstest]
#[case(2)]
#[case(64)]
#[case(1024)]
fn test_result_is_ordered_permutation(#[case] len: usize) {
    let input = random_data(len);
    let mut data = input.clone();
    sort(&mut data, &SortConfig::default()).unwrap();

    assert!(Polarity::Ascending.is_ordered(&data));
    let mut expected = input;
    expected.sort_unstable();
    assert_eq!(data, expected);
}

#[rstest]
#[case(Polarity::Ascending)]
#[case(Polarity::Descending)]
fn test_matches_reference_network(#[case] polarity: Polarity) {
    let input = random_data(256);
    let mut pooled = input.clone();
    let mut reference = input;

    sort(&mut pooled, &SortConfig::default().with_polarity(polarity)).unwrap();
    cpu_bitonic_sort::sort(&mut reference, polarity);
    assert_eq!(pooled, reference);
}

#[test]
fn test_rounds_are_log2_of_length() {
    for exp in 0..=10u32 {
        let mut data = random_data(1 << exp);
        let report = sort(&mut data, &SortConfig::default().with_workers(3)).unwrap();
        assert_eq!(report.rounds, exp as usize);
    }
}

/// `0, 1, .., len/2 - 1` followed by `len, len - 1, ..` (or the mirror image).
fn bitonic_input(len: usize, rising_first: bool) -> Vec<i32> {
    let half = (len / 2) as i32;
    let mut data: Vec<i32> = (0..half).chain((half..len as i32).rev()).collect();
    if !rising_first {
        data.iter_mut().for_each(|v| *v = -*v);
    }
    data
}

#[rstest]
#[case(Polarity::Ascending, true)]
#[case(Polarity::Ascending, false)]
#[case(Polarity::Descending, true)]
#[case(Polarity::Descending, false)]
fn test_bitonic_input_converges_in_log2_rounds(
    #[case] polarity: Polarity,
    #[case] rising_first: bool,
) {
    let config = SortConfig::default()
        .with_workers(4)
        .with_polarity(polarity);
    for exp in 1..=10u32 {
        let len = 1usize << exp;
        let input = bitonic_input(len, rising_first);
        let mut data = input.clone();
        let report = sort(&mut data, &config).unwrap();

        assert_eq!(report.rounds, exp as usize, "len {len}");
        assert!(polarity.is_ordered(&data), "len {len}: {data:?}");
        let mut expected = input;
        expected.sort_unstable();
        if polarity == Polarity::Descending {
            expected.reverse();
        }
        assert_eq!(data, expected);
    }
}

#[test]
fn test_worker_count_does_not_change_result() {
    let mut single = vec![8, 7, 6, 5, 4, 3, 2, 1];
    let mut many = single.clone();
    sort(&mut single, &SortConfig::default().with_workers(1)).unwrap();
    sort(&mut many, &SortConfig::default().with_workers(8)).unwrap();
    assert_eq!(single, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(single, many);
}

#[test]
fn test_sorted_input_is_stable_under_resort() {
    let mut data: Vec<i32> = (0..128).collect();
    sort(&mut data, &SortConfig::default()).unwrap();
    assert_eq!(data, (0..128).collect::<Vec<i32>>());

    let descending = SortConfig::default().with_polarity(Polarity::Descending);
    sort(&mut data, &descending).unwrap();
    assert_eq!(data, (0..128).rev().collect::<Vec<i32>>());
}

#[test]
fn test_non_power_of_two_rejected() {
    let mut data = vec![3, 1, 2];
    let err = sort(&mut data, &SortConfig::default()).unwrap_err();
    assert!(matches!(err, SortError::InvalidLength { len: 3 }));
    assert_eq!(data, vec![3, 1, 2]);
}

#[test]
fn test_zero_workers_rejected() {
    let mut data = vec![2, 1];
    let err = sort(&mut data, &SortConfig::default().with_workers(0)).unwrap_err();
    assert_eq!(err.as_label(), "pool_zero_workers");
    assert_eq!(data, vec![2, 1]);
}

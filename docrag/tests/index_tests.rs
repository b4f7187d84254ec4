//! Property tests for flat index search ordering and persistence.

use docrag::{FlatIndex, RagError};
use proptest::prelude::*;

const DIM: usize = 8;

fn arb_vector() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-10.0f32..10.0f32, DIM)
}

fn arb_vectors() -> impl Strategy<Value = Vec<Vec<f32>>> {
    proptest::collection::vec(arb_vector(), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn stored_vector_is_its_own_nearest_neighbour(
        vectors in arb_vectors(),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = FlatIndex::build(DIM, &vectors).unwrap();
        let i = pick.index(vectors.len());

        let hits = index.search(&vectors[i], vectors.len()).unwrap();
        prop_assert_eq!(hits[0].distance, 0.0);
        // Exact duplicates at lower ordinals win the tie; otherwise it is `i`.
        let first_equal = vectors.iter().position(|v| v == &vectors[i]).unwrap();
        prop_assert_eq!(hits[0].ordinal, first_equal);
        prop_assert!(hits.iter().any(|n| n.ordinal == i && n.distance == 0.0));
    }

    #[test]
    fn results_are_bounded_and_non_decreasing(
        vectors in arb_vectors(),
        query in arb_vector(),
        k in 0usize..60,
    ) {
        let index = FlatIndex::build(DIM, &vectors).unwrap();
        let hits = index.search(&query, k).unwrap();

        prop_assert_eq!(hits.len(), k.min(vectors.len()));
        for pair in hits.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
            if pair[0].distance == pair[1].distance {
                prop_assert!(pair[0].ordinal < pair[1].ordinal);
            }
        }
    }

    #[test]
    fn top_k_is_a_prefix_of_the_full_ranking(
        vectors in arb_vectors(),
        query in arb_vector(),
        k in 1usize..40,
    ) {
        let index = FlatIndex::build(DIM, &vectors).unwrap();
        let full = index.search(&query, vectors.len()).unwrap();
        let top = index.search(&query, k).unwrap();
        prop_assert_eq!(&full[..top.len()], &top[..]);
    }

    #[test]
    fn decoded_index_answers_identically(
        vectors in arb_vectors(),
        query in arb_vector(),
        k in 1usize..40,
    ) {
        let index = FlatIndex::build(DIM, &vectors).unwrap();
        let decoded = FlatIndex::from_bytes(&index.to_bytes()).unwrap();

        prop_assert_eq!(decoded.len(), index.len());
        prop_assert_eq!(decoded.dimension(), index.dimension());
        for ordinal in 0..index.len() {
            let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
            prop_assert_eq!(bits(decoded.vector(ordinal).unwrap()), bits(index.vector(ordinal).unwrap()));
        }
        prop_assert_eq!(decoded.search(&query, k).unwrap(), index.search(&query, k).unwrap());
    }
}

#[test]
fn save_and_load_preserve_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vector_index.bin");
    let index = FlatIndex::build(2, [[3.0f32, 3.0], [1.0, 1.0], [2.0, 2.0]]).unwrap();

    index.save(&path).unwrap();
    let loaded = FlatIndex::load(&path).unwrap();

    assert_eq!(loaded.vector(0), Some(&[3.0f32, 3.0][..]));
    let ordinals: Vec<usize> =
        loaded.search(&[0.0, 0.0], 3).unwrap().iter().map(|n| n.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 0]);
}

#[test]
fn header_records_count_and_dimension() {
    let index = FlatIndex::build(3, [[1.0f32, 2.0, 3.0]]).unwrap();
    let bytes = index.to_bytes();

    assert_eq!(&bytes[..8], b"DRAGIDX1");
    assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 1);
    assert_eq!(u64::from_le_bytes(bytes[16..24].try_into().unwrap()), 3);
    assert_eq!(bytes.len(), 24 + 3 * 4);
}

#[test]
fn wrong_query_dimension_is_reported() {
    let index = FlatIndex::build(DIM, [vec![0.0f32; DIM]]).unwrap();
    let err = index.search(&[0.0; 3], 1).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: DIM, actual: 3 }));
}

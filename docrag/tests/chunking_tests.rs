//! Property tests for fixed-size chunking.

use docrag::{Chunker, FixedSizeChunker};
use proptest::prelude::*;

/// Arbitrary (size, overlap) with `overlap < size`.
fn arb_params() -> impl Strategy<Value = (usize, usize)> {
    (1usize..64).prop_flat_map(|size| (Just(size), 0..size))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Concatenate chunks, dropping the leading `overlap` characters of every
/// chunk after the first.
fn reassemble(chunks: &[String], overlap: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(chunk);
        } else {
            out.extend(chunk.chars().skip(overlap));
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn chunks_reconstruct_the_text(text in "\\PC{0,300}", (size, overlap) in arb_params()) {
        let chunks = FixedSizeChunker::new(size, overlap).unwrap().split(&text);
        prop_assert_eq!(reassemble(&chunks, overlap), text);
    }

    #[test]
    fn chunk_count_matches_closed_form(text in "[a-z ]{1,400}", (size, overlap) in arb_params()) {
        let len = char_len(&text);
        prop_assume!(len > overlap);
        let chunks = FixedSizeChunker::new(size, overlap).unwrap().split(&text);
        let step = size - overlap;
        prop_assert_eq!(chunks.len(), (len - overlap).div_ceil(step));
    }

    #[test]
    fn consecutive_chunks_overlap_exactly(text in "[a-z]{1,300}", (size, overlap) in arb_params()) {
        let chunks = FixedSizeChunker::new(size, overlap).unwrap().split(&text);
        for (i, pair) in chunks.windows(2).enumerate() {
            let tail: String = pair[0].chars().skip(char_len(&pair[0]) - overlap).collect();
            let head: String = pair[1].chars().take(overlap).collect();
            prop_assert_eq!(tail, head, "pair {} does not share the overlap", i);
        }
        // Only the last chunk may be short.
        if let Some((_, body)) = chunks.split_last() {
            prop_assert!(body.iter().all(|c| char_len(c) == size));
        }
    }

    #[test]
    fn zero_overlap_tiles_contiguously(text in "[a-z0-9]{0,200}", size in 1usize..40) {
        let chunks = FixedSizeChunker::new(size, 0).unwrap().split(&text);
        prop_assert_eq!(chunks.concat(), text);
        prop_assert!(chunks.iter().all(|c| !c.is_empty() && char_len(c) <= size));
    }
}

#[test]
fn empty_text_has_no_chunks_for_any_parameters() {
    for (size, overlap) in [(1, 0), (1000, 200), (5, 4)] {
        assert!(FixedSizeChunker::new(size, overlap).unwrap().split("").is_empty());
    }
}

#[test]
fn default_parameters_match_ingestion_defaults() {
    let text = "x".repeat(2500);
    let chunks = FixedSizeChunker::default().split(&text);
    let lengths: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(lengths, vec![1000, 1000, 900]);
}

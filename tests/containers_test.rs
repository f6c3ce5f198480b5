// containers_test.rs - Integration tests for the vectorized containers.

use strivec::container::*;
use strivec::index;
use strivec::prelude::*;

// === Recycling ===

#[test]
fn recycling_takes_longest_length() {
    let ctx = Context::default();
    assert_eq!(recycling_rule(&ctx, true, &[4, 2, 1]), 4);
    assert!(ctx.take_warnings().is_empty());
}

#[test]
fn recycling_zero_length_wins() {
    let ctx = Context::default();
    assert_eq!(recycling_rule(&ctx, true, &[5, 0, 3]), 0);
    assert!(ctx.take_warnings().is_empty());
}

#[test]
fn recycling_warns_on_fractional_multiple() {
    let ctx = Context::default();
    assert_eq!(recycling_rule(&ctx, true, &[3, 2]), 3);
    assert_eq!(ctx.take_warnings(), vec![Warning::RecyclingRule]);
    assert_eq!(recycling_rule(&ctx, false, &[3, 2]), 3);
    assert!(ctx.take_warnings().is_empty());
}

#[test]
fn base_collapses_to_empty() {
    let b = ContainerBase::new(0, 7, true);
    assert_eq!((b.n(), b.nrecycle()), (0, 0));
    assert_eq!(b.vectorize().count(), 0);
    let b = ContainerBase::new(3, 0, false);
    assert_eq!((b.n(), b.nrecycle()), (0, 0));
}

#[test]
fn deep_base_owns_every_index() {
    let b = ContainerBase::new(2, 5, false);
    assert_eq!(b.n(), 5);
    assert!(b.is_writable());
    assert_eq!(b.slot(4).unwrap(), 4);
    if cfg!(debug_assertions) {
        assert!(b.slot(5).is_err());
    }
}

#[test]
fn shallow_base_maps_to_slots() {
    let b = ContainerBase::new(2, 5, true);
    assert_eq!(b.n(), 2);
    assert!(!b.is_writable());
    let slots: Vec<usize> = b.vectorize().map(|i| b.slot(i).unwrap()).collect();
    assert_eq!(slots, vec![0, 1, 0, 1, 0]);
    assert!(b.check_writable(0).is_err());
}

// === Missing values ===

#[test]
fn na_recycles_with_its_slot() {
    let ctx = Context::default();
    let v = host_vec(&[Some("x"), None, Some("")]);
    let c = Utf8Container::new(&ctx, &v, 6, true).unwrap();
    let na: Vec<bool> = c.vectorize().map(|i| c.is_na(i)).collect();
    assert_eq!(na, vec![false, true, false, false, true, false]);
    assert!(c.get(4).is_err());
    assert_eq!(c.get(5).unwrap().as_str(), "");
}

#[test]
fn deep_container_writes_and_clears() {
    let ctx = Context::default();
    let v = host_vec(&[Some("a"), Some("b")]);
    let mut c = Utf8Container::new(&ctx, &v, 4, false).unwrap();
    c.set(3, "ż".to_string()).unwrap();
    c.set_na(0).unwrap();
    assert_eq!(
        host_strs(&c.to_host_all()),
        vec![None, Some("b"), Some("a"), Some("ż")]
    );
}

#[test]
fn utf16_matches_utf8_view() {
    let ctx = Context::default();
    let v = host_vec(&[Some("a😀ß"), None]);
    let c16 = Utf16Container::new(&ctx, &v, 2, true).unwrap();
    assert_eq!(c16.get(0).unwrap().len(), 4);
    assert!(c16.is_na(1));
    assert_eq!(host_strs(&c16.to_host_all()), vec![Some("a😀ß"), None]);
}

#[test]
fn list_container_recycles_elements() {
    let ctx = Context::default();
    let list: Vec<_> = vec![Some(host_vec(&[Some("p"), Some("q")])), None];
    let c = ListUtf8Container::new(&ctx, &list, 3, true).unwrap();
    assert!(!c.is_na(0));
    assert!(c.is_na(1));
    assert_eq!(c.get(2).unwrap().get(1).unwrap().as_str(), "q");
}

#[test]
fn int_container_recycles() {
    let v = [Some(1), None];
    let c = IntContainer::new(&v, 5);
    let got: Vec<Option<i32>> = c.vectorize().map(|i| c.get(i)).collect();
    assert_eq!(got, vec![Some(1), None, Some(1), None, Some(1)]);
}

// === Encodings ===

#[test]
fn latin1_is_converted_once() {
    let ctx = Context::default();
    let v = vec![Some(NativeString::latin1(b"na\xefve"))];
    let c = Utf8Container::new(&ctx, &v, 1, true).unwrap();
    assert_eq!(c.get(0).unwrap().as_str(), "naïve");
}

#[test]
fn invalid_utf8_is_rejected() {
    let ctx = Context::default();
    let v = vec![Some(NativeString::utf8_bytes(b"ab\xff"))];
    let err = Utf8Container::new(&ctx, &v, 1, true).unwrap_err();
    assert!(matches!(err, StriError::InvalidEncoding { index: 0, .. }));
}

#[test]
fn bytes_encoding_is_rejected() {
    let ctx = Context::default();
    let v = vec![Some(NativeString::bytes(b"\x00\x01"))];
    let err = Utf8Container::new(&ctx, &v, 1, true).unwrap_err();
    assert!(matches!(err, StriError::BytesEncoding));
}

// === Index translation ===

#[test]
fn cafe_forward_and_backward_offsets() {
    let ctx = Context::default();
    let v = host_vec(&[Some("café")]);
    let mut c = IndexableUtf8Container::new(&ctx, &v, 1).unwrap();
    assert_eq!(c.utf32_to_utf8_index_fwd(0, 3).unwrap(), 3);
    assert_eq!(c.utf32_to_utf8_index_back(0, 1).unwrap(), 3);
    assert_eq!(c.utf32_to_utf8_index_fwd(0, 4).unwrap(), 5);
    assert_eq!(c.utf32_to_utf8_index_back(0, 4).unwrap(), 0);
}

#[test]
fn offsets_clamp_at_both_ends() {
    let ctx = Context::default();
    let v = host_vec(&[Some("żół")]);
    let mut c = IndexableUtf8Container::new(&ctx, &v, 1).unwrap();
    assert_eq!(c.utf32_to_utf8_index_fwd(0, -3).unwrap(), 0);
    assert_eq!(c.utf32_to_utf8_index_fwd(0, 100).unwrap(), 6);
    assert_eq!(c.utf32_to_utf8_index_back(0, 0).unwrap(), 6);
    assert_eq!(c.utf32_to_utf8_index_back(0, 100).unwrap(), 0);
}

#[test]
fn cached_offsets_agree_with_fresh_walks() {
    let ctx = Context::default();
    let text = "aą😀bęc€d";
    let v = host_vec(&[Some(text)]);
    let mut c = IndexableUtf8Container::new(&ctx, &v, 1).unwrap();
    let expected: Vec<usize> = (0..=8)
        .map(|k| text.char_indices().nth(k).map_or(text.len(), |(b, _)| b))
        .collect();
    for &k in &[5, 2, 7, 1, 8, 0, 3, 6, 4] {
        assert_eq!(c.utf32_to_utf8_index_fwd(0, k as i32).unwrap(), expected[k]);
    }
    for &k in &[1, 8, 3, 2, 6] {
        assert_eq!(
            c.utf32_to_utf8_index_back(0, k as i32).unwrap(),
            expected[8 - k]
        );
    }
}

#[test]
fn batched_byte_to_codepoint_translation() {
    let mut i1 = [1, 3, 6];
    let mut i2 = [2, 5, 9];
    index::utf8_to_utf32_index("a1b22c333", &mut i1, &mut i2, 1, 0).unwrap();
    assert_eq!(i1, [2, 4, 7]);
    assert_eq!(i2, [2, 5, 9]);
}

// === Pattern containers ===

#[test]
fn recycled_patterns_compile_once_per_slot() {
    let ctx = Context::default();
    let p = host_vec(&[Some("a+"), Some("b+")]);
    let mut c = RegexPatternContainer::new(&ctx, &p, 4, RegexOptions::default()).unwrap();
    let mut hits = Vec::new();
    for i in c.vectorize() {
        let m = c.get_matcher(i).unwrap();
        m.reset();
        hits.push(m.find("xaab").unwrap());
    }
    assert_eq!(hits, vec![true, true, true, true]);
    assert_eq!(c.compilations(), 2);
}

#[test]
fn empty_patterns_warn_at_construction() {
    let ctx = Context::default();
    let p = host_vec(&[Some(""), None, Some("x"), Some("")]);
    let c = ByteSearchContainer::new(&ctx, &p, 8, false).unwrap();
    assert_eq!(
        ctx.take_warnings(),
        vec![Warning::EmptyPattern, Warning::EmptyPattern]
    );
    assert!(c.is_na_or_empty(4));
    assert!(c.is_na_or_empty(5));
    assert!(!c.is_na_or_empty(6));
}

#[test]
fn byte_searcher_is_reused_per_slot() {
    let ctx = Context::default();
    let p = host_vec(&[Some("ab")]);
    let mut c = ByteSearchContainer::new(&ctx, &p, 3, false).unwrap();
    for i in c.vectorize() {
        let s = c.setup_matcher(i).unwrap();
        assert_eq!(s.find_first(b"xxab"), Some((2, 4)));
    }
    assert_eq!(c.rebuilds(), 1);
}

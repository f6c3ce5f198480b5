// trans_test.rs - Integration tests for substrings, case mapping and joining.

use strivec::join::join_list;
use strivec::prelude::*;
use strivec::sub::{sub, sub_replace, SubRange};
use strivec::trans;

// === Substrings ===

#[test]
fn sub_recycles_all_arguments() {
    let ctx = Context::default();
    let s = host_vec(&[Some("ąbćdę")]);
    let from = [Some(1), Some(2), Some(3)];
    let out = sub(&ctx, &s, &from, SubRange::To(&[Some(-1)])).unwrap();
    assert_eq!(
        host_strs(&out),
        vec![Some("ąbćdę"), Some("bćdę"), Some("ćdę")]
    );
    assert!(ctx.take_warnings().is_empty());
}

#[test]
fn sub_warns_on_uneven_recycling() {
    let ctx = Context::default();
    let s = host_vec(&[Some("abc"), Some("def")]);
    let out = sub(&ctx, &s, &[Some(1), Some(2), Some(3)], SubRange::Length(&[Some(1)])).unwrap();
    assert_eq!(host_strs(&out), vec![Some("a"), Some("e"), Some("c")]);
    assert_eq!(ctx.take_warnings(), vec![Warning::RecyclingRule]);
}

#[test]
fn sub_na_bounds() {
    let ctx = Context::default();
    let s = host_vec(&[Some("abc"), None]);
    let out = sub(&ctx, &s, &[None, Some(1)], SubRange::To(&[Some(2)])).unwrap();
    assert_eq!(host_strs(&out), vec![None, None]);
}

#[test]
fn sub_replace_keeps_surroundings() {
    let ctx = Context::default();
    let s = host_vec(&[Some("Grüß Gott")]);
    let v = host_vec(&[Some("Hallo")]);
    let out = sub_replace(&ctx, &s, &[Some(1)], SubRange::Length(&[Some(4)]), &v).unwrap();
    assert_eq!(host_strs(&out), vec![Some("Hallo Gott")]);
}

// === Case mapping and normalization ===

#[test]
fn upper_and_lower_round_trip_ascii() {
    let ctx = Context::default();
    let s = host_vec(&[Some("MiXeD"), None, Some("")]);
    let up = trans::to_upper(&ctx, &s, None).unwrap();
    assert_eq!(host_strs(&up), vec![Some("MIXED"), None, Some("")]);
    let low = trans::to_lower(&ctx, &up, None).unwrap();
    assert_eq!(host_strs(&low), vec![Some("mixed"), None, Some("")]);
}

#[test]
fn context_locale_drives_case_mapping() {
    let ctx = Context::builder().locale("tr_TR").build().unwrap();
    let s = host_vec(&[Some("istanbul")]);
    let up = trans::to_upper(&ctx, &s, None).unwrap();
    assert_eq!(host_strs(&up), vec![Some("İSTANBUL")]);
    let up = trans::to_upper(&ctx, &s, Some("en")).unwrap();
    assert_eq!(host_strs(&up), vec![Some("ISTANBUL")]);
}

#[test]
fn nfd_then_nfc_restores_text() {
    let ctx = Context::default();
    let s = host_vec(&[Some("Ångström"), None]);
    let nfd = trans::normalize(&ctx, &s, NormalizationForm::Nfd).unwrap();
    assert_eq!(
        trans::is_normalized(&ctx, &nfd, NormalizationForm::Nfc).unwrap(),
        vec![Some(false), None]
    );
    let nfc = trans::normalize(&ctx, &nfd, NormalizationForm::Nfc).unwrap();
    assert_eq!(host_strs(&nfc), host_strs(&s));
}

// === Joining ===

#[test]
fn join_list_elements() {
    let ctx = Context::default();
    let list = vec![
        Some(host_vec(&[Some("a"), Some("b"), Some("c")])),
        Some(host_vec(&[Some("solo")])),
        Some(host_vec(&[Some("x"), None])),
    ];
    let out = join_list(&ctx, &list, "").unwrap();
    assert_eq!(host_strs(&out), vec![Some("abc"), Some("solo"), None]);
}

#[test]
fn join_rejects_invalid_element() {
    let ctx = Context::default();
    let list = vec![Some(vec![Some(NativeString::utf8_bytes(b"\xC3("))])];
    assert!(join_list(&ctx, &list, ",").is_err());
}

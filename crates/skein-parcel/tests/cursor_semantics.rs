//! Cursor, size, and capacity behaviour of a parcel, driven through the
//! public API only.
//!
//! Each test exercises one sequence of writes, seeks, and reads, then
//! checks position/size/capacity and the structural invariants.

use skein_parcel::{Parcel, ParcelError, SpanKind, StrongRef};
use skein_test_utils::{assert_invariants, reload};

// ── Empty and uninitialised reads ───────────────────────────────

#[test]
fn read_int_when_empty() {
    let mut p = Parcel::new();
    assert_eq!(p.read_int().unwrap(), 0);
    assert_eq!(p.data_position(), 0);
    assert_invariants(&p, true);
}

#[test]
fn read_int_when_uninitialised() {
    let mut p = Parcel::new();
    p.set_data_size(100).unwrap();
    assert_eq!(p.read_int().unwrap(), 0);
    assert_eq!(p.data_position(), 4);
    assert_invariants(&p, true);
}

#[test]
fn read_long_when_empty() {
    let mut p = Parcel::new();
    assert_eq!(p.read_long().unwrap(), 0);
    assert_eq!(p.data_position(), 0);
    assert_invariants(&p, true);
}

#[test]
fn read_long_when_uninitialised() {
    let mut p = Parcel::new();
    p.set_data_size(100).unwrap();
    assert_eq!(p.read_long().unwrap(), 0);
    assert_eq!(p.data_position(), 8);
    assert_invariants(&p, true);
}

#[test]
fn read_long_with_only_four_bytes_left() {
    let mut p = Parcel::new();
    p.set_data_size(4).unwrap();
    assert_eq!(p.read_long().unwrap(), 0);
    assert_eq!(p.data_position(), 4, "trailing partial field is consumed");
    assert_invariants(&p, true);
}

#[test]
fn read_string_when_empty() {
    let mut p = Parcel::new();
    assert_eq!(p.read_string().unwrap(), None);
    assert_invariants(&p, true);
}

#[test]
fn read_strong_ref_when_uninitialised() {
    let mut p = Parcel::new();
    p.set_data_size(100).unwrap();
    assert_eq!(p.read_strong_ref().unwrap(), None);
    assert_eq!(p.data_position(), 4);
}

// ── Strings ─────────────────────────────────────────────────────

#[test]
fn single_string() {
    let mut p = Parcel::new();
    p.write_string(Some("test")).unwrap();
    assert_invariants(&p, true);
    p.set_data_position(0);
    assert_eq!(p.read_string().unwrap().as_deref(), Some("test"));
}

#[test]
fn null_string_takes_one_cell() {
    let mut p = Parcel::new();
    p.write_string(None).unwrap();
    assert_invariants(&p, true);
    p.set_data_position(0);
    assert_eq!(p.read_string().unwrap(), None);
    assert_eq!(p.data_position(), 4);
}

#[test]
fn empty_string_is_not_null() {
    let mut p = Parcel::new();
    p.write_string(Some("")).unwrap();
    assert_invariants(&p, true);
    p.set_data_position(0);
    assert_eq!(p.read_string().unwrap().as_deref(), Some(""));
}

#[test]
fn many_strings_then_past_end() {
    let mut p = Parcel::new();
    for i in 0..10 {
        p.write_string(Some(i.to_string().as_str())).unwrap();
        assert_invariants(&p, true);
    }
    p.set_data_position(0);
    for i in 0..10 {
        assert_eq!(p.read_string().unwrap(), Some(i.to_string()));
    }
    assert_eq!(p.read_string().unwrap(), None);
}

#[test]
fn strings_and_ints_interleaved() {
    let mut p = Parcel::new();
    for i in 0..10 {
        p.write_string(Some(i.to_string().as_str())).unwrap();
        p.write_int(i).unwrap();
    }
    p.set_data_position(0);
    for i in 0..10 {
        assert_eq!(p.read_string().unwrap(), Some(i.to_string()));
        assert_eq!(p.read_int().unwrap(), i);
    }
    assert_eq!(p.read_string().unwrap(), None);
    assert_eq!(p.read_int().unwrap(), 0);
}

#[test]
fn strings_and_longs_interleaved() {
    let mut p = Parcel::new();
    for i in 0..10i64 {
        p.write_string(Some(i.to_string().as_str())).unwrap();
        p.write_long(i).unwrap();
    }
    p.set_data_position(0);
    for i in 0..10i64 {
        assert_eq!(p.read_string().unwrap(), Some(i.to_string()));
        assert_eq!(p.read_long().unwrap(), i);
    }
    assert_eq!(p.read_string().unwrap(), None);
    assert_eq!(p.read_long().unwrap(), 0);
}

#[test]
fn new_string_after_empty_string() {
    let mut p = Parcel::new();
    p.write_string(Some("")).unwrap();
    let here = p.data_position();
    p.set_data_position(here);
    p.write_string(Some("something else")).unwrap();
    p.set_data_position(0);
    assert_eq!(p.read_string().unwrap().as_deref(), Some(""));
    assert_eq!(p.read_string().unwrap().as_deref(), Some("something else"));
}

// ── Scalars ─────────────────────────────────────────────────────

#[test]
fn many_ints_then_past_end() {
    let mut p = Parcel::new();
    for i in 0..10 {
        p.write_int(i).unwrap();
    }
    p.set_data_position(0);
    for i in 0..10 {
        assert_eq!(p.read_int().unwrap(), i);
    }
    assert_eq!(p.read_int().unwrap(), 0);
}

#[test]
fn many_bytes_then_past_end() {
    let mut p = Parcel::new();
    for i in 0..10i8 {
        p.write_byte(i).unwrap();
    }
    p.set_data_position(0);
    for i in 0..10i8 {
        assert_eq!(p.read_byte().unwrap(), i);
    }
    assert_eq!(p.read_byte().unwrap(), 0);
}

#[test]
fn many_longs_then_past_end() {
    let mut p = Parcel::new();
    for i in 0..10i64 {
        p.write_long(i).unwrap();
    }
    p.set_data_position(0);
    for i in 0..10i64 {
        assert_eq!(p.read_long().unwrap(), i);
    }
    assert_eq!(p.read_long().unwrap(), 0);
}

#[test]
fn single_float_and_char() {
    let mut p = Parcel::new();
    p.write_float(5.5).unwrap();
    p.write_char(u16::from(b'x')).unwrap();
    p.set_data_position(0);
    assert_eq!(p.read_float().unwrap(), 5.5);
    assert_eq!(p.read_char().unwrap(), u16::from(b'x'));
}

// ── Type checks ─────────────────────────────────────────────────

#[test]
fn string_read_as_int_is_a_mismatch() {
    let mut p = Parcel::new();
    p.write_string(Some("test")).unwrap();
    p.set_data_position(0);
    assert!(matches!(
        p.read_int(),
        Err(ParcelError::TypeMismatch {
            expected: SpanKind::Int,
            ..
        })
    ));
}

#[test]
fn int_read_as_string_is_a_mismatch() {
    let mut p = Parcel::new();
    p.write_int(9).unwrap();
    p.set_data_position(0);
    assert!(matches!(
        p.read_string(),
        Err(ParcelError::TypeMismatch {
            expected: SpanKind::String,
            ..
        })
    ));
}

#[test]
fn string_read_as_long_is_a_mismatch() {
    let mut p = Parcel::new();
    p.write_string(Some("test")).unwrap();
    p.set_data_position(0);
    assert!(matches!(p.read_long(), Err(ParcelError::TypeMismatch { .. })));
}

#[test]
fn long_read_as_string_is_a_mismatch() {
    let mut p = Parcel::new();
    p.write_long(9).unwrap();
    p.set_data_position(0);
    assert!(matches!(p.read_string(), Err(ParcelError::TypeMismatch { .. })));
}

// ── Overwrites ──────────────────────────────────────────────────

#[test]
fn overwrite_same_size() {
    let mut p = Parcel::new();
    for i in 1..=4 {
        p.write_int(i).unwrap();
    }
    assert_invariants(&p, true);

    p.set_data_position(4);
    p.write_byte(55).unwrap();
    p.write_string(None).unwrap();
    assert_invariants(&p, true);

    p.set_data_position(0);
    assert_eq!(p.read_int().unwrap(), 1);
    assert_eq!(p.data_position(), 4);
    assert_eq!(p.read_byte().unwrap(), 55);
    assert_eq!(p.data_position(), 8);
    assert_eq!(p.read_string().unwrap(), None);
    assert_eq!(p.data_position(), 12);
    assert_eq!(p.read_int().unwrap(), 4);
}

#[test]
fn overwrite_in_middle_of_object() {
    let mut p = Parcel::new();
    p.write_long(111).unwrap();
    p.write_long(222).unwrap();

    p.set_data_position(4);
    let err = p.read_int().unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot partially overwrite objects: 4 in middle of \"111\" (Long) spanning [0,8)"
    );

    p.set_data_position(13);
    let err = p.write_int(5).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot partially overwrite objects: 13 in middle of \"222\" (Long) spanning [8,16)"
    );
    // Nothing was written.
    assert_eq!(p.data_size(), 16);
    p.set_data_position(8);
    assert_eq!(p.read_long().unwrap(), 222);
}

#[test]
fn wide_write_over_narrow_values_replaces_them() {
    let mut p = Parcel::new();
    p.write_int(1).unwrap();
    p.write_int(2).unwrap();
    p.set_data_position(0);
    p.write_long(-5).unwrap();
    p.set_data_position(0);
    assert_eq!(p.read_long().unwrap(), -5);
}

// ── Positions and sizes ─────────────────────────────────────────

#[test]
fn position_after_writes() {
    let mut p = Parcel::new();
    p.write_int(1).unwrap();
    assert_eq!(p.data_position(), 4);
    p.write_float(5.0).unwrap();
    assert_eq!(p.data_position(), 8);
    p.write_double(37.0).unwrap();
    assert_eq!(p.data_position(), 16);
    p.write_strong_ref(Some(&StrongRef::new())).unwrap();
    assert_eq!(p.data_position(), 36);
}

#[test]
fn position_after_reads() {
    let mut p = Parcel::new();
    p.write_int(1).unwrap();
    p.write_float(5.0).unwrap();
    p.write_double(37.0).unwrap();
    p.set_data_position(0);
    p.read_int().unwrap();
    assert_eq!(p.data_position(), 4);
    p.read_float().unwrap();
    assert_eq!(p.data_position(), 8);
    p.read_double().unwrap();
    assert_eq!(p.data_position(), 16);
}

#[test]
fn size_after_writes() {
    let mut p = Parcel::new();
    p.write_int(1).unwrap();
    assert_eq!(p.data_size(), 4);
    p.write_float(5.0).unwrap();
    assert_eq!(p.data_size(), 8);
    p.write_double(37.0).unwrap();
    assert_eq!(p.data_size(), 16);
}

#[test]
fn data_avail_counts_from_cursor() {
    let mut p = Parcel::new();
    p.write_int(1).unwrap();
    p.write_float(5.0).unwrap();
    p.write_double(6.0).unwrap();
    p.set_data_position(4);
    assert_eq!(p.data_avail(), 12);
}

#[test]
fn seek_into_middle_of_parcel() {
    let mut p = Parcel::new();
    p.write_int(1).unwrap();
    p.write_float(5.0).unwrap();
    p.write_double(6.0).unwrap();
    p.set_data_position(4);
    assert_eq!(p.read_float().unwrap(), 5.0);
}

#[test]
fn set_data_size_truncates_and_extends() {
    let mut p = Parcel::new();
    for i in 1..=5 {
        p.write_int(i).unwrap();
    }
    assert_eq!(p.data_size(), 20);
    assert_invariants(&p, true);
    let old_capacity = p.data_capacity();

    p.set_data_size(12).unwrap();
    assert_eq!(p.data_size(), 12);
    assert_eq!(p.data_position(), 12, "position gets truncated");
    assert_eq!(p.data_capacity(), old_capacity, "capacity doesn't shrink");

    p.set_data_size(100).unwrap();
    assert_eq!(p.data_size(), 100);
    assert_eq!(p.data_position(), 12, "position untouched");
    assert_invariants(&p, true);
}

#[test]
fn capacity_growing() {
    let mut p = Parcel::new();
    p.write_int(-1).unwrap();
    assert_eq!(p.data_size(), 4);
    assert_invariants(&p, true);
    p.read_int().unwrap();
    assert_eq!(p.data_size(), 4, "reading past size does not grow it");

    p.set_data_capacity(100).unwrap();
    assert_invariants(&p, true);
    assert_eq!(p.data_capacity(), 100);
    assert_eq!(p.data_size(), 4);

    for i in 0..100 {
        p.write_int(i).unwrap();
    }
    assert_invariants(&p, true);
    assert_eq!(p.data_size(), 404);
    assert_eq!(p.data_position(), 404);
}

#[test]
fn capacity_shrinking() {
    let mut p = Parcel::new();
    p.set_data_capacity(400).unwrap();
    assert_eq!(p.data_size(), 0);
    assert_eq!(p.data_position(), 0);
    for i in 0..100 {
        p.write_int(1000 + i).unwrap();
    }
    assert_invariants(&p, true);
    assert_eq!(p.data_size(), 400);
    assert_eq!(p.data_position(), 400);
    assert_eq!(p.data_capacity(), 400);

    p.set_data_position(88);
    p.set_data_size(100).unwrap();
    p.set_data_capacity(120).unwrap();
    assert_invariants(&p, true);
    assert_eq!(p.data_size(), 100);
    assert_eq!(p.data_position(), 88);
    assert_eq!(p.data_capacity(), 120);
    assert_eq!(p.read_int().unwrap(), 1022);

    p.set_data_capacity(8).unwrap();
    assert_invariants(&p, true);
    assert_eq!(p.data_capacity(), 8);
    assert_eq!(p.data_size(), 8);
    assert_eq!(p.data_position(), 8);

    p.set_data_capacity(400).unwrap();
    p.set_data_size(400).unwrap();
    p.set_data_position(88);
    assert_invariants(&p, true);
    assert_eq!(p.read_int().unwrap(), 0, "discarded data must not reappear");
    p.set_data_position(4);
    assert_eq!(p.read_int().unwrap(), 1001, "prefix is preserved");
}

// ── Snapshots ───────────────────────────────────────────────────

#[test]
fn append_from_copies_a_range() {
    let mut p = Parcel::new();
    for i in 1..=4 {
        p.write_int(i).unwrap();
    }
    let mut q = Parcel::new();
    q.append_from(&p, 4, 8).unwrap();
    q.set_data_position(0);
    assert_eq!(q.read_int().unwrap(), 2);
    assert_eq!(q.read_int().unwrap(), 3);
    assert_eq!(q.data_size(), 8);
}

#[test]
fn marshall_and_unmarshall() {
    let mut p = Parcel::new();
    p.write_int(1).unwrap();
    p.write_string(Some("hello")).unwrap();
    p.write_double(25.0).unwrap();
    p.write_float(1.25).unwrap();
    p.write_byte(0xAFu8 as i8).unwrap();

    let mut q = reload(&p);
    assert_eq!(q.read_int().unwrap(), 1);
    assert_eq!(q.read_string().unwrap().as_deref(), Some("hello"));
    assert_eq!(q.read_double().unwrap(), 25.0);
    assert_eq!(q.read_float().unwrap(), 1.25);
    assert_eq!(q.read_byte().unwrap(), 0xAFu8 as i8);
    assert_eq!(q.data_avail(), 0);
}

#[test]
fn marshall_is_repeatable() {
    let mut p = Parcel::new();
    p.write_long(77).unwrap();
    p.write_string(Some("abc")).unwrap();
    let first = p.marshall();
    let second = reload(&p).marshall();
    assert_eq!(first, second);
}

// ── Strong references ───────────────────────────────────────────

#[test]
fn single_strong_ref() {
    let r = StrongRef::new();
    let mut p = Parcel::new();
    p.write_strong_ref(Some(&r)).unwrap();
    p.set_data_position(0);
    assert_eq!(p.read_strong_ref().unwrap(), Some(r));
}

#[test]
fn null_strong_ref() {
    let mut p = Parcel::new();
    p.write_strong_ref(None).unwrap();
    p.set_data_position(0);
    assert_eq!(p.read_strong_ref().unwrap(), None);
}

#[test]
fn many_strong_refs_then_past_end() {
    let refs: Vec<StrongRef> = (0..10).map(|_| StrongRef::new()).collect();
    let mut p = Parcel::new();
    for r in &refs {
        p.write_strong_ref(Some(r)).unwrap();
    }
    p.set_data_position(0);
    for r in &refs {
        assert_eq!(p.read_strong_ref().unwrap().as_ref(), Some(r));
    }
    assert_eq!(p.read_strong_ref().unwrap(), None);
}

// ── Interface tokens ────────────────────────────────────────────

#[test]
fn compatible_interface_token() {
    let mut p = Parcel::new();
    p.write_interface_token("com.example.IMyInterface").unwrap();
    p.set_data_position(0);
    p.enforce_interface("com.example.IMyInterface").unwrap();
}

#[test]
fn incompatible_interface_token() {
    let mut p = Parcel::new();
    p.write_interface_token("com.example.Derp").unwrap();
    p.set_data_position(0);
    assert!(matches!(
        p.enforce_interface("com.example.IMyInterface"),
        Err(ParcelError::AuthorizationFailure { .. })
    ));
}

//! Tests for the FreeBusy model and range condensing.

use chrono::{TimeZone, Utc};
use freebusy_engine::{condense, BusyStatus, FreeBusy, TimeRange};

/// Range on a given day from hour/minute pairs.
fn range(
    year: i32,
    month: u32,
    day: u32,
    start_hour: u32,
    start_min: u32,
    end_hour: u32,
    end_min: u32,
) -> TimeRange {
    TimeRange::new(
        Utc.with_ymd_and_hms(year, month, day, start_hour, start_min, 0)
            .unwrap(),
        Utc.with_ymd_and_hms(year, month, day, end_hour, end_min, 0)
            .unwrap(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// condense
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn overlapping_ranges_merged() {
    // 10:00-11:30 and 11:00-12:00 → 10:00-12:00
    let merged = condense(&[
        range(2008, 3, 1, 11, 0, 12, 0),
        range(2008, 3, 1, 10, 0, 11, 30),
    ]);
    assert_eq!(merged, vec![range(2008, 3, 1, 10, 0, 12, 0)]);
    assert_eq!(merged[0].duration_minutes(), 120);
}

#[test]
fn touching_ranges_merged() {
    let merged = condense(&[
        range(2008, 3, 1, 9, 0, 10, 0),
        range(2008, 3, 1, 10, 0, 11, 0),
    ]);
    assert_eq!(merged, vec![range(2008, 3, 1, 9, 0, 11, 0)]);
}

#[test]
fn nested_range_absorbed() {
    let merged = condense(&[
        range(2008, 3, 1, 8, 0, 17, 0),
        range(2008, 3, 1, 12, 0, 13, 0),
    ]);
    assert_eq!(merged, vec![range(2008, 3, 1, 8, 0, 17, 0)]);
}

#[test]
fn gaps_are_preserved_in_order() {
    let merged = condense(&[
        range(2008, 3, 1, 15, 0, 16, 0),
        range(2008, 3, 1, 9, 0, 10, 0),
        range(2008, 3, 1, 12, 0, 13, 0),
    ]);
    assert_eq!(
        merged,
        vec![
            range(2008, 3, 1, 9, 0, 10, 0),
            range(2008, 3, 1, 12, 0, 13, 0),
            range(2008, 3, 1, 15, 0, 16, 0),
        ]
    );
}

#[test]
fn inverted_ranges_are_dropped() {
    let merged = condense(&[
        range(2008, 3, 1, 11, 0, 10, 0),
        range(2008, 3, 1, 12, 0, 13, 0),
    ]);
    assert_eq!(merged, vec![range(2008, 3, 1, 12, 0, 13, 0)]);
}

#[test]
fn condense_empty_is_empty() {
    assert!(condense(&[]).is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// FreeBusy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn all_holds_busy_and_out_of_office_but_not_tentative() {
    let mut fb = FreeBusy::new();
    fb.push(BusyStatus::Busy, range(2008, 3, 1, 9, 0, 10, 0));
    fb.push(BusyStatus::Tentative, range(2008, 3, 1, 10, 0, 11, 0));
    fb.push(BusyStatus::OutOfOffice, range(2008, 3, 2, 0, 0, 23, 59));

    assert_eq!(
        fb.all,
        vec![
            range(2008, 3, 1, 9, 0, 10, 0),
            range(2008, 3, 2, 0, 0, 23, 59),
        ]
    );
    assert_eq!(fb.tentative.len(), 1);
}

#[test]
fn from_status_ranges_builds_all() {
    let busy = vec![range(2008, 3, 1, 9, 0, 10, 0)];
    let tentative = vec![range(2008, 3, 1, 10, 0, 11, 0)];
    let ooo = vec![range(2008, 3, 1, 7, 0, 8, 0)];

    let fb = FreeBusy::from_status_ranges(busy.clone(), tentative.clone(), ooo.clone());
    assert_eq!(fb.all, vec![busy[0], ooo[0]]);
    assert_eq!(fb.busy, busy);
    assert_eq!(fb.tentative, tentative);
    assert_eq!(fb.out_of_office, ooo);
}

#[test]
fn clear_empties_every_list() {
    let mut fb = FreeBusy::new();
    fb.push(BusyStatus::Busy, range(2008, 3, 1, 9, 0, 10, 0));
    fb.push(BusyStatus::Tentative, range(2008, 3, 1, 10, 0, 11, 0));
    assert!(!fb.is_empty());

    fb.clear();
    assert!(fb.is_empty());
    assert_eq!(fb, FreeBusy::default());
}

#[test]
fn freebusy_json_uses_snake_case_lists() {
    let json = r#"{ "busy": [{ "start": "2008-03-01T09:00:00Z", "end": "2008-03-01T10:00:00Z" }] }"#;
    let fb: FreeBusy = serde_json::from_str(json).unwrap();

    assert_eq!(fb.busy, vec![range(2008, 3, 1, 9, 0, 10, 0)]);
    assert!(fb.all.is_empty());
    assert!(fb.out_of_office.is_empty());

    let value = serde_json::to_value(&fb).unwrap();
    assert!(value.get("out_of_office").is_some());
}

#[test]
fn busy_status_serializes_snake_case() {
    assert_eq!(
        serde_json::to_string(&BusyStatus::OutOfOffice).unwrap(),
        r#""out_of_office""#
    );
    assert_eq!(BusyStatus::default(), BusyStatus::Free);
}

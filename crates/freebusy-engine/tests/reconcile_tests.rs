//! Tests for reconciling free/busy blocks with appointment detail.

use chrono::{DateTime, Duration, TimeZone, Utc};
use freebusy_engine::{merge, Appointment, FreeBusy, Scheduled, TimeRange};

fn s() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2008, 5, 1, 9, 0, 0).unwrap()
}

/// Range from minute offsets relative to `s()`.
fn mins(from: i64, to: i64) -> TimeRange {
    TimeRange::new(s() + Duration::minutes(from), s() + Duration::minutes(to))
}

fn appt(subject: &str, from: i64, to: i64) -> Appointment {
    let r = mins(from, to);
    Appointment {
        subject: Some(subject.to_string()),
        ..Appointment::new(r.start, r.end)
    }
}

fn busy(ranges: &[TimeRange]) -> FreeBusy {
    FreeBusy::from_status_ranges(ranges.to_vec(), vec![], vec![])
}

fn subjects(appointments: &[Appointment]) -> Vec<&str> {
    appointments
        .iter()
        .map(|a| a.subject.as_deref().unwrap_or(""))
        .collect()
}

#[test]
fn only_fully_contained_appointments_attach() {
    let fb = busy(&[mins(0, 60)]);
    let appointments = vec![appt("too long", 0, 120), appt("inside", 0, 30)];

    let result = merge(&fb, appointments);

    let block = result.get(&s()).expect("block keyed by its start");
    assert_eq!(block.end, s() + Duration::minutes(60));
    assert_eq!(subjects(&block.appointments), vec!["inside"]);
}

#[test]
fn block_count_equals_all_count() {
    let fb = busy(&[mins(0, 60), mins(120, 180), mins(300, 330)]);

    assert_eq!(merge::<Appointment>(&fb, vec![]).len(), 3);
    assert_eq!(merge(&fb, vec![appt("one", 0, 15)]).len(), 3);

    let many: Vec<Appointment> = (0..50).map(|i| appt("x", i * 10, i * 10 + 5)).collect();
    assert_eq!(merge(&fb, many).len(), 3);
}

#[test]
fn empty_appointment_list_keeps_every_block() {
    let fb = busy(&[mins(0, 60), mins(90, 120)]);
    let result = merge::<Appointment>(&fb, vec![]);

    assert_eq!(result.len(), 2);
    assert!(result.blocks().all(|b| b.appointments.is_empty()));
}

#[test]
fn appointments_outside_every_block_are_dropped() {
    let fb = busy(&[mins(0, 60)]);
    let result = merge(&fb, vec![appt("before", -60, -30), appt("after", 90, 120)]);

    assert_eq!(result.len(), 1);
    assert!(result.get(&s()).unwrap().appointments.is_empty());
}

#[test]
fn attached_appointments_are_sorted_by_start_then_end() {
    let fb = busy(&[mins(0, 240)]);
    let appointments = vec![
        appt("c", 120, 180),
        appt("b2", 30, 90),
        appt("a", 0, 30),
        appt("b1", 30, 60),
    ];

    let result = merge(&fb, appointments);
    assert_eq!(
        subjects(&result.get(&s()).unwrap().appointments),
        vec!["a", "b1", "b2", "c"]
    );
}

#[test]
fn tentative_ranges_do_not_become_blocks() {
    let fb = FreeBusy::from_status_ranges(vec![mins(0, 60)], vec![mins(60, 120)], vec![mins(200, 260)]);
    let result = merge(&fb, vec![appt("tentative hold", 60, 90)]);

    let starts: Vec<DateTime<Utc>> = result.blocks().map(|b| b.start).collect();
    assert_eq!(starts, vec![s(), s() + Duration::minutes(200)]);
    assert!(result.blocks().all(|b| b.appointments.is_empty()));
}

#[test]
fn duplicate_block_start_keeps_the_later_range() {
    let fb = busy(&[mins(0, 30), mins(0, 90)]);
    let result = merge(&fb, vec![appt("long", 0, 80)]);

    assert_eq!(result.len(), 1);
    let block = result.get(&s()).unwrap();
    assert_eq!(block.end, s() + Duration::minutes(90));
    assert_eq!(subjects(&block.appointments), vec!["long"]);
}

#[test]
fn overlapping_blocks_can_share_an_appointment() {
    let fb = busy(&[mins(0, 60), mins(15, 90)]);
    let result = merge(&fb, vec![appt("shared", 20, 40)]);

    assert!(result.blocks().all(|b| subjects(&b.appointments) == vec!["shared"]));
}

#[test]
fn unattached_counts_each_appointment_once() {
    let fb = busy(&[mins(0, 60), mins(15, 90)]);
    let appointments = vec![
        appt("shared", 20, 40),
        appt("first only", 0, 10),
        appt("outside", 200, 230),
        appt("overruns", 50, 120),
    ];

    let result = merge(&fb, appointments);
    assert_eq!(result.unattached(), 2);
    assert_eq!(merge::<Appointment>(&fb, vec![]).unattached(), 0);
}

#[test]
fn appointments_of_an_overwritten_block_count_as_unattached() {
    let fb = busy(&[mins(0, 30), mins(0, 10)]);
    let result = merge(&fb, vec![appt("late", 15, 25), appt("early", 0, 5)]);

    assert_eq!(subjects(&result.get(&s()).unwrap().appointments), vec!["early"]);
    assert_eq!(result.unattached(), 1);
}

#[test]
fn blocks_iterate_in_start_order() {
    let fb = busy(&[mins(300, 360), mins(0, 30), mins(120, 150)]);
    let starts: Vec<i64> = merge::<Appointment>(&fb, vec![])
        .into_blocks()
        .into_iter()
        .map(|b| (b.start - s()).num_minutes())
        .collect();
    assert_eq!(starts, vec![0, 120, 300]);
}

#[test]
fn merge_is_generic_over_scheduled_types() {
    #[derive(Clone, Debug, PartialEq)]
    struct Slot(TimeRange);

    impl Scheduled for Slot {
        fn time_range(&self) -> TimeRange {
            self.0
        }
    }

    let fb = busy(&[mins(0, 60)]);
    let result = merge(&fb, vec![Slot(mins(10, 20)), Slot(mins(50, 70))]);
    assert_eq!(result.get(&s()).unwrap().appointments, vec![Slot(mins(10, 20))]);
}

#[test]
fn busy_times_serialize_as_block_array() {
    let fb = busy(&[mins(60, 90), mins(0, 30)]);
    let result = merge(&fb, vec![appt("standup", 0, 15)]);

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    let blocks = json.as_array().expect("array of blocks");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["start"], "2008-05-01T09:00:00Z");
    assert_eq!(blocks[0]["appointments"][0]["subject"], "standup");
    assert_eq!(blocks[1]["appointments"].as_array().unwrap().len(), 0);
}

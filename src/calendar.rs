//! Month-grid projection for the calendar view. The grid uses Monday-start
//! weeks: the first week carries the 1st of the month behind leading empty
//! slots, the last week pads the tail, and every week is exactly seven slots.

use crate::models::{Activity, ActivityCollection};
use chrono::{Datelike, Local, NaiveDate};

/// One calendar week; `None` slots belong to the adjacent month.
pub type Week = [Option<u32>; 7];

/// Grid shape for a month. Total for any valid `(year, month)` pair; the
/// caller contract keeps the arguments within range.
pub fn month_grid(year: i32, month: u32) -> Vec<Week> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid (year, month)");
    let lead = first.weekday().num_days_from_monday() as usize;

    let mut weeks = Vec::with_capacity(6);
    let mut week: Week = [None; 7];
    let mut slot = lead;
    for day in 1..=days_in_month(year, month) {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|date| date.pred_opt())
        .map(|date| date.day())
        .expect("valid (year, month)")
}

/// Activities whose deadline falls on `date` exactly, in collection order.
/// Unknown deadlines never match; returned rows carry their id so the caller
/// can drive the mark-done transition.
pub fn activities_on(collection: &ActivityCollection, date: NaiveDate) -> Vec<&Activity> {
    collection
        .iter()
        .filter(|row| row.deadline == Some(date))
        .collect()
}

/// Highlight check against the current local calendar date.
pub fn is_today(date: NaiveDate) -> bool {
    date == Local::now().date_naive()
}

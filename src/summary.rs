//! Read-only views derived from [`DashboardState`].

use crate::model::{
    AttendanceStatus, PaymentRecord, PaymentRecordStatus, Student, StudentStatus,
};
use crate::schedule::{schedule_for_date, week_start, AgeGroup, WeekdayKey, CAPACITY_PER_CLASS};
use crate::store::DashboardState;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

/// Fraction of capacity at which a slot is flagged as nearly full.
const NEAR_FULL_RATIO: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOccupancy {
    pub slot_id: String,
    pub time: &'static str,
    pub age_group: AgeGroup,
    pub count: usize,
    pub capacity: usize,
    pub is_full: bool,
    pub near_full: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOccupancy {
    pub day: WeekdayKey,
    pub label: &'static str,
    pub date: NaiveDate,
    pub slots: Vec<SlotOccupancy>,
    pub total: usize,
}

pub fn weekly_occupancy(state: &DashboardState, date: NaiveDate) -> Vec<DayOccupancy> {
    let monday = week_start(date);
    (0..7)
        .map(|offset| {
            let day_date = monday + Duration::days(offset);
            let roster = state.assignments_for_date(day_date);
            let slots: Vec<SlotOccupancy> = schedule_for_date(day_date)
                .into_iter()
                .map(|slot| {
                    let count = roster.get(&slot.id).map(Vec::len).unwrap_or(0);
                    SlotOccupancy {
                        count,
                        capacity: CAPACITY_PER_CLASS,
                        is_full: count >= CAPACITY_PER_CLASS,
                        near_full: count as f64 >= CAPACITY_PER_CLASS as f64 * NEAR_FULL_RATIO,
                        slot_id: slot.id,
                        time: slot.time,
                        age_group: slot.age_group,
                    }
                })
                .collect();
            let day = WeekdayKey::for_date(day_date);
            DayOccupancy {
                day,
                label: day.label(),
                date: day_date,
                total: slots.iter().map(|s| s.count).sum(),
                slots,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAttendance {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub slot_id: String,
    pub enrolled: usize,
    pub attendance: SlotAttendance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_students: usize,
    pub checked_in: usize,
    pub absent: usize,
    pub slots: Vec<SlotSummary>,
}

pub fn daily_summary(state: &DashboardState, date: NaiveDate) -> DailySummary {
    let roster = state.assignments_for_date(date);
    let attendance = state.attendance_for_date(date);
    let status_of = |id: &str| attendance.get(id).copied().unwrap_or_default();

    let mut distinct: BTreeSet<&str> = BTreeSet::new();
    let mut slots = Vec::new();
    for slot in schedule_for_date(date) {
        let ids = roster.get(&slot.id).map(Vec::as_slice).unwrap_or(&[]);
        let mut counts = SlotAttendance::default();
        for id in ids {
            distinct.insert(id.as_str());
            match status_of(id.as_str()) {
                AttendanceStatus::Present => counts.present += 1,
                AttendanceStatus::Absent => counts.absent += 1,
                AttendanceStatus::Late => counts.late += 1,
                AttendanceStatus::None => {}
            }
        }
        slots.push(SlotSummary {
            slot_id: slot.id,
            enrolled: ids.len(),
            attendance: counts,
        });
    }

    let checked_in = distinct
        .iter()
        .filter(|id| {
            matches!(
                status_of(**id),
                AttendanceStatus::Present | AttendanceStatus::Late
            )
        })
        .count();
    let absent = distinct
        .iter()
        .filter(|id| status_of(**id) == AttendanceStatus::Absent)
        .count();
    DailySummary {
        total_students: distinct.len(),
        checked_in,
        absent,
        slots,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub month: String,
    pub revenue: f64,
    pub pending_overdue_total: f64,
    pub active_students: usize,
    pub percent_paid: u32,
}

pub fn finance_summary(students: &[Student], month: &str) -> FinanceSummary {
    let mut revenue = 0.0;
    let mut outstanding = 0.0;
    let mut paid_in_month = 0usize;
    let mut total_in_month = 0usize;
    for payment in students.iter().flat_map(|s| s.payment_history.iter()) {
        if payment.status.is_outstanding() {
            outstanding += payment.amount;
        }
        if payment.month_reference != month {
            continue;
        }
        total_in_month += 1;
        if payment.status == PaymentRecordStatus::Paid {
            revenue += payment.amount_paid;
            paid_in_month += 1;
        }
    }
    let percent_paid = if total_in_month == 0 {
        0
    } else {
        (paid_in_month as f64 / total_in_month as f64 * 100.0).round() as u32
    };
    FinanceSummary {
        month: month.to_string(),
        revenue,
        pending_overdue_total: outstanding,
        active_students: students
            .iter()
            .filter(|s| s.status == StudentStatus::Active)
            .count(),
        percent_paid,
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub status: Option<PaymentRecordStatus>,
    pub month: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRow {
    pub student_id: String,
    pub student_name: String,
    pub payment: PaymentRecord,
}

/// Every payment of every student, newest first.
pub fn payment_rows(students: &[Student], filter: &PaymentFilter) -> Vec<PaymentRow> {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);
    let mut rows: Vec<PaymentRow> = students
        .iter()
        .filter(|s| match &needle {
            Some(q) => s.name.to_lowercase().contains(q.as_str()),
            None => true,
        })
        .flat_map(|s| {
            s.payment_history.iter().map(move |p| PaymentRow {
                student_id: s.id.clone(),
                student_name: s.name.clone(),
                payment: p.clone(),
            })
        })
        .filter(|r| filter.status.map_or(true, |st| r.payment.status == st))
        .filter(|r| {
            filter
                .month
                .as_deref()
                .map_or(true, |m| r.payment.month_reference == m)
        })
        .collect();
    // Stable sort keeps history order for payments on the same day.
    rows.sort_by(|a, b| b.payment.date.cmp(&a.payment.date));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Birthday {
    pub student_id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub day: u32,
    pub turning_age: i32,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthdayLists {
    pub month: u32,
    pub next_month: u32,
    pub this_month: Vec<Birthday>,
    pub upcoming: Vec<Birthday>,
}

/// Active students whose birthday falls in the month of `today` or the next one.
/// Unparseable birth dates are skipped.
pub fn birthdays(students: &[Student], today: NaiveDate) -> BirthdayLists {
    let month = today.month();
    let next_month = month % 12 + 1;
    let born: Vec<(&Student, NaiveDate)> = students
        .iter()
        .filter(|s| s.status == StudentStatus::Active)
        .filter_map(|s| {
            NaiveDate::parse_from_str(s.birth_date.trim(), "%Y-%m-%d")
                .ok()
                .map(|d| (s, d))
        })
        .collect();

    let for_month = |m: u32| {
        let mut out: Vec<Birthday> = born
            .iter()
            .filter(|(_, d)| d.month() == m)
            .map(|(s, d)| Birthday {
                student_id: s.id.clone(),
                name: s.name.clone(),
                birth_date: *d,
                day: d.day(),
                turning_age: today.year() - d.year(),
                is_today: d.month() == today.month() && d.day() == today.day(),
            })
            .collect();
        out.sort_by_key(|b| b.day);
        out
    };

    BirthdayLists {
        month,
        next_month,
        this_month: for_month(month),
        upcoming: for_month(next_month),
    }
}

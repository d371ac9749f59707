use crate::error::{DomainError, DomainResult};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum students per class slot.
pub const CAPACITY_PER_CLASS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayKey {
    Domingo,
    Segunda,
    Terca,
    Quarta,
    Quinta,
    Sexta,
    Sabado,
}

impl WeekdayKey {
    /// Monday-first, the order the dashboard lists days in.
    pub const ORDERED: [WeekdayKey; 7] = [
        WeekdayKey::Segunda,
        WeekdayKey::Terca,
        WeekdayKey::Quarta,
        WeekdayKey::Quinta,
        WeekdayKey::Sexta,
        WeekdayKey::Sabado,
        WeekdayKey::Domingo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeekdayKey::Domingo => "domingo",
            WeekdayKey::Segunda => "segunda",
            WeekdayKey::Terca => "terca",
            WeekdayKey::Quarta => "quarta",
            WeekdayKey::Quinta => "quinta",
            WeekdayKey::Sexta => "sexta",
            WeekdayKey::Sabado => "sabado",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeekdayKey::Domingo => "Domingo",
            WeekdayKey::Segunda => "Segunda-feira",
            WeekdayKey::Terca => "Terça-feira",
            WeekdayKey::Quarta => "Quarta-feira",
            WeekdayKey::Quinta => "Quinta-feira",
            WeekdayKey::Sexta => "Sexta-feira",
            WeekdayKey::Sabado => "Sábado",
        }
    }

    pub fn parse(s: &str) -> Option<WeekdayKey> {
        WeekdayKey::ORDERED
            .into_iter()
            .find(|d| d.as_str() == s.trim())
    }

    pub fn for_date(date: NaiveDate) -> WeekdayKey {
        match date.weekday() {
            Weekday::Sun => WeekdayKey::Domingo,
            Weekday::Mon => WeekdayKey::Segunda,
            Weekday::Tue => WeekdayKey::Terca,
            Weekday::Wed => WeekdayKey::Quarta,
            Weekday::Thu => WeekdayKey::Quinta,
            Weekday::Fri => WeekdayKey::Sexta,
            Weekday::Sat => WeekdayKey::Sabado,
        }
    }
}

impl fmt::Display for WeekdayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "4-6 anos")]
    Kids4To6,
    #[serde(rename = "7-12 anos")]
    Kids7To12,
    #[serde(rename = "Adultos")]
    Adults,
    #[serde(rename = "Teens/Adultos")]
    TeensAdults,
}

impl AgeGroup {
    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Kids4To6 => "4-6 anos",
            AgeGroup::Kids7To12 => "7-12 anos",
            AgeGroup::Adults => "Adultos",
            AgeGroup::TeensAdults => "Teens/Adultos",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSlot {
    pub id: String,
    pub time: &'static str,
    pub age_group: AgeGroup,
}

type SlotTemplate = (&'static str, AgeGroup);

const MONDAY_AND_WEDNESDAY: &[SlotTemplate] = &[
    ("09:00", AgeGroup::Kids4To6),
    ("10:00", AgeGroup::Kids7To12),
    ("11:00", AgeGroup::Adults),
    ("16:30", AgeGroup::TeensAdults),
    ("18:30", AgeGroup::Kids7To12),
    ("19:30", AgeGroup::TeensAdults),
];

const TUESDAY_AND_THURSDAY: &[SlotTemplate] = &[
    ("09:00", AgeGroup::Kids4To6),
    ("10:00", AgeGroup::Kids7To12),
    ("11:00", AgeGroup::Adults),
    ("16:00", AgeGroup::Kids7To12),
    ("17:00", AgeGroup::Kids4To6),
    ("18:30", AgeGroup::Kids7To12),
    ("19:30", AgeGroup::TeensAdults),
];

const FRIDAY: &[SlotTemplate] = &[
    ("09:00", AgeGroup::Kids4To6),
    ("10:00", AgeGroup::Kids7To12),
    ("11:00", AgeGroup::Adults),
    ("18:30", AgeGroup::Kids7To12),
    ("19:30", AgeGroup::TeensAdults),
];

const SATURDAY: &[SlotTemplate] = &[
    ("09:00", AgeGroup::Kids4To6),
    ("10:00", AgeGroup::Kids7To12),
    ("11:00", AgeGroup::Adults),
];

fn template_for(day: WeekdayKey) -> &'static [SlotTemplate] {
    match day {
        WeekdayKey::Domingo => &[],
        WeekdayKey::Segunda | WeekdayKey::Quarta => MONDAY_AND_WEDNESDAY,
        WeekdayKey::Terca | WeekdayKey::Quinta => TUESDAY_AND_THURSDAY,
        WeekdayKey::Sexta => FRIDAY,
        WeekdayKey::Sabado => SATURDAY,
    }
}

/// `segunda` + `09:00` => `segunda-0900`
pub fn slot_id(day: WeekdayKey, time: &str) -> String {
    format!("{}-{}", day.as_str(), time.replace(':', ""))
}

pub fn schedule_for_day(day: WeekdayKey) -> Vec<ClassSlot> {
    template_for(day)
        .iter()
        .map(|(time, age_group)| ClassSlot {
            id: slot_id(day, time),
            time,
            age_group: *age_group,
        })
        .collect()
}

pub fn schedule_for_date(date: NaiveDate) -> Vec<ClassSlot> {
    schedule_for_day(WeekdayKey::for_date(date))
}

pub fn find_slot(day: WeekdayKey, slot_id: &str) -> Option<ClassSlot> {
    schedule_for_day(day).into_iter().find(|s| s.id == slot_id)
}

/// Resolves a slot id back to its weekday and template entry.
pub fn lookup_slot(slot_id: &str) -> Option<(WeekdayKey, ClassSlot)> {
    let (day, _) = slot_id.split_once('-')?;
    let day = WeekdayKey::parse(day)?;
    find_slot(day, slot_id).map(|s| (day, s))
}

/// Total weekly slots across the template.
pub fn weekly_slot_count() -> usize {
    WeekdayKey::ORDERED
        .iter()
        .map(|d| template_for(*d).len())
        .sum()
}

pub fn parse_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(raw.to_string()))
}

/// `YYYY-MM` => (year, month)
pub fn parse_month(raw: &str) -> DomainResult<(i32, u32)> {
    let bad = || DomainError::InvalidMonth(raw.to_string());
    let (y, m) = raw.trim().split_once('-').ok_or_else(bad)?;
    let year = y.parse::<i32>().map_err(|_| bad())?;
    let month = m.parse::<u32>().map_err(|_| bad())?;
    if y.len() != 4 || !(1..=12).contains(&month) {
        return Err(bad());
    }
    Ok((year, month))
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_and_months_parse_strictly() {
        assert!(parse_date("2024-06-03").is_ok());
        assert_eq!(
            parse_date("03/06/2024"),
            Err(DomainError::InvalidDate("03/06/2024".into()))
        );
        assert_eq!(parse_month("2024-06").unwrap(), (2024, 6));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("24-06").is_err());
        let wed = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(week_start(wed), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        let sun = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert_eq!(week_start(sun), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    }

    #[test]
    fn slot_ids_strip_colon() {
        assert_eq!(slot_id(WeekdayKey::Segunda, "09:00"), "segunda-0900");
        assert_eq!(slot_id(WeekdayKey::Terca, "16:00"), "terca-1600");
    }

    #[test]
    fn weekday_resolves_from_calendar_date() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(WeekdayKey::for_date(monday), WeekdayKey::Segunda);
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert_eq!(WeekdayKey::for_date(sunday), WeekdayKey::Domingo);
        assert!(schedule_for_date(sunday).is_empty());
    }

    #[test]
    fn template_shapes() {
        assert_eq!(schedule_for_day(WeekdayKey::Segunda).len(), 6);
        assert_eq!(schedule_for_day(WeekdayKey::Quinta).len(), 7);
        assert_eq!(schedule_for_day(WeekdayKey::Sexta).len(), 5);
        assert_eq!(schedule_for_day(WeekdayKey::Sabado).len(), 3);
        assert_eq!(weekly_slot_count(), 6 + 7 + 6 + 7 + 5 + 3);
    }

    #[test]
    fn lookup_slot_rejects_unknown_ids() {
        let (day, slot) = lookup_slot("quarta-1630").expect("known slot");
        assert_eq!(day, WeekdayKey::Quarta);
        assert_eq!(slot.age_group, AgeGroup::TeensAdults);
        assert!(lookup_slot("quarta-1600").is_none());
        assert!(lookup_slot("feriado-0900").is_none());
        assert!(lookup_slot("nonsense").is_none());
    }

    #[test]
    fn weekday_keys_roundtrip_through_serde() {
        let v = serde_json::to_value(WeekdayKey::Terca).unwrap();
        assert_eq!(v, serde_json::json!("terca"));
        let g: AgeGroup = serde_json::from_value(serde_json::json!("Teens/Adultos")).unwrap();
        assert_eq!(g, AgeGroup::TeensAdults);
    }
}

use crate::dnd::{self, Container, DropPlan, DropRejection};
use crate::error::{DomainError, DomainResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnId {
    Ideas,
    Planning,
    Promoting,
    Done,
}

impl ColumnId {
    pub const ALL: [ColumnId; 4] = [
        ColumnId::Ideas,
        ColumnId::Planning,
        ColumnId::Promoting,
        ColumnId::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnId::Ideas => "ideas",
            ColumnId::Planning => "planning",
            ColumnId::Promoting => "promoting",
            ColumnId::Done => "done",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ColumnId::Ideas => "Ideias",
            ColumnId::Planning => "Planejando",
            ColumnId::Promoting => "Divulgando",
            ColumnId::Done => "Concluído",
        }
    }

    pub fn parse(s: &str) -> Option<ColumnId> {
        ColumnId::ALL.into_iter().find(|c| c.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTask {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub column_id: ColumnId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCell {
    pub iso: Option<NaiveDate>,
    pub day: Option<u32>,
}

/// Kanban board of academy events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBoard {
    #[serde(default)]
    columns: BTreeMap<ColumnId, Vec<EventTask>>,
}

impl EventBoard {
    pub fn column(&self, id: ColumnId) -> &[EventTask] {
        self.columns.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_task(
        &mut self,
        column: ColumnId,
        title: &str,
        date: NaiveDate,
    ) -> DomainResult<EventTask> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::Invalid("task title must not be empty".to_string()));
        }
        let task = EventTask {
            id: format!("evt-{}", Uuid::new_v4()),
            title: title.to_string(),
            date,
        };
        self.columns.entry(column).or_default().push(task.clone());
        Ok(task)
    }

    /// Resolves a drop against the board and applies it. Rejections leave the board untouched.
    pub fn apply_drop(
        &mut self,
        active_id: &str,
        over_id: Option<&str>,
    ) -> Result<DropPlan, DropRejection> {
        let ids: Vec<(ColumnId, Vec<String>)> = ColumnId::ALL
            .iter()
            .map(|c| (*c, self.column(*c).iter().map(|t| t.id.clone()).collect()))
            .collect();
        let containers: Vec<Container<'_>> = ids
            .iter()
            .map(|(c, items)| Container {
                id: c.as_str(),
                items: items.as_slice(),
            })
            .collect();
        let plan = dnd::plan_drop(&containers, active_id, over_id, None)?;

        let mut by_id: BTreeMap<String, EventTask> = self
            .columns
            .values()
            .flatten()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();
        let mut rebuild = |column: &str, order: &[String]| {
            if let Some(col) = ColumnId::parse(column) {
                let tasks = order.iter().filter_map(|id| by_id.remove(id)).collect();
                self.columns.insert(col, tasks);
            }
        };
        match &plan {
            DropPlan::Reorder { container, items } => rebuild(container, items),
            DropPlan::Transfer {
                source,
                source_items,
                target,
                target_items,
            } => {
                rebuild(source, source_items);
                rebuild(target, target_items);
            }
        }
        Ok(plan)
    }

    pub fn all_events(&self) -> Vec<CalendarEvent> {
        ColumnId::ALL
            .iter()
            .flat_map(|c| {
                self.column(*c).iter().map(move |t| CalendarEvent {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    date: t.date,
                    column_id: *c,
                })
            })
            .collect()
    }

    pub fn events_by_date(&self) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
        let mut out: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
        for ev in self.all_events() {
            out.entry(ev.date).or_default().push(ev);
        }
        out
    }

    pub fn events_for_date(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        self.all_events()
            .into_iter()
            .filter(|e| e.date == date)
            .collect()
    }
}

/// Monday-first month grid padded with blank cells to whole weeks.
pub fn month_cells(year: i32, month: u32) -> DomainResult<Vec<MonthCell>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::InvalidMonth(format!("{year:04}-{month:02}")))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| DomainError::InvalidMonth(format!("{year:04}-{month:02}")))?;
    let days_in_month = (next_first - first).num_days() as u32;
    let leading = first.weekday().num_days_from_monday();

    let mut cells = Vec::new();
    for _ in 0..leading {
        cells.push(MonthCell { iso: None, day: None });
    }
    for day in 1..=days_in_month {
        cells.push(MonthCell {
            iso: NaiveDate::from_ymd_opt(year, month, day),
            day: Some(day),
        });
    }
    while cells.len() % 7 != 0 {
        cells.push(MonthCell { iso: None, day: None });
    }
    Ok(cells)
}

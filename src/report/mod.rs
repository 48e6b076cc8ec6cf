/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::database::definitions::activity::Activity;
use crate::database::definitions::actor::Actor;
use crate::database::definitions::report::ReportKind;
use crate::database::definitions::task::Task;
use std::collections::{HashMap, HashSet};

pub mod workbook;

/// Hard limit of the xlsx format.
pub const SHEET_TITLE_LIMIT: usize = 31;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// How a completed task relates to its activity's standard time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Timeliness {
    Early,
    #[strum(serialize = "On-Time")]
    OnTime,
    Delay,
    /// completed without a recorded duration. Kept separate instead of
    /// lumping it into `Delay`.
    Unrecorded,
}

impl Timeliness {
    pub fn classify(time_taken: Option<f64>, standard_time: f64) -> Self {
        match time_taken {
            None => Self::Unrecorded,
            Some(taken) if taken < standard_time => Self::Early,
            Some(taken) if taken == standard_time => Self::OnTime,
            Some(_) => Self::Delay,
        }
    }
}

/// Hands out workbook sheet titles of at most [`SHEET_TITLE_LIMIT`] chars.
/// Two subjects whose titles collide after truncation get a `~n` suffix, so
/// no sheet silently overwrites another.
#[derive(Debug, Default)]
pub struct SheetTitles {
    used: HashSet<String>,
}

impl SheetTitles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, key: &str, name: &str) -> String {
        let base = truncate(format!("{key} {name}").as_str(), SHEET_TITLE_LIMIT);
        if self.used.insert(base.clone()) {
            return base;
        }

        let mut counter = 2u32;
        loop {
            let suffix = format!("~{counter}");
            let candidate = format!(
                "{}{suffix}",
                truncate(base.as_str(), SHEET_TITLE_LIMIT - suffix.chars().count())
            );
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

fn truncate(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub task: String,
    pub status: String,
    pub assignee: Option<String>,
    /// only set on employee sheets
    pub activity: Option<String>,
    pub time_taken: Option<f64>,
    pub standard_time: Option<f64>,
    pub timeliness: Timeliness,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub title: String,
    pub kind: ReportKind,
    pub rows: Vec<ReportRow>,
}

/// One sheet per activity, one row per task, in the given task order.
pub fn activity_sheets(groups: &[(Activity, Vec<Task>)]) -> Vec<ReportSheet> {
    let mut titles = SheetTitles::new();

    groups
        .iter()
        .map(|(activity, tasks)| {
            let title = titles.reserve(activity.id().key.as_str(), activity.name());
            let rows = tasks
                .iter()
                .map(|task| ReportRow {
                    task: task.title().clone(),
                    status: task.status().clone(),
                    assignee: task.assignee().clone(),
                    activity: None,
                    time_taken: *task.time_taken(),
                    standard_time: Some(*activity.standard_time()),
                    timeliness: Timeliness::classify(
                        *task.time_taken(),
                        *activity.standard_time(),
                    ),
                })
                .collect();

            ReportSheet {
                title,
                kind: ReportKind::Activity,
                rows,
            }
        })
        .collect()
}

/// One sheet per employee. The standard time comes from the task's activity,
/// resolved through `activities` (keyed by id string); a task without a
/// resolvable activity cannot be timed and is reported as `Unrecorded`.
pub fn employee_sheets(
    groups: &[(Actor, Vec<Task>)],
    activities: &HashMap<String, Activity>,
) -> Vec<ReportSheet> {
    let mut titles = SheetTitles::new();

    groups
        .iter()
        .map(|(actor, tasks)| {
            let title = titles.reserve(actor.id().key.as_str(), actor.name());
            let rows = tasks
                .iter()
                .map(|task| {
                    let activity = task.activity().as_ref().and_then(|relation| {
                        relation.fetched().or_else(|| {
                            relation
                                .foreign_key()
                                .and_then(|id| activities.get(&id.to_string()))
                        })
                    });

                    ReportRow {
                        task: task.title().clone(),
                        status: task.status().clone(),
                        assignee: task.assignee().clone(),
                        activity: activity.map(|activity| activity.name().clone()),
                        time_taken: *task.time_taken(),
                        standard_time: activity.map(|activity| *activity.standard_time()),
                        timeliness: match activity {
                            Some(activity) => {
                                Timeliness::classify(*task.time_taken(), *activity.standard_time())
                            }
                            None => Timeliness::Unrecorded,
                        },
                    }
                })
                .collect();

            ReportSheet {
                title,
                kind: ReportKind::Employee,
                rows,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn activity(key: &str, name: &str, standard_time: f64) -> Activity {
        serde_json::from_value(json!({
            "id": format!("activity:{key}"),
            "name": name,
            "standard_time": standard_time,
            "updated_at": "2024-01-01T00:00:00Z",
            "created_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap()
    }

    pub fn completed_task(title: &str, activity: &str, time_taken: Option<f64>) -> Task {
        serde_json::from_value(json!({
            "id": format!("task:{title}"),
            "title": title,
            "status": "completed",
            "activity": format!("activity:{activity}"),
            "time_taken": time_taken,
            "updated_at": "2024-01-01T00:00:00Z",
            "created_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(Timeliness::Early, Timeliness::classify(Some(8.0), 10.0));
        assert_eq!(Timeliness::OnTime, Timeliness::classify(Some(10.0), 10.0));
        assert_eq!(Timeliness::Delay, Timeliness::classify(Some(12.0), 10.0));
        assert_eq!(Timeliness::Unrecorded, Timeliness::classify(None, 10.0));
    }

    #[test]
    fn test_labels() {
        assert_eq!("Early", Timeliness::Early.to_string());
        assert_eq!("On-Time", Timeliness::OnTime.to_string());
        assert_eq!("Delay", Timeliness::Delay.to_string());
        assert_eq!("Unrecorded", Timeliness::Unrecorded.to_string());
    }

    #[test]
    fn test_title_truncation() {
        let mut titles = SheetTitles::new();
        let title = titles.reserve("a1b2c3", "a very long activity name that exceeds the limit");
        assert_eq!(SHEET_TITLE_LIMIT, title.chars().count());
        assert_eq!("a1b2c3 a very long activity nam", title);
    }

    #[test]
    fn test_title_collisions() {
        let mut titles = SheetTitles::new();
        let first = titles.reserve("a1b2c3", "a very long activity name that exceeds the limit");
        let second = titles.reserve("a1b2c3", "a very long activity name that diverges late");
        assert_ne!(first, second);
        assert!(second.chars().count() <= SHEET_TITLE_LIMIT);
        assert!(second.ends_with("~2"));

        let short = titles.reserve("x", "short");
        assert_eq!("x short", short);
    }

    #[test]
    fn test_activity_sheets_worked_example() {
        let subject = activity("rec", "reconciliation", 10.0);
        let tasks = vec![
            completed_task("march run", "rec", Some(8.0)),
            completed_task("april run", "rec", Some(10.0)),
        ];

        let sheets = activity_sheets(&[(subject, tasks)]);
        assert_eq!(1, sheets.len());
        let sheet = &sheets[0];
        assert_eq!("rec reconciliation", sheet.title);
        assert_eq!(2, sheet.rows.len());
        assert_eq!(Timeliness::Early, sheet.rows[0].timeliness);
        assert_eq!("march run", sheet.rows[0].task);
        assert_eq!(Timeliness::OnTime, sheet.rows[1].timeliness);
        assert_eq!("april run", sheet.rows[1].task);
    }

    #[test]
    fn test_employee_sheets_resolve_activities() {
        let actor: Actor = serde_json::from_value(json!({
            "id": "actor:emp1",
            "name": "first last",
            "mail": "emp@test.de",
            "password": "hash",
            "role": "Employee",
            "updated_at": "2024-01-01T00:00:00Z",
            "created_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();

        let rec = activity("rec", "reconciliation", 10.0);
        let mut activities = HashMap::new();
        activities.insert(rec.id().to_string(), rec);

        let tasks = vec![
            completed_task("march run", "rec", Some(12.0)),
            // activity unknown, cannot be timed
            completed_task("stray", "gone", Some(1.0)),
        ];

        let sheets = employee_sheets(&[(actor, tasks)], &activities);
        assert_eq!(1, sheets.len());
        let rows = &sheets[0].rows;
        assert_eq!(Timeliness::Delay, rows[0].timeliness);
        assert_eq!(Some("reconciliation".to_owned()), rows[0].activity);
        assert_eq!(Timeliness::Unrecorded, rows[1].timeliness);
        assert_eq!(None, rows[1].activity);
    }
}

//! Due-today filtering and digest rendering
//!
//! Both halves are pure: the pipeline computes "today" once per board pass
//! and hands it in, so every task in a pass is judged against the same date.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::clickup::Task;

const DATE_FORMAT: &str = "%B %d, %Y";

/// Calendar date of an epoch-millisecond timestamp in the given zone.
fn local_date(ms: i64, tz: Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.with_timezone(&tz).date_naive())
}

/// Keep only tasks whose due timestamp falls on `today` in `tz`.
///
/// Tasks without a due timestamp are dropped. The comparison is date-only.
pub fn due_today(tasks: Vec<Task>, today: NaiveDate, tz: Tz) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| t.due_date.and_then(|ms| local_date(ms, tz)) == Some(today))
        .collect()
}

/// Assignee display name -> rendered task lines, in order of first appearance.
///
/// A task with several assignees contributes one line under each of them.
#[derive(Debug, Default)]
struct TaskMap {
    groups: Vec<(String, Vec<String>)>,
}

impl TaskMap {
    fn push(&mut self, assignee: &str, line: String) {
        match self.groups.iter_mut().find(|(name, _)| name == assignee) {
            Some((_, lines)) => lines.push(line),
            None => self.groups.push((assignee.to_string(), vec![line])),
        }
    }
}

/// Render one board's digest in Telegram Markdown.
///
/// An empty task set renders the short "no tasks" message; otherwise the
/// board title and date head one section per assignee, each line carrying
/// the task name as a link, its due date, and its status.
pub fn render_digest(title: &str, tasks: &[Task], today: NaiveDate, tz: Tz) -> String {
    if tasks.is_empty() {
        return format!("{}\nNo tasks due today!", title);
    }

    let mut map = TaskMap::default();
    for task in tasks {
        // Unreachable after the filter, but keeps the formatter total.
        let due_str = task
            .due_date
            .and_then(|ms| DateTime::from_timestamp_millis(ms))
            .map(|dt| dt.with_timezone(&tz).format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "No due time".to_string());

        let line = format!(
            "- [{}]({}) ({}) - *{}*",
            task.name, task.url, due_str, task.status.status
        );

        if task.assignees.is_empty() {
            map.push("Unassigned", line);
        } else {
            for assignee in &task.assignees {
                map.push(assignee.display_name(), line.clone());
            }
        }
    }

    let mut msg = format!("{} ({})\n", title, today.format(DATE_FORMAT));
    for (name, lines) in &map.groups {
        msg.push_str(&format!(
            "\n*{}* is assigned at:\n{}\n",
            name,
            lines.join("\n")
        ));
    }
    msg.push('\n');
    msg
}

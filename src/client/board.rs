//! Task board view-model.
//!
//! Holds the client-side state the frontend works from: the in-progress form
//! draft, the last-fetched snapshot of the task list, and the id of the task
//! being edited (if any). The pending/completed views are recomputed from the
//! single snapshot on every call — never stored — so every task appears in
//! exactly one of the two partitions.

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::debug;

use super::ApiClient;
use crate::storage::TaskRow;

const TIME_PLACEHOLDER: &str = "--:--";

/// The form draft. Field names double as the wire format for create/update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub time: String,
    pub date: String,
    pub category: String,
    pub completed: bool,
}

pub struct TaskBoard {
    client: ApiClient,
    /// In-progress form contents.
    pub draft: TaskDraft,
    /// Last-fetched snapshot — the single source for both derived views.
    pub tasks: Vec<TaskRow>,
    /// When set, submitting the form updates this task instead of creating.
    pub edit_id: Option<String>,
}

impl TaskBoard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            draft: TaskDraft::default(),
            tasks: Vec::new(),
            edit_id: None,
        }
    }

    /// Fetch the server's task list and replace the local snapshot.
    pub async fn refresh(&mut self) -> Result<()> {
        self.tasks = self.client.list_tasks().await?;
        Ok(())
    }

    /// Submit the form. An empty/whitespace title is rejected locally with no
    /// network call. In edit mode the full draft is sent as an update and the
    /// matching snapshot entry replaced by the server's record; otherwise a
    /// create is sent and the new record prepended. On success the draft
    /// resets and edit mode clears; on failure local state is untouched.
    pub async fn submit(&mut self) -> Result<()> {
        if self.draft.title.trim().is_empty() {
            bail!("enter a task title");
        }

        if let Some(id) = self.edit_id.clone() {
            let updated = self.client.update_task(&id, &self.draft).await?;
            debug!(id = %updated.id, "task updated");
            if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
                *slot = updated;
            }
            self.edit_id = None;
        } else {
            let created = self.client.create_task(&self.draft).await?;
            debug!(id = %created.id, "task created");
            self.tasks.insert(0, created);
        }

        self.draft = TaskDraft::default();
        Ok(())
    }

    /// Enter edit mode: copy the task's fields into the draft. Returns false
    /// if the id is not in the snapshot.
    pub fn start_edit(&mut self, id: &str) -> bool {
        let Some(task) = self.tasks.iter().find(|t| t.id == id) else {
            return false;
        };
        self.draft = TaskDraft {
            title: task.title.clone(),
            time: task.time.clone(),
            date: task.date.clone(),
            category: task.category.clone(),
            completed: task.completed,
        };
        self.edit_id = Some(id.to_string());
        true
    }

    /// Send an update carrying only the inverted `completed` flag and replace
    /// the matching snapshot entry with the response.
    pub async fn toggle_complete(&mut self, id: &str) -> Result<()> {
        let Some(current) = self.tasks.iter().find(|t| t.id == id).map(|t| t.completed) else {
            bail!("unknown task id: {id}");
        };
        let updated = self.client.set_completed(id, !current).await?;
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Delete on the server, then drop the matching local entry. The response
    /// body is not inspected — completion of the request is enough.
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        self.client.delete_task(id).await?;
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    pub fn pending(&self) -> Vec<&TaskRow> {
        self.tasks.iter().filter(|t| !t.completed).collect()
    }

    pub fn completed(&self) -> Vec<&TaskRow> {
        self.tasks.iter().filter(|t| t.completed).collect()
    }
}

/// Map a 24-hour "HH:MM" string to "H:MM AM/PM". Empty or malformed input
/// yields the fixed placeholder. No timezone conversion.
pub fn format_time_12hr(time24: &str) -> String {
    let Some((h, m)) = time24.split_once(':') else {
        return TIME_PLACEHOLDER.to_string();
    };
    let (hour, minute) = match (h.parse::<u32>(), m.parse::<u32>()) {
        (Ok(hour), Ok(minute)) if hour < 24 && minute < 60 => (hour, minute),
        _ => return TIME_PLACEHOLDER.to_string(),
    };
    let ampm = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:{minute:02} {ampm}")
}

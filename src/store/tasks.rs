//! Projects, the selected task and measurement units.

use crate::api::tasks;
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::{MeasurementUnit, Task, TaskDraft, TaskPatch, TaskType};

use super::{tracked, upsert_by};

/// A task write.
#[derive(Debug, Clone)]
pub enum TaskChange {
    /// Insert a new task.
    Create(TaskDraft),
    /// Partially update an existing task.
    Update {
        /// Task id.
        id: String,
        /// Fields to change.
        patch: TaskPatch,
    },
}

/// Cached projects and the task being viewed.
#[derive(Debug, Default)]
pub struct TasksSlice {
    /// Projects, plus any task fetched by id.
    pub tasks: Vec<Task>,
    /// Measurement units.
    pub units: Vec<MeasurementUnit>,
    /// Task being viewed or edited.
    pub selected: Option<Task>,
    /// A task request is in flight.
    pub loading: bool,
    /// A unit request is in flight.
    pub units_loading: bool,
    /// The project list was loaded at least once.
    pub fetched: bool,
}

impl TasksSlice {
    /// Loads every PROJECT-typed task, replacing the cached list.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cached list is kept.
    pub async fn get_tasks(&mut self, ctx: &ServiceContext) -> Result<&[Task], AppError> {
        let fetched =
            tracked(&mut self.loading, "get_tasks", tasks::fetch_tasks(ctx, TaskType::Project)).await?;
        self.tasks = fetched;
        self.fetched = true;
        Ok(&self.tasks)
    }

    /// Loads one task, caches it and selects it.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cache is untouched.
    pub async fn get_task_by_id(&mut self, ctx: &ServiceContext, id: &str) -> Result<&Task, AppError> {
        let task = tracked(&mut self.loading, "get_task_by_id", tasks::fetch_task_by_id(ctx, id)).await?;
        upsert_by(&mut self.tasks, task.clone(), |t| t.id.clone());
        Ok(self.selected.insert(task))
    }

    /// Loads the measurement units.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cached units are kept.
    pub async fn get_units(&mut self, ctx: &ServiceContext) -> Result<&[MeasurementUnit], AppError> {
        self.units = tracked(&mut self.units_loading, "get_units", tasks::fetch_units(ctx)).await?;
        Ok(&self.units)
    }

    /// Inserts or updates a task, then caches and selects the stored row.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cache is untouched.
    pub async fn save_task(&mut self, ctx: &ServiceContext, change: TaskChange) -> Result<&Task, AppError> {
        let task = match &change {
            TaskChange::Create(draft) => {
                tracked(&mut self.loading, "save_task", tasks::create_task(ctx, draft)).await?
            }
            TaskChange::Update { id, patch } => {
                tracked(&mut self.loading, "save_task", tasks::update_task(ctx, id, patch)).await?
            }
        };
        upsert_by(&mut self.tasks, task.clone(), |t| t.id.clone());
        Ok(self.selected.insert(task))
    }

    /// Deletes a task and drops it from the cache.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cache is untouched.
    pub async fn delete_task(&mut self, ctx: &ServiceContext, id: &str) -> Result<(), AppError> {
        let deleted =
            tracked(&mut self.loading, "delete_task", tasks::delete_task_by_id(ctx, id)).await?;
        self.tasks.retain(|t| t.id != deleted);
        if self.selected.as_ref().is_some_and(|t| t.id == deleted) {
            self.selected = None;
        }
        Ok(())
    }

    /// Selects a cached task without a remote call.
    pub fn select_task(&mut self, id: &str) -> Option<&Task> {
        let task = self.tasks.iter().find(|t| t.id == id).cloned()?;
        Some(self.selected.insert(task))
    }

    /// Clears the selection.
    pub fn reset_task(&mut self) {
        self.selected = None;
    }
}

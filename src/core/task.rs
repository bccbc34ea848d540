//! Task trait and related types

use std::fmt;

/// A trait representing a unit of work to be executed by the thread pool
///
/// Tasks are one-shot: the pool calls [`run`](Task::run) exactly once, on
/// some worker thread, and discards the task afterwards. There is no result
/// channel back to the submitter.
pub trait Task: Send {
    /// Execute the task, consuming it
    ///
    /// # Panics
    ///
    /// Panics are not intercepted by the pool. A panic unwinds through the
    /// worker's stack and terminates that worker thread.
    fn run(self: Box<Self>);

    /// Get the task's type name for debugging
    fn task_type(&self) -> &str {
        "Task"
    }
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.task_type())
    }
}

/// A boxed task that can be sent across threads
pub type BoxedTask = Box<dyn Task>;

/// Helper to create a task from a closure
pub struct ClosureTask<F>
where
    F: FnOnce() + Send,
{
    closure: F,
    name: String,
}

impl<F> ClosureTask<F>
where
    F: FnOnce() + Send,
{
    /// Create a new closure task
    pub fn new(closure: F) -> Self {
        Self {
            closure,
            name: "ClosureTask".to_string(),
        }
    }

    /// Create a new closure task with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure,
            name: name.into(),
        }
    }
}

impl<F> Task for ClosureTask<F>
where
    F: FnOnce() + Send,
{
    fn run(self: Box<Self>) {
        (self.closure)()
    }

    fn task_type(&self) -> &str {
        &self.name
    }
}

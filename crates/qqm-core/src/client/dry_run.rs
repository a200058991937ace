//! Connector wrapper that reads from the real client but never changes the queue.

use super::{ClientError, Connector, QueueActions, TaskSource};
use crate::task::TaskSnapshot;

#[derive(Debug, Clone)]
pub struct DryRun<T>(pub T);

impl<C: Connector> Connector for DryRun<C> {
    type Session = DryRun<C::Session>;

    fn connect(&self) -> Result<Self::Session, ClientError> {
        self.0.connect().map(DryRun)
    }

    fn describe(&self) -> String {
        format!("{} (dry run)", self.0.describe())
    }
}

impl<S: TaskSource> TaskSource for DryRun<S> {
    fn list_tasks(&mut self) -> Result<Vec<TaskSnapshot>, ClientError> {
        self.0.list_tasks()
    }
}

impl<S> QueueActions for DryRun<S> {
    fn move_to_bottom(&mut self, hashes: &[&str]) -> Result<(), ClientError> {
        tracing::info!(hashes = ?hashes, "dry run: would move to bottom of queue");
        Ok(())
    }
}

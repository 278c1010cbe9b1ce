//! In-memory repositories for runs and tasks.

mod run;
mod task;

pub use run::InMemoryRunRepository;
pub use task::InMemoryTaskRepository;

use crate::run::ports::RunRepositoryError;
use std::sync::PoisonError;

fn lock_error<T>(err: &PoisonError<T>) -> RunRepositoryError {
    RunRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

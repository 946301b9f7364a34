use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::DispatchConfig;

/// Policy for running accepted connections.
///
/// `Unbounded` spawns one task per connection with no admission control, so a
/// flood of clients is limited only by the runtime. `Bounded` holds a
/// semaphore permit for the lifetime of each connection task; when none is
/// free, dispatching waits and the accept loop stops accepting until one is.
#[derive(Debug, Clone)]
pub enum Dispatch {
    Unbounded,
    Bounded(Arc<Semaphore>),
}

impl Dispatch {
    pub fn from_config(cfg: &DispatchConfig) -> Self {
        match cfg {
            DispatchConfig::Unbounded => Dispatch::Unbounded,
            DispatchConfig::Bounded { max_connections } => Dispatch::bounded(*max_connections),
        }
    }

    pub fn bounded(max_connections: usize) -> Self {
        Dispatch::Bounded(Arc::new(Semaphore::new(max_connections)))
    }

    /// Free connection slots, `None` when unbounded.
    pub fn available(&self) -> Option<usize> {
        match self {
            Dispatch::Unbounded => None,
            Dispatch::Bounded(limit) => Some(limit.available_permits()),
        }
    }

    /// Spawns `task` into `tasks` according to the policy.
    pub async fn spawn<F>(&self, tasks: &mut JoinSet<()>, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self {
            Dispatch::Unbounded => {
                tasks.spawn(task);
            }
            Dispatch::Bounded(limit) => match Arc::clone(limit).acquire_owned().await {
                Ok(permit) => {
                    tasks.spawn(async move {
                        task.await;
                        drop(permit);
                    });
                }
                // The semaphore is never closed
                Err(_) => {
                    tasks.spawn(task);
                }
            },
        }
    }
}

//! Supervision of detached background tasks.
//!
//! Panics inside request handlers are contained by `CatchPanicLayer`. A task
//! spawned outside the request path (the heartbeat, a connection's sender)
//! has no such boundary: when one dies the shared state it touches can no
//! longer be trusted, and the process terminates instead of limping on.

use std::any::Any;

use tokio::task::JoinHandle;

/// Exit status used when a supervised task fails.
pub const EXIT_TASK_FAILED: i32 = 70;

/// How a supervised task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskExit {
    /// The task's future completed.
    Returned,
    /// The task was aborted through its handle.
    Cancelled,
    /// The task panicked; carries the panic message.
    Panicked(String),
}

/// Wait for `handle` to finish and report how it ended.
///
/// Takes the handle by reference so the caller can still abort it when
/// another branch of a `select!` wins.
pub async fn watch(handle: &mut JoinHandle<()>) -> TaskExit {
    match handle.await {
        Ok(()) => TaskExit::Returned,
        Err(err) if err.is_cancelled() => TaskExit::Cancelled,
        Err(err) => TaskExit::Panicked(panic_message(&*err.into_panic())),
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Log the failure of `task` and exit the process.
pub fn terminate(task: &str, exit: &TaskExit) -> ! {
    tracing::error!(task, ?exit, "Background task failed, terminating process");
    std::process::exit(EXIT_TASK_FAILED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicking_task_reports_its_message() {
        let mut handle = tokio::spawn(async {
            panic!("heartbeat exploded");
        });
        assert_eq!(
            watch(&mut handle).await,
            TaskExit::Panicked("heartbeat exploded".into())
        );
    }

    #[tokio::test]
    async fn formatted_panics_are_captured_too() {
        let mut handle = tokio::spawn(async {
            let tick = 3;
            panic!("tick {tick} failed");
        });
        assert_eq!(watch(&mut handle).await, TaskExit::Panicked("tick 3 failed".into()));
    }

    #[tokio::test]
    async fn aborted_task_is_cancelled() {
        let mut handle = tokio::spawn(std::future::pending::<()>());
        handle.abort();
        assert_eq!(watch(&mut handle).await, TaskExit::Cancelled);
    }

    #[tokio::test]
    async fn finished_task_returned() {
        let mut handle = tokio::spawn(async {});
        assert_eq!(watch(&mut handle).await, TaskExit::Returned);
    }

    #[test]
    fn opaque_payloads_have_a_placeholder() {
        assert_eq!(panic_message(&42_u8), "unknown panic payload");
        assert_eq!(panic_message(&"static"), "static");
    }
}

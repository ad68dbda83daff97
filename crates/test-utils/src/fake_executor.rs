use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cmdguard::exec::{ExecutionRequest, ExecutionResult, ExecutorBackend};

/// A fake executor that:
/// - records every request it receives
/// - immediately returns a successful result whose stdout is
///   `ran: <command>`, without spawning anything.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    requests: Arc<Mutex<Vec<ExecutionRequest>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.command.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn execute(
        &self,
        request: ExecutionRequest,
    ) -> Pin<Box<dyn Future<Output = ExecutionResult> + Send + '_>> {
        let requests = self.requests.clone();
        Box::pin(async move {
            requests.lock().unwrap().push(request.clone());
            let cwd = request.working_directory.unwrap_or_else(|| PathBuf::from("."));
            if request.dry_run {
                ExecutionResult::dry_run(request.command, cwd)
            } else {
                let stdout = format!("ran: {}\n", request.command);
                ExecutionResult::completed(request.command, 0, stdout, "", cwd, Duration::ZERO)
            }
        })
    }
}

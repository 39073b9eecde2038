//! The privileged operation gateway.
//!
//! Every call goes through the same sequence: read the current session,
//! check permissions, run the operation under a deadline, and fold whatever
//! happened into an [`OperationResult`]. Nothing escapes as an `Err` or a
//! panic.
//!
//! The gateway also publishes a [`GatewayStatus`] (`loading`, `last_error`)
//! for UI bindings. It is a single slot per gateway: when several calls run
//! concurrently through one instance, the last one to write wins.

use crate::error::GatewayError;
use crate::models::operation::{ErrorKind, OperationRequest, OperationResult};
use crate::models::session::{Session, SessionProvider};
use crate::services::metrics;
use crate::services::permission::PermissionChecker;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::Instrument;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayStatus {
    pub loading: bool,
    pub last_error: Option<(ErrorKind, String)>,
}

#[derive(Clone)]
pub struct OperationGateway {
    sessions: Arc<dyn SessionProvider>,
    permissions: PermissionChecker,
    status: Arc<watch::Sender<GatewayStatus>>,
}

impl OperationGateway {
    pub fn new(sessions: Arc<dyn SessionProvider>, permissions: PermissionChecker) -> Self {
        let (status, _) = watch::channel(GatewayStatus::default());
        Self {
            sessions,
            permissions,
            status: Arc::new(status),
        }
    }

    pub fn status(&self) -> GatewayStatus {
        self.status.borrow().clone()
    }

    /// Observe status changes; any number of receivers may subscribe.
    pub fn subscribe(&self) -> watch::Receiver<GatewayStatus> {
        self.status.subscribe()
    }

    /// Check permissions, then run `op` with the session under the request's
    /// deadline.
    ///
    /// `op` is never invoked when the check fails. On timeout the operation
    /// future is dropped, which aborts any request it has in flight.
    pub async fn execute<T, F, Fut>(&self, request: OperationRequest, op: F) -> OperationResult<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let span = tracing::info_span!(
            "operation",
            kind = %request.kind,
            user_id = tracing::field::Empty,
        );

        self.run(request, op).instrument(span).await
    }

    async fn run<T, F, Fut>(&self, request: OperationRequest, op: F) -> OperationResult<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let started = Instant::now();
        self.status.send_replace(GatewayStatus::default());

        let session = self.sessions.current_session().await;
        if let Some(s) = &session {
            tracing::Span::current().record("user_id", s.user_id.as_str());
        }

        let session = match self.permissions.check(session.as_ref(), &request) {
            Ok(session) => session.clone(),
            Err(denied) => {
                let result = OperationResult::failure(denied.kind(), denied.to_string());
                return self.finish(&request, started, result);
            }
        };

        self.status.send_modify(|s| s.loading = true);

        let result = match tokio::time::timeout(request.timeout(), op(session)).await {
            Ok(Ok(data)) => OperationResult::success(data),
            Ok(Err(e)) => OperationResult::failure(e.kind(), e.to_string()),
            Err(_) => OperationResult::failure(
                ErrorKind::Timeout,
                format!("Operation timed out after {} ms", request.timeout_ms()),
            ),
        };

        self.finish(&request, started, result)
    }

    fn finish<T>(
        &self,
        request: &OperationRequest,
        started: Instant,
        result: OperationResult<T>,
    ) -> OperationResult<T> {
        let elapsed = started.elapsed();
        let error = result
            .error_kind()
            .zip(result.error_message().map(|m| m.to_string()));

        match &error {
            None => tracing::info!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Operation succeeded"
            ),
            Some((ErrorKind::Upstream | ErrorKind::Unknown, message)) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %message,
                "Operation failed"
            ),
            Some((kind, message)) => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                error_kind = %kind,
                error = %message,
                "Operation rejected"
            ),
        }

        metrics::record_outcome(request.kind, result.error_kind(), elapsed);

        self.status.send_replace(GatewayStatus {
            loading: false,
            last_error: error,
        });

        result
    }
}

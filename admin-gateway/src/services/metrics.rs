use crate::models::operation::{ErrorKind, OperationKind};
use metrics::{counter, histogram};
use std::time::Duration;

pub fn record_outcome(kind: OperationKind, error: Option<ErrorKind>, elapsed: Duration) {
    let outcome = error.map(|e| e.as_str()).unwrap_or("Success");

    let labels = [("kind", kind.as_str()), ("outcome", outcome)];
    counter!("gateway_operations_total", &labels).increment(1);
    histogram!("gateway_operation_duration_seconds", "kind" => kind.as_str())
        .record(elapsed.as_secs_f64());
}

//! One entry point per admin operation kind.
//!
//! Each wrapper resolves its endpoint, then hands the HTTP call to the
//! gateway with the admin requirement and the configured deadline. Failures
//! come back exactly as the gateway classified them; nothing is retried.

use crate::config::Settings;
use crate::error::GatewayError;
use crate::models::operation::{OperationKind, OperationRequest, OperationResult};
use crate::models::session::SessionProvider;
use crate::services::admin_client::AdminClient;
use crate::services::gateway::OperationGateway;
use crate::services::permission::PermissionChecker;
use crate::services::routes::{
    AnalyticsRange, BillingAction, ContentAction, Endpoint, ExportFormat, ExportRequest,
    UserAction,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Exported data as returned by the backend. CSV exports are not JSON, so
/// the body is kept as bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ExportPayload {
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

#[derive(Clone)]
pub struct AdminOperations {
    pub(crate) gateway: OperationGateway,
    pub(crate) client: AdminClient,
    pub(crate) settings: Arc<Settings>,
}

impl AdminOperations {
    pub fn new(
        settings: Settings,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, GatewayError> {
        let client = AdminClient::new(&settings.backend)?;
        let permissions = PermissionChecker::new(&settings.authorization);
        let gateway = OperationGateway::new(sessions, permissions);

        tracing::info!(
            backend = %client.base_url(),
            timeout_ms = settings.operations.timeout_ms,
            "Admin operations ready"
        );

        Ok(Self {
            gateway,
            client,
            settings: Arc::new(settings),
        })
    }

    pub fn gateway(&self) -> &OperationGateway {
        &self.gateway
    }

    pub(crate) fn request_for(&self, kind: OperationKind) -> OperationRequest {
        let timeout = match kind {
            OperationKind::ExportData => self.settings.operations.export_timeout(),
            _ => self.settings.operations.timeout(),
        };
        OperationRequest::new(kind).with_timeout(timeout)
    }

    async fn call_json(&self, endpoint: Endpoint) -> OperationResult<Value> {
        let request = self.request_for(endpoint.kind);
        let client = &self.client;

        self.gateway
            .execute(request, |session| async move {
                client.send(&endpoint, &session).await
            })
            .await
    }

    /// List, create, update, promote, demote or delete users.
    pub async fn manage_users(&self, action: UserAction) -> OperationResult<Value> {
        self.call_json(action.endpoint()).await
    }

    pub async fn view_analytics(&self, range: AnalyticsRange) -> OperationResult<Value> {
        self.call_json(range.endpoint()).await
    }

    pub async fn manage_content(&self, action: ContentAction) -> OperationResult<Value> {
        self.call_json(action.endpoint()).await
    }

    pub async fn manage_billing(&self, action: BillingAction) -> OperationResult<Value> {
        self.call_json(action.endpoint()).await
    }

    /// Download an export. The content type falls back to the format's
    /// canonical one when the backend omits it.
    pub async fn export_data(&self, export: ExportRequest) -> OperationResult<ExportPayload> {
        let endpoint = export.endpoint();
        let request = self.request_for(endpoint.kind);
        let client = &self.client;

        self.gateway
            .execute(request, |session| async move {
                let raw = client.send_raw(&endpoint, &session).await?;
                Ok(ExportPayload {
                    format: export.format,
                    content_type: raw
                        .content_type
                        .unwrap_or_else(|| export.format.content_type().to_string()),
                    body: raw.bytes,
                })
            })
            .await
    }
}

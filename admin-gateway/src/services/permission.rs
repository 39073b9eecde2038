//! Role checks performed before a privileged operation runs.
//!
//! Enforcement is an explicit configuration value. With enforcement off the
//! checker still insists on a signed-in session, but admin and role
//! constraints are skipped.

use crate::config::AuthorizationSettings;
use crate::error::PermissionDenied;
use crate::models::operation::OperationRequest;
use crate::models::session::Session;

#[derive(Debug, Clone)]
pub struct PermissionChecker {
    enforce_authorization: bool,
}

impl PermissionChecker {
    pub fn new(settings: &AuthorizationSettings) -> Self {
        if settings.enforce_authorization {
            tracing::info!("Role enforcement enabled for admin operations");
        } else {
            tracing::warn!(
                "Role enforcement DISABLED: any signed-in user may run admin operations"
            );
        }

        Self {
            enforce_authorization: settings.enforce_authorization,
        }
    }

    pub fn enforcing() -> Self {
        Self {
            enforce_authorization: true,
        }
    }

    /// Returns the session the call may proceed with.
    pub fn check<'a>(
        &self,
        session: Option<&'a Session>,
        request: &OperationRequest,
    ) -> Result<&'a Session, PermissionDenied> {
        let session = session.ok_or(PermissionDenied::Unauthenticated)?;

        if !self.enforce_authorization {
            return Ok(session);
        }

        if request.require_admin && !session.is_admin() {
            tracing::warn!(
                user_id = %session.user_id,
                role = %session.role,
                operation = %request.kind,
                "Permission denied: admin role required"
            );
            return Err(PermissionDenied::Forbidden(
                "Admin privileges required".to_string(),
            ));
        }

        if let Some(role) = &request.require_role {
            if !session.has_role(role) {
                tracing::warn!(
                    user_id = %session.user_id,
                    role = %session.role,
                    required_role = %role,
                    operation = %request.kind,
                    "Permission denied: missing role"
                );
                return Err(PermissionDenied::Forbidden(format!("Role '{}' required", role)));
            }
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::operation::OperationKind;
    use chrono::{Duration, Utc};

    fn session(role: &str) -> Session {
        Session::new("user-1", role, "token", Utc::now() + Duration::hours(1))
    }

    fn relaxed() -> PermissionChecker {
        PermissionChecker::new(&AuthorizationSettings {
            enforce_authorization: false,
        })
    }

    #[test]
    fn test_missing_session_is_unauthenticated() {
        let request = OperationRequest::new(OperationKind::ManageUsers);
        assert!(matches!(
            PermissionChecker::enforcing().check(None, &request),
            Err(PermissionDenied::Unauthenticated)
        ));
    }

    #[test]
    fn test_missing_session_is_unauthenticated_without_enforcement() {
        let request = OperationRequest::new(OperationKind::ManageUsers);
        assert!(matches!(
            relaxed().check(None, &request),
            Err(PermissionDenied::Unauthenticated)
        ));
    }

    #[test]
    fn test_non_admin_is_forbidden() {
        let request = OperationRequest::new(OperationKind::ManageBilling);
        let user = session("user");
        let result = PermissionChecker::enforcing().check(Some(&user), &request);
        assert!(matches!(result, Err(PermissionDenied::Forbidden(_))));
    }

    #[test]
    fn test_admin_passes() {
        let request = OperationRequest::new(OperationKind::ManageBilling);
        let admin = session("admin");
        let allowed = PermissionChecker::enforcing()
            .check(Some(&admin), &request)
            .unwrap();
        assert_eq!(allowed.user_id, "user-1");
    }

    #[test]
    fn test_required_role_must_match() {
        let request = OperationRequest::new(OperationKind::ManageContent)
            .require_admin(false)
            .require_role("editor");
        let checker = PermissionChecker::enforcing();

        assert!(checker.check(Some(&session("editor")), &request).is_ok());
        assert!(matches!(
            checker.check(Some(&session("user")), &request),
            Err(PermissionDenied::Forbidden(msg)) if msg.contains("editor")
        ));
    }

    #[test]
    fn test_relaxed_checker_skips_role_checks() {
        let request = OperationRequest::new(OperationKind::ExportData).require_role("auditor");
        let user = session("user");
        let allowed = relaxed().check(Some(&user), &request).unwrap();
        assert_eq!(allowed.role, "user");
    }

    #[test]
    fn test_relaxed_checker_skips_admin_check() {
        let request = OperationRequest::new(OperationKind::ManageBilling);
        let user = session("user");
        assert!(request.require_admin);
        assert!(relaxed().check(Some(&user), &request).is_ok());
    }
}

//! Gate for automation code: refuse to act unless the host is ready.

use tracing::warn;

use crate::error::PreflightError;
use crate::types::ReadinessSnapshot;

pub fn require_ready(snapshot: &ReadinessSnapshot) -> Result<(), PreflightError> {
    if snapshot.is_ready() {
        return Ok(());
    }

    let reason_codes = snapshot
        .impaired()
        .into_iter()
        .map(|result| result.reason_code.clone())
        .collect();
    warn!("Desktop control preflight blocked: {}", snapshot.status);

    Err(PreflightError {
        status: snapshot.status,
        reason_codes,
        message: snapshot.message.clone(),
        remediation: snapshot.remediation.clone(),
    })
}

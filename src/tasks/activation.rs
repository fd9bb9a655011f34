//! One-shot activation of offboard control.
//!
//! Both requests are issued exactly once, mode change first, and neither is
//! retried. A rejection is expected when the flight controller has not yet
//! seen a setpoint stream: the stream started right after activation is
//! what eventually lets it accept offboard mode.

use crate::{
    bridge::CommandClient,
    consts::OFFBOARD_MODE,
    errors::TransportError,
    types::messages::{ArmRequest, SetModeRequest},
};

const ID: &str = "activation";

/// Result of a single activation request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The flight controller confirmed the request
    Accepted,
    /// The flight controller answered, but refused the request
    Rejected,
    /// No answer could be obtained over the bridge
    TransportError(TransportError),
}

impl ActivationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ActivationOutcome::Accepted)
    }
}

impl From<Result<bool, TransportError>> for ActivationOutcome {
    fn from(value: Result<bool, TransportError>) -> Self {
        match value {
            Ok(true) => ActivationOutcome::Accepted,
            Ok(false) => ActivationOutcome::Rejected,
            Err(error) => ActivationOutcome::TransportError(error),
        }
    }
}

/// Outcomes of the full activation sequence, for the caller to inspect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub mode: ActivationOutcome,
    pub arm: ActivationOutcome,
}

/// Ask the flight controller to switch to offboard mode.
pub async fn request_offboard(client: &mut impl CommandClient) -> ActivationOutcome {
    let request = SetModeRequest {
        mode: OFFBOARD_MODE.into(),
    };

    let outcome: ActivationOutcome = client
        .set_mode(request)
        .await
        .map(|response| response.mode_accepted)
        .into();

    match outcome {
        ActivationOutcome::Accepted => info!("[{}] Offboard enabled", ID),
        ActivationOutcome::Rejected => warn!("[{}] Offboard mode request rejected", ID),
        ActivationOutcome::TransportError(error) => {
            error!("[{}] Offboard mode request failed: {}", ID, error)
        }
    }

    outcome
}

/// Ask the flight controller to arm the vehicle.
pub async fn request_arm(client: &mut impl CommandClient) -> ActivationOutcome {
    let outcome: ActivationOutcome = client
        .arm(ArmRequest { arm: true })
        .await
        .map(|response| response.success)
        .into();

    match outcome {
        ActivationOutcome::Accepted => info!("[{}] Vehicle armed", ID),
        ActivationOutcome::Rejected => warn!("[{}] Arm request rejected", ID),
        ActivationOutcome::TransportError(error) => {
            error!("[{}] Arm request failed: {}", ID, error)
        }
    }

    outcome
}

/// Run the activation sequence. Always runs both steps, in order.
pub async fn activate(client: &mut impl CommandClient) -> ActivationReport {
    let mode = request_offboard(client).await;
    let arm = request_arm(client).await;
    ActivationReport { mode, arm }
}

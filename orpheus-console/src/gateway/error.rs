//! Cluster Gateway errors
//!
//! Every failure carries a cause so callers can tell a bad kubeconfig from an
//! unreachable API server from an orchestrator refusal.

use thiserror::Error;

/// Why a gateway call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayCause {
    /// Credentials or kubeconfig could not be loaded, or the API refused them
    Auth,
    /// Transport failure or timeout
    Network,
    /// The orchestrator answered with an error status
    Rejected,
    /// The orchestrator answered with a record missing required fields
    Decode,
}

impl std::fmt::Display for GatewayCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayCause::Auth => "auth",
            GatewayCause::Network => "network",
            GatewayCause::Rejected => "rejected",
            GatewayCause::Decode => "decode",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error)]
#[error("cluster {cause} error: {message}")]
pub struct GatewayError {
    pub cause: GatewayCause,
    pub message: String,
    /// HTTP status reported by the orchestrator, when it answered
    pub status: Option<u16>,
}

impl GatewayError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            cause: GatewayCause::Auth,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            cause: GatewayCause::Network,
            message: message.into(),
            status: None,
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self {
            cause: GatewayCause::Rejected,
            message: message.into(),
            status: Some(status),
        }
    }

    /// A request refused before it left the console
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            cause: GatewayCause::Rejected,
            message: message.into(),
            status: None,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            cause: GatewayCause::Decode,
            message: message.into(),
            status: None,
        }
    }

    /// Network failures are worth a caller-initiated retry; the rest are not.
    pub fn is_retryable(&self) -> bool {
        self.cause == GatewayCause::Network
    }

    pub fn is_not_found(&self) -> bool {
        self.cause == GatewayCause::Rejected && self.status == Some(404)
    }
}

impl From<kube::Error> for GatewayError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 401 || resp.code == 403 => {
                let mut err = GatewayError::auth(resp.message);
                err.status = Some(resp.code);
                err
            }
            kube::Error::Api(resp) => GatewayError::rejected(resp.code, resp.message),
            kube::Error::Auth(e) => GatewayError::auth(e.to_string()),
            kube::Error::SerdeError(e) => GatewayError::decode(e.to_string()),
            kube::Error::FromUtf8(e) => GatewayError::decode(e.to_string()),
            kube::Error::BuildRequest(e) => GatewayError::invalid(e.to_string()),
            kube::Error::HttpError(e) => GatewayError::invalid(e.to_string()),
            other => GatewayError::network(other.to_string()),
        }
    }
}

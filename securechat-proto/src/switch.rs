//! Server feature switch updates (`/update_ssh`, `/update_encryption`).

use serde::{Deserialize, Serialize};

/// Path of the SSH switch endpoint.
pub const UPDATE_SSH_PATH: &str = "/update_ssh";

/// Path of the encryption switch endpoint.
pub const UPDATE_ENCRYPTION_PATH: &str = "/update_encryption";

/// A server-side feature that can be toggled from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureSwitch {
    /// SSH key login.
    Ssh,
    /// Message encryption.
    Encryption,
}

impl FeatureSwitch {
    /// Build the request body that sets this switch to `enabled`.
    #[must_use]
    pub const fn update(self, enabled: bool) -> SwitchUpdate {
        match self {
            Self::Ssh => SwitchUpdate::Ssh {
                ssh_enabled: enabled,
            },
            Self::Encryption => SwitchUpdate::Encryption {
                encryption_enabled: enabled,
            },
        }
    }
}

impl std::fmt::Display for FeatureSwitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ssh => write!(f, "SSH"),
            Self::Encryption => write!(f, "Encryption"),
        }
    }
}

/// Body of a switch update request.
///
/// Serialized untagged, so each variant is exactly the object the server
/// expects, e.g. `{"ssh_enabled": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SwitchUpdate {
    /// Body of `POST /update_ssh`.
    Ssh {
        /// New SSH switch state.
        ssh_enabled: bool,
    },
    /// Body of `POST /update_encryption`.
    Encryption {
        /// New encryption switch state.
        encryption_enabled: bool,
    },
}

impl SwitchUpdate {
    /// The switch this update targets.
    #[must_use]
    pub const fn switch(&self) -> FeatureSwitch {
        match self {
            Self::Ssh { .. } => FeatureSwitch::Ssh,
            Self::Encryption { .. } => FeatureSwitch::Encryption,
        }
    }

    /// The requested state.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        match *self {
            Self::Ssh { ssh_enabled } => ssh_enabled,
            Self::Encryption { encryption_enabled } => encryption_enabled,
        }
    }

    /// Endpoint path this update is posted to.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Ssh { .. } => UPDATE_SSH_PATH,
            Self::Encryption { .. } => UPDATE_ENCRYPTION_PATH,
        }
    }
}

//! Provider-issued tokens passed through the verification flow

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token bound to one outstanding code challenge
///
/// The controller never inspects it, it only hands it back to the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfirmationHandle(String);

impl ConfirmationHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConfirmationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmationHandle(..)")
    }
}

/// Provisional identity the provider creates once a code is confirmed
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Provider-side identifier of the provisional identity
    pub uid: String,
    /// Phone number the provider confirmed, E.164
    pub phone_number: String,
    /// Short-lived token proving the confirmation
    pub id_token: String,
    /// Whether the provider created the identity during this confirmation
    pub is_new_user: bool,
}

impl fmt::Debug for VerifiedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedIdentity")
            .field("uid", &self.uid)
            .field("phone_number", &pv_shared::phone::mask_phone(&self.phone_number))
            .field("is_new_user", &self.is_new_user)
            .finish_non_exhaustive()
    }
}

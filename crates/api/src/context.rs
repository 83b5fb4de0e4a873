use mesa_core::UserId;

/// Authenticated caller of a request.
///
/// Token validation happens at the gateway in front of this service; the
/// identity middleware translates the gateway-verified headers into this
/// context, which must be present for all order routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
    admin: bool,
}

impl CallerContext {
    pub fn new(user_id: UserId, admin: bool) -> Self {
        Self { user_id, admin }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

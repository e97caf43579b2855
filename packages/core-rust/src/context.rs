use std::fmt;

use crate::types::RequestId;

/// Typed user data carried by a [`RequestContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: String,
    pub age: u32,
}

impl UserProfile {
    #[must_use]
    pub fn new(user: impl Into<String>, age: u32) -> Self {
        Self {
            user: user.into(),
            age,
        }
    }
}

impl fmt::Display for UserProfile {
    /// Renders the plain-text greeting body served by the HTTP handlers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the user is {},age is {}", self.user, self.age)
    }
}

/// Per-request context passed explicitly between functions.
///
/// The typed alternative to reading untyped values out of a shared store:
/// every field has a concrete type, so no cast can fail at the reader.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Identity allocated for this request by the server.
    pub request_id: RequestId,
    /// Value of the `X-Request-Id` header, used for log correlation.
    pub trace_id: String,
    pub profile: UserProfile,
}

impl RequestContext {
    #[must_use]
    pub fn new(request_id: RequestId, trace_id: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            request_id,
            trace_id: trace_id.into(),
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_renders_greeting() {
        let profile = UserProfile::new("wuyazi", 21);
        assert_eq!(profile.to_string(), "the user is wuyazi,age is 21");
    }

    #[test]
    fn context_carries_fields() {
        let ctx = RequestContext::new(RequestId(3), "abc", UserProfile::new("wuyazi", 21));
        assert_eq!(ctx.request_id, RequestId(3));
        assert_eq!(ctx.trace_id, "abc");
        assert_eq!(ctx.profile.age, 21);
    }
}

use serde::{Deserialize, Serialize};

/// Identity every backend call is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Path prefix of all per-user endpoints, e.g. `/users/user123`.
    pub fn user_path(&self) -> String {
        format!("/users/{}", self.user_id)
    }
}

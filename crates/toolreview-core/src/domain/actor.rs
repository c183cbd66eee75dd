use uuid::Uuid;

use super::post::Comment;
use super::user::Role;

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Identifier stored in comment authorship and like sets.
    pub fn subject(&self) -> String {
        self.user_id.to_string()
    }

    /// Authors and admins may change a comment.
    pub fn can_modify(&self, comment: &Comment) -> bool {
        self.is_admin() || comment.author == self.subject()
    }
}

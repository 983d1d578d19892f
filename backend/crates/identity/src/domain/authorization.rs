//! Authorization Rules
//!
//! Pure functions over a resolved principal. No I/O.

use kernel::id::AccountId;

use crate::domain::entity::principal::Principal;
use crate::error::{IdentityError, IdentityResult};

pub fn is_admin(principal: &Principal) -> bool {
    principal.role().is_admin()
}

/// Admin, or the owner of the resource.
pub fn has_ownership(principal: &Principal, resource_owner_id: AccountId) -> bool {
    is_admin(principal) || principal.id() == resource_owner_id
}

/// Admin, the comment's author, or the author of the article it belongs to.
pub fn can_delete_comment(
    principal: &Principal,
    comment_author_id: AccountId,
    article_author_id: AccountId,
) -> bool {
    has_ownership(principal, comment_author_id) || principal.id() == article_author_id
}

pub fn require_admin(principal: &Principal) -> IdentityResult<()> {
    if is_admin(principal) {
        Ok(())
    } else {
        Err(IdentityError::Forbidden(
            "Only administrators can access this feature".into(),
        ))
    }
}

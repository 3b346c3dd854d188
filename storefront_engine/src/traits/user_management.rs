use crate::{
    db_types::{NewUser, Role, UserAccount},
    traits::StoreError,
};

#[allow(async_fn_in_trait)]
pub trait UserManagement {
    async fn fetch_user(&self, uid: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Stores the user with the `user` role if the uid is new. Either way, the stored account is returned; an existing
    /// account (and its role) is never modified.
    async fn insert_user_if_absent(&self, user: NewUser) -> Result<UserAccount, StoreError>;

    /// Returns `None` if the uid is unknown.
    async fn update_user_role(&self, uid: &str, role: Role) -> Result<Option<UserAccount>, StoreError>;
}

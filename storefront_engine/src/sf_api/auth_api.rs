use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewUser, Role, UserAccount},
    traits::UserManagement,
    AuthApiError,
};

pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    /// Records a newly signed-in user with the `user` role. Registering an existing user returns the stored account
    /// unchanged, so admins cannot demote themselves by signing in again.
    pub async fn register_user(&self, user: NewUser) -> Result<UserAccount, AuthApiError> {
        if user.uid.trim().is_empty() {
            return Err(AuthApiError::InvalidUser("uid is required".into()));
        }
        let account = self.db.insert_user_if_absent(user).await?;
        debug!("🔐️ User {} is registered with role {}", account.uid, account.role);
        Ok(account)
    }

    pub async fn fetch_user(&self, uid: &str) -> Result<Option<UserAccount>, AuthApiError> {
        let user = self.db.fetch_user(uid).await?;
        Ok(user)
    }

    pub async fn role_for_user(&self, uid: &str) -> Result<Role, AuthApiError> {
        self.db.fetch_user(uid).await?.map(|u| u.role).ok_or_else(|| AuthApiError::UserNotFound(uid.to_string()))
    }

    /// Succeeds if the user holds `required`. Admins hold every role.
    pub async fn check_role(&self, uid: &str, required: Role) -> Result<(), AuthApiError> {
        let role = self.role_for_user(uid).await?;
        match (role, required) {
            (Role::Admin, _) | (Role::User, Role::User) => Ok(()),
            _ => {
                debug!("🔐️ User {uid} has role {role}, but {required} is required");
                Err(AuthApiError::RoleNotAllowed(required))
            },
        }
    }

    pub async fn assign_role(&self, uid: &str, role: Role) -> Result<UserAccount, AuthApiError> {
        let account =
            self.db.update_user_role(uid, role).await?.ok_or_else(|| AuthApiError::UserNotFound(uid.to_string()))?;
        info!("🔐️ User {uid} now has role {role}");
        Ok(account)
    }
}

use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, Role, UserAccount},
    traits::StoreError,
};

const USER_COLUMNS: &str = "uid, email, display_name, photo_url, role, created_at, updated_at";

pub async fn fetch_user(uid: &str, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, StoreError> {
    let user = sqlx::query_as::<_, UserAccount>(&format!("SELECT {USER_COLUMNS} FROM users WHERE uid = $1"))
        .bind(uid)
        .fetch_all(conn)
        .await?
        .into_iter()
        .next();
    Ok(user)
}

/// New users always start with the `user` role. An existing user is returned untouched.
pub async fn insert_user_if_absent(user: NewUser, conn: &mut SqliteConnection) -> Result<UserAccount, StoreError> {
    let now = Utc::now();
    let inserted = sqlx::query_as::<_, UserAccount>(&format!(
        r#"
            INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(uid) DO NOTHING
            RETURNING {USER_COLUMNS};
        "#
    ))
    .bind(&user.uid)
    .bind(&user.email)
    .bind(&user.display_name)
    .bind(user.photo_url.as_deref())
    .bind(Role::User.to_string())
    .bind(now)
    .bind(now)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .next();
    match inserted {
        Some(account) => {
            debug!("🗃️ New user {} saved", account.uid);
            Ok(account)
        },
        None => fetch_user(&user.uid, conn)
            .await?
            .ok_or_else(|| StoreError::DatabaseError(format!("User {} could neither be inserted nor found", user.uid))),
    }
}

pub async fn update_user_role(
    uid: &str,
    role: Role,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, StoreError> {
    let user = sqlx::query_as::<_, UserAccount>(&format!(
        "UPDATE users SET role = $1, updated_at = $2 WHERE uid = $3 RETURNING {USER_COLUMNS}"
    ))
    .bind(role.to_string())
    .bind(Utc::now())
    .bind(uid)
    .fetch_all(conn)
    .await?
    .into_iter()
    .next();
    Ok(user)
}

use sqlx::{PgExecutor, PgPool, Result};

use crate::models::{AccountRow, UserRow};
use crate::repos::accounts::{self, LinkAccountData};

#[derive(Debug, Clone)]
pub struct CreateUserData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

pub struct UserRepo {
    db: PgPool,
}

impl UserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Exact match on the unique email column.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, email_verified, image, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    /// Resolve the user owning a provider account
    pub async fn get_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name, u.email, u.email_verified, u.image, u.created_at, u.updated_at
            FROM users u
            JOIN accounts a ON a.user_id = u.id
            WHERE a.provider = $1 AND a.provider_account_id = $2
            "#,
        )
        .bind(provider)
        .bind(provider_account_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    /// Create a user together with its first provider account.
    /// Uses a transaction so a failed link leaves no orphaned user behind.
    pub async fn create_with_account(
        &self,
        user: CreateUserData,
        account: &LinkAccountData,
    ) -> Result<(UserRow, AccountRow)> {
        let mut tx = self.db.begin().await?;
        let user = create(&mut *tx, &user).await?;
        let account = accounts::link(&mut *tx, user.id, account).await?;
        tx.commit().await?;
        Ok((user, account))
    }
}

/// Insert a new user (used within transactions)
async fn create<'e>(executor: impl PgExecutor<'e>, data: &CreateUserData) -> Result<UserRow> {
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (name, email, image)
        VALUES ($1, $2, $3)
        RETURNING id, name, email, email_verified, image, created_at, updated_at
        "#,
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.image)
    .fetch_one(executor)
    .await
}

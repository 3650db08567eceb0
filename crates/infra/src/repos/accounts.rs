use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::AccountRow;

#[derive(Debug, Clone)]
pub struct LinkAccountData {
    pub kind: String,
    pub provider: String,
    pub provider_account_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

/// Insert a provider account for `user_id` (used within transactions)
pub async fn link<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    data: &LinkAccountData,
) -> Result<AccountRow> {
    sqlx::query_as::<_, AccountRow>(
        r#"
        INSERT INTO accounts (
            user_id, type, provider, provider_account_id,
            access_token, refresh_token, expires_at, token_type, scope
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, user_id, type, provider, provider_account_id,
                  access_token, refresh_token, expires_at, token_type, scope, created_at
        "#,
    )
    .bind(user_id)
    .bind(&data.kind)
    .bind(&data.provider)
    .bind(&data.provider_account_id)
    .bind(&data.access_token)
    .bind(&data.refresh_token)
    .bind(data.expires_at)
    .bind(&data.token_type)
    .bind(&data.scope)
    .fetch_one(executor)
    .await
}

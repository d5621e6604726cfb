use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::{accounts, prelude::*, reset_tokens};
use crate::models::account::AccountStatus;

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_value(&self, token: &str) -> Result<Option<reset_tokens::Model>> {
        ResetTokens::find()
            .filter(reset_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query reset token")
    }

    /// Invalidate every unused token for the account and insert a fresh one,
    /// as a single transaction. At most one unused, unexpired token can exist
    /// per account at any time.
    pub async fn issue(
        &self,
        account_id: i32,
        token: &str,
        expires_at: &str,
        now: &str,
    ) -> Result<()> {
        let txn = self.conn.begin().await?;

        ResetTokens::update_many()
            .col_expr(reset_tokens::Column::Used, Expr::value(true))
            .filter(reset_tokens::Column::AccountId.eq(account_id))
            .filter(reset_tokens::Column::Used.eq(false))
            .exec(&txn)
            .await
            .context("Failed to invalidate prior reset tokens")?;

        let active_model = reset_tokens::ActiveModel {
            account_id: Set(account_id),
            token: Set(token.to_string()),
            expires_at: Set(expires_at.to_string()),
            used: Set(false),
            created_at: Set(now.to_string()),
            ..Default::default()
        };
        active_model
            .insert(&txn)
            .await
            .context("Failed to insert reset token")?;

        txn.commit().await?;
        Ok(())
    }

    /// Consume a token and set the owner's password as one atomic unit.
    ///
    /// Returns `false` when the token is unknown, already used, or past
    /// expiry (a token is valid iff `used = false` and `now < expires_at`).
    /// The used flag is flipped with a compare-and-swap so two concurrent
    /// redemptions of the same token cannot both succeed.
    pub async fn redeem_and_set_password(
        &self,
        token: &str,
        now: &str,
        new_password_hash: String,
    ) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(row) = ResetTokens::find()
            .filter(reset_tokens::Column::Token.eq(token))
            .one(&txn)
            .await
            .context("Failed to query reset token for redemption")?
        else {
            return Ok(false);
        };

        if row.used || row.expires_at.as_str() <= now {
            return Ok(false);
        }

        let consumed = ResetTokens::update_many()
            .col_expr(reset_tokens::Column::Used, Expr::value(true))
            .filter(reset_tokens::Column::Id.eq(row.id))
            .filter(reset_tokens::Column::Used.eq(false))
            .exec(&txn)
            .await
            .context("Failed to consume reset token")?;

        if consumed.rows_affected != 1 {
            return Ok(false);
        }

        let account = Accounts::find_by_id(row.account_id)
            .one(&txn)
            .await
            .context("Failed to query account for token redemption")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {}", row.account_id))?;

        let mut active: accounts::ActiveModel = account.into();
        active.password_hash = Set(new_password_hash);
        active.status = Set(AccountStatus::Normal.as_str().to_string());
        active.updated_at = Set(now.to_string());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}

/// Generate an opaque token value (32 random bytes, hex-encoded, URL-safe)
#[must_use]
pub fn generate_token_value() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

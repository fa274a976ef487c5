//! Account and session persistence

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::domain::entities::Account;
use crate::domain::value_objects::{AccountId, SessionToken};
use crate::infrastructure::persistence::{parse_uuid, SqliteConnection};

type AccountRow = (String, String, String, String, Option<String>, DateTime<Utc>);

pub struct SqliteAccountRepository {
    connection: SqliteConnection,
}

impl SqliteAccountRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    pub async fn create(&self, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts (id, username, first_name, last_name, email, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(account.id.to_string())
        .bind(&account.username)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(account.created_at)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert account")?;
        Ok(())
    }

    pub async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, first_name, last_name, email, created_at \
             FROM accounts WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch account")?;

        row.map(row_to_account).transpose()
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, first_name, last_name, email, created_at \
             FROM accounts WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch account by username")?;

        row.map(row_to_account).transpose()
    }

    pub async fn create_session(&self, token: SessionToken, account_id: AccountId) -> Result<()> {
        sqlx::query("INSERT INTO sessions (token, account_id, created_at) VALUES (?, ?, ?)")
            .bind(token.to_string())
            .bind(account_id.to_string())
            .bind(Utc::now())
            .execute(self.connection.pool())
            .await
            .context("Failed to insert session")?;
        Ok(())
    }

    pub async fn session_account(&self, token: SessionToken) -> Result<Option<AccountId>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT account_id FROM sessions WHERE token = ?")
                .bind(token.to_string())
                .fetch_optional(self.connection.pool())
                .await
                .context("Failed to fetch session")?;

        row.map(|(account_id,)| Ok(AccountId::from(parse_uuid(&account_id)?)))
            .transpose()
    }

    /// Returns true when a session was actually removed
    pub async fn delete_session(&self, token: SessionToken) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to delete session")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_account(row: AccountRow) -> Result<Account> {
    let (id, username, first_name, last_name, email, created_at) = row;
    Ok(Account {
        id: AccountId::from(parse_uuid(&id)?),
        username,
        first_name,
        last_name,
        email,
        created_at,
    })
}

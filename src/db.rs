use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// TRANSACTION MODEL
// ============================================================================

/// Income or expense - no other kinds are permitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl FromStr for TxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(format!("unknown transaction kind: {}", other)),
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded income or expense entry, scoped to a username.
/// Value object: the uuid only exists so the delivery layer can
/// address entries for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub username: String,

    pub description: String,

    pub amount: f64,

    pub kind: TxKind,

    #[serde(default = "default_category", deserialize_with = "deserialize_category")]
    pub category: String,

    /// Stable identity for delete-by-id; generated when absent
    #[serde(default = "default_uuid")]
    pub id: String,

    /// When the entry was recorded; CSV imports may supply a plain date
    #[serde(
        default = "Utc::now",
        rename = "date",
        deserialize_with = "deserialize_date"
    )]
    pub created_at: DateTime<Utc>,
}

// Helper functions for serde defaults
fn default_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_category() -> String {
    "general".to_string()
}

/// Treat an empty CSV column the same as an absent one
fn deserialize_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if raw.trim().is_empty() {
        Ok(default_category())
    } else {
        Ok(raw)
    }
}

/// Accept either a full RFC 3339 timestamp or a bare YYYY-MM-DD date
fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))?;

    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))?;

    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

impl Transaction {
    pub fn new(
        username: &str,
        description: &str,
        amount: f64,
        kind: TxKind,
        category: &str,
    ) -> Self {
        Transaction {
            username: username.to_string(),
            description: description.to_string(),
            amount,
            kind,
            category: if category.is_empty() {
                default_category()
            } else {
                category.to_string()
            },
            id: default_uuid(),
            created_at: Utc::now(),
        }
    }

    /// Compute idempotency hash for duplicate detection on import.
    /// Includes the timestamp, so identical entries recorded at different
    /// times are distinct while re-importing the same CSV row is not.
    pub fn compute_idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}|{}",
            self.username,
            self.created_at.to_rfc3339(),
            self.description,
            self.amount,
            self.kind
        ));
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// DATABASE SETUP
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tx_uuid TEXT UNIQUE NOT NULL,
            idempotency_hash TEXT UNIQUE NOT NULL,
            username TEXT NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            kind TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_username ON transactions(username)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_created_at ON transactions(created_at)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// REPOSITORY OPERATIONS
// ============================================================================

/// Insert one transaction. Returns false when an identical entry
/// (same idempotency hash) is already stored.
pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<bool> {
    let hash = tx.compute_idempotency_hash();

    let result = conn.execute(
        "INSERT INTO transactions (
            tx_uuid, idempotency_hash, username, description, amount, kind, category, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            tx.id,
            hash,
            tx.username,
            tx.description,
            tx.amount,
            tx.kind.as_str(),
            tx.category,
            tx.created_at.to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Insert a batch, skipping duplicates. Returns (inserted, duplicates).
pub fn insert_transactions(
    conn: &Connection,
    transactions: &[Transaction],
) -> Result<(usize, usize)> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for tx in transactions {
        if insert_transaction(conn, tx)? {
            inserted += 1;
        } else {
            duplicates += 1;
        }
    }

    Ok((inserted, duplicates))
}

/// All transactions recorded under a username, newest first.
/// The order is for display only; aggregation ignores it.
pub fn get_transactions_for_user(conn: &Connection, username: &str) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT tx_uuid, username, description, amount, kind, category, created_at
         FROM transactions
         WHERE username = ?1
         ORDER BY created_at DESC, id DESC",
    )?;

    let transactions = stmt
        .query_map(params![username], |row| {
            let kind_str: String = row.get(4)?;
            let created_at_str: String = row.get(6)?;

            Ok(Transaction {
                id: row.get(0)?,
                username: row.get(1)?,
                description: row.get(2)?,
                amount: row.get(3)?,
                kind: TxKind::from_str(&kind_str).map_err(|_| rusqlite::Error::InvalidQuery)?,
                category: row.get(5)?,
                created_at: DateTime::parse_from_rfc3339(&created_at_str)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Delete a user's transaction by uuid. Returns false when nothing matched.
pub fn delete_transaction(conn: &Connection, username: &str, id: &str) -> Result<bool> {
    let affected = conn.execute(
        "DELETE FROM transactions WHERE username = ?1 AND tx_uuid = ?2",
        params![username, id],
    )?;

    Ok(affected > 0)
}

/// Distinct usernames that have at least one transaction
pub fn list_users(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT username FROM transactions ORDER BY username")?;

    let users = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(users)
}

pub fn count_transactions(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// CSV IMPORT
// ============================================================================

/// Load transactions from a CSV file with columns:
/// username,date,description,amount,kind,category
pub fn load_csv(csv_path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

    let mut transactions = Vec::new();

    for result in rdr.deserialize() {
        let transaction: Transaction = result.context("Failed to deserialize transaction")?;
        transactions.push(transaction);
    }

    Ok(transactions)
}

// ============================================================================
// TESTS
// ============================================================================

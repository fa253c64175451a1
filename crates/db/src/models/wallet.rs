//! Credit wallet and wallet journal models.

use serde::Serialize;
use sqlx::FromRow;
use classroll_core::ledger::Balances;
use classroll_core::types::{Credits, DbId, Timestamp};

/// A row from the `credit_wallets` table. Both buckets are never negative.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditWallet {
    pub id: DbId,
    pub student_id: DbId,
    pub online_balance: Credits,
    pub offline_balance: Credits,
    /// Bumped on every balance change.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CreditWallet {
    pub fn balances(&self) -> Balances {
        Balances {
            online: self.online_balance,
            offline: self.offline_balance,
        }
    }
}

/// A row from the `wallet_transactions` journal.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WalletTransaction {
    pub id: DbId,
    pub wallet_id: DbId,
    pub bucket: String,
    pub kind: String,
    pub delta: Credits,
    pub balance_after: Credits,
    pub session_id: Option<DbId>,
    pub reference: Option<String>,
    pub warning: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of opening a wallet for a student.
#[derive(Debug, Clone, Serialize)]
pub struct WalletOpening {
    pub wallet: CreditWallet,
    /// `false` when the wallet already existed and was left untouched.
    pub created: bool,
}

/// Result of applying a settled top-up.
#[derive(Debug, Clone, Serialize)]
pub struct TopUpReceipt {
    pub wallet: CreditWallet,
    /// `true` when the reference was already applied.
    pub duplicate: bool,
}

//! Repository for `credit_wallets` and the `wallet_transactions` journal.

use sqlx::{PgConnection, PgPool};
use classroll_core::batch::BatchMode;
use classroll_core::ledger::{Balances, JournalKind};
use classroll_core::types::{Credits, DbId};

use crate::models::wallet::{CreditWallet, TopUpReceipt, WalletOpening, WalletTransaction};

pub(crate) const COLUMNS: &str =
    "id, student_id, online_balance, offline_balance, version, created_at, updated_at";

const TRANSACTION_COLUMNS: &str = "id, wallet_id, bucket, kind, delta, balance_after, session_id, \
                                   reference, warning, created_at, updated_at";

/// Wallet column holding the balance of `bucket`.
pub(crate) fn balance_column(bucket: BatchMode) -> &'static str {
    match bucket {
        BatchMode::Online => "online_balance",
        BatchMode::Offline => "offline_balance",
    }
}

/// One journal line, written in the same transaction as the balance change.
pub(crate) struct JournalEntry<'a> {
    pub wallet_id: DbId,
    pub bucket: BatchMode,
    pub kind: JournalKind,
    pub delta: Credits,
    pub balance_after: Credits,
    pub session_id: Option<DbId>,
    pub reference: Option<&'a str>,
    pub warning: Option<&'a str>,
}

pub(crate) async fn append_journal(
    conn: &mut PgConnection,
    entry: &JournalEntry<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO wallet_transactions
            (wallet_id, bucket, kind, delta, balance_after, session_id, reference, warning)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(entry.wallet_id)
    .bind(entry.bucket.as_str())
    .bind(entry.kind.as_str())
    .bind(entry.delta)
    .bind(entry.balance_after)
    .bind(entry.session_id)
    .bind(entry.reference)
    .bind(entry.warning)
    .execute(conn)
    .await?;
    Ok(())
}

/// Provides wallet lifecycle and balance operations.
pub struct WalletRepo;

impl WalletRepo {
    pub async fn find_by_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Option<CreditWallet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM credit_wallets WHERE student_id = $1");
        sqlx::query_as::<_, CreditWallet>(&query)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// Open a wallet with the given starting balances.
    ///
    /// An existing wallet is returned unchanged, so a redelivered onboarding
    /// fact never credits twice.
    pub async fn open(
        pool: &PgPool,
        student_id: DbId,
        initial: Balances,
    ) -> Result<WalletOpening, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO credit_wallets (student_id, online_balance, offline_balance)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_credit_wallets_student DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, CreditWallet>(&query)
            .bind(student_id)
            .bind(initial.online)
            .bind(initial.offline)
            .fetch_optional(&mut *tx)
            .await?;

        let opening = match inserted {
            Some(wallet) => {
                for bucket in BatchMode::ALL {
                    let amount = initial.get(bucket);
                    if amount == 0 {
                        continue;
                    }
                    let entry = JournalEntry {
                        wallet_id: wallet.id,
                        bucket,
                        kind: JournalKind::OnboardingCredit,
                        delta: amount,
                        balance_after: amount,
                        session_id: None,
                        reference: None,
                        warning: None,
                    };
                    append_journal(&mut *tx, &entry).await?;
                }
                WalletOpening {
                    wallet,
                    created: true,
                }
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM credit_wallets WHERE student_id = $1");
                let wallet = sqlx::query_as::<_, CreditWallet>(&query)
                    .bind(student_id)
                    .fetch_one(&mut *tx)
                    .await?;
                WalletOpening {
                    wallet,
                    created: false,
                }
            }
        };

        tx.commit().await?;
        Ok(opening)
    }

    /// Add a settled top-up to one bucket, opening an empty wallet first if
    /// the student has none.
    ///
    /// A `reference` that was already applied leaves the wallet untouched
    /// and reports `duplicate`.
    pub async fn top_up(
        pool: &PgPool,
        student_id: DbId,
        bucket: BatchMode,
        amount: Credits,
        reference: Option<&str>,
    ) -> Result<TopUpReceipt, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO credit_wallets (student_id) VALUES ($1)
             ON CONFLICT ON CONSTRAINT uq_credit_wallets_student DO NOTHING",
        )
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

        // Lock first so concurrent deliveries of one reference serialize here.
        let query = format!("SELECT {COLUMNS} FROM credit_wallets WHERE student_id = $1 FOR UPDATE");
        let wallet = sqlx::query_as::<_, CreditWallet>(&query)
            .bind(student_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(reference) = reference {
            let seen: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM wallet_transactions WHERE reference = $1)",
            )
            .bind(reference)
            .fetch_one(&mut *tx)
            .await?;
            if seen {
                tx.commit().await?;
                return Ok(TopUpReceipt {
                    wallet,
                    duplicate: true,
                });
            }
        }

        let column = balance_column(bucket);
        let query = format!(
            "UPDATE credit_wallets SET {column} = {column} + $2, version = version + 1
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let wallet = sqlx::query_as::<_, CreditWallet>(&query)
            .bind(wallet.id)
            .bind(amount)
            .fetch_one(&mut *tx)
            .await?;

        let entry = JournalEntry {
            wallet_id: wallet.id,
            bucket,
            kind: JournalKind::TopUp,
            delta: amount,
            balance_after: wallet.balances().get(bucket),
            session_id: None,
            reference,
            warning: None,
        };
        append_journal(&mut *tx, &entry).await?;

        tx.commit().await?;
        Ok(TopUpReceipt {
            wallet,
            duplicate: false,
        })
    }

    /// Most recent journal lines of a wallet, newest first.
    pub async fn list_transactions(
        pool: &PgPool,
        wallet_id: DbId,
        limit: i64,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM wallet_transactions
             WHERE wallet_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(wallet_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

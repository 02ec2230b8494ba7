//! SQLite-based storage implementation

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use phoneswap_core::{
    ListingId, ListingStatus, NotificationKind, OfferId, OfferStatus, PaymentId, PaymentStatus,
    Role, StaffMarker, UserId,
};

use super::{
    AuthStatusPatch, AuthStatusRecord, CounterStore, Listing, OfferChange, PaymentProof,
    PurchaseOffer, StoreResult, TokenRecord, TradeStore, User, UserStore, ARBITER_SLOTS,
};
use crate::error::ApiError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-based store implementing all marketplace store traits
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn internal(e: impl ToString) -> ApiError {
    ApiError::Internal(e.to_string())
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, ApiError> {
        let conn = Connection::open(path).map_err(internal)?;

        // Enable foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(internal)?;

        // Run migrations
        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), ApiError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(internal)?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, ApiError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(internal)?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(internal)
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), ApiError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Users
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Capability and verification flags, one row per user
            CREATE TABLE IF NOT EXISTS auth_status (
                user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                is_seller INTEGER NOT NULL DEFAULT 0,
                is_arbiter INTEGER NOT NULL DEFAULT 0,
                is_staff_admin INTEGER NOT NULL DEFAULT 0,
                staff_marker TEXT,
                verified_email INTEGER NOT NULL DEFAULT 0,
                verified_phone INTEGER NOT NULL DEFAULT 0,
                verified_user_id INTEGER NOT NULL DEFAULT 0,
                user_status INTEGER NOT NULL DEFAULT 0
            );

            -- Role-hash fragments written at credential issuance
            CREATE TABLE IF NOT EXISTS token_records (
                user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                buyer_hash TEXT,
                seller_hash TEXT,
                arbiter_hash TEXT,
                staff_hash TEXT,
                admin_hash TEXT
            );

            -- Phone listings
            CREATE TABLE IF NOT EXISTS phones (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id_fk INTEGER NOT NULL REFERENCES users(id),
                title TEXT NOT NULL,
                price_cents INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_phones_user ON phones(user_id_fk);

            -- Purchase offers; version backs the conditional status writes
            CREATE TABLE IF NOT EXISTS purchase_offers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                phone_id_fk INTEGER NOT NULL REFERENCES phones(id) ON DELETE CASCADE,
                buyer_user_id_fk INTEGER NOT NULL REFERENCES users(id),
                arbiter1_user_id_fk INTEGER,
                arbiter2_user_id_fk INTEGER,
                arbiter3_user_id_fk INTEGER,
                arbiter4_user_id_fk INTEGER,
                arbiter5_user_id_fk INTEGER,
                arbiter6_user_id_fk INTEGER,
                status TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_offers_buyer ON purchase_offers(buyer_user_id_fk);
            CREATE INDEX IF NOT EXISTS idx_offers_listing ON purchase_offers(phone_id_fk);

            -- Payment proofs
            CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                purchase_offer_id_fk INTEGER NOT NULL REFERENCES purchase_offers(id) ON DELETE CASCADE,
                buyer_user_id_fk INTEGER NOT NULL,
                amount_cents INTEGER NOT NULL,
                photo_urls TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_payments_offer ON payments(purchase_offer_id_fk);

            -- Per-user unread notification counters
            CREATE TABLE IF NOT EXISTS notification_counters (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                kind TEXT NOT NULL,
                count INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, kind)
            );
            "#,
        )
        .map_err(internal)?;

        Ok(())
    }
}

fn row_to_offer(row: &Row<'_>) -> rusqlite::Result<PurchaseOffer> {
    let id: i64 = row.get(0)?;
    let listing_id: i64 = row.get(1)?;
    let buyer_id: i64 = row.get(2)?;

    let mut arbiters = [None; ARBITER_SLOTS];
    for (slot, arbiter) in arbiters.iter_mut().enumerate() {
        let value: Option<i64> = row.get(3 + slot)?;
        *arbiter = value.map(|v| UserId(v as u64));
    }

    let status: String = row.get(9)?;
    let version: i64 = row.get(10)?;
    let created_at: String = row.get(11)?;

    Ok(PurchaseOffer {
        id: OfferId(id as u64),
        listing_id: ListingId(listing_id as u64),
        buyer_id: UserId(buyer_id as u64),
        arbiters,
        status: OfferStatus::parse(&status).unwrap_or(OfferStatus::Pending),
        version: version as u64,
        created_at: parse_ts(&created_at),
    })
}

const OFFER_COLUMNS: &str = "id, phone_id_fk, buyer_user_id_fk, \
    arbiter1_user_id_fk, arbiter2_user_id_fk, arbiter3_user_id_fk, \
    arbiter4_user_id_fk, arbiter5_user_id_fk, arbiter6_user_id_fk, \
    status, version, created_at";

impl UserStore for SqliteStore {
    fn create_user(
        &self,
        name: &str,
        password_hash: &str,
        staff_marker: Option<StaffMarker>,
    ) -> StoreResult<UserId> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(internal)?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO users (name, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![name, password_hash, now],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation {
                    return ApiError::Validation(format!("Name already taken: {}", name));
                }
            }
            internal(e)
        })?;

        let id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO auth_status (user_id, is_staff_admin, staff_marker) VALUES (?1, ?2, ?3)",
            params![id, staff_marker.is_some() as i32, staff_marker.map(|m| m.as_str())],
        )
        .map_err(internal)?;

        tx.execute("INSERT INTO token_records (user_id) VALUES (?1)", params![id])
            .map_err(internal)?;

        tx.commit().map_err(internal)?;
        Ok(UserId(id as u64))
    }

    fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, name, password_hash, created_at FROM users WHERE id = ?1",
            params![user_id.0 as i64],
            |row| {
                let id: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let password_hash: String = row.get(2)?;
                let created_at: String = row.get(3)?;
                Ok(User {
                    id: UserId(id as u64),
                    name,
                    password_hash,
                    created_at: parse_ts(&created_at),
                })
            },
        )
        .optional()
        .map_err(internal)
    }

    fn get_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();

        let user_id: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(internal)?;

        drop(conn); // Release lock before calling get_user

        match user_id {
            Some(id) => self.get_user(UserId(id as u64)),
            None => Ok(None),
        }
    }

    fn get_auth_status(&self, user_id: UserId) -> StoreResult<Option<AuthStatusRecord>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT user_id, is_seller, is_arbiter, is_staff_admin, staff_marker,
                    verified_email, verified_phone, verified_user_id, user_status
             FROM auth_status WHERE user_id = ?1",
            params![user_id.0 as i64],
            |row| {
                let uid: i64 = row.get(0)?;
                let staff_marker: Option<String> = row.get(4)?;
                Ok(AuthStatusRecord {
                    user_id: UserId(uid as u64),
                    is_seller: row.get::<_, i32>(1)? != 0,
                    is_arbiter: row.get::<_, i32>(2)? != 0,
                    is_staff_admin: row.get::<_, i32>(3)? != 0,
                    staff_marker: staff_marker.as_deref().and_then(StaffMarker::parse),
                    verified_email: row.get::<_, i32>(5)? != 0,
                    verified_phone: row.get::<_, i32>(6)? != 0,
                    verified_user_id: row.get::<_, i32>(7)? != 0,
                    user_status: row.get::<_, i64>(8)? as u8,
                })
            },
        )
        .optional()
        .map_err(internal)
    }

    fn update_auth_status(
        &self,
        user_id: UserId,
        patch: &AuthStatusPatch,
    ) -> StoreResult<AuthStatusRecord> {
        let mut record = self
            .get_auth_status(user_id)?
            .ok_or(ApiError::UserNotFound)?;
        patch.apply(&mut record);

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE auth_status SET is_seller = ?1, is_arbiter = ?2, is_staff_admin = ?3,
                    verified_email = ?4, verified_phone = ?5, verified_user_id = ?6,
                    user_status = ?7
             WHERE user_id = ?8",
            params![
                record.is_seller as i32,
                record.is_arbiter as i32,
                record.is_staff_admin as i32,
                record.verified_email as i32,
                record.verified_phone as i32,
                record.verified_user_id as i32,
                record.user_status as i64,
                user_id.0 as i64,
            ],
        )
        .map_err(internal)?;

        Ok(record)
    }

    fn get_token_record(&self, user_id: UserId) -> StoreResult<Option<TokenRecord>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT user_id, buyer_hash, seller_hash, arbiter_hash, staff_hash, admin_hash
             FROM token_records WHERE user_id = ?1",
            params![user_id.0 as i64],
            |row| {
                let uid: i64 = row.get(0)?;
                let mut record = TokenRecord::new(UserId(uid as u64));
                record.fragments.buyer = row.get(1)?;
                record.fragments.seller = row.get(2)?;
                record.fragments.arbiter = row.get(3)?;
                record.fragments.staff = row.get(4)?;
                record.fragments.admin = row.get(5)?;
                Ok(record)
            },
        )
        .optional()
        .map_err(internal)
    }

    fn set_role_fragment(&self, user_id: UserId, role: Role, fragment: &str) -> StoreResult<()> {
        let column = match role {
            Role::Buyer => "buyer_hash",
            Role::Seller => "seller_hash",
            Role::Arbiter => "arbiter_hash",
            Role::Staff => "staff_hash",
            Role::Admin => "admin_hash",
        };

        let conn = self.conn.lock().unwrap();
        let rows = conn
            .execute(
                &format!("UPDATE token_records SET {} = ?1 WHERE user_id = ?2", column),
                params![fragment, user_id.0 as i64],
            )
            .map_err(internal)?;

        if rows == 0 {
            return Err(ApiError::UserNotFound);
        }
        Ok(())
    }
}

impl TradeStore for SqliteStore {
    fn create_listing(
        &self,
        seller: UserId,
        title: &str,
        price_cents: i64,
    ) -> StoreResult<ListingId> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO phones (user_id_fk, title, price_cents, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                seller.0 as i64,
                title,
                price_cents,
                ListingStatus::Available.as_str(),
                now
            ],
        )
        .map_err(internal)?;

        Ok(ListingId(conn.last_insert_rowid() as u64))
    }

    fn get_listing(&self, listing_id: ListingId) -> StoreResult<Option<Listing>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, user_id_fk, title, price_cents, status, created_at
             FROM phones WHERE id = ?1",
            params![listing_id.0 as i64],
            |row| {
                let id: i64 = row.get(0)?;
                let seller: i64 = row.get(1)?;
                let title: String = row.get(2)?;
                let price_cents: i64 = row.get(3)?;
                let status: String = row.get(4)?;
                let created_at: String = row.get(5)?;
                Ok(Listing {
                    id: ListingId(id as u64),
                    seller_id: UserId(seller as u64),
                    title,
                    price_cents,
                    status: ListingStatus::parse(&status).unwrap_or(ListingStatus::Inactive),
                    created_at: parse_ts(&created_at),
                })
            },
        )
        .optional()
        .map_err(internal)
    }

    fn set_listing_status(&self, listing_id: ListingId, status: ListingStatus) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute(
                "UPDATE phones SET status = ?1 WHERE id = ?2",
                params![status.as_str(), listing_id.0 as i64],
            )
            .map_err(internal)?;

        if rows == 0 {
            return Err(ApiError::ListingNotFound);
        }
        Ok(())
    }

    fn create_offer(
        &self,
        listing_id: ListingId,
        buyer: UserId,
        candidates: &[UserId],
    ) -> StoreResult<OfferId> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        let mut slots: [Option<i64>; ARBITER_SLOTS] = [None; ARBITER_SLOTS];
        for (slot, candidate) in slots.iter_mut().zip(candidates.iter()) {
            *slot = Some(candidate.0 as i64);
        }

        conn.execute(
            "INSERT INTO purchase_offers
                (phone_id_fk, buyer_user_id_fk,
                 arbiter1_user_id_fk, arbiter2_user_id_fk, arbiter3_user_id_fk,
                 arbiter4_user_id_fk, arbiter5_user_id_fk, arbiter6_user_id_fk,
                 status, version, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10)",
            params![
                listing_id.0 as i64,
                buyer.0 as i64,
                slots[0],
                slots[1],
                slots[2],
                slots[3],
                slots[4],
                slots[5],
                OfferStatus::Pending.as_str(),
                now,
            ],
        )
        .map_err(internal)?;

        Ok(OfferId(conn.last_insert_rowid() as u64))
    }

    fn get_offer(&self, offer_id: OfferId) -> StoreResult<Option<PurchaseOffer>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            &format!("SELECT {} FROM purchase_offers WHERE id = ?1", OFFER_COLUMNS),
            params![offer_id.0 as i64],
            row_to_offer,
        )
        .optional()
        .map_err(internal)
    }

    fn update_offer(
        &self,
        offer_id: OfferId,
        expected_version: u64,
        change: &OfferChange,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = if let Some(arbiters) = change.arbiters {
            let slots: Vec<Option<i64>> = arbiters
                .iter()
                .map(|a| a.map(|id| id.0 as i64))
                .collect();
            conn.execute(
                "UPDATE purchase_offers
                 SET status = ?1, version = version + 1,
                     arbiter1_user_id_fk = ?2, arbiter2_user_id_fk = ?3,
                     arbiter3_user_id_fk = ?4, arbiter4_user_id_fk = ?5,
                     arbiter5_user_id_fk = ?6, arbiter6_user_id_fk = ?7
                 WHERE id = ?8 AND version = ?9",
                params![
                    change.status.as_str(),
                    slots[0],
                    slots[1],
                    slots[2],
                    slots[3],
                    slots[4],
                    slots[5],
                    offer_id.0 as i64,
                    expected_version as i64,
                ],
            )
            .map_err(internal)?
        } else {
            conn.execute(
                "UPDATE purchase_offers SET status = ?1, version = version + 1
                 WHERE id = ?2 AND version = ?3",
                params![
                    change.status.as_str(),
                    offer_id.0 as i64,
                    expected_version as i64
                ],
            )
            .map_err(internal)?
        };

        Ok(rows == 1)
    }

    fn delete_offer(&self, offer_id: OfferId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "DELETE FROM purchase_offers WHERE id = ?1",
            params![offer_id.0 as i64],
        )
        .map_err(internal)?;

        Ok(())
    }

    fn list_offers_for_user(
        &self,
        user_id: UserId,
        status: Option<OfferStatus>,
        page: u64,
        per_page: u64,
    ) -> StoreResult<(Vec<PurchaseOffer>, u64)> {
        let conn = self.conn.lock().unwrap();
        let status_str = status.map(|s| s.as_str());
        let offset = (page.max(1) - 1) * per_page;

        let total: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM purchase_offers o
                 JOIN phones l ON l.id = o.phone_id_fk
                 WHERE (o.buyer_user_id_fk = ?1 OR l.user_id_fk = ?1)
                   AND (?2 IS NULL OR o.status = ?2)",
                params![user_id.0 as i64, status_str],
                |row| row.get(0),
            )
            .map_err(internal)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM purchase_offers o
                 JOIN phones l ON l.id = o.phone_id_fk
                 WHERE (o.buyer_user_id_fk = ?1 OR l.user_id_fk = ?1)
                   AND (?2 IS NULL OR o.status = ?2)
                 ORDER BY o.id DESC
                 LIMIT ?3 OFFSET ?4",
                OFFER_COLUMNS
                    .split(", ")
                    .map(|c| format!("o.{}", c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
            .map_err(internal)?;

        let offers = stmt
            .query_map(
                params![
                    user_id.0 as i64,
                    status_str,
                    per_page as i64,
                    offset as i64
                ],
                row_to_offer,
            )
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;

        Ok((offers, total as u64))
    }

    fn create_payment(
        &self,
        offer_id: OfferId,
        buyer: UserId,
        amount_cents: i64,
        photo_urls: &[String],
    ) -> StoreResult<PaymentId> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let urls = serde_json::to_string(photo_urls).map_err(internal)?;

        conn.execute(
            "INSERT INTO payments
                (purchase_offer_id_fk, buyer_user_id_fk, amount_cents, photo_urls, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                offer_id.0 as i64,
                buyer.0 as i64,
                amount_cents,
                urls,
                PaymentStatus::ProofSubmitted.as_str(),
                now,
            ],
        )
        .map_err(internal)?;

        Ok(PaymentId(conn.last_insert_rowid() as u64))
    }

    fn get_payment_for_offer(&self, offer_id: OfferId) -> StoreResult<Option<PaymentProof>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, purchase_offer_id_fk, buyer_user_id_fk, amount_cents, photo_urls,
                    status, created_at
             FROM payments WHERE purchase_offer_id_fk = ?1
             ORDER BY id DESC LIMIT 1",
            params![offer_id.0 as i64],
            |row| {
                let id: i64 = row.get(0)?;
                let offer: i64 = row.get(1)?;
                let buyer: i64 = row.get(2)?;
                let amount_cents: i64 = row.get(3)?;
                let urls: String = row.get(4)?;
                let status: String = row.get(5)?;
                let created_at: String = row.get(6)?;
                Ok(PaymentProof {
                    id: PaymentId(id as u64),
                    offer_id: OfferId(offer as u64),
                    buyer_id: UserId(buyer as u64),
                    amount_cents,
                    photo_urls: serde_json::from_str(&urls).unwrap_or_default(),
                    status: PaymentStatus::parse(&status).unwrap_or(PaymentStatus::ProofSubmitted),
                    created_at: parse_ts(&created_at),
                })
            },
        )
        .optional()
        .map_err(internal)
    }

    fn set_payment_status(&self, payment_id: PaymentId, status: PaymentStatus) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute(
                "UPDATE payments SET status = ?1 WHERE id = ?2",
                params![status.as_str(), payment_id.0 as i64],
            )
            .map_err(internal)?;

        if rows == 0 {
            return Err(ApiError::PaymentNotFound);
        }
        Ok(())
    }
}

impl CounterStore for SqliteStore {
    fn increment_counter(&self, user_id: UserId, kind: NotificationKind) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO notification_counters (user_id, kind, count) VALUES (?1, ?2, 1)
             ON CONFLICT(user_id, kind) DO UPDATE SET count = count + 1",
            params![user_id.0 as i64, kind.as_str()],
        )
        .map_err(internal)?;

        Ok(())
    }

    fn counters_for(&self, user_id: UserId) -> StoreResult<Vec<(NotificationKind, u64)>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT kind, count FROM notification_counters WHERE user_id = ?1")
            .map_err(internal)?;

        let stored: Vec<(String, i64)> = stmt
            .query_map(params![user_id.0 as i64], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;

        Ok(NotificationKind::ALL
            .iter()
            .map(|kind| {
                let count = stored
                    .iter()
                    .find(|(k, _)| k == kind.as_str())
                    .map(|(_, n)| *n as u64)
                    .unwrap_or(0);
                (*kind, count)
            })
            .collect())
    }

    fn reset_counter(&self, user_id: UserId, kind: NotificationKind) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO notification_counters (user_id, kind, count) VALUES (?1, ?2, 0)
             ON CONFLICT(user_id, kind) DO UPDATE SET count = 0",
            params![user_id.0 as i64, kind.as_str()],
        )
        .map_err(internal)?;

        Ok(())
    }
}

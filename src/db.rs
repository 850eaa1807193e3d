use crate::recipient::{is_valid_email, Recipient, RecipientError, RecipientSource};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signup {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Signup {
    /// `"Name" <email>`, or just the address when no name was given
    pub fn recipient(&self) -> Result<Recipient, RecipientError> {
        Recipient::with_name(&self.name, &self.email)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriberStats {
    pub signup_count: u32,
    pub listener_count: u32,
}

/// Newsletter signups and "tell me when it's in season" listeners
pub struct SubscriberDB {
    conn: Connection,
}

impl SubscriberDB {
    /// Create a new in-memory database
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory database")?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open (or create) a database file
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .context(format!("Failed to open database at {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS newsletter_signups (
                email TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS in_season_listeners (
                email TEXT NOT NULL,
                sku TEXT NOT NULL,
                PRIMARY KEY (email, sku)
            );

            CREATE INDEX IF NOT EXISTS idx_listeners_sku ON in_season_listeners(sku);
            "#,
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Record a newsletter signup. Re-signing up updates the name and keeps
    /// the original signup time.
    pub fn add_signup(&self, name: &str, email: &str) -> Result<Signup> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(RecipientError::InvalidEmail(email.to_string()).into());
        }

        let name = name.trim();
        // Refuse anything that could not be listed back as a recipient
        Recipient::with_name(name, email)?;

        self.conn
            .execute(
                "INSERT INTO newsletter_signups (email, name, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(email) DO UPDATE SET name = excluded.name",
                params![email, name, Utc::now().to_rfc3339()],
            )
            .context(format!("Failed to insert signup: {}", email))?;

        self.get_signup(email)?
            .with_context(|| format!("Signup vanished after insert: {}", email))
    }

    pub fn get_signup(&self, email: &str) -> Result<Option<Signup>> {
        let mut stmt = self
            .conn
            .prepare("SELECT email, name, created_at FROM newsletter_signups WHERE email = ?1")
            .context("Failed to prepare statement")?;

        let mut rows = stmt
            .query(params![email.trim()])
            .context("Failed to query signup")?;

        if let Some(row) = rows.next().context("Failed to get next row")? {
            let email: String = row.get(0)?;
            let name: String = row.get(1)?;
            let created_at: String = row.get(2)?;
            Ok(Some(parse_signup(email, name, &created_at)?))
        } else {
            Ok(None)
        }
    }

    /// Returns whether a row was removed
    pub fn remove_signup(&self, email: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM newsletter_signups WHERE email = ?1",
                params![email.trim()],
            )
            .context(format!("Failed to remove signup: {}", email))?;
        Ok(removed > 0)
    }

    /// All signups, in signup order
    pub fn list_signups(&self) -> Result<Vec<Signup>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT email, name, created_at FROM newsletter_signups ORDER BY rowid",
            )
            .context("Failed to prepare statement")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("Failed to query signups")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect signups")?;

        rows.into_iter()
            .map(|(email, name, created_at)| parse_signup(email, name, &created_at))
            .collect()
    }

    /// Ask to be mailed when a vacation package comes into season.
    /// Registering twice is a no-op.
    pub fn add_in_season_listener(&self, email: &str, sku: &str) -> Result<()> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(RecipientError::InvalidEmail(email.to_string()).into());
        }

        self.conn
            .execute(
                "INSERT INTO in_season_listeners (email, sku) VALUES (?1, ?2)
                 ON CONFLICT DO NOTHING",
                params![email, sku],
            )
            .context(format!("Failed to add listener {} for {}", email, sku))?;
        Ok(())
    }

    pub fn listeners_for(&self, sku: &str) -> Result<Vec<Recipient>> {
        let mut stmt = self
            .conn
            .prepare("SELECT email FROM in_season_listeners WHERE sku = ?1 ORDER BY rowid")
            .context("Failed to prepare statement")?;

        let emails = stmt
            .query_map(params![sku], |row| row.get::<_, String>(0))
            .context("Failed to query listeners")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect listeners")?;

        emails
            .iter()
            .map(|email| Recipient::parse(email).map_err(anyhow::Error::from))
            .collect()
    }

    pub fn get_stats(&self) -> Result<SubscriberStats> {
        let signup_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM newsletter_signups", [], |row| row.get(0))
            .context("Failed to count signups")?;

        let listener_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM in_season_listeners", [], |row| row.get(0))
            .context("Failed to count listeners")?;

        Ok(SubscriberStats {
            signup_count,
            listener_count,
        })
    }

    /// Listeners for one SKU, as a dispatchable source
    pub fn in_season(&self, sku: impl Into<String>) -> InSeasonListeners<'_> {
        InSeasonListeners {
            db: self,
            sku: sku.into(),
        }
    }
}

fn parse_signup(email: String, name: String, created_at: &str) -> Result<Signup> {
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .context(format!("Bad timestamp for signup {}", email))?
        .with_timezone(&Utc);
    Ok(Signup {
        email,
        name,
        created_at,
    })
}

impl RecipientSource for SubscriberDB {
    fn list(&self) -> Result<Vec<Recipient>> {
        self.list_signups()?
            .iter()
            .map(|signup| signup.recipient().map_err(anyhow::Error::from))
            .collect()
    }
}

pub struct InSeasonListeners<'a> {
    db: &'a SubscriberDB,
    sku: String,
}

impl RecipientSource for InSeasonListeners<'_> {
    fn list(&self) -> Result<Vec<Recipient>> {
        self.db.listeners_for(&self.sku)
    }
}

//! User profile repository.
//!
//! Profiles are keyed by email. Password accounts additionally own a row in
//! `shop.user_password`; Google accounts never do.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mrshopy_core::order::Address;
use mrshopy_core::settings::UserProfile;
use mrshopy_core::{Email, UserId};

use super::{RepositoryError, conflict_on_unique};

const PROFILE_COLUMNS: &str = "id, email, display_name, photo_url, ship_full_name, \
     ship_house_name, ship_city, ship_state, ship_local_area, phone, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: UserId,
    email: String,
    display_name: String,
    photo_url: Option<String>,
    ship_full_name: Option<String>,
    ship_house_name: Option<String>,
    ship_city: Option<String>,
    ship_state: Option<String>,
    ship_local_area: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        // A remembered address is only complete once a checkout has written it.
        let shipping_address = row.ship_full_name.map(|full_name| Address {
            full_name,
            house_name: row.ship_house_name.unwrap_or_default(),
            city: row.ship_city.unwrap_or_default(),
            state: row.ship_state.unwrap_or_default(),
            local_area: row.ship_local_area.unwrap_or_default(),
        });

        Ok(Self {
            id: row.id,
            email,
            display_name: row.display_name,
            photo_url: row.photo_url,
            shipping_address,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for profile and credential database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<UserProfile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM shop.user_profile WHERE email = $1");
        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?
            .map(UserProfile::try_from)
            .transpose()
    }

    /// Create or refresh the profile for a federated sign-in.
    ///
    /// An existing profile keeps its address and phone; name and photo are
    /// refreshed from the identity provider.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_login(
        &self,
        email: &Email,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<UserProfile, RepositoryError> {
        let sql = format!(
            "INSERT INTO shop.user_profile (id, email, display_name, photo_url)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email) DO UPDATE
             SET display_name = EXCLUDED.display_name,
                 photo_url = COALESCE(EXCLUDED.photo_url, shop.user_profile.photo_url),
                 updated_at = NOW()
             RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(UserId::new_random())
            .bind(email.as_str())
            .bind(display_name)
            .bind(photo_url)
            .fetch_one(self.pool)
            .await?
            .try_into()
    }

    /// Touch `updated_at` on sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE shop.user_profile SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Create a profile with a password in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        display_name: &str,
        password_hash: &str,
    ) -> Result<UserProfile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO shop.user_profile (id, email, display_name)
             VALUES ($1, $2, $3)
             RETURNING {PROFILE_COLUMNS}"
        );
        let profile: UserProfile = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(UserId::new_random())
            .bind(email.as_str())
            .bind(display_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "email"))?
            .try_into()?;

        sqlx::query("INSERT INTO shop.user_password (user_id, password_hash) VALUES ($1, $2)")
            .bind(profile.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(profile)
    }

    /// Profile and password hash for an email/password sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(UserProfile, String)>, RepositoryError> {
        let Some(profile) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM shop.user_password WHERE user_id = $1")
                .bind(profile.id)
                .fetch_optional(self.pool)
                .await?;

        Ok(hash.map(|hash| (profile, hash)))
    }

    /// Remember the address and phone from the latest checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn save_checkout_details(
        &self,
        id: UserId,
        address: &Address,
        phone: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.user_profile
             SET ship_full_name = $2, ship_house_name = $3, ship_city = $4,
                 ship_state = $5, ship_local_area = $6, phone = $7, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&address.full_name)
        .bind(&address.house_name)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.local_area)
        .bind(phone)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

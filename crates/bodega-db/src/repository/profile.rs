//! # Profile Repository
//!
//! Database operations for user profiles.
//!
//! Profiles mirror the external auth provider's users: the id is the
//! provider's user id, and the row carries only what the POS needs
//! (role, display name, avatar). Deleting a profile never touches the
//! provider account or the user's historical transactions.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use bodega_core::{Profile, UserRole};

use crate::error::{DbError, DbResult};

/// Repository for profile database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProfileRepository::new(pool);
///
/// let everyone = repo.list().await?;
/// repo.update_role("user-id", UserRole::Admin, Utc::now()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Lists all profiles, newest first.
    pub async fn list(&self) -> DbResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, role, full_name, avatar_url, created_at, updated_at \
             FROM profiles \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Gets a profile by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Profile))` - Profile found
    /// * `Ok(None)` - Profile not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, role, full_name, avatar_url, created_at, updated_at \
             FROM profiles \
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Inserts a profile row (provisioning a newly-seen identity).
    pub async fn insert(&self, profile: &Profile) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO profiles \
                 (id, role, full_name, avatar_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&profile.id)
        .bind(profile.role)
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(profile_id = %profile.id, "Inserted profile");
        Ok(())
    }

    /// Changes a profile's role.
    pub async fn update_role(
        &self,
        id: &str,
        role: UserRole,
        updated_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE profiles SET role = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(role)
                .bind(updated_at)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Profile", id));
        }

        debug!(profile_id = %id, ?role, "Updated profile role");
        Ok(())
    }

    /// Updates a profile's display fields.
    pub async fn update_profile(
        &self,
        id: &str,
        full_name: &str,
        avatar_url: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE profiles \
             SET full_name = ?2, avatar_url = ?3, updated_at = ?4 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(full_name)
        .bind(avatar_url)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Profile", id));
        }
        Ok(())
    }

    /// Deletes a profile row.
    ///
    /// Historical transactions keep their user_id (not a foreign key); the
    /// recent-sales join simply yields no cashier name afterwards.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Profile", id));
        }

        debug!(profile_id = %id, "Deleted profile");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn profile(id: &str, role: UserRole, full_name: &str) -> Profile {
        let now = Utc::now();
        Profile {
            id: id.to_string(),
            role,
            full_name: full_name.to_string(),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let db = test_db().await;
        let repo = db.profiles();

        let p = profile("auth-1", UserRole::Admin, "Don Ramón");
        repo.insert(&p).await.unwrap();

        let fetched = repo.get_by_id("auth-1").await.unwrap().unwrap();
        assert_eq!(fetched.full_name, "Don Ramón");
        assert_eq!(fetched.role, UserRole::Admin);
        assert!(fetched.is_admin());

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_role() {
        let db = test_db().await;
        let repo = db.profiles();

        repo.insert(&profile("auth-1", UserRole::Cashier, "Ana"))
            .await
            .unwrap();
        repo.update_role("auth-1", UserRole::Admin, Utc::now())
            .await
            .unwrap();

        let fetched = repo.get_by_id("auth-1").await.unwrap().unwrap();
        assert_eq!(fetched.role, UserRole::Admin);

        let err = repo
            .update_role("missing", UserRole::Admin, Utc::now())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_profile_fields() {
        let db = test_db().await;
        let repo = db.profiles();

        repo.insert(&profile("auth-1", UserRole::Cashier, "Ana"))
            .await
            .unwrap();
        repo.update_profile(
            "auth-1",
            "Ana López",
            Some("https://img.example/ana.jpg"),
            Utc::now(),
        )
        .await
        .unwrap();

        let fetched = repo.get_by_id("auth-1").await.unwrap().unwrap();
        assert_eq!(fetched.full_name, "Ana López");
        assert_eq!(
            fetched.avatar_url.as_deref(),
            Some("https://img.example/ana.jpg")
        );
    }

    #[tokio::test]
    async fn test_delete_profile() {
        let db = test_db().await;
        let repo = db.profiles();

        repo.insert(&profile("auth-1", UserRole::Cashier, "Ana"))
            .await
            .unwrap();
        repo.delete("auth-1").await.unwrap();

        assert!(repo.get_by_id("auth-1").await.unwrap().is_none());
        assert!(repo.delete("auth-1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = test_db().await;
        let repo = db.profiles();

        let mut older = profile("auth-1", UserRole::Cashier, "First");
        older.created_at = Utc::now() - chrono::Duration::days(1);
        let newer = profile("auth-2", UserRole::Cashier, "Second");
        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "auth-2");
        assert_eq!(listed[1].id, "auth-1");
    }
}

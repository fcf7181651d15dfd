//! # User Administration
//!
//! Profile management for the admin screen. Role changes and deletions are
//! admin-only and guarded against lockout: an admin can neither demote nor
//! delete themselves, so the store always keeps at least one admin.
//!
//! Deleting a user removes the profile row only. The external auth account
//! and the user's historical transactions stay (transactions reference the
//! user by id without a store-level constraint).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use bodega_core::validation::validate_full_name;
use bodega_core::{Money, Profile, UserRole};
use bodega_db::Database;

use crate::error::{ServiceError, ServiceResult};
use crate::identity::Identity;

// ============================================================================
// Input / output types
// ============================================================================

/// Editable profile fields. `None` leaves the current value in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Sales activity for one cashier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// All transactions recorded by the user, any status.
    pub transaction_count: i64,
    /// Sum of completed transaction totals.
    pub total_sales: Money,
}

// ============================================================================
// Service
// ============================================================================

/// Profile reads and admin writes.
#[derive(Clone)]
pub struct UserService {
    db: Database,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        UserService { db }
    }

    /// All profiles, newest first.
    pub async fn list_users(&self) -> ServiceResult<Vec<Profile>> {
        Ok(self.db.profiles().list().await?)
    }

    /// One profile.
    pub async fn get_user(&self, id: &str) -> ServiceResult<Profile> {
        self.db
            .profiles()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", id))
    }

    /// Changes a user's role. Admin only.
    ///
    /// An admin cannot remove their own admin role; someone else has to.
    pub async fn update_role(
        &self,
        identity: Option<&Identity>,
        user_id: &str,
        role: UserRole,
    ) -> ServiceResult<()> {
        let identity = identity.ok_or(ServiceError::Unauthenticated)?;
        self.require_admin(identity).await?;

        if user_id == identity.id && role != UserRole::Admin {
            return Err(ServiceError::NotAuthorized(
                "You cannot remove your own admin role".to_string(),
            ));
        }

        self.db
            .profiles()
            .update_role(user_id, role, Utc::now())
            .await?;

        info!(
            user_id = %user_id,
            role = ?role,
            changed_by = %identity.id,
            "User role changed"
        );
        Ok(())
    }

    /// Updates a profile's display fields.
    pub async fn update_profile(
        &self,
        identity: Option<&Identity>,
        user_id: &str,
        changes: ProfileChanges,
    ) -> ServiceResult<Profile> {
        identity.ok_or(ServiceError::Unauthenticated)?;

        let profiles = self.db.profiles();
        let existing = profiles
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", user_id))?;

        let full_name = match changes.full_name {
            Some(name) => {
                validate_full_name(&name)?;
                name.trim().to_string()
            }
            None => existing.full_name,
        };
        let avatar_url = changes.avatar_url.or(existing.avatar_url);

        profiles
            .update_profile(user_id, &full_name, avatar_url.as_deref(), Utc::now())
            .await?;

        self.get_user(user_id).await
    }

    /// Deletes a user's profile. Admin only, never one's own.
    pub async fn delete_user(
        &self,
        identity: Option<&Identity>,
        user_id: &str,
    ) -> ServiceResult<()> {
        let identity = identity.ok_or(ServiceError::Unauthenticated)?;

        if user_id == identity.id {
            return Err(ServiceError::NotAuthorized(
                "You cannot delete your own account".to_string(),
            ));
        }

        self.require_admin(identity).await?;

        self.db.profiles().delete(user_id).await?;

        info!(
            user_id = %user_id,
            deleted_by = %identity.id,
            "User profile deleted"
        );
        Ok(())
    }

    /// Transaction count and completed-sales total for one user.
    pub async fn user_stats(&self, user_id: &str) -> ServiceResult<UserStats> {
        let totals = self.db.transactions().totals_for_user(user_id).await?;

        Ok(UserStats {
            transaction_count: totals.transactions,
            total_sales: Money::from_cents(totals.sales_cents),
        })
    }

    /// Resolves the caller's profile and asserts the admin role.
    async fn require_admin(&self, identity: &Identity) -> ServiceResult<Profile> {
        let profile = self
            .db
            .profiles()
            .get_by_id(&identity.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", identity.id.clone()))?;

        if !profile.is_admin() {
            return Err(ServiceError::NotAuthorized(
                "Only admins can manage users".to_string(),
            ));
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::{PaymentMethod, Transaction, TransactionStatus};
    use bodega_db::DbConfig;
    use uuid::Uuid;

    fn profile(id: &str, role: UserRole) -> Profile {
        let now = Utc::now();
        Profile {
            id: id.to_string(),
            role,
            full_name: "Test User".to_string(),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transaction(user_id: &str, total_cents: i64, status: TransactionStatus) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            subtotal_cents: total_cents,
            tax_cents: 0,
            discount_cents: 0,
            total_cents,
            payment_method: PaymentMethod::Cash,
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_service() -> (Database, UserService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = UserService::new(db.clone());

        db.profiles()
            .insert(&profile("admin-1", UserRole::Admin))
            .await
            .unwrap();
        db.profiles()
            .insert(&profile("cashier-1", UserRole::Cashier))
            .await
            .unwrap();

        (db, service)
    }

    #[tokio::test]
    async fn test_role_change_requires_admin() {
        let (_db, service) = test_service().await;

        let err = service
            .update_role(None, "cashier-1", UserRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated));

        let cashier = Identity::new("cashier-1");
        let err = service
            .update_role(Some(&cashier), "cashier-1", UserRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotAuthorized(_)));

        let admin = Identity::new("admin-1");
        service
            .update_role(Some(&admin), "cashier-1", UserRole::Admin)
            .await
            .unwrap();
        let promoted = service.get_user("cashier-1").await.unwrap();
        assert_eq!(promoted.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_self_demotion_rejected() {
        let (_db, service) = test_service().await;

        let admin = Identity::new("admin-1");
        let err = service
            .update_role(Some(&admin), "admin-1", UserRole::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotAuthorized(_)));

        // Confirming one's own admin role is a no-op, not a demotion
        service
            .update_role(Some(&admin), "admin-1", UserRole::Admin)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_self_deletion_rejected() {
        let (_db, service) = test_service().await;

        let admin = Identity::new("admin-1");
        let err = service
            .delete_user(Some(&admin), "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotAuthorized(_)));

        service.delete_user(Some(&admin), "cashier-1").await.unwrap();
        let err = service.get_user("cashier-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_profile_validates_name() {
        let (_db, service) = test_service().await;
        let admin = Identity::new("admin-1");

        let err = service
            .update_profile(
                Some(&admin),
                "cashier-1",
                ProfileChanges {
                    full_name: Some("   ".to_string()),
                    avatar_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let updated = service
            .update_profile(
                Some(&admin),
                "cashier-1",
                ProfileChanges {
                    full_name: Some("Ana López".to_string()),
                    avatar_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Ana López");
    }

    #[tokio::test]
    async fn test_user_stats_counts_all_sums_completed() {
        let (db, service) = test_service().await;

        let txs = db.transactions();
        txs.insert(&transaction("cashier-1", 1_000, TransactionStatus::Completed))
            .await
            .unwrap();
        txs.insert(&transaction("cashier-1", 2_000, TransactionStatus::Completed))
            .await
            .unwrap();
        txs.insert(&transaction("cashier-1", 5_000, TransactionStatus::Cancelled))
            .await
            .unwrap();

        let stats = service.user_stats("cashier-1").await.unwrap();
        assert_eq!(stats.transaction_count, 3);
        assert_eq!(stats.total_sales, Money::from_cents(3_000));

        let empty = service.user_stats("nobody").await.unwrap();
        assert_eq!(empty.transaction_count, 0);
        assert_eq!(empty.total_sales, Money::zero());
    }
}

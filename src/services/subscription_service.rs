// src/services/subscription_service.rs

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{audit_repo::AuditEntry, AuditRepository, StoreRepository, SubscriptionRepository},
    models::{
        auth::User,
        ledger::RequestStatus,
        store::{Store, SubscriptionStatus},
        subscription::{
            PlanPayload, SubscriptionInfo, SubscriptionPlan, SubscriptionRequest,
            SubscriptionRequestPayload,
        },
    },
};

// ---
// Regras puras
// ---

/// A loja pode vender enquanto não estiver EXPIRED e a validade estiver no futuro.
pub fn is_usable(
    status: SubscriptionStatus,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    status != SubscriptionStatus::Expired && expires_at > now
}

/// A renovação soma a duração ao que ainda resta (ou a partir de agora, se já venceu).
pub fn extended_expiry(
    current: DateTime<Utc>,
    now: DateTime<Utc>,
    duration_days: i32,
) -> DateTime<Utc> {
    current.max(now) + chrono::Duration::days(i64::from(duration_days))
}

/// `None` no plano = ilimitado.
pub fn limit_reached(limit: Option<i32>, current: i64) -> bool {
    limit.is_some_and(|max| current >= i64::from(max))
}

#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repo: SubscriptionRepository,
    store_repo: StoreRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl SubscriptionService {
    pub fn new(
        subscription_repo: SubscriptionRepository,
        store_repo: StoreRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { subscription_repo, store_repo, audit_repo, pool }
    }

    pub async fn list_active_plans(&self) -> Result<Vec<SubscriptionPlan>, AppError> {
        self.subscription_repo.list_plans(true).await
    }

    pub async fn list_all_plans(&self) -> Result<Vec<SubscriptionPlan>, AppError> {
        self.subscription_repo.list_plans(false).await
    }

    /// Barra vendas e pedidos de lojas sem assinatura válida.
    /// Uma loja vencida é marcada EXPIRED aqui, fora da transação de quem chamou.
    pub async fn ensure_usable(&self, store: &Store) -> Result<(), AppError> {
        if is_usable(store.subscription_status, store.subscription_expires_at, Utc::now()) {
            return Ok(());
        }

        if store.subscription_status != SubscriptionStatus::Expired {
            self.store_repo
                .set_subscription(
                    &self.pool,
                    store.id,
                    None,
                    SubscriptionStatus::Expired,
                    store.subscription_expires_at,
                )
                .await?;
            tracing::info!("⌛ Assinatura da loja {} expirou", store.id);
        }

        Err(AppError::SubscriptionInactive)
    }

    pub async fn current(&self, store: &Store) -> Result<SubscriptionInfo, AppError> {
        let plan = match store.subscription_plan_id {
            Some(plan_id) => self.subscription_repo.find_plan(&self.pool, plan_id).await?,
            None => None,
        };
        let pending_request = self
            .subscription_repo
            .find_pending_for_store(&self.pool, store.id)
            .await?;

        Ok(SubscriptionInfo {
            store_id: store.id,
            status: store.subscription_status,
            expires_at: store.subscription_expires_at,
            is_usable: is_usable(
                store.subscription_status,
                store.subscription_expires_at,
                Utc::now(),
            ),
            plan,
            pending_request,
        })
    }

    pub async fn request(
        &self,
        user: &User,
        store_id: Uuid,
        payload: &SubscriptionRequestPayload,
    ) -> Result<SubscriptionRequest, AppError> {
        let plan = self
            .subscription_repo
            .find_plan(&self.pool, payload.plan_id)
            .await?
            .ok_or(AppError::PlanNotFound)?;

        if !plan.is_active {
            return Err(AppError::PlanInactive);
        }

        let mut tx = self.pool.begin().await?;

        if self
            .subscription_repo
            .find_pending_for_store(&mut *tx, store_id)
            .await?
            .is_some()
        {
            return Err(AppError::PendingRequestExists);
        }

        // O índice único parcial cobre a corrida entre duas solicitações simultâneas
        let request = self
            .subscription_repo
            .create_request(
                &mut *tx,
                store_id,
                plan.id,
                payload.payment_reference.as_deref(),
                payload.notes.as_deref(),
                user.id,
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "subscription.request",
                    entity: "subscription_request",
                    entity_id: Some(request.id),
                    details: json!({ "planId": plan.id, "planName": plan.name }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    pub async fn list_store_requests(
        &self,
        store_id: Uuid,
    ) -> Result<Vec<SubscriptionRequest>, AppError> {
        self.subscription_repo.list_requests_for_store(store_id).await
    }

    // ---
    // Administração da plataforma
    // ---

    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<SubscriptionRequest>, AppError> {
        self.subscription_repo.list_requests(status).await
    }

    pub async fn create_plan(&self, payload: &PlanPayload) -> Result<SubscriptionPlan, AppError> {
        self.subscription_repo.create_plan(&self.pool, payload).await
    }

    pub async fn update_plan(
        &self,
        plan_id: Uuid,
        payload: &PlanPayload,
    ) -> Result<SubscriptionPlan, AppError> {
        self.subscription_repo.update_plan(&self.pool, plan_id, payload).await
    }

    pub async fn delete_plan(&self, plan_id: Uuid) -> Result<(), AppError> {
        if !self.subscription_repo.soft_delete_plan(&self.pool, plan_id).await? {
            return Err(AppError::PlanNotFound);
        }
        Ok(())
    }

    pub async fn approve(&self, admin: &User, request_id: Uuid) -> Result<Store, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.subscription_repo.lock_request(&mut *tx, request_id).await?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::RequestAlreadyProcessed);
        }

        let plan = self
            .subscription_repo
            .find_plan(&mut *tx, request.plan_id)
            .await?
            .ok_or(AppError::PlanNotFound)?;

        let store = self.store_repo.lock(&mut *tx, request.store_id).await?;
        let expires_at = extended_expiry(
            store.subscription_expires_at,
            Utc::now(),
            plan.duration_days,
        );

        let store = self
            .store_repo
            .set_subscription(
                &mut *tx,
                store.id,
                Some(plan.id),
                SubscriptionStatus::Active,
                expires_at,
            )
            .await?;

        self.subscription_repo
            .review_request(&mut *tx, request.id, RequestStatus::Approved, admin.id, None)
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store.id),
                    user_id: Some(admin.id),
                    action: "subscription.approve",
                    entity: "subscription_request",
                    entity_id: Some(request.id),
                    details: json!({ "planId": plan.id, "expiresAt": expires_at }),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!("✅ Assinatura da loja {} renovada até {}", store.id, expires_at);
        Ok(store)
    }

    pub async fn reject(
        &self,
        admin: &User,
        request_id: Uuid,
        reason: &str,
    ) -> Result<SubscriptionRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.subscription_repo.lock_request(&mut *tx, request_id).await?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::RequestAlreadyProcessed);
        }

        let request = self
            .subscription_repo
            .review_request(&mut *tx, request.id, RequestStatus::Rejected, admin.id, Some(reason))
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(request.store_id),
                    user_id: Some(admin.id),
                    action: "subscription.reject",
                    entity: "subscription_request",
                    entity_id: Some(request.id),
                    details: json!({ "reason": reason }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn usable_until_expiry_unless_marked_expired() {
        let now = at(10);
        assert!(is_usable(SubscriptionStatus::Trial, at(11), now));
        assert!(is_usable(SubscriptionStatus::Active, at(11), now));
        assert!(!is_usable(SubscriptionStatus::Active, at(10), now));
        assert!(!is_usable(SubscriptionStatus::Expired, at(20), now));
    }

    #[test]
    fn renewal_stacks_on_remaining_time() {
        let now = at(10);
        assert_eq!(extended_expiry(at(15), now, 30), at(15) + Duration::days(30));
    }

    #[test]
    fn renewal_of_lapsed_store_starts_now() {
        let now = at(10);
        assert_eq!(extended_expiry(at(1), now, 30), now + Duration::days(30));
    }

    #[test]
    fn plan_limits() {
        assert!(!limit_reached(None, 10_000));
        assert!(!limit_reached(Some(3), 2));
        assert!(limit_reached(Some(3), 3));
        assert!(limit_reached(Some(0), 0));
    }
}

// src/services/audit_service.rs

use uuid::Uuid;

use crate::{common::error::AppError, db::AuditRepository, models::audit::AuditLog};

// Só leitura: as entradas são gravadas pelos outros serviços, dentro das transações deles
#[derive(Clone)]
pub struct AuditService {
    audit_repo: AuditRepository,
}

impl AuditService {
    pub fn new(audit_repo: AuditRepository) -> Self {
        Self { audit_repo }
    }

    pub async fn list_for_store(
        &self,
        store_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<AuditLog>, AppError> {
        self.audit_repo.list(Some(store_id), limit).await
    }
}

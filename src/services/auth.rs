// src/services/auth.rs

use std::time::Duration;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, retry::retry_fixed},
    db::{audit_repo::AuditEntry, AuditRepository, StoreRepository, UserRepository},
    models::{
        auth::{Claims, LoginPayload, RegisterMerchantPayload, TokenKind, User, UserRole},
        store::Store,
    },
};

pub const TRIAL_DAYS: i64 = 14;
const TOKEN_TTL_DAYS: i64 = 7;

const REGISTER_ATTEMPTS: u32 = 3;
const REGISTER_RETRY_DELAY: Duration = Duration::from_millis(500);

// ---
// Senhas e tokens (compartilhados com o portal e o RH)
// ---

/// bcrypt é lento de propósito: roda fora do runtime async.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

pub fn issue_token(secret: &str, sub: Uuid, kind: TokenKind) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub,
        kind,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Decodifica e confere o tipo do token (funcionário x cliente).
pub fn decode_token(secret: &str, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    if token_data.claims.kind != expected {
        return Err(AppError::InvalidToken);
    }
    Ok(token_data.claims)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    store_repo: StoreRepository,
    audit_repo: AuditRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        store_repo: StoreRepository,
        audit_repo: AuditRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, store_repo, audit_repo, jwt_secret, pool }
    }

    /// Cria o lojista e a primeira loja (em teste por 14 dias) e devolve o token.
    pub async fn register_merchant(
        &self,
        payload: &RegisterMerchantPayload,
    ) -> Result<String, AppError> {
        // 1. Hashing fica fora da transação, não toca no banco
        let hashed_password = hash_password(&payload.password).await?;

        // 2. A transação inteira é repetida em falhas transitórias do banco
        let hashed = hashed_password.as_str();
        let (user, store) = retry_fixed(REGISTER_ATTEMPTS, REGISTER_RETRY_DELAY, move || {
            self.create_merchant_with_store(payload, hashed)
        })
        .await?;

        tracing::info!("🏪 Lojista {} registrado com a loja {}", user.id, store.id);

        issue_token(&self.jwt_secret, user.id, TokenKind::User)
    }

    async fn create_merchant_with_store(
        &self,
        payload: &RegisterMerchantPayload,
        password_hash: &str,
    ) -> Result<(User, Store), AppError> {
        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                payload.email.trim(),
                password_hash,
                &payload.full_name,
                UserRole::Merchant,
                None,
            )
            .await?; // Se falhar aqui, o tx sofre rollback automático ao sair do escopo (drop)

        let store = self
            .store_repo
            .create_store(
                &mut *tx,
                user.id,
                &payload.store_name,
                payload.phone.as_deref(),
                None,
                Utc::now() + chrono::Duration::days(TRIAL_DAYS),
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store.id),
                    user_id: Some(user.id),
                    action: "merchant.register",
                    entity: "store",
                    entity_id: Some(store.id),
                    details: json!({ "email": user.email, "storeName": store.name }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok((user, store))
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(payload.email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        if !verify_password(&payload.password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        issue_token(&self.jwt_secret, user.id, TokenKind::User)
    }

    /// Token de funcionário -> usuário vivo e ativo.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token, TokenKind::User)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    pub async fn my_stores(&self, user: &User) -> Result<Vec<Store>, AppError> {
        match user.role {
            UserRole::PlatformAdmin => self.store_repo.list_all().await,
            UserRole::Merchant => self.store_repo.list_for_owner(user.id).await,
            UserRole::Cashier => {
                let Some(store_id) = user.store_id else {
                    return Ok(vec![]);
                };
                Ok(self.store_repo.find_by_id(store_id).await?.into_iter().collect())
            }
        }
    }

    /// Cria o administrador da plataforma na primeira subida, se configurado.
    pub async fn ensure_platform_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.exists_platform_admin().await? {
            return Ok(());
        }

        let hashed = hash_password(password).await?;
        let admin = self
            .user_repo
            .create_user(
                &self.pool,
                email,
                &hashed,
                "Platform Admin",
                UserRole::PlatformAdmin,
                None,
            )
            .await?;

        tracing::info!("🔑 Administrador da plataforma criado: {}", admin.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn token_round_trip_keeps_subject_and_kind() {
        let id = Uuid::new_v4();
        let token = issue_token(SECRET, id, TokenKind::Customer).unwrap();

        let claims = decode_token(SECRET, &token, TokenKind::Customer).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.kind, TokenKind::Customer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn customer_token_is_not_a_user_token() {
        let token = issue_token(SECRET, Uuid::new_v4(), TokenKind::Customer).unwrap();
        assert!(matches!(
            decode_token(SECRET, &token, TokenKind::User),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4(), TokenKind::User).unwrap();
        assert!(matches!(
            decode_token("outro-segredo", &token, TokenKind::User),
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("s3nha-forte").await.unwrap();
        assert!(verify_password("s3nha-forte", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}

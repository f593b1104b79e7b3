// src/common/retry.rs

use std::future::Future;
use std::time::Duration;

use crate::common::error::AppError;

/// Falhas que valem uma nova tentativa: conexão caiu, pool esgotado,
/// conflito de serialização ou deadlock. Violação de unicidade nunca entra aqui.
pub fn is_transient(err: &AppError) -> bool {
    match err {
        AppError::DatabaseError(sqlx::Error::PoolTimedOut)
        | AppError::DatabaseError(sqlx::Error::Io(_)) => true,
        AppError::DatabaseError(sqlx::Error::Database(db_err)) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}

/// Executa `op` até `attempts` vezes, esperando `delay` fixo entre as tentativas.
pub async fn retry_fixed<T, F, Fut>(
    attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && is_transient(&e) => {
                tracing::warn!(
                    "Tentativa {}/{} falhou ({}), repetindo em {:?}",
                    attempt,
                    attempts,
                    e,
                    delay,
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);

        let result = retry_fixed(3, Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_fixed(3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn business_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_fixed(3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::EmailAlreadyExists) }
        })
        .await;

        assert!(matches!(result, Err(AppError::EmailAlreadyExists)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

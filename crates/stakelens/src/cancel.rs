//! Cancellation guard for network calls.

use core::future::Future;

use tokio_util::sync::CancellationToken;

use crate::ReadError;

/// Run `call` unless `cancel` fires first.
///
/// The token is checked before the call starts and raced against it while it
/// is in flight; a cancelled call is dropped, never awaited to completion.
pub(crate) async fn guarded<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = T>,
) -> Result<T, ReadError> {
    if cancel.is_cancelled() {
        return Err(ReadError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReadError::Cancelled),
        out = call => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_passes_through() {
        let cancel = CancellationToken::new();
        assert_eq!(guarded(&cancel, async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = guarded(&cancel, async { 7 }).await.unwrap_err();
        assert!(matches!(err, ReadError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_in_flight() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let slow = async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            7
        };
        let err = guarded(&cancel, slow).await.unwrap_err();
        assert!(matches!(err, ReadError::Cancelled));
    }
}

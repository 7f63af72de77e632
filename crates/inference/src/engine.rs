//! Shared, lazily built extraction engine.

use std::sync::Arc;
use std::time::Instant;

use contracts::{ContractError, EngineFactory};
use tokio::sync::OnceCell;
use tracing::{info, instrument};

/// Init-once handle around an engine factory.
///
/// The first `get` builds the engine; concurrent callers wait on that same
/// build. A failed build is not cached, so the next caller retries.
pub struct EngineHandle<F: EngineFactory> {
    factory: F,
    engine: OnceCell<F::Engine>,
}

impl<F: EngineFactory> EngineHandle<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            engine: OnceCell::new(),
        }
    }

    /// Convenience for the usual shared ownership.
    pub fn shared(factory: F) -> Arc<Self> {
        Arc::new(Self::new(factory))
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.initialized()
    }

    /// Borrow the engine, building it on first use.
    #[instrument(name = "engine_handle_get", skip(self))]
    pub async fn get(&self) -> Result<&F::Engine, ContractError> {
        self.engine
            .get_or_try_init(|| async {
                let started = Instant::now();
                let engine = self.factory.build().await?;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                observability::record_engine_initialized(elapsed_ms);
                info!(elapsed_ms, "extraction engine initialised");
                Ok(engine)
            })
            .await
    }
}

impl<F: EngineFactory> std::fmt::Debug for EngineHandle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingFactory {
        builds: AtomicUsize,
        fail_first: bool,
    }

    impl EngineFactory for CountingFactory {
        type Engine = usize;

        async fn build(&self) -> Result<usize, ContractError> {
            let n = self.builds.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.fail_first && n == 0 {
                return Err(ContractError::extraction("engine unavailable"));
            }
            Ok(n)
        }
    }

    #[tokio::test]
    async fn test_concurrent_get_builds_once() {
        let handle = EngineHandle::new(CountingFactory {
            builds: AtomicUsize::new(0),
            fail_first: false,
        });
        assert!(!handle.is_initialized());

        let (a, b, c) = tokio::join!(handle.get(), handle.get(), handle.get());
        assert_eq!((*a.unwrap(), *b.unwrap(), *c.unwrap()), (0, 0, 0));
        assert_eq!(handle.factory.builds.load(Ordering::SeqCst), 1);
        assert!(handle.is_initialized());

        handle.get().await.unwrap();
        assert_eq!(handle.factory.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_build_is_retried() {
        let handle = EngineHandle::new(CountingFactory {
            builds: AtomicUsize::new(0),
            fail_first: true,
        });
        let err = handle.get().await.unwrap_err();
        assert_eq!(err.kind(), "extraction_failure");
        assert!(!handle.is_initialized());

        assert_eq!(*handle.get().await.unwrap(), 1);
    }
}

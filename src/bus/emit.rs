//! Emission strategies.
//!
//! Each strategy works on a listener snapshot already sorted by priority,
//! so registrations made by a listener mid-emission only show up in later
//! emissions.

use crate::bus::listener::{Listener, ListenerError, Reply};
use crate::core::{Error, Payload, Result};
use futures::future::try_join_all;

fn failure(event: &str, listener: &Listener, source: ListenerError) -> Error {
    tracing::warn!(event, listener = listener.id, error = %source, "listener failed");
    Error::ListenerFailure {
        event: event.to_string(),
        listener: listener.id,
        source,
    }
}

fn deferred(event: &str, listener: &Listener) -> Error {
    tracing::warn!(event, listener = listener.id, "deferred reply in synchronous emit");
    Error::DeferredReply {
        event: event.to_string(),
        listener: listener.id,
    }
}

/// Chain listeners, awaiting deferred replies between steps.
pub(crate) async fn sequential(event: String, listeners: Vec<Listener>, data: Payload) -> Result<Payload> {
    let mut acc = data;
    for listener in &listeners {
        acc = match listener.call(acc).map_err(|e| failure(&event, listener, e))? {
            Reply::Ready(value) => value,
            Reply::Deferred(future) => future.await.map_err(|e| failure(&event, listener, e))?,
        };
    }
    Ok(acc)
}

/// Chain listeners without suspending.
pub(crate) fn sequential_sync(event: &str, listeners: &[Listener], data: Payload) -> Result<Payload> {
    let mut acc = data;
    for listener in listeners {
        acc = match listener.call(acc).map_err(|e| failure(event, listener, e))? {
            Reply::Ready(value) => value,
            Reply::Deferred(_) => return Err(deferred(event, listener)),
        };
    }
    Ok(acc)
}

/// Run every listener concurrently on the same input.
///
/// Results come back in listener order; the first failure to complete
/// fails the whole emission.
pub(crate) async fn parallel(event: String, listeners: Vec<Listener>, data: Payload) -> Result<Vec<Payload>> {
    let event = event.as_str();
    let tasks = listeners.iter().map(|listener| {
        let data = data.clone();
        async move {
            let reply = listener.call(data).map_err(|e| failure(event, listener, e))?;
            reply.into_future().await.map_err(|e| failure(event, listener, e))
        }
    });
    try_join_all(tasks).await
}

/// Run every listener eagerly, left to right, on the same input.
pub(crate) fn parallel_sync(event: &str, listeners: &[Listener], data: &Payload) -> Result<Vec<Payload>> {
    listeners
        .iter()
        .map(|listener| match listener.call(data.clone()).map_err(|e| failure(event, listener, e))? {
            Reply::Ready(value) => Ok(value),
            Reply::Deferred(_) => Err(deferred(event, listener)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::listener::{Callback, ListenerRegistry};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn add(n: i64) -> Callback {
        Arc::new(move |d| Ok(Reply::Ready(json!(d.as_i64().unwrap_or(0) + n))))
    }

    fn mul(n: i64) -> Callback {
        Arc::new(move |d| Ok(Reply::Ready(json!(d.as_i64().unwrap_or(0) * n))))
    }

    fn registry() -> Arc<ListenerRegistry> {
        let registry = Arc::new(ListenerRegistry::default());
        registry.register("x", 0, mul(2));
        registry.register("x", 1, add(1));
        registry
    }

    #[test]
    fn test_sequential_sync_chains() {
        let listeners = registry().query("x", true);
        let result = sequential_sync("x", &listeners, json!(3)).unwrap();
        assert_eq!(result, json!(8));
    }

    #[test]
    fn test_parallel_sync_shares_input() {
        let listeners = registry().query("x", true);
        let results = parallel_sync("x", &listeners, &json!(3)).unwrap();
        assert_eq!(results, vec![json!(4), json!(6)]);
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(sequential_sync("x", &[], json!("in")).unwrap(), json!("in"));
        assert!(parallel_sync("x", &[], &json!("in")).unwrap().is_empty());
    }

    #[test]
    fn test_sync_rejects_deferred() {
        let registry = Arc::new(ListenerRegistry::default());
        let id = registry
            .register("x", 0, Arc::new(|d| Ok(Reply::deferred(async move { Ok(d) }))))
            .id();
        let listeners = registry.query("x", true);

        match sequential_sync("x", &listeners, json!(1)) {
            Err(Error::DeferredReply { listener, .. }) => assert_eq!(listener, id),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            parallel_sync("x", &listeners, &json!(1)),
            Err(Error::DeferredReply { .. })
        ));
    }

    #[test]
    fn test_parallel_sync_stops_at_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(ListenerRegistry::default());
        registry.register("x", 2, add(1));
        registry.register("x", 1, Arc::new(|_| Err(ListenerError::new("boom"))));
        let counter = calls.clone();
        registry.register(
            "x",
            0,
            Arc::new(move |d| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Reply::Ready(d))
            }),
        );

        let err = parallel_sync("x", &registry.query("x", true), &json!(0)).unwrap_err();
        assert!(err.is_listener_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sequential_awaits_deferred() {
        let registry = Arc::new(ListenerRegistry::default());
        registry.register(
            "x",
            1,
            Arc::new(|d| {
                Ok(Reply::deferred(async move {
                    tokio::task::yield_now().await;
                    Ok(json!(d.as_i64().unwrap_or(0) + 1))
                }))
            }),
        );
        registry.register("x", 0, mul(2));

        let result = sequential("x".into(), registry.query("x", true), json!(3)).await.unwrap();
        assert_eq!(result, json!(8));
    }

    #[tokio::test]
    async fn test_parallel_orders_by_listener() {
        let registry = Arc::new(ListenerRegistry::default());
        registry.register(
            "x",
            1,
            Arc::new(|d| {
                Ok(Reply::deferred(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    Ok(json!(["slow", d]))
                }))
            }),
        );
        registry.register("x", 0, Arc::new(|d| Ok(Reply::Ready(json!(["fast", d])))));

        let results = parallel("x".into(), registry.query("x", true), json!(1)).await.unwrap();
        assert_eq!(results, vec![json!(["slow", 1]), json!(["fast", 1])]);
    }

    #[tokio::test]
    async fn test_parallel_immediate_error_fails_aggregate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(ListenerRegistry::default());
        registry.register("x", 1, Arc::new(|_| Err(ListenerError::new("thrown"))));
        let counter = calls.clone();
        registry.register(
            "x",
            0,
            Arc::new(move |d| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Reply::Ready(d))
            }),
        );

        let err = parallel("x".into(), registry.query("x", true), json!(1)).await.unwrap_err();
        match err {
            Error::ListenerFailure { source, .. } => assert_eq!(source.message, "thrown"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_parallel_rejection_fails_aggregate() {
        let registry = Arc::new(ListenerRegistry::default());
        registry.register("x", 0, add(1));
        registry.register(
            "x",
            0,
            Arc::new(|_| Ok(Reply::deferred(async { Err(ListenerError::new("rejected")) }))),
        );

        let err = parallel("x".into(), registry.query("x", true), json!(1)).await.unwrap_err();
        match err {
            Error::ListenerFailure { source, .. } => assert_eq!(source.message, "rejected"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}

//! Releasing a proxy's module.

use std::sync::Arc;
use std::time::Duration;

use component_scripts::{
    ComponentScriptProxy, EntryUnitResolver, Error, FormatterRegistry, ImportState, UnitIdentity,
};

use crate::fixture::{Counter, FakeRuntime, Journal, APP_UNIT};

fn proxy(runtime: FakeRuntime) -> (ComponentScriptProxy<Counter>, Arc<Journal>) {
    let journal = Arc::clone(&runtime.journal);
    let proxy = ComponentScriptProxy::new(
        Arc::new(runtime),
        Arc::new(FormatterRegistry::new()),
        Arc::new(EntryUnitResolver::new(UnitIdentity::new(APP_UNIT.0, APP_UNIT.1))),
    );
    (proxy, journal)
}

#[tokio::test]
async fn test_dispose_before_any_invocation() {
    let (proxy, journal) = proxy(FakeRuntime::new());

    proxy.dispose().await.unwrap();

    assert!(journal.imports().is_empty());
    assert!(journal.calls().is_empty());
    assert!(journal.disposed().is_empty());
    assert_eq!(proxy.state().await, ImportState::Disposed);
}

#[tokio::test]
async fn test_dispose_releases_module_once() {
    let (proxy, journal) = proxy(FakeRuntime::new());

    proxy.invoke_void("init", &[]).await.unwrap();
    proxy.dispose().await.unwrap();
    proxy.dispose().await.unwrap();

    assert_eq!(journal.disposed(), vec!["./Counter.ext.js".to_string()]);
}

#[tokio::test]
async fn test_invoke_after_dispose_fails() {
    let (proxy, journal) = proxy(FakeRuntime::new());

    proxy.invoke_void("init", &[]).await.unwrap();
    proxy.dispose().await.unwrap();

    let err = proxy.invoke_void("init", &[]).await.unwrap_err();
    assert_eq!(err, Error::Disposed);
    assert_eq!(journal.imports().len(), 1);
    assert_eq!(journal.calls().len(), 1);
}

#[tokio::test]
async fn test_dispose_after_failed_import() {
    let (proxy, journal) = proxy(FakeRuntime::new().with_missing("./Counter.ext.js"));

    assert!(proxy.invoke_void("init", &[]).await.is_err());
    proxy.dispose().await.unwrap();

    assert!(journal.disposed().is_empty());
}

#[tokio::test]
async fn test_dispose_waits_for_in_flight_import() {
    let (proxy, journal) = proxy(FakeRuntime::new().with_import_delay(Duration::from_millis(50)));

    let (invoked, disposed) = tokio::join!(proxy.invoke_void("init", &[]), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        proxy.dispose().await
    });

    assert_eq!(invoked.unwrap_err(), Error::Disposed);
    disposed.unwrap();
    assert_eq!(journal.imports().len(), 1);
    assert!(journal.calls().is_empty());
    assert_eq!(journal.disposed(), vec!["./Counter.ext.js".to_string()]);
}

#[tokio::test]
async fn test_call_joining_import_after_dispose_fails() {
    let (proxy, journal) = proxy(FakeRuntime::new().with_import_delay(Duration::from_millis(50)));

    let (first, disposed, late) = tokio::join!(
        proxy.invoke_void("first", &[]),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            proxy.dispose().await
        },
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            proxy.invoke_void("late", &[]).await
        },
    );

    disposed.unwrap();
    assert_eq!(first.unwrap_err(), Error::Disposed);
    assert_eq!(late.unwrap_err(), Error::Disposed);
    assert!(journal.calls().is_empty());
    assert_eq!(journal.disposed().len(), 1);
}

#[tokio::test]
async fn test_drop_releases_module() {
    let (proxy, journal) = proxy(FakeRuntime::new());

    proxy.invoke_void("init", &[]).await.unwrap();
    drop(proxy);

    // Release is scheduled on the runtime.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(journal.disposed(), vec!["./Counter.ext.js".to_string()]);
}

#[tokio::test]
async fn test_drop_after_dispose_does_not_release_twice() {
    let (proxy, journal) = proxy(FakeRuntime::new());

    proxy.invoke_void("init", &[]).await.unwrap();
    proxy.dispose().await.unwrap();
    drop(proxy);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(journal.disposed().len(), 1);
}

#[tokio::test]
async fn test_drop_during_import_releases_module() {
    let (proxy, journal) = proxy(FakeRuntime::new().with_import_delay(Duration::from_millis(20)));

    let pending = tokio::time::timeout(Duration::from_millis(5), proxy.invoke_void("init", &[])).await;
    assert!(pending.is_err());
    drop(proxy);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(journal.imports().len(), 1);
    assert_eq!(journal.disposed(), vec!["./Counter.ext.js".to_string()]);
}

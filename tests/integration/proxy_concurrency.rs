//! Single-flight import under concurrent first use.

use std::sync::Arc;
use std::time::Duration;

use component_scripts::{ComponentScriptProxy, EntryUnitResolver, FormatterRegistry, UnitIdentity};

use crate::fixture::{Counter, FakeRuntime, APP_UNIT};

fn slow_proxy() -> (ComponentScriptProxy<Counter>, Arc<crate::fixture::Journal>) {
    let runtime = FakeRuntime::new().with_import_delay(Duration::from_millis(50));
    let journal = Arc::clone(&runtime.journal);
    let proxy = ComponentScriptProxy::new(
        Arc::new(runtime),
        Arc::new(FormatterRegistry::new()),
        Arc::new(EntryUnitResolver::new(UnitIdentity::new(APP_UNIT.0, APP_UNIT.1))),
    );
    (proxy, journal)
}

#[tokio::test]
async fn test_concurrent_invocations_share_one_import() {
    let (proxy, journal) = slow_proxy();

    let (a, b) = tokio::join!(
        proxy.invoke::<usize>("moduleId", &[]),
        proxy.invoke::<usize>("moduleId", &[]),
    );

    assert_eq!(journal.imports().len(), 1);
    assert_eq!(a.unwrap(), b.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_share_one_import() {
    let (proxy, journal) = slow_proxy();
    let proxy = Arc::new(proxy);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let proxy = Arc::clone(&proxy);
        tasks.push(tokio::spawn(async move {
            proxy.invoke::<usize>("moduleId", &[]).await
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().unwrap());
    }

    assert_eq!(journal.imports(), vec!["./Counter.ext.js".to_string()]);
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(journal.calls().len(), 8);
}

#[tokio::test]
async fn test_timed_out_first_caller_does_not_restart_import() {
    let (proxy, journal) = slow_proxy();

    let (first, second) = tokio::join!(
        tokio::time::timeout(Duration::from_millis(10), proxy.invoke::<usize>("moduleId", &[])),
        proxy.invoke::<usize>("moduleId", &[]),
    );

    assert!(first.is_err());
    second.unwrap();
    assert_eq!(journal.imports(), vec!["./Counter.ext.js".to_string()]);

    proxy.invoke::<usize>("moduleId", &[]).await.unwrap();
    assert_eq!(journal.imports().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_aborted_first_task_does_not_restart_import() {
    let (proxy, journal) = slow_proxy();
    let proxy = Arc::new(proxy);

    let first = tokio::spawn({
        let proxy = Arc::clone(&proxy);
        async move { proxy.invoke_void("init", &[]).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    first.abort();

    proxy.invoke_void("init", &[]).await.unwrap();
    assert_eq!(journal.imports().len(), 1);
}

#[tokio::test]
async fn test_later_calls_reuse_cached_module() {
    let (proxy, journal) = slow_proxy();

    let first = proxy.module().await.unwrap();
    let second = proxy.module().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(journal.imports().len(), 1);
}

#[tokio::test]
async fn test_separate_proxies_import_separately() {
    let runtime = Arc::new(FakeRuntime::new());
    let journal = Arc::clone(&runtime.journal);
    let formatters = Arc::new(FormatterRegistry::new());
    let units = Arc::new(EntryUnitResolver::new(UnitIdentity::new(APP_UNIT.0, APP_UNIT.1)));

    let a: ComponentScriptProxy<Counter> =
        ComponentScriptProxy::new(runtime.clone(), formatters.clone(), units.clone());
    let b: ComponentScriptProxy<Counter> = ComponentScriptProxy::new(runtime, formatters, units);

    let id_a: usize = a.invoke("moduleId", &[]).await.unwrap();
    let id_b: usize = b.invoke("moduleId", &[]).await.unwrap();

    assert_ne!(id_a, id_b);
    assert_eq!(journal.imports().len(), 2);
}

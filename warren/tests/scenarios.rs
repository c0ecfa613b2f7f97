//! End-to-end container scenarios.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use warren::prelude::*;

struct Counter(AtomicU64);

impl Counter {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

struct IdGen {
    counter: Arc<Counter>,
}

impl IdGen {
    fn next_id(&self) -> u64 {
        self.counter.next()
    }
}

/// A float in [0, 1) from the process-random hasher seed.
fn uniform() -> f64 {
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u64(0x5eed);
    (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64
}

#[test]
fn id_gen_draws_from_earlier_counter() {
    let mut container = Container::new();
    container
        .register("counter", |_| Ok(Counter(AtomicU64::new(0))))
        .unwrap()
        .register("id_gen", |r| {
            Ok(IdGen {
                counter: r.get("counter")?,
            })
        })
        .unwrap();

    let ids = container.get::<IdGen>("id_gen").unwrap();
    let first = ids.next_id();
    let second = ids.next_id();
    assert!(second > first);

    // The counter the factory saw is the container's counter.
    let counter = container.get::<Counter>("counter").unwrap();
    assert!(Arc::ptr_eq(&counter, &ids.counter));
    assert!(counter.next() > second);
}

#[test]
fn random_service_is_memoized() {
    let mut container = Container::new();
    container.register("random", |_| Ok(uniform())).unwrap();

    let a = container.get::<f64>("random").unwrap();
    let b = container.get::<f64>("random").unwrap();

    assert!((0.0..1.0).contains(&*a));
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn counting_factory_runs_once_across_reads() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut container = Container::new();
    container
        .register("svc", {
            let calls = Arc::clone(&calls);
            move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![1u8, 2, 3])
            }
        })
        .unwrap();

    let first = container.get::<Vec<u8>>("svc").unwrap();
    for _ in 0..10 {
        assert!(Arc::ptr_eq(&first, &container.get::<Vec<u8>>("svc").unwrap()));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_first_reads_construct_once() {
    const READERS: usize = 8;

    let calls = Arc::new(AtomicU32::new(0));
    let mut container = Container::new();
    container
        .register("slow", {
            let calls = Arc::clone(&calls);
            move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                thread::sleep(std::time::Duration::from_millis(20));
                Ok(String::from("slow"))
            }
        })
        .unwrap();

    let barrier = Barrier::new(READERS);
    let instances: Vec<Arc<String>> = thread::scope(|s| {
        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    container.get::<String>("slow").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn merge_then_resolve_matches_source() {
    let mut x = Container::new();
    x.register("a", |_| Ok(uniform())).unwrap();

    let mut y = Container::new();
    y.register("b", |_| Ok(2u8)).unwrap();
    y.merge(&x).unwrap();

    assert_eq!(y.len(), 2);
    assert_eq!(*y.get::<u8>("b").unwrap(), 2);
    assert!(Arc::ptr_eq(
        &y.get::<f64>("a").unwrap(),
        &x.get::<f64>("a").unwrap()
    ));
}

#[test]
fn overlapping_merge_changes_nothing() {
    let mut x = Container::new();
    x.register_value("c", 1u8).unwrap();
    x.register_value("x_only", 1u8).unwrap();

    let mut y = Container::new();
    y.register_value("c", 2u8).unwrap();

    let err = y.merge(&x).unwrap_err();
    assert!(err.to_string().contains("\"c\""));

    assert_eq!(y.names(), vec![ServiceName::from("c")]);
    assert_eq!(x.len(), 2);
    assert_eq!(*y.get::<u8>("c").unwrap(), 2);
    assert_eq!(*x.get::<u8>("c").unwrap(), 1);
}

#[test]
fn provider_modules_compose() {
    struct RetryProvider;

    impl Provider for RetryProvider {
        fn register(&self, container: &mut Container) -> Result<()> {
            container.register_value("retries", 3u32)?;
            Ok(())
        }
    }

    let container = Container::builder()
        .add_provider(&RetryProvider)
        .register_with_deps("policy", ["retries"], |r| {
            Ok(format!("retry {} times", r.get::<u32>("retries")?))
        })
        .build()
        .unwrap();

    assert_eq!(*container.get::<String>("policy").unwrap(), "retry 3 times");
}

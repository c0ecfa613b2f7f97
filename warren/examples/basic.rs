//! Basic example of the Warren container.
//!
//! Run with `RUST_LOG=warren_container=debug cargo run --example basic`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing_subscriber::EnvFilter;
use warren::prelude::*;

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Counter(AtomicU64);

impl Counter {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

struct IdGen {
    counter: Arc<Counter>,
    logger: Arc<Arc<dyn Logger>>,
}

impl IdGen {
    fn next_id(&self) -> String {
        let id = format!("user-{}", self.counter.next());
        self.logger.log(&format!("issued {id}"));
        id
    }
}

struct InfraProvider;

impl Provider for InfraProvider {
    fn register(&self, container: &mut Container) -> Result<()> {
        container
            .register("logger", |_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>))?
            .register("counter", |_| Ok(Counter(AtomicU64::new(1))))?;
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warren_container=debug")),
        )
        .init();

    let infra = Container::builder().add_provider(&InfraProvider).build()?;

    let mut app = Container::new();
    app.merge(&infra)?
        .register_with_deps("id_gen", ["counter", "logger"], |r| {
            Ok(IdGen {
                counter: r.get("counter")?,
                logger: r.get("logger")?,
            })
        })?;

    println!("{app:?}");

    let ids = app.get::<IdGen>("id_gen")?;
    println!("{}", ids.next_id());
    println!("{}", ids.next_id());

    // Same counter instance behind both containers.
    let counter = infra.get::<Counter>("counter")?;
    println!("next raw value: {}", counter.next());

    match app.merge(&infra) {
        Ok(_) => println!("unexpected: merge succeeded twice"),
        Err(err) => println!("second merge rejected:\n{err}"),
    }

    match app.get::<IdGen>("id_gne") {
        Ok(_) => println!("unexpected: typo resolved"),
        Err(err) => println!("{err}"),
    }

    Ok(())
}

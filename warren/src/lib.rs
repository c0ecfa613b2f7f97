//! # Warren — lazy named-service container for Rust
//!
//! Register services under names, read them back by name and type.
//! Each service is built on first read and cached for the life of the
//! container. Containers can be merged when their names do not overlap.
//!
//! ```rust
//! use warren::prelude::*;
//!
//! let mut container = Container::new();
//! container.register("greeting", |_| Ok(String::from("hello")))?;
//!
//! let a = container.get::<String>("greeting")?;
//! let b = container.get::<String>("greeting")?;
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! # Ok::<(), WarrenError>(())
//! ```

pub use warren_container::*;
pub use warren_support::*;

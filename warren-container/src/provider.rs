//! Provider trait: a module of related service registrations.
//!
//! Providers group services that belong together so an application
//! can assemble its container from a few named pieces.
//!
//! # Examples
//! ```rust
//! use warren_container::prelude::*;
//!
//! struct StorageProvider {
//!     url: String,
//! }
//!
//! impl Provider for StorageProvider {
//!     fn register(&self, container: &mut Container) -> Result<()> {
//!         container
//!             .register_value("storage_url", self.url.clone())?
//!             .register("storage_client", |r| {
//!                 let url = r.get::<String>("storage_url")?;
//!                 Ok(format!("client for {url}"))
//!             })?;
//!         Ok(())
//!     }
//! }
//!
//! let mut container = Container::new();
//! container.add_provider(&StorageProvider { url: "s3://bucket".into() })?;
//! assert_eq!(*container.get::<String>("storage_client")?, "client for s3://bucket");
//! # Ok::<(), WarrenError>(())
//! ```

use crate::container::Container;
use crate::error::Result;

/// A module that registers related services into a container.
///
/// Split registrations by concern instead of one long block:
///
/// ```rust,ignore
/// container
///     .add_provider(&DatabaseProvider)?
///     .add_provider(&AuthProvider)?
///     .add_provider(&EmailProvider)?;
/// ```
pub trait Provider: Send + Sync {
    /// Registers this provider's services.
    ///
    /// Called once per [`Container::add_provider`].
    fn register(&self, container: &mut Container) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarrenError;

    struct ClockProvider;

    impl Provider for ClockProvider {
        fn register(&self, container: &mut Container) -> Result<()> {
            container
                .register_value("epoch", 1_700_000_000u64)?
                .register("tick", |r| {
                    let epoch = crate::container::resolve::<u64>(r, "epoch")?;
                    Ok(*epoch + 1)
                })?;
            Ok(())
        }
    }

    struct NamedProvider;

    impl Provider for NamedProvider {
        fn register(&self, container: &mut Container) -> Result<()> {
            container.register_value("tick", 0u64)?;
            Ok(())
        }

        fn name(&self) -> &str {
            "named"
        }
    }

    #[test]
    fn provider_registers_services() {
        let mut container = Container::new();
        container.add_provider(&ClockProvider).unwrap();

        assert_eq!(container.len(), 2);
        assert_eq!(*container.get::<u64>("tick").unwrap(), 1_700_000_001);
    }

    #[test]
    fn provider_conflicts_surface() {
        let mut container = Container::new();
        container.add_provider(&ClockProvider).unwrap();

        let err = container.add_provider(&NamedProvider).unwrap_err();
        assert!(matches!(err, WarrenError::DuplicateServiceName(_)));
    }

    #[test]
    fn provider_has_name() {
        assert!(ClockProvider.name().contains("ClockProvider"));
        assert_eq!(NamedProvider.name(), "named");
    }
}

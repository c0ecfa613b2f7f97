//! # The Container
//!
//! A registry of named, lazily constructed services.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──merge(&other)──> Container
//!                                  │
//!                           get::<T>(name)
//!                                  │
//!                                  ▼
//!                    Slot: Unresolved ──first read──> Resolved
//! ```
//!
//! # Examples
//! ```rust
//! use warren_container::prelude::*;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct Counter(AtomicU64);
//!
//! impl Counter {
//!     fn next(&self) -> u64 {
//!         self.0.fetch_add(1, Ordering::SeqCst)
//!     }
//! }
//!
//! struct IdGen {
//!     counter: std::sync::Arc<Counter>,
//! }
//!
//! let mut container = Container::new();
//! container
//!     .register("counter", |_| Ok(Counter(AtomicU64::new(1))))?
//!     .register("id_gen", |r| {
//!         let counter = r.get::<Counter>("counter")?;
//!         Ok(IdGen { counter })
//!     })?;
//!
//! let ids = container.get::<IdGen>("id_gen")?;
//! assert!(ids.counter.next() < ids.counter.next());
//! # Ok::<(), WarrenError>(())
//! ```

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{Result, WarrenError};
use crate::key::{ServiceKey, ServiceName};
use crate::provider::Provider;
use crate::registry::{Instance, Registration, Registry, Resolver};
use crate::settings::Settings;

// ============================================================
// Container
// ============================================================

/// A lazy, name-keyed service container.
///
/// Registration and merge take `&mut self`; reads take `&self` and may
/// happen from many threads. Each service's factory runs at most once
/// per successful construction.
pub struct Container {
    registry: Arc<Registry>,
}

impl Container {
    /// Creates an empty container with default [`Settings`].
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Creates an empty container with the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            registry: Arc::new(Registry::new(settings)),
        }
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Returns the current settings.
    pub fn settings(&self) -> Settings {
        self.registry.settings()
    }

    /// Replaces the settings.
    pub fn set_settings(&mut self, settings: Settings) {
        self.registry.set_settings(settings);
    }

    /// Registers `factory` under `name`.
    ///
    /// The factory runs on the first [`get`](Container::get) and its
    /// result is cached for the life of the container. It receives a
    /// [`Resolver`] that sees only services registered before this one.
    ///
    /// # Errors
    /// [`WarrenError::DuplicateServiceName`] if `name` is already bound;
    /// the container is left unchanged.
    pub fn register<T, F>(&mut self, name: impl Into<ServiceName>, factory: F) -> Result<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    {
        self.register_internal(name.into(), Vec::new(), factory)
    }

    /// Registers an already built value under `name`.
    ///
    /// ```
    /// use warren_container::prelude::*;
    ///
    /// let mut container = Container::new();
    /// container.register_value("url", String::from("postgres://localhost"))?;
    /// assert_eq!(*container.get::<String>("url")?, "postgres://localhost");
    /// # Ok::<(), WarrenError>(())
    /// ```
    pub fn register_value<T>(&mut self, name: impl Into<ServiceName>, value: T) -> Result<&mut Self>
    where
        T: Send + Sync + 'static,
    {
        let name = name.into();
        let instance: Instance = Arc::new(value);
        self.registry.register(Registration {
            name,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            dependencies: Vec::new(),
            factory: Arc::new(move |_: &dyn Resolver| Ok(Arc::clone(&instance))),
        })?;
        Ok(self)
    }

    /// Registers `factory` under `name`, declaring the services it reads.
    ///
    /// Every declared dependency must already be bound.
    ///
    /// # Errors
    /// - [`WarrenError::DuplicateServiceName`] if `name` is already bound
    /// - [`WarrenError::MissingDependencies`] listing every unbound dependency
    pub fn register_with_deps<T, F, I, N>(
        &mut self,
        name: impl Into<ServiceName>,
        dependencies: I,
        factory: F,
    ) -> Result<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
        I: IntoIterator<Item = N>,
        N: Into<ServiceName>,
    {
        let dependencies = dependencies.into_iter().map(Into::into).collect();
        self.register_internal(name.into(), dependencies, factory)
    }

    /// Copies every binding of `other` into this container.
    ///
    /// No factory runs. Copied names delegate to `other`'s slots, so
    /// both containers hand out the same instance for a copied name.
    ///
    /// # Errors
    /// [`WarrenError::DuplicateMergeKeys`] listing every name bound in
    /// both containers; neither container is changed.
    #[instrument(skip_all, name = "container_merge")]
    pub fn merge(&mut self, other: &Container) -> Result<&mut Self> {
        let copied = self.registry.merge_from(&other.registry)?;
        debug!(copied, total = self.registry.len(), "Merged container");
        Ok(self)
    }

    /// Registers every service of a [`Provider`].
    ///
    /// Services registered before a provider error stay registered.
    pub fn add_provider(&mut self, provider: &dyn Provider) -> Result<&mut Self> {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(self)?;
        Ok(self)
    }

    /// Returns the service `name` as a `T`, constructing it on first use.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = container.get("database")?;
    /// ```
    ///
    /// # Errors
    /// - [`WarrenError::NotRegistered`] if `name` is not bound
    /// - [`WarrenError::TypeMismatch`] if the service is not a `T`
    /// - whatever the factory returned, on construction failure
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        resolve(self, name)
    }

    /// Like [`get`](Container::get), but an unbound name gives `Ok(None)`.
    pub fn find<T: Send + Sync + 'static>(&self, name: &str) -> Result<Option<Arc<T>>> {
        if !self.contains(name) {
            return Ok(None);
        }
        self.get(name).map(Some)
    }

    /// Returns `true` if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Returns `true` if `name` is bound and already constructed.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.registry.is_resolved(name).unwrap_or(false)
    }

    /// Bound names in the order they were registered or merged.
    pub fn names(&self) -> Vec<ServiceName> {
        self.registry.names()
    }

    /// Returns the number of bound names.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn register_internal<T, F>(
        &mut self,
        name: ServiceName,
        dependencies: Vec<ServiceName>,
        factory: F,
    ) -> Result<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    {
        self.registry.register(Registration {
            name,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            dependencies,
            factory: Arc::new(move |resolver: &dyn Resolver| {
                Ok(Arc::new(factory(resolver)?) as Instance)
            }),
        })?;
        Ok(self)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for Container {
    fn resolve_key(&self, key: &ServiceKey<'_>) -> Result<Instance> {
        self.registry.resolve(key, None)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registry.len())
            .field("resolved", &self.registry.resolved_count())
            .finish()
    }
}

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with a chain of registrations.
///
/// Each step is infallible in the chain; the first error is kept and
/// returned by [`build()`](ContainerBuilder::build). Steps after an
/// error are skipped.
///
/// # Examples
/// ```rust
/// use warren_container::prelude::*;
///
/// let container = Container::builder()
///     .register_value("base", 40u32)
///     .register("answer", |r| Ok(*r.get::<u32>("base")? + 2))
///     .build()?;
///
/// assert_eq!(*container.get::<u32>("answer")?, 42);
/// # Ok::<(), WarrenError>(())
/// ```
pub struct ContainerBuilder {
    container: Container,
    error: Option<WarrenError>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            container: Container::new(),
            error: None,
        }
    }

    /// Use these settings for the built container.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.container.set_settings(settings);
        self
    }

    /// See [`Container::register`].
    pub fn register<T, F>(self, name: impl Into<ServiceName>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    {
        self.step(|c| c.register(name, factory).map(drop))
    }

    /// See [`Container::register_value`].
    pub fn register_value<T>(self, name: impl Into<ServiceName>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.step(|c| c.register_value(name, value).map(drop))
    }

    /// See [`Container::register_with_deps`].
    pub fn register_with_deps<T, F, I, N>(
        self,
        name: impl Into<ServiceName>,
        dependencies: I,
        factory: F,
    ) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
        I: IntoIterator<Item = N>,
        N: Into<ServiceName>,
    {
        self.step(|c| c.register_with_deps(name, dependencies, factory).map(drop))
    }

    /// See [`Container::merge`].
    pub fn merge(self, other: &Container) -> Self {
        self.step(|c| c.merge(other).map(drop))
    }

    /// See [`Container::add_provider`].
    pub fn add_provider(self, provider: &dyn Provider) -> Self {
        self.step(|c| c.add_provider(provider).map(drop))
    }

    /// Finish building.
    ///
    /// # Errors
    /// The first error any step produced.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        if let Some(err) = self.error {
            return Err(err);
        }

        info!(registered = self.container.len(), "Container built");
        Ok(self.container)
    }

    fn step(mut self, f: impl FnOnce(&mut Container) -> Result<()>) -> Self {
        if self.error.is_none() {
            if let Err(err) = f(&mut self.container) {
                self.error = Some(err);
            }
        }
        self
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("registered", &self.container.len())
            .field("failed", &self.error.is_some())
            .finish()
    }
}

// ============================================================
// Typed resolution
// ============================================================

/// Resolve a typed service from any [`Resolver`].
///
/// ```rust,ignore
/// container.register("repo", |r| {
///     let db: Arc<Database> = warren_container::container::resolve(r, "database")?;
///     Ok(Repo { db })
/// })?;
/// ```
pub fn resolve<T: Send + Sync + 'static>(
    resolver: &(impl Resolver + ?Sized),
    name: &str,
) -> Result<Arc<T>> {
    let key = ServiceKey::of::<T>(name);
    let instance = resolver.resolve_key(&key)?;
    instance
        .downcast::<T>()
        .map_err(|_| WarrenError::TypeMismatch {
            name: key.to_service_name(),
            expected: key.type_name(),
            actual: "<unknown>",
        })
}

/// Typed lookups on any [`Resolver`], including the `&dyn Resolver`
/// a factory receives.
pub trait ResolverApi {
    /// Resolves `name` as a `T`.
    fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>>;
}

impl<R: Resolver + ?Sized> ResolverApi for R {
    fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        resolve(self, name)
    }
}

// ============================================================
// Prelude
// ============================================================

pub mod prelude {
    pub use super::{Container, ContainerBuilder, ResolverApi, resolve};
    pub use crate::error::{Result, WarrenError};
    pub use crate::key::{ServiceKey, ServiceName};
    pub use crate::provider::Provider;
    pub use crate::registry::Resolver;
    pub use crate::settings::Settings;
}

// ============================================================
// Tests
// ============================================================

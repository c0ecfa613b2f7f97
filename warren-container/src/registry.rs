//! Service registry: slots, bindings and the factory-facing resolver.
//!
//! Every registered service lives in a [`Slot`]. A slot keeps its factory
//! and a [`OnceCell`] that holds the instance after the first read. A
//! container maps names to [`Binding`]s: either a slot it owns, or a
//! delegation to another container's slot created by a merge.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};
use warren_support::rendering::{shorten_type_name, suggest_similar};

use crate::error::{
    DuplicateMergeKeysError, DuplicateServiceNameError, MissingDependenciesError,
    NotRegisteredError, RegisteredAfterError, Result, WarrenError,
};
use crate::key::{ServiceKey, ServiceName};
use crate::settings::Settings;

/// A constructed, type-erased service instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Type alias for factory functions.
///
/// A factory receives a [`Resolver`] to read sibling services and
/// returns the type-erased instance or an error.
pub type FactoryFn = Arc<dyn Fn(&dyn Resolver) -> Result<Instance> + Send + Sync>;

/// Looks up services by key.
///
/// Factories receive a `&dyn Resolver` restricted to the services
/// registered before their own. The [`Container`](crate::container::Container)
/// implements it too, without restriction.
pub trait Resolver: Send + Sync {
    /// Resolves `key`, constructing the service on first use.
    fn resolve_key(&self, key: &ServiceKey<'_>) -> Result<Instance>;

    /// The service whose factory is running, if any.
    fn consumer(&self) -> Option<&ServiceName> {
        None
    }
}

/// Everything needed to create a slot, before it gets an ordinal.
pub(crate) struct Registration {
    pub name: ServiceName,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub dependencies: Vec<ServiceName>,
    pub factory: FactoryFn,
}

/// A named service: factory plus memoized instance.
pub(crate) struct Slot {
    name: ServiceName,
    /// Position in the owning registry; the factory sees lower ones only.
    ordinal: usize,
    type_id: TypeId,
    type_name: &'static str,
    dependencies: Vec<ServiceName>,
    factory: FactoryFn,
    cell: OnceCell<Instance>,
}

impl Slot {
    fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns the cached instance or runs the factory against `owner`.
    ///
    /// `OnceCell` blocks concurrent first reads, so the factory runs at
    /// most once per successful construction. A failed factory leaves the
    /// cell empty and the next read tries again.
    fn resolve(&self, owner: &Registry) -> Result<Instance> {
        if let Some(instance) = self.cell.get() {
            trace!(service = %self.name, "Cache hit");
            return Ok(Arc::clone(instance));
        }

        let instance = self.cell.get_or_try_init(|| {
            debug!(
                service = %self.name,
                ty = %shorten_type_name(self.type_name),
                "Constructing service"
            );
            let view = FactoryResolver {
                registry: owner,
                consumer: &self.name,
                limit: self.ordinal,
            };
            (self.factory)(&view)
        })?;

        Ok(Arc::clone(instance))
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("ordinal", &self.ordinal)
            .field("type", &self.type_name)
            .field("dependencies", &self.dependencies)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// What a name is bound to inside one registry.
#[derive(Clone)]
pub(crate) enum Binding {
    /// A slot created by this registry.
    Owned(Arc<Slot>),
    /// A slot owned by `origin`, copied in by a merge. The factory
    /// resolves siblings against `origin`, and the cache is shared.
    Delegated { origin: Arc<Registry>, slot: Arc<Slot> },
}

impl Binding {
    fn slot(&self) -> &Arc<Slot> {
        match self {
            Binding::Owned(slot) | Binding::Delegated { slot, .. } => slot,
        }
    }

    fn resolve(&self, home: &Registry) -> Result<Instance> {
        match self {
            Binding::Owned(slot) => slot.resolve(home),
            Binding::Delegated { origin, slot } => slot.resolve(origin),
        }
    }
}

#[derive(Clone)]
struct Entry {
    ordinal: usize,
    binding: Binding,
}

struct State {
    entries: HashMap<ServiceName, Entry>,
    order: Vec<ServiceName>,
    settings: Settings,
}

impl State {
    fn suggestions(&self, requested: &str) -> Vec<String> {
        suggest_similar(requested, &self.order, self.settings.max_suggestions)
    }
}

/// Stores the bindings of one container.
///
/// Bindings are only ever added. The lock is released before any
/// factory runs, so factories may read the registry freely.
pub(crate) struct Registry {
    state: RwLock<State>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new(settings: Settings) -> Self {
        Self {
            state: RwLock::new(State {
                entries: HashMap::new(),
                order: Vec::new(),
                settings,
            }),
        }
    }

    pub fn settings(&self) -> Settings {
        self.state.read().settings.clone()
    }

    pub fn set_settings(&self, settings: Settings) {
        self.state.write().settings = settings;
    }

    /// Binds a new slot under `registration.name`.
    ///
    /// # Errors
    /// - [`WarrenError::DuplicateServiceName`] if the name is bound
    /// - [`WarrenError::MissingDependencies`] if a declared dependency is not bound
    ///
    /// The registry is unchanged on error.
    pub fn register(&self, registration: Registration) -> Result<()> {
        let mut state = self.state.write();
        let name = registration.name;

        if state.entries.contains_key(&name) {
            warn!(service = %name, "Rejected duplicate service name");
            return Err(WarrenError::DuplicateServiceName(
                DuplicateServiceNameError { name },
            ));
        }

        let missing: Vec<ServiceName> = registration
            .dependencies
            .iter()
            .filter(|dep| !state.entries.contains_key(dep.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            let mut suggestions: Vec<String> = Vec::new();
            for dep in &missing {
                for suggestion in state.suggestions(dep.as_str()) {
                    if !suggestions.contains(&suggestion) {
                        suggestions.push(suggestion);
                    }
                }
            }
            warn!(service = %name, missing = ?missing, "Declared dependencies are not registered");
            return Err(WarrenError::MissingDependencies(MissingDependenciesError {
                service: name,
                missing,
                suggestions,
            }));
        }

        let ordinal = state.order.len();
        debug!(
            service = %name,
            ordinal,
            ty = %shorten_type_name(registration.type_name),
            "Registered service"
        );

        let slot = Arc::new(Slot {
            name: name.clone(),
            ordinal,
            type_id: registration.type_id,
            type_name: registration.type_name,
            dependencies: registration.dependencies,
            factory: registration.factory,
            cell: OnceCell::new(),
        });

        state.order.push(name.clone());
        state.entries.insert(
            name,
            Entry {
                ordinal,
                binding: Binding::Owned(slot),
            },
        );
        Ok(())
    }

    /// Copies every binding of `other` into this registry as delegations.
    ///
    /// All names are checked before anything is copied. Returns the
    /// number of bindings copied.
    ///
    /// # Errors
    /// [`WarrenError::DuplicateMergeKeys`] listing every shared name.
    pub fn merge_from(&self, other: &Arc<Registry>) -> Result<usize> {
        // Snapshot first; the two locks are never held together.
        let incoming: Vec<(ServiceName, Binding)> = {
            let theirs = other.state.read();
            theirs
                .order
                .iter()
                .map(|name| {
                    let binding = match &theirs.entries[name].binding {
                        Binding::Owned(slot) => Binding::Delegated {
                            origin: Arc::clone(other),
                            slot: Arc::clone(slot),
                        },
                        delegated => delegated.clone(),
                    };
                    (name.clone(), binding)
                })
                .collect()
        };

        let mut state = self.state.write();

        let mut conflicts: Vec<ServiceName> = incoming
            .iter()
            .filter(|(name, _)| state.entries.contains_key(name))
            .map(|(name, _)| name.clone())
            .collect();

        if !conflicts.is_empty() {
            conflicts.sort();
            warn!(conflicts = ?conflicts, "Rejected merge with duplicate keys");
            return Err(WarrenError::DuplicateMergeKeys(DuplicateMergeKeysError {
                names: conflicts,
            }));
        }

        let copied = incoming.len();
        for (name, binding) in incoming {
            let ordinal = state.order.len();
            debug!(service = %name, ordinal, "Merged service");
            state.order.push(name.clone());
            state.entries.insert(name, Entry { ordinal, binding });
        }

        Ok(copied)
    }

    /// Resolves `key`. With `visible_to = Some((consumer, limit))` only
    /// bindings with an ordinal below `limit` can be read.
    pub fn resolve(
        &self,
        key: &ServiceKey<'_>,
        visible_to: Option<(&ServiceName, usize)>,
    ) -> Result<Instance> {
        let name = key.name();
        trace!(service = %name, "Resolving");

        let entry = {
            let state = self.state.read();
            match state.entries.get(name) {
                Some(entry) => entry.clone(),
                None => {
                    return Err(WarrenError::NotRegistered(NotRegisteredError {
                        requested: key.to_service_name(),
                        required_by: visible_to.map(|(consumer, _)| consumer.clone()),
                        suggestions: state.suggestions(name),
                    }));
                }
            }
        };

        if let Some((consumer, limit)) = visible_to {
            if entry.ordinal >= limit {
                return Err(WarrenError::RegisteredAfter(RegisteredAfterError {
                    requested: key.to_service_name(),
                    consumer: consumer.clone(),
                }));
            }
        }

        let slot = entry.binding.slot();
        if slot.type_id != key.type_id() {
            return Err(WarrenError::TypeMismatch {
                name: key.to_service_name(),
                expected: key.type_name(),
                actual: slot.type_name,
            });
        }

        entry.binding.resolve(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.read().entries.contains_key(name)
    }

    /// `None` when the name is not bound.
    pub fn is_resolved(&self, name: &str) -> Option<bool> {
        self.state
            .read()
            .entries
            .get(name)
            .map(|entry| entry.binding.slot().is_resolved())
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<ServiceName> {
        self.state.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().order.len()
    }

    pub fn resolved_count(&self) -> usize {
        self.state
            .read()
            .entries
            .values()
            .filter(|entry| entry.binding.slot().is_resolved())
            .count()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let slots: Vec<&Arc<Slot>> = state
            .order
            .iter()
            .map(|name| state.entries[name].binding.slot())
            .collect();
        f.debug_struct("Registry").field("slots", &slots).finish()
    }
}

/// The resolver a factory receives: its owner registry, cut off at the
/// factory's own slot.
struct FactoryResolver<'a> {
    registry: &'a Registry,
    consumer: &'a ServiceName,
    limit: usize,
}

impl Resolver for FactoryResolver<'_> {
    fn resolve_key(&self, key: &ServiceKey<'_>) -> Result<Instance> {
        self.registry
            .resolve(key, Some((self.consumer, self.limit)))
    }

    fn consumer(&self) -> Option<&ServiceName> {
        Some(self.consumer)
    }
}

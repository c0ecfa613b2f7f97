//! Core container implementation for Warren.

pub mod container;
pub mod error;
pub mod key;
pub mod provider;
pub mod registry;
pub mod settings;

pub use container::{Container, ContainerBuilder, ResolverApi, prelude, resolve};
pub use error::{Result, WarrenError};
pub use key::{ServiceKey, ServiceName};
pub use provider::Provider;
pub use registry::{FactoryFn, Instance, Resolver};
pub use settings::Settings;

//! Error types for Warren container operations.
//!
//! Every error names the services involved and, where it helps,
//! lists registered names that look like the one that was asked for.

use std::fmt;

use warren_support::rendering::{render_names, shorten_type_name};

use crate::key::ServiceName;

/// Main error type for all Warren operations.
#[derive(Debug, thiserror::Error)]
pub enum WarrenError {
    /// A service with this name is already bound in the container.
    #[error("{}", .0)]
    DuplicateServiceName(DuplicateServiceNameError),

    /// Merging would bind one or more names twice.
    #[error("{}", .0)]
    DuplicateMergeKeys(DuplicateMergeKeysError),

    /// Requested service was never registered.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// A factory read a sibling that was registered after its own service.
    #[error("{}", .0)]
    RegisteredAfter(RegisteredAfterError),

    /// Declared dependencies are not bound at registration time.
    #[error("{}", .0)]
    MissingDependencies(MissingDependenciesError),

    /// The service exists but holds a different type.
    #[error(
        "Service {name:?} holds {}, not {}",
        shorten_type_name(.actual),
        shorten_type_name(.expected)
    )]
    TypeMismatch {
        name: ServiceName,
        expected: &'static str,
        actual: &'static str,
    },

    /// Factory returned an error during construction.
    #[error("Failed to construct {name:?}: {source}")]
    ConstructionFailed {
        name: ServiceName,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl WarrenError {
    /// Wraps a factory failure for the service `name`.
    ///
    /// ```
    /// use warren_container::error::WarrenError;
    ///
    /// let io = std::io::Error::other("disk on fire");
    /// let err = WarrenError::construction("storage", io);
    /// assert!(err.to_string().contains("storage"));
    /// ```
    pub fn construction(
        name: impl Into<ServiceName>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConstructionFailed {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Error when registering a name that is already bound.
#[derive(Debug)]
pub struct DuplicateServiceNameError {
    pub name: ServiceName,
}

impl fmt::Display for DuplicateServiceNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duplicate service name: {:?}", self.name.as_str())?;
        write!(
            f,
            "\n  Hint: names are bound once per container; pick another name"
        )
    }
}

/// Error when two merged containers share names.
///
/// Lists every colliding name, sorted, so all of them can be fixed at once.
#[derive(Debug)]
pub struct DuplicateMergeKeysError {
    pub names: Vec<ServiceName>,
}

impl fmt::Display for DuplicateMergeKeysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Duplicate keys during merge: {}",
            render_names(&self.names)
        )
    }
}

/// Error when a service was not registered.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// The name that was requested
    pub requested: ServiceName,
    /// The service whose factory asked for it (if any)
    pub required_by: Option<ServiceName>,
    /// Registered names that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service not registered: {:?}", self.requested.as_str())?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {:?}", parent.as_str())?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Error when a factory reads a service registered after its own.
#[derive(Debug)]
pub struct RegisteredAfterError {
    pub requested: ServiceName,
    pub consumer: ServiceName,
}

impl fmt::Display for RegisteredAfterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Service {:?} is registered after {:?} and is not visible to its factory",
            self.requested.as_str(),
            self.consumer.as_str(),
        )?;
        write!(
            f,
            "\n  Hint: register {:?} before {:?}",
            self.requested.as_str(),
            self.consumer.as_str(),
        )
    }
}

/// Error when declared dependencies are missing at registration.
#[derive(Debug)]
pub struct MissingDependenciesError {
    /// The service being registered
    pub service: ServiceName,
    /// Every declared dependency that is not bound
    pub missing: Vec<ServiceName>,
    /// Registered names that look like the missing ones
    pub suggestions: Vec<String>,
}

impl fmt::Display for MissingDependenciesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Service {:?} depends on unregistered services: {}",
            self.service.as_str(),
            render_names(&self.missing),
        )?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Convenient Result type for Warren operations.
pub type Result<T> = std::result::Result<T, WarrenError>;

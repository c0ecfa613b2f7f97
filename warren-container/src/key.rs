//! Service names and typed lookup keys.
//!
//! A [`ServiceName`] names a slot inside a container. A [`ServiceKey`]
//! pairs a name with the Rust type the caller expects to get back,
//! so a wrong type is reported before any factory runs.

use std::any::{TypeId, type_name};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The name a service is registered under.
///
/// Cheap for string literals (borrowed `'static`), owned otherwise.
///
/// # Examples
/// ```
/// use warren_container::key::ServiceName;
///
/// let a = ServiceName::from("database");
/// let b = ServiceName::from(String::from("database"));
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "database");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServiceName(Cow<'static, str>);

impl ServiceName {
    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Hash for ServiceName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `str`'s hash for `Borrow<str>` lookups.
        self.as_str().hash(state);
    }
}

impl Borrow<str> for ServiceName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&'static str> for ServiceName {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for ServiceName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&ServiceName> for ServiceName {
    fn from(name: &ServiceName) -> Self {
        name.clone()
    }
}

impl PartialEq<str> for ServiceName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ServiceName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed request for a service: its name plus the expected type.
///
/// The name is borrowed, so building a key for a read does not allocate.
///
/// # Examples
/// ```
/// use warren_container::key::ServiceKey;
///
/// let key = ServiceKey::of::<u64>("counter");
/// assert_eq!(key.name(), "counter");
/// assert_eq!(key.type_name(), "u64");
/// ```
#[derive(Clone, Copy)]
pub struct ServiceKey<'a> {
    name: &'a str,
    type_id: TypeId,
    type_name: &'static str,
}

impl<'a> ServiceKey<'a> {
    /// Creates a key asking for `name` as a `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>(name: &'a str) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the requested service name.
    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns an owned copy of the name, for error reports.
    pub fn to_service_name(&self) -> ServiceName {
        ServiceName::from(self.name.to_owned())
    }

    /// Returns the [`TypeId`] the caller expects.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the human-readable expected type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ServiceKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ServiceKey<'_> {}

impl Hash for ServiceKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for ServiceKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey({:?}: {})", self.name, self.type_name)
    }
}

impl fmt::Display for ServiceKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} as {}", self.name, self.type_name)
    }
}

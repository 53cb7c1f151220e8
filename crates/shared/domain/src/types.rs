use serde::{Deserialize, Serialize, Serializer};
use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use strum_macros::{Display as StrumDisplay, EnumIter};

/// A type carried as a value: identity via [`TypeId`], readability via the type name.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>() }
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `orders::OrdersEndpoint`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The last path segment of the type name, generics stripped.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name).then_with(|| self.id.cmp(&other.id))
    }
}

impl Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.name).finish()
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for TypeRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name)
    }
}

/// An opaque callable handed over by the endpoint (startup action, initialization hooks).
///
/// Two hooks are equal when they share the same callable; clones compare equal.
#[derive(Clone)]
pub struct Hook(Arc<dyn Fn() + Send + Sync>);

impl Hook {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) {
        (self.0)();
    }
}

impl Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

impl PartialEq for Hook {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Serialize for Hook {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_unit_struct("Hook")
    }
}

/// Dependency-injection container used by the endpoint.
pub trait Container: Any + Debug + Send + Sync {
    fn name(&self) -> &str;
}

/// The message endpoint started once bootstrap completes.
pub trait MessageEndpoint: Any + Debug + Send + Sync {
    fn start(&self);

    fn stop(&self) {}
}

/// A container selection: either a type to build or a ready instance.
#[derive(Clone)]
pub enum ContainerRef {
    Type { ty: TypeRef, build: fn() -> Arc<dyn Container> },
    Instance { ty: TypeRef, instance: Arc<dyn Container> },
}

impl ContainerRef {
    #[must_use]
    pub fn of_type<C: Container + Default>() -> Self {
        fn build<C: Container + Default>() -> Arc<dyn Container> {
            Arc::new(C::default())
        }
        Self::Type { ty: TypeRef::of::<C>(), build: build::<C> }
    }

    /// Wraps a ready instance, recording its concrete type.
    #[must_use]
    pub fn instance<C: Container>(instance: Arc<C>) -> Self {
        Self::Instance { ty: TypeRef::of::<C>(), instance }
    }

    #[must_use]
    pub const fn type_ref(&self) -> TypeRef {
        match self {
            Self::Type { ty, .. } | Self::Instance { ty, .. } => *ty,
        }
    }

    /// Returns the container, building it when only the type was supplied.
    #[must_use]
    pub fn materialize(&self) -> Arc<dyn Container> {
        match self {
            Self::Type { build, .. } => build(),
            Self::Instance { instance, .. } => Arc::clone(instance),
        }
    }
}

impl Debug for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { ty, .. } => f.debug_tuple("Type").field(ty).finish(),
            Self::Instance { instance, .. } => f.debug_tuple("Instance").field(instance).finish(),
        }
    }
}

impl PartialEq for ContainerRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Type { ty: a, .. }, Self::Type { ty: b, .. })
            | (Self::Instance { ty: a, .. }, Self::Instance { ty: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// The endpoint type selected to run after configuration, with its constructor.
#[derive(Clone, Copy)]
pub struct EndpointType {
    ty: TypeRef,
    build: fn() -> Box<dyn MessageEndpoint>,
}

impl EndpointType {
    #[must_use]
    pub fn of<T: MessageEndpoint + Default>() -> Self {
        fn build<T: MessageEndpoint + Default>() -> Box<dyn MessageEndpoint> {
            Box::new(T::default())
        }
        Self { ty: TypeRef::of::<T>(), build: build::<T> }
    }

    #[must_use]
    pub const fn type_ref(&self) -> TypeRef {
        self.ty
    }

    #[must_use]
    pub fn build(&self) -> Box<dyn MessageEndpoint> {
        (self.build)()
    }
}

impl Debug for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EndpointType").field(&self.ty).finish()
    }
}

impl PartialEq for EndpointType {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

/// Logging severity threshold.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

/// Order in which message handlers are invoked.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub enum HandlerOrdering {
    #[default]
    Unordered,
    Ordered(Vec<TypeRef>),
}

/// Collects the handler order an endpoint specifies.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Order {
    handlers: Vec<TypeRef>,
}

impl Order {
    /// Places `H` first, ahead of anything already specified.
    pub fn specify_first<H: 'static>(&mut self) -> &mut Self {
        self.handlers.insert(0, TypeRef::of::<H>());
        self
    }

    /// Appends `H` after everything already specified.
    pub fn then<H: 'static>(&mut self) -> &mut Self {
        self.handlers.push(TypeRef::of::<H>());
        self
    }

    #[must_use]
    pub fn handlers(&self) -> &[TypeRef] {
        &self.handlers
    }

    /// The first handler type listed more than once, if any.
    #[must_use]
    pub fn first_duplicate(&self) -> Option<TypeRef> {
        self.handlers
            .iter()
            .enumerate()
            .find(|(i, ty)| self.handlers[..*i].contains(ty))
            .map(|(_, ty)| *ty)
    }

    #[must_use]
    pub fn into_ordering(self) -> HandlerOrdering {
        if self.handlers.is_empty() {
            HandlerOrdering::Unordered
        } else {
            HandlerOrdering::Ordered(self.handlers)
        }
    }
}

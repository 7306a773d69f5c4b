//! Map-backed [`EventFactory`].

use herald_core::{BoxError, Event, EventFactory, FactoryError, Kind};
use std::{collections::HashMap, fmt, sync::Arc};

type Constructor = Arc<dyn Fn() -> Result<Event, BoxError> + Send + Sync>;

/// An [`EventFactory`] that maps type identifiers to constructors.
///
/// # Example
///
/// ```rust
/// use herald_core::{EventFactory, EventKind, Kind};
/// use herald_std::KindFactory;
///
/// struct Signup;
///
/// impl Kind for Signup {
///     fn kind() -> EventKind {
///         EventKind::new("user.signup").with_ancestor("user")
///     }
/// }
///
/// let factory = KindFactory::new().with_kind::<Signup>();
/// let event = factory.create("user.signup").unwrap();
/// assert!(event.is_a("user"));
/// assert!(factory.create("user.deleted").is_err());
/// ```
#[derive(Default, Clone)]
pub struct KindFactory {
    constructors: HashMap<String, Constructor>,
}

impl KindFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `type_id`, replacing any previous one.
    pub fn register<F>(&mut self, type_id: impl Into<String>, constructor: F)
    where
        F: Fn() -> Result<Event, BoxError> + Send + Sync + 'static,
    {
        self.constructors
            .insert(type_id.into(), Arc::new(constructor));
    }

    /// Register a constructor under `type_id`.
    pub fn with<F>(mut self, type_id: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Event, BoxError> + Send + Sync + 'static,
    {
        self.register(type_id, constructor);
        self
    }

    /// Register `K` under its own type identity.
    pub fn with_kind<K: Kind>(self) -> Self {
        let kind = K::kind();
        let type_id = kind.type_name().to_owned();
        self.with(type_id, move || Ok(Event::new(kind.clone())))
    }

    /// Whether `type_id` has a constructor.
    pub fn contains(&self, type_id: &str) -> bool {
        self.constructors.contains_key(type_id)
    }
}

impl EventFactory for KindFactory {
    fn create(&self, type_id: &str) -> Result<Event, FactoryError> {
        let constructor = self
            .constructors
            .get(type_id)
            .ok_or_else(|| FactoryError::UnknownType(type_id.to_owned()))?;
        constructor().map_err(|source| FactoryError::Build {
            type_id: type_id.to_owned(),
            source,
        })
    }
}

impl fmt::Debug for KindFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindFactory")
            .field("types", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

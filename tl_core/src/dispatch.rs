//! # Backend Dispatch
//!
//! One table per backend category, mapping a discriminant string to the
//! constructor of a concrete backend.
//!
//! Constructors receive the category settings (every sub-field the
//! category's backends may need) and assemble their own backend-specific
//! configuration from it. An unknown discriminant is a single uniform
//! error path: [`BackendError::Unsupported`].

use std::collections::BTreeMap;
use std::fmt;

use errors::BackendError;
use tracing::info;

use crate::types::BackendCategory;

/// Builds a backend from the category settings.
///
/// The category is passed in so that errors name the table the backend was
/// selected from (the same storage constructors serve modules and
/// providers).
pub type Constructor<S, B> = fn(BackendCategory, &S) -> Result<Box<B>, BackendError>;

/// Discriminant → constructor table for one backend category.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = BackendRegistry::new(BackendCategory::Database);
/// registry.register("sqlite", sqlite::build)?;
/// let engine = registry.build("sqlite", &settings)?;
/// ```
pub struct BackendRegistry<S, B: ?Sized> {
    category: BackendCategory,
    constructors: BTreeMap<&'static str, Constructor<S, B>>
}

impl<S, B: ?Sized> BackendRegistry<S, B> {
    pub fn new(category: BackendCategory) -> Self {
        Self {
            category,
            constructors: BTreeMap::new()
        }
    }

    pub fn category(&self) -> BackendCategory {
        self.category
    }

    /// Register a constructor under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DuplicateBackend`] if `name` is taken.
    pub fn register(
        &mut self,
        name: &'static str,
        constructor: Constructor<S, B>
    ) -> Result<(), BackendError> {
        if self.constructors.contains_key(name) {
            return Err(BackendError::DuplicateBackend {
                category: self.category.to_string(),
                name: name.to_string()
            });
        }
        self.constructors.insert(name, constructor);
        Ok(())
    }

    /// Registered discriminants, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.constructors.keys().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Select the constructor for `discriminant` and run it.
    ///
    /// # Errors
    ///
    /// [`BackendError::Unsupported`] for an unknown discriminant, otherwise
    /// whatever the constructor reports.
    pub fn build(&self, discriminant: &str, settings: &S) -> Result<Box<B>, BackendError> {
        let constructor =
            self.constructors
                .get(discriminant)
                .ok_or_else(|| BackendError::Unsupported {
                    category: self.category.to_string(),
                    value: discriminant.to_string(),
                    known: self.names().into_iter().map(str::to_string).collect()
                })?;

        let backend = constructor(self.category, settings)?;
        info!(category = %self.category, backend = discriminant, "Backend selected");
        Ok(backend)
    }
}

impl<S, B: ?Sized> fmt::Debug for BackendRegistry<S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("category", &self.category)
            .field("backends", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync + fmt::Debug {
        fn greet(&self) -> String;
    }

    #[derive(Debug)]
    struct English(String);

    impl Greeter for English {
        fn greet(&self) -> String {
            format!("hello {}", self.0)
        }
    }

    #[derive(Debug)]
    struct French(String);

    impl Greeter for French {
        fn greet(&self) -> String {
            format!("bonjour {}", self.0)
        }
    }

    fn english(_: BackendCategory, name: &String) -> Result<Box<dyn Greeter>, BackendError> {
        Ok(Box::new(English(name.clone())))
    }

    fn french(category: BackendCategory, name: &String) -> Result<Box<dyn Greeter>, BackendError> {
        if name.is_empty() {
            return Err(BackendError::invalid_config(category, "french", "name is empty"));
        }
        Ok(Box::new(French(name.clone())))
    }

    fn registry() -> BackendRegistry<String, dyn Greeter> {
        let mut registry = BackendRegistry::new(BackendCategory::Auth);
        registry.register("english", english).unwrap();
        registry.register("french", french).unwrap();
        registry
    }

    #[test]
    fn test_build_selects_constructor() {
        let registry = registry();
        let greeter = registry.build("french", &"terralist".to_string()).unwrap();
        assert_eq!(greeter.greet(), "bonjour terralist");
    }

    #[test]
    fn test_unknown_discriminant_is_rejected() {
        let err = registry()
            .build("german", &"terralist".to_string())
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Unsupported {
                category: "auth".to_string(),
                value: "german".to_string(),
                known: vec!["english".to_string(), "french".to_string()]
            }
        );
    }

    #[test]
    fn test_constructor_failure_propagates() {
        let err = registry().build("french", &String::new()).unwrap_err();
        assert!(matches!(err, BackendError::InvalidConfig { ref backend, .. } if backend == "french"));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = registry();
        let err = registry.register("english", french).unwrap_err();
        assert!(matches!(err, BackendError::DuplicateBackend { ref name, .. } if name == "english"));
        assert_eq!(registry.names(), vec!["english", "french"]);
    }

    #[test]
    fn test_discriminant_is_case_sensitive() {
        let registry = registry();
        assert!(registry.contains("english"));
        assert!(!registry.contains("English"));
        assert!(registry.build("English", &"x".to_string()).is_err());
    }
}

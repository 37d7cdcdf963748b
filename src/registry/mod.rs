//! Fixture and test registration.
//!
//! Registration happens in two tiers. Fixture declarations take effect
//! immediately. Fixture overrides (tier 1) and test registrations (tier 2)
//! are queued by [Registration] and applied by [Registration::finish]: all of
//! tier 1 in declaration order, then all of tier 2 in declaration order. A
//! test therefore always sees the final setup and teardown of its fixture,
//! wherever its registration appears relative to the overrides.
mod fixture;
mod param;

pub use fixture::{Fixture, FixtureDescriptor, FixtureRegistry, Hook};
pub use param::{case_name, Parameterized};
pub use test::{TestRegistry, TestUnit};

use crate::errors::{Error, Result};
use std::rc::Rc;
use tracing::{debug, error};

/// The complete, consistent set of fixtures and tests of a suite.
#[derive(Default)]
pub struct Registry {
    pub fixtures: FixtureRegistry,
    pub tests: TestRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_fixture<F: Default + 'static>(
        &mut self,
        name: &str,
    ) -> Result<Fixture<F>> {
        self.fixtures.declare_fixture(name)
    }

    pub fn override_setup<F: 'static>(
        &mut self,
        fixture: &Fixture<F>,
        hook: Hook<F>,
    ) -> Result<()> {
        self.fixtures.override_setup(fixture, hook)
    }

    pub fn override_teardown<F: 'static>(
        &mut self,
        fixture: &Fixture<F>,
        hook: Hook<F>,
    ) -> Result<()> {
        self.fixtures.override_teardown(fixture, hook)
    }

    pub fn register_test<F: Default + 'static>(
        &mut self,
        name: &str,
        fixture: &Fixture<F>,
        body: Hook<F>,
    ) -> Result<&TestUnit> {
        let descriptor = self.fixtures.descriptor(fixture)?;
        Ok(self.tests.register_test(name, descriptor, body))
    }

    pub fn register_parameterized_case<F: Default + 'static>(
        &mut self,
        name: &str,
        fixture: &Fixture<F>,
        case: usize,
        init: Hook<F>,
        body: Hook<F>,
    ) -> Result<&TestUnit> {
        let descriptor = self.fixtures.descriptor(fixture)?;
        Ok(self
            .tests
            .register_parameterized_case(name, descriptor, case, init, body))
    }

    /// Test units in run order.
    pub fn units(&self) -> std::slice::Iter<'_, TestUnit> {
        self.tests.iter()
    }
}

type Pending = Box<dyn FnOnce(&mut Registry) -> Result<()>>;

/// Collects the declarations of a suite and applies them in tier order.
#[derive(Default)]
pub struct Registration {
    registry: Registry,
    overrides: Vec<Pending>,
    tests: Vec<Pending>,
    errors: Vec<Error>,
}

impl Registration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a fixture whose data is a fresh `F::default()` for every test.
    pub fn fixture<F: Default + 'static>(&mut self, name: &str) -> Fixture<F> {
        match self.registry.declare_fixture(name) {
            Ok(fixture) => fixture,
            Err(err) => {
                self.errors.push(err);
                Fixture::named(name)
            }
        }
    }

    /// Override the setup function of `fixture`.
    pub fn setup<F, H>(&mut self, fixture: &Fixture<F>, hook: H)
    where
        F: 'static,
        H: Fn(&mut F) + 'static,
    {
        let fixture = fixture.clone();
        self.overrides.push(Box::new(move |registry: &mut Registry| {
            registry.override_setup(&fixture, Rc::new(hook))
        }));
    }

    /// Override the teardown function of `fixture`.
    pub fn teardown<F, H>(&mut self, fixture: &Fixture<F>, hook: H)
    where
        F: 'static,
        H: Fn(&mut F) + 'static,
    {
        let fixture = fixture.clone();
        self.overrides.push(Box::new(move |registry: &mut Registry| {
            registry.override_teardown(&fixture, Rc::new(hook))
        }));
    }

    /// Register a test named `name` running `body` against `fixture`.
    pub fn test<F, B>(&mut self, name: &str, fixture: &Fixture<F>, body: B)
    where
        F: Default + 'static,
        B: Fn(&mut F) + 'static,
    {
        let name = name.to_string();
        let fixture = fixture.clone();
        self.queue_test(Box::new(move |registry: &mut Registry| {
            registry
                .register_test(&name, &fixture, Rc::new(body))
                .map(|_| ())
        }));
    }

    /// Start a parameterized test. Each call to [Parameterized::case]
    /// registers one test unit.
    pub fn parameterized<F, B>(
        &mut self,
        name: &str,
        fixture: &Fixture<F>,
        body: B,
    ) -> Parameterized<'_, F>
    where
        F: Default + 'static,
        B: Fn(&mut F) + 'static,
    {
        Parameterized::new(self, name, fixture, Rc::new(body))
    }

    pub(crate) fn queue_test(&mut self, pending: Pending) {
        self.tests.push(pending);
    }

    /// Apply both tiers and return the registry. Every registration error
    /// is logged; the first one is returned.
    pub fn finish(self) -> Result<Registry> {
        let Registration {
            mut registry,
            overrides,
            tests,
            mut errors,
        } = self;

        debug!(count = overrides.len(), "tier 1: fixture overrides");
        for pending in overrides {
            if let Err(err) = pending(&mut registry) {
                errors.push(err);
            }
        }

        debug!(count = tests.len(), "tier 2: tests");
        for pending in tests {
            if let Err(err) = pending(&mut registry) {
                errors.push(err);
            }
        }

        for err in &errors {
            error!(%err, "registration failed");
        }
        match errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(registry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Slot;
    use std::cell::Cell;

    #[derive(Default)]
    struct Buffer {
        data: Option<Vec<u8>>,
    }

    #[test]
    fn overrides_apply_before_tests_regardless_of_order() {
        let seen = Rc::new(Cell::new(0));
        let observed = Rc::clone(&seen);
        let mut suite = Registration::new();
        let fixture = suite.fixture::<Buffer>("Buffer");
        suite.test("uses_buffer", &fixture, move |b| {
            observed.set(b.data.as_ref().map_or(0, Vec::capacity))
        });
        suite.setup(&fixture, |b| b.data = Some(Vec::with_capacity(1024)));

        let registry = suite.finish().unwrap();
        let mut instance = registry.tests.get(0).unwrap().instantiate();
        instance.setup();
        instance.body();
        instance.teardown();
        assert!(seen.get() >= 1024);
    }

    #[test]
    fn tests_run_in_registration_order() {
        let mut suite = Registration::new();
        let fixture = suite.fixture::<()>("Empty");
        for name in &["first", "second", "third"] {
            suite.test(name, &fixture, |_| {});
        }
        let registry = suite.finish().unwrap();
        let names: Vec<&str> =
            registry.units().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        let indices: Vec<usize> = registry.units().map(|u| u.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(registry.tests.get(1).unwrap().fixture, "Empty");
    }

    #[test]
    fn duplicate_override_fails_registration() {
        let mut suite = Registration::new();
        let fixture = suite.fixture::<Buffer>("Buffer");
        suite.setup(&fixture, |_| {});
        suite.setup(&fixture, |_| {});
        match suite.finish() {
            Err(Error::DuplicateOverride { fixture, slot }) => {
                assert_eq!(fixture, "Buffer");
                assert_eq!(slot, Slot::Setup);
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("registration should fail"),
        }
    }

    #[test]
    fn undeclared_fixture_fails_registration() {
        let mut suite = Registration::new();
        suite.test("orphan", &Fixture::<()>::named("Nowhere"), |_| {});
        assert!(matches!(
            suite.finish(),
            Err(Error::UndeclaredFixture(name)) if name == "Nowhere"
        ));
    }

    #[test]
    fn duplicate_declaration_fails_registration() {
        let mut suite = Registration::new();
        suite.fixture::<()>("Twice");
        suite.fixture::<()>("Twice");
        assert!(matches!(suite.finish(), Err(Error::DuplicateFixture(_))));
    }
}

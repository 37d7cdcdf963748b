use crate::errors::{Error, Result, Slot};
use std::{
    any::{type_name, Any},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    mem,
    rc::Rc,
};
use tracing::debug;

/// A lifecycle function or test body operating on fixture data.
pub type Hook<F> = Rc<dyn Fn(&mut F)>;

/// Typed handle naming a fixture whose data has type `F`.
pub struct Fixture<F> {
    name: String,
    data: PhantomData<fn(&mut F)>,
}

impl<F> Fixture<F> {
    /// Refer to a fixture by name. Using the handle fails at registration
    /// time if no fixture of that name and type was declared.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F> Clone for Fixture<F> {
    fn clone(&self) -> Self {
        Self::named(self.name.clone())
    }
}

impl<F> fmt::Debug for Fixture<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Fixture<{}>({})", type_name::<F>(), self.name)
    }
}

/// A declared fixture: its data block and lifecycle functions.
pub struct FixtureDescriptor<F> {
    /// Name of the fixture.
    pub name: String,
    /// Size in bytes of one data block.
    pub size: usize,
    setup: Hook<F>,
    teardown: Hook<F>,
    setup_overridden: bool,
    teardown_overridden: bool,
}

impl<F: 'static> FixtureDescriptor<F> {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: mem::size_of::<F>(),
            setup: Rc::new(|_: &mut F| {}),
            teardown: Rc::new(|_: &mut F| {}),
            setup_overridden: false,
            teardown_overridden: false,
        }
    }

    pub fn setup(&self) -> Hook<F> {
        Rc::clone(&self.setup)
    }

    pub fn teardown(&self) -> Hook<F> {
        Rc::clone(&self.teardown)
    }

    fn replace(&mut self, slot: Slot, hook: Hook<F>) -> Result<()> {
        let (current, overridden) = match slot {
            Slot::Setup => (&mut self.setup, &mut self.setup_overridden),
            Slot::Teardown => {
                (&mut self.teardown, &mut self.teardown_overridden)
            }
        };
        if *overridden {
            return Err(Error::DuplicateOverride {
                fixture: self.name.clone(),
                slot,
            });
        }
        *current = hook;
        *overridden = true;
        Ok(())
    }
}

struct Entry {
    type_name: &'static str,
    descriptor: Box<dyn Any>,
}

/// All declared fixtures, keyed by name.
#[derive(Default)]
pub struct FixtureRegistry {
    fixtures: HashMap<String, Entry>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a fixture with no-op setup and teardown.
    pub fn declare_fixture<F: Default + 'static>(
        &mut self,
        name: &str,
    ) -> Result<Fixture<F>> {
        if self.fixtures.contains_key(name) {
            return Err(Error::DuplicateFixture(name.to_string()));
        }
        debug!(fixture = name, data = type_name::<F>(), "declared fixture");
        self.fixtures.insert(
            name.to_string(),
            Entry {
                type_name: type_name::<F>(),
                descriptor: Box::new(FixtureDescriptor::<F>::new(name)),
            },
        );
        Ok(Fixture::named(name))
    }

    pub fn descriptor<F: 'static>(
        &self,
        fixture: &Fixture<F>,
    ) -> Result<&FixtureDescriptor<F>> {
        let entry = self
            .fixtures
            .get(fixture.name())
            .ok_or_else(|| Error::UndeclaredFixture(fixture.name.clone()))?;
        entry
            .descriptor
            .downcast_ref()
            .ok_or_else(|| mismatch(fixture, entry.type_name))
    }

    fn descriptor_mut<F: 'static>(
        &mut self,
        fixture: &Fixture<F>,
    ) -> Result<&mut FixtureDescriptor<F>> {
        let entry = self
            .fixtures
            .get_mut(fixture.name())
            .ok_or_else(|| Error::UndeclaredFixture(fixture.name.clone()))?;
        let declared = entry.type_name;
        entry
            .descriptor
            .downcast_mut()
            .ok_or_else(|| mismatch(fixture, declared))
    }

    /// Replace the setup function of `fixture`. Allowed once per fixture.
    pub fn override_setup<F: 'static>(
        &mut self,
        fixture: &Fixture<F>,
        hook: Hook<F>,
    ) -> Result<()> {
        debug!(fixture = fixture.name(), "setup override");
        self.descriptor_mut(fixture)?.replace(Slot::Setup, hook)
    }

    /// Replace the teardown function of `fixture`. Allowed once per fixture.
    pub fn override_teardown<F: 'static>(
        &mut self,
        fixture: &Fixture<F>,
        hook: Hook<F>,
    ) -> Result<()> {
        debug!(fixture = fixture.name(), "teardown override");
        self.descriptor_mut(fixture)?.replace(Slot::Teardown, hook)
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

fn mismatch<F>(fixture: &Fixture<F>, declared: &'static str) -> Error {
    Error::FixtureTypeMismatch {
        fixture: fixture.name.clone(),
        declared,
        requested: type_name::<F>(),
    }
}

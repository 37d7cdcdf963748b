use super::{Fixture, Hook, Registration, Registry};
use std::rc::Rc;
use tracing::warn;

/// Display name of case `case` (counting from 1) of the parameterized test
/// `name`.
pub fn case_name(name: &str, case: usize) -> String {
    format!("{}(case {})", name, case)
}

/// Builder that expands one test body into a test unit per case.
///
/// Case initializers run after the fixture setup. They may do anything a
/// setup function does, but assertions belong in the shared body.
pub struct Parameterized<'r, F> {
    registration: &'r mut Registration,
    name: String,
    fixture: Fixture<F>,
    body: Hook<F>,
    cases: usize,
}

impl<'r, F: Default + 'static> Parameterized<'r, F> {
    pub(super) fn new(
        registration: &'r mut Registration,
        name: &str,
        fixture: &Fixture<F>,
        body: Hook<F>,
    ) -> Self {
        Self {
            registration,
            name: name.to_string(),
            fixture: fixture.clone(),
            body,
            cases: 0,
        }
    }

    /// Add a case. It is registered as `<name>(case <k>)`, where `k` counts
    /// the cases of this test in the order they are added.
    pub fn case<I>(mut self, init: I) -> Self
    where
        I: Fn(&mut F) + 'static,
    {
        self.cases += 1;
        let case = self.cases;
        let name = case_name(&self.name, case);
        let fixture = self.fixture.clone();
        let body = Rc::clone(&self.body);
        self.registration
            .queue_test(Box::new(move |registry: &mut Registry| {
                registry
                    .register_parameterized_case(
                        &name,
                        &fixture,
                        case,
                        Rc::new(init),
                        body,
                    )
                    .map(|_| ())
            }));
        self
    }

    /// Number of cases added so far.
    pub fn len(&self) -> usize {
        self.cases
    }

    pub fn is_empty(&self) -> bool {
        self.cases == 0
    }
}

impl<F> Drop for Parameterized<'_, F> {
    fn drop(&mut self) {
        if self.cases == 0 {
            warn!(test = %self.name, "parameterized test has no cases");
        }
    }
}

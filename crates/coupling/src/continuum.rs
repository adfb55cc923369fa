use std::fmt;

use tandem_core::Engine;
use tracing::debug;

use crate::{ContinuumNames, Error};

/// One resolved continuum and the activation last requested for it.
#[derive(Debug, Clone)]
pub struct ContinuumRef<C> {
    name: String,
    handle: C,
    active: bool,
}

impl<C> ContinuumRef<C> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn handle(&self) -> &C {
        &self.handle
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Which continuum group is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveGroup {
    /// Nothing has been activated yet, or everything was deactivated.
    None,

    /// Only the fluid continuum.
    Fluid,

    /// Only solid continua.
    Solids,

    /// The fluid and at least one solid. Never valid for a run.
    Both,
}

impl fmt::Display for ActiveGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "no continuum is",
            Self::Fluid => "the fluid is",
            Self::Solids => "the solids are",
            Self::Both => "fluid and solids are",
        })
    }
}

/// The fluid continuum and the ordered solid continua of one run.
///
/// A set only exists fully resolved: [`ContinuumSet::resolve`] fails on the
/// first name the engine does not know.
#[derive(Debug, Clone)]
pub struct ContinuumSet<C> {
    fluid: ContinuumRef<C>,
    solids: Vec<ContinuumRef<C>>,
}

impl<C> ContinuumSet<C> {
    /// Resolves every configured continuum name into an engine handle.
    ///
    /// All flags start inactive; they track what this set has requested, not
    /// the engine's prior state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContinuumNotFound`] for the first unknown name, or
    /// [`Error::Engine`] if the lookup itself fails.
    pub fn resolve<E>(engine: &E, names: &ContinuumNames) -> Result<Self, Error>
    where
        E: Engine<Continuum = C>,
    {
        let fluid = resolve_one(engine, &names.fluid)?;
        let solids = names
            .solids
            .iter()
            .map(|name| resolve_one(engine, name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fluid, solids })
    }

    /// Sets the fluid flag to `fluid_active` and every solid flag to
    /// `solids_active`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the engine rejects a change. Flags of
    /// continua already toggled keep their new value.
    pub fn set_active<E>(
        &mut self,
        engine: &mut E,
        fluid_active: bool,
        solids_active: bool,
    ) -> Result<(), Error>
    where
        E: Engine<Continuum = C>,
    {
        apply(engine, &mut self.fluid, fluid_active)?;
        for solid in &mut self.solids {
            apply(engine, solid, solids_active)?;
        }
        Ok(())
    }

    /// Returns the group that is currently active.
    #[must_use]
    pub fn active_group(&self) -> ActiveGroup {
        let any_solid = self.solids.iter().any(ContinuumRef::is_active);
        match (self.fluid.active, any_solid) {
            (false, false) => ActiveGroup::None,
            (true, false) => ActiveGroup::Fluid,
            (false, true) => ActiveGroup::Solids,
            (true, true) => ActiveGroup::Both,
        }
    }

    /// Returns `true` unless the fluid and a solid are active together.
    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        self.active_group() != ActiveGroup::Both
    }

    #[must_use]
    pub fn fluid(&self) -> &ContinuumRef<C> {
        &self.fluid
    }

    #[must_use]
    pub fn solids(&self) -> &[ContinuumRef<C>] {
        &self.solids
    }
}

fn resolve_one<E: Engine>(engine: &E, name: &str) -> Result<ContinuumRef<E::Continuum>, Error> {
    let handle = engine
        .resolve_continuum(name)
        .map_err(Error::engine)?
        .ok_or_else(|| Error::ContinuumNotFound {
            name: name.to_owned(),
        })?;

    debug!(continuum = name, "resolved continuum");

    Ok(ContinuumRef {
        name: name.to_owned(),
        handle,
        active: false,
    })
}

fn apply<E: Engine>(
    engine: &mut E,
    continuum: &mut ContinuumRef<E::Continuum>,
    active: bool,
) -> Result<(), Error> {
    engine
        .set_active(&continuum.handle, active)
        .map_err(Error::engine)?;
    continuum.active = active;
    Ok(())
}

//! Hardware resource ownership
//!
//! Each mode owns a fixed set of peripherals. The ledger records which mode
//! currently holds them and refuses a new owner until everything has been
//! released.

use crate::state::SystemState;

/// Bit set of arbitrated peripherals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResourceSet(u8);

impl ResourceSet {
    pub const EMPTY: Self = Self(0);
    pub const SAMPLING_TIMER: Self = Self(1 << 0);
    pub const ECHO_TIMER: Self = Self(1 << 1);
    pub const ADC: Self = Self(1 << 2);
    pub const SERVO: Self = Self(1 << 3);
    pub const TRIGGER: Self = Self(1 << 4);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Peripherals a mode needs while active
    pub const fn for_state(state: SystemState) -> Self {
        let ranging = Self::SAMPLING_TIMER
            .union(Self::ECHO_TIMER)
            .union(Self::SERVO)
            .union(Self::TRIGGER);

        match state {
            SystemState::ObjectDetector | SystemState::Telemeter | SystemState::Script => ranging,
            SystemState::LightDetector => Self::SAMPLING_TIMER.union(Self::ADC).union(Self::SERVO),
            SystemState::LightObjectDetector => ranging.union(Self::ADC),
        }
    }
}

/// Acquire refused because another mode still holds resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResourcesHeld {
    pub owner: SystemState,
    pub held: ResourceSet,
}

/// Record of the current resource owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResourceLedger {
    owner: Option<SystemState>,
    held: ResourceSet,
}

impl ResourceLedger {
    pub const fn new() -> Self {
        Self {
            owner: None,
            held: ResourceSet::EMPTY,
        }
    }

    pub fn owner(&self) -> Option<SystemState> {
        self.owner
    }

    pub fn held(&self) -> ResourceSet {
        self.held
    }

    /// Take ownership of a mode's resources
    pub fn acquire(&mut self, state: SystemState) -> Result<ResourceSet, ResourcesHeld> {
        if let Some(owner) = self.owner {
            return Err(ResourcesHeld {
                owner,
                held: self.held,
            });
        }
        let set = ResourceSet::for_state(state);
        self.owner = Some(state);
        self.held = set;
        Ok(set)
    }

    /// Give up everything, returning what was held
    pub fn release(&mut self) -> ResourceSet {
        let held = self.held;
        self.owner = None;
        self.held = ResourceSet::EMPTY;
        held
    }
}

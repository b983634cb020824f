//! Device constraints on operations

use crate::{Circuit, Operation, Result};
use std::fmt;
use std::time::Duration;

/// Hardware constraints a circuit must satisfy
pub trait Device: Send + Sync + fmt::Debug {
    /// Time the device needs to perform `op`
    fn duration_of(&self, op: &Operation) -> Duration;

    /// Reject operations the device cannot run
    fn validate_operation(&self, op: &Operation) -> Result<()>;

    /// Validate every operation of `circuit`
    fn validate_circuit(&self, circuit: &Circuit) -> Result<()> {
        circuit.validate()?;
        circuit
            .operations()
            .try_for_each(|op| self.validate_operation(op))
    }
}

/// A device with no constraints: every operation is allowed and instantaneous
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnconstrainedDevice;

/// Shared instance of [`UnconstrainedDevice`]
pub const UNCONSTRAINED_DEVICE: UnconstrainedDevice = UnconstrainedDevice;

impl Device for UnconstrainedDevice {
    fn duration_of(&self, _op: &Operation) -> Duration {
        Duration::ZERO
    }

    fn validate_operation(&self, _op: &Operation) -> Result<()> {
        Ok(())
    }
}

impl fmt::Display for UnconstrainedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNCONSTRAINED_DEVICE")
    }
}

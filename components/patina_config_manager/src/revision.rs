//! Juno board revision detection
//!
//! The Juno R0 board has no PCIe root complex. Everything the repository hides on that revision is decided from a
//! single [`JunoRevision`] value that a [`RevisionResolver`] produces once, when the repository is initialized.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use crate::error::ConfigManagerError;

/// Address of the V2M motherboard system identification register.
pub const ARM_VE_SYS_ID_REG: usize = 0x1C01_0000;

const SYS_ID_REV_SHIFT: u32 = 28;
const SYS_ID_REV_MASK: u32 = 0xF;

/// Juno board revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunoRevision {
    R0,
    R1,
    R2,
    /// A board revision this firmware does not recognize.
    Unknown,
}

impl JunoRevision {
    /// Decodes the board revision from the value of the system identification register.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigManagerError::RevisionUnavailable`] if the register reads as all ones, which is what an
    /// unresponsive register returns.
    pub const fn from_sys_id(sys_id: u32) -> Result<Self, ConfigManagerError> {
        if sys_id == u32::MAX {
            return Err(ConfigManagerError::RevisionUnavailable);
        }
        Ok(match (sys_id >> SYS_ID_REV_SHIFT) & SYS_ID_REV_MASK {
            0 => Self::R0,
            1 => Self::R1,
            2 => Self::R2,
            _ => Self::Unknown,
        })
    }

    /// Returns `true` if the board has a PCIe root complex. Only R0 does not.
    pub const fn has_pcie(self) -> bool {
        !matches!(self, Self::R0)
    }
}

impl core::fmt::Display for JunoRevision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::R0 => f.write_str("Juno R0"),
            Self::R1 => f.write_str("Juno R1"),
            Self::R2 => f.write_str("Juno R2"),
            Self::Unknown => f.write_str("Juno (unknown revision)"),
        }
    }
}

/// Detects the board revision.
///
/// Called exactly once, while the repository is initialized. An error is fatal to initialization.
pub trait RevisionResolver {
    fn detect(&self) -> Result<JunoRevision, ConfigManagerError>;
}

impl<F> RevisionResolver for F
where
    F: Fn() -> Result<JunoRevision, ConfigManagerError>,
{
    fn detect(&self) -> Result<JunoRevision, ConfigManagerError> {
        self()
    }
}

/// A resolver that always reports the same revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRevision(pub JunoRevision);

impl RevisionResolver for FixedRevision {
    fn detect(&self) -> Result<JunoRevision, ConfigManagerError> {
        Ok(self.0)
    }
}

/// Reads the board revision from the memory-mapped system identification register.
#[derive(Debug, Clone, Copy)]
pub struct SysIdRevisionResolver {
    sys_id_register: usize,
}

impl SysIdRevisionResolver {
    /// Creates a resolver for the register at `sys_id_register`.
    ///
    /// ## Safety
    ///
    /// `sys_id_register` must be the address of a readable, 32-bit aligned MMIO register for as long as the resolver
    /// is used.
    pub const unsafe fn new(sys_id_register: usize) -> Self {
        Self { sys_id_register }
    }

    /// Creates a resolver for the Juno motherboard register at [`ARM_VE_SYS_ID_REG`].
    ///
    /// ## Safety
    ///
    /// Must only be used on a Juno platform, where the register is always mapped.
    pub const unsafe fn juno() -> Self {
        // SAFETY: The caller guarantees this runs on a Juno board.
        unsafe { Self::new(ARM_VE_SYS_ID_REG) }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
impl RevisionResolver for SysIdRevisionResolver {
    fn detect(&self) -> Result<JunoRevision, ConfigManagerError> {
        // SAFETY: `new` requires the address to be a readable, aligned 32-bit register.
        let sys_id = unsafe { core::ptr::read_volatile(self.sys_id_register as *const u32) };
        log::debug!("SYS_ID = 0x{:08X}", sys_id);
        JunoRevision::from_sys_id(sys_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;
    use std::format;

    #[test]
    fn test_from_sys_id() {
        assert_eq!(JunoRevision::from_sys_id(0x0225_0F00), Ok(JunoRevision::R0));
        assert_eq!(JunoRevision::from_sys_id(0x1225_0F00), Ok(JunoRevision::R1));
        assert_eq!(JunoRevision::from_sys_id(0x2225_0F00), Ok(JunoRevision::R2));
        assert_eq!(JunoRevision::from_sys_id(0x7225_0F00), Ok(JunoRevision::Unknown));
    }

    #[test]
    fn test_from_sys_id_unresponsive_register() {
        assert_eq!(JunoRevision::from_sys_id(u32::MAX), Err(ConfigManagerError::RevisionUnavailable));
    }

    #[test]
    fn test_has_pcie() {
        assert!(!JunoRevision::R0.has_pcie());
        assert!(JunoRevision::R1.has_pcie());
        assert!(JunoRevision::R2.has_pcie());
        // Unrecognized boards are treated as later revisions.
        assert!(JunoRevision::Unknown.has_pcie());
    }

    #[test]
    fn test_fixed_revision() {
        assert_eq!(FixedRevision(JunoRevision::R2).detect(), Ok(JunoRevision::R2));
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = || -> Result<JunoRevision, ConfigManagerError> { Err(ConfigManagerError::RevisionUnavailable) };
        assert_eq!(resolver.detect(), Err(ConfigManagerError::RevisionUnavailable));
        let resolver = || JunoRevision::from_sys_id(0x1000_0000);
        assert_eq!(resolver.detect(), Ok(JunoRevision::R1));
    }

    #[test]
    fn test_sys_id_resolver_reads_register() {
        let register: u32 = 0x2225_0F00;
        // SAFETY: `register` is a live, aligned u32 for the duration of the test.
        let resolver = unsafe { SysIdRevisionResolver::new(&register as *const u32 as usize) };
        assert_eq!(resolver.detect(), Ok(JunoRevision::R2));
    }

    #[test]
    fn test_revision_display() {
        assert_eq!(format!("{}", JunoRevision::R0), "Juno R0");
        assert_eq!(format!("{}", JunoRevision::Unknown), "Juno (unknown revision)");
    }
}

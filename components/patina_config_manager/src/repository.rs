//! Platform repository
//!
//! The repository pairs the static description of the platform ([`PlatformRepositoryInfo`]) with the board
//! revision detected when the repository was initialized. It does no branching of its own; revision-dependent
//! views are decided by the dispatcher.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use crate::{
    cm_object::{
        CmArmBootArchInfo, CmArmGenericTimerInfo, CmArmGenericWatchdogInfo, CmArmGicCInfo, CmArmGicDInfo,
        CmArmGicMsiFrameInfo, CmArmPciConfigSpaceInfo, CmArmPowerManagementProfileInfo, CmArmSerialPortInfo,
        CmStdObjAcpiTableInfo, CmStdObjConfigurationManagerInfo,
    },
    error::ConfigManagerError,
    revision::{JunoRevision, RevisionResolver},
};

/// Number of ACPI tables described by the repository.
pub const ACPI_TABLE_COUNT: usize = 10;

/// Number of trailing ACPI table list entries that describe the PCIe root complex.
pub const PCIE_ACPI_TABLE_COUNT: usize = 2;

/// Number of processors, and so of GIC CPU interface entries.
pub const CPU_COUNT: usize = 6;

/// The platform description.
///
/// Every field is fixed at build time. The tables that only apply to boards with PCIe are the last
/// [`PCIE_ACPI_TABLE_COUNT`] entries of `acpi_table_list`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformRepositoryInfo {
    pub cm_info: CmStdObjConfigurationManagerInfo,
    pub acpi_table_list: [CmStdObjAcpiTableInfo; ACPI_TABLE_COUNT],
    pub boot_arch_info: CmArmBootArchInfo,
    pub pm_profile_info: CmArmPowerManagementProfileInfo,
    pub gicc_info: [CmArmGicCInfo; CPU_COUNT],
    pub gicd_info: CmArmGicDInfo,
    pub generic_timer_info: CmArmGenericTimerInfo,
    pub watchdog_info: CmArmGenericWatchdogInfo,
    pub spcr_serial_port: CmArmSerialPortInfo,
    pub dbg_serial_port: CmArmSerialPortInfo,
    pub pci_config_info: CmArmPciConfigSpaceInfo,
    pub gic_msi_frame_info: CmArmGicMsiFrameInfo,
}

/// The platform description together with the detected board revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformRepository<'a> {
    info: &'a PlatformRepositoryInfo,
    revision: JunoRevision,
}

impl<'a> PlatformRepository<'a> {
    /// Detects the board revision and builds the repository.
    ///
    /// ## Errors
    ///
    /// Propagates the resolver's error. A repository is never built without a revision.
    pub fn initialize(
        info: &'a PlatformRepositoryInfo,
        resolver: &impl RevisionResolver,
    ) -> Result<Self, ConfigManagerError> {
        let revision = resolver.detect().inspect_err(|e| log::error!("Failed to detect the board revision: {}", e))?;
        log::info!("{} detected", revision);
        Ok(Self::with_revision(info, revision))
    }

    /// Builds the repository for an already known revision.
    pub const fn with_revision(info: &'a PlatformRepositoryInfo, revision: JunoRevision) -> Self {
        Self { info, revision }
    }

    pub const fn revision(&self) -> JunoRevision {
        self.revision
    }

    pub const fn info(&self) -> &'a PlatformRepositoryInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{juno::JUNO_PLATFORM_REPOSITORY_INFO, revision::FixedRevision};
    use core::cell::Cell;

    #[test]
    fn test_initialize_records_revision() {
        for revision in [JunoRevision::R0, JunoRevision::R1, JunoRevision::R2, JunoRevision::Unknown] {
            let repository = PlatformRepository::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, &FixedRevision(revision))
                .expect("a fixed revision always resolves");
            assert_eq!(repository.revision(), revision);
            assert!(core::ptr::eq(repository.info(), &JUNO_PLATFORM_REPOSITORY_INFO));
        }
    }

    #[test]
    fn test_initialize_propagates_resolver_error() {
        let resolver = || -> Result<JunoRevision, ConfigManagerError> { Err(ConfigManagerError::RevisionUnavailable) };
        assert_eq!(
            PlatformRepository::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, &resolver),
            Err(ConfigManagerError::RevisionUnavailable)
        );
    }

    #[test]
    fn test_initialize_detects_once() {
        let calls = Cell::new(0);
        let resolver = || -> Result<JunoRevision, ConfigManagerError> {
            calls.set(calls.get() + 1);
            Ok(JunoRevision::R1)
        };
        let repository = PlatformRepository::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, &resolver).expect("resolves");
        assert_eq!(calls.get(), 1);
        let _ = repository.revision();
        let _ = repository.info();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let first = PlatformRepository::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, &FixedRevision(JunoRevision::R2))
            .expect("resolves");
        let second = PlatformRepository::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, &FixedRevision(JunoRevision::R2))
            .expect("resolves");
        assert_eq!(first, second);
    }

    #[test]
    fn test_with_revision_matches_initialize() {
        let detected = PlatformRepository::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, &FixedRevision(JunoRevision::R0))
            .expect("resolves");
        assert_eq!(detected, PlatformRepository::with_revision(&JUNO_PLATFORM_REPOSITORY_INFO, JunoRevision::R0));
    }
}

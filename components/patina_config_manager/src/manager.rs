//! Configuration Manager
//!
//! The query and update service consumed by the table generators. A manager only exists once its repository has
//! been initialized, after which every query is a read of immutable data.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use crate::{
    cm_object::CmObjectDescriptor,
    dispatch,
    error::ConfigManagerError,
    object::{CmObjectId, CmObjectToken},
    repository::{PlatformRepository, PlatformRepositoryInfo},
    revision::{JunoRevision, RevisionResolver},
};

/// Read-only Configuration Manager over a platform repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationManager<'a> {
    repository: PlatformRepository<'a>,
}

impl<'a> ConfigurationManager<'a> {
    /// Detects the board revision with `resolver` and creates a manager over `info`.
    ///
    /// ## Errors
    ///
    /// Propagates the resolver's error.
    pub fn initialize(
        info: &'a PlatformRepositoryInfo,
        resolver: &impl RevisionResolver,
    ) -> Result<Self, ConfigManagerError> {
        PlatformRepository::initialize(info, resolver).map(Self::new)
    }

    /// Creates a manager over an initialized repository.
    pub const fn new(repository: PlatformRepository<'a>) -> Self {
        Self { repository }
    }

    /// The board revision detected at initialization.
    pub const fn revision(&self) -> JunoRevision {
        self.repository.revision()
    }

    pub const fn repository(&self) -> &PlatformRepository<'a> {
        &self.repository
    }

    /// Returns a view of the object identified by `object_id`.
    ///
    /// ## Errors
    ///
    /// - [`ConfigManagerError::InvalidIdentity`] if the namespace of `object_id` does not exist.
    /// - [`ConfigManagerError::NotFound`] if the object is not registered or not present on this board revision.
    pub fn get_object(
        &self,
        object_id: CmObjectId,
        token: CmObjectToken,
    ) -> Result<CmObjectDescriptor<'a>, ConfigManagerError> {
        dispatch::resolve(&self.repository, object_id, token)
    }

    /// Updates an object. The repository is read-only, so this always fails.
    ///
    /// ## Errors
    ///
    /// Always returns [`ConfigManagerError::Unsupported`].
    pub fn set_object(
        &self,
        object_id: CmObjectId,
        _token: CmObjectToken,
        _descriptor: &CmObjectDescriptor<'_>,
    ) -> Result<(), ConfigManagerError> {
        log::debug!("Rejected update of object {}", object_id);
        Err(ConfigManagerError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cm_object::CmObject,
        juno::JUNO_PLATFORM_REPOSITORY_INFO,
        object::{ArmObjectId, CM_NULL_TOKEN, StdObjectId},
        repository::ACPI_TABLE_COUNT,
        revision::FixedRevision,
    };

    fn manager(revision: JunoRevision) -> ConfigurationManager<'static> {
        ConfigurationManager::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, &FixedRevision(revision))
            .expect("a fixed revision always resolves")
    }

    #[test]
    fn test_initialize_failure_yields_no_manager() {
        let resolver = || -> Result<JunoRevision, ConfigManagerError> { Err(ConfigManagerError::RevisionUnavailable) };
        assert_eq!(
            ConfigurationManager::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, &resolver),
            Err(ConfigManagerError::RevisionUnavailable)
        );
    }

    #[test]
    fn test_revision_is_reported() {
        assert_eq!(manager(JunoRevision::R0).revision(), JunoRevision::R0);
        assert_eq!(manager(JunoRevision::R2).revision(), JunoRevision::R2);
        assert_eq!(manager(JunoRevision::R2).repository().revision(), JunoRevision::R2);
    }

    #[test]
    fn test_get_cfg_mgr_info() {
        let descriptor = manager(JunoRevision::R1)
            .get_object(CmObjectId::standard(StdObjectId::CfgMgrInfo), CM_NULL_TOKEN)
            .expect("configuration manager info is registered");
        let CmObject::ConfigurationManagerInfo(info) = descriptor.object() else {
            panic!("unexpected view {:?}", descriptor.object());
        };
        assert_eq!(info.oem_id, *b"ARMLTD");
        assert_eq!(info.revision, 0x0001_0000);
    }

    #[test]
    fn test_r0_table_list_drops_pcie_tables() {
        let id = CmObjectId::standard(StdObjectId::AcpiTableList);
        let r0 = manager(JunoRevision::R0).get_object(id, CM_NULL_TOKEN).expect("resolves on R0");
        let r1 = manager(JunoRevision::R1).get_object(id, CM_NULL_TOKEN).expect("resolves on R1");
        assert_eq!(r0.count(), ACPI_TABLE_COUNT - 2);
        assert_eq!(r1.count(), ACPI_TABLE_COUNT);
    }

    #[test]
    fn test_r0_pci_config_space_not_found() {
        let id = CmObjectId::arm(ArmObjectId::PciConfigSpaceInfo);
        assert_eq!(manager(JunoRevision::R0).get_object(id, CM_NULL_TOKEN), Err(ConfigManagerError::NotFound));
        assert!(manager(JunoRevision::R1).get_object(id, CM_NULL_TOKEN).is_ok());
    }

    #[test]
    fn test_oem_object_not_found() {
        assert_eq!(
            manager(JunoRevision::R1).get_object(CmObjectId::oem(0), CM_NULL_TOKEN),
            Err(ConfigManagerError::NotFound)
        );
    }

    #[test]
    fn test_unknown_namespace_invalid_identity() {
        assert_eq!(
            manager(JunoRevision::R1).get_object(CmObjectId::from(0x4000_0001), CM_NULL_TOKEN),
            Err(ConfigManagerError::InvalidIdentity)
        );
    }

    #[test]
    fn test_set_object_is_unsupported() {
        let manager = manager(JunoRevision::R1);
        let id = CmObjectId::arm(ArmObjectId::BootArchInfo);
        let descriptor = manager.get_object(id, CM_NULL_TOKEN).expect("boot arch info is registered");

        // Registered, unregistered and invalid identities are all rejected the same way.
        assert_eq!(manager.set_object(id, CM_NULL_TOKEN, &descriptor), Err(ConfigManagerError::Unsupported));
        assert_eq!(
            manager.set_object(CmObjectId::oem(7), CM_NULL_TOKEN, &descriptor),
            Err(ConfigManagerError::Unsupported)
        );
        assert_eq!(
            manager.set_object(CmObjectId::from(0xF000_0000), 42, &descriptor),
            Err(ConfigManagerError::Unsupported)
        );

        // Nothing changed.
        assert_eq!(manager.get_object(id, CM_NULL_TOKEN), Ok(descriptor));
    }

    #[test]
    fn test_manager_is_sync() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<ConfigurationManager<'static>>();
    }
}

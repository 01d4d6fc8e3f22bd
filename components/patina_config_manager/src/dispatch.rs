//! Namespace dispatch
//!
//! Resolves an object identifier to a view into the repository. Each namespace owns a closed table of
//! [`ObjectEntry`] values, built at compile time, that maps an object kind to an accessor. An accessor returns `None`
//! when the record does not exist on the detected board revision.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use crate::{
    cm_object::{CmObject, CmObjectDescriptor},
    error::ConfigManagerError,
    object::{ArmObjectId, CmObjectId, CmObjectToken, Namespace, StdObjectId},
    repository::{ACPI_TABLE_COUNT, PCIE_ACPI_TABLE_COUNT, PlatformRepository, PlatformRepositoryInfo},
    revision::JunoRevision,
};

/// Returns the view of a record, or `None` if the record is absent on the given revision.
pub type ObjectAccessor = for<'a> fn(&'a PlatformRepositoryInfo, JunoRevision) -> Option<CmObject<'a>>;

/// Maps an object kind to its accessor.
#[derive(Clone, Copy)]
pub struct ObjectEntry {
    pub kind: u8,
    pub name: &'static str,
    pub accessor: ObjectAccessor,
}

impl ObjectEntry {
    const fn new(kind: u8, name: &'static str, accessor: ObjectAccessor) -> Self {
        Self { kind, name, accessor }
    }
}

impl core::fmt::Debug for ObjectEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectEntry").field("kind", &self.kind).field("name", &self.name).finish()
    }
}

// Accessors for records that are present on every revision.
macro_rules! fixed_accessor {
    ($name:ident, $variant:ident, $field:ident) => {
        fn $name(info: &PlatformRepositoryInfo, _revision: JunoRevision) -> Option<CmObject<'_>> {
            Some(CmObject::$variant(&info.$field))
        }
    };
}

fixed_accessor!(cm_info, ConfigurationManagerInfo, cm_info);
fixed_accessor!(boot_arch_info, BootArchInfo, boot_arch_info);
fixed_accessor!(pm_profile_info, PowerManagementProfileInfo, pm_profile_info);
fixed_accessor!(gicc_info, GicCInfo, gicc_info);
fixed_accessor!(gicd_info, GicDInfo, gicd_info);
fixed_accessor!(gic_msi_frame_info, GicMsiFrameInfo, gic_msi_frame_info);
fixed_accessor!(console_port_info, SerialConsolePortInfo, spcr_serial_port);
fixed_accessor!(debug_port_info, SerialDebugPortInfo, dbg_serial_port);
fixed_accessor!(generic_timer_info, GenericTimerInfo, generic_timer_info);
fixed_accessor!(watchdog_info, PlatformGenericWatchdogInfo, watchdog_info);

/// Number of ACPI tables to report for a revision.
pub const fn acpi_table_count(revision: JunoRevision) -> usize {
    if revision.has_pcie() { ACPI_TABLE_COUNT } else { ACPI_TABLE_COUNT - PCIE_ACPI_TABLE_COUNT }
}

fn acpi_table_list(info: &PlatformRepositoryInfo, revision: JunoRevision) -> Option<CmObject<'_>> {
    let tables = &info.acpi_table_list[..acpi_table_count(revision)];
    log::debug!("ACPI table list at {:p}, {} tables", tables.as_ptr(), tables.len());
    Some(CmObject::AcpiTableList(tables))
}

fn pci_config_info(info: &PlatformRepositoryInfo, revision: JunoRevision) -> Option<CmObject<'_>> {
    if !revision.has_pcie() {
        log::info!("PCI configuration space is not present on {}", revision);
        return None;
    }
    let pci = &info.pci_config_info;
    log::debug!("PCI configuration space info at {:p}, {} bytes", pci, core::mem::size_of_val(pci));
    Some(CmObject::PciConfigSpaceInfo(pci))
}

/// Standard namespace objects.
pub const STANDARD_OBJECTS: &[ObjectEntry] = &[
    ObjectEntry::new(StdObjectId::CfgMgrInfo as u8, "CfgMgrInfo", cm_info),
    ObjectEntry::new(StdObjectId::AcpiTableList as u8, "AcpiTableList", acpi_table_list),
];

/// ARM namespace objects.
pub const ARM_OBJECTS: &[ObjectEntry] = &[
    ObjectEntry::new(ArmObjectId::BootArchInfo as u8, "BootArchInfo", boot_arch_info),
    ObjectEntry::new(ArmObjectId::PowerManagementProfileInfo as u8, "PowerManagementProfileInfo", pm_profile_info),
    ObjectEntry::new(ArmObjectId::GicCInfo as u8, "GicCInfo", gicc_info),
    ObjectEntry::new(ArmObjectId::GicDInfo as u8, "GicDInfo", gicd_info),
    ObjectEntry::new(ArmObjectId::GicMsiFrameInfo as u8, "GicMsiFrameInfo", gic_msi_frame_info),
    ObjectEntry::new(ArmObjectId::SerialConsolePortInfo as u8, "SerialConsolePortInfo", console_port_info),
    ObjectEntry::new(ArmObjectId::SerialDebugPortInfo as u8, "SerialDebugPortInfo", debug_port_info),
    ObjectEntry::new(ArmObjectId::GenericTimerInfo as u8, "GenericTimerInfo", generic_timer_info),
    ObjectEntry::new(ArmObjectId::PlatformGenericWatchdogInfo as u8, "PlatformGenericWatchdogInfo", watchdog_info),
    ObjectEntry::new(ArmObjectId::PciConfigSpaceInfo as u8, "PciConfigSpaceInfo", pci_config_info),
];

/// OEM namespace objects. None are registered.
pub const OEM_OBJECTS: &[ObjectEntry] = &[];

const fn kinds_are_unique(entries: &[ObjectEntry]) -> bool {
    let mut i = 0;
    while i < entries.len() {
        let mut j = i + 1;
        while j < entries.len() {
            if entries[i].kind == entries[j].kind {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(kinds_are_unique(STANDARD_OBJECTS), "duplicate standard object kind");
const _: () = assert!(kinds_are_unique(ARM_OBJECTS), "duplicate ARM object kind");
const _: () = assert!(kinds_are_unique(OEM_OBJECTS), "duplicate OEM object kind");

/// Returns the object table of a namespace.
pub const fn objects(namespace: Namespace) -> &'static [ObjectEntry] {
    match namespace {
        Namespace::Standard => STANDARD_OBJECTS,
        Namespace::Arm => ARM_OBJECTS,
        Namespace::Oem => OEM_OBJECTS,
    }
}

/// Resolves `object_id` to a view into `repository`.
///
/// The token is accepted for every object and ignored: each record is either a singleton or returned as a whole
/// array.
///
/// ## Errors
///
/// - [`ConfigManagerError::InvalidIdentity`] if the identifier's namespace does not exist.
/// - [`ConfigManagerError::NotFound`] if the kind is not registered in the namespace, or the record is not present
///   on the detected board revision.
pub fn resolve<'a>(
    repository: &PlatformRepository<'a>,
    object_id: CmObjectId,
    _token: CmObjectToken,
) -> Result<CmObjectDescriptor<'a>, ConfigManagerError> {
    let namespace = object_id
        .namespace()
        .inspect_err(|_| log::error!("Unknown namespace {:#x} in object id {}", object_id.raw_namespace(), object_id))?;

    let Some(entry) = objects(namespace).iter().find(|entry| entry.kind == object_id.object()) else {
        match namespace {
            Namespace::Arm => log::info!("Arm object {:#x} not found", object_id.object()),
            Namespace::Standard | Namespace::Oem => {
                log::error!("{:?} object {:#x} not found", namespace, object_id.object())
            }
        }
        return Err(ConfigManagerError::NotFound);
    };

    let object = (entry.accessor)(repository.info(), repository.revision()).ok_or(ConfigManagerError::NotFound)?;
    log::debug!("{} = {:p}, {} bytes, {} records", entry.name, object.as_ptr(), object.size(), object.count());
    Ok(CmObjectDescriptor::new(object_id, object))
}

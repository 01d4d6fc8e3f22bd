//! Configuration Manager object records and views
//!
//! The records in this module describe the platform hardware consumed by the ACPI table generators. They are
//! `repr(C)` so that the same memory can be handed to C consumers through the Configuration Manager protocol.
//!
//! A successful query returns a [`CmObjectDescriptor`], a borrowed, typed view into repository memory. A view never
//! copies the record it describes and cannot outlive the repository it was obtained from.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use core::ffi::c_void;

use crate::{
    acpi::{AcpiDescriptionHeader, GIC_ENABLED, TableGeneratorId},
    object::CmObjectId,
};

/// Builds a configuration manager revision value.
pub const fn create_revision(major: u16, minor: u16) -> u32 {
    ((major as u32) << 16) | minor as u32
}

/// Builds an MPIDR affinity value for a core in a cluster.
pub const fn get_mpid(cluster: u64, core: u64) -> u64 {
    (cluster << 8) | core
}

/// Configuration Manager information.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmStdObjConfigurationManagerInfo {
    pub revision: u32,
    pub oem_id: [u8; 6],
}

/// An ACPI table to be installed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmStdObjAcpiTableInfo {
    pub acpi_table_signature: u32,
    pub table_generator_id: TableGeneratorId,
    /// A pre-built table to install verbatim, or `None` when the generator builds the table from repository data.
    pub acpi_table_data: Option<&'static AcpiDescriptionHeader>,
}

impl CmStdObjAcpiTableInfo {
    /// Describes a table that the generator synthesizes from repository data.
    pub const fn generated(acpi_table_signature: u32, table_generator_id: TableGeneratorId) -> Self {
        Self { acpi_table_signature, table_generator_id, acpi_table_data: None }
    }

    /// Describes a pre-built table.
    pub const fn prebuilt(
        acpi_table_signature: u32,
        table_generator_id: TableGeneratorId,
        table: &'static AcpiDescriptionHeader,
    ) -> Self {
        Self { acpi_table_signature, table_generator_id, acpi_table_data: Some(table) }
    }

    /// Returns `true` if the table is installed from a pre-built blob.
    pub const fn is_prebuilt(&self) -> bool {
        self.acpi_table_data.is_some()
    }
}

/// Boot architecture information.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmBootArchInfo {
    pub boot_arch_flags: u16,
}

/// Power management profile information.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmPowerManagementProfileInfo {
    pub power_management_profile: u8,
}

/// GIC CPU interface information, one entry per processor.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmGicCInfo {
    pub cpu_interface_number: u32,
    pub acpi_processor_uid: u32,
    pub flags: u32,
    pub parking_protocol_version: u32,
    pub performance_interrupt_gsiv: u32,
    pub parked_address: u64,
    pub physical_base_address: u64,
    pub gicv: u64,
    pub gich: u64,
    pub vgic_maintenance_interrupt: u32,
    pub gicr_base_address: u64,
    pub mpidr: u64,
    pub processor_power_efficiency_class: u8,
}

impl CmArmGicCInfo {
    /// Describes an enabled GICv2 CPU interface.
    ///
    /// The ACPI processor UID is the CPU interface number, and the interface, virtual and hypervisor frames are
    /// the ones given by `frames` (`[gicc, gicv, gich]`).
    pub const fn new(
        cpu_interface_number: u32,
        mpidr: u64,
        pmu_irq: u32,
        vgic_irq: u32,
        energy_efficiency: u8,
        frames: [u64; 3],
    ) -> Self {
        Self {
            cpu_interface_number,
            acpi_processor_uid: cpu_interface_number,
            flags: GIC_ENABLED,
            parking_protocol_version: 0,
            performance_interrupt_gsiv: pmu_irq,
            parked_address: 0,
            physical_base_address: frames[0],
            gicv: frames[1],
            gich: frames[2],
            vgic_maintenance_interrupt: vgic_irq,
            gicr_base_address: 0,
            mpidr,
            processor_power_efficiency_class: energy_efficiency,
        }
    }
}

/// GIC distributor information.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmGicDInfo {
    pub gic_id: u32,
    pub physical_base_address: u64,
    pub system_vector_base: u32,
    pub gic_version: u8,
}

/// GIC MSI frame information.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmGicMsiFrameInfo {
    pub gic_msi_frame_id: u32,
    pub physical_base_address: u64,
    /// Flags as described by the GIC MSI frame structure of the MADT.
    pub flags: u32,
    pub spi_count: u16,
    pub spi_base: u16,
}

/// Serial port information, used for both the console and the debug port.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmSerialPortInfo {
    pub base_address: u64,
    pub interrupt: u32,
    pub baud_rate: u64,
    pub clock: u32,
    pub port_subtype: u16,
}

/// Architectural generic timer information.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmGenericTimerInfo {
    pub counter_control_base_address: u64,
    pub counter_read_base_address: u64,
    pub secure_pl1_timer_gsiv: u32,
    pub secure_pl1_timer_flags: u32,
    pub non_secure_pl1_timer_gsiv: u32,
    pub non_secure_pl1_timer_flags: u32,
    pub virtual_timer_gsiv: u32,
    pub virtual_timer_flags: u32,
    pub non_secure_pl2_timer_gsiv: u32,
    pub non_secure_pl2_timer_flags: u32,
}

/// SBSA generic watchdog information.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmGenericWatchdogInfo {
    pub control_frame_address: u64,
    pub refresh_frame_address: u64,
    pub timer_gsiv: u32,
    pub flags: u32,
}

/// PCI configuration space (ECAM) information.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmArmPciConfigSpaceInfo {
    pub base_address: u64,
    pub pci_segment_group_number: u16,
    pub start_bus_number: u8,
    pub end_bus_number: u8,
}

// Declares `CmObject` with one variant per record kind. `single` variants borrow one record, `array` variants
// borrow a sequence of records.
macro_rules! cm_objects {
    (
        single { $( $(#[$smeta:meta])* $single:ident($sty:ty) ),+ $(,)? }
        array { $( $(#[$ameta:meta])* $array:ident($aty:ty) ),+ $(,)? }
    ) => {
        /// A borrowed, typed view of repository data.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum CmObject<'a> {
            $( $(#[$smeta])* $single(&'a $sty), )+
            $( $(#[$ameta])* $array(&'a [$aty]), )+
        }

        impl CmObject<'_> {
            /// Size of the viewed data in bytes.
            pub fn size(&self) -> usize {
                match self {
                    $( Self::$single(record) => core::mem::size_of_val(*record), )+
                    $( Self::$array(records) => core::mem::size_of_val(*records), )+
                }
            }

            /// Number of records in the view.
            pub fn count(&self) -> usize {
                match self {
                    $( Self::$single(_) => 1, )+
                    $( Self::$array(records) => records.len(), )+
                }
            }

            /// Address of the first viewed record.
            pub fn as_ptr(&self) -> *const c_void {
                match self {
                    $( Self::$single(record) => *record as *const $sty as *const c_void, )+
                    $( Self::$array(records) => records.as_ptr() as *const c_void, )+
                }
            }
        }
    };
}

cm_objects! {
    single {
        ConfigurationManagerInfo(CmStdObjConfigurationManagerInfo),
        BootArchInfo(CmArmBootArchInfo),
        PowerManagementProfileInfo(CmArmPowerManagementProfileInfo),
        GicDInfo(CmArmGicDInfo),
        GicMsiFrameInfo(CmArmGicMsiFrameInfo),
        SerialConsolePortInfo(CmArmSerialPortInfo),
        SerialDebugPortInfo(CmArmSerialPortInfo),
        GenericTimerInfo(CmArmGenericTimerInfo),
        PlatformGenericWatchdogInfo(CmArmGenericWatchdogInfo),
        PciConfigSpaceInfo(CmArmPciConfigSpaceInfo),
    }
    array {
        /// The ACPI tables to install, possibly a prefix of the full list.
        AcpiTableList(CmStdObjAcpiTableInfo),
        /// One entry per processor.
        GicCInfo(CmArmGicCInfo),
    }
}

/// The result of a successful object query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmObjectDescriptor<'a> {
    object_id: CmObjectId,
    object: CmObject<'a>,
}

impl<'a> CmObjectDescriptor<'a> {
    /// Creates a descriptor for the object returned for `object_id`.
    pub const fn new(object_id: CmObjectId, object: CmObject<'a>) -> Self {
        Self { object_id, object }
    }

    /// The identifier the object was requested with.
    pub const fn object_id(&self) -> CmObjectId {
        self.object_id
    }

    /// The typed view.
    pub const fn object(&self) -> CmObject<'a> {
        self.object
    }

    /// Size of the viewed data in bytes.
    pub fn size(&self) -> usize {
        self.object.size()
    }

    /// Number of records in the view.
    pub fn count(&self) -> usize {
        self.object.count()
    }

    /// Address of the viewed data.
    pub fn as_ptr(&self) -> *const c_void {
        self.object.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::StdObjectId;
    use core::mem::size_of;

    const FRAMES: [u64; 3] = [0x2C02_F000, 0x2C06_F000, 0x2C04_F000];

    #[test]
    fn test_create_revision() {
        assert_eq!(create_revision(1, 0), 0x0001_0000);
        assert_eq!(create_revision(2, 3), 0x0002_0003);
    }

    #[test]
    fn test_get_mpid() {
        assert_eq!(get_mpid(0, 0), 0x000);
        assert_eq!(get_mpid(1, 3), 0x103);
    }

    #[test]
    fn test_gicc_entry_defaults() {
        let gicc = CmArmGicCInfo::new(2, get_mpid(1, 0), 50, 25, 0, FRAMES);
        assert_eq!(gicc.cpu_interface_number, 2);
        assert_eq!(gicc.acpi_processor_uid, 2);
        assert_eq!(gicc.flags, GIC_ENABLED);
        assert_eq!(gicc.performance_interrupt_gsiv, 50);
        assert_eq!(gicc.vgic_maintenance_interrupt, 25);
        assert_eq!(gicc.physical_base_address, FRAMES[0]);
        assert_eq!(gicc.gicv, FRAMES[1]);
        assert_eq!(gicc.gich, FRAMES[2]);
        assert_eq!(gicc.gicr_base_address, 0);
        assert_eq!(gicc.mpidr, 0x100);
    }

    #[test]
    fn test_acpi_table_info_prebuilt_flag() {
        static HEADER: AcpiDescriptionHeader = AcpiDescriptionHeader::new(0, 0, [0; 6], 0, 0, 0, 0);
        assert!(!CmStdObjAcpiTableInfo::generated(1, 2).is_prebuilt());
        assert!(CmStdObjAcpiTableInfo::prebuilt(1, 2, &HEADER).is_prebuilt());
    }

    #[test]
    fn test_acpi_table_info_is_pointer_sized_data() {
        // The table data reference must stay a plain nullable pointer for C consumers.
        assert_eq!(size_of::<Option<&'static AcpiDescriptionHeader>>(), size_of::<*const AcpiDescriptionHeader>());
    }

    #[test]
    fn test_single_view_size_and_count() {
        let info = CmArmBootArchInfo { boot_arch_flags: 1 };
        let object = CmObject::BootArchInfo(&info);
        assert_eq!(object.size(), size_of::<CmArmBootArchInfo>());
        assert_eq!(object.count(), 1);
        assert_eq!(object.as_ptr(), &info as *const CmArmBootArchInfo as *const c_void);
    }

    #[test]
    fn test_array_view_size_and_count() {
        let entries = [
            CmArmGicCInfo::new(0, get_mpid(0, 0), 34, 25, 1, FRAMES),
            CmArmGicCInfo::new(1, get_mpid(0, 1), 38, 25, 1, FRAMES),
        ];
        let object = CmObject::GicCInfo(&entries);
        assert_eq!(object.size(), 2 * size_of::<CmArmGicCInfo>());
        assert_eq!(object.count(), 2);
        assert_eq!(object.as_ptr(), entries.as_ptr() as *const c_void);
    }

    #[test]
    fn test_array_view_of_prefix_keeps_pointer() {
        let tables = [
            CmStdObjAcpiTableInfo::generated(1, 1),
            CmStdObjAcpiTableInfo::generated(2, 2),
            CmStdObjAcpiTableInfo::generated(3, 3),
        ];
        let full = CmObject::AcpiTableList(&tables);
        let prefix = CmObject::AcpiTableList(&tables[..1]);
        assert_eq!(full.as_ptr(), prefix.as_ptr());
        assert_eq!(prefix.count(), 1);
        assert_eq!(prefix.size(), size_of::<CmStdObjAcpiTableInfo>());
    }

    #[test]
    fn test_descriptor_accessors() {
        let info = CmStdObjConfigurationManagerInfo { revision: create_revision(1, 0), oem_id: *b"ARMLTD" };
        let id = CmObjectId::standard(StdObjectId::CfgMgrInfo);
        let descriptor = CmObjectDescriptor::new(id, CmObject::ConfigurationManagerInfo(&info));
        assert_eq!(descriptor.object_id(), id);
        assert_eq!(descriptor.size(), size_of::<CmStdObjConfigurationManagerInfo>());
        assert_eq!(descriptor.count(), 1);
        assert!(matches!(descriptor.object(), CmObject::ConfigurationManagerInfo(i) if i.oem_id == *b"ARMLTD"));
    }

    #[test]
    fn test_serial_port_variants_are_distinct() {
        let port = CmArmSerialPortInfo { base_address: 0, interrupt: 0, baud_rate: 0, clock: 0, port_subtype: 0 };
        assert_ne!(CmObject::SerialConsolePortInfo(&port), CmObject::SerialDebugPortInfo(&port));
    }
}

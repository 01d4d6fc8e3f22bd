//! Juno platform repository
//!
//! Board description of the ARM Juno development platform (R0, R1 and R2). The values below are fixed at build
//! time. Only the board revision is read at runtime, through a [`RevisionResolver`].
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use crate::{
    acpi::{
        ARM_PSCI_COMPLIANT, AcpiDescriptionHeader, AmlDefinitionBlock, DBG2_PORT_SUBTYPE_SERIAL_ARM_PL011_UART,
        DBG2_SIGNATURE, DSDT_SIGNATURE, FADT_SIGNATURE, GTDT_SIGNATURE, GTDT_TIMER_ACTIVE_LOW,
        GTDT_TIMER_LEVEL_TRIGGERED, MADT_SIGNATURE, MCFG_SIGNATURE, PM_PROFILE_MOBILE, SPCR_SIGNATURE, SSDT_SIGNATURE,
        StdAcpiTableId, acpi_signature, create_std_acpi_table_gen_id,
    },
    cm_object::{
        CmArmBootArchInfo, CmArmGenericTimerInfo, CmArmGenericWatchdogInfo, CmArmGicCInfo, CmArmGicDInfo,
        CmArmGicMsiFrameInfo, CmArmPciConfigSpaceInfo, CmArmPowerManagementProfileInfo, CmArmSerialPortInfo,
        CmStdObjAcpiTableInfo, CmStdObjConfigurationManagerInfo, create_revision, get_mpid,
    },
    error::ConfigManagerError,
    manager::ConfigurationManager,
    repository::{ACPI_TABLE_COUNT, PCIE_ACPI_TABLE_COUNT, PlatformRepositoryInfo},
    revision::RevisionResolver,
};

/// Revision of the Juno configuration data.
pub const CONFIGURATION_MANAGER_REVISION: u32 = create_revision(1, 0);
pub const CFG_MGR_OEM_ID: [u8; 6] = *b"ARMLTD";
pub const CFG_MGR_OEM_TABLE_ID: u64 = u64::from_le_bytes(*b"ARM-JUNO");
pub const CFG_MGR_OEM_REVISION: u32 = 0x2018_0316;

// GIC-400
pub const GICD_BASE: u64 = 0x2C01_0000;
pub const GICC_BASE: u64 = 0x2C02_F000;
pub const GICH_BASE: u64 = 0x2C04_F000;
pub const GICV_BASE: u64 = 0x2C06_F000;
pub const GIC_VERSION: u8 = 2;
pub const VGIC_MAINTENANCE_IRQ: u32 = 25;

// GICv2m
pub const GICV2M_MSI_BASE: u64 = 0x2C1C_0000;
pub const GICV2M_SPI_COUNT: u16 = 127;
pub const GICV2M_SPI_BASE: u16 = 224;

// Generic timer
pub const SYSTEM_COUNTER_BASE_ADDRESS: u64 = 0x2A43_0000;
pub const SYSTEM_COUNTER_READ_BASE: u64 = 0x2A80_0000;
pub const ARCH_TIMER_SEC_IRQ: u32 = 29;
pub const ARCH_TIMER_IRQ: u32 = 30;
pub const ARCH_TIMER_VIRT_IRQ: u32 = 27;
pub const ARCH_TIMER_HYP_IRQ: u32 = 26;
pub const GTDT_GTIMER_FLAGS: u32 = GTDT_TIMER_ACTIVE_LOW | GTDT_TIMER_LEVEL_TRIGGERED;

// SBSA watchdog, non-secure, level triggered, active high
pub const GENERIC_WATCHDOG_CONTROL_BASE: u64 = 0x2A44_0000;
pub const GENERIC_WATCHDOG_REFRESH_BASE: u64 = 0x2A45_0000;
pub const GENERIC_WATCHDOG_EL2_IRQ: u32 = 93;
pub const SBSA_WATCHDOG_FLAGS: u32 = 0;

// SoC UART0, used as the console
pub const SERIAL_REGISTER_BASE: u64 = 0x7FF8_0000;
pub const PL011_UART_INTERRUPT: u32 = 115;
pub const UART_DEFAULT_BAUD_RATE: u64 = 115_200;
pub const PL011_UART_CLK_IN_HZ: u32 = 7_372_800;

// Motherboard UART0, used as the debug port
pub const SERIAL_DBG_REGISTER_BASE: u64 = 0x1C09_0000;
pub const SERIAL_DBG_INTERRUPT: u32 = 38;
pub const SERIAL_DBG_UART_BAUD_RATE: u64 = 115_200;
pub const SERIAL_DBG_UART_CLK_IN_HZ: u32 = 24_000_000;

// PCIe root complex (R1 and R2 only)
pub const PCI_CONFIGURATION_SPACE_BASE_ADDRESS: u64 = 0x4000_0000;
pub const PCI_BUS_MIN: u8 = 0;
pub const PCI_BUS_MAX: u8 = 255;

const ASL_COMPILER_ID: u32 = acpi_signature(b"INTL");
const ASL_COMPILER_REVISION: u32 = 0x2018_0629;

const GIC_FRAMES: [u64; 3] = [GICC_BASE, GICV_BASE, GICH_BASE];

const fn definition_block_header(signature: u32) -> AcpiDescriptionHeader {
    AcpiDescriptionHeader::new(
        signature,
        2,
        CFG_MGR_OEM_ID,
        CFG_MGR_OEM_TABLE_ID,
        CFG_MGR_OEM_REVISION,
        ASL_COMPILER_ID,
        ASL_COMPILER_REVISION,
    )
}

// Scope (\_SB) { Device (CP00) .. Device (CP05) { Name (_HID, "ACPI0007") Name (_UID, n) } }
const DSDT_AML: [u8; 180] = [
    0x10, 0x43, 0x0B, 0x5C, 0x5F, 0x53, 0x42, 0x5F, 0x5B, 0x82, 0x1A, 0x43, 0x50, 0x30, 0x30, 0x08,
    0x5F, 0x48, 0x49, 0x44, 0x0D, 0x41, 0x43, 0x50, 0x49, 0x30, 0x30, 0x30, 0x37, 0x00, 0x08, 0x5F,
    0x55, 0x49, 0x44, 0x00, 0x5B, 0x82, 0x1A, 0x43, 0x50, 0x30, 0x31, 0x08, 0x5F, 0x48, 0x49, 0x44,
    0x0D, 0x41, 0x43, 0x50, 0x49, 0x30, 0x30, 0x30, 0x37, 0x00, 0x08, 0x5F, 0x55, 0x49, 0x44, 0x01,
    0x5B, 0x82, 0x1B, 0x43, 0x50, 0x30, 0x32, 0x08, 0x5F, 0x48, 0x49, 0x44, 0x0D, 0x41, 0x43, 0x50,
    0x49, 0x30, 0x30, 0x30, 0x37, 0x00, 0x08, 0x5F, 0x55, 0x49, 0x44, 0x0A, 0x02, 0x5B, 0x82, 0x1B,
    0x43, 0x50, 0x30, 0x33, 0x08, 0x5F, 0x48, 0x49, 0x44, 0x0D, 0x41, 0x43, 0x50, 0x49, 0x30, 0x30,
    0x30, 0x37, 0x00, 0x08, 0x5F, 0x55, 0x49, 0x44, 0x0A, 0x03, 0x5B, 0x82, 0x1B, 0x43, 0x50, 0x30,
    0x34, 0x08, 0x5F, 0x48, 0x49, 0x44, 0x0D, 0x41, 0x43, 0x50, 0x49, 0x30, 0x30, 0x30, 0x37, 0x00,
    0x08, 0x5F, 0x55, 0x49, 0x44, 0x0A, 0x04, 0x5B, 0x82, 0x1B, 0x43, 0x50, 0x30, 0x35, 0x08, 0x5F,
    0x48, 0x49, 0x44, 0x0D, 0x41, 0x43, 0x50, 0x49, 0x30, 0x30, 0x30, 0x37, 0x00, 0x08, 0x5F, 0x55,
    0x49, 0x44, 0x0A, 0x05,
];

// Scope (\_SB) { Device (USB0) { EHCI at 0x7FFC0000, interrupt 149 } }
const SSDT_USB_AML: [u8; 73] = [
    0x10, 0x48, 0x04, 0x5C, 0x5F, 0x53, 0x42, 0x5F, 0x5B, 0x82, 0x3F, 0x55, 0x53, 0x42, 0x30, 0x08,
    0x5F, 0x48, 0x49, 0x44, 0x0D, 0x50, 0x4E, 0x50, 0x30, 0x44, 0x32, 0x30, 0x00, 0x08, 0x5F, 0x55,
    0x49, 0x44, 0x00, 0x08, 0x5F, 0x43, 0x43, 0x41, 0x00, 0x08, 0x5F, 0x43, 0x52, 0x53, 0x11, 0x1A,
    0x0A, 0x17, 0x86, 0x09, 0x00, 0x01, 0x00, 0x00, 0xFC, 0x7F, 0xB0, 0x00, 0x00, 0x00, 0x89, 0x06,
    0x00, 0x01, 0x01, 0x95, 0x00, 0x00, 0x00, 0x79, 0x00,
];

// Scope (\_SB) { Device (COM0) { PL011 at 0x7FF80000, interrupt 115 } }
const SSDT_UART_AML: [u8; 68] = [
    0x10, 0x43, 0x04, 0x5C, 0x5F, 0x53, 0x42, 0x5F, 0x5B, 0x82, 0x3A, 0x43, 0x4F, 0x4D, 0x30, 0x08,
    0x5F, 0x48, 0x49, 0x44, 0x0D, 0x41, 0x52, 0x4D, 0x48, 0x30, 0x30, 0x31, 0x31, 0x00, 0x08, 0x5F,
    0x55, 0x49, 0x44, 0x00, 0x08, 0x5F, 0x43, 0x52, 0x53, 0x11, 0x1A, 0x0A, 0x17, 0x86, 0x09, 0x00,
    0x01, 0x00, 0x00, 0xF8, 0x7F, 0x00, 0x10, 0x00, 0x00, 0x89, 0x06, 0x00, 0x01, 0x01, 0x73, 0x00,
    0x00, 0x00, 0x79, 0x00,
];

// Scope (\_SB) { Device (PCI0) { Name (_HID, "PNP0A08") Name (_CID, "PNP0A03") Name (_SEG, 0) ... } }
const SSDT_PCI_AML: [u8; 67] = [
    0x10, 0x42, 0x04, 0x5C, 0x5F, 0x53, 0x42, 0x5F, 0x5B, 0x82, 0x39, 0x50, 0x43, 0x49, 0x30, 0x08,
    0x5F, 0x48, 0x49, 0x44, 0x0D, 0x50, 0x4E, 0x50, 0x30, 0x41, 0x30, 0x38, 0x00, 0x08, 0x5F, 0x43,
    0x49, 0x44, 0x0D, 0x50, 0x4E, 0x50, 0x30, 0x41, 0x30, 0x33, 0x00, 0x08, 0x5F, 0x53, 0x45, 0x47,
    0x00, 0x08, 0x5F, 0x42, 0x42, 0x4E, 0x00, 0x08, 0x5F, 0x55, 0x49, 0x44, 0x00, 0x08, 0x5F, 0x43,
    0x43, 0x41, 0x01,
];

pub static DSDT: AmlDefinitionBlock<180> =
    AmlDefinitionBlock::new(definition_block_header(DSDT_SIGNATURE), DSDT_AML);
pub static SSDT_USB: AmlDefinitionBlock<73> =
    AmlDefinitionBlock::new(definition_block_header(SSDT_SIGNATURE), SSDT_USB_AML);
pub static SSDT_UART: AmlDefinitionBlock<68> =
    AmlDefinitionBlock::new(definition_block_header(SSDT_SIGNATURE), SSDT_UART_AML);
pub static SSDT_PCI: AmlDefinitionBlock<67> =
    AmlDefinitionBlock::new(definition_block_header(SSDT_SIGNATURE), SSDT_PCI_AML);

/// The Juno platform repository.
pub static JUNO_PLATFORM_REPOSITORY_INFO: PlatformRepositoryInfo = PlatformRepositoryInfo {
    cm_info: CmStdObjConfigurationManagerInfo { revision: CONFIGURATION_MANAGER_REVISION, oem_id: CFG_MGR_OEM_ID },
    acpi_table_list: [
        CmStdObjAcpiTableInfo::generated(FADT_SIGNATURE, create_std_acpi_table_gen_id(StdAcpiTableId::Fadt)),
        CmStdObjAcpiTableInfo::generated(GTDT_SIGNATURE, create_std_acpi_table_gen_id(StdAcpiTableId::Gtdt)),
        CmStdObjAcpiTableInfo::generated(MADT_SIGNATURE, create_std_acpi_table_gen_id(StdAcpiTableId::Madt)),
        CmStdObjAcpiTableInfo::generated(SPCR_SIGNATURE, create_std_acpi_table_gen_id(StdAcpiTableId::Spcr)),
        CmStdObjAcpiTableInfo::prebuilt(
            DSDT_SIGNATURE,
            create_std_acpi_table_gen_id(StdAcpiTableId::Dsdt),
            DSDT.header(),
        ),
        CmStdObjAcpiTableInfo::generated(DBG2_SIGNATURE, create_std_acpi_table_gen_id(StdAcpiTableId::Dbg2)),
        CmStdObjAcpiTableInfo::prebuilt(
            SSDT_SIGNATURE,
            create_std_acpi_table_gen_id(StdAcpiTableId::Ssdt),
            SSDT_USB.header(),
        ),
        CmStdObjAcpiTableInfo::prebuilt(
            SSDT_SIGNATURE,
            create_std_acpi_table_gen_id(StdAcpiTableId::Ssdt),
            SSDT_UART.header(),
        ),
        // PCIe tables stay last so that R0 can report a prefix of the list.
        CmStdObjAcpiTableInfo::generated(MCFG_SIGNATURE, create_std_acpi_table_gen_id(StdAcpiTableId::Mcfg)),
        CmStdObjAcpiTableInfo::prebuilt(
            SSDT_SIGNATURE,
            create_std_acpi_table_gen_id(StdAcpiTableId::Ssdt),
            SSDT_PCI.header(),
        ),
    ],
    boot_arch_info: CmArmBootArchInfo { boot_arch_flags: ARM_PSCI_COMPLIANT },
    pm_profile_info: CmArmPowerManagementProfileInfo { power_management_profile: PM_PROFILE_MOBILE },
    // Cortex-A53 cluster first, then the Cortex-A57 cluster.
    gicc_info: [
        CmArmGicCInfo::new(2, get_mpid(1, 0), 50, VGIC_MAINTENANCE_IRQ, 0, GIC_FRAMES),
        CmArmGicCInfo::new(3, get_mpid(1, 1), 54, VGIC_MAINTENANCE_IRQ, 0, GIC_FRAMES),
        CmArmGicCInfo::new(4, get_mpid(1, 2), 58, VGIC_MAINTENANCE_IRQ, 0, GIC_FRAMES),
        CmArmGicCInfo::new(5, get_mpid(1, 3), 62, VGIC_MAINTENANCE_IRQ, 0, GIC_FRAMES),
        CmArmGicCInfo::new(0, get_mpid(0, 0), 34, VGIC_MAINTENANCE_IRQ, 1, GIC_FRAMES),
        CmArmGicCInfo::new(1, get_mpid(0, 1), 38, VGIC_MAINTENANCE_IRQ, 1, GIC_FRAMES),
    ],
    gicd_info: CmArmGicDInfo {
        gic_id: 0,
        physical_base_address: GICD_BASE,
        system_vector_base: 0,
        gic_version: GIC_VERSION,
    },
    generic_timer_info: CmArmGenericTimerInfo {
        counter_control_base_address: SYSTEM_COUNTER_BASE_ADDRESS,
        counter_read_base_address: SYSTEM_COUNTER_READ_BASE,
        secure_pl1_timer_gsiv: ARCH_TIMER_SEC_IRQ,
        secure_pl1_timer_flags: GTDT_GTIMER_FLAGS,
        non_secure_pl1_timer_gsiv: ARCH_TIMER_IRQ,
        non_secure_pl1_timer_flags: GTDT_GTIMER_FLAGS,
        virtual_timer_gsiv: ARCH_TIMER_VIRT_IRQ,
        virtual_timer_flags: GTDT_GTIMER_FLAGS,
        non_secure_pl2_timer_gsiv: ARCH_TIMER_HYP_IRQ,
        non_secure_pl2_timer_flags: GTDT_GTIMER_FLAGS,
    },
    watchdog_info: CmArmGenericWatchdogInfo {
        control_frame_address: GENERIC_WATCHDOG_CONTROL_BASE,
        refresh_frame_address: GENERIC_WATCHDOG_REFRESH_BASE,
        timer_gsiv: GENERIC_WATCHDOG_EL2_IRQ,
        flags: SBSA_WATCHDOG_FLAGS,
    },
    spcr_serial_port: CmArmSerialPortInfo {
        base_address: SERIAL_REGISTER_BASE,
        interrupt: PL011_UART_INTERRUPT,
        baud_rate: UART_DEFAULT_BAUD_RATE,
        clock: PL011_UART_CLK_IN_HZ,
        port_subtype: DBG2_PORT_SUBTYPE_SERIAL_ARM_PL011_UART,
    },
    dbg_serial_port: CmArmSerialPortInfo {
        base_address: SERIAL_DBG_REGISTER_BASE,
        interrupt: SERIAL_DBG_INTERRUPT,
        baud_rate: SERIAL_DBG_UART_BAUD_RATE,
        clock: SERIAL_DBG_UART_CLK_IN_HZ,
        port_subtype: DBG2_PORT_SUBTYPE_SERIAL_ARM_PL011_UART,
    },
    pci_config_info: CmArmPciConfigSpaceInfo {
        base_address: PCI_CONFIGURATION_SPACE_BASE_ADDRESS,
        pci_segment_group_number: 0,
        start_bus_number: PCI_BUS_MIN,
        end_bus_number: PCI_BUS_MAX,
    },
    gic_msi_frame_info: CmArmGicMsiFrameInfo {
        gic_msi_frame_id: 0,
        physical_base_address: GICV2M_MSI_BASE,
        flags: 0,
        spi_count: GICV2M_SPI_COUNT,
        spi_base: GICV2M_SPI_BASE,
    },
};

const _: () = {
    let tables = &JUNO_PLATFORM_REPOSITORY_INFO.acpi_table_list;
    let mcfg = &tables[ACPI_TABLE_COUNT - PCIE_ACPI_TABLE_COUNT];
    let ssdt_pci = &tables[ACPI_TABLE_COUNT - 1];
    assert!(PCIE_ACPI_TABLE_COUNT == 2, "the PCIe tables are MCFG and the root complex SSDT");
    assert!(mcfg.acpi_table_signature == MCFG_SIGNATURE, "MCFG must precede the PCIe SSDT at the end of the list");
    assert!(ssdt_pci.acpi_table_signature == SSDT_SIGNATURE && ssdt_pci.is_prebuilt(), "PCIe SSDT must be last");
};

/// Detects the board revision and creates the Juno Configuration Manager.
///
/// ## Errors
///
/// Propagates the resolver's error.
pub fn configuration_manager(
    resolver: &impl RevisionResolver,
) -> Result<ConfigurationManager<'static>, ConfigManagerError> {
    ConfigurationManager::initialize(&JUNO_PLATFORM_REPOSITORY_INFO, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        acpi::{TABLE_GENERATOR_TYPE_ACPI, is_checksum_valid},
        revision::{FixedRevision, JunoRevision},
    };

    fn prebuilt_tables() -> [(&'static str, &'static [u8]); 4] {
        [
            ("DSDT", DSDT.as_bytes()),
            ("SSDT-USB", SSDT_USB.as_bytes()),
            ("SSDT-UART", SSDT_UART.as_bytes()),
            ("SSDT-PCI", SSDT_PCI.as_bytes()),
        ]
    }

    #[test]
    fn test_prebuilt_tables_are_well_formed() {
        for (name, table) in prebuilt_tables() {
            let header = AcpiDescriptionHeader::parse(table).expect("prebuilt tables have a valid header");
            let length = header.length;
            assert_eq!(length as usize, table.len(), "{name}");
            assert!(is_checksum_valid(table), "{name} checksum");
            assert_eq!(header.oem_id, CFG_MGR_OEM_ID, "{name}");
        }
    }

    #[test]
    fn test_prebuilt_table_signatures() {
        assert_eq!(&DSDT.header().signature_bytes(), b"DSDT");
        assert_eq!(&SSDT_USB.header().signature_bytes(), b"SSDT");
        assert_eq!(&SSDT_UART.header().signature_bytes(), b"SSDT");
        assert_eq!(&SSDT_PCI.header().signature_bytes(), b"SSDT");
    }

    #[test]
    fn test_acpi_table_list_order() {
        let tables = &JUNO_PLATFORM_REPOSITORY_INFO.acpi_table_list;
        let signatures: [[u8; 4]; ACPI_TABLE_COUNT] =
            core::array::from_fn(|i| tables[i].acpi_table_signature.to_le_bytes());
        assert_eq!(
            signatures,
            [*b"FACP", *b"GTDT", *b"APIC", *b"SPCR", *b"DSDT", *b"DBG2", *b"SSDT", *b"SSDT", *b"MCFG", *b"SSDT"]
        );
    }

    #[test]
    fn test_acpi_table_list_blobs() {
        let tables = &JUNO_PLATFORM_REPOSITORY_INFO.acpi_table_list;
        let prebuilt: [bool; ACPI_TABLE_COUNT] = core::array::from_fn(|i| tables[i].is_prebuilt());
        assert_eq!(prebuilt, [false, false, false, false, true, false, true, true, false, true]);

        let dsdt = tables[4].acpi_table_data.expect("DSDT is prebuilt");
        assert!(core::ptr::eq(dsdt, DSDT.header()));
        let ssdt_pci = tables[ACPI_TABLE_COUNT - 1].acpi_table_data.expect("PCIe SSDT is prebuilt");
        assert!(core::ptr::eq(ssdt_pci, SSDT_PCI.header()));
    }

    #[test]
    fn test_acpi_table_generators() {
        for table in &JUNO_PLATFORM_REPOSITORY_INFO.acpi_table_list {
            assert_eq!(table.table_generator_id >> 24, TABLE_GENERATOR_TYPE_ACPI);
        }
        assert_eq!(
            JUNO_PLATFORM_REPOSITORY_INFO.acpi_table_list[8].table_generator_id,
            create_std_acpi_table_gen_id(StdAcpiTableId::Mcfg)
        );
    }

    #[test]
    fn test_gicc_entries() {
        let gicc = &JUNO_PLATFORM_REPOSITORY_INFO.gicc_info;
        let interfaces: [u32; 6] = core::array::from_fn(|i| gicc[i].cpu_interface_number);
        assert_eq!(interfaces, [2, 3, 4, 5, 0, 1]);
        let mpidrs: [u64; 6] = core::array::from_fn(|i| gicc[i].mpidr);
        assert_eq!(mpidrs, [0x100, 0x101, 0x102, 0x103, 0x000, 0x001]);
        let pmu: [u32; 6] = core::array::from_fn(|i| gicc[i].performance_interrupt_gsiv);
        assert_eq!(pmu, [50, 54, 58, 62, 34, 38]);
        assert!(gicc[..4].iter().all(|entry| entry.processor_power_efficiency_class == 0));
        assert!(gicc[4..].iter().all(|entry| entry.processor_power_efficiency_class == 1));
    }

    #[test]
    fn test_board_records() {
        let info = &JUNO_PLATFORM_REPOSITORY_INFO;
        assert_eq!(info.cm_info.oem_id, *b"ARMLTD");
        assert_eq!(info.boot_arch_info.boot_arch_flags, ARM_PSCI_COMPLIANT);
        assert_eq!(info.gicd_info.physical_base_address, 0x2C01_0000);
        assert_eq!(info.gicd_info.gic_version, 2);
        assert_eq!(info.pci_config_info.base_address, 0x4000_0000);
        assert_eq!((info.pci_config_info.start_bus_number, info.pci_config_info.end_bus_number), (0, 255));
        assert_eq!((info.gic_msi_frame_info.spi_count, info.gic_msi_frame_info.spi_base), (127, 224));
        assert_eq!(info.spcr_serial_port.base_address, 0x7FF8_0000);
        assert_eq!(info.dbg_serial_port.interrupt, 38);
    }

    #[test]
    fn test_configuration_manager() {
        let manager = configuration_manager(&FixedRevision(JunoRevision::R2)).expect("resolves");
        assert_eq!(manager.revision(), JunoRevision::R2);
        assert!(core::ptr::eq(manager.repository().info(), &JUNO_PLATFORM_REPOSITORY_INFO));
    }
}

//! ACPI definitions used by the platform repository
//!
//! Contains the ACPI description header shared by every system description table, the table signatures and flag
//! values referenced by the repository records, the standard table generator identifiers, and
//! [`AmlDefinitionBlock`], a pre-built table blob that table-list entries may point at.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use core::mem::size_of;

use zerocopy::Ref;
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::ConfigManagerError;

/// Builds a table signature from its four ASCII characters.
pub const fn acpi_signature(signature: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*signature)
}

/// "FACP" Fixed ACPI Description Table
pub const FADT_SIGNATURE: u32 = acpi_signature(b"FACP");
/// "GTDT" Generic Timer Description Table
pub const GTDT_SIGNATURE: u32 = acpi_signature(b"GTDT");
/// "APIC" Multiple APIC Description Table
pub const MADT_SIGNATURE: u32 = acpi_signature(b"APIC");
/// "SPCR" Serial Port Console Redirection Table
pub const SPCR_SIGNATURE: u32 = acpi_signature(b"SPCR");
/// "DSDT" Differentiated System Description Table
pub const DSDT_SIGNATURE: u32 = acpi_signature(b"DSDT");
/// "DBG2" Debug Port Table 2
pub const DBG2_SIGNATURE: u32 = acpi_signature(b"DBG2");
/// "SSDT" Secondary System Description Table
pub const SSDT_SIGNATURE: u32 = acpi_signature(b"SSDT");
/// "MCFG" PCI Express Memory Mapped Configuration Space Base Address Description Table
pub const MCFG_SIGNATURE: u32 = acpi_signature(b"MCFG");

/// FADT ARM boot architecture flag: PSCI is implemented.
pub const ARM_PSCI_COMPLIANT: u16 = 1 << 0;
/// FADT ARM boot architecture flag: PSCI calls use HVC instead of SMC.
pub const ARM_PSCI_USE_HVC: u16 = 1 << 1;

/// FADT preferred power management profile: Mobile.
pub const PM_PROFILE_MOBILE: u8 = 2;

/// MADT GICC flag: the processor is enabled.
pub const GIC_ENABLED: u32 = 1 << 0;

/// GTDT timer flag: the interrupt is edge triggered (level triggered when clear).
pub const GTDT_TIMER_EDGE_TRIGGERED: u32 = 1 << 0;
/// GTDT timer flag: the interrupt is level triggered.
pub const GTDT_TIMER_LEVEL_TRIGGERED: u32 = 0;
/// GTDT timer flag: the interrupt is active low (active high when clear).
pub const GTDT_TIMER_ACTIVE_LOW: u32 = 1 << 1;
/// GTDT timer flag: the interrupt is active high.
pub const GTDT_TIMER_ACTIVE_HIGH: u32 = 0;

/// GTDT SBSA watchdog flag: the interrupt is edge triggered.
pub const SBSA_WATCHDOG_EDGE_TRIGGERED: u32 = 1 << 0;
/// GTDT SBSA watchdog flag: the interrupt is active low.
pub const SBSA_WATCHDOG_ACTIVE_LOW: u32 = 1 << 1;
/// GTDT SBSA watchdog flag: the watchdog is a secure timer.
pub const SBSA_WATCHDOG_SECURE: u32 = 1 << 2;

/// DBG2 serial port subtype: ARM PL011 UART.
pub const DBG2_PORT_SUBTYPE_SERIAL_ARM_PL011_UART: u16 = 0x0003;

/// Identifier of the generator responsible for building a table.
pub type TableGeneratorId = u32;

const TABLE_GENERATOR_TYPE_SHIFT: u32 = 24;
const TABLE_GENERATOR_TYPE_MASK: u32 = 0x7F00_0000;
const TABLE_GENERATOR_NAMESPACE_SHIFT: u32 = 31;
const TABLE_GENERATOR_NAMESPACE_MASK: u32 = 1 << 31;
const TABLE_GENERATOR_ID_MASK: u32 = 0x0000_FFFF;

/// Table generator type for ACPI tables.
pub const TABLE_GENERATOR_TYPE_ACPI: u32 = 1;
/// Table generator namespace for the standard generators.
pub const TABLE_GENERATOR_NAMESPACE_STD: u32 = 0;

/// Standard ACPI table generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum StdAcpiTableId {
    Reserved = 0,
    /// Installs a pre-built table verbatim.
    Raw = 1,
    Dsdt = 2,
    Fadt = 3,
    Madt = 4,
    Gtdt = 5,
    Dbg2 = 6,
    Spcr = 7,
    Mcfg = 8,
    Ssdt = 9,
}

/// Builds a table generator identifier from its type, namespace and table id.
pub const fn create_table_gen_id(table_type: u32, namespace: u32, table_id: u32) -> TableGeneratorId {
    ((table_type << TABLE_GENERATOR_TYPE_SHIFT) & TABLE_GENERATOR_TYPE_MASK)
        | ((namespace << TABLE_GENERATOR_NAMESPACE_SHIFT) & TABLE_GENERATOR_NAMESPACE_MASK)
        | (table_id & TABLE_GENERATOR_ID_MASK)
}

/// Builds the identifier of a standard ACPI table generator.
pub const fn create_std_acpi_table_gen_id(table_id: StdAcpiTableId) -> TableGeneratorId {
    create_table_gen_id(TABLE_GENERATOR_TYPE_ACPI, TABLE_GENERATOR_NAMESPACE_STD, table_id as u32)
}

/// ACPI system description table header.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct AcpiDescriptionHeader {
    pub signature: u32,
    /// Length of the whole table, header included.
    pub length: u32,
    pub revision: u8,
    /// Makes the byte sum of the whole table zero.
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: u64,
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
}

impl AcpiDescriptionHeader {
    /// Size of the header structure in bytes
    pub const SIZE: usize = size_of::<Self>();

    /// Creates a header with a zero length and checksum.
    pub const fn new(
        signature: u32,
        revision: u8,
        oem_id: [u8; 6],
        oem_table_id: u64,
        oem_revision: u32,
        creator_id: u32,
        creator_revision: u32,
    ) -> Self {
        Self {
            signature,
            length: 0,
            revision,
            checksum: 0,
            oem_id,
            oem_table_id,
            oem_revision,
            creator_id,
            creator_revision,
        }
    }

    /// Reads the header at the start of a table buffer.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigManagerError::MalformedAcpiHeader`] if the buffer is shorter than the header, or if the length
    /// field is smaller than the header or larger than the buffer.
    pub fn parse(table: &[u8]) -> Result<&Self, ConfigManagerError> {
        let (header, _rest) =
            Ref::<&[u8], Self>::from_prefix(table).map_err(|_| ConfigManagerError::MalformedAcpiHeader)?;
        let header = Ref::into_ref(header);

        let length = header.length as usize;
        if length < Self::SIZE || length > table.len() {
            log::error!("ACPI table length {} does not fit a buffer of {} bytes", length, table.len());
            return Err(ConfigManagerError::MalformedAcpiHeader);
        }

        Ok(header)
    }

    /// The table signature as ASCII characters.
    pub fn signature_bytes(&self) -> [u8; 4] {
        self.signature.to_le_bytes()
    }

    const fn byte_sum(&self) -> u8 {
        let oem_id = self.oem_id;
        let mut sum = sum_bytes(&self.signature.to_le_bytes(), 0);
        sum = sum_bytes(&self.length.to_le_bytes(), sum);
        sum = sum.wrapping_add(self.revision).wrapping_add(self.checksum);
        sum = sum_bytes(&oem_id, sum);
        sum = sum_bytes(&self.oem_table_id.to_le_bytes(), sum);
        sum = sum_bytes(&self.oem_revision.to_le_bytes(), sum);
        sum = sum_bytes(&self.creator_id.to_le_bytes(), sum);
        sum_bytes(&self.creator_revision.to_le_bytes(), sum)
    }
}

const fn sum_bytes(bytes: &[u8], mut sum: u8) -> u8 {
    let mut i = 0;
    while i < bytes.len() {
        sum = sum.wrapping_add(bytes[i]);
        i += 1;
    }
    sum
}

/// Returns `true` if the bytes of a complete table sum to zero.
pub fn is_checksum_valid(table: &[u8]) -> bool {
    sum_bytes(table, 0) == 0
}

/// A pre-built ACPI definition block: a description header followed by AML.
///
/// The length and checksum of the header are computed when the block is assembled, so a block can be placed in a
/// `static` and referenced directly from the ACPI table list.
#[repr(C)]
pub struct AmlDefinitionBlock<const N: usize> {
    header: AcpiDescriptionHeader,
    aml: [u8; N],
}

impl<const N: usize> AmlDefinitionBlock<N> {
    /// Total size of the table in bytes.
    pub const LENGTH: usize = AcpiDescriptionHeader::SIZE + N;

    /// Assembles a definition block, filling in the header length and checksum.
    pub const fn new(header: AcpiDescriptionHeader, aml: [u8; N]) -> Self {
        let mut header = header;
        header.length = Self::LENGTH as u32;
        header.checksum = 0;
        let sum = sum_bytes(&aml, header.byte_sum());
        header.checksum = 0u8.wrapping_sub(sum);
        Self { header, aml }
    }

    /// The table header.
    pub const fn header(&self) -> &AcpiDescriptionHeader {
        &self.header
    }

    /// The whole table, header included.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `AmlDefinitionBlock` is `repr(C)` and both of its fields have an alignment of one, so the
        // structure has no padding and is exactly `LENGTH` initialized bytes.
        unsafe { core::slice::from_raw_parts(self as *const Self as *const u8, Self::LENGTH) }
    }
}

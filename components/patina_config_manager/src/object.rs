//! Configuration Manager object identifiers
//!
//! A Configuration Manager object is addressed by a 32-bit identifier that packs a namespace and an object kind:
//!
//! ```text
//!  31      28 27                     8 7            0
//! ┌──────────┬────────────────────────┬──────────────┐
//! │Namespace │        Reserved        │  Object kind │
//! └──────────┴────────────────────────┴──────────────┘
//! ```
//!
//! The namespace and kind are decoded independently so that an identifier whose namespace is out of range can be
//! told apart from one whose namespace is valid but whose kind is simply not registered.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use crate::error::ConfigManagerError;

/// Optional disambiguator for object kinds with multiple instances.
pub type CmObjectToken = usize;

/// Token value used when an object is not addressed by token.
pub const CM_NULL_TOKEN: CmObjectToken = 0;

const NAMESPACE_SHIFT: u32 = 28;
const NAMESPACE_MASK: u32 = 0xF;
const OBJECT_MASK: u32 = 0xFF;

/// Object namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Namespace {
    /// Objects common to all architectures.
    Standard = 0x0,
    /// ARM architecture specific objects.
    Arm = 0x1,
    /// Vendor extension objects.
    Oem = 0x8,
}

impl TryFrom<u8> for Namespace {
    type Error = ConfigManagerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(Self::Standard),
            0x1 => Ok(Self::Arm),
            0x8 => Ok(Self::Oem),
            _ => Err(ConfigManagerError::InvalidIdentity),
        }
    }
}

/// Object kinds in the standard namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StdObjectId {
    /// Configuration Manager information
    CfgMgrInfo = 0,
    /// List of ACPI tables to install
    AcpiTableList = 1,
    /// List of SMBIOS tables to install
    SmbiosTableList = 2,
}

/// Object kinds in the ARM namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ArmObjectId {
    Reserved = 0,
    BootArchInfo = 1,
    CpuInfo = 2,
    PowerManagementProfileInfo = 3,
    GicCInfo = 4,
    GicDInfo = 5,
    GicMsiFrameInfo = 6,
    GicRedistributorInfo = 7,
    GicItsInfo = 8,
    SerialConsolePortInfo = 9,
    SerialDebugPortInfo = 10,
    GenericTimerInfo = 11,
    PlatformGtBlockInfo = 12,
    GtBlockTimerFrameInfo = 13,
    PlatformGenericWatchdogInfo = 14,
    PciConfigSpaceInfo = 15,
    HypervisorVendorIdentity = 16,
    FixedFeatureFlags = 17,
    ItsGroup = 18,
    NamedComponent = 19,
    RootComplex = 20,
    SmmuV1SmmuV2 = 21,
    SmmuV3 = 22,
    Pmcg = 23,
    GicItsIdentifierArray = 24,
    IdMapping = 25,
    SmmuInterruptArray = 26,
}

/// A packed Configuration Manager object identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CmObjectId(u32);

impl CmObjectId {
    /// Creates an identifier from a raw namespace value and object kind.
    ///
    /// The namespace is not validated here; out-of-range values are reported when the identifier is resolved.
    pub const fn from_parts(namespace: u8, object: u8) -> Self {
        Self(((namespace as u32 & NAMESPACE_MASK) << NAMESPACE_SHIFT) | (object as u32 & OBJECT_MASK))
    }

    /// Creates a standard namespace identifier.
    pub const fn standard(object: StdObjectId) -> Self {
        Self::from_parts(Namespace::Standard as u8, object as u8)
    }

    /// Creates an ARM namespace identifier.
    pub const fn arm(object: ArmObjectId) -> Self {
        Self::from_parts(Namespace::Arm as u8, object as u8)
    }

    /// Creates an OEM namespace identifier.
    pub const fn oem(object: u8) -> Self {
        Self::from_parts(Namespace::Oem as u8, object)
    }

    /// The raw namespace field.
    pub const fn raw_namespace(self) -> u8 {
        ((self.0 >> NAMESPACE_SHIFT) & NAMESPACE_MASK) as u8
    }

    /// The decoded namespace.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigManagerError::InvalidIdentity`] if the namespace field is not a known namespace.
    pub fn namespace(self) -> Result<Namespace, ConfigManagerError> {
        Namespace::try_from(self.raw_namespace())
    }

    /// The object kind within the namespace.
    pub const fn object(self) -> u8 {
        (self.0 & OBJECT_MASK) as u8
    }

    /// The raw 32-bit identifier.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for CmObjectId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<CmObjectId> for u32 {
    fn from(value: CmObjectId) -> Self {
        value.0
    }
}

impl From<StdObjectId> for CmObjectId {
    fn from(value: StdObjectId) -> Self {
        Self::standard(value)
    }
}

impl From<ArmObjectId> for CmObjectId {
    fn from(value: ArmObjectId) -> Self {
        Self::arm(value)
    }
}

impl core::fmt::Debug for CmObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CmObjectId(0x{:08X})", self.0)
    }
}

impl core::fmt::Display for CmObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

//! Error types for Configuration Manager operations
//!
//! This module defines the error type returned by the platform repository, the object dispatcher and the
//! Configuration Manager protocol.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use r_efi::efi;

/// Configuration Manager operation errors
///
/// The query path only ever produces `InvalidParameter`, `InvalidIdentity` or `NotFound`. `Unsupported` is reserved
/// for the update path, and `RevisionUnavailable` is only raised while the repository is being initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigManagerError {
    // Argument errors
    /// A required handle (protocol instance or output descriptor) was not supplied
    InvalidParameter,
    /// The object identifier encodes a namespace that does not exist
    InvalidIdentity,

    // Lookup errors
    /// The object is not registered, or is not present on the detected board revision
    NotFound,

    // Operation errors
    /// The repository is read-only; updating objects is not supported
    Unsupported,

    // Initialization errors
    /// The board revision could not be read from the platform
    RevisionUnavailable,

    // Firmware table errors
    /// An ACPI table buffer is shorter than its header or than the length the header declares
    MalformedAcpiHeader,
}

impl From<ConfigManagerError> for efi::Status {
    fn from(error: ConfigManagerError) -> Self {
        match error {
            ConfigManagerError::InvalidParameter | ConfigManagerError::InvalidIdentity => {
                efi::Status::INVALID_PARAMETER
            }
            ConfigManagerError::NotFound => efi::Status::NOT_FOUND,
            ConfigManagerError::Unsupported => efi::Status::UNSUPPORTED,
            ConfigManagerError::RevisionUnavailable => efi::Status::DEVICE_ERROR,
            ConfigManagerError::MalformedAcpiHeader => efi::Status::LOAD_ERROR,
        }
    }
}

impl core::fmt::Display for ConfigManagerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let message = match self {
            Self::InvalidParameter => "a required handle was not supplied",
            Self::InvalidIdentity => "object identifier has an unknown namespace",
            Self::NotFound => "object not found",
            Self::Unsupported => "operation not supported",
            Self::RevisionUnavailable => "board revision unavailable",
            Self::MalformedAcpiHeader => "malformed ACPI table header",
        };
        f.write_str(message)
    }
}

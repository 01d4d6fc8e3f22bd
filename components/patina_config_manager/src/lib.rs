//! Juno Configuration Manager for Patina
//!
//! This crate describes the hardware of the ARM Juno development platform to the Dynamic Tables framework, which
//! generates the ACPI tables the operating system boots with. Table generators do not know the platform; they ask the
//! Configuration Manager for typed records (GIC layout, timers, serial ports, PCIe configuration space and the list
//! of ACPI tables to install) and build the tables from them.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │       Dynamic Tables framework (C or Rust)       │
//! └────────────┬─────────────────────────┬───────────┘
//!              │                         │
//!              ▼                         ▼
//!   ┌──────────────────────┐  ┌──────────────────────┐
//!   │ C Protocol Interface │  │ ConfigurationManager │
//!   │ GetObject/SetObject  │─▶│ get_object()         │
//!   └──────────────────────┘  │ set_object()         │
//!                             └──────────┬───────────┘
//!                                        ▼
//!                             ┌──────────────────────┐
//!                             │  Namespace dispatch  │
//!                             │ Standard / Arm / Oem │
//!                             └──────────┬───────────┘
//!                                        ▼
//!                             ┌──────────────────────┐
//!                             │  PlatformRepository  │
//!                             │ static Juno records  │
//!                             │ + detected revision  │
//!                             └──────────────────────┘
//! ```
//!
//! ## Board Revisions
//!
//! Juno R1 and R2 have a PCIe root complex; R0 does not. The revision is read once, when the repository is
//! initialized, and decides two things:
//!
//! - The ACPI table list reported on R0 omits its last two entries (MCFG and the PCIe SSDT).
//! - The PCI configuration space record is not found on R0.
//!
//! Every other record is the same on every revision.
//!
//! ## Views
//!
//! A query never copies. It returns a [`cm_object::CmObjectDescriptor`] that borrows the repository, so a view can
//! not outlive the data it points at. The C protocol publishes the same pointers.
//!
//! # Usage Examples
//!
//! ## Querying the Repository
//!
//! ```ignore
//! use patina_config_manager::{juno, object::{ArmObjectId, CmObjectId, CM_NULL_TOKEN}, revision::SysIdRevisionResolver};
//!
//! // SAFETY: Running on a Juno board.
//! let resolver = unsafe { SysIdRevisionResolver::juno() };
//! let manager = juno::configuration_manager(&resolver)?;
//!
//! let gicc = manager.get_object(CmObjectId::arm(ArmObjectId::GicCInfo), CM_NULL_TOKEN)?;
//! log::info!("{} GIC CPU interfaces", gicc.count());
//! ```
//!
//! ## Publishing the Protocol
//!
//! ```ignore
//! let instance = manager.into_protocol();
//! boot_services.install_protocol_interface(None, &patina_config_manager::protocol::GUID, instance.interface())?;
//! ```
//!
//! # Error Handling
//!
//! The [`error::ConfigManagerError`] enum is converted to an `EFI_STATUS` at the protocol boundary:
//!
//! - **Argument errors**: `InvalidParameter`, `InvalidIdentity`
//! - **Lookup errors**: `NotFound`
//! - **Operation errors**: `Unsupported`
//! - **Initialization errors**: `RevisionUnavailable`
//!
//! # Module Organization
//!
//! - [`acpi`]: ACPI table signatures, generator identifiers and pre-built definition blocks
//! - [`cm_object`]: Record types and typed views
//! - [`dispatch`]: Per-namespace object tables
//! - [`error`]: Error types for Configuration Manager operations
//! - [`juno`]: The Juno board description
//! - [`manager`]: The query and update service
//! - [`object`]: Object identifiers
//! - [`protocol`]: C protocol interface
//! - [`repository`]: Platform repository
//! - [`revision`]: Board revision detection
//!
//! # License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), no_std)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

pub mod acpi;
pub mod cm_object;
pub mod dispatch;
pub mod error;
pub mod juno;
pub mod manager;
pub mod object;
pub mod protocol;
pub mod repository;
pub mod revision;

pub use error::ConfigManagerError;
pub use manager::ConfigurationManager;
pub use object::{CM_NULL_TOKEN, CmObjectId, CmObjectToken};

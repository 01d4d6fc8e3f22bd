//! Configuration Manager Protocol
//!
//! C ABI wrapper that publishes a [`ConfigurationManager`] to the Dynamic Tables framework. The protocol is
//! installed by the host on the GUID [`GUID`]; this module only builds the interface.
//!
//! Both protocol functions receive a pointer to the caller's view of the protocol. The protocol is the first field
//! of a leaked [`ConfigurationManagerProtocolInstance`], which is how the functions find the manager again.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

extern crate alloc;

use alloc::boxed::Box;
use core::ffi::c_void;
use r_efi::efi;

use crate::{
    cm_object::{CmObjectDescriptor, create_revision},
    error::ConfigManagerError,
    manager::ConfigurationManager,
    object::{CmObjectId, CmObjectToken},
    repository::PlatformRepositoryInfo,
};

/// Configuration Manager Protocol GUID: D85A4835-5A82-4894-AC02-706F43D5978E
pub const GUID: efi::Guid =
    efi::Guid::from_fields(0xD85A4835, 0x5A82, 0x4894, 0xAC, 0x02, &[0x70, 0x6F, 0x43, 0xD5, 0x97, 0x8E]);

/// Revision of the protocol interface.
pub const REVISION: u32 = create_revision(1, 0);

/// Object descriptor as seen by C consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmObjDescriptor {
    pub object_id: u32,
    /// Size of the data in bytes.
    pub size: u32,
    pub data: *mut c_void,
    /// Number of records at `data`.
    pub count: u32,
}

impl CmObjDescriptor {
    /// An empty descriptor.
    pub const fn zeroed() -> Self {
        Self { object_id: 0, size: 0, data: core::ptr::null_mut(), count: 0 }
    }
}

impl From<&CmObjectDescriptor<'_>> for CmObjDescriptor {
    fn from(descriptor: &CmObjectDescriptor<'_>) -> Self {
        // Records are a few hundred bytes at most.
        Self {
            object_id: descriptor.object_id().as_u32(),
            size: descriptor.size() as u32,
            data: descriptor.as_ptr().cast_mut(),
            count: descriptor.count() as u32,
        }
    }
}

pub type GetObjectFn = extern "efiapi" fn(
    this: *const ConfigurationManagerProtocol,
    object_id: u32,
    token: CmObjectToken,
    cm_object: *mut CmObjDescriptor,
) -> efi::Status;

pub type SetObjectFn = extern "efiapi" fn(
    this: *const ConfigurationManagerProtocol,
    object_id: u32,
    token: CmObjectToken,
    cm_object: *mut CmObjDescriptor,
) -> efi::Status;

/// The Configuration Manager Protocol interface.
#[repr(C)]
#[derive(Debug)]
pub struct ConfigurationManagerProtocol {
    pub revision: u32,
    pub get_object: GetObjectFn,
    pub set_object: SetObjectFn,
    pub plat_repo_info: *const PlatformRepositoryInfo,
}

/// A published protocol and the manager it serves.
#[repr(C)]
#[derive(Debug)]
pub struct ConfigurationManagerProtocolInstance {
    protocol: ConfigurationManagerProtocol,
    manager: ConfigurationManager<'static>,
}

impl ConfigurationManagerProtocolInstance {
    /// Wraps `manager` in a protocol instance that lives for the rest of the boot.
    pub fn leak(manager: ConfigurationManager<'static>) -> &'static Self {
        let instance = Box::leak(Box::new(Self {
            protocol: ConfigurationManagerProtocol {
                revision: REVISION,
                get_object: get_object_efiapi,
                set_object: set_object_efiapi,
                plat_repo_info: manager.repository().info(),
            },
            manager,
        }));
        log::debug!("Configuration Manager Protocol instance at {:p}", instance);
        instance
    }

    pub fn protocol(&self) -> &ConfigurationManagerProtocol {
        &self.protocol
    }

    pub fn manager(&self) -> &ConfigurationManager<'static> {
        &self.manager
    }

    /// The interface pointer to install on [`GUID`].
    pub fn interface(&'static self) -> *mut c_void {
        &self.protocol as *const ConfigurationManagerProtocol as *mut c_void
    }

    /// Recovers the instance from the protocol pointer handed to a protocol function.
    ///
    /// ## Safety
    ///
    /// `this` must be null or point at the `protocol` field of an instance created by [`Self::leak`].
    unsafe fn from_protocol(this: *const ConfigurationManagerProtocol) -> Option<&'static Self> {
        // SAFETY: `protocol` is the first field of a `repr(C)` struct, so the pointers are interchangeable, and
        // instances are leaked so the reference is valid for 'static.
        unsafe { this.cast::<Self>().as_ref() }
    }
}

impl ConfigurationManager<'static> {
    /// Publishes the manager as a protocol instance.
    pub fn into_protocol(self) -> &'static ConfigurationManagerProtocolInstance {
        ConfigurationManagerProtocolInstance::leak(self)
    }
}

/// Serves `GetObject`. The output descriptor is written only on success.
fn get_object(
    this: Option<&ConfigurationManagerProtocolInstance>,
    object_id: CmObjectId,
    token: CmObjectToken,
    cm_object: Option<&mut CmObjDescriptor>,
) -> Result<(), ConfigManagerError> {
    debug_assert!(this.is_some(), "GetObject called without a protocol instance");
    debug_assert!(cm_object.is_some(), "GetObject called without an output descriptor");
    let (Some(instance), Some(cm_object)) = (this, cm_object) else {
        log::error!("GetObject: invalid parameter");
        return Err(ConfigManagerError::InvalidParameter);
    };

    let descriptor = instance.manager.get_object(object_id, token)?;
    *cm_object = CmObjDescriptor::from(&descriptor);
    Ok(())
}

/// Serves `SetObject`, which is not supported whatever the arguments.
fn set_object(
    _this: Option<&ConfigurationManagerProtocolInstance>,
    object_id: CmObjectId,
    _token: CmObjectToken,
    _cm_object: Option<&mut CmObjDescriptor>,
) -> Result<(), ConfigManagerError> {
    log::debug!("SetObject: rejected update of object {}", object_id);
    Err(ConfigManagerError::Unsupported)
}

#[cfg_attr(coverage_nightly, coverage(off))]
extern "efiapi" fn get_object_efiapi(
    this: *const ConfigurationManagerProtocol,
    object_id: u32,
    token: CmObjectToken,
    cm_object: *mut CmObjDescriptor,
) -> efi::Status {
    // SAFETY: The protocol pointer is the one installed from `ConfigurationManagerProtocolInstance::leak` and the
    // output pointer is null or a writable descriptor owned by the caller.
    let (this, cm_object) = unsafe { (ConfigurationManagerProtocolInstance::from_protocol(this), cm_object.as_mut()) };
    match get_object(this, CmObjectId::from(object_id), token, cm_object) {
        Ok(()) => efi::Status::SUCCESS,
        Err(e) => e.into(),
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
extern "efiapi" fn set_object_efiapi(
    this: *const ConfigurationManagerProtocol,
    object_id: u32,
    token: CmObjectToken,
    cm_object: *mut CmObjDescriptor,
) -> efi::Status {
    // SAFETY: See `get_object_efiapi`.
    let (this, cm_object) = unsafe { (ConfigurationManagerProtocolInstance::from_protocol(this), cm_object.as_mut()) };
    match set_object(this, CmObjectId::from(object_id), token, cm_object) {
        Ok(()) => efi::Status::SUCCESS,
        Err(e) => e.into(),
    }
}

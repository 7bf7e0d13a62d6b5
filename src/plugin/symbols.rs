//! Symbol resolution - locate plugins and their exports in the process image
//!
//! Platform-agnostic wrapper around dladdr/dlsym and their Windows
//! equivalents. Used when diagnosing a plugin: given any address inside it,
//! find the loaded image, then resolve exported symbols by name.

use core::ffi::c_void;
use core::ptr::NonNull;

#[cfg(unix)]
use std::ffi::CString;

/// Handle to the loaded image (executable or shared object) containing a
/// known address
pub struct Image {
    handle: NonNull<c_void>,
}

impl Image {
    /// Resolve the image containing `address`.
    ///
    /// The address may be any code or data location inside the plugin, a
    /// function pointer being the usual case.
    pub fn containing(address: *const ()) -> Result<Self, SymbolError> {
        Self::containing_impl(address)
    }

    #[cfg(unix)]
    fn containing_impl(address: *const ()) -> Result<Self, SymbolError> {
        let mut info: libc::Dl_info = unsafe { core::mem::zeroed() };
        let found = unsafe { libc::dladdr(address as *const c_void, &mut info) };
        if found == 0 || info.dli_fname.is_null() {
            return Err(SymbolError::NoContainingImage);
        }

        // re-open the already-loaded image to get a stable handle
        let handle = unsafe { libc::dlopen(info.dli_fname, libc::RTLD_NOW | libc::RTLD_NOLOAD) };
        NonNull::new(handle)
            .map(|handle| Self { handle })
            .ok_or(SymbolError::NoContainingImage)
    }

    #[cfg(windows)]
    fn containing_impl(address: *const ()) -> Result<Self, SymbolError> {
        use winapi::um::libloaderapi::{
            GetModuleHandleExW, GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS,
            GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
        };

        let mut module = core::ptr::null_mut();
        let ok = unsafe {
            GetModuleHandleExW(
                GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS
                    | GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
                address as *const u16,
                &mut module,
            )
        };
        if ok == 0 {
            return Err(SymbolError::NoContainingImage);
        }
        NonNull::new(module as *mut c_void)
            .map(|handle| Self { handle })
            .ok_or(SymbolError::NoContainingImage)
    }

    /// Resolve an exported symbol by name
    pub fn symbol(&self, name: &str) -> Result<*const (), SymbolError> {
        self.symbol_impl(name)
    }

    #[cfg(unix)]
    fn symbol_impl(&self, name: &str) -> Result<*const (), SymbolError> {
        let cname = CString::new(name).map_err(|_| SymbolError::InvalidName)?;
        let ptr = unsafe { libc::dlsym(self.handle.as_ptr(), cname.as_ptr()) };
        if ptr.is_null() {
            Err(SymbolError::NotFound)
        } else {
            Ok(ptr as *const ())
        }
    }

    #[cfg(windows)]
    fn symbol_impl(&self, name: &str) -> Result<*const (), SymbolError> {
        use winapi::um::libloaderapi::GetProcAddress;

        let cname = std::ffi::CString::new(name).map_err(|_| SymbolError::InvalidName)?;
        let ptr = unsafe { GetProcAddress(self.handle.as_ptr() as _, cname.as_ptr()) };
        if ptr.is_null() {
            Err(SymbolError::NotFound)
        } else {
            Ok(ptr as *const ())
        }
    }
}

impl Drop for Image {
    #[cfg(unix)]
    fn drop(&mut self) {
        // balances the dlopen in containing_impl
        unsafe {
            libc::dlclose(self.handle.as_ptr());
        }
    }

    #[cfg(windows)]
    fn drop(&mut self) {
        // refcount was left unchanged, nothing to release
    }
}

// Safety: image handles are process-global tokens the loader hands out; the
// loader's own locking covers concurrent lookups.
unsafe impl Send for Image {}
unsafe impl Sync for Image {}

/// Symbol resolution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolError {
    /// Symbol name contains an interior NUL
    InvalidName,
    /// No loaded image covers the given address
    NoContainingImage,
    /// The image exports no symbol with that name
    NotFound,
}

impl core::fmt::Display for SymbolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "invalid symbol name"),
            Self::NoContainingImage => write!(f, "no loaded image contains the address"),
            Self::NotFound => write!(f, "symbol not found"),
        }
    }
}

impl std::error::Error for SymbolError {}

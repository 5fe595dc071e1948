//! Forwarding stub for a system library.
//!
//! Built as a `cdylib` named after the library it replaces: `hid` with the
//! `hid` feature, `d3d11` otherwise. Every export of the system copy is
//! forwarded by the linker from `exports/<library>.exports`; the stub itself
//! only runs [`luaf_bootstrap::on_process_attach`] from the loader's attach
//! notification.

pub mod exports;

use luaf_bootstrap::AttachState;

/// Name of the system library this build forwards to.
#[cfg(feature = "hid")]
pub const FORWARDED_LIBRARY: &str = "hid";
/// Name of the system library this build forwards to.
#[cfg(not(feature = "hid"))]
pub const FORWARDED_LIBRARY: &str = "d3d11";

/// Manifest for [`FORWARDED_LIBRARY`].
#[cfg(feature = "hid")]
pub const MANIFEST: &str = include_str!("../exports/hid.exports");
/// Manifest for [`FORWARDED_LIBRARY`].
#[cfg(not(feature = "hid"))]
pub const MANIFEST: &str = include_str!("../exports/d3d11.exports");

fn attach() -> AttachState {
    luaf_bootstrap::on_process_attach()
}

/// Loader entry point. Attachment runs on process attach; every other
/// notification is ignored. Always reports success.
#[cfg(windows)]
#[expect(unsafe_code, reason = "the loader resolves `DllMain` by name")]
#[unsafe(no_mangle)]
pub extern "system" fn DllMain(
    _module: *mut core::ffi::c_void,
    reason: u32,
    _reserved: *mut core::ffi::c_void,
) -> i32 {
    if reason == windows::Win32::System::SystemServices::DLL_PROCESS_ATTACH {
        let _state = attach();
    }
    1
}

#[cfg(all(target_os = "linux", not(test)))]
extern "C" fn attach_on_load() {
    let _state = attach();
}

#[cfg(all(target_os = "linux", not(test)))]
#[expect(unsafe_code, reason = "runs at load time from `.init_array`")]
#[used]
#[unsafe(link_section = ".init_array")]
static ATTACH_ON_LOAD: extern "C" fn() = attach_on_load;

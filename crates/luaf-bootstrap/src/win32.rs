//! Windows loader platform.

#![expect(unsafe_code, reason = "Win32 module and loader calls")]

use std::ffi::{OsStr, OsString};
use std::iter;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use libloading::os::windows::{LOAD_LIBRARY_SEARCH_DEFAULT_DIRS, Library};
use luaf_errors::AttachError;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::System::LibraryLoader::AddDllDirectory;
use windows::Win32::System::ProcessStatus::{EnumProcessModules, GetModuleFileNameExW};
use windows::Win32::System::Threading::GetCurrentProcess;
use windows::Win32::UI::WindowsAndMessaging::{MB_ICONERROR, MESSAGEBOX_RESULT, MessageBoxW};
use windows::core::PCWSTR;

use crate::platform::Platform;

const MODULE_PATH_CAPACITY: usize = 1024;

fn wide(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(iter::once(0)).collect()
}

/// The Win32 loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsPlatform;

impl Platform for WindowsPlatform {
    fn current_exe(&self) -> Result<PathBuf, AttachError> {
        std::env::current_exe().map_err(AttachError::ExecutablePath)
    }

    fn loaded_modules(&self) -> Result<Vec<PathBuf>, AttachError> {
        // SAFETY: returns a pseudo handle that needs no closing.
        let process = unsafe { GetCurrentProcess() };
        let mut modules = vec![HMODULE(std::ptr::null_mut()); 256];
        loop {
            let capacity = u32::try_from(std::mem::size_of_val(modules.as_slice()))
                .map_err(|e| AttachError::ModuleEnumeration(e.to_string()))?;
            let mut needed = 0u32;
            // SAFETY: the buffer holds `capacity` bytes and `needed` is a
            // valid out pointer for the duration of the call.
            unsafe { EnumProcessModules(process, modules.as_mut_ptr(), capacity, &mut needed) }
                .map_err(|e| AttachError::ModuleEnumeration(e.to_string()))?;
            let count = needed as usize / std::mem::size_of::<HMODULE>();
            if count <= modules.len() {
                modules.truncate(count);
                break;
            }
            modules.resize(count, HMODULE(std::ptr::null_mut()));
        }

        let mut buf = [0u16; MODULE_PATH_CAPACITY];
        Ok(modules
            .into_iter()
            .filter_map(|module| {
                // SAFETY: `module` came from the enumeration above and `buf`
                // is writable for its full length.
                let len = unsafe { GetModuleFileNameExW(Some(process), Some(module), &mut buf) };
                let name = buf.get(..len as usize).filter(|name| !name.is_empty())?;
                Some(PathBuf::from(OsString::from_wide(name)))
            })
            .collect())
    }

    fn add_search_dir(&self, dir: &Path) -> Result<(), AttachError> {
        let path = wide(dir.as_os_str());
        // SAFETY: `path` is NUL-terminated and outlives the call.
        let cookie = unsafe { AddDllDirectory(PCWSTR(path.as_ptr())) };
        if cookie.is_null() {
            return Err(AttachError::search_path(dir, std::io::Error::last_os_error()));
        }
        Ok(())
    }

    fn load_module(&self, name: &str) -> Result<(), AttachError> {
        // SAFETY: the core module's initializers are trusted to be sound.
        let library = unsafe { Library::load_with_flags(name, LOAD_LIBRARY_SEARCH_DEFAULT_DIRS) }
            .map_err(|e| AttachError::core_load(name, e))?;
        // Mapped until process exit.
        let _handle = library.into_raw();
        Ok(())
    }

    fn show_error(&self, title: &str, message: &str) {
        let wide_title = wide(OsStr::new(title));
        let wide_message = wide(OsStr::new(message));
        // SAFETY: both buffers are NUL-terminated and outlive the call.
        let choice = unsafe {
            MessageBoxW(
                None,
                PCWSTR(wide_message.as_ptr()),
                PCWSTR(wide_title.as_ptr()),
                MB_ICONERROR,
            )
        };
        if dialog_shown(choice) {
            tracing::debug!(choice = choice.0, "error dialog dismissed");
        } else {
            tracing::warn!(message, "error dialog could not be shown");
        }
    }
}

/// `MessageBoxW` answers zero when no dialog was displayed.
fn dialog_shown(choice: MESSAGEBOX_RESULT) -> bool {
    choice.0 != 0
}

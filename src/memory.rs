//! Host memory queries.
//!
//! Linux and Android report free RAM through `sysinfo(2)`. Other BSD-like
//! hosts only expose physical memory through `sysconf`, which is used as the
//! estimate there. Windows reports available physical memory through
//! `GlobalMemoryStatusEx`.

/// Free physical memory in bytes, or `None` if the host cannot tell.
pub fn free_memory() -> Option<u64> {
    let free = imp::free_memory();
    log::trace!("free memory probe: {:?}", free);
    free
}

#[cfg(any(target_os = "android", target_os = "linux"))]
mod imp {
    pub(super) fn free_memory() -> Option<u64> {
        // SAFETY: sysinfo only writes into the struct we hand it
        unsafe {
            let mut info: libc::sysinfo = core::mem::zeroed();
            if libc::sysinfo(&mut info) != 0 {
                return None;
            }
            Some((info.freeram as u64).saturating_mul(u64::from(info.mem_unit)))
        }
    }
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
mod imp {
    pub(super) fn free_memory() -> Option<u64> {
        // SAFETY: sysconf has no memory side effects
        let (pages, pagesz) =
            unsafe { (libc::sysconf(libc::_SC_PHYS_PAGES), libc::sysconf(libc::_SC_PAGESIZE)) };
        if pages <= 0 || pagesz <= 0 {
            return None;
        }
        Some((pages as u64).saturating_mul(pagesz as u64))
    }
}

#[cfg(target_os = "windows")]
mod imp {
    use windows_sys::Win32::System::SystemInformation::{GlobalMemoryStatusEx, MEMORYSTATUSEX};

    pub(super) fn free_memory() -> Option<u64> {
        // SAFETY: MEMORYSTATUSEX is plain data and dwLength is set before the call
        unsafe {
            let mut status: MEMORYSTATUSEX = core::mem::zeroed();
            status.dwLength = core::mem::size_of::<MEMORYSTATUSEX>() as u32;
            if GlobalMemoryStatusEx(&mut status) == 0 {
                return None;
            }
            Some(status.ullAvailPhys)
        }
    }
}

#[cfg(not(any(
    target_os = "android",
    target_os = "linux",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly",
    target_os = "windows"
)))]
mod imp {
    pub(super) fn free_memory() -> Option<u64> {
        None
    }
}

// memory.rs
//! Cross-platform helpers to query process resident memory and physical RAM.
//! Every query returns `None` when the platform cannot answer.

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Memory a process can use before the platform refuses further allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSpace {
    pub ceiling: u64,   // bytes
    pub available: u64, // bytes
}

impl AddressSpace {
    /// Usable address space of a 32-bit process on a 32-bit OS.
    pub const CEILING_32BIT: u64 = 3 * GIB;
    /// Usable address space of a large-address-aware 32-bit process on a 64-bit OS.
    pub const CEILING_32BIT_ON_64BIT_OS: u64 = 4 * GIB;

    /// 32-bit processes get a fixed ceiling that is theirs alone, so `available`
    /// equals `ceiling`. 64-bit processes are bounded by physical memory.
    pub fn detect() -> Option<Self> {
        if cfg!(target_pointer_width = "32") {
            let ceiling = if os_is_64bit() {
                Self::CEILING_32BIT_ON_64BIT_OS
            } else {
                Self::CEILING_32BIT
            };
            Some(Self { ceiling, available: ceiling })
        } else {
            Some(Self {
                ceiling: total_physical_bytes()?,
                available: available_physical_bytes()?,
            })
        }
    }
}

/// Resident set size of the current process in bytes.
pub fn process_resident_bytes() -> Option<u64> {
    resident_bytes_impl()
}

/// Installed physical memory in bytes.
pub fn total_physical_bytes() -> Option<u64> {
    total_physical_impl()
}

/// Physical memory the OS reports as available for new allocations, in bytes.
pub fn available_physical_bytes() -> Option<u64> {
    available_physical_impl()
}

/* -------------------------- Windows -------------------------- */

#[cfg(target_os = "windows")]
fn memory_status() -> Option<windows_sys::Win32::System::SystemInformation::MEMORYSTATUSEX> {
    use windows_sys::Win32::System::SystemInformation::{GlobalMemoryStatusEx, MEMORYSTATUSEX};
    unsafe {
        let mut st: MEMORYSTATUSEX = std::mem::zeroed();
        st.dwLength = std::mem::size_of::<MEMORYSTATUSEX>() as u32;
        if GlobalMemoryStatusEx(&mut st) != 0 { Some(st) } else { None }
    }
}
#[cfg(target_os = "windows")]
fn total_physical_impl() -> Option<u64> { memory_status().map(|st| st.ullTotalPhys) }
#[cfg(target_os = "windows")]
fn available_physical_impl() -> Option<u64> { memory_status().map(|st| st.ullAvailPhys) }

#[cfg(target_os = "windows")]
fn resident_bytes_impl() -> Option<u64> {
    use windows_sys::Win32::System::ProcessStatus::{
        K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS,
    };
    use windows_sys::Win32::System::Threading::GetCurrentProcess;
    unsafe {
        let mut counters: PROCESS_MEMORY_COUNTERS = std::mem::zeroed();
        let cb = std::mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
        counters.cb = cb;
        if K32GetProcessMemoryInfo(GetCurrentProcess(), &mut counters, cb) != 0 {
            Some(counters.WorkingSetSize as u64)
        } else {
            None
        }
    }
}

#[cfg(target_os = "windows")]
fn os_is_64bit() -> bool {
    if cfg!(target_pointer_width = "64") {
        return true;
    }
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, IsWow64Process};
    let mut wow64 = 0;
    unsafe { IsWow64Process(GetCurrentProcess(), &mut wow64) != 0 && wow64 != 0 }
}

/* --------------------- macOS / iOS (Darwin) --------------------- */

#[cfg(any(target_os = "macos", target_os = "ios"))]
fn sysctl_u64(name: &str) -> Option<u64> {
    use libc::{c_void, size_t, sysctlbyname};
    let cname = std::ffi::CString::new(name).ok()?;
    let mut val: u64 = 0;
    let mut len: size_t = std::mem::size_of::<u64>() as _;
    let out = &mut val as *mut _ as *mut c_void;
    let rc = unsafe { sysctlbyname(cname.as_ptr(), out, &mut len, std::ptr::null_mut(), 0) };
    if rc == 0 && val != 0 { Some(val) } else { None }
}
#[cfg(any(target_os = "macos", target_os = "ios"))]
fn sysctl_u32(name: &str) -> Option<u32> {
    use libc::{c_void, size_t, sysctlbyname};
    let cname = std::ffi::CString::new(name).ok()?;
    let mut val: u32 = 0;
    let mut len: size_t = std::mem::size_of::<u32>() as _;
    let out = &mut val as *mut _ as *mut c_void;
    let rc = unsafe { sysctlbyname(cname.as_ptr(), out, &mut len, std::ptr::null_mut(), 0) };
    if rc == 0 { Some(val) } else { None }
}
#[cfg(any(target_os = "macos", target_os = "ios"))]
fn total_physical_impl() -> Option<u64> { sysctl_u64("hw.memsize") }
#[cfg(any(target_os = "macos", target_os = "ios"))]
fn available_physical_impl() -> Option<u64> {
    let free_pages = sysctl_u32("vm.page_free_count")? as u64;
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 { return None; }
    Some(free_pages * page_size as u64)
}

#[cfg(target_os = "macos")]
fn resident_bytes_impl() -> Option<u64> {
    use libc::{c_int, c_void, proc_pidinfo, proc_taskinfo, PROC_PIDTASKINFO};
    unsafe {
        let mut info: proc_taskinfo = std::mem::zeroed();
        let size = std::mem::size_of::<proc_taskinfo>() as c_int;
        let out = &mut info as *mut _ as *mut c_void;
        let rc = proc_pidinfo(libc::getpid(), PROC_PIDTASKINFO, 0, out, size);
        if rc == size { Some(info.pti_resident_size) } else { None }
    }
}
#[cfg(target_os = "ios")]
fn resident_bytes_impl() -> Option<u64> { None }

#[cfg(any(target_os = "macos", target_os = "ios"))]
fn os_is_64bit() -> bool { cfg!(target_pointer_width = "64") }

/* --------------------- Linux / Android --------------------- */

#[cfg(any(target_os = "linux", target_os = "android"))]
fn read_proc(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            // /proc can be missing in sandboxes; only log the unexpected failures.
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path, error = %err, "failed to read procfs entry");
            }
            None
        }
    }
}
/// Finds `key:` in a procfs key/value listing and returns its kB value in bytes.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn proc_kb_field(text: &str, key: &str) -> Option<u64> {
    for line in text.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(key) {
            let Some(rest) = rest.strip_prefix(':') else { continue };
            let kb: u64 = rest.split_whitespace().next()?.parse().ok()?;
            return Some(kb.saturating_mul(1024));
        }
    }
    None
}
#[cfg(any(target_os = "linux", target_os = "android"))]
fn total_physical_impl() -> Option<u64> {
    // /proc/meminfo: "MemTotal:  16367168 kB"
    proc_kb_field(&read_proc("/proc/meminfo")?, "MemTotal")
}
#[cfg(any(target_os = "linux", target_os = "android"))]
fn available_physical_impl() -> Option<u64> {
    let text = read_proc("/proc/meminfo")?;
    // MemAvailable appeared in 3.14; older kernels only report MemFree.
    proc_kb_field(&text, "MemAvailable").or_else(|| proc_kb_field(&text, "MemFree"))
}
#[cfg(any(target_os = "linux", target_os = "android"))]
fn resident_bytes_impl() -> Option<u64> {
    proc_kb_field(&read_proc("/proc/self/status")?, "VmRSS")
}
#[cfg(any(target_os = "linux", target_os = "android"))]
fn os_is_64bit() -> bool { cfg!(target_pointer_width = "64") }

/* --------------------- Other / WASM / Fallbacks --------------------- */

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "ios",
    target_os = "linux",
    target_os = "android"
)))]
fn total_physical_impl() -> Option<u64> { None }
#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "ios",
    target_os = "linux",
    target_os = "android"
)))]
fn available_physical_impl() -> Option<u64> { None }
#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "ios",
    target_os = "linux",
    target_os = "android"
)))]
fn resident_bytes_impl() -> Option<u64> { None }
#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "ios",
    target_os = "linux",
    target_os = "android"
)))]
fn os_is_64bit() -> bool { false }

//! Thin wrappers over libc calls whose return value cannot signal failure
//! on its own.
//!
//! `getpriority(2)` and `nice(2)` both return `-1` for a legitimate nice
//! value of -1 as well as for failure. The only reliable check is to zero
//! `errno` right before the call and look at it right after. That dance is
//! kept here so callers only ever see an `io::Result`.

use std::io;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "emscripten"))]
unsafe fn errno_location() -> *mut libc::c_int {
    libc::__errno_location()
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly"
))]
unsafe fn errno_location() -> *mut libc::c_int {
    libc::__error()
}

#[cfg(any(target_os = "openbsd", target_os = "netbsd"))]
unsafe fn errno_location() -> *mut libc::c_int {
    libc::__errno()
}

/// Reset the calling thread's errno to zero.
pub fn clear_errno() {
    // SAFETY: errno_location returns the thread-local errno slot, valid for
    // the lifetime of the thread.
    unsafe {
        *errno_location() = 0;
    }
}

/// Run a call whose `-1` return is ambiguous.
///
/// errno is cleared before `f` runs. A `-1` result is an error only when
/// errno is non-zero afterwards.
pub fn call_with_errno<F>(f: F) -> io::Result<libc::c_int>
where
    F: FnOnce() -> libc::c_int,
{
    clear_errno();
    let ret = f();
    if ret == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error().unwrap_or(0) != 0 {
            return Err(err);
        }
    }
    Ok(ret)
}

/// Convert a NUL-terminated `c_char` buffer (e.g. a `utsname` field) to an
/// owned string, replacing invalid UTF-8.
pub fn c_chars_to_string(buf: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

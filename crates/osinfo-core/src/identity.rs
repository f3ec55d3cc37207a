//! UID/GID to name resolution.
//!
//! Lookups go straight to the system user/group database on every call
//! (`getpwuid_r(3)` / `getgrgid_r(3)`); nothing is cached. An identifier with
//! no database entry is not an error: it resolves to [`UNKNOWN_NAME`].

use serde::Serialize;
use std::ffi::CStr;
use tracing::trace;

/// Placeholder name for identifiers absent from the database.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Initial scratch buffer for the reentrant lookups.
const INITIAL_BUF_LEN: usize = 1024;

/// Upper bound on scratch buffer growth.
const MAX_BUF_LEN: usize = 1 << 20;

/// A numeric identifier paired with its resolved name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    pub id: u32,
    pub name: String,
}

/// Source of user and group names.
pub trait NameResolver {
    /// Registered user name for `uid`, or `None` if absent.
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Registered group name for `gid`, or `None` if absent.
    fn group_name(&self, gid: u32) -> Option<String>;

    fn user(&self, uid: u32) -> IdentityRecord {
        IdentityRecord {
            id: uid,
            name: self
                .user_name(uid)
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        }
    }

    fn group(&self, gid: u32) -> IdentityRecord {
        IdentityRecord {
            id: gid,
            name: self
                .group_name(gid)
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        }
    }
}

/// Resolver backed by the OS user/group database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn user_name(&self, uid: u32) -> Option<String> {
        lookup_user(uid)
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        lookup_group(gid)
    }
}

/// Resolve a user ID to its name, or `"Unknown"`.
pub fn resolve_user(uid: u32) -> String {
    SystemResolver.user(uid).name
}

/// Resolve a group ID to its name, or `"Unknown"`.
pub fn resolve_group(gid: u32) -> String {
    SystemResolver.group(gid).name
}

fn lookup_user(uid: u32) -> Option<String> {
    let mut buf_len = INITIAL_BUF_LEN;
    loop {
        let mut buf = vec![0 as libc::c_char; buf_len];
        // SAFETY: passwd is plain old data; getpwuid_r fills it in.
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        let rc = unsafe {
            libc::getpwuid_r(
                uid as libc::uid_t,
                &mut pwd,
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        if rc == libc::ERANGE && buf_len < MAX_BUF_LEN {
            buf_len *= 2;
            continue;
        }
        if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
            trace!(uid, rc, "user not found in database");
            return None;
        }

        // SAFETY: pw_name points into `buf`, which is still alive.
        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

fn lookup_group(gid: u32) -> Option<String> {
    let mut buf_len = INITIAL_BUF_LEN;
    loop {
        let mut buf = vec![0 as libc::c_char; buf_len];
        // SAFETY: group is plain old data; getgrgid_r fills it in.
        let mut grp: libc::group = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::group = std::ptr::null_mut();

        let rc = unsafe {
            libc::getgrgid_r(
                gid as libc::gid_t,
                &mut grp,
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        if rc == libc::ERANGE && buf_len < MAX_BUF_LEN {
            buf_len *= 2;
            continue;
        }
        if rc != 0 || result.is_null() || grp.gr_name.is_null() {
            trace!(gid, rc, "group not found in database");
            return None;
        }

        // SAFETY: gr_name points into `buf`, which is still alive.
        let name = unsafe { CStr::from_ptr(grp.gr_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

//! Rendering of raw file metadata.
//!
//! - [`format_permissions`] turns `st_mode` into the familiar `ls -l` style
//!   ten character string.
//! - [`format_timestamp`] renders epoch seconds in local time as
//!   `YYYY-MM-DD HH:MM:SS`.

use chrono::{DateTime, Local, TimeZone};
use serde::{Serialize, Serializer};

/// Bit mask for the file type portion of a mode.
pub const S_IFMT: u32 = 0o170_000;
/// Directory type bits.
pub const S_IFDIR: u32 = 0o040_000;
/// Symbolic link type bits.
pub const S_IFLNK: u32 = 0o120_000;

/// Timestamp layout used in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Permission bits in output order, each paired with the glyph it enables.
const PERMISSION_TABLE: [(u32, u8); 9] = [
    (0o400, b'r'),
    (0o200, b'w'),
    (0o100, b'x'),
    (0o040, b'r'),
    (0o020, b'w'),
    (0o010, b'x'),
    (0o004, b'r'),
    (0o002, b'w'),
    (0o001, b'x'),
];

/// File type as far as the permission string cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Directory,
    Symlink,
    /// Regular files and every other type (fifo, socket, device).
    Other,
}

impl FileKind {
    /// Classify a mode. Directory is tested first, then symlink.
    pub fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFDIR => FileKind::Directory,
            S_IFLNK => FileKind::Symlink,
            _ => FileKind::Other,
        }
    }

    pub fn glyph(self) -> u8 {
        match self {
            FileKind::Directory => b'd',
            FileKind::Symlink => b'l',
            FileKind::Other => b'-',
        }
    }
}

/// A fixed ten character permission string such as `drwxr-xr-x`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionString([u8; 10]);

impl PermissionString {
    pub fn from_mode(mode: u32) -> Self {
        let mut out = [b'-'; 10];
        out[0] = FileKind::from_mode(mode).glyph();
        for (slot, (bit, glyph)) in out[1..].iter_mut().zip(PERMISSION_TABLE) {
            if mode & bit != 0 {
                *slot = glyph;
            }
        }
        PermissionString(out)
    }

    pub fn as_str(&self) -> &str {
        // Every byte comes from the ASCII glyph set above.
        std::str::from_utf8(&self.0).unwrap_or("----------")
    }

    pub fn as_bytes(&self) -> &[u8; 10] {
        &self.0
    }
}

impl std::fmt::Display for PermissionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for PermissionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PermissionString({})", self.as_str())
    }
}

impl Serialize for PermissionString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Render `mode` as a ten character permission string.
pub fn format_permissions(mode: u32) -> PermissionString {
    PermissionString::from_mode(mode)
}

/// Render epoch seconds in the system's local time zone.
///
/// Returns `None` when the timestamp is outside chrono's representable range.
pub fn format_timestamp(epoch_secs: i64) -> Option<String> {
    format_timestamp_in(&Local, epoch_secs)
}

/// Render epoch seconds in an explicit time zone.
pub fn format_timestamp_in<Tz>(tz: &Tz, epoch_secs: i64) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|utc| utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use proptest::prelude::*;

    const S_IFREG: u32 = 0o100_000;

    #[test]
    fn regular_file_rw_r_r() {
        assert_eq!(format_permissions(S_IFREG | 0o644).as_str(), "-rw-r--r--");
    }

    #[test]
    fn directory_rwxr_xr_x() {
        assert_eq!(format_permissions(S_IFDIR | 0o755).as_str(), "drwxr-xr-x");
    }

    #[test]
    fn symlink_rwxrwxrwx() {
        assert_eq!(format_permissions(S_IFLNK | 0o777).as_str(), "lrwxrwxrwx");
    }

    #[test]
    fn no_permissions() {
        assert_eq!(format_permissions(S_IFREG).as_str(), "----------");
    }

    #[test]
    fn special_types_render_as_dash() {
        // fifo, char device, block device, socket
        for kind in [0o010_000, 0o020_000, 0o060_000, 0o140_000] {
            assert_eq!(format_permissions(kind | 0o600).as_str(), "-rw-------");
        }
    }

    #[test]
    fn setuid_sticky_bits_do_not_leak() {
        assert_eq!(
            format_permissions(S_IFREG | 0o4000 | 0o2000 | 0o1000 | 0o750).as_str(),
            "-rwxr-x---"
        );
    }

    #[test]
    fn each_bit_sets_only_its_position() {
        let expected = [
            "-r--------",
            "--w-------",
            "---x------",
            "----r-----",
            "-----w----",
            "------x---",
            "-------r--",
            "--------w-",
            "---------x",
        ];
        for (i, (bit, _)) in PERMISSION_TABLE.iter().enumerate() {
            assert_eq!(format_permissions(S_IFREG | bit).as_str(), expected[i]);
        }
    }

    #[test]
    fn file_kind_classification() {
        assert_eq!(FileKind::from_mode(S_IFDIR | 0o700), FileKind::Directory);
        assert_eq!(FileKind::from_mode(S_IFLNK), FileKind::Symlink);
        assert_eq!(FileKind::from_mode(S_IFREG), FileKind::Other);
        assert_eq!(FileKind::from_mode(0), FileKind::Other);
    }

    #[test]
    fn permission_string_serializes_as_str() {
        let perm = format_permissions(S_IFDIR | 0o700);
        assert_eq!(serde_json::to_string(&perm).unwrap(), "\"drwx------\"");
    }

    #[test]
    fn timestamp_epoch_utc() {
        assert_eq!(
            format_timestamp_in(&Utc, 0).as_deref(),
            Some("1970-01-01 00:00:00")
        );
    }

    #[test]
    fn timestamp_respects_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_timestamp_in(&plus_two, 1_733_616_000).as_deref(),
            Some("2024-12-08 02:00:00")
        );
    }

    #[test]
    fn timestamp_local_has_canonical_shape() {
        let rendered = format_timestamp(1_700_000_000).unwrap();
        assert_eq!(rendered.len(), 19);
        let bytes = rendered.as_bytes();
        assert_eq!(bytes[4], b'-');
        assert_eq!(bytes[7], b'-');
        assert_eq!(bytes[10], b' ');
        assert_eq!(bytes[13], b':');
        assert_eq!(bytes[16], b':');
    }

    #[test]
    fn timestamp_out_of_range_is_none() {
        assert!(format_timestamp_in(&Utc, i64::MAX).is_none());
    }

    proptest! {
        #[test]
        fn always_ten_chars_from_fixed_alphabet(mode in any::<u32>()) {
            let perm = format_permissions(mode);
            let bytes = perm.as_bytes();
            prop_assert_eq!(perm.as_str().len(), 10);
            prop_assert!(matches!(bytes[0], b'd' | b'l' | b'-'));
            for (i, &b) in bytes[1..].iter().enumerate() {
                let allowed = PERMISSION_TABLE[i].1;
                prop_assert!(b == allowed || b == b'-');
            }
        }

        #[test]
        fn flipping_one_bit_changes_one_char(mode in any::<u32>(), idx in 0usize..9) {
            let (bit, _) = PERMISSION_TABLE[idx];
            let before = format_permissions(mode);
            let after = format_permissions(mode ^ bit);
            let diffs: Vec<usize> = before
                .as_bytes()
                .iter()
                .zip(after.as_bytes())
                .enumerate()
                .filter(|(_, (a, b))| a != b)
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(diffs, vec![idx + 1]);
        }
    }
}

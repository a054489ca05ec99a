//! Row - the fixed-width record stored in every leaf cell.

use std::fmt;

use crate::common::{Error, Result};
use crate::storage::page::{read_u32, write_u32};

/// Width of the `username` column in bytes.
pub const USERNAME_SIZE: usize = 32;
/// Width of the `email` column in bytes.
pub const EMAIL_SIZE: usize = 255;
/// Width of the `id` column in bytes.
pub const ID_SIZE: usize = std::mem::size_of::<u32>();

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;

/// Encoded size of a row.
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

/// A record in the table.
///
/// # Layout (291 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     id (u32, little-endian)
/// 4       32    username (UTF-8, zero-padded)
/// 36      255   email (UTF-8, zero-padded)
/// ```
///
/// Strings carry no length prefix: a field ends at its first zero byte or
/// at the field width.
///
/// # Example
/// ```
/// use leafdb::{Row, ROW_SIZE};
///
/// let row = Row::new(1, "alice", "alice@example.com").unwrap();
/// let mut buf = [0u8; ROW_SIZE];
/// row.serialize(&mut buf);
/// assert_eq!(Row::deserialize(&buf), row);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    /// Create a row, checking that both strings fit their columns.
    ///
    /// # Errors
    /// Returns `Error::StringTooLong` naming the first field that overflows.
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let email = email.into();

        check_width("username", &username, USERNAME_SIZE)?;
        check_width("email", &email, EMAIL_SIZE)?;

        Ok(Self {
            id,
            username,
            email,
        })
    }

    /// Encode into the first [`ROW_SIZE`] bytes of `dst`.
    ///
    /// Strings longer than their column are truncated; the remainder of each
    /// column is zero-filled so no bytes from a previous occupant survive.
    ///
    /// # Panics
    /// Panics if `dst.len() < ROW_SIZE`.
    pub fn serialize(&self, dst: &mut [u8]) {
        assert!(dst.len() >= ROW_SIZE, "buffer too small for Row");

        write_u32(dst, ID_OFFSET, self.id);
        write_field(
            &mut dst[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            &self.username,
        );
        write_field(&mut dst[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE], &self.email);
    }

    /// Decode from the first [`ROW_SIZE`] bytes of `src`.
    ///
    /// # Panics
    /// Panics if `src.len() < ROW_SIZE`.
    pub fn deserialize(src: &[u8]) -> Self {
        assert!(src.len() >= ROW_SIZE, "buffer too small for Row");

        Self {
            id: read_u32(src, ID_OFFSET),
            username: read_field(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]),
            email: read_field(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn check_width(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::StringTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

fn write_field(dst: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(dst.len());
    dst[..len].copy_from_slice(&bytes[..len]);
    dst[len..].fill(0);
}

fn read_field(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}

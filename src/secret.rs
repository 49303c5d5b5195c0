use std::ffi::{OsStr, OsString};

use crate::error::Error;

/// Something that can be hashed as a password.
///
/// Strings and byte slices always convert. OS strings convert only when they
/// are valid Unicode, otherwise [`Error::InvalidSecret`] is returned, so the
/// same password typed on different platforms hashes to the same bytes.
pub trait Secret {
    /// The password bytes fed to scrypt
    fn secret_bytes(&self) -> Result<&[u8], Error>;
}

impl Secret for str {
    fn secret_bytes(&self) -> Result<&[u8], Error> {
        Ok(self.as_bytes())
    }
}

impl Secret for String {
    fn secret_bytes(&self) -> Result<&[u8], Error> {
        Ok(self.as_bytes())
    }
}

impl Secret for [u8] {
    fn secret_bytes(&self) -> Result<&[u8], Error> {
        Ok(self)
    }
}

impl<const N: usize> Secret for [u8; N] {
    fn secret_bytes(&self) -> Result<&[u8], Error> {
        Ok(self)
    }
}

impl Secret for Vec<u8> {
    fn secret_bytes(&self) -> Result<&[u8], Error> {
        Ok(self)
    }
}

impl Secret for OsStr {
    fn secret_bytes(&self) -> Result<&[u8], Error> {
        self.to_str().map(str::as_bytes).ok_or(Error::InvalidSecret)
    }
}

impl Secret for OsString {
    fn secret_bytes(&self) -> Result<&[u8], Error> {
        self.as_os_str().secret_bytes()
    }
}

impl<T: Secret + ?Sized> Secret for &T {
    fn secret_bytes(&self) -> Result<&[u8], Error> {
        (**self).secret_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!("pw".secret_bytes().unwrap(), b"pw");
        assert_eq!(String::from("pw").secret_bytes().unwrap(), b"pw");
        assert_eq!(b"pw".secret_bytes().unwrap(), b"pw");
        assert_eq!(vec![0xffu8, 0].secret_bytes().unwrap(), [0xff, 0]);
        assert_eq!(OsStr::new("pw").secret_bytes().unwrap(), b"pw");
        assert_eq!(OsString::from("pw").secret_bytes().unwrap(), b"pw");
    }

    #[test]
    #[cfg(unix)]
    fn non_unicode_os_string_is_rejected() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(&[b'p', 0xff, b'w']);
        assert!(matches!(raw.secret_bytes(), Err(Error::InvalidSecret)));
    }
}

//! The `N$r$p$saltHex` salt string.

use core::{fmt, str::FromStr};
use std::borrow::Cow;

use rand::RngCore;

use crate::{
    config::{SALT_SIZE_RANGE, clamp_salt_size},
    cost::CostParams,
    error::Error,
};

/// Salt hex length that marks a legacy hash
pub const LEGACY_SALT_HEX_LEN: usize = 40;
/// Shortest accepted salt hex
pub const MIN_SALT_HEX_LEN: usize = 16;
/// Longest accepted salt hex
pub const MAX_SALT_HEX_LEN: usize = 64;

/// Hash generation, told apart by the length of the salt hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// 40 character salt, `SHA1(scrypt(password, whole salt string, 256 bytes))`
    Legacy,
    /// any other salt length, `scrypt(password, unhex(salt), key_len)`
    Current,
}

impl Format {
    /// The format a salt hex segment belongs to
    pub const fn of_salt_hex(salt_hex: &str) -> Self {
        if salt_hex.len() == LEGACY_SALT_HEX_LEN {
            Self::Legacy
        } else {
            Self::Current
        }
    }
}

/// A cost string joined with a salt, `"400$8$1$0011..."`.
///
/// The cost text is kept exactly as it was parsed because legacy hashes feed
/// the whole salt string into scrypt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Salt {
    encoded: String,
    cost_end: usize,
    cost: CostParams,
    format: Format,
}

impl Salt {
    /// Draw `salt_size` random bytes (clamped to 8..=32) for `cost`.
    pub fn generate(cost: CostParams, salt_size: usize) -> Self {
        let mut bytes = vec![0u8; clamp_salt_size(salt_size)];
        rand::rng().fill_bytes(&mut bytes);
        Self::encode(cost, &bytes)
    }

    /// Build a current format salt from 8 to 32 given bytes.
    ///
    /// Other lengths fail with [`Error::InvalidSalt`]. A 20 byte input gets
    /// one leading `0` in its hex so it is never read as legacy.
    pub fn from_random_bytes(cost: CostParams, bytes: &[u8]) -> Result<Self, Error> {
        if !SALT_SIZE_RANGE.contains(&bytes.len()) {
            return Err(Error::InvalidSalt);
        }
        Ok(Self::encode(cost, bytes))
    }

    fn encode(cost: CostParams, bytes: &[u8]) -> Self {
        let mut salt_hex = hex::encode(bytes);
        if salt_hex.len() == LEGACY_SALT_HEX_LEN {
            salt_hex.insert(0, '0');
        }

        let cost_text = cost.to_string();
        let cost_end = cost_text.len();
        Self {
            encoded: cost_text + &salt_hex,
            cost_end,
            cost,
            format: Format::Current,
        }
    }

    /// The cost triple
    pub fn cost(&self) -> CostParams {
        self.cost
    }

    /// The cost text as stored, with trailing `$`
    pub fn cost_str(&self) -> &str {
        &self.encoded[..self.cost_end]
    }

    /// The salt hex segment
    pub fn salt_hex(&self) -> &str {
        &self.encoded[self.cost_end..]
    }

    /// Legacy or current
    pub fn format(&self) -> Format {
        self.format
    }

    /// The whole salt string
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The salt bytes handed to scrypt.
    pub(crate) fn kdf_salt(&self) -> Cow<'_, [u8]> {
        match self.format {
            Format::Legacy => Cow::Borrowed(self.encoded.as_bytes()),
            Format::Current => Cow::Owned(unpack_hex(strip_zero_pairs(self.salt_hex()))),
        }
    }

    /// Build from already split segments, `None` if any fails its grammar.
    pub(crate) fn from_segments(n: &str, r: &str, p: &str, salt_hex: &str) -> Option<Self> {
        let cost = CostParams::from_segments(n, r, p)?;
        if !is_salt_hex(salt_hex) {
            return None;
        }
        let cost_end = n.len() + r.len() + p.len() + 3;
        Some(Self {
            encoded: format!("{n}${r}${p}${salt_hex}"),
            cost_end,
            cost,
            format: Format::of_salt_hex(salt_hex),
        })
    }
}

/// `[A-Za-z0-9]{16,64}`
pub(crate) fn is_salt_hex(s: &str) -> bool {
    (MIN_SALT_HEX_LEN..=MAX_SALT_HEX_LEN).contains(&s.len())
        && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Drop leading `"00"` pairs.
pub(crate) fn strip_zero_pairs(mut s: &str) -> &str {
    while let Some(rest) = s.strip_prefix("00") {
        s = rest;
    }
    s
}

/// Decode hex nibbles, high nibble first.
///
/// An odd trailing nibble becomes the high half of a final byte. Letters
/// outside `a-f` decode as `((c & 15) + 9) & 15` so every salt the grammar
/// admits maps to the same bytes stored hashes were made with.
pub(crate) fn unpack_hex(s: &str) -> Vec<u8> {
    fn nibble(c: u8) -> u8 {
        if c.is_ascii_alphabetic() {
            ((c & 15) + 9) & 15
        } else {
            c & 15
        }
    }

    s.as_bytes()
        .chunks(2)
        .map(|pair| (nibble(pair[0]) << 4) | pair.get(1).map_or(0, |&c| nibble(c)))
        .collect()
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for Salt {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('$');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(n), Some(r), Some(p), Some(salt_hex), None) => {
                Self::from_segments(n, r, p, salt_hex).ok_or(Error::InvalidSalt)
            }
            _ => Err(Error::InvalidSalt),
        }
    }
}

/// Parse a `N$r$p$saltHex` string.
pub fn parse_salt(s: &str) -> Result<Salt, Error> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const COST: CostParams = CostParams::new(1024, 8, 1);

    #[test]
    fn parse() {
        let salt = parse_salt("400$8$1$0123456789abcdef").unwrap();
        assert_eq!(salt.cost(), COST);
        assert_eq!(salt.cost_str(), "400$8$1$");
        assert_eq!(salt.salt_hex(), "0123456789abcdef");
        assert_eq!(salt.format(), Format::Current);
        assert_eq!(salt.to_string(), "400$8$1$0123456789abcdef");
    }

    #[test]
    fn cost_text_is_kept_verbatim() {
        let salt = parse_salt("0400$08$1$0123456789abcdef0123456789abcdef01234567").unwrap();
        assert_eq!(salt.cost(), COST);
        assert_eq!(salt.cost_str(), "0400$08$1$");
        assert_eq!(salt.format(), Format::Legacy);
        assert_eq!(
            salt.kdf_salt(),
            b"0400$08$1$0123456789abcdef0123456789abcdef01234567".as_slice()
        );
    }

    #[rstest]
    #[case("")]
    #[case("400$8$1$")]
    #[case("400$8$1$0123456789abcde")]
    #[case("400$8$1$0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0")]
    #[case("400$8$1$0123456789abcdef$")]
    #[case("400$8$0123456789abcdef")]
    #[case("400$8$1$0123456789abcde_")]
    #[case("400$8$X$0123456789abcdef")]
    #[case("zz$8$1$0123456789abcdef")]
    fn rejects_malformed(#[case] s: &str) {
        assert!(matches!(parse_salt(s), Err(Error::InvalidSalt)));
    }

    #[rstest]
    #[case(16, Format::Current)]
    #[case(38, Format::Current)]
    #[case(39, Format::Current)]
    #[case(40, Format::Legacy)]
    #[case(41, Format::Current)]
    #[case(64, Format::Current)]
    fn format_by_length(#[case] len: usize, #[case] expected: Format) {
        let salt = parse_salt(&format!("400$8$1${}", "a".repeat(len))).unwrap();
        assert_eq!(salt.format(), expected);
    }

    #[rstest]
    #[case(8, 16)]
    #[case(19, 38)]
    #[case(20, 41)]
    #[case(21, 42)]
    #[case(32, 64)]
    fn generated_length(#[case] size: usize, #[case] hex_len: usize) {
        let salt = Salt::generate(COST, size);
        assert_eq!(salt.salt_hex().len(), hex_len);
        assert_eq!(salt.format(), Format::Current);
        assert_eq!(salt.cost_str(), "400$8$1$");
        // what we generate must parse back to the same thing
        assert_eq!(parse_salt(salt.as_str()).unwrap(), salt);
    }

    #[test]
    fn generated_size_is_clamped() {
        assert_eq!(Salt::generate(COST, 0).salt_hex().len(), 16);
        assert_eq!(Salt::generate(COST, 1000).salt_hex().len(), 64);
    }

    #[test]
    fn generated_salts_differ() {
        assert_ne!(Salt::generate(COST, 32), Salt::generate(COST, 32));
    }

    #[test]
    fn twenty_bytes_are_disambiguated() {
        let salt = Salt::from_random_bytes(COST, &[0xab; 20]).unwrap();
        assert_eq!(salt.salt_hex(), format!("0{}", "ab".repeat(20)));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(7)]
    #[case(33)]
    #[case(40)]
    fn given_bytes_out_of_range_are_rejected(#[case] len: usize) {
        assert!(matches!(
            Salt::from_random_bytes(COST, &vec![0xab; len]),
            Err(Error::InvalidSalt)
        ));
    }

    #[test]
    fn given_bytes_in_range_parse_back() {
        for len in SALT_SIZE_RANGE {
            let salt = Salt::from_random_bytes(COST, &vec![0xff; len]).unwrap();
            assert_eq!(parse_salt(salt.as_str()).unwrap(), salt, "{len} bytes");
            if len != 20 {
                assert_eq!(salt.kdf_salt(), vec![0xffu8; len].as_slice());
            }
        }
    }

    #[rstest]
    #[case("0011", "11")]
    #[case("000011", "11")]
    #[case("0000", "")]
    #[case("00a1b2", "a1b2")]
    #[case("0a1b", "0a1b")]
    #[case("000a1b", "0a1b")]
    fn zero_pair_stripping(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_zero_pairs(input), expected);
    }

    #[rstest]
    #[case("00ff", &[0x00, 0xff])]
    #[case("ABcd", &[0xab, 0xcd])]
    #[case("abc", &[0xab, 0xc0])]
    #[case("zZgG", &[0x33, 0x00])]
    #[case("", &[])]
    fn nibble_decoding(#[case] input: &str, #[case] expected: &[u8]) {
        assert_eq!(unpack_hex(input), expected);
    }

    #[test]
    fn odd_padded_salt_loses_its_leading_zero_pair() {
        let salt =
            parse_salt("400$8$1$00a1b2c3d4e5f60718293a4b5c6d7e8f901234567").unwrap();
        assert_eq!(salt.format(), Format::Current);
        let raw = salt.kdf_salt();
        assert_eq!(raw.len(), 20);
        assert_eq!(raw[0], 0xa1);
        assert_eq!(raw[19], 0x70);
    }
}

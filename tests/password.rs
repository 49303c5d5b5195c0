use rstest::rstest;
use scrypt_pwhash::{
    CalibrationBudget, CostParams, Error, Format, HashOptions, Hasher, PasswordHash, RustCrypto,
    hash_password, parse_hash, parse_salt, verify_password,
};

#[rstest]
#[case(
    "correct horse",
    "400$8$1$00112233445566778899aabbccddeeff0123456789abcdef0011223344556677$378116ad4b16653436496c198feb3c6f10f1c75624318a48d95e8ceef2b9c314",
    Format::Current
)]
#[case(
    "legacy secret",
    "400$8$1$0123456789abcdef0123456789abcdef01234567$f4333e4908a2ca4537e48e163f6975bbba00ce8d",
    Format::Legacy
)]
#[case(
    "odd salt",
    "400$8$1$00a1b2c3d4e5f60718293a4b5c6d7e8f901234567$05990a22091cdc522d1672dbe3278da600d82d089ef225904dc67d67881dbc18",
    Format::Current
)]
#[case(
    "non hex",
    "400$8$1$zyxwvutsrqponmlk$e92cdb439a86d3240d2a707f11e2aa5f",
    Format::Current
)]
#[case("", "10$1$1$0000000000000000a1$c93abd95af4187a84210243144f4f63d", Format::Current)]
fn known_hashes(#[case] password: &str, #[case] stored: &str, #[case] format: Format) {
    let hash = parse_hash(stored).unwrap();
    assert_eq!(hash.format(), format);
    assert_eq!(hash.to_string(), stored);

    assert!(verify_password(password, stored).unwrap());
    assert!(!verify_password(&format!("{password}x"), stored).unwrap());

    // re-hashing under the stored salt reproduces the stored string
    let rehashed = Hasher::with_kdf(RustCrypto)
        .create_hash(password, hash.salt(), hash.key_len())
        .unwrap();
    assert_eq!(rehashed.to_string(), stored);
}

#[test]
fn hash_and_verify_round_trip() {
    let options = HashOptions::with_cost(CostParams::new(1024, 8, 1));
    let hash = hash_password("correct horse", &options).unwrap();
    let stored = hash.to_string();

    let mut segments = stored.split('$');
    assert_eq!(segments.next(), Some("400"));
    assert_eq!(segments.next(), Some("8"));
    assert_eq!(segments.next(), Some("1"));
    assert_eq!(segments.next().map(str::len), Some(64));
    assert_eq!(segments.next().map(str::len), Some(64));
    assert_eq!(segments.next(), None);

    assert!(verify_password("correct horse", &stored).unwrap());
    assert!(!verify_password("correct horsE", &stored).unwrap());
}

#[test]
fn new_hashes_are_never_legacy() {
    let options = HashOptions {
        salt_size: 20,
        ..HashOptions::with_cost(CostParams::new(16, 8, 1))
    };
    for _ in 0..8 {
        let hash = hash_password("pw", &options).unwrap();
        assert_eq!(hash.salt_hex().len(), 41);
        assert!(hash.salt_hex().starts_with('0'));
        assert_eq!(hash.format(), Format::Current);
        assert!(verify_password("pw", &hash.to_string()).unwrap());
    }
}

#[test]
fn same_password_different_salts() {
    let options = HashOptions::with_cost(CostParams::new(16, 8, 1));
    let a = hash_password("pw", &options).unwrap();
    let b = hash_password("pw", &options).unwrap();
    assert_ne!(a.salt_hex(), b.salt_hex());
    assert_ne!(a.digest_hex(), b.digest_hex());
}

#[rstest]
#[case("zz$$$short")]
#[case("400$8$1$0123456789abcdef")]
#[case("400$8$1$0123456789abcdef$abc")]
#[case("not a hash at all")]
fn malformed_hashes(#[case] stored: &str) {
    assert!(matches!(
        verify_password("pw", stored),
        Err(Error::InvalidHash)
    ));
}

#[test]
fn salt_string_hashing() {
    let hasher = Hasher::new();
    let salt = parse_salt("400$8$1$00112233445566778899aabbccddeeff0123456789abcdef0011223344556677")
        .unwrap();
    let hash = hasher
        .hash_secret("correct horse", salt.as_str(), 32)
        .unwrap();
    assert_eq!(hash.salt(), &salt);
    assert!(hash.is_password("correct horse").unwrap());

    assert!(matches!(
        hasher.hash_secret("correct horse", "400$8$1$", 32),
        Err(Error::InvalidSalt)
    ));
}

#[test]
fn tampered_cost_fails_to_verify() {
    let stored = "400$8$1$00112233445566778899aabbccddeeff0123456789abcdef0011223344556677$378116ad4b16653436496c198feb3c6f10f1c75624318a48d95e8ceef2b9c314";
    let tampered: PasswordHash = stored.replacen("400$8$1$", "400$8$2$", 1).parse().unwrap();
    assert!(!Hasher::new().verify("correct horse", &tampered).unwrap());
}

#[test]
fn calibration_stays_in_bounds() {
    let budget = CalibrationBudget {
        max_time: std::time::Duration::from_millis(50),
        ..CalibrationBudget::DEFAULT
    };
    let cost = scrypt_pwhash::calibrate(&budget).unwrap();
    assert!(cost.n.is_power_of_two() && cost.n >= 2, "{cost:?}");
    assert_eq!(cost.r, 8);
    assert!(cost.validate().is_ok() || cost.p == 0, "{cost:?}");
    // 16 MiB ceiling with 128 * N * r bytes, N picked below twice the limit
    assert!(cost.memory_bytes().unwrap() <= 32 << 20, "{cost:?}");
}

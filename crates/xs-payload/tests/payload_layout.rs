use std::collections::VecDeque;

use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, SeedableRng};
use xs_core::{offsets, SignConfig, XsError, PAYLOAD_LENGTH};
use xs_hal::{BoundedRandom, FixedClock, RngSource};
use xs_payload::{md5_hex, PayloadBuilder, SignRequest};
use xs_session::SignSession;

const URI: &str = "/api/sns/web/v1/homefeed{\"num\":47}";
const A1: &str = "187d2defea8dz1fgwydnci40kw265ikh9fsxn66qs50000726043";
const NOW_MS: u64 = 1_700_000_000_123;

/// Fixed seed plus a queue of range draws.
struct Scripted {
    seed: u32,
    draws: VecDeque<u32>,
}

impl Scripted {
    fn new(seed: u32, draws: &[u32]) -> Self {
        Self { seed, draws: draws.iter().copied().collect() }
    }
}

impl BoundedRandom for Scripted {
    fn random_u32(&mut self) -> u32 { self.seed }
    fn random_in_range(&mut self, min: u32, max: u32) -> u32 {
        let v = self.draws.pop_front().expect("script exhausted");
        assert!(v >= min && v <= max, "scripted draw {} outside {}..={}", v, min, max);
        v
    }
}

fn builder() -> PayloadBuilder {
    PayloadBuilder::new(SignConfig::default()).unwrap()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[test]
fn test_exact_bytes_random_branch() {
    let md5 = md5_hex(URI.as_bytes());
    assert_eq!(md5, "fe2a59acce37b17d574e8f1a2895a278");

    let req = SignRequest::new(&md5, A1).content(URI);
    let mut rng = Scripted::new(0x1234_5678, &[30, 20, 1100]);
    let payload = builder().build(&req, NOW_MS, None, &mut rng).unwrap();

    let expected = concat!(
        "79686029785634127b68e5cf8b0100004bf3e4cf8b010000140000004c040000",
        "22000000865221d4b64fc905343138376432646566656138647a316667777964",
        "6e636934306b77323635696b68396673786e3636717335303030303732363034",
        "330a7868732d70632d776562010bf9416767c9b583635e0744fa841502613310",
        "b26555d7520cda2d34c8d9c8059abc87",
    );
    assert_eq!(hex(payload.as_bytes()), expected);
    assert!(rng.draws.is_empty());
}

#[test]
fn test_length_invariant_both_branches() {
    let b = builder();
    let md5 = md5_hex(URI.as_bytes());
    let req = SignRequest::new(&md5, A1).content(URI);
    let mut rng = RngSource::new(OsRng);

    let mut session = SignSession::new(b.config(), &FixedClock(NOW_MS - 5_000), RngSource::new(OsRng)).unwrap();

    for _ in 0..50 {
        let plain = b.build(&req, NOW_MS, None, &mut rng).unwrap();
        assert_eq!(plain.as_bytes().len(), PAYLOAD_LENGTH);

        let state = session.snapshot(URI);
        let with_session = b.build(&req, NOW_MS, Some(&state), &mut rng).unwrap();
        assert_eq!(with_session.to_vec().len(), PAYLOAD_LENGTH);
    }
}

#[test]
fn test_session_fields_propagate() {
    let b = builder();
    let md5 = md5_hex(URI.as_bytes());
    let req = SignRequest::new(&md5, A1).content(URI);

    let mut session = SignSession::new(
        b.config(),
        &FixedClock(1_699_999_990_000),
        RngSource::new(ChaCha20Rng::seed_from_u64(5)),
    ).unwrap();
    session.snapshot(URI);
    let state = session.snapshot(URI);

    // Session branch draws only the seed
    let mut rng = Scripted::new(0x1234_5678, &[]);
    let payload = b.build(&req, NOW_MS, Some(&state), &mut rng).unwrap();

    assert_eq!(payload.page_load_timestamp(), 1_699_999_990_000);
    assert_eq!(payload.sequence_value(), state.sequence_value());
    assert_eq!(payload.window_props_length(), state.window_props_length());
    assert_eq!(payload.uri_length(), 34);
    assert_eq!(payload.timestamp_ms(), NOW_MS);

    // Everything outside the session range matches the random branch
    let mut rng = Scripted::new(0x1234_5678, &[30, 20, 1100]);
    let plain = b.build(&req, NOW_MS, None, &mut rng).unwrap();
    assert_eq!(payload.as_bytes()[..offsets::PAGE_LOAD_TIMESTAMP], plain.as_bytes()[..offsets::PAGE_LOAD_TIMESTAMP]);
    assert_eq!(payload.as_bytes()[offsets::MD5_XOR..], plain.as_bytes()[offsets::MD5_XOR..]);
}

#[test]
fn test_random_branch_fields_in_range() {
    let b = builder();
    let md5 = md5_hex(b"/api/x");
    let req = SignRequest::new(&md5, A1).content("/api/x?q=é");
    let mut rng = RngSource::new(ChaCha20Rng::seed_from_u64(11));

    for _ in 0..100 {
        let p = b.build(&req, NOW_MS, None, &mut rng).unwrap();
        let lag = NOW_MS - p.page_load_timestamp();
        assert!(lag >= 10_000 && lag <= 50_000 && lag % 1000 == 0, "lag {}", lag);
        assert!((15..=50).contains(&p.sequence_value()));
        assert!((1000..=1200).contains(&p.window_props_length()));
        // UTF-8 byte length: 'é' is two bytes
        assert_eq!(p.uri_length(), 11);
    }
}

#[test]
fn test_seed_consistency() {
    let b = builder();
    let md5 = md5_hex(URI.as_bytes());
    let md5_raw = xs_payload::parse_md5_hex(&md5).unwrap();
    let req = SignRequest::new(&md5, A1).content(URI);
    let mut rng = RngSource::new(OsRng);

    for _ in 0..20 {
        let p = b.build(&req, NOW_MS, None, &mut rng).unwrap();
        let bytes = p.as_bytes();
        let seed_byte = p.seed_byte();
        assert_eq!(seed_byte, (p.seed() & 0xFF) as u8);
        assert_eq!(seed_byte, bytes[4]);

        for i in 0..8 {
            assert_eq!(bytes[offsets::MD5_XOR + i] ^ seed_byte, md5_raw[i]);
        }
        assert_eq!(bytes[offsets::ENV_BLOCK], 1);
        assert_eq!(bytes[offsets::ENV_BLOCK + 1], seed_byte ^ 115);
    }
}

#[test]
fn test_version_marker_fixed() {
    let b = builder();
    let md5 = md5_hex(b"");
    let mut rng = RngSource::new(OsRng);
    for a1 in ["", "x", A1] {
        let p = b.build(&SignRequest::new(&md5, a1), 0, None, &mut rng).unwrap();
        assert_eq!(p.version(), [121, 104, 96, 41]);
        assert_eq!(&p.as_bytes()[offsets::A3_PREFIX..offsets::A3_DIGEST], &[2, 97, 51, 16]);
    }
}

#[test]
fn test_identity_truncated_to_field_width() {
    let b = builder();
    let md5 = md5_hex(b"");
    let long_a1 = "a".repeat(80);
    let req = SignRequest::new(&md5, &long_a1).app_id("xhs-pc-web-extended");
    let p = b.build(&req, NOW_MS, None, &mut Scripted::new(1, &[10, 15, 1000])).unwrap();
    let bytes = p.as_bytes();

    assert_eq!(bytes[offsets::A1], 52);
    assert!(bytes[offsets::A1 + 1..offsets::APP_ID].iter().all(|&c| c == b'a'));
    assert_eq!(bytes[offsets::APP_ID], 10);
    assert_eq!(&bytes[offsets::APP_ID + 1..offsets::ENV_BLOCK], b"xhs-pc-web");
}

#[test]
fn test_short_identity_zero_padded() {
    let b = builder();
    let md5 = md5_hex(b"");
    let req = SignRequest::new(&md5, "abc").app_id("web");
    let p = b.build(&req, NOW_MS, None, &mut Scripted::new(1, &[10, 15, 1000])).unwrap();
    let bytes = p.as_bytes();

    // Prefix is the padded width, not the raw length
    assert_eq!(bytes[offsets::A1], 52);
    assert_eq!(&bytes[offsets::A1 + 1..offsets::A1 + 4], b"abc");
    assert!(bytes[offsets::A1 + 4..offsets::APP_ID].iter().all(|&c| c == 0));
    assert_eq!(&bytes[offsets::APP_ID + 1..offsets::APP_ID + 4], b"web");
}

#[test]
fn test_multibyte_identity_cut_mid_character() {
    let b = builder();
    let md5 = md5_hex(b"");
    // 51 ASCII bytes + a 3-byte character: only its first byte fits
    let a1 = format!("{}中", "z".repeat(51));
    let p = b.build(&SignRequest::new(&md5, &a1), NOW_MS, None, &mut Scripted::new(1, &[10, 15, 1000])).unwrap();
    assert_eq!(p.as_bytes()[offsets::A1 + 52], "中".as_bytes()[0]);
}

#[test]
fn test_malformed_md5_rejected_before_draws() {
    let b = builder();
    for bad in ["", "abc", "zz2a59acce37b17d574e8f1a2895a278", "fe2a59acce37b17d574e8f1a2895a2780"] {
        // Empty script: any draw would panic
        let mut rng = Scripted::new(1, &[]);
        let res = b.build(&SignRequest::new(bad, A1), NOW_MS, None, &mut rng);
        assert_eq!(res.err(), Some(XsError::InvalidInput), "{:?} accepted", bad);
    }
}

#[test]
fn test_build_now_uses_clock() {
    let b = builder();
    let md5 = md5_hex(b"/api/x");
    let mut rng = RngSource::new(OsRng);
    let p = b.build_now(&SignRequest::new(&md5, A1), &FixedClock(NOW_MS), None, &mut rng).unwrap();
    assert_eq!(p.timestamp_ms(), NOW_MS);
}

#[test]
fn test_invalid_config_rejected() {
    let config = SignConfig {
        window_props: xs_core::DrawRange::new(1200, 1000),
        ..Default::default()
    };
    assert!(PayloadBuilder::new(config).is_err());
}

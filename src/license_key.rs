//! License key text format.
//!
//! Production keys look like `ES-ABCD-1234-EFGH-5678-GOYPHBXJ4S`:
//!
//! - a two-letter registered discipline code,
//! - the random body (`A-Z0-9`) split into groups of four,
//! - a 10-character signature in the base-32 alphabet (`A-Z2-7`).
//!
//! Development keys look like `DEV-ES-K3J9Q0ZT1M2X` and carry no signature.
//!
//! Encoding and decoding are pure. Parsing trims and uppercases its input,
//! then checks the grammar strictly; a key's fields are recovered exactly.
//!
//! # Example
//!
//! ```rust
//! use sitekey::license_key::{KeyFormat, LicenseKey};
//!
//! let key = LicenseKey::parse("es-abcd-1234-efgh-5678-goyphbxj4s", &KeyFormat::default()).unwrap();
//! assert_eq!(key.code, "ES");
//! assert_eq!(key.body, "ABCD1234EFGH5678");
//! assert_eq!(key.to_string(), "ES-ABCD-1234-EFGH-5678-GOYPHBXJ4S");
//! ```

use std::fmt;

use rand::Rng;

use crate::config::LicenseConfig;
use crate::disciplines::lookup_code;
use crate::errors::{LicenseError, LicenseResult};
use crate::mac::is_base32_char;

/// Character set for key bodies.
pub const BODY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default number of body characters in a production key.
pub const DEFAULT_BODY_LENGTH: usize = 16;

/// Body characters per group in the presentable form.
pub const GROUP_SIZE: usize = 4;

/// Signature characters kept from the encoded MAC.
pub const SIGNATURE_LENGTH: usize = 10;

/// Prefix that marks a development key.
pub const DEV_PREFIX: &str = "DEV-";

/// Body length of a development key.
pub const DEV_BODY_LENGTH: usize = 12;

const SEPARATOR: char = '-';

/// Shape parameters for production keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFormat {
    /// Ungrouped body length.
    pub body_length: usize,
}

impl Default for KeyFormat {
    fn default() -> Self {
        Self {
            body_length: DEFAULT_BODY_LENGTH,
        }
    }
}

impl From<&LicenseConfig> for KeyFormat {
    fn from(config: &LicenseConfig) -> Self {
        Self {
            body_length: config.body_length,
        }
    }
}

/// A signed production key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseKey {
    pub code: String,
    pub body: String,
    pub signature: String,
}

/// An unsigned development key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevKey {
    pub code: String,
    pub body: String,
}

/// Either kind of key, as found in user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedKey {
    Production(LicenseKey),
    Development(DevKey),
}

impl ParsedKey {
    /// The discipline code the key claims.
    pub fn code(&self) -> &str {
        match self {
            ParsedKey::Production(key) => &key.code,
            ParsedKey::Development(key) => &key.code,
        }
    }
}

/// Generate a random body of `length` characters from [`BODY_CHARSET`].
pub fn generate_body<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..BODY_CHARSET.len());
            BODY_CHARSET[idx] as char
        })
        .collect()
}

/// Split a body into `-`-joined groups of [`GROUP_SIZE`]; the last group may be shorter.
pub fn group_body(body: &str) -> String {
    body.as_bytes()
        .chunks(GROUP_SIZE)
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect::<Vec<_>>()
        .join("-")
}

/// Whether the (trimmed, case-insensitive) text is a development key.
pub fn is_dev_key(text: &str) -> bool {
    let text = text.trim();
    text.len() >= DEV_PREFIX.len()
        && text.is_char_boundary(DEV_PREFIX.len())
        && text[..DEV_PREFIX.len()].eq_ignore_ascii_case(DEV_PREFIX)
}

fn is_body_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

fn check_code(code: &str) -> LicenseResult<()> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(LicenseError::MalformedKey(format!(
            "discipline code must be two letters, got '{code}'"
        )));
    }
    if lookup_code(code).is_none() {
        return Err(LicenseError::UnknownDiscipline(code.to_string()));
    }
    Ok(())
}

fn check_body(body: &str, expected_len: usize) -> LicenseResult<()> {
    if body.len() != expected_len {
        return Err(LicenseError::MalformedKey(format!(
            "body must be {expected_len} characters, got {}",
            body.len()
        )));
    }
    if let Some(bad) = body.chars().find(|c| !is_body_char(*c)) {
        return Err(LicenseError::MalformedKey(format!(
            "invalid body character '{bad}'"
        )));
    }
    Ok(())
}

impl LicenseKey {
    /// Parse the presentable form.
    ///
    /// # Errors
    ///
    /// [`LicenseError::MalformedKey`] for any grammar violation,
    /// [`LicenseError::UnknownDiscipline`] for a well-formed but unregistered code.
    pub fn parse(text: &str, format: &KeyFormat) -> LicenseResult<Self> {
        let text = text.trim().to_ascii_uppercase();
        let parts: Vec<&str> = text.split(SEPARATOR).collect();

        // code + at least one body group + signature
        if parts.len() < 3 {
            return Err(LicenseError::MalformedKey(
                "expected CODE-BODY-SIGNATURE".to_string(),
            ));
        }

        let code = parts[0];
        let signature = parts[parts.len() - 1];
        let groups = &parts[1..parts.len() - 1];

        check_code(code)?;

        for (i, group) in groups.iter().enumerate() {
            let is_last = i == groups.len() - 1;
            let valid_len = if is_last {
                (1..=GROUP_SIZE).contains(&group.len())
            } else {
                group.len() == GROUP_SIZE
            };
            if !valid_len {
                return Err(LicenseError::MalformedKey(format!(
                    "body group {} has length {}",
                    i + 1,
                    group.len()
                )));
            }
        }

        let body: String = groups.concat();
        check_body(&body, format.body_length)?;

        if signature.len() != SIGNATURE_LENGTH || !signature.chars().all(is_base32_char) {
            return Err(LicenseError::MalformedKey(format!(
                "signature must be {SIGNATURE_LENGTH} base-32 characters"
            )));
        }

        Ok(Self {
            code: code.to_string(),
            body,
            signature: signature.to_string(),
        })
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.code, group_body(&self.body), self.signature)
    }
}

impl DevKey {
    /// Generate a development key for an already-normalized code.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, code: &str) -> Self {
        Self {
            code: code.to_string(),
            body: generate_body(rng, DEV_BODY_LENGTH),
        }
    }

    /// Parse `DEV-CODE-BODY`.
    pub fn parse(text: &str) -> LicenseResult<Self> {
        let text = text.trim().to_ascii_uppercase();
        let rest = text
            .strip_prefix(DEV_PREFIX)
            .ok_or_else(|| LicenseError::MalformedKey("missing DEV- prefix".to_string()))?;

        let (code, body) = rest
            .split_once(SEPARATOR)
            .ok_or_else(|| LicenseError::MalformedKey("expected DEV-CODE-BODY".to_string()))?;

        check_code(code)?;
        check_body(body, DEV_BODY_LENGTH)?;

        Ok(Self {
            code: code.to_string(),
            body: body.to_string(),
        })
    }
}

impl fmt::Display for DevKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", DEV_PREFIX, self.code, self.body)
    }
}

/// Parse either kind of key, dispatching on the `DEV-` prefix.
pub fn parse_key(text: &str, format: &KeyFormat) -> LicenseResult<ParsedKey> {
    if is_dev_key(text) {
        DevKey::parse(text).map(ParsedKey::Development)
    } else {
        LicenseKey::parse(text, format).map(ParsedKey::Production)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fmt16() -> KeyFormat {
        KeyFormat::default()
    }

    #[test]
    fn generate_body_has_requested_length_and_charset() {
        let mut rng = rand::rng();
        for len in [1, 4, 16, 23] {
            let body = generate_body(&mut rng, len);
            assert_eq!(body.len(), len);
            assert!(body.bytes().all(|b| BODY_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn seeded_rng_gives_reproducible_body() {
        let a = generate_body(&mut StdRng::seed_from_u64(7), 16);
        let b = generate_body(&mut StdRng::seed_from_u64(7), 16);
        assert_eq!(a, b);
    }

    #[test]
    fn generated_bodies_are_distinct() {
        let mut rng = rand::rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            let body = generate_body(&mut rng, DEFAULT_BODY_LENGTH);
            assert!(seen.insert(body.clone()), "Duplicate body generated: {}", body);
        }
    }

    #[test]
    fn group_body_chunks_by_four() {
        assert_eq!(group_body("ABCD1234EFGH5678"), "ABCD-1234-EFGH-5678");
        assert_eq!(group_body("ABCDE"), "ABCD-E");
        assert_eq!(group_body("AB"), "AB");
    }

    #[test]
    fn display_renders_grouped_key() {
        let key = LicenseKey {
            code: "ES".to_string(),
            body: "ABCD1234EFGH5678".to_string(),
            signature: "GOYPHBXJ4S".to_string(),
        };
        assert_eq!(key.to_string(), "ES-ABCD-1234-EFGH-5678-GOYPHBXJ4S");
    }

    #[test]
    fn parse_accepts_lowercase_and_whitespace() {
        let key = LicenseKey::parse("  es-abcd-1234-efgh-5678-goyphbxj4s\n", &fmt16()).unwrap();
        assert_eq!(key.code, "ES");
        assert_eq!(key.body, "ABCD1234EFGH5678");
        assert_eq!(key.signature, "GOYPHBXJ4S");
    }

    #[test]
    fn parse_handles_short_last_group() {
        let format = KeyFormat { body_length: 6 };
        let key = LicenseKey::parse("CS-AB12-C3-ABCDEFGHIJ", &format).unwrap();
        assert_eq!(key.body, "AB12C3");
        assert_eq!(key.to_string(), "CS-AB12-C3-ABCDEFGHIJ");
    }

    #[test]
    fn parse_rejects_wrong_structure() {
        let cases = [
            "",
            "ES",
            "ES-GOYPHBXJ4S",
            "ES-ABCD-1234-EFGH-GOYPHBXJ4S",          // body too short
            "ES-ABCD-1234-EFGH-5678-9ABC-GOYPHBXJ4S", // body too long
            "ES-ABC-D1234-EFGH-5678-GOYPHBXJ4S",     // misaligned groups
            "ES-ABCD1234-EFGH-5678-GOYPHBXJ4S",      // oversized group
            "ES-ABCD--1234EFGH5678-GOYPHBXJ4S",      // empty group
            "ES-ABCD-1234-EFGH-5678-GOYPHBXJ4",      // short signature
            "ES-ABCD-1234-EFGH-5678-GOYPHBXJ4SX",    // long signature
            "ES-ABCD-1234-EFGH-5678-GOYPHBXJ40",     // '0' not base-32
            "ES-AB_D-1234-EFGH-5678-GOYPHBXJ4S",     // bad body char
            "ES_ABCD-1234-EFGH-5678-GOYPHBXJ4S",     // bad separator
            "E1-ABCD-1234-EFGH-5678-GOYPHBXJ4S",     // code not letters
            "EST-ABCD-1234-EFGH-5678-GOYPHBXJ4S",    // code too long
        ];
        for case in cases {
            assert!(
                matches!(LicenseKey::parse(case, &fmt16()), Err(LicenseError::MalformedKey(_))),
                "expected MalformedKey for {case:?}"
            );
        }
    }

    #[test]
    fn parse_rejects_unregistered_code() {
        assert_eq!(
            LicenseKey::parse("ZZ-ABCD-1234-EFGH-5678-GOYPHBXJ4S", &fmt16()),
            Err(LicenseError::UnknownDiscipline("ZZ".to_string()))
        );
    }

    #[test]
    fn grammar_round_trip() {
        let mut rng = rand::rng();
        for d in crate::disciplines::all() {
            let key = LicenseKey {
                code: d.code.to_string(),
                body: generate_body(&mut rng, DEFAULT_BODY_LENGTH),
                signature: "ABCDEFGH23".to_string(),
            };
            assert_eq!(LicenseKey::parse(&key.to_string(), &fmt16()).unwrap(), key);
        }
    }

    #[test]
    fn dev_key_format_and_parse() {
        let key = DevKey::generate(&mut rand::rng(), "RS");
        let text = key.to_string();
        assert!(text.starts_with("DEV-RS-"));
        assert_eq!(text.len(), DEV_PREFIX.len() + 3 + DEV_BODY_LENGTH);
        assert!(is_dev_key(&text));
        assert_eq!(DevKey::parse(&text).unwrap(), key);
    }

    #[test]
    fn dev_key_rejects_bad_shapes() {
        assert!(DevKey::parse("DEV-RS").is_err());
        assert!(DevKey::parse("DEV-RS-ABC").is_err());
        assert!(DevKey::parse("DEV-RS-ABCD-1234-EFG").is_err());
        assert!(matches!(
            DevKey::parse("DEV-ZZ-ABCD1234EFGH"),
            Err(LicenseError::UnknownDiscipline(_))
        ));
    }

    #[test]
    fn dev_and_production_keys_are_distinguished_by_prefix() {
        assert!(is_dev_key("dev-es-ABCD1234EFGH"));
        assert!(!is_dev_key("ES-ABCD-1234-EFGH-5678-GOYPHBXJ4S"));
        assert!(!is_dev_key("DE"));

        let parsed = parse_key("DEV-ES-ABCD1234EFGH", &fmt16()).unwrap();
        assert!(matches!(parsed, ParsedKey::Development(_)));
        assert_eq!(parsed.code(), "ES");
        let parsed = parse_key("gm-abcd-1234-efgh-5678-rt2a3ozpk2", &fmt16()).unwrap();
        assert!(matches!(parsed, ParsedKey::Production(_)));
        assert_eq!(parsed.code(), "GM");
    }
}

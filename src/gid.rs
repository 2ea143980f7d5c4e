//! The 96-bit global identifier scheme used for object keys.
//!
//! A gid is 24 uppercase hex characters packing five fields, big-endian:
//!
//! ```text
//! byte 0      user hash        (8 bits)
//! byte 1      process id       (8 bits)
//! bytes 2-3   sequence counter (16 bits)
//! bytes 4-7   seconds since 2001-01-01T00:00:00Z (32 bits)
//! bytes 8-11  random           (32 bits)
//! ```
//!
//! `decode(encode(fields)) == fields` for every representable combination.
//! Generation state (the sequence counter) is owned by a [`GidGenerator`]
//! instance, never by the process, so independent generators exist side by
//! side and tests can pin every field.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static GID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-F]{24}$").unwrap());

/// Seconds between the Unix epoch and the gid reference date (2001-01-01Z).
const REF_EPOCH_UNIX: i64 = 978_307_200;

/// True if `s` has the shape of an object identifier. Used by the comment
/// annotator to decide which string values are references.
pub fn is_gid(s: &str) -> bool {
    GID_PATTERN.is_match(s)
}

/// The unpacked fields of a gid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GidFields {
    pub random: u32,
    pub pid: u8,
    pub user: u8,
    pub date: DateTime<Utc>,
    pub seq: u16,
}

impl GidFields {
    /// Pack the fields into 24 hex characters. Fails only when the date does
    /// not fit the 32-bit reference-seconds field.
    pub fn encode(&self) -> Result<String> {
        let secs = ref_seconds(self.date)?;
        Ok(pack(self.user, self.pid, self.seq, secs, self.random))
    }

    /// Unpack a gid. Fails on anything that is not 24 uppercase hex chars.
    pub fn decode(gid: &str) -> Result<GidFields> {
        if !is_gid(gid) {
            return Err(Error::InvalidGid(gid.to_string()));
        }
        let byte = |i: usize| -> u32 {
            // Valid by the pattern check above.
            u32::from_str_radix(&gid[2 * i..2 * i + 2], 16).unwrap_or(0)
        };
        let secs = (byte(4) << 24) | (byte(5) << 16) | (byte(6) << 8) | byte(7);
        let date = Utc
            .timestamp_opt(REF_EPOCH_UNIX + i64::from(secs), 0)
            .single()
            .ok_or_else(|| Error::InvalidGid(gid.to_string()))?;
        Ok(GidFields {
            random: (byte(8) << 24) | (byte(9) << 16) | (byte(10) << 8) | byte(11),
            pid: byte(1) as u8,
            user: byte(0) as u8,
            date,
            seq: ((byte(2) << 8) | byte(3)) as u16,
        })
    }
}

fn ref_seconds(date: DateTime<Utc>) -> Result<u32> {
    let secs = date.timestamp() - REF_EPOCH_UNIX;
    u32::try_from(secs).map_err(|_| Error::GidField {
        field: "date",
        value: secs,
        max: i64::from(u32::MAX),
    })
}

fn pack(user: u8, pid: u8, seq: u16, secs: u32, random: u32) -> String {
    let bytes = [
        user,
        pid,
        (seq >> 8) as u8,
        seq as u8,
        (secs >> 24) as u8,
        (secs >> 16) as u8,
        (secs >> 8) as u8,
        secs as u8,
        (random >> 24) as u8,
        (random >> 16) as u8,
        (random >> 8) as u8,
        random as u8,
    ];
    let mut out = String::with_capacity(24);
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out
}

/// Hash a username into the 8-bit user field.
pub fn user_hash(username: &str) -> u8 {
    username
        .bytes()
        .fold(0u8, |h, b| h.rotate_left(3) ^ b)
}

/// Caller-supplied fixed fields for a generator. Anything left `None` falls
/// back to an ambient default. Explicit values are validated, not truncated.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    pub user: Option<u32>,
    pub pid: Option<u32>,
    pub date: Option<DateTime<Utc>>,
    pub random: Option<u32>,
    pub seq: Option<u32>,
}

/// Mints gids with an explicitly owned sequence counter.
#[derive(Debug)]
pub struct GidGenerator {
    user: u8,
    pid: u8,
    random: u32,
    seq: u16,
    fixed_date: Option<DateTime<Utc>>,
}

impl GidGenerator {
    /// A generator with ambient defaults: hashed `$USER`, the process id
    /// masked to 8 bits, a time-seeded 24-bit random value and a random
    /// initial sequence value.
    pub fn new() -> Self {
        let seed = seed_entropy();
        GidGenerator {
            user: user_hash(&default_username()),
            pid: (std::process::id() & 0xff) as u8,
            random: (seed & 0xff_ffff) as u32,
            seq: (seed >> 24) as u16,
            fixed_date: None,
        }
    }

    /// A generator with some fields pinned. Out-of-range overrides are
    /// rejected here rather than silently masked.
    pub fn with_options(opts: GeneratorOptions) -> Result<Self> {
        let mut gen = Self::new();
        if let Some(user) = opts.user {
            gen.user = narrow("user", user, 0xff)? as u8;
        }
        if let Some(pid) = opts.pid {
            gen.pid = narrow("pid", pid, 0xff)? as u8;
        }
        if let Some(seq) = opts.seq {
            gen.seq = narrow("seq", seq, 0xffff)? as u16;
        }
        if let Some(random) = opts.random {
            gen.random = random;
        }
        if let Some(date) = opts.date {
            ref_seconds(date)?;
            gen.fixed_date = Some(date);
        }
        Ok(gen)
    }

    /// Mint one gid and advance the counter.
    pub fn generate(&mut self) -> String {
        let date = self.fixed_date.unwrap_or_else(Utc::now);
        let secs = (date.timestamp() - REF_EPOCH_UNIX).clamp(0, i64::from(u32::MAX)) as u32;
        let gid = pack(self.user, self.pid, self.seq, secs, self.random);
        self.seq = self.seq.wrapping_add(1);
        gid
    }

    /// Mint a batch; all gids share the generator's fixed fields and carry
    /// consecutive sequence values, so the batch is duplicate-free.
    pub fn generate_n(&mut self, n: usize) -> Vec<String> {
        (0..n).map(|_| self.generate()).collect()
    }
}

impl Default for GidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn narrow(field: &'static str, value: u32, max: u32) -> Result<u32> {
    if value > max {
        Err(Error::GidField {
            field,
            value: i64::from(value),
            max: i64::from(max),
        })
    } else {
        Ok(value)
    }
}

fn default_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "nobody".to_string())
}

fn seed_entropy() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    splitmix64(nanos ^ (u64::from(std::process::id()) << 32))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

use anyhow::{Result, bail};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;

/// Seed plus the phrase it came from, when it was not a plain number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub label: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, label: None }
    }

    /// Derive a seed from a memorable phrase such as `harbor-dawn`.
    #[must_use]
    pub fn from_phrase(phrase: &str) -> Self {
        let normalized = phrase.trim().to_lowercase();
        let digest = Sha256::digest(normalized.as_bytes());
        let mut bytes = [0_u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self {
            seed: u64::from_le_bytes(bytes),
            label: Some(normalized),
        }
    }
}

/// Resolve CLI seed tokens into seeds.
///
/// Accepts decimal integers (negative values use their magnitude), `0x`
/// hexadecimal, and phrases made of letters, digits and dashes. Duplicates
/// are dropped; an empty list falls back to the default seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let info = if let Ok(value) = token.parse::<u64>() {
            SeedInfo::from_numeric(value)
        } else if let Ok(value) = token.parse::<i64>() {
            SeedInfo::from_numeric(value.unsigned_abs())
        } else if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            match u64::from_str_radix(hex, 16) {
                Ok(value) => SeedInfo::from_numeric(value),
                Err(_) => bail!("Invalid hex seed: {token}"),
            }
        } else if token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            SeedInfo::from_phrase(token)
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if seen.insert(info.seed) {
            resolved.push(info);
        }
    }

    if resolved.is_empty() {
        resolved.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(resolved)
}

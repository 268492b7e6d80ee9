use anyhow::{anyhow, Context, Result};
use racer_core::config::EngineConfig;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_SEED_START: u32 = 0xA57E_0001;

pub fn parse_seed(seed: &str) -> Result<u32> {
    let s = seed.trim();
    if s.is_empty() {
        return Err(anyhow!("empty seed"));
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed: {s}"))
    } else {
        s.parse::<u32>()
            .with_context(|| format!("invalid decimal seed: {s}"))
    }
}

pub fn seed_to_hex(seed: u32) -> String {
    format!("0x{seed:08x}")
}

pub fn parse_seed_csv(input: &str) -> Result<Vec<u32>> {
    let seeds = input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_seed)
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        return Err(anyhow!("no seeds parsed from --seeds"));
    }
    Ok(seeds)
}

/// One seed per line; blank lines and `#` comments are skipped.
pub fn parse_seed_file(path: &Path) -> Result<Vec<u32>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading seed file {}", path.display()))?;
    let mut seeds = Vec::new();
    for line in data.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        seeds.push(parse_seed(trimmed)?);
    }
    if seeds.is_empty() {
        return Err(anyhow!("seed file {} had no seeds", path.display()));
    }
    Ok(seeds)
}

/// A seed file wins over a CSV list, which wins over an LCG sequence from
/// `seed_start`.
pub fn resolve_seeds(
    seeds: Option<&str>,
    seed_file: Option<&Path>,
    seed_start: Option<&str>,
    seed_count: u32,
) -> Result<Vec<u32>> {
    if let Some(path) = seed_file {
        return parse_seed_file(path);
    }
    if let Some(csv) = seeds {
        return parse_seed_csv(csv);
    }
    if seed_count == 0 {
        return Err(anyhow!("--seed-count must be >= 1"));
    }

    let start = match seed_start {
        Some(start) => parse_seed(start)?,
        None => DEFAULT_SEED_START,
    };

    let mut out = Vec::with_capacity(seed_count as usize);
    let mut cur = start;
    for _ in 0..seed_count {
        out.push(cur);
        cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    Ok(out)
}

/// Reads an engine config from JSON. Missing sections fall back to the
/// arcade defaults.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let data =
        fs::read(path).with_context(|| format!("failed reading config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_slice(&data)
        .with_context(|| format!("invalid engine config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("engine config {} failed validation", path.display()))?;
    Ok(config)
}

pub fn unix_now_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_hex_and_decimal_seeds() {
        assert_eq!(parse_seed("0xDEADBEEF").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_seed(" 42 ").unwrap(), 42);
        assert!(parse_seed("").is_err());
        assert!(parse_seed("0xZZ").is_err());
        assert_eq!(seed_to_hex(0xBEEF), "0x0000beef");
    }

    #[test]
    fn csv_skips_empty_tokens() {
        assert_eq!(parse_seed_csv("1, 0x2,,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_seed_csv(" , ").is_err());
    }

    #[test]
    fn seed_file_skips_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seeds.txt");
        fs::write(&path, "# warmup\n0x10\n\n7\n").unwrap();
        assert_eq!(parse_seed_file(&path).unwrap(), vec![0x10, 7]);
    }

    #[test]
    fn generated_seeds_follow_the_lcg() {
        let seeds = resolve_seeds(None, None, Some("1"), 3).unwrap();
        assert_eq!(seeds[0], 1);
        assert_eq!(seeds[1], 1_664_525u32.wrapping_add(1_013_904_223));
        assert_eq!(seeds.len(), 3);

        let defaults = resolve_seeds(None, None, None, 1).unwrap();
        assert_eq!(defaults, vec![DEFAULT_SEED_START]);
        assert!(resolve_seeds(None, None, None, 0).is_err());
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{ "race": { "countdown_secs": 0 } }"#).unwrap();

        let config = load_engine_config(&path).unwrap();
        assert_eq!(config.race.countdown_secs, 0);
        assert_eq!(config.vehicles, EngineConfig::arcade().vehicles);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{ "vehicles": [] }"#).unwrap();
        assert!(load_engine_config(&path).is_err());
    }
}

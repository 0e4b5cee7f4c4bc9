use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

use crate::scoring::decision::Thresholds;
use crate::scoring::fit::MatchWeights;

/// Application configuration loaded from environment variables.
/// Startup fails on malformed values; everything has a default except secrets.
#[derive(Debug, Clone)]
pub struct Config {
    /// Results go to a log-only store when unset.
    pub database_url: Option<String>,
    /// The external scorer and the parse endpoints are disabled when unset.
    pub anthropic_api_key: Option<String>,
    pub enable_llm_scoring: bool,
    pub thresholds: Thresholds,
    pub match_weights: MatchWeights,
    /// Fixed "today" for experience estimation (`YYYY-MM-DD`), for reproducible
    /// re-scoring. Defaults to the current date on every request.
    pub reference_date: Option<NaiveDate>,
    /// Keeps short skill names out of substring database-category lookups.
    /// Unset means every term takes part.
    pub category_min_substring_len: Option<usize>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            interview: parse_or(&lookup, "INTERVIEW_THRESHOLD", defaults.interview)?,
            hold: parse_or(&lookup, "HOLD_THRESHOLD", defaults.hold)?,
        };
        thresholds.validate()?;

        let weight_defaults = MatchWeights::default();
        let match_weights = MatchWeights {
            related: parse_or(&lookup, "RELATED_MATCH_WEIGHT", weight_defaults.related)?,
            missing_penalty: parse_or(
                &lookup,
                "MISSING_MATCH_PENALTY",
                weight_defaults.missing_penalty,
            )?,
            ..weight_defaults
        };
        if !(0.0..=1.0).contains(&match_weights.related)
            || !(0.0..=1.0).contains(&match_weights.missing_penalty)
        {
            return Err(anyhow!(
                "RELATED_MATCH_WEIGHT and MISSING_MATCH_PENALTY must be within 0.0-1.0"
            ));
        }

        Ok(Config {
            database_url: optional(&lookup, "DATABASE_URL"),
            anthropic_api_key: optional(&lookup, "ANTHROPIC_API_KEY"),
            enable_llm_scoring: parse_bool(&lookup, "ENABLE_LLM_SCORING")?,
            thresholds,
            match_weights,
            reference_date: optional(&lookup, "SCREENING_REFERENCE_DATE")
                .map(|raw| {
                    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| {
                        format!("SCREENING_REFERENCE_DATE must be YYYY-MM-DD, got '{raw}'")
                    })
                })
                .transpose()?,
            category_min_substring_len: optional(&lookup, "CATEGORY_MIN_SUBSTRING_LEN")
                .map(|raw| {
                    raw.trim().parse::<usize>().with_context(|| {
                        format!("CATEGORY_MIN_SUBSTRING_LEN must be a whole number, got '{raw}'")
                    })
                })
                .transpose()?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, key).map(|v| v.trim().to_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(anyhow!(
            "Environment variable '{key}' must be a boolean, got '{v}'"
        )),
    }
}

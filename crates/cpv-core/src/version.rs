//! Dotted numeric version parsing and ordering.
//!
//! Versions are dot-separated lists of non-negative integers:
//! - Segments compare as numbers, so `2.9` < `2.10`
//! - Missing trailing segments count as zero, so `4.16` == `4.16.0`
//! - Anything else (`1.0-beta`, `abc`, `1..2`, `+1`) is rejected

use std::cmp::Ordering;
use std::fmt;

use cpv_util::errors::CpvError;

/// A parsed version with comparable numeric segments.
#[derive(Debug, Clone)]
pub struct ParsedVersion {
    pub original: String,
    segments: Vec<u64>,
}

impl ParsedVersion {
    pub fn parse(text: &str) -> Result<Self, CpvError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(invalid(text, "version is empty"));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(invalid(text, "empty segment"));
            }
            if !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(
                    text,
                    &format!("segment '{segment}' is not a number"),
                ));
            }
            let value = segment.parse::<u64>().map_err(|_| {
                invalid(text, &format!("segment '{segment}' is too large"))
            })?;
            segments.push(value);
        }

        Ok(Self {
            original: trimmed.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }
}

fn invalid(version: &str, reason: &str) -> CpvError {
    CpvError::InvalidVersionFormat {
        version: version.to_string(),
        reason: reason.to_string(),
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParsedVersion {}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.segments.len().max(other.segments.len());
        for i in 0..max_len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            let ord = a.cmp(&b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

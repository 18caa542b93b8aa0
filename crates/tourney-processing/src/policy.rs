//! Accepted image type policy
//!
//! A single membership predicate shared by the intake extension check and the
//! sniffed-content check. The allow-list can be given as literal extensions or
//! as a regular expression; both forms match case-insensitively against the
//! whole candidate. A pattern may be written for the bare extension (`png`) or
//! the dotted one (`.png`).

use regex::Regex;

use crate::sniffer::SniffedType;

#[derive(Debug, Clone)]
pub enum AcceptPolicy {
    /// Lowercase extensions without the leading dot
    Extensions(Vec<String>),
    /// Case-insensitive, anchored pattern
    Pattern(Regex),
}

fn full_match(re: &Regex, candidate: &str) -> bool {
    re.find(candidate)
        .map(|m| m.start() == 0 && m.end() == candidate.len())
        .unwrap_or(false)
}

/// Strip a leading dot, reduce `type/subtype` to its subtype.
fn normalize(candidate: &str) -> &str {
    let candidate = candidate.trim();
    let candidate = candidate.strip_prefix('.').unwrap_or(candidate);
    match candidate.split_once('/') {
        Some((_, subtype)) => subtype,
        None => candidate,
    }
}

impl AcceptPolicy {
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AcceptPolicy::Extensions(
            extensions
                .into_iter()
                .map(|ext| normalize(ext.as_ref()).to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }

    /// Compile `pattern` as a case-insensitive full match.
    pub fn from_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("(?i)^(?:{})$", pattern)).map(AcceptPolicy::Pattern)
    }

    /// The pattern form of this policy. An extension list compiles to `(?i)^(?:a|b|c)$`.
    pub fn to_pattern(&self) -> Result<AcceptPolicy, regex::Error> {
        match self {
            AcceptPolicy::Pattern(_) => Ok(self.clone()),
            AcceptPolicy::Extensions(exts) => {
                let alternatives: Vec<String> = exts.iter().map(|e| regex::escape(e)).collect();
                AcceptPolicy::from_pattern(&alternatives.join("|"))
            }
        }
    }

    /// Whether an extension (`jpg`, `.JPG`) or MIME type (`image/jpeg`) is accepted.
    pub fn is_accepted(&self, candidate: &str) -> bool {
        let candidate = normalize(candidate);
        if candidate.is_empty() {
            return false;
        }
        match self {
            AcceptPolicy::Extensions(exts) => {
                exts.iter().any(|ext| ext.eq_ignore_ascii_case(candidate))
            }
            AcceptPolicy::Pattern(re) => {
                full_match(re, candidate) || full_match(re, &format!(".{}", candidate))
            }
        }
    }

    /// Whether sniffed content is one of the accepted types.
    pub fn accepts_sniffed(&self, sniffed: &SniffedType) -> bool {
        match sniffed {
            SniffedType::Unknown => false,
            SniffedType::Other(mime) => self.is_accepted(mime),
            known => known.extensions().iter().any(|ext| self.is_accepted(ext)),
        }
    }

    /// Human readable allow-list for error messages
    pub fn describe(&self) -> Vec<String> {
        match self {
            AcceptPolicy::Extensions(exts) => exts.clone(),
            AcceptPolicy::Pattern(re) => vec![re.as_str().to_string()],
        }
    }
}

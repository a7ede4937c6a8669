//! Loose semantic version coercion.
//!
//! Clients report build versions in many shapes (`v1.2`, `1.2.3-beta.4`,
//! `build 42`). Coercion extracts the first run of up to three dot-separated
//! numeric components and renders it as `major.minor.patch`, filling missing
//! components with zero.

lazy_static::lazy_static! {
    static ref COERCE_REGEX: regex::Regex =
        regex::Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])")
            .unwrap();
}

/// A coerced `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CoercedVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl std::fmt::Display for CoercedVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Coerces a loosely formatted version string.
///
/// Returns `None` when the input contains no numeric component.
pub fn coerce(input: &str) -> Option<CoercedVersion> {
    let caps = COERCE_REGEX.captures(input)?;
    let component = |idx: usize| -> Option<u64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(CoercedVersion {
        major: component(1)?,
        minor: component(2)?,
        patch: component(3)?,
    })
}

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use semver::{Prerelease, Version};
use serde::{Deserialize, Serialize};

use crate::error::{ChangelogError, Result};

/// Severity of a change, ordered `Patch < Minor < Major`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Patch,
    Minor,
    Major,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Patch => write!(f, "patch"),
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
        }
    }
}

/// Parse a semantic version (e.g., "v1.2.3-rc.1" -> 1.2.3-rc.1)
///
/// Surrounding whitespace and a single leading `v`/`V` are tolerated.
pub fn parse_version(text: &str) -> Result<Version> {
    let trimmed = text.trim();
    let clean = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    Version::parse(clean)
        .map_err(|e| ChangelogError::version(format!("'{}' is not a semantic version: {}", text, e)))
}

/// Bump version according to severity
///
/// Lower-order components are zeroed; prerelease and build metadata are cleared.
/// Fails with [`ChangelogError::Version`] when the bumped component overflows.
pub fn bump(version: &Version, severity: Severity) -> Result<Version> {
    let overflow = || {
        ChangelogError::version(format!(
            "cannot bump {} of '{}': component overflows",
            severity, version
        ))
    };
    let (major, minor, patch) = match severity {
        Severity::Major => (version.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
        Severity::Minor => (
            version.major,
            version.minor.checked_add(1).ok_or_else(overflow)?,
            0,
        ),
        Severity::Patch => (
            version.major,
            version.minor,
            version.patch.checked_add(1).ok_or_else(overflow)?,
        ),
    };
    Ok(Version::new(major, minor, patch))
}

/// Replace the prerelease part of a version, keeping major.minor.patch and build metadata
///
/// An empty string removes the prerelease.
pub fn with_prerelease(version: &Version, prerelease: &str) -> Result<Version> {
    let pre = if prerelease.is_empty() {
        Prerelease::EMPTY
    } else {
        Prerelease::new(prerelease).map_err(|e| {
            ChangelogError::version(format!("invalid prerelease '{}': {}", prerelease, e))
        })?
    };

    let mut next = version.clone();
    next.pre = pre;
    Ok(next)
}

/// Read a version from a reader holding a single version line.
///
/// A trailing newline is stripped before parsing. Empty content is reported
/// as [`ChangelogError::EmptyVersionFile`] so that callers can tell it apart
/// from content that does not parse.
pub fn read_version<R: Read>(mut reader: R, origin: &Path) -> Result<Version> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let line = content.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Err(ChangelogError::EmptyVersionFile(origin.to_path_buf()));
    }

    parse_version(line)
}

/// Read the version stored in a version file
pub fn read_version_file(path: &Path) -> Result<Version> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ChangelogError::VersionFileMissing(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    read_version(file, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_version_parse() {
        let v = parse_version("1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_with_v_prefix() {
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version("V1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_prerelease_and_metadata() {
        let v = parse_version("2.1.3-rc123+build.7").unwrap();
        assert_eq!(v.pre.as_str(), "rc123");
        assert_eq!(v.build.as_str(), "build.7");
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(parse_version("1.2").is_err());
        assert!(parse_version("v1.2.3.4").is_err());
        assert!(parse_version("not a version").is_err());
    }

    #[test]
    fn test_bump_major() {
        let v = Version::new(1, 2, 3);
        assert_eq!(bump(&v, Severity::Major).unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_bump_minor() {
        let v = Version::new(1, 2, 3);
        assert_eq!(bump(&v, Severity::Minor).unwrap(), Version::new(1, 3, 0));
    }

    #[test]
    fn test_bump_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(bump(&v, Severity::Patch).unwrap(), Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_clears_prerelease_and_metadata() {
        let v = parse_version("1.2.3-beta.1+sha.abc").unwrap();
        let bumped = bump(&v, Severity::Patch).unwrap();
        assert!(bumped.pre.is_empty());
        assert!(bumped.build.is_empty());
        assert_eq!(bumped.to_string(), "1.2.4");
    }

    #[test]
    fn test_bump_overflow_is_an_error() {
        let v = Version::new(1, 2, u64::MAX);
        assert!(matches!(
            bump(&v, Severity::Patch),
            Err(ChangelogError::Version(_))
        ));

        let v = Version::new(u64::MAX, 0, 0);
        assert!(matches!(
            bump(&v, Severity::Major),
            Err(ChangelogError::Version(_))
        ));
        assert_eq!(bump(&v, Severity::Minor).unwrap(), Version::new(u64::MAX, 1, 0));
    }

    #[test]
    fn test_with_prerelease_sets_and_clears() {
        let v = Version::new(1, 2, 3);
        let pre = with_prerelease(&v, "dev1234").unwrap();
        assert_eq!(pre.to_string(), "1.2.3-dev1234");

        let cleared = with_prerelease(&pre, "").unwrap();
        assert_eq!(cleared.to_string(), "1.2.3");
    }

    #[test]
    fn test_with_prerelease_rejects_invalid_grammar() {
        let v = Version::new(1, 2, 3);
        assert!(matches!(
            with_prerelease(&v, "dev_{oops}"),
            Err(ChangelogError::Version(_))
        ));
        // numeric identifiers may not carry leading zeros
        assert!(with_prerelease(&v, "0123").is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Patch < Severity::Minor);
        assert!(Severity::Minor < Severity::Major);
        assert_eq!(Severity::default(), Severity::Patch);
    }

    #[test]
    fn test_read_version_strips_trailing_newline() {
        let v = read_version("13.14.15\n".as_bytes(), Path::new("VERSION")).unwrap();
        assert_eq!(v, Version::new(13, 14, 15));
    }

    #[test]
    fn test_read_version_empty_content() {
        let err = read_version("\n".as_bytes(), Path::new("VERSION")).unwrap_err();
        assert!(matches!(err, ChangelogError::EmptyVersionFile(_)));
    }

    #[test]
    fn test_read_version_unparsable_content() {
        let err = read_version("banana".as_bytes(), Path::new("VERSION")).unwrap_err();
        assert!(matches!(err, ChangelogError::Version(_)));
    }

    #[test]
    fn test_read_version_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_version_file(&dir.path().join("VERSION")).unwrap_err();
        assert!(matches!(err, ChangelogError::VersionFileMissing(_)));
    }

    #[test]
    fn test_read_version_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1.2.3-rc400\n").unwrap();
        file.flush().unwrap();

        let v = read_version_file(file.path()).unwrap();
        assert_eq!(v.to_string(), "1.2.3-rc400");
    }
}

//! Version scraping and constraint checks for `executable_version`.
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::exec::Executor;

/// Flags tried, in order, to make a program print its version.
const VERSION_FLAGS: &[&str] = &["--version", "-v", "-V", "version", "--ver"];

/// Patterns tried, in order, against probe output. Group 1 is the version.
#[allow(clippy::expect_used)]
static VERSION_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"(?i)version\s+(\d+\.\d+\.\d+)",
        r"v(\d+\.\d+\.\d+)",
        r"(\d+\.\d+\.\d+)",
        r"(\d+\.\d+)\b",
    ]
    .map(|p| Regex::new(p).expect("version pattern is valid"))
});

/// Comparison operator of a [`VersionConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `<`
    Lt,
    /// `=` or no operator.
    Eq,
}

impl Op {
    const fn accepts(self, ord: Ordering) -> bool {
        match self {
            Self::Ge => !matches!(ord, Ordering::Less),
            Self::Gt => matches!(ord, Ordering::Greater),
            Self::Le => !matches!(ord, Ordering::Greater),
            Self::Lt => matches!(ord, Ordering::Less),
            Self::Eq => matches!(ord, Ordering::Equal),
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Eq => "=",
        }
    }
}

/// A parsed `<op><version>` constraint such as `>=3.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    /// Comparison operator.
    pub op: Op,
    /// Required version.
    pub version: String,
}

impl FromStr for VersionConstraint {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Two-character operators must be tried before their prefixes.
        let (op, rest) = [
            (">=", Op::Ge),
            (">", Op::Gt),
            ("<=", Op::Le),
            ("<", Op::Lt),
            ("=", Op::Eq),
        ]
        .into_iter()
        .find_map(|(sym, op)| s.strip_prefix(sym).map(|rest| (op, rest)))
        .unwrap_or((Op::Eq, s));
        Ok(Self {
            op,
            version: rest.trim().to_string(),
        })
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.version)
    }
}

impl VersionConstraint {
    /// Whether `version` satisfies this constraint.
    #[must_use]
    pub fn is_met_by(&self, version: &str) -> bool {
        self.op
            .accepts(compare_versions(version.trim(), &self.version))
    }
}

/// Whether `version` satisfies `constraint` (e.g. `"3.1"` and `">=3.0"`).
#[must_use]
pub fn version_meets_constraint(version: &str, constraint: &str) -> bool {
    let Ok(parsed) = constraint.parse::<VersionConstraint>();
    parsed.is_met_by(version)
}

/// Compare dotted versions component by component.
///
/// Components compare numerically when both parse as integers and as
/// strings otherwise. Running out of components first orders lower, so
/// `1.2 < 1.2.0`.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Pull a dotted version number out of free-form program output.
#[must_use]
pub fn extract_version(output: &str) -> Option<String> {
    VERSION_PATTERNS.iter().find_map(|re| {
        re.captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Run `program` with each of the common version flags until one yields
/// output containing a version.
#[must_use]
pub fn probe_version(executor: &dyn Executor, program: &Path) -> Option<String> {
    VERSION_FLAGS.iter().find_map(|flag| {
        let result = executor.run_unchecked(program, &[*flag]).ok()?;
        if !result.success {
            return None;
        }
        let output = result.combined();
        if output.trim().is_empty() {
            return None;
        }
        extract_version(&output)
    })
}

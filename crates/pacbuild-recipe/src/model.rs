//! In-memory representation of a parsed package recipe.

use std::collections::BTreeMap;

/// The four build stages a recipe may define a hook for.
///
/// The set is closed: no other stage names are recognized by either
/// front-end, so dispatch over this enum (rather than over hook-name
/// strings) is exhaustive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookKind {
    Prepare,
    Build,
    Check,
    Package,
}

impl HookKind {
    pub const ALL: [HookKind; 4] = [
        HookKind::Prepare,
        HookKind::Build,
        HookKind::Check,
        HookKind::Package,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::Prepare => "prepare",
            HookKind::Build => "build",
            HookKind::Check => "check",
            HookKind::Package => "package",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "prepare" => Some(HookKind::Prepare),
            "build" => Some(HookKind::Build),
            "check" => Some(HookKind::Check),
            "package" => Some(HookKind::Package),
            _ => None,
        }
    }
}

/// Relational operator recognized in a dependency constraint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    None,
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
}

/// A dependency string such as `compiler>=4.7`, parsed into a bare name, an
/// optional version, and the relation between them.
///
/// Parsing precedence: the longest matching operator among `>=`, `<=`, `>`,
/// `<`, `=` wins, so that `>=` is never mistaken for a bare `>` followed by
/// `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstrainedName {
    pub name: String,
    pub version: Option<String>,
    pub relation: Relation,
}

const OPERATORS: &[(&str, Relation)] = &[
    (">=", Relation::Ge),
    ("<=", Relation::Le),
    (">", Relation::Gt),
    ("<", Relation::Lt),
    ("=", Relation::Eq),
];

impl ConstrainedName {
    pub fn parse(raw: &str) -> Self {
        for (op, relation) in OPERATORS {
            if let Some(idx) = raw.find(op) {
                let name = raw[..idx].to_string();
                let version = raw[idx + op.len()..].to_string();
                return ConstrainedName {
                    name,
                    version: Some(version),
                    relation: *relation,
                };
            }
        }
        ConstrainedName {
            name: raw.to_string(),
            version: None,
            relation: Relation::None,
        }
    }
}

impl std::fmt::Display for ConstrainedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.relation, &self.version) {
            (Relation::None, _) | (_, None) => write!(f, "{}", self.name),
            (Relation::Eq, Some(v)) => write!(f, "{}={}", self.name, v),
            (Relation::Ge, Some(v)) => write!(f, "{}>={}", self.name, v),
            (Relation::Le, Some(v)) => write!(f, "{}<={}", self.name, v),
            (Relation::Gt, Some(v)) => write!(f, "{}>{}", self.name, v),
            (Relation::Lt, Some(v)) => write!(f, "{}<{}", self.name, v),
        }
    }
}

/// Sentinel checksum value meaning "do not verify this source".
pub const SKIP: &str = "SKIP";

/// An immutable, fully-validated recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub name: String,
    pub version: String,
    pub release: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub architectures: Vec<String>,
    pub licenses: Vec<String>,
    pub runtime_dependencies: Vec<ConstrainedName>,
    pub build_dependencies: Vec<ConstrainedName>,
    pub sources: Vec<String>,
    pub checksums: Vec<String>,
    pub hooks: BTreeMap<HookKind, String>,

    /// Additional recipe metadata: declared conflicts, provided/replaced
    /// names, optional epoch.
    pub conflicts: Vec<ConstrainedName>,
    pub provides: Vec<String>,
    pub replaces: Vec<String>,
    pub epoch: Option<u32>,
}

impl Recipe {
    /// The hook body for `kind`, or an empty string if the recipe does not
    /// define one. A missing hook is never an error at the model layer.
    pub fn hook(&self, kind: HookKind) -> &str {
        self.hooks.get(&kind).map(|s| s.as_str()).unwrap_or("")
    }

    /// The architecture that an unqualified build targets: the first entry
    /// in `architectures`, or `"any"` if the list happens to be empty.
    pub fn default_architecture(&self) -> &str {
        self.architectures.first().map(|s| s.as_str()).unwrap_or("any")
    }
}

/// Builder used by both front-ends to assemble a `Recipe` field-by-field
/// before validation runs.
#[derive(Debug, Clone, Default)]
pub struct RecipeBuilder {
    pub name: Option<String>,
    pub version: Option<String>,
    pub release: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub architectures: Vec<String>,
    pub licenses: Vec<String>,
    pub runtime_dependencies: Vec<String>,
    pub build_dependencies: Vec<String>,
    pub sources: Vec<String>,
    pub checksums: Vec<String>,
    pub hooks: BTreeMap<HookKind, String>,
    pub conflicts: Vec<String>,
    pub provides: Vec<String>,
    pub replaces: Vec<String>,
    pub epoch: Option<u32>,

    /// `build.type` from a declarative recipe, consulted only by
    /// [`crate::lower::lower`] to pick a default hook pair when an explicit
    /// `build`/`package` hook is absent.
    pub build_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("compiler>=4.7", "compiler", Relation::Ge, Some("4.7"))]
    #[case("compiler<=4.7", "compiler", Relation::Le, Some("4.7"))]
    #[case("compiler>4.7", "compiler", Relation::Gt, Some("4.7"))]
    #[case("compiler<4.7", "compiler", Relation::Lt, Some("4.7"))]
    #[case("compiler=4.7", "compiler", Relation::Eq, Some("4.7"))]
    #[case("glibc", "glibc", Relation::None, None)]
    fn parse_picks_the_longest_matching_operator(
        #[case] raw: &str,
        #[case] name: &str,
        #[case] relation: Relation,
        #[case] version: Option<&str>,
    ) {
        let parsed = ConstrainedName::parse(raw);
        assert_eq!(parsed.name, name);
        assert_eq!(parsed.relation, relation);
        assert_eq!(parsed.version.as_deref(), version);
    }

    #[rstest]
    #[case(ConstrainedName { name: "glibc".into(), version: None, relation: Relation::None })]
    #[case(ConstrainedName { name: "glibc".into(), version: Some("2.30".into()), relation: Relation::Ge })]
    fn display_round_trips_through_parse(#[case] original: ConstrainedName) {
        let rendered = original.to_string();
        assert_eq!(ConstrainedName::parse(&rendered), original);
    }
}

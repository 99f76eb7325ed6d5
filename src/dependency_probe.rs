//! Read-only query against the installed-package catalog. Catalog
//! unavailability is treated as "no records", not an error: every
//! dependency then appears missing, and the caller's policy decides whether
//! that is fatal.

use pacbuild_recipe::ConstrainedName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackageRecord {
    pub name: String,
    pub version: String,
}

/// A read-only query surface over whatever installed-package database the
/// host provides. The core never installs, removes, or otherwise mutates
/// through this trait.
pub trait DependencyProbe: Send + Sync {
    fn installed(&self) -> Vec<InstalledPackageRecord>;
}

/// A probe with no backing catalog: every lookup reports nothing installed.
/// Used as the default since the host installer's database lives outside
/// this crate.
#[derive(Debug, Default)]
pub struct NullDependencyProbe;

impl DependencyProbe for NullDependencyProbe {
    fn installed(&self) -> Vec<InstalledPackageRecord> {
        Vec::new()
    }
}

/// `runtime_dependencies` entries not satisfied by `probe`'s catalog.
pub fn missing_dependencies(
    runtime_dependencies: &[ConstrainedName],
    probe: &dyn DependencyProbe,
) -> Vec<ConstrainedName> {
    let installed = probe.installed();
    runtime_dependencies
        .iter()
        .filter(|dep| !is_satisfied(dep, &installed))
        .cloned()
        .collect()
}

/// Names from `conflicts` present in `probe`'s catalog.
pub fn present_conflicts(
    conflicts: &[ConstrainedName],
    probe: &dyn DependencyProbe,
) -> Vec<String> {
    let installed = probe.installed();
    conflicts
        .iter()
        .filter(|c| installed.iter().any(|r| r.name == c.name))
        .map(|c| c.name.clone())
        .collect()
}

fn is_satisfied(dependency: &ConstrainedName, installed: &[InstalledPackageRecord]) -> bool {
    use pacbuild_recipe::Relation;

    let Some(record) = installed.iter().find(|r| r.name == dependency.name) else {
        return false;
    };
    match (&dependency.relation, &dependency.version) {
        (Relation::None, _) => true,
        (_, None) => true,
        (relation, Some(required)) => relation_holds(*relation, &record.version, required),
    }
}

fn relation_holds(relation: pacbuild_recipe::Relation, actual: &str, required: &str) -> bool {
    use pacbuild_recipe::Relation;
    match relation {
        Relation::None => true,
        Relation::Eq => actual == required,
        Relation::Ge => actual >= required,
        Relation::Le => actual <= required,
        Relation::Gt => actual > required,
        Relation::Lt => actual < required,
    }
}

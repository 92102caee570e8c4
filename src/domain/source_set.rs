//! Source set registry
//!
//! A source set is a named group of source directories compiled together
//! (`main`, `test`, `functionalTest`). A source set that extends another
//! compiles against that set's output. The extends relation is checked for
//! cycles as soon as an edge is declared.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::coordinate::DependencyCoordinate;
use super::error::{BuildError, GraphKind};
use super::graph::NamedGraph;

pub const MAIN: &str = "main";
pub const TEST: &str = "test";
pub const FUNCTIONAL_TEST: &str = "functionalTest";

/// One element of a classpath
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClasspathEntry {
    /// Compiled classes of a source set
    Output { source_set: String, path: PathBuf },
    /// A resolved third-party artifact
    Artifact { coordinate: DependencyCoordinate },
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClasspathEntry::Output { path, .. } => write!(f, "{}", path.display()),
            ClasspathEntry::Artifact { coordinate } => write!(f, "{}", coordinate),
        }
    }
}

/// A named compilation unit
#[derive(Debug, Clone)]
pub struct SourceSet {
    pub name: String,
    pub source_dirs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    extends: Vec<String>,
}

impl SourceSet {
    /// Source sets this one compiles against, in declaration order
    pub fn extends(&self) -> &[String] {
        &self.extends
    }

    /// Configuration holding this source set's compile dependencies
    pub fn implementation_configuration(&self) -> String {
        configuration_name(&self.name, "implementation")
    }

    /// Configuration holding this source set's runtime-only dependencies
    pub fn runtime_only_configuration(&self) -> String {
        configuration_name(&self.name, "runtimeOnly")
    }

    /// Name of the task compiling this source set
    pub fn compile_task_name(&self) -> String {
        if self.name == MAIN {
            "compileJava".to_string()
        } else {
            format!("compile{}Java", capitalize(&self.name))
        }
    }

    /// Classpath entry for this source set's compiled classes
    pub fn output(&self) -> ClasspathEntry {
        ClasspathEntry::Output {
            source_set: self.name.clone(),
            path: self.output_dir.clone(),
        }
    }
}

/// Returns the bucket name for a source set: `implementation` for main,
/// `testImplementation` for test, and so on
pub fn configuration_name(source_set: &str, suffix: &str) -> String {
    if source_set == MAIN {
        suffix.to_string()
    } else {
        format!("{}{}", source_set, capitalize(suffix))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Default source directory for a source set: `src/functional-test/java`
/// for `functionalTest`
pub fn default_source_dir(name: &str) -> PathBuf {
    let mut kebab = String::new();
    for c in name.chars() {
        if c.is_uppercase() {
            kebab.push('-');
            kebab.extend(c.to_lowercase());
        } else {
            kebab.push(c);
        }
    }
    Path::new("src").join(kebab).join("java")
}

/// Registry of all source sets in a build
#[derive(Debug)]
pub struct SourceSetRegistry {
    build_dir: PathBuf,
    graph: NamedGraph<()>,
    source_sets: HashMap<String, SourceSet>,
}

impl Default for SourceSetRegistry {
    fn default() -> Self {
        Self::new("build")
    }
}

impl SourceSetRegistry {
    /// Creates an empty registry placing outputs under `build_dir`
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
            graph: NamedGraph::new(GraphKind::SourceSet),
            source_sets: HashMap::new(),
        }
    }

    /// Defines a new source set
    ///
    /// Every extended source set must already exist. An empty `source_dirs`
    /// uses the conventional directory for the name.
    pub fn define(
        &mut self,
        name: &str,
        source_dirs: Vec<PathBuf>,
        extends: &[&str],
    ) -> Result<&SourceSet, BuildError> {
        if self.source_sets.contains_key(name) {
            return Err(BuildError::Duplicate {
                kind: GraphKind::SourceSet,
                name: name.to_string(),
            });
        }
        if extends.contains(&name) {
            return Err(BuildError::ConfigurationCycle {
                kind: GraphKind::SourceSet,
                from: name.to_string(),
                to: name.to_string(),
            });
        }
        if let Some(missing) = extends.iter().find(|e| !self.source_sets.contains_key(**e)) {
            return Err(BuildError::UnknownSourceSet(missing.to_string()));
        }

        let source_dirs = if source_dirs.is_empty() {
            vec![default_source_dir(name)]
        } else {
            source_dirs
        };

        self.graph.add_node(name);
        for parent in extends {
            self.graph.add_edge(name, parent, ())?;
        }

        let source_set = SourceSet {
            name: name.to_string(),
            source_dirs,
            output_dir: self.build_dir.join("classes").join("java").join(name),
            extends: extends.iter().map(|e| e.to_string()).collect(),
        };
        log::debug!("defined source set {} extending {:?}", name, source_set.extends);

        Ok(&*self.source_sets.entry(name.to_string()).or_insert(source_set))
    }

    /// Makes an existing source set compile against another one's output
    pub fn extend(&mut self, name: &str, parent: &str) -> Result<(), BuildError> {
        if !self.source_sets.contains_key(name) {
            return Err(BuildError::UnknownSourceSet(name.to_string()));
        }
        if name == parent {
            return Err(BuildError::ConfigurationCycle {
                kind: GraphKind::SourceSet,
                from: name.to_string(),
                to: parent.to_string(),
            });
        }

        self.graph.add_edge(name, parent, ())?;
        if let Some(source_set) = self.source_sets.get_mut(name) {
            source_set.extends.push(parent.to_string());
        }
        Ok(())
    }

    /// Adds a source directory to an existing source set
    pub fn add_source_dir(&mut self, name: &str, dir: impl Into<PathBuf>) -> Result<(), BuildError> {
        let source_set = self
            .source_sets
            .get_mut(name)
            .ok_or_else(|| BuildError::UnknownSourceSet(name.to_string()))?;
        let dir = dir.into();
        if !source_set.source_dirs.contains(&dir) {
            source_set.source_dirs.push(dir);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&SourceSet, BuildError> {
        self.source_sets
            .get(name)
            .ok_or_else(|| BuildError::UnknownSourceSet(name.to_string()))
    }

    /// Returns source sets in definition order
    pub fn iter(&self) -> impl Iterator<Item = &SourceSet> {
        self.graph.names().filter_map(move |n| self.source_sets.get(n))
    }

    /// Returns the outputs of every source set `name` extends, in
    /// declaration order
    pub fn extended_outputs(&self, name: &str) -> Result<Vec<ClasspathEntry>, BuildError> {
        let source_set = self.get(name)?;
        source_set
            .extends
            .iter()
            .map(|parent| self.get(parent).map(SourceSet::output))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> SourceSetRegistry {
        let mut registry = SourceSetRegistry::default();
        registry.define(MAIN, vec![], &[]).unwrap();
        registry.define(TEST, vec![], &[MAIN]).unwrap();
        registry
            .define(FUNCTIONAL_TEST, vec![], &[MAIN, TEST])
            .unwrap();
        registry
    }

    #[test]
    fn functional_test_compiles_against_main_then_test() {
        let registry = standard();
        let outputs = registry.extended_outputs(FUNCTIONAL_TEST).unwrap();

        assert_eq!(
            outputs,
            vec![
                ClasspathEntry::Output {
                    source_set: "main".to_string(),
                    path: PathBuf::from("build/classes/java/main"),
                },
                ClasspathEntry::Output {
                    source_set: "test".to_string(),
                    path: PathBuf::from("build/classes/java/test"),
                },
            ]
        );
    }

    #[test]
    fn conventional_directories() {
        let registry = standard();
        assert_eq!(
            registry.get(FUNCTIONAL_TEST).unwrap().source_dirs,
            vec![PathBuf::from("src/functional-test/java")]
        );
        assert_eq!(
            registry.get(MAIN).unwrap().source_dirs,
            vec![PathBuf::from("src/main/java")]
        );
    }

    #[test]
    fn naming_conventions() {
        let registry = standard();
        let main = registry.get(MAIN).unwrap();
        let ft = registry.get(FUNCTIONAL_TEST).unwrap();

        assert_eq!(main.implementation_configuration(), "implementation");
        assert_eq!(main.compile_task_name(), "compileJava");
        assert_eq!(ft.implementation_configuration(), "functionalTestImplementation");
        assert_eq!(ft.runtime_only_configuration(), "functionalTestRuntimeOnly");
        assert_eq!(ft.compile_task_name(), "compileFunctionalTestJava");
    }

    #[test]
    fn duplicate_extends_are_kept() {
        let mut registry = standard();
        registry.extend(TEST, MAIN).unwrap();
        assert_eq!(registry.get(TEST).unwrap().extends(), &["main", "main"]);
        assert_eq!(registry.extended_outputs(TEST).unwrap().len(), 2);
    }

    #[test]
    fn extends_cycle_rejected_at_declaration() {
        let mut registry = standard();
        let result = registry.extend(MAIN, FUNCTIONAL_TEST);

        assert!(matches!(
            result,
            Err(BuildError::ConfigurationCycle {
                kind: GraphKind::SourceSet,
                ..
            })
        ));
        assert!(registry.get(MAIN).unwrap().extends().is_empty());
    }

    #[test]
    fn self_extension_is_a_cycle() {
        let mut registry = SourceSetRegistry::default();
        let result = registry.define("x", vec![], &["x"]);
        assert!(matches!(result, Err(BuildError::ConfigurationCycle { .. })));
        assert!(registry.get("x").is_err());
    }

    #[test]
    fn unknown_and_duplicate_rejected() {
        let mut registry = standard();
        assert_eq!(
            registry.define("integration", vec![], &["nope"]).unwrap_err(),
            BuildError::UnknownSourceSet("nope".to_string())
        );
        assert!(matches!(
            registry.define(MAIN, vec![], &[]),
            Err(BuildError::Duplicate { .. })
        ));
    }

    #[test]
    fn definition_order_is_kept() {
        let registry = standard();
        let names: Vec<_> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["main", "test", "functionalTest"]);
    }

    #[test]
    fn add_source_dir_deduplicates() {
        let mut registry = standard();
        registry
            .add_source_dir(FUNCTIONAL_TEST, "src/functional-test/java")
            .unwrap();
        registry
            .add_source_dir(FUNCTIONAL_TEST, "src/functional-test/kotlin")
            .unwrap();
        assert_eq!(registry.get(FUNCTIONAL_TEST).unwrap().source_dirs.len(), 2);
    }
}

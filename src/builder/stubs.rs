//! Stub solutions for precompiled libraries.
//!
//! A stub solution is a solution descriptor whose model roots are jars. It
//! lets source modules depend on an external library through the ordinary
//! module dependency mechanism.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::module_id::{ModuleId, ModuleIdAndName};
use crate::core::workspace::StubSpec;
use crate::util::fs::{to_slash, write_string};
use crate::util::xml::XmlElement;

/// The JDK solution every stub re-exports.
pub const JDK_SOLUTION: &str = "6354ebe7-c22a-4a0f-ac54-50b52ab9b065(JDK)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubSolution {
    pub id_and_name: ModuleIdAndName,
    /// Jar files, forward-slash separated
    pub jar_paths: Vec<String>,
    pub module_dependencies: Vec<ModuleIdAndName>,
}

impl StubSolution {
    /// The stub for a configured library.
    pub fn for_library(spec: &StubSpec) -> Self {
        let name = spec.coordinates.stub_name();
        StubSolution {
            id_and_name: ModuleIdAndName::new(ModuleId::for_stub(&name), Some(name)),
            jar_paths: spec.jars.iter().map(|j| to_slash(j)).collect(),
            module_dependencies: spec
                .dependencies
                .iter()
                .map(|d| {
                    let name = d.stub_name();
                    ModuleIdAndName::new(ModuleId::for_stub(&name), Some(name))
                })
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        self.id_and_name.display_name()
    }

    /// `<stubs_dir>/<name>/<name>.msd`
    pub fn descriptor_path(&self, stubs_dir: &Path) -> PathBuf {
        stubs_dir
            .join(self.name())
            .join(format!("{}.msd", self.name()))
    }

    pub fn to_xml(&self) -> XmlElement {
        let mut roots: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for jar in &self.jar_paths {
            let (folder, file) = jar.rsplit_once('/').unwrap_or((".", jar.as_str()));
            roots.entry(folder).or_default().push(file);
        }

        let mut models = XmlElement::new("models");
        for (folder, files) in roots {
            let mut root = XmlElement::new("modelRoot")
                .attr("type", "java_classes")
                .attr("contentPath", folder);
            for file in files {
                root.push(XmlElement::new("sourceRoot").attr("location", file));
            }
            models.push(root);
        }

        let mut dependencies = XmlElement::new("dependencies").child(
            XmlElement::new("dependency")
                .attr("reexport", "true")
                .text(JDK_SOLUTION),
        );
        for dependency in &self.module_dependencies {
            dependencies.push(
                XmlElement::new("dependency")
                    .attr("reexport", "true")
                    .text(dependency.to_string()),
            );
        }

        let mut entries = XmlElement::new("stubModelEntries");
        for jar in &self.jar_paths {
            entries.push(XmlElement::new("stubModelEntry").attr("path", jar.as_str()));
        }

        XmlElement::new("solution")
            .attr("name", self.name())
            .attr("pluginKind", "PLUGIN_OTHER")
            .attr("moduleVersion", "0")
            .attr("uuid", self.id_and_name.id.as_str())
            .child(XmlElement::new("facets").child(XmlElement::new("facet").attr("type", "java")))
            .child(models)
            .child(dependencies)
            .child(entries)
    }

    pub fn generate_string(&self) -> String {
        self.to_xml().to_document()
    }

    pub fn generate_file(&self, file: &Path) -> Result<()> {
        write_string(file, &self.generate_string())
    }
}

/// Stubs for every configured library, in configuration order.
pub fn stub_solutions(specs: &[StubSpec]) -> Vec<StubSolution> {
    specs.iter().map(StubSolution::for_library).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coordinates::Coordinates;
    use crate::core::descriptor::{ModuleDescriptor, ModuleType};
    use tempfile::TempDir;

    fn spec() -> StubSpec {
        StubSpec {
            coordinates: Coordinates::new("org.slf4j", "slf4j-api", "1.7.30"),
            jars: vec![
                PathBuf::from("/libs/slf4j-api-1.7.30.jar"),
                PathBuf::from("/libs/extra/more.jar"),
            ],
            dependencies: vec![Coordinates::new("org.slf4j", "slf4j-parent", "1.7.30")],
        }
    }

    #[test]
    fn test_ids_are_deterministic() {
        let a = StubSolution::for_library(&spec());
        let b = StubSolution::for_library(&spec());
        assert_eq!(a.id_and_name.id, b.id_and_name.id);
        assert_eq!(a.id_and_name.id.as_str(), "~stubs#org.slf4j#slf4j-api#1.7.30");
        assert_eq!(a.generate_string(), b.generate_string());
    }

    #[test]
    fn test_generated_descriptor_parses_back() {
        let stub = StubSolution::for_library(&spec());
        let descriptor = ModuleDescriptor::parse(&stub.generate_string(), "stub.msd").unwrap();

        assert_eq!(descriptor.module_type(), ModuleType::Solution);
        assert_eq!(descriptor.name, "stubs#org.slf4j#slf4j-api#1.7.30");
        assert_eq!(descriptor.model_roots.len(), 2);
        assert_eq!(
            descriptor.stub_entries,
            vec!["/libs/slf4j-api-1.7.30.jar", "/libs/extra/more.jar"]
        );

        let deps: Vec<String> = descriptor
            .module_dependencies()
            .map(|d| d.target().display_name().to_string())
            .collect();
        assert_eq!(deps, vec!["JDK", "stubs#org.slf4j#slf4j-parent#1.7.30"]);
    }

    #[test]
    fn test_generate_file() {
        let tmp = TempDir::new().unwrap();
        let stub = StubSolution::for_library(&spec());
        let path = stub.descriptor_path(tmp.path());
        stub.generate_file(&path).unwrap();

        assert!(path.ends_with(
            "stubs#org.slf4j#slf4j-api#1.7.30/stubs#org.slf4j#slf4j-api#1.7.30.msd"
        ));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"pluginKind="PLUGIN_OTHER""#));
    }
}

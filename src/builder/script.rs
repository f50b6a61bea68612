//! Rendering a [`BuildPlan`] as an ant-style build description.
//!
//! Every chunk becomes a target depending on the chunks it needs, every
//! publication a packaging target depending on the chunks it contains.
//! Locations are written relative to the workspace root, which is the
//! project's `basedir`.

use std::path::Path;

use crate::builder::plan::{BuildChunk, BuildPlan, ModuleBuild, PublicationArtifacts};
use crate::util::fs::{relative_path, to_slash};
use crate::util::xml::XmlElement;

/// Name of the target building everything.
pub const DEFAULT_TARGET: &str = "build";

/// Render `plan` as an XML document.
pub fn render(plan: &BuildPlan) -> String {
    to_xml(plan).to_document()
}

pub fn to_xml(plan: &BuildPlan) -> XmlElement {
    let root = plan.root.as_path();
    let location = |path: &Path| to_slash(&relative_path(root, path));

    let mut project = XmlElement::new("project")
        .attr("name", plan.project.as_str())
        .attr("basedir", to_slash(root))
        .attr("default", DEFAULT_TARGET);

    project.push(
        XmlElement::new("property")
            .attr("name", "build.dir")
            .attr("location", location(&plan.build_dir)),
    );
    project.push(
        XmlElement::new("property")
            .attr("name", "mps.heap.size")
            .attr("value", plan.heap_size.as_str()),
    );
    for (name, path) in &plan.macros {
        project.push(
            XmlElement::new("property")
                .attr("name", format!("macro.{}", name))
                .attr("location", location(path)),
        );
    }

    for chunk in &plan.chunks {
        project.push(chunk_target(chunk, &location));
    }
    for publication in &plan.publications {
        project.push(package_target(plan, publication, &location));
    }

    let everything: Vec<String> = plan
        .chunks
        .iter()
        .map(|c| c.name.clone())
        .chain(plan.publications.iter().map(|p| package_target_name(p)))
        .collect();
    project.push(with_depends(
        XmlElement::new("target").attr("name", DEFAULT_TARGET),
        &everything,
    ));

    project
}

fn chunk_target(chunk: &BuildChunk, location: &dyn Fn(&Path) -> String) -> XmlElement {
    let mut target = with_depends(
        XmlElement::new("target").attr("name", chunk.name.as_str()),
        &chunk.depends_on,
    );
    for module in &chunk.modules {
        target.push(module_element(module, location));
    }
    target
}

fn module_element(module: &ModuleBuild, location: &dyn Fn(&Path) -> String) -> XmlElement {
    let mut element = XmlElement::new("module")
        .attr("name", module.name.as_str())
        .attr("id", module.id.as_str())
        .attr("kind", module.kind.as_str())
        .attr("descriptor", location(&module.descriptor));

    for root in &module.model_roots {
        element.push(XmlElement::new("modelRoot").attr("location", location(root)));
    }
    for language in &module.used_languages {
        element.push(XmlElement::new("usedLanguage").attr("name", language.as_str()));
    }
    for runtime in &module.runtime {
        element.push(XmlElement::new("runtime").attr("name", runtime.as_str()));
    }

    element.push(XmlElement::new("generate").attr("destdir", location(&module.source_gen_dir)));

    let mut classpath = XmlElement::new("classpath");
    for entry in &module.classpath {
        classpath.push(XmlElement::new("pathelement").attr("location", location(entry)));
    }
    element.push(
        XmlElement::new("compile")
            .attr("srcdir", location(&module.source_gen_dir))
            .attr("destdir", location(&module.classes_dir))
            .child(classpath),
    );

    if let Some(jar) = &module.package {
        element.push(
            XmlElement::new("package")
                .attr("jar", location(jar))
                .attr("basedir", location(&module.classes_dir)),
        );
    }
    element
}

fn package_target(
    plan: &BuildPlan,
    publication: &PublicationArtifacts,
    location: &dyn Fn(&Path) -> String,
) -> XmlElement {
    let mut depends: Vec<String> = plan
        .chunks
        .iter()
        .filter(|c| c.publication.as_deref() == Some(publication.name.as_str()))
        .map(|c| c.name.clone())
        .collect();
    depends.extend(
        plan.publications
            .iter()
            .filter(|p| publication.depends_on.contains(&p.name))
            .map(|p| package_target_name(p)),
    );

    let mut target = with_depends(
        XmlElement::new("target")
            .attr("name", package_target_name(publication))
            .attr("description", format!("Package publication {}", publication.name)),
        &depends,
    );
    for file in &publication.generated_files {
        target.push(XmlElement::new("artifact").attr("location", location(file)));
    }
    for coordinates in &publication.stub_coordinates {
        target.push(XmlElement::new("library").attr("coordinates", coordinates.as_str()));
    }
    for plugin in &publication.idea_plugins {
        let mut element = XmlElement::new("ideaPlugin")
            .attr("module", plugin.module.as_str())
            .attr("id", plugin.id.as_str())
            .attr("destdir", location(&plugin.output_dir));
        if let Some(description) = &plugin.description {
            element.push(XmlElement::new("description").text(description.as_str()));
        }
        if let Some(xml) = &plugin.plugin_xml {
            element.push(XmlElement::new("pluginXml").text(xml.as_str()));
        }
        target.push(element);
    }
    target
}

fn package_target_name(publication: &PublicationArtifacts) -> String {
    format!("package.{}", publication.artifact_name)
}

fn with_depends(target: XmlElement, depends: &[String]) -> XmlElement {
    if depends.is_empty() {
        target
    } else {
        target.attr("depends", depends.join(","))
    }
}

//! Read-only reports: `mpsbuild modules`, `mpsbuild check` and
//! `mpsbuild publications`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::builder::plan::PublicationArtifacts;
use crate::builder::stubs::stub_solutions;
use crate::core::descriptor::ModuleType;
use crate::core::module_id::ModuleId;
use crate::core::registry::FoundModules;
use crate::core::workspace::Workspace;
use crate::ops::check::check_publications;
use crate::ops::generate::{mine_workspace, plan_workspace};
use crate::util::fs::{relative_path, to_slash};

/// One line of the module listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub id: ModuleId,
    pub name: String,
    pub kind: ModuleType,

    /// `source`, `library` or `plugin`
    pub owner: &'static str,

    /// Descriptor file, or the jar for library modules
    pub location: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
}

/// Outcome of `mpsbuild check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub modules: usize,
    pub publications: Vec<PublicationSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicationSummary {
    pub name: String,

    /// Modules built together with the publication, including folded ones
    pub modules: Vec<String>,

    pub depends_on: Vec<String>,
}

/// Mine the workspace and summarize every module found, sorted by name.
pub fn list_modules(ws: &Workspace) -> Result<Vec<ModuleSummary>> {
    let modules = mine_workspace(ws, &stub_solutions(ws.stubs()))?;
    Ok(summarize_modules(&modules))
}

pub fn summarize_modules(modules: &FoundModules) -> Vec<ModuleSummary> {
    let mut summaries: Vec<ModuleSummary> = modules
        .modules()
        .map(|m| ModuleSummary {
            id: m.id.clone(),
            name: m.name.clone(),
            kind: m.module_type,
            owner: m.owner.kind_name(),
            location: if m.owner.is_source() {
                m.descriptor_path.clone()
            } else {
                m.owner.path().to_path_buf()
            },
            plugin: m.owner.plugin_id().map(str::to_string),
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    summaries
}

/// Render the module listing as aligned columns.
pub fn format_modules(modules: &[ModuleSummary], root: &Path) -> String {
    let width = modules.iter().map(|m| m.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for module in modules {
        let _ = writeln!(
            out,
            "{:width$}  {:9}  {:7}  {}",
            module.name,
            module.kind.as_str(),
            module.owner,
            to_slash(&relative_path(root, &module.location)),
            width = width
        );
    }
    let _ = writeln!(out, "{} modules", modules.len());
    out
}

/// Run mining and every publication check.
pub fn check_workspace(ws: &Workspace) -> Result<CheckReport> {
    let modules = mine_workspace(ws, &stub_solutions(ws.stubs()))?;
    let checked = check_publications(ws, &modules)?;

    let publications = checked
        .publications
        .iter()
        .enumerate()
        .map(|(index, publication)| {
            let mut modules: Vec<String> = checked
                .graph
                .elements(checked.publication_node(index))
                .map(|m| m.name.clone())
                .collect();
            modules.sort();
            PublicationSummary {
                name: publication.name().to_string(),
                modules,
                depends_on: checked
                    .publication_dependencies(index)
                    .into_iter()
                    .map(|i| checked.publications[i].name().to_string())
                    .collect(),
            }
        })
        .collect();

    Ok(CheckReport {
        modules: modules.len(),
        publications,
    })
}

pub fn format_check(report: &CheckReport) -> String {
    let mut out = format!(
        "{} modules, {} publications\n",
        report.modules,
        report.publications.len()
    );
    for publication in &report.publications {
        let _ = write!(
            out,
            "  {}: {} modules",
            publication.name,
            publication.modules.len()
        );
        if !publication.depends_on.is_empty() {
            let _ = write!(out, ", depends on {}", publication.depends_on.join(", "));
        }
        out.push('\n');
    }
    out
}

/// Compute the packaging view of every publication.
pub fn publication_artifacts(ws: &Workspace) -> Result<Vec<PublicationArtifacts>> {
    Ok(plan_workspace(ws)?.plan.publications)
}

pub fn format_publications(publications: &[PublicationArtifacts], root: &Path) -> String {
    let mut out = String::new();
    for publication in publications {
        let _ = writeln!(out, "{} ({})", publication.name, publication.artifact_name);
        if !publication.depends_on.is_empty() {
            let _ = writeln!(out, "  depends on: {}", publication.depends_on.join(", "));
        }
        let _ = writeln!(out, "  modules:");
        for module in &publication.modules {
            let _ = writeln!(out, "    {}", module);
        }
        let _ = writeln!(out, "  files:");
        for file in &publication.generated_files {
            let _ = writeln!(out, "    {}", to_slash(&relative_path(root, file)));
        }
        if !publication.stub_coordinates.is_empty() {
            let _ = writeln!(out, "  libraries:");
            for coordinates in &publication.stub_coordinates {
                let _ = writeln!(out, "    {}", coordinates);
            }
        }
        if !publication.idea_plugins.is_empty() {
            let _ = writeln!(out, "  idea plugins:");
            for plugin in &publication.idea_plugins {
                let _ = writeln!(
                    out,
                    "    {} -> {}",
                    plugin.module,
                    to_slash(&relative_path(root, &plugin.output_dir))
                );
            }
        }
    }
    out
}

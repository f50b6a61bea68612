//! MPS project module lists (`.mps/modules.xml`).

use std::path::{Path, PathBuf};

use roxmltree::Document;

use crate::core::descriptor::DescriptorError;
use crate::miner::MinerError;
use crate::util::fs::normalize_lexically;
use crate::util::xml::{attribute, children_named, find_child};

/// Name of the project settings folder.
pub const PROJECT_SETTINGS_DIR: &str = ".mps";

const PROJECT_DIR_MACRO: &str = "$PROJECT_DIR$";

/// A module listed by a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectModule {
    pub module_file: PathBuf,
    pub virtual_folder: Option<String>,
}

/// Read the modules listed in `modules_xml`. Entries whose file does not
/// exist are dropped.
pub fn read_project_modules(
    modules_xml: &Path,
    project_dir: &Path,
) -> Result<Vec<ProjectModule>, MinerError> {
    let xml = std::fs::read_to_string(modules_xml).map_err(|source| MinerError::Io {
        path: modules_xml.to_path_buf(),
        source,
    })?;
    let modules = parse_project_modules(&xml, &modules_xml.display().to_string(), project_dir)?;
    Ok(modules
        .into_iter()
        .filter(|m| m.module_file.is_file())
        .collect())
}

/// Parse a `modules.xml` document without touching the filesystem.
pub fn parse_project_modules(
    xml: &str,
    file: &str,
    project_dir: &Path,
) -> Result<Vec<ProjectModule>, DescriptorError> {
    let doc = Document::parse(xml).map_err(|e| DescriptorError::xml(file, e))?;
    let root = doc.root_element();

    let component = children_named(root, "component")
        .find(|c| c.attribute("name") == Some("MPSProject"))
        .or_else(|| find_child(root, "component"));
    let Some(project_modules) = component.and_then(|c| find_child(c, "projectModules")) else {
        return Ok(Vec::new());
    };

    let project_dir = project_dir.to_string_lossy();
    Ok(children_named(project_modules, "modulePath")
        .filter_map(|el| {
            let path = attribute(el, "path")?.replace(PROJECT_DIR_MACRO, &project_dir);
            Some(ProjectModule {
                module_file: normalize_lexically(Path::new(&path)),
                virtual_folder: attribute(el, "folder").map(str::to_string),
            })
        })
        .collect())
}

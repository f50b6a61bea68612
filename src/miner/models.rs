//! Language and devkit usages recorded in model files.
//!
//! Module descriptors under-report what their models use (devkits never
//! show up in the descriptor), so the model headers are read as well.

use std::path::Path;

use roxmltree::Document;
use walkdir::WalkDir;

use crate::core::descriptor::DescriptorError;
use crate::core::module_id::{ModuleId, ModuleIdAndName};
use crate::miner::MinerError;
use crate::util::xml::{attribute, elements, find_child};

const MODEL_EXTENSIONS: &[&str] = &["mps", "model"];

/// Collect usages from every model file below `folder`.
pub fn collect_model_usages(
    folder: &Path,
    module_name: &str,
) -> Result<Vec<ModuleIdAndName>, MinerError> {
    let mut usages = Vec::new();

    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry.map_err(|source| MinerError::Walk {
            path: folder.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !is_model_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        let xml = std::fs::read_to_string(path).map_err(|source| MinerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        usages.extend(parse_model_usages(&xml, &path.display().to_string(), module_name)?);
    }

    Ok(usages)
}

fn is_model_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MODEL_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Read `<languages><use id name/><devkit ref/></languages>` from a model.
pub fn parse_model_usages(
    xml: &str,
    file: &str,
    module_name: &str,
) -> Result<Vec<ModuleIdAndName>, DescriptorError> {
    let doc = Document::parse(xml).map_err(|e| DescriptorError::Xml {
        file: file.to_string(),
        parent: Some(module_name.to_string()),
        message: e.to_string(),
    })?;

    let Some(languages) = find_child(doc.root_element(), "languages") else {
        return Ok(Vec::new());
    };

    let mut usages = Vec::new();
    for el in elements(languages) {
        match el.tag_name().name() {
            "use" => {
                if let Some(id) = attribute(el, "id") {
                    usages.push(ModuleIdAndName::new(
                        ModuleId::new(id),
                        attribute(el, "name").map(str::to_string),
                    ));
                }
            }
            "devkit" => {
                if let Some(reference) = attribute(el, "ref") {
                    let parsed = ModuleIdAndName::parse(reference).map_err(|source| {
                        DescriptorError::InvalidReference {
                            file: file.to_string(),
                            source,
                        }
                    })?;
                    usages.push(parsed);
                }
            }
            _ => {}
        }
    }
    Ok(usages)
}

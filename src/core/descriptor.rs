//! Module descriptors.
//!
//! A [`ModuleDescriptor`] is the immutable result of parsing one descriptor
//! source: a `.msd`, `.mpl` or `.devkit` file, a generator nested inside a
//! language, or a `META-INF/module.xml` deployment descriptor inside a jar.

use std::fmt;

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dependency::{DependencyType, ModuleDependency};
use crate::core::module_id::{InvalidModuleReference, ModuleId, ModuleIdAndName};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::xml::{attribute, children_named, nested, text};

/// The kind of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Solution,
    Language,
    Generator,
    Devkit,
}

impl ModuleType {
    /// Map a descriptor root tag (or deployment `type` attribute).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "solution" => Some(ModuleType::Solution),
            "language" => Some(ModuleType::Language),
            "generator" => Some(ModuleType::Generator),
            "dev-kit" | "devkit" => Some(ModuleType::Devkit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Solution => "solution",
            ModuleType::Language => "language",
            ModuleType::Generator => "generator",
            ModuleType::Devkit => "devkit",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while parsing descriptor XML.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to parse `{file}`{}: {message}", in_parent(.parent))]
    Xml {
        file: String,
        parent: Option<String>,
        message: String,
    },

    #[error("unknown module type `{tag}` in `{file}`")]
    UnknownModuleType { file: String, tag: String },

    #[error("<{tag}> in `{file}`{} has no `{attribute}` attribute", in_parent(.parent))]
    MissingAttribute {
        file: String,
        tag: String,
        attribute: &'static str,
        parent: Option<String>,
    },

    #[error("invalid module reference in `{file}`")]
    InvalidReference {
        file: String,
        #[source]
        source: InvalidModuleReference,
    },
}

fn in_parent(parent: &Option<String>) -> String {
    parent
        .as_ref()
        .map(|p| format!(" (inside module `{}`)", p))
        .unwrap_or_default()
}

impl DescriptorError {
    /// Create an XML syntax error for `file`.
    pub fn xml(file: &str, error: impl fmt::Display) -> Self {
        DescriptorError::Xml {
            file: file.to_string(),
            parent: None,
            message: error.to_string(),
        }
    }

    /// The file the error originated from.
    pub fn file(&self) -> &str {
        match self {
            DescriptorError::Xml { file, .. }
            | DescriptorError::UnknownModuleType { file, .. }
            | DescriptorError::MissingAttribute { file, .. }
            | DescriptorError::InvalidReference { file, .. } => file,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_location(self.file());
        match self {
            DescriptorError::InvalidReference { source, .. } => diag
                .with_context(source.to_string())
                .with_suggestion(suggestions::FIX_DESCRIPTOR),
            _ => diag.with_suggestion(suggestions::FIX_DESCRIPTOR),
        }
    }
}

/// A model root declared by a solution, language or generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoot {
    /// Base folder, usually starting with `${module}`
    pub content_path: Option<String>,

    /// Persistence type, e.g. `default` or `java_classes`
    pub root_type: Option<String>,

    /// Folders relative to `content_path`
    pub source_roots: Vec<String>,
}

impl ModelRoot {
    /// Paths to scan, still containing macros.
    pub fn paths(&self) -> Vec<String> {
        match (&self.content_path, self.source_roots.is_empty()) {
            (Some(content), true) => vec![content.clone()],
            (None, true) => Vec::new(),
            (Some(content), false) => self
                .source_roots
                .iter()
                .map(|root| format!("{}/{}", content.trim_end_matches('/'), root))
                .collect(),
            (None, false) => self.source_roots.clone(),
        }
    }
}

/// Language-specific descriptor data.
#[derive(Debug, Clone, Default)]
pub struct LanguageDescriptor {
    pub language_version: i32,
    pub generators: Vec<ModuleDescriptor>,
    pub extended_languages: Vec<ModuleIdAndName>,
    pub runtime: Vec<ModuleIdAndName>,
}

/// Generator-specific descriptor data.
#[derive(Debug, Clone, Default)]
pub struct GeneratorDescriptor {
    pub alias: Option<String>,
    pub source_language: Option<ModuleIdAndName>,
}

/// Devkit-specific descriptor data.
#[derive(Debug, Clone, Default)]
pub struct DevkitDescriptor {
    pub exported_languages: Vec<ModuleIdAndName>,
    pub exported_solutions: Vec<ModuleIdAndName>,
    pub extended_devkits: Vec<ModuleIdAndName>,
}

/// Kind-specific part of a descriptor.
#[derive(Debug, Clone)]
pub enum DescriptorKind {
    Solution,
    Language(LanguageDescriptor),
    Generator(GeneratorDescriptor),
    Devkit(DevkitDescriptor),
}

/// A parsed module descriptor.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    pub id: ModuleId,
    pub name: String,
    pub kind: DescriptorKind,

    /// Declared dependencies, including language and devkit usages
    pub dependencies: Vec<ModuleDependency>,

    pub model_roots: Vec<ModelRoot>,

    /// Precompiled jars backing java stub models
    pub stub_entries: Vec<String>,

    /// Parsed from a `META-INF/module.xml` rather than a source descriptor
    pub is_deployment: bool,
}

impl ModuleDescriptor {
    /// Parse a descriptor document. `file` identifies the source in errors.
    pub fn parse(xml: &str, file: &str) -> Result<Self, DescriptorError> {
        let doc = Document::parse(xml).map_err(|e| DescriptorError::xml(file, e))?;
        Self::from_element(doc.root_element(), file)
    }

    /// Parse a descriptor from its root element.
    pub fn from_element(el: Node<'_, '_>, file: &str) -> Result<Self, DescriptorError> {
        let tag = el.tag_name().name();
        if tag == "module" {
            return parse_deployment(el, file);
        }
        let module_type = ModuleType::from_tag(tag).ok_or_else(|| {
            DescriptorError::UnknownModuleType {
                file: file.to_string(),
                tag: tag.to_string(),
            }
        })?;
        parse_kind(module_type, el, file)
    }

    pub fn module_type(&self) -> ModuleType {
        match self.kind {
            DescriptorKind::Solution => ModuleType::Solution,
            DescriptorKind::Language(_) => ModuleType::Language,
            DescriptorKind::Generator(_) => ModuleType::Generator,
            DescriptorKind::Devkit(_) => ModuleType::Devkit,
        }
    }

    pub fn id_and_name(&self) -> ModuleIdAndName {
        ModuleIdAndName::new(self.id.clone(), Some(self.name.clone()))
    }

    pub fn language(&self) -> Option<&LanguageDescriptor> {
        match &self.kind {
            DescriptorKind::Language(language) => Some(language),
            _ => None,
        }
    }

    pub fn generator(&self) -> Option<&GeneratorDescriptor> {
        match &self.kind {
            DescriptorKind::Generator(generator) => Some(generator),
            _ => None,
        }
    }

    pub fn devkit(&self) -> Option<&DevkitDescriptor> {
        match &self.kind {
            DescriptorKind::Devkit(devkit) => Some(devkit),
            _ => None,
        }
    }

    /// Generators nested in a language descriptor.
    pub fn generators(&self) -> &[ModuleDescriptor] {
        self.language()
            .map(|l| l.generators.as_slice())
            .unwrap_or_default()
    }

    /// Dependencies that are module edges (everything but usages).
    pub fn module_dependencies(&self) -> impl Iterator<Item = &ModuleDependency> {
        self.dependencies.iter().filter(|d| !d.is_usage())
    }

    /// Language and devkit usages declared in the descriptor.
    pub fn declared_usages(&self) -> impl Iterator<Item = &ModuleDependency> {
        self.dependencies.iter().filter(|d| d.is_usage())
    }

    /// All model root folders, still containing macros.
    pub fn model_root_paths(&self) -> Vec<String> {
        self.model_roots.iter().flat_map(ModelRoot::paths).collect()
    }
}

fn parse_kind(
    module_type: ModuleType,
    el: Node<'_, '_>,
    file: &str,
) -> Result<ModuleDescriptor, DescriptorError> {
    match module_type {
        ModuleType::Solution => {
            let mut descriptor = parse_common(el, file, None, None)?;
            descriptor.kind = DescriptorKind::Solution;
            Ok(descriptor)
        }
        ModuleType::Language => parse_language(el, file),
        ModuleType::Generator => parse_generator(el, file, None),
        ModuleType::Devkit => parse_devkit(el, file),
    }
}

fn missing(el: Node<'_, '_>, file: &str, attribute: &'static str, parent: Option<&str>) -> DescriptorError {
    DescriptorError::MissingAttribute {
        file: file.to_string(),
        tag: el.tag_name().name().to_string(),
        attribute,
        parent: parent.map(str::to_string),
    }
}

fn reference(raw: &str, file: &str) -> Result<ModuleIdAndName, DescriptorError> {
    ModuleIdAndName::parse(raw).map_err(|source| DescriptorError::InvalidReference {
        file: file.to_string(),
        source,
    })
}

fn references<'a, 'input: 'a>(
    nodes: impl Iterator<Item = Node<'a, 'input>>,
    file: &str,
) -> Result<Vec<ModuleIdAndName>, DescriptorError> {
    nodes
        .map(text)
        .filter(|t| !t.is_empty())
        .map(|t| reference(t, file))
        .collect()
}

/// Header, dependencies, usages, model roots and stub entries shared by all
/// kinds. `name` overrides the name attributes when given.
fn parse_common(
    el: Node<'_, '_>,
    file: &str,
    name: Option<String>,
    parent: Option<&str>,
) -> Result<ModuleDescriptor, DescriptorError> {
    let id = attribute(el, "uuid").ok_or_else(|| missing(el, file, "uuid", parent))?;
    let name = match name {
        Some(name) => name,
        None => attribute(el, "namespace")
            .or_else(|| attribute(el, "name"))
            .ok_or_else(|| missing(el, file, "namespace", parent))?
            .to_string(),
    };

    let mut dependencies = Vec::new();
    for dep in nested(el, "dependencies", "dependency") {
        let raw = text(dep);
        if !raw.is_empty() {
            dependencies.push(ModuleDependency::classpath(reference(raw, file)?));
        }
    }
    for lang in nested(el, "languageVersions", "language") {
        if let Some(slang) = attribute(lang, "slang") {
            dependencies.push(ModuleDependency::usage(reference(slang, file)?, true));
        }
    }
    for used in nested(el, "usedLanguages", "usedLanguage")
        .chain(nested(el, "usedDevKits", "usedDevKit"))
    {
        let raw = text(used);
        if !raw.is_empty() {
            dependencies.push(ModuleDependency::usage(reference(raw, file)?, true));
        }
    }

    let model_roots = nested(el, "models", "modelRoot")
        .map(|root| ModelRoot {
            content_path: attribute(root, "contentPath")
                .or_else(|| attribute(root, "path"))
                .map(str::to_string),
            root_type: attribute(root, "type").map(str::to_string),
            source_roots: children_named(root, "sourceRoot")
                .filter_map(|s| attribute(s, "location").map(str::to_string))
                .collect(),
        })
        .collect();

    let stub_entries = nested(el, "stubModelEntries", "stubModelEntry")
        .filter_map(|e| attribute(e, "path").map(str::to_string))
        .collect();

    Ok(ModuleDescriptor {
        id: ModuleId::new(id),
        name,
        kind: DescriptorKind::Solution,
        dependencies,
        model_roots,
        stub_entries,
        is_deployment: false,
    })
}

fn parse_language(el: Node<'_, '_>, file: &str) -> Result<ModuleDescriptor, DescriptorError> {
    let mut descriptor = parse_common(el, file, None, None)?;
    let language_ref = descriptor.id_and_name();

    let language_version = attribute(el, "languageVersion")
        .and_then(|v| v.parse().ok())
        .or_else(|| attribute(el, "version").and_then(|v| v.parse().ok()))
        .unwrap_or(0);

    let generators = nested(el, "generators", "generator")
        .map(|g| parse_generator(g, file, Some(&language_ref)))
        .collect::<Result<Vec<_>, _>>()?;

    let extended_languages =
        references(nested(el, "extendedLanguages", "extendedLanguage"), file)?;
    let runtime = references(nested(el, "runtime", "dependency"), file)?;

    for extended in &extended_languages {
        descriptor.dependencies.push(ModuleDependency::new(
            extended.clone(),
            DependencyType::Model,
            false,
        ));
    }

    descriptor.kind = DescriptorKind::Language(LanguageDescriptor {
        language_version,
        generators,
        extended_languages,
        runtime,
    });
    Ok(descriptor)
}

fn parse_generator(
    el: Node<'_, '_>,
    file: &str,
    language: Option<&ModuleIdAndName>,
) -> Result<ModuleDescriptor, DescriptorError> {
    let parent = language.map(|l| l.display_name());
    let alias = attribute(el, "alias").map(str::to_string);

    let name = match (attribute(el, "namespace").or_else(|| attribute(el, "name")), language) {
        (Some(name), _) => name.to_string(),
        (None, Some(language)) => {
            let suffix = alias
                .as_deref()
                .or_else(|| attribute(el, "uuid"))
                .unwrap_or("generator");
            format!("{}#{}", language.display_name(), suffix)
        }
        (None, None) => return Err(missing(el, file, "namespace", None)),
    };

    let mut descriptor = parse_common(el, file, Some(name), parent)?;

    for template in nested(el, "external-templates", "generator") {
        if let Some(uid) = attribute(template, "generatorUID") {
            descriptor.dependencies.push(ModuleDependency::new(
                reference(uid, file)?,
                DependencyType::Generator,
                false,
            ));
        }
    }

    if let Some(language) = language {
        descriptor.dependencies.push(ModuleDependency::new(
            language.clone(),
            DependencyType::Model,
            false,
        ));
    }

    descriptor.kind = DescriptorKind::Generator(GeneratorDescriptor {
        alias,
        source_language: language.cloned(),
    });
    Ok(descriptor)
}

fn parse_devkit(el: Node<'_, '_>, file: &str) -> Result<ModuleDescriptor, DescriptorError> {
    let mut descriptor = parse_common(el, file, None, None)?;

    let named = |tag: &'static str| el.descendants().filter(move |n| n.has_tag_name(tag));

    let exported_languages = named("exported-language")
        .filter_map(|n| attribute(n, "name"))
        .map(|r| reference(r, file))
        .collect::<Result<Vec<_>, _>>()?;
    let exported_solutions = references(named("exported-solution"), file)?;
    let extended_devkits = references(named("extendedDevKit"), file)?;

    for export in exported_languages
        .iter()
        .chain(&exported_solutions)
        .chain(&extended_devkits)
    {
        descriptor.dependencies.push(ModuleDependency::new(
            export.clone(),
            DependencyType::Model,
            false,
        ));
    }

    descriptor.kind = DescriptorKind::Devkit(DevkitDescriptor {
        exported_languages,
        exported_solutions,
        extended_devkits,
    });
    Ok(descriptor)
}

fn parse_deployment(el: Node<'_, '_>, file: &str) -> Result<ModuleDescriptor, DescriptorError> {
    let kind = attribute(el, "type").ok_or_else(|| missing(el, file, "type", None))?;
    let module_type =
        ModuleType::from_tag(kind).ok_or_else(|| DescriptorError::UnknownModuleType {
            file: file.to_string(),
            tag: kind.to_string(),
        })?;

    let mut descriptor = parse_kind(module_type, el, file)?;

    for module in nested(el, "dependencies", "module") {
        if let Some(r) = attribute(module, "ref") {
            descriptor
                .dependencies
                .push(ModuleDependency::classpath(reference(r, file)?));
        }
    }
    for lang in nested(el, "uses", "language") {
        if let Some(id) = attribute(lang, "id") {
            let target = ModuleIdAndName::new(
                ModuleId::new(id),
                attribute(lang, "fqName").map(str::to_string),
            );
            descriptor.dependencies.push(ModuleDependency::usage(target, true));
        }
    }

    descriptor.is_deployment = true;
    Ok(descriptor)
}

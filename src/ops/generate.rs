//! Implementation of `mpsbuild generate`.
//!
//! Mines the workspace, checks the publication configuration and writes the
//! build description, the JSON plan and the stub solutions. Everything is
//! computed in memory first so that a failing check leaves the build
//! directory untouched.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::builder::script;
use crate::builder::stubs::{stub_solutions, StubSolution};
use crate::builder::BuildPlan;
use crate::core::registry::FoundModules;
use crate::core::workspace::Workspace;
use crate::miner::ModulesMiner;
use crate::ops::check::check_publications;
use crate::util::fs::write_string;
use crate::util::hash::sha256_str;

/// Everything `generate` produces.
#[derive(Debug, Clone)]
pub struct GeneratedBuild {
    pub plan: BuildPlan,

    /// Rendered build description
    pub script: String,

    pub stubs: Vec<StubSolution>,
}

/// Files written by `generate`.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub plan: BuildPlan,
    pub script_path: PathBuf,
    pub plan_path: PathBuf,
    pub stub_paths: Vec<PathBuf>,
}

/// Mine all search roots of `ws`, then the MPS distribution.
///
/// `stubs` are registered first, at the location they will be written to,
/// so that source modules can depend on them before they exist on disk.
pub fn mine_workspace(ws: &Workspace, stubs: &[StubSolution]) -> Result<FoundModules> {
    let mut miner = ModulesMiner::with_macros(ws.macros().clone());
    let stubs_dir = ws.stubs_dir();

    for stub in stubs {
        let path = stub.descriptor_path(&stubs_dir);
        miner
            .register_descriptor(&stub.generate_string(), &path)
            .with_context(|| format!("failed to register stub `{}`", stub.name()))?;
    }

    let build_dir = ws.build_dir().to_path_buf();
    let outside_build_dir = move |path: &Path| !path.starts_with(&build_dir);
    for root in ws.search_roots() {
        miner
            .search_in_folder_filtered(root, &outside_build_dir)
            .with_context(|| format!("failed to search `{}`", root.display()))?;
    }
    if let Some(home) = ws.mps_home() {
        miner
            .search_in_folder(home)
            .with_context(|| format!("failed to search MPS home `{}`", home.display()))?;
    }

    let modules = miner.into_modules();
    info!("found {} modules", modules.len());
    Ok(modules)
}

/// Run the whole pipeline without writing anything.
pub fn plan_workspace(ws: &Workspace) -> Result<GeneratedBuild> {
    let stubs = stub_solutions(ws.stubs());
    let modules = mine_workspace(ws, &stubs)?;
    let checked = check_publications(ws, &modules)?;

    let mut plan = BuildPlan::new(ws, &modules, &checked)?;
    let script = script::render(&plan);
    plan.fingerprint = Some(sha256_str(&script));
    debug!(
        "planned {} modules in {} chunks",
        plan.module_count(),
        plan.chunks.len()
    );

    Ok(GeneratedBuild {
        plan,
        script,
        stubs,
    })
}

/// Run the pipeline and write its outputs below the build directory.
pub fn generate(ws: &Workspace) -> Result<GenerateResult> {
    let generated = plan_workspace(ws)?;

    let stub_paths = write_stub_solutions(ws, &generated.stubs)?;

    let script_path = ws.script_path();
    write_string(&script_path, &generated.script)?;

    let plan_path = ws.plan_path();
    let json = generated
        .plan
        .to_json()
        .context("failed to serialize build plan")?;
    write_string(&plan_path, &json)?;

    info!("wrote {}", script_path.display());
    Ok(GenerateResult {
        plan: generated.plan,
        script_path,
        plan_path,
        stub_paths,
    })
}

/// Write the configured stub solutions only.
pub fn generate_stubs(ws: &Workspace) -> Result<Vec<PathBuf>> {
    write_stub_solutions(ws, &stub_solutions(ws.stubs()))
}

fn write_stub_solutions(ws: &Workspace, stubs: &[StubSolution]) -> Result<Vec<PathBuf>> {
    let stubs_dir = ws.stubs_dir();
    stubs
        .iter()
        .map(|stub| {
            let path = stub.descriptor_path(&stubs_dir);
            stub.generate_file(&path)?;
            debug!("wrote stub {}", path.display());
            Ok(path)
        })
        .collect()
}

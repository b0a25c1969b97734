//! The bundle executor: clean, infer, bundle each entry, write, report.

use pkgbuild_config::{BuildType, ExecutorContext, ExecutorOptions};
use pkgbuild_core::{PACKAGE_JSON, Runtime, infer_build_map, read_package_json};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::engine::{BundleEngine, BundleWarning, OutputFile, WarningHandler};
use crate::output::DIST_DIR;
use crate::plan::{BundlePlan, create_bundle_plans};
use crate::{Error, Result};

/// What the task runner sees. Failures are logged, never propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ExecutorOutcome {
    pub success: bool,
}

/// Build the project named by `context` with `engine`.
pub async fn run_executor<R, E>(
    options: &ExecutorOptions,
    context: &ExecutorContext,
    runtime: &R,
    engine: &E,
) -> ExecutorOutcome
where
    R: Runtime + ?Sized,
    E: BundleEngine + ?Sized,
{
    match execute(options, context, runtime, engine).await {
        Ok(()) => ExecutorOutcome { success: true },
        Err(err) => {
            error!("{err}");
            ExecutorOutcome { success: false }
        }
    }
}

async fn execute<R, E>(
    options: &ExecutorOptions,
    context: &ExecutorContext,
    runtime: &R,
    engine: &E,
) -> Result<()>
where
    R: Runtime + ?Sized,
    E: BundleEngine + ?Sized,
{
    let project_dir = context.project_dir()?;

    if options.clean {
        debug!("Cleaning dist directory.");
        runtime.remove_dir_all(&project_dir.join(DIST_DIR)).await?;
    }

    info!("{}", build_banner(options));

    let started = Instant::now();
    build_package(&context.root, &project_dir, options, runtime, engine).await?;
    debug!("⚡ Done in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn build_banner(options: &ExecutorOptions) -> String {
    let modules = if options.preserves_modules() {
        " with modules"
    } else {
        ""
    };
    let source = options
        .package_json_path
        .as_ref()
        .map(|path| format!(" from {}", path.display()))
        .unwrap_or_default();
    format!("Building {} bundle{modules}{source}...", options.build_type)
}

async fn build_package<R, E>(
    workspace_dir: &Path,
    package_dir: &Path,
    options: &ExecutorOptions,
    runtime: &R,
    engine: &E,
) -> Result<()>
where
    R: Runtime + ?Sized,
    E: BundleEngine + ?Sized,
{
    let manifest_relative = options
        .package_json_path
        .as_deref()
        .unwrap_or(Path::new(PACKAGE_JSON));
    let manifest = read_package_json(runtime, &package_dir.join(manifest_relative)).await?;
    let manifest_dir = manifest_relative.parent().unwrap_or(Path::new(""));

    let build_map = infer_build_map(runtime, package_dir, manifest_dir, &manifest)?;
    let plans = create_bundle_plans(
        runtime,
        workspace_dir,
        package_dir,
        &manifest,
        &build_map,
        options,
    );
    if plans.is_empty() {
        return Err(Error::NoEntries);
    }

    let warnings = WarningPolicy::new(options.build_type);
    for plan in &plans {
        build_entry(plan, package_dir, runtime, engine, &warnings).await?;
    }

    if warnings.failed() {
        return Err(Error::WarningsInRelease);
    }
    Ok(())
}

async fn build_entry<R, E>(
    plan: &BundlePlan,
    package_dir: &Path,
    runtime: &R,
    engine: &E,
    warnings: &WarningPolicy,
) -> Result<()>
where
    R: Runtime + ?Sized,
    E: BundleEngine + ?Sized,
{
    let relative_input = plan
        .input
        .input
        .strip_prefix(package_dir)
        .unwrap_or(&plan.input.input);
    debug!("Building {} -> {DIST_DIR}/...", relative_input.display());

    let bundle = engine.bundle(&plan.input, warnings).await?;
    let plugins = plan.input.output_plugins();

    for output in &plan.outputs {
        let mut files = bundle.generate(output, warnings).await?;
        for plugin in &plugins {
            plugin.generate_bundle(output, &mut files)?;
        }
        write_files(runtime, &output.dir, &files).await?;
    }
    Ok(())
}

async fn write_files<R>(runtime: &R, dir: &Path, files: &[OutputFile]) -> Result<()>
where
    R: Runtime + ?Sized,
{
    for file in files {
        let path = dir.join(file.file_name());
        if let Some(parent) = path.parent() {
            runtime.create_dir(parent, true).await?;
        }
        runtime.write_file(&path, file.content()).await?;
        debug!("  -> {}", file.file_name());
    }
    Ok(())
}

/// Release builds fail once any reportable warning was seen.
#[derive(Debug)]
struct WarningPolicy {
    build_type: BuildType,
    flagged: AtomicBool,
}

impl WarningPolicy {
    fn new(build_type: BuildType) -> Self {
        Self {
            build_type,
            flagged: AtomicBool::new(false),
        }
    }

    fn failed(&self) -> bool {
        self.flagged.load(Ordering::Relaxed)
    }
}

impl WarningHandler for WarningPolicy {
    fn handle(&self, warning: BundleWarning) {
        if warning.is_empty_bundle() {
            return;
        }
        warn!("{warning}");
        if self.build_type.is_release() {
            self.flagged.store(true, Ordering::Relaxed);
        }
    }
}

// Copyright (C) 2023 gigablaster

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! The host application wired around the pipeline: a single binary that
//! drives the importer over a source tree and reports asset-manager
//! diagnostics over an output pack. Everything it touches through
//! `forge-vfs`/`forge-importer`/`forge-asset-manager`/`forge-loader` is a
//! narrow, already-established interface; this crate only adds the process
//! entry point, argument parsing and logging the pipeline itself stays out
//! of (spec.md §1 lists exactly this split of responsibility).
//!
//! Grounded in the teacher's `crates/bin/builder/src/main.rs`: a `clap`
//! builder-style `Command`, `env_logger` initialized from `RUST_LOG`, and a
//! recursive directory walk dispatching by file extension.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use clap::{Arg, ArgAction, Command};
use forge_assets::{hash_bytes, SourceFile};
use forge_asset_manager::AssetManager;
use forge_concurrency::TaskManager;
use forge_importer::{
    default_pipeline, AudioImportData, FontImportData, ImportPipeline, MeshImportData, NativeImportData,
    ShaderImportData, TextureImportData, TexturePurpose,
};
use forge_reflect::Status;
use forge_vfs::{DirectoryPack, OsFileSystem, PackRegistry};

/// Mirrors `dess-engine`'s use of `serde_json::from_reader` for small
/// config-like payloads: pack search paths, worker count, and whether the
/// asset manager should start with hot-reload bookkeeping enabled.
#[derive(Debug, Default, serde::Deserialize)]
struct PipelineConfig {
    #[serde(default)]
    worker_threads: Option<usize>,
    #[serde(default)]
    hot_reload: bool,
    #[serde(default)]
    pack_search_paths: Vec<String>,
}

impl PipelineConfig {
    fn load(path: &Path) -> Result<Self, std::io::Error> {
        let file = fs::File::open(path)?;
        serde_json::from_reader(file).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

fn cli() -> Command {
    Command::new("forge")
        .about("Content pipeline host: imports source assets and reports pack diagnostics")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to an optional pipeline.json")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .subcommand(
            Command::new("import")
                .about("Runs every registered importer over a source tree into an output pack")
                .arg(Arg::new("source").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(Arg::new("output").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(
                    Arg::new("watch")
                        .long("watch")
                        .action(ArgAction::SetTrue)
                        .help("Keep running and re-import on file changes"),
                ),
        )
        .subcommand(
            Command::new("info")
                .about("Mounts a pack and reports asset-manager cache/pool diagnostics")
                .arg(Arg::new("pack").required(true).value_parser(clap::value_parser!(PathBuf))),
        )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    let config = matches
        .get_one::<PathBuf>("config")
        .map(|path| PipelineConfig::load(path).unwrap_or_else(|e| {
            log::warn!("failed to read {}: {e}, using defaults", path.display());
            PipelineConfig::default()
        }))
        .unwrap_or_default();

    let result = match matches.subcommand() {
        Some(("import", sub)) => {
            let source = sub.get_one::<PathBuf>("source").expect("required");
            let output = sub.get_one::<PathBuf>("output").expect("required");
            let watch = sub.get_flag("watch");
            run_import(source, output, watch)
        }
        Some(("info", sub)) => {
            let pack = sub.get_one::<PathBuf>("pack").expect("required");
            run_info(pack, &config)
        }
        _ => unreachable!("subcommand_required"),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(CliError::Import(status)) => {
            log::error!("import failed: {status}");
            ExitCode::from(1)
        }
        Err(CliError::Other(message)) => {
            log::error!("{message}");
            ExitCode::from(2)
        }
    }
}

enum CliError {
    Import(Status),
    Other(String),
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Other(e.to_string())
    }
}

fn run_import(source: &Path, output: &Path, watch: bool) -> Result<(), CliError> {
    let source_fs = Arc::new(OsFileSystem::new(source));
    let output_fs = Arc::new(OsFileSystem::new(output));
    let pipeline = default_pipeline(source_fs.clone(), output_fs);

    import_tree(&pipeline, source)?;

    if watch {
        watch_and_reimport(&pipeline, source)?;
    }

    Ok(())
}

/// Walks `root` and hands every file the pipeline recognizes to
/// `import_file`, building that importer's settings from the file's own
/// content hash so the artifact cache key actually tracks it — skipping this
/// would leave every cache key's source component comparing against an
/// empty set, forcing a rewrite (or worse, a stale skip) every run.
fn import_tree(pipeline: &ImportPipeline, root: &Path) -> Result<(), CliError> {
    for path in collect_files(root)? {
        let relative = path.strip_prefix(root).unwrap_or(&path);
        if pipeline.find_importer(relative).is_none() {
            continue;
        }

        let bytes = fs::read(&path)?;
        let source = SourceFile::new(relative, hash_bytes(&bytes));
        let settings = build_settings(relative, source);

        let status = pipeline.import_file(relative, settings.as_ref());
        if status.is_error() {
            return Err(CliError::Import(status));
        }
    }
    Ok(())
}

fn collect_files(root: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut out = Vec::new();
    collect_files_into(root, &mut out)?;
    Ok(out)
}

fn collect_files_into(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files_into(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn build_settings(path: &Path, source: SourceFile) -> Box<dyn forge_assets::ImportData> {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("png" | "jpg" | "jpeg" | "bmp" | "tga") => {
            Box::new(TextureImportData::new(TexturePurpose::Color).with_source(vec![source]))
        }
        Some("ttf") => Box::new(FontImportData::new(32.0).with_source(vec![source])),
        Some("gltf" | "glb") => Box::new(MeshImportData::default().with_source(vec![source])),
        Some("wav") => Box::new(AudioImportData::default().with_source(vec![source])),
        Some("native") => Box::new(NativeImportData::default().with_source(vec![source])),
        Some("shader") => Box::new(ShaderImportData::default().with_source(vec![source])),
        _ => Box::new(NativeImportData::default().with_source(vec![source])),
    }
}

/// Disabled unless `--watch` is given — spec.md's hot-reload flag is an
/// ambient capability the asset manager carries, not a built feature, and
/// this mirrors that: a plain `notify` watcher that re-runs the same
/// `import_tree` pass on any change, with no debouncing or partial
/// re-import beyond what re-running the whole tree already gives us.
fn watch_and_reimport(pipeline: &ImportPipeline, root: &Path) -> Result<(), CliError> {
    use notify::{Event, RecursiveMode, Watcher};
    use std::sync::mpsc::channel;

    let (tx, rx) = channel::<notify::Result<Event>>();
    let mut watcher =
        notify::recommended_watcher(tx).map_err(|e| CliError::Other(format!("failed to start watcher: {e}")))?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| CliError::Other(format!("failed to watch {}: {e}", root.display())))?;

    log::info!("watching {} for changes (ctrl-c to stop)", root.display());
    for event in rx {
        match event {
            Ok(_) => {
                if let Err(e) = import_tree(pipeline, root) {
                    match e {
                        CliError::Import(status) => log::error!("re-import failed: {status}"),
                        CliError::Other(message) => log::error!("{message}"),
                    }
                }
            }
            Err(e) => log::warn!("watch error: {e}"),
        }
    }
    Ok(())
}

fn run_info(pack_root: &Path, config: &PipelineConfig) -> Result<(), CliError> {
    let mut registry = PackRegistry::new();
    registry.mount(Arc::new(DirectoryPack::new("pack", pack_root)));
    for extra in &config.pack_search_paths {
        registry.mount(Arc::new(DirectoryPack::new(extra.clone(), extra.clone())));
    }

    let workers = config.worker_threads.unwrap_or(4);
    let tasks = Arc::new(TaskManager::new(workers, "forge-cli"));
    let manager = AssetManager::new(tasks.clone());
    manager.set_hot_reload_enabled(config.hot_reload);
    forge_loader::register_default_loaders(&manager);
    for pack in registry.packs() {
        manager.add_pack(pack.clone());
    }

    let evicted = manager.gc();
    let stats = manager.stats();
    println!(
        "packs={} cached={} in_flight={} evicted_on_gc={}",
        stats.packs, stats.cached, stats.in_flight, evicted
    );

    tasks.shutdown();
    Ok(())
}

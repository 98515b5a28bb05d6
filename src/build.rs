//! `slidedeck build`: compile YAML decks into ES modules.
//!
//! Each deck becomes a `.js` file exporting its markup:
//! `const text = `...`; export default text;`.
//! Paths may be deck files or directories scanned recursively.

use anyhow::{Context, Result};
use colored::Colorize;
use notify::{EventKind, RecursiveMode, Watcher};
use slidedeck_compile::RuleRegistry;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::config::DeckConfig;

/// A deck found on disk, with its path relative to the argument it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckSource {
    pub path: PathBuf,
    pub relative: PathBuf,
}

impl DeckSource {
    /// Where the generated module is written.
    pub fn output_path(&self, out_dir: Option<&Path>) -> PathBuf {
        match out_dir {
            Some(out) => out.join(&self.relative).with_extension("js"),
            None => self.path.with_extension("js"),
        }
    }
}

/// Aggregate report from a build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub built: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Directories never scanned for decks: hidden ones, build output and
/// installed packages.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || SKIPPED_DIRS.contains(&name))
}

/// Expand file and directory arguments into deck sources.
///
/// Directory arguments are scanned recursively, skipping hidden directories,
/// `target` and `node_modules` below the argument itself.
pub fn collect_decks(paths: &[String], config: &DeckConfig) -> Result<Vec<DeckSource>> {
    let mut decks = Vec::new();

    for arg in paths {
        let root = Path::new(arg);
        if root.is_dir() {
            let walker = WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
            for entry in walker {
                let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
                let path = entry.path();
                if entry.file_type().is_file() && config.is_deck(path) {
                    let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
                    decks.push(DeckSource {
                        path: path.to_path_buf(),
                        relative,
                    });
                }
            }
        } else if root.is_file() {
            let relative = root
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| root.to_path_buf());
            decks.push(DeckSource {
                path: root.to_path_buf(),
                relative,
            });
        } else {
            anyhow::bail!("No such file or directory: '{}'", arg);
        }
    }

    Ok(decks)
}

/// Compile one deck and write its module. Returns `false` if the output was
/// already up to date.
pub fn build_deck(deck: &DeckSource, out_dir: Option<&Path>, registry: &RuleRegistry) -> Result<bool> {
    let content = std::fs::read_to_string(&deck.path)
        .with_context(|| format!("Failed to read '{}'", deck.path.display()))?;

    let markup = slidedeck_compile::compile_str(&content, registry)
        .with_context(|| format!("Failed to compile '{}'", deck.path.display()))?;
    let module = slidedeck_compile::to_module(&markup);

    let output = deck.output_path(out_dir);
    if std::fs::read_to_string(&output).is_ok_and(|existing| existing == module) {
        return Ok(false);
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    std::fs::write(&output, module)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    tracing::info!(source = %deck.path.display(), output = %output.display(), "Built deck");
    Ok(true)
}

pub fn handle_build(
    paths: &[String],
    out_dir: Option<&str>,
    config: &DeckConfig,
    quiet: bool,
) -> Result<BuildReport> {
    let registry = config.registry();
    let out_dir = out_dir.or(config.out_dir.as_deref()).map(Path::new);
    let decks = collect_decks(paths, config)?;

    let mut report = BuildReport::default();
    for deck in &decks {
        match build_deck(deck, out_dir, &registry) {
            Ok(true) => {
                report.built += 1;
                if !quiet {
                    println!(
                        "  {} {} → {}",
                        "deck".dimmed(),
                        deck.path.display(),
                        deck.output_path(out_dir).display()
                    );
                }
            }
            Ok(false) => report.unchanged += 1,
            Err(e) => {
                report.failed += 1;
                eprintln!("{} {:#}", "error:".red().bold(), e);
            }
        }
    }

    if !quiet {
        let mut parts = vec![format!("{} built", report.built)];
        if report.unchanged > 0 {
            parts.push(format!("{} unchanged", report.unchanged));
        }
        if report.failed > 0 {
            parts.push(format!("{} failed", report.failed));
        }
        println!("{} {}", "Build complete:".green().bold(), parts.join(", "));
    }

    if report.failed > 0 {
        anyhow::bail!("{} deck(s) failed to compile", report.failed);
    }

    Ok(report)
}

/// Watch the given paths for deck changes and rebuild on each save.
///
/// Debounces rapid events (e.g. editors that write in stages) with a 200ms window.
/// Ctrl+C exits cleanly.
pub fn watch_and_rebuild(
    paths: &[String],
    out_dir: Option<&str>,
    config: &DeckConfig,
    quiet: bool,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for arg in paths {
        let path = Path::new(arg);
        if path.is_dir() {
            watcher.watch(path, RecursiveMode::Recursive)?;
        } else {
            let canonical = std::fs::canonicalize(path)
                .with_context(|| format!("Cannot resolve path '{}'", arg))?;
            let parent = canonical
                .parent()
                .ok_or_else(|| anyhow::anyhow!("Cannot determine parent directory of '{}'", arg))?;
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }
    }

    println!(
        "{} {} for changes (Ctrl+C to stop)",
        "Watching".cyan().bold(),
        paths.join(", ")
    );

    let mut last_rebuild = Instant::now();
    let debounce = Duration::from_millis(200);

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_));
                let affects_deck = event.paths.iter().any(|p| config.is_deck(p));

                if relevant && affects_deck && last_rebuild.elapsed() > debounce {
                    // Let the editor finish writing.
                    std::thread::sleep(Duration::from_millis(50));

                    match handle_build(paths, out_dir, config, quiet) {
                        Ok(_) => {
                            last_rebuild = Instant::now();
                        }
                        Err(e) => {
                            eprintln!("{} {}", "Build error:".red().bold(), e);
                        }
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

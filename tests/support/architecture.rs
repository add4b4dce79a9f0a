use std::fs;
use std::path::{Path, PathBuf};

/// A source line flagged by a layout check: path relative to the crate
/// root, 1-based line number, raw line.
pub type Hit = (String, usize, String);

const MOD_RS_ALLOWED: &[&str] = &["//", "pub mod ", "mod ", "pub use ", "#[cfg"];

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Every `.rs` file under `relative_dir`, sorted.
fn rust_sources(relative_dir: &str) -> Vec<PathBuf> {
    let mut pending = vec![root().join(relative_dir)];
    let mut sources = Vec::new();
    while let Some(dir) = pending.pop() {
        let entries =
            fs::read_dir(&dir).unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()));
        for path in entries.filter_map(|entry| entry.ok().map(|e| e.path())) {
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                sources.push(path);
            }
        }
    }
    sources.sort();
    sources
}

/// Lines of the selected sources under `relative_dir` matching `flag`.
fn scan(
    relative_dir: &str,
    select: impl Fn(&Path) -> bool,
    flag: impl Fn(&str) -> bool,
) -> Vec<Hit> {
    let base = root();
    rust_sources(relative_dir)
        .into_iter()
        .filter(|path| select(path.as_path()))
        .flat_map(|path| {
            let source = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
            let shown = path
                .strip_prefix(&base)
                .unwrap_or(path.as_path())
                .to_string_lossy()
                .replace('\\', "/");
            source
                .lines()
                .enumerate()
                .filter(|(_, line)| flag(*line))
                .map(|(idx, line)| (shown.clone(), idx + 1, line.to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Lines under `relative_dir` containing any of `needles`.
pub fn find_lines_containing(relative_dir: &str, needles: &[&str]) -> Vec<Hit> {
    scan(relative_dir, |_| true, |line| needles.iter().any(|n| line.contains(n)))
}

/// Lines in `mod.rs` files that are not module declarations, re-exports,
/// comments or cfg attributes.
pub fn find_non_export_lines_in_mod_files(relative_dir: &str) -> Vec<Hit> {
    scan(
        relative_dir,
        |path| path.file_name().is_some_and(|name| name == "mod.rs"),
        |line| {
            let line = line.trim();
            !line.is_empty() && !MOD_RS_ALLOWED.iter().any(|prefix| line.starts_with(prefix))
        },
    )
}

pub fn path_exists(relative_path: &str) -> bool {
    root().join(relative_path).exists()
}

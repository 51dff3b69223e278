use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

// Askama reads templates at compile time; tell cargo about every .html file
// so edits actually rebuild the binary.
fn main() {
    emit_template_rerun_hints(Path::new("templates"));

    let build_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=FITSPOT_BUILD_ID={}", build_id);
}

fn emit_template_rerun_hints(root: &Path) {
    if !root.exists() {
        return;
    }
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("html") {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
    }
}

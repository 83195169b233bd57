use std::env;
use std::path::{Path, PathBuf};

// A database root is only baked in when it holds one of the scanned folders.
fn looks_like_database(root: &Path) -> bool {
    ["types", "spawnable"]
        .iter()
        .any(|dir| root.join(dir).is_dir())
}

fn main() {
    println!("cargo:rerun-if-env-changed=LOADOUT_DB_ROOT_HINT");

    let Ok(raw_hint) = env::var("LOADOUT_DB_ROOT_HINT") else {
        return;
    };
    let candidate = PathBuf::from(raw_hint);
    let Ok(root) = candidate.canonicalize() else {
        println!(
            "cargo:warning=LOADOUT_DB_ROOT_HINT {} does not exist; ignored",
            candidate.display()
        );
        return;
    };
    if !looks_like_database(&root) {
        println!(
            "cargo:warning=LOADOUT_DB_ROOT_HINT {} has no types/ or spawnable/ folder; ignored",
            root.display()
        );
        return;
    }
    println!("cargo:rustc-env=LOADOUT_DB_ROOT_HINT={}", root.display());
}

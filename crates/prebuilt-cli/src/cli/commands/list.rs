//! `prebuilt list` – show the library table.

use prebuilt_core::recipe::{RecipeKind, RECIPES};

pub fn run_list() {
    for recipe in RECIPES {
        let how = match recipe.kind {
            RecipeKind::CMake { .. } => "cmake".to_string(),
            RecipeKind::Archive(a) => format!("archive {}", a.filename),
        };
        println!("{:<10} {:<18} {}", recipe.name, recipe.role, how);
    }
}

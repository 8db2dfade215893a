//! Build script for the Letterboxd Stats CLI.
//!
//! Copies the configuration template into the user's config directory so a
//! ready-to-edit example sits next to where the application looks for its
//! `config.toml`.

use std::{env, fs, path::PathBuf};

/// Copies `config.example.toml` from the crate root into the platform config
/// directory.
///
/// # Destination
///
/// - Linux: `~/.config/letterboxd_stats/config.example.toml`
/// - macOS: `~/Library/Application Support/letterboxd_stats/config.example.toml`
/// - Windows: `%APPDATA%/letterboxd_stats/config.example.toml`
///
/// A missing template or an unwritable destination only produces a cargo
/// warning.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=config.example.toml");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template_path = manifest_dir.join("config.example.toml");

    if !template_path.is_file() {
        println!(
            "cargo:warning=config.example.toml not found at {}",
            template_path.display()
        );
        return Ok(());
    }

    let Some(mut out_dir) = dirs::config_dir() else {
        println!("cargo:warning=no config directory available, skipping template copy");
        return Ok(());
    };
    out_dir.push("letterboxd_stats");

    let copied = fs::create_dir_all(&out_dir).and_then(|_| {
        let contents = fs::read_to_string(&template_path)?;
        fs::write(out_dir.join("config.example.toml"), contents)
    });

    if let Err(e) = copied {
        println!(
            "cargo:warning=cannot copy config template to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}

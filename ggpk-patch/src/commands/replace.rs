//! Replacement commands

use anyhow::{Context, Result};
use ggpk_index::{ArchiveIndex, Flow, Payload, replace, replace_file};
use std::fs;
use std::path::Path;

use super::open_index;
use crate::config::patch_password;
use crate::utils::create_spinner;

/// Replace a single file from disk
pub fn replace_one(target: &Path, internal_path: &str, in_file: &Path) -> Result<()> {
    let data = fs::read(in_file).with_context(|| format!("Failed to read {}", in_file.display()))?;

    let mut index = open_index(target)?;
    let record = replace_file(&mut index, internal_path, &data)
        .with_context(|| format!("Failed to replace {internal_path}"))?;

    println!("Replaced: {}", record.path());
    println!("Done! Replaced 1 files.");
    Ok(())
}

/// Apply a plain zip patch
pub fn replace_zip(target: &Path, zip_file: &Path) -> Result<()> {
    let mut index = open_index(target)?;
    let payload = Payload::read(zip_file)
        .with_context(|| format!("Failed to read patch {}", zip_file.display()))?;
    apply(&mut index, &payload)
}

/// Decrypt an encrypted patch with the embedded password and apply it
pub fn replace_zenc_zip(target: &Path, zenc_file: &Path) -> Result<()> {
    let mut index = open_index(target)?;

    let container = zenc::EncryptedContainer::open(zenc_file)
        .with_context(|| format!("Failed to read patch {}", zenc_file.display()))?;

    let spinner = create_spinner("Decrypting patch...");
    let plaintext = zenc::decrypt_container(&container, &patch_password());
    spinner.finish_and_clear();
    let plaintext = plaintext.context("Failed to decrypt patch")?;
    drop(container);

    let payload = Payload::from_bytes(plaintext).context("Decrypted patch is not a zip payload")?;
    apply(&mut index, &payload)
}

fn apply(index: &mut ArchiveIndex, payload: &Payload) -> Result<()> {
    // Reported only once the whole pass has been written
    let mut applied = Vec::new();
    let summary = replace(index, payload.entries()?, |_, path| {
        applied.push(path.to_string());
        Flow::Continue
    })
    .context("Failed to apply patch")?;

    for path in &applied {
        println!("Replaced: {path}");
    }
    println!("Done! Replaced {} files.", summary.replaced);
    Ok(())
}

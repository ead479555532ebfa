//! Encrypted patch creation

use anyhow::{Context, Result};
use ggpk_index::Payload;
use std::fs;
use std::path::Path;
use zenc::SealOptions;
use zeroize::Zeroizing;

use crate::config::patch_password;
use crate::utils::create_spinner;

/// Encrypt a zip patch with the embedded password
pub fn pack_zenc(zip_file: &Path, out_file: &Path, iterations: u32) -> Result<()> {
    let bytes = Zeroizing::new(
        fs::read(zip_file).with_context(|| format!("Failed to read {}", zip_file.display()))?,
    );
    let payload = Payload::from_bytes(bytes)
        .with_context(|| format!("{} is not a zip payload", zip_file.display()))?;

    let spinner = create_spinner("Encrypting patch...");
    let container = zenc::seal(
        &patch_password(),
        payload.as_bytes(),
        &SealOptions::new().iterations(iterations),
    );
    spinner.finish_and_clear();
    let container = container.context("Failed to encrypt patch")?;

    let file = fs::File::create(out_file)
        .with_context(|| format!("Failed to create {}", out_file.display()))?;
    container
        .write(std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", out_file.display()))?;

    println!(
        "Packed {} entries into {}",
        payload.len(),
        out_file.display()
    );
    Ok(())
}

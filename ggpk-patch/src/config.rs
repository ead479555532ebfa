//! Build-time configuration

use secrecy::SecretString;

/// Password used when `GGPK_PATCH_PASSWORD` is unset at build time
const DEFAULT_PATCH_PASSWORD: &str = "ggpk-patch";

/// Password for encrypted patches, fixed when the binary is built
pub fn patch_password() -> SecretString {
    SecretString::from(option_env!("GGPK_PATCH_PASSWORD").unwrap_or(DEFAULT_PATCH_PASSWORD))
}

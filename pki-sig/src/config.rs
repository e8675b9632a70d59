use std::sync::OnceLock;

use pki_sig_macros::pki_export;

static CONFIG_INSTANCE: OnceLock<PkiConfig> = OnceLock::new();

/// How strictly DER-encoded signatures are validated when converted to the raw form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum DerStrictness {
    /// Rejects anything that is not a well-formed `SEQUENCE { INTEGER, INTEGER }`:
    /// wrong tags, multi-byte lengths, an outer length that disagrees with the
    /// two integers, non-zero sign bytes and negative integers.
    Strict,
    /// Accepts what permissive token libraries produce. Tags and sign-byte values
    /// are not inspected; only the input bounds and the 33-byte content limit are enforced.
    Lenient,
}

impl DerStrictness {
    /// Returns the string representation of the strictness level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

impl std::fmt::Display for DerStrictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-wide configuration for the foreign-facing conversion functions.
#[derive(Debug, Clone, uniffi::Object)]
pub struct PkiConfig {
    strictness: DerStrictness,
}

#[pki_export]
impl PkiConfig {
    /// Creates a new configuration.
    ///
    /// # Examples
    ///
    /// ## Swift
    ///
    /// ```swift
    /// let config = PkiConfig(strictness: .lenient)
    /// ```
    #[uniffi::constructor]
    #[must_use]
    pub fn new(strictness: DerStrictness) -> Self {
        Self { strictness }
    }

    /// The DER validation level used by this configuration.
    #[must_use]
    pub fn strictness(&self) -> DerStrictness {
        self.strictness
    }
}

/// Initializes the global configuration.
///
/// Call once at startup, before converting signatures through the foreign bindings.
/// Subsequent calls are ignored with a warning.
///
/// ## Kotlin
///
/// ```kotlin
/// initPkiConfig(strictness = DerStrictness.LENIENT)
/// ```
#[uniffi::export]
pub fn init_pki_config(strictness: DerStrictness) {
    match CONFIG_INSTANCE.set(PkiConfig::new(strictness)) {
        Ok(()) => crate::info!("pki-sig config initialized with {strictness} DER parsing"),
        Err(_) => crate::warn!("pki-sig config already initialized, ignoring"),
    }
}

/// The configured DER strictness, or [`DerStrictness::Strict`] if the config was never initialized.
#[uniffi::export]
#[must_use]
pub fn current_strictness() -> DerStrictness {
    CONFIG_INSTANCE.get().map_or_else(
        || {
            crate::trace!("pki-sig config not initialized, defaulting to strict DER parsing");
            DerStrictness::Strict
        },
        PkiConfig::strictness,
    )
}

/// Returns the global configuration, if it has been initialized.
#[must_use]
pub fn get_config() -> Option<&'static PkiConfig> {
    CONFIG_INSTANCE.get()
}

/// Whether [`init_pki_config`] has been called.
#[must_use]
pub fn is_initialized() -> bool {
    CONFIG_INSTANCE.get().is_some()
}

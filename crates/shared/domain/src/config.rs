use crate::contract::ContractId;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use strum_macros::{Display, EnumIter};

/// Default XML namespace handed to the XML serializer.
pub const DEFAULT_XML_NAMESPACE: &str = "http://tempuri.net";

/// Operator-supplied host settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostSettingsInner {
    /// Order in which scanning capabilities outrank each other.
    pub scan_precedence: Vec<ScanSourceKind>,
    /// Directory scanned when the endpoint names no scanning source.
    pub base_directory: PathBuf,
    pub xml_namespace: String,
    pub logging: LoggingSettings,
}

/// Thin Arc-wrapped settings for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct HostSettings {
    #[serde(flatten, default)]
    inner: Arc<HostSettingsInner>,
}

impl HostSettings {
    #[must_use]
    pub fn new(inner: HostSettingsInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for HostSettings {
    type Target = HostSettingsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Logging output used when the endpoint does not configure logging itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Severity,
    pub console: bool,
    pub path: Option<PathBuf>,
    pub json: bool,
    pub env_filter: Option<String>,
}

/// The three ways an endpoint can name what to scan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ScanSourceKind {
    Types,
    Assemblies,
    Directory,
}

impl ScanSourceKind {
    #[must_use]
    pub const fn contract(self) -> ContractId {
        match self {
            Self::Types => ContractId::TypesToScan,
            Self::Assemblies => ContractId::AssembliesToScan,
            Self::Directory => ContractId::ProbeDirectory,
        }
    }
}

// --- Default ---

impl Default for HostSettingsInner {
    fn default() -> Self {
        Self {
            scan_precedence: vec![
                ScanSourceKind::Types,
                ScanSourceKind::Assemblies,
                ScanSourceKind::Directory,
            ],
            base_directory: PathBuf::from("."),
            xml_namespace: DEFAULT_XML_NAMESPACE.to_owned(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: Severity::Info, console: true, path: None, json: false, env_filter: None }
    }
}

//! Application type classification.
//!
//! Maps the remote `@odata.type` discriminator of a mobile app to the short
//! category label shown in reports.

use serde::{Serialize, Serializer};
use std::fmt;

/// Category of a deployable application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppType {
    Win32,
    Msi,
    Web,
    IosStore,
    AndroidStore,
    MicrosoftStore,
    Unknown,
}

impl AppType {
    /// Resolves a remote type tag. Unrecognised or empty tags map to `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "#microsoft.graph.win32LobApp" => Self::Win32,
            "#microsoft.graph.windowsMobileMSI" => Self::Msi,
            "#microsoft.graph.webApp" => Self::Web,
            "#microsoft.graph.iosStoreApp" => Self::IosStore,
            "#microsoft.graph.androidStoreApp" => Self::AndroidStore,
            "#microsoft.graph.winGetApp" => Self::MicrosoftStore,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win32 => "Win32 App",
            Self::Msi => "MSI App",
            Self::Web => "Web App",
            Self::IosStore => "iOS Store App",
            Self::AndroidStore => "Android Store App",
            Self::MicrosoftStore => "Microsoft Store App",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AppType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Maps a raw application type tag to its category label. Never fails.
pub fn classify(type_tag: &str) -> &'static str {
    AppType::from_tag(type_tag).as_str()
}

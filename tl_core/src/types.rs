use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Backend category a dispatch table serves.
///
/// Module and provider storage are separate categories so that each can
/// select its resolver independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum BackendCategory {
    #[strum(serialize = "database")]
    Database,

    #[strum(serialize = "auth")]
    Auth,

    #[strum(serialize = "modules storage")]
    ModulesStorage,

    #[strum(serialize = "providers storage")]
    ProvidersStorage
}

impl BackendCategory {
    /// Flag whose value selects the backend of this category.
    pub fn discriminant_flag(self) -> &'static str {
        match self {
            Self::Database => "database-backend",
            Self::Auth => "oauth-provider",
            Self::ModulesStorage => "modules-storage-resolver",
            Self::ProvidersStorage => "providers-storage-resolver"
        }
    }
}

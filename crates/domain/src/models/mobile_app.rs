//! Mobile app inventory models.

use serde::{Deserialize, Serialize};

use crate::services::classifier::AppType;

/// Type tag of iOS volume-purchase apps, which are never reported on.
pub const IOS_VPP_APP_TAG: &str = "#microsoft.graph.iosVppApp";

/// A deployable application as listed by `deviceAppManagement/mobileApps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileApp {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    /// Remote type discriminator, e.g. `#microsoft.graph.win32LobApp`.
    #[serde(rename = "@odata.type", default)]
    pub type_tag: String,
}

impl MobileApp {
    pub fn app_type(&self) -> AppType {
        AppType::from_tag(&self.type_tag)
    }

    /// Returns false for managed apps and iOS VPP apps, which are excluded
    /// from the listing before any per-app processing.
    pub fn is_reportable(&self) -> bool {
        !self.type_tag.to_lowercase().contains("managed") && self.type_tag != IOS_VPP_APP_TAG
    }
}

/// Identity of the application a status record belongs to.
///
/// Attached on ingest so records can be grouped and rendered without a
/// lookup back into the app listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppTag {
    pub app_id: String,
    pub app_name: String,
    pub app_type: AppType,
}

impl From<&MobileApp> for AppTag {
    fn from(app: &MobileApp) -> Self {
        Self {
            app_id: app.id.clone(),
            app_name: app.display_name.clone(),
            app_type: app.app_type(),
        }
    }
}

/// A record tagged with its owning application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tagged<T> {
    pub app: AppTag,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Tagged<T> {
    pub fn new(app: AppTag, record: T) -> Self {
        Self { app, record }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(tag: &str) -> MobileApp {
        MobileApp {
            id: "a1".to_string(),
            display_name: "Contoso Viewer".to_string(),
            type_tag: tag.to_string(),
        }
    }

    #[test]
    fn test_deserialize_mobile_app() {
        let json = serde_json::json!({
            "@odata.type": "#microsoft.graph.webApp",
            "id": "0f2a",
            "displayName": "Contoso Viewer",
            "publisher": "Contoso"
        });
        let app: MobileApp = serde_json::from_value(json).unwrap();
        assert_eq!(app.id, "0f2a");
        assert_eq!(app.display_name, "Contoso Viewer");
        assert_eq!(app.app_type(), AppType::Web);
    }

    #[test]
    fn test_deserialize_without_type_tag() {
        let json = serde_json::json!({ "id": "0f2a" });
        let app: MobileApp = serde_json::from_value(json).unwrap();
        assert_eq!(app.type_tag, "");
        assert_eq!(app.app_type(), AppType::Unknown);
        assert!(app.is_reportable());
    }

    #[test]
    fn test_managed_apps_are_not_reportable() {
        assert!(!app("#microsoft.graph.managedIOSStoreApp").is_reportable());
        assert!(!app("#microsoft.graph.managedAndroidLobApp").is_reportable());
        assert!(!app("#microsoft.graph.iosVppApp").is_reportable());
        assert!(app("#microsoft.graph.win32LobApp").is_reportable());
    }

    #[test]
    fn test_app_tag_from_mobile_app() {
        let tag = AppTag::from(&app("#microsoft.graph.win32LobApp"));
        assert_eq!(tag.app_id, "a1");
        assert_eq!(tag.app_name, "Contoso Viewer");
        assert_eq!(tag.app_type, AppType::Win32);
    }
}

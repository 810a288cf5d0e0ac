//! Typed fetches of application inventory and per-application status data.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FetchError;
use crate::models::{
    AppTag, DeviceInstallStatus, GroupAssignment, MobileApp, Tagged, UserInstallStatus,
};
use crate::services::source::{resources, GraphSource};

/// Fetches and decodes the resources the pipeline walks.
pub struct StatusFetcher<'a, S: GraphSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: GraphSource + ?Sized> StatusFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Lists reportable applications in the order the service returned them.
    ///
    /// Managed apps and iOS VPP apps are dropped here, once, before any
    /// per-application processing.
    pub async fn list_applications(&self) -> Result<Vec<MobileApp>, FetchError> {
        let apps: Vec<MobileApp> = self.fetch_as(resources::MOBILE_APPS).await?;
        let listed = apps.len();
        let reportable: Vec<MobileApp> = apps.into_iter().filter(|a| a.is_reportable()).collect();

        tracing::info!(
            listed = listed,
            reportable = reportable.len(),
            "Listed mobile apps"
        );

        Ok(reportable)
    }

    pub async fn fetch_device_statuses(
        &self,
        app: &MobileApp,
    ) -> Result<Vec<Tagged<DeviceInstallStatus>>, FetchError> {
        let statuses: Vec<DeviceInstallStatus> =
            self.fetch_as(&resources::device_statuses(&app.id)).await?;
        Ok(tag_all(app, statuses))
    }

    pub async fn fetch_user_statuses(
        &self,
        app: &MobileApp,
    ) -> Result<Vec<Tagged<UserInstallStatus>>, FetchError> {
        let statuses: Vec<UserInstallStatus> =
            self.fetch_as(&resources::user_statuses(&app.id)).await?;
        Ok(tag_all(app, statuses))
    }

    pub async fn fetch_group_assignments(
        &self,
        app_id: &str,
    ) -> Result<Vec<GroupAssignment>, FetchError> {
        self.fetch_as(&resources::group_assignments(app_id)).await
    }

    async fn fetch_as<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, FetchError> {
        let items = self.source.fetch(resource).await?;
        tracing::debug!(resource = %resource, items = items.len(), "Fetched collection");
        decode_items(resource, items)
    }
}

/// Decodes every item of a collection; one bad item fails the whole fetch.
pub(crate) fn decode_items<T: DeserializeOwned>(
    resource: &str,
    items: Vec<Value>,
) -> Result<Vec<T>, FetchError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| FetchError::malformed(resource, format!("item {}: {}", index, e)))
        })
        .collect()
}

fn tag_all<T>(app: &MobileApp, records: Vec<T>) -> Vec<Tagged<T>> {
    let tag = AppTag::from(app);
    records
        .into_iter()
        .map(|record| Tagged::new(tag.clone(), record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstallState;
    use crate::services::classifier::AppType;
    use crate::services::source::InMemoryGraphSource;
    use serde_json::json;

    fn source() -> InMemoryGraphSource {
        InMemoryGraphSource::new()
            .with_collection(
                resources::MOBILE_APPS,
                vec![
                    json!({"id": "a1", "displayName": "Viewer", "@odata.type": "#microsoft.graph.webApp"}),
                    json!({"id": "a2", "displayName": "Mail", "@odata.type": "#microsoft.graph.managedIOSStoreApp"}),
                    json!({"id": "a3", "displayName": "Pages", "@odata.type": "#microsoft.graph.iosVppApp"}),
                    json!({"id": "a4", "displayName": "Agent", "@odata.type": "#microsoft.graph.win32LobApp"}),
                ],
            )
            .with_collection(
                resources::device_statuses("a1"),
                vec![
                    json!({"deviceName": "PC-1", "installState": "installed"}),
                    json!({"deviceName": "PC-2", "installState": "notApplicable"}),
                ],
            )
            .with_collection(
                resources::user_statuses("a1"),
                vec![json!({"userPrincipalName": "adele@contoso.com", "installedDeviceCount": 1})],
            )
            .with_collection(
                resources::group_assignments("a1"),
                vec![json!({"id": "as1", "targetGroupId": "g1"})],
            )
    }

    #[tokio::test]
    async fn test_list_applications_filters_managed_and_vpp() {
        let source = source();
        let fetcher = StatusFetcher::new(&source);

        let apps = fetcher.list_applications().await.unwrap();
        let ids: Vec<&str> = apps.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a4"]);
    }

    #[tokio::test]
    async fn test_fetch_device_statuses_tags_records() {
        let source = source();
        let fetcher = StatusFetcher::new(&source);
        let apps = fetcher.list_applications().await.unwrap();

        let statuses = fetcher.fetch_device_statuses(&apps[0]).await.unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.app.app_name == "Viewer"));
        assert!(statuses.iter().all(|s| s.app.app_type == AppType::Web));
        assert_eq!(statuses[1].record.install_state, InstallState::NotApplicable);
    }

    #[tokio::test]
    async fn test_fetch_user_statuses_and_assignments() {
        let source = source();
        let fetcher = StatusFetcher::new(&source);
        let apps = fetcher.list_applications().await.unwrap();

        let users = fetcher.fetch_user_statuses(&apps[0]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].record.installed_device_count, 1);

        let assignments = fetcher.fetch_group_assignments("a1").await.unwrap();
        assert_eq!(assignments[0].target_group_id.as_deref(), Some("g1"));
    }

    #[tokio::test]
    async fn test_malformed_item_fails_fetch() {
        let source = InMemoryGraphSource::new().with_collection(
            resources::device_statuses("a1"),
            vec![json!({"installState": 42})],
        );
        let fetcher = StatusFetcher::new(&source);
        let app = MobileApp {
            id: "a1".to_string(),
            display_name: "Viewer".to_string(),
            type_tag: String::new(),
        };

        let err = fetcher.fetch_device_statuses(&app).await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
        assert_eq!(
            err.resource(),
            Some("deviceAppManagement/mobileApps/a1/deviceStatuses")
        );
    }

    #[tokio::test]
    async fn test_listing_failure_propagates() {
        let source = InMemoryGraphSource::new().with_failure(resources::MOBILE_APPS, 401, "expired");
        let fetcher = StatusFetcher::new(&source);

        let err = fetcher.list_applications().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some("expired"));
    }
}

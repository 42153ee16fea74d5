use kernel::Report;
use reqwest::multipart::Part;

use crate::{ReportFields, ReportsApi};

/// Lifecycle of an async projection fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient user-facing message describing the last resolved operation.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// Cached client-side view of the report collection.
///
/// Holds two projections, the full list and a single detail slot, each
/// with its own fetch status. Mutations resolve against the projections
/// directly; cached data is left untouched on every failure path.
#[derive(Default)]
pub struct ReportsStore {
    pub reports: Vec<Report>,
    pub detail: Option<Report>,
    pub status: FetchStatus,
    pub detail_status: FetchStatus,
    notification: Option<Notification>,
}

impl ReportsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole list projection.
    pub async fn fetch_reports(&mut self, api: &ReportsApi) {
        self.status = FetchStatus::Loading;
        match api.list().await {
            Ok(reports) => {
                self.status = FetchStatus::Succeeded;
                self.reports = reports;
            }
            Err(_) => {
                self.status = FetchStatus::Failed;
                self.notify_error("Error fetching reports.");
            }
        }
    }

    /// Replaces the detail slot.
    pub async fn fetch_report_detail(&mut self, api: &ReportsApi, id: &str) {
        self.detail_status = FetchStatus::Loading;
        match api.get(id).await {
            Ok(report) => {
                self.detail_status = FetchStatus::Succeeded;
                self.detail = Some(report);
            }
            Err(_) => {
                self.detail_status = FetchStatus::Failed;
                self.notify_error("Error fetching report details.");
            }
        }
    }

    /// Appends the created record to the list projection.
    pub async fn create_report(
        &mut self,
        api: &ReportsApi,
        fields: &ReportFields,
        file: Option<Part>,
    ) {
        match api.create(fields, file).await {
            Ok(mut rows) => {
                self.reports.append(&mut rows);
                self.notify_success("Report created successfully!");
            }
            Err(_) => self.notify_error("Error creating report."),
        }
    }

    /// Merges the updated record into the list entry and the detail slot
    /// when their ids match.
    pub async fn update_report(
        &mut self,
        api: &ReportsApi,
        id: &str,
        fields: &ReportFields,
        file: Option<Part>,
        remove_file: bool,
    ) {
        match api.update(id, fields, file, remove_file).await {
            Ok(rows) => {
                if let Some(updated) = rows.into_iter().next() {
                    if let Some(entry) = self.reports.iter_mut().find(|r| r.id == updated.id) {
                        *entry = updated.clone();
                    }
                    if let Some(detail) = self.detail.as_mut() {
                        if detail.id == updated.id {
                            // Update replies never carry the inlined
                            // payload; the one already loaded survives.
                            let file = detail.file.take();
                            *detail = updated;
                            detail.file = file;
                        }
                    }
                }
                self.notify_success("Report updated successfully!");
            }
            Err(_) => self.notify_error("Error updating report."),
        }
    }

    /// Removes the record from the list and clears the detail slot when
    /// it was the active one.
    pub async fn delete_report(&mut self, api: &ReportsApi, id: &str) {
        match api.delete(id).await {
            Ok(_) => {
                self.reports.retain(|r| r.id != id);
                if self.detail.as_ref().is_some_and(|d| d.id == id) {
                    self.detail = None;
                }
                self.notify_success("Report deleted successfully!");
            }
            Err(_) => self.notify_error("Error deleting report."),
        }
    }

    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Consumes the pending notification, leaving the slot empty.
    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    fn notify_success(&mut self, message: &str) {
        self.notification = Some(Notification {
            message: message.to_owned(),
            severity: Severity::Success,
        });
    }

    fn notify_error(&mut self, message: &str) {
        self.notification = Some(Notification {
            message: message.to_owned(),
            severity: Severity::Error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_is_transient() {
        // Arrange
        let mut store = ReportsStore::new();
        store.notify_success("done");

        // Act
        let taken = store.take_notification();

        // Assert
        assert!(taken.is_some());
        assert!(store.notification().is_none());
    }

    #[test]
    fn clear_notification_resets_slot() {
        // Arrange
        let mut store = ReportsStore::new();
        store.notify_error("boom");

        // Act
        store.clear_notification();

        // Assert
        assert!(store.notification().is_none());
    }

    #[test]
    fn fresh_store_is_idle() {
        // Arrange

        // Act
        let store = ReportsStore::new();

        // Assert
        assert_eq!(store.status, FetchStatus::Idle);
        assert_eq!(store.detail_status, FetchStatus::Idle);
        assert!(store.reports.is_empty());
        assert!(store.detail.is_none());
    }
}

use std::path::Path;

use super::notice::NoticeBoard;
use crate::client::upload::{is_name_list_file, parse_name_list};
use crate::client::{ApiClient, ClientError, Session};
use crate::constants::RECENT_UPLOADS_SHOWN;
use crate::models::NameDetails;

/// State of the upload page: the notice line and the names added so far.
#[derive(Debug, Default)]
pub struct UploadPage {
    pub notices: NoticeBoard,
    added: Vec<String>,
}

impl UploadPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_single(
        &mut self,
        client: &dyn ApiClient,
        session: &Session,
        name: &str,
        details: &NameDetails,
    ) -> bool {
        match client.add_name(session, session.user_id(), name, details).await {
            Ok(_) => {
                let name = name.trim().to_string();
                self.notices.success(format!("Successfully added \"{}\"!", name));
                self.added.push(name);
                true
            }
            Err(ClientError::Validation(message)) => {
                self.notices.error(message);
                false
            }
            Err(e) => {
                tracing::error!("Failed to add name: {}", e);
                self.notices.error("Failed to add name. Please try again.");
                false
            }
        }
    }

    /// Bulk upload from a `.txt` file. Returns how many names were added.
    pub async fn upload_file(&mut self, client: &dyn ApiClient, session: &Session, path: &Path) -> usize {
        if !is_name_list_file(path) {
            self.notices.error("Please upload a .txt file.");
            return 0;
        }

        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to upload file {}: {}", path.display(), e);
                self.notices.error("Failed to upload file. Please try again.");
                return 0;
            }
        };

        let names = parse_name_list(&text);
        if names.is_empty() {
            self.notices.error("No valid names found in the file.");
            return 0;
        }

        let added = client
            .add_names_from_file(session, session.user_id(), &names)
            .await
            .len();
        // Ids do not say which entries failed, so the first `added` names are listed
        self.added.extend(names.iter().take(added).cloned());

        if added == names.len() {
            self.notices.success(format!("Successfully added {} names!", added));
        } else {
            self.notices.success(format!(
                "Added {} out of {} names. Some may have been duplicates.",
                added,
                names.len()
            ));
        }
        added
    }

    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    /// The most recent names, oldest first, and how many older ones are hidden.
    pub fn recent(&self) -> (&[String], usize) {
        let hidden = self.added.len().saturating_sub(RECENT_UPLOADS_SHOWN);
        (&self.added[hidden..], hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LocalApiClient;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    async fn signed_in() -> (LocalApiClient, Session) {
        let client = LocalApiClient::new(Arc::new(MemoryStore::seeded()));
        let session = client.sign_in("joe", None).await.unwrap();
        (client, session)
    }

    fn message(page: &UploadPage) -> String {
        page.notices.current().map(|n| n.message.clone()).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_single_name_messages() {
        let (client, session) = signed_in().await;
        let mut page = UploadPage::new();

        assert!(page.add_single(&client, &session, " Martinez ", &NameDetails::default()).await);
        assert_eq!(message(&page), "Successfully added \"Martinez\"!");

        assert!(!page.add_single(&client, &session, "martinez", &NameDetails::default()).await);
        assert_eq!(message(&page), "Failed to add name. Please try again.");
        assert_eq!(page.added_count(), 1);
    }

    #[tokio::test]
    async fn test_non_txt_file_rejected_without_reading() {
        let (client, session) = signed_in().await;
        let mut page = UploadPage::new();

        // The file does not exist; the extension check comes first
        let added = page.upload_file(&client, &session, Path::new("/nonexistent/names.csv")).await;
        assert_eq!(added, 0);
        assert_eq!(message(&page), "Please upload a .txt file.");
    }

    #[tokio::test]
    async fn test_file_upload_messages() {
        let (client, session) = signed_in().await;
        let dir = tempdir().unwrap();
        let mut page = UploadPage::new();

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "\n   \n").unwrap();
        assert_eq!(page.upload_file(&client, &session, &empty).await, 0);
        assert_eq!(message(&page), "No valid names found in the file.");

        let fresh = dir.path().join("fresh.txt");
        std::fs::write(&fresh, "Anders\n\nBrightwater\n").unwrap();
        assert_eq!(page.upload_file(&client, &session, &fresh).await, 2);
        assert_eq!(message(&page), "Successfully added 2 names!");

        let partial = dir.path().join("partial.txt");
        std::fs::write(&partial, "Cole\nSmith\nanders\n").unwrap();
        assert_eq!(page.upload_file(&client, &session, &partial).await, 1);
        assert_eq!(
            message(&page),
            "Added 1 out of 3 names. Some may have been duplicates."
        );
    }

    #[tokio::test]
    async fn test_recent_list_is_capped() {
        let (client, session) = signed_in().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("many.txt");
        let names: Vec<String> = (0..25).map(|i| format!("Surname{:02}", i)).collect();
        std::fs::write(&path, names.join("\n")).unwrap();

        let mut page = UploadPage::new();
        assert_eq!(page.upload_file(&client, &session, &path).await, 25);

        let (shown, hidden) = page.recent();
        assert_eq!(shown.len(), 20);
        assert_eq!(hidden, 5);
        assert_eq!(shown.first().map(String::as_str), Some("Surname05"));
    }
}

use crate::error::{AdminError, Result, ValidationError};
use crate::message::{FlashMessage, Severity};
use crate::options::ValidationOptions;
use crate::request::{
    BulkDeleteRequest, CreateRedirectRequest, DeleteRedirectRequest, RedirectCommand,
    UpdateRedirectRequest,
};
use crate::translator::Translator;
use detour_core::host::display_host;
use detour_core::markup::escape_html;
use detour_core::{
    Host, NewRedirect, Redirect, RedirectIdentity, RedirectStorage, RedirectType, StorageError,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a create or update action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub success: bool,
    /// Every redirect touched by the action, the requested one first.
    pub changed_redirects: Vec<Redirect>,
    pub messages: Vec<FlashMessage>,
}

impl MutationOutcome {
    fn failed(messages: Vec<FlashMessage>) -> Self {
        Self {
            success: false,
            changed_redirects: Vec::new(),
            messages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub messages: Vec<FlashMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteOutcome {
    pub success: bool,
    pub deleted: Vec<RedirectIdentity>,
    #[serde(skip)]
    pub issue_occurred: bool,
    pub messages: Vec<FlashMessage>,
}

/// Returns true if `existing` is exactly the requested redirect.
pub fn is_same(
    source_uri_path: &str,
    target_uri_path: &str,
    host: Option<&Host>,
    status_code: u16,
    existing: Option<&Redirect>,
) -> bool {
    existing.is_some_and(|redirect| {
        redirect.source_uri_path == source_uri_path
            && redirect.target_uri_path == target_uri_path
            && redirect.host.as_ref() == host
            && redirect.status_code == status_code
    })
}

/// The redirect mutation controller.
///
/// Validates requests, applies the create/update/delete rules on top of a
/// [`RedirectStorage`] and describes every outcome with translated
/// [`FlashMessage`]s. Domain failures never escape the public actions; they
/// turn into messages and an unsuccessful outcome.
#[derive(Debug)]
pub struct RedirectAdmin<S, T> {
    storage: Arc<S>,
    translator: Arc<T>,
    options: ValidationOptions,
}

impl<S, T> Clone for RedirectAdmin<S, T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            translator: Arc::clone(&self.translator),
            options: self.options.clone(),
        }
    }
}

impl<S: RedirectStorage, T: Translator> RedirectAdmin<S, T> {
    pub fn new(storage: S, translator: T, options: ValidationOptions) -> Self {
        Self::from_shared(Arc::new(storage), Arc::new(translator), options)
    }

    pub fn from_shared(storage: Arc<S>, translator: Arc<T>, options: ValidationOptions) -> Self {
        Self {
            storage,
            translator,
            options,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Checks the rules that need the configured options.
    pub fn validate(&self, command: &RedirectCommand) -> std::result::Result<(), ValidationError> {
        if command.source_uri_path == command.target_uri_path {
            return Err(ValidationError::SameSourceAndTarget);
        }
        if !self.options.source_uri_path.is_match(&command.source_uri_path) {
            return Err(ValidationError::SourceUriPathNotValid {
                pattern: self.options.source_uri_path_pattern().to_string(),
            });
        }
        Ok(())
    }

    /// Writes the redirect described by `command`.
    ///
    /// Returns an empty list if an identical redirect already exists. A
    /// different redirect at the same identity is replaced only with `force`.
    pub async fn add_redirect(
        &self,
        command: &RedirectCommand,
        creator: Option<&str>,
        force: bool,
    ) -> Result<Vec<Redirect>> {
        self.validate(command)?;
        let identity = command.identity();

        let existing = self
            .storage
            .get_one_by_source_uri_path_and_host(
                &command.source_uri_path,
                command.host.as_ref(),
                true,
            )
            .await?;

        if let Some(existing) = existing {
            if is_same(
                &command.source_uri_path,
                &command.target_uri_path,
                command.host.as_ref(),
                command.status_code,
                Some(&existing),
            ) {
                debug!(redirect = %identity, "identical redirect already exists");
                return Ok(Vec::new());
            }
            if !force {
                return Err(AdminError::NotCreated(identity));
            }
            self.storage
                .remove_one_by_source_uri_path_and_host(
                    &command.source_uri_path,
                    command.host.as_ref(),
                )
                .await?;
            self.storage.persist_all().await?;
            debug!(redirect = %identity, "replaced existing redirect");
        }

        let redirect = NewRedirect::builder()
            .source_uri_path(command.source_uri_path.clone())
            .target_uri_path(command.target_uri_path.clone())
            .status_code(command.status_code)
            .hosts(vec![command.host.clone()])
            .creator(creator.map(str::to_string))
            .comment(command.comment.clone())
            .redirect_type(RedirectType::Manual)
            .start_date_time(command.start_date_time)
            .end_date_time(command.end_date_time)
            .build();

        let mut changed = self
            .storage
            .add_redirect(redirect)
            .await
            .map_err(|error| match error {
                StorageError::Conflict(_) => AdminError::Conflict(identity.clone()),
                other => AdminError::Storage(other),
            })?;
        self.storage.persist_all().await?;

        requested_first(&mut changed, &identity);
        info!(
            redirect = %identity,
            target_uri_path = %command.target_uri_path,
            status_code = command.status_code,
            changed = changed.len(),
            "added redirect"
        );
        Ok(changed)
    }

    /// Replaces the redirect at `original` with the one described by `command`.
    pub async fn update_redirect(
        &self,
        original: &RedirectIdentity,
        command: &RedirectCommand,
        creator: Option<&str>,
        force: bool,
    ) -> Result<Vec<Redirect>> {
        self.validate(command)?;
        let identity = command.identity();

        if *original != identity {
            let occupied = self
                .storage
                .get_one_by_source_uri_path_and_host(
                    &identity.source_uri_path,
                    identity.host.as_ref(),
                    true,
                )
                .await?;
            if occupied.is_some() {
                return Err(AdminError::Conflict(identity));
            }
        }

        if !force && !self.delete_redirect(original).await? {
            return Err(AdminError::NotFound(original.clone()));
        }

        self.add_redirect(command, creator, force).await
    }

    /// Removes the redirect at `identity`. Returns false if there is none.
    pub async fn delete_redirect(&self, identity: &RedirectIdentity) -> Result<bool> {
        let existing = self
            .storage
            .get_one_by_source_uri_path_and_host(
                &identity.source_uri_path,
                identity.host.as_ref(),
                true,
            )
            .await?;
        if existing.is_none() {
            debug!(redirect = %identity, "nothing to delete");
            return Ok(false);
        }

        self.storage
            .remove_one_by_source_uri_path_and_host(
                &identity.source_uri_path,
                identity.host.as_ref(),
            )
            .await?;
        self.storage.persist_all().await?;
        info!(redirect = %identity, "deleted redirect");
        Ok(true)
    }

    pub async fn create(
        &self,
        request: CreateRedirectRequest,
        creator: Option<&str>,
    ) -> MutationOutcome {
        let force = request.force;
        let mut messages = Vec::new();

        let changed = match request.into_command(self.options.default_status_code) {
            Ok(command) => match self.add_redirect(&command, creator, force).await {
                Ok(changed) => {
                    if changed.is_empty() {
                        messages.push(FlashMessage::notice(
                            self.translate("message.redirectUnchanged", &[]),
                        ));
                    }
                    changed
                }
                Err(error) => {
                    messages.push(self.error_message(&error));
                    Vec::new()
                }
            },
            Err(errors) => {
                messages.extend(errors.iter().map(|error| self.error_message(error)));
                Vec::new()
            }
        };

        if changed.is_empty() {
            messages.push(FlashMessage::error(
                self.translate("error.redirectNotCreated", &[]),
            ));
            return MutationOutcome::failed(messages);
        }

        messages.push(self.changed_message(
            &changed,
            "message.redirectCreated",
            "warning.redirectCreatedWithChanges",
        ));
        MutationOutcome {
            success: true,
            changed_redirects: changed,
            messages,
        }
    }

    pub async fn update(
        &self,
        request: UpdateRedirectRequest,
        creator: Option<&str>,
    ) -> MutationOutcome {
        let original = request.original_identity();
        let force = request.redirect.force;
        let mut messages = Vec::new();

        let changed = match request.redirect.into_command(self.options.default_status_code) {
            Ok(command) => {
                match self
                    .update_redirect(&original, &command, creator, force)
                    .await
                {
                    Ok(changed) => changed,
                    Err(error) => {
                        messages.push(self.error_message(&error));
                        if matches!(error, AdminError::Validation(_)) {
                            messages.push(FlashMessage::error(
                                self.translate("error.redirectNotValid", &[]),
                            ));
                        }
                        Vec::new()
                    }
                }
            }
            Err(errors) => {
                messages.extend(errors.iter().map(|error| self.error_message(error)));
                Vec::new()
            }
        };

        if changed.is_empty() {
            messages.push(FlashMessage::error(
                self.translate("error.redirectNotUpdated", &[]),
            ));
            return MutationOutcome::failed(messages);
        }

        messages.push(self.changed_message(
            &changed,
            "message.redirectUpdated",
            "warning.redirectUpdatedWithChanges",
        ));
        MutationOutcome {
            success: true,
            changed_redirects: changed,
            messages,
        }
    }

    pub async fn delete(&self, request: DeleteRedirectRequest) -> DeleteOutcome {
        let identity = request.identity();

        match self.delete_redirect(&identity).await {
            Ok(true) => DeleteOutcome {
                success: true,
                messages: vec![FlashMessage::ok(self.translate(
                    "message.redirectDeleted",
                    &[
                        display_host(identity.host.as_ref()).to_string(),
                        identity.source_uri_path.clone(),
                    ],
                ))],
            },
            Ok(false) => DeleteOutcome {
                success: false,
                messages: vec![FlashMessage::error(
                    self.translate("error.redirectNotDeleted", &[]),
                )],
            },
            Err(error) => DeleteOutcome {
                success: false,
                messages: vec![
                    self.error_message(&error),
                    FlashMessage::error(self.translate("error.redirectNotDeleted", &[])),
                ],
            },
        }
    }

    /// Deletes every listed redirect, carrying on past missing ones.
    pub async fn bulk_delete(&self, request: BulkDeleteRequest) -> BulkDeleteOutcome {
        let total = request.redirects.len();
        let mut deleted = Vec::with_capacity(total);
        let mut issue_occurred = false;

        for entry in &request.redirects {
            let identity = entry.identity();
            match self.delete_redirect(&identity).await {
                Ok(true) => deleted.push(identity),
                Ok(false) => issue_occurred = true,
                Err(error) => {
                    warn!(redirect = %identity, error = %error, "bulk delete failed");
                    issue_occurred = true;
                }
            }
        }

        let message = if !issue_occurred {
            FlashMessage::ok(self.translate("message.redirectsDeleted", &[deleted.len().to_string()]))
        } else if deleted.is_empty() {
            FlashMessage::error(self.translate("error.redirectsNotDeleted", &[]))
        } else {
            FlashMessage::warning(self.translate(
                "warning.redirectsPartiallyDeleted",
                &[deleted.len().to_string(), total.to_string()],
            ))
        };

        BulkDeleteOutcome {
            success: !issue_occurred,
            deleted,
            issue_occurred,
            messages: vec![message],
        }
    }

    pub(crate) fn translate(&self, id: &str, arguments: &[String]) -> String {
        self.translator.translate_or_id(id, arguments)
    }

    /// Translates `error` into a message, logging storage failures.
    pub fn error_message(&self, error: &AdminError) -> FlashMessage {
        match error {
            AdminError::Storage(source) => warn!(error = %source, "redirect storage failed"),
            other => debug!(error = %other, "admin action rejected"),
        }
        FlashMessage::new(
            error.severity(),
            self.translate(error.message_id(), &error.message_arguments()),
            "",
        )
    }

    fn changed_message(&self, changed: &[Redirect], single_id: &str, multiple_id: &str) -> FlashMessage {
        let Some(first) = changed.first() else {
            return FlashMessage::notice(self.translate("message.redirectUnchanged", &[]));
        };
        let arguments = [
            display_host(first.host.as_ref()).to_string(),
            first.source_uri_path.clone(),
            first.target_uri_path.clone(),
            first.status_code.to_string(),
        ];
        let (id, severity) = if changed.len() == 1 {
            (single_id, Severity::Ok)
        } else {
            (multiple_id, Severity::Warning)
        };

        FlashMessage::new(
            severity,
            self.translate(id, &arguments),
            self.changed_redirect_list(changed),
        )
    }

    /// HTML list describing every changed redirect.
    pub fn changed_redirect_list(&self, changed: &[Redirect]) -> String {
        if changed.is_empty() {
            return String::new();
        }
        let items: String = changed
            .iter()
            .map(|redirect| {
                format!(
                    "<li>{} &rarr; {}</li>",
                    escape_html(&redirect.identity().to_string()),
                    escape_html(&display_target(&redirect.target_uri_path)),
                )
            })
            .collect();
        format!(
            "<p>{}</p><ul>{items}</ul>",
            escape_html(&self.translate("message.relatedChanges", &[]))
        )
    }
}

fn display_target(target: &str) -> String {
    if target.starts_with('/') || target.contains("://") {
        target.to_string()
    } else {
        format!("/{target}")
    }
}

/// Moves the redirect occupying `identity` to the front, keeping the order
/// of the others.
fn requested_first(changed: &mut [Redirect], identity: &RedirectIdentity) {
    let position = changed
        .iter()
        .position(|redirect| redirect.has_identity(&identity.source_uri_path, identity.host.as_ref()));
    if let Some(position) = position {
        changed[..=position].rotate_right(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::Catalog;
    use detour_core::ReadRedirectStorage;
    use detour_storage::InMemoryRedirectStorage;

    fn admin() -> RedirectAdmin<InMemoryRedirectStorage, Catalog> {
        RedirectAdmin::new(
            InMemoryRedirectStorage::new(),
            Catalog::english(),
            ValidationOptions::default(),
        )
    }

    fn create_request(source: &str, target: &str) -> CreateRedirectRequest {
        CreateRedirectRequest {
            source_uri_path: source.to_string(),
            target_uri_path: target.to_string(),
            ..Default::default()
        }
    }

    fn redirect(source: &str, target: &str) -> Redirect {
        Redirect::builder()
            .source_uri_path(source)
            .target_uri_path(target)
            .status_code(301)
            .build()
    }

    #[test]
    fn is_same_requires_an_existing_redirect() {
        assert!(!is_same("a", "b", None, 301, None));
    }

    #[test]
    fn is_same_compares_all_four_fields() {
        let existing = redirect("a", "b");
        assert!(is_same("a", "b", None, 301, Some(&existing)));
        assert!(!is_same("a", "c", None, 301, Some(&existing)));
        assert!(!is_same("a", "b", None, 302, Some(&existing)));
        assert!(!is_same("a", "b", Host::parse("x.com").as_ref(), 301, Some(&existing)));
    }

    #[test]
    fn requested_redirect_is_moved_to_the_front() {
        let mut changed = vec![redirect("x", "c"), redirect("y", "c"), redirect("b", "c")];
        requested_first(&mut changed, &RedirectIdentity::new("b", None));

        let sources: Vec<_> = changed.iter().map(|r| r.source_uri_path.as_str()).collect();
        assert_eq!(sources, ["b", "x", "y"]);
    }

    #[test]
    fn changed_list_is_escaped() {
        let admin = admin();
        let html = admin.changed_redirect_list(&[redirect("a<b", "c")]);
        assert_eq!(
            html,
            "<p>The following redirects were changed as well:</p><ul><li>/a&lt;b &rarr; /c</li></ul>"
        );
        assert_eq!(admin.changed_redirect_list(&[]), "");
    }

    #[tokio::test]
    async fn create_reports_success() {
        let admin = admin();
        let outcome = admin.create(create_request("old", "new"), Some("editor")).await;

        assert!(outcome.success);
        assert_eq!(outcome.changed_redirects.len(), 1);
        assert_eq!(outcome.changed_redirects[0].creator.as_deref(), Some("editor"));
        assert_eq!(outcome.changed_redirects[0].redirect_type, RedirectType::Manual);
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].severity, Severity::Ok);
        assert_eq!(outcome.messages[0].title, "Redirect created: /old → new (301)");
    }

    #[tokio::test]
    async fn create_with_same_source_and_target_fails() {
        let admin = admin();
        let outcome = admin.create(create_request("same", " same "), None).await;

        assert!(!outcome.success);
        let titles: Vec<_> = outcome.messages.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Source and target path must differ", "The redirect could not be created"]
        );
        assert!(admin.storage().is_empty());
    }

    #[tokio::test]
    async fn create_with_invalid_characters_fails() {
        let admin = admin();
        let outcome = admin.create(create_request("with space", "new"), None).await;

        assert!(!outcome.success);
        assert_eq!(outcome.messages[0].severity, Severity::Warning);
        assert!(outcome.messages[0].title.contains("^[a-zA-Z0-9_"));
    }

    #[tokio::test]
    async fn chain_rewrite_is_reported_as_warning() {
        let admin = admin();
        admin.create(create_request("a", "b"), None).await;

        let outcome = admin.create(create_request("b", "c"), None).await;
        assert!(outcome.success);
        assert_eq!(outcome.changed_redirects.len(), 2);
        assert_eq!(outcome.changed_redirects[0].source_uri_path, "b");

        let message = outcome.messages.last().unwrap();
        assert_eq!(message.severity, Severity::Warning);
        assert!(message.message.contains("<li>/a &rarr; /c</li>"));
    }

    #[tokio::test]
    async fn delete_missing_redirect() {
        let admin = admin();
        let outcome = admin
            .delete(DeleteRedirectRequest {
                source_uri_path: "missing".to_string(),
                host: None,
            })
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.messages[0].title, "The redirect could not be deleted");
    }

    #[tokio::test]
    async fn delete_existing_redirect() {
        let admin = admin();
        admin
            .create(
                CreateRedirectRequest {
                    host: Some("a.com".to_string()),
                    ..create_request("old", "new")
                },
                None,
            )
            .await;

        let outcome = admin
            .delete(DeleteRedirectRequest {
                source_uri_path: "old".to_string(),
                host: Some("a.com".to_string()),
            })
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.messages[0].title, "Redirect deleted: a.com/old");
        assert!(admin.storage().is_empty());
    }

    #[tokio::test]
    async fn update_moves_the_redirect() {
        let admin = admin();
        admin.create(create_request("old", "dest"), None).await;

        let outcome = admin
            .update(
                UpdateRedirectRequest {
                    original_source_uri_path: "old".to_string(),
                    original_host: None,
                    redirect: create_request("renamed", "dest"),
                },
                None,
            )
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.messages[0].title, "Redirect updated: /renamed → dest (301)");
        let all = admin.storage().get_all(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source_uri_path, "renamed");
    }

    #[tokio::test]
    async fn update_of_missing_redirect_fails() {
        let admin = admin();
        let outcome = admin
            .update(
                UpdateRedirectRequest {
                    original_source_uri_path: "missing".to_string(),
                    original_host: None,
                    redirect: create_request("renamed", "dest"),
                },
                None,
            )
            .await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.messages.last().unwrap().title,
            "The redirect could not be updated"
        );
        assert!(admin.storage().is_empty());
    }

    #[tokio::test]
    async fn invalid_update_adds_not_valid_message() {
        let admin = admin();
        admin.create(create_request("old", "dest"), None).await;

        let outcome = admin
            .update(
                UpdateRedirectRequest {
                    original_source_uri_path: "old".to_string(),
                    original_host: None,
                    redirect: create_request("dest", "dest"),
                },
                None,
            )
            .await;

        let ids: Vec<_> = outcome.messages.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            ids,
            [
                "Source and target path must differ",
                "The redirect is not valid",
                "The redirect could not be updated"
            ]
        );
    }
}

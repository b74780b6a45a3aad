// snippet-service/src/services/snippet_service.rs
//
// Visibility & Versioning Engine. Owns the single visibility predicate and
// the single authorization check, and applies every mutation through the
// injected store handle, recording history on content-affecting updates.
use crate::models::{
    CreateSnippetRequest, Requester, Role, Scope, ServiceError, Snippet, SnippetFilters,
    SnippetVersion, Status, UpdateSnippetRequest, User,
};
use crate::utils::SnippetStore;
use chrono::Utc;
use log::info;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

pub struct SnippetEngine {
    store: SnippetStore,
}

// Visibility predicate: admins see everything, otherwise a snippet is
// visible when it is org-wide, shared with the requester's team, or owned
// by the requester
pub fn is_visible(snippet: &Snippet, owner_team: Option<&str>, requester: &Requester) -> bool {
    if requester.role == Role::Admin {
        return true;
    }

    match snippet.scope {
        Scope::Org => true,
        Scope::Team => match (owner_team, requester.team_id.as_deref()) {
            (Some(owner_team), Some(requester_team)) => owner_team == requester_team,
            _ => false,
        },
        Scope::Personal => snippet.owner_id == requester.user_id,
    }
}

// Edits are allowed for the owner and for elevated roles
pub fn can_edit(snippet: &Snippet, requester: &Requester) -> bool {
    snippet.owner_id == requester.user_id
        || requester.role == Role::Manager
        || requester.role == Role::Admin
}

// Deletes are owner or admin only: managers may edit but not delete
pub fn can_delete(snippet: &Snippet, requester: &Requester) -> bool {
    snippet.owner_id == requester.user_id || requester.role == Role::Admin
}

impl SnippetEngine {
    pub fn new(store: SnippetStore) -> Self {
        SnippetEngine { store }
    }

    pub fn store(&self) -> &SnippetStore {
        &self.store
    }

    // List the snippets the requester may see, with all filters ANDed in,
    // newest update first
    pub fn list(
        &self,
        requester: &Requester,
        filters: &SnippetFilters,
    ) -> Result<Vec<Snippet>, ServiceError> {
        let users = self.user_map()?;
        let search = filters.search.as_ref().map(|s| s.to_lowercase());

        let mut snippets: Vec<Snippet> = self
            .store
            .list_snippets()?
            .into_iter()
            .filter(|snippet| {
                let owner_team = users
                    .get(&snippet.owner_id)
                    .and_then(|owner| owner.team_id.as_deref());
                is_visible(snippet, owner_team, requester)
            })
            .filter(|snippet| match filters.status {
                Some(status) => snippet.status == status,
                // Default: exclude archived
                None => snippet.status != Status::Archived,
            })
            .filter(|snippet| match &filters.category {
                Some(category) => snippet.category.as_deref() == Some(category.as_str()),
                None => true,
            })
            .filter(|snippet| match filters.scope {
                Some(scope) => snippet.scope == scope,
                None => true,
            })
            .filter(|snippet| match &search {
                Some(term) => {
                    snippet.name.to_lowercase().contains(term)
                        || snippet.body.to_lowercase().contains(term)
                        || snippet
                            .tags
                            .as_ref()
                            .map_or(false, |tags| tags.to_lowercase().contains(term))
                }
                None => true,
            })
            .collect();

        snippets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        for snippet in &mut snippets {
            enrich_owner(snippet, &users);
        }

        Ok(snippets)
    }

    pub fn get(&self, id: &str) -> Result<Snippet, ServiceError> {
        let mut snippet = self
            .store
            .find_snippet_by_id(id)?
            .ok_or(ServiceError::NotFound)?;

        enrich_owner(&mut snippet, &self.user_map()?);
        Ok(snippet)
    }

    // Resolve a shortcut to at most one published snippet, preferring the
    // requester's own personal snippets, then team-shared, then org-wide.
    // Ties within a tier go to the most recently created. The leading slash
    // is optional so the shortcut survives a URL path segment.
    pub fn resolve_shortcut(
        &self,
        shortcut: &str,
        requester: &Requester,
    ) -> Result<Snippet, ServiceError> {
        let users = self.user_map()?;
        let wanted = shortcut.trim_start_matches('/');

        let candidates: Vec<Snippet> = self
            .store
            .list_snippets()?
            .into_iter()
            .filter(|snippet| {
                snippet.status == Status::Published
                    && snippet
                        .shortcut
                        .as_deref()
                        .map_or(false, |s| s.trim_start_matches('/') == wanted)
            })
            .collect();

        let shares_team = |snippet: &Snippet| {
            match (
                users
                    .get(&snippet.owner_id)
                    .and_then(|owner| owner.team_id.as_deref()),
                requester.team_id.as_deref(),
            ) {
                (Some(owner_team), Some(requester_team)) => owner_team == requester_team,
                _ => false,
            }
        };

        let best = newest_matching(&candidates, |snippet| {
            snippet.scope == Scope::Personal && snippet.owner_id == requester.user_id
        })
        .or_else(|| {
            newest_matching(&candidates, |snippet| {
                snippet.scope == Scope::Team && shares_team(snippet)
            })
        })
        .or_else(|| newest_matching(&candidates, |snippet| snippet.scope == Scope::Org));

        match best {
            Some(found) => {
                let mut snippet = found.clone();
                enrich_owner(&mut snippet, &users);
                Ok(snippet)
            }
            None => Err(ServiceError::NotFound),
        }
    }

    // Create a snippet owned by the requester, at version 1, with its
    // initial version row
    pub fn create(
        &self,
        requester: &Requester,
        data: CreateSnippetRequest,
    ) -> Result<Snippet, ServiceError> {
        if data.name.is_empty() || data.body.is_empty() {
            return Err(ServiceError::BadRequest(
                "Name and body are required".to_string(),
            ));
        }

        let now = Utc::now();
        let snippet = Snippet {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            body: data.body,
            shortcut: data.shortcut,
            category: data.category,
            owner_id: requester.user_id.clone(),
            scope: data.scope.unwrap_or(Scope::Personal),
            status: data.status.unwrap_or(Status::Draft),
            version: 1,
            tags: data.tags,
            usage_count: 0,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            owner_name: None,
            owner_email: None,
        };

        self.store
            .save_snippet_with_version(&snippet, &snapshot(&snippet))?;

        info!("✅ Created snippet: {} (owner: {})", snippet.id, snippet.owner_id);

        self.get(&snippet.id)
    }

    // Partial update. Increments version and appends a post-update snapshot
    // only when a content field (name/body/shortcut/category) is present in
    // the request; scope/status/tags-only updates leave the version alone.
    pub fn update(
        &self,
        id: &str,
        requester: &Requester,
        data: UpdateSnippetRequest,
    ) -> Result<Snippet, ServiceError> {
        let mut snippet = self
            .store
            .find_snippet_by_id(id)?
            .ok_or(ServiceError::NotFound)?;

        if !can_edit(&snippet, requester) {
            return Err(ServiceError::Forbidden);
        }

        let touches_content = data.touches_content();

        if let Some(name) = data.name {
            snippet.name = name;
        }
        if let Some(body) = data.body {
            snippet.body = body;
        }
        if let Some(shortcut) = data.shortcut {
            snippet.shortcut = Some(shortcut);
        }
        if let Some(category) = data.category {
            snippet.category = Some(category);
        }
        if let Some(scope) = data.scope {
            snippet.scope = scope;
        }
        if let Some(status) = data.status {
            snippet.status = status;
        }
        if let Some(tags) = data.tags {
            snippet.tags = Some(tags);
        }

        snippet.updated_at = Utc::now();

        if touches_content {
            snippet.version += 1;
            self.store
                .save_snippet_with_version(&snippet, &snapshot(&snippet))?;
        } else {
            self.store.save_snippet(&snippet)?;
        }

        info!("✅ Updated snippet: {} (version: {})", snippet.id, snippet.version);

        self.get(&snippet.id)
    }

    pub fn delete(&self, id: &str, requester: &Requester) -> Result<(), ServiceError> {
        let snippet = self
            .store
            .find_snippet_by_id(id)?
            .ok_or(ServiceError::NotFound)?;

        if !can_delete(&snippet, requester) {
            return Err(ServiceError::Forbidden);
        }

        self.store.delete_snippet(id)?;

        info!("✅ Deleted snippet: {} and its version history", id);
        Ok(())
    }

    // Fire-and-forget usage telemetry: an unknown id is still a success,
    // matching an UPDATE that affects zero rows
    pub fn track_insertion(&self, id: &str) -> Result<(), ServiceError> {
        self.store.record_usage(id)?;
        Ok(())
    }

    // Version history, newest first. Unknown ids yield an empty list.
    pub fn versions(&self, id: &str) -> Result<Vec<SnippetVersion>, ServiceError> {
        self.store.list_versions(id)
    }

    // Distinct non-empty categories over non-archived snippets, in
    // lexicographic order. Not scope-filtered: a known simplification.
    pub fn categories(&self) -> Result<Vec<String>, ServiceError> {
        let categories: BTreeSet<String> = self
            .store
            .list_snippets()?
            .into_iter()
            .filter(|snippet| snippet.status != Status::Archived)
            .filter_map(|snippet| snippet.category)
            .filter(|category| !category.is_empty())
            .collect();

        Ok(categories.into_iter().collect())
    }

    fn user_map(&self) -> Result<HashMap<String, User>, ServiceError> {
        Ok(self
            .store
            .list_users()?
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect())
    }
}

// Most recently created snippet satisfying the predicate
fn newest_matching<'a, F>(candidates: &'a [Snippet], pred: F) -> Option<&'a Snippet>
where
    F: Fn(&Snippet) -> bool,
{
    candidates
        .iter()
        .filter(|snippet| pred(snippet))
        .max_by_key(|snippet| snippet.created_at)
}

// Capture the snippet's content fields at its current version number
fn snapshot(snippet: &Snippet) -> SnippetVersion {
    SnippetVersion {
        id: Uuid::new_v4().to_string(),
        snippet_id: snippet.id.clone(),
        version: snippet.version,
        name: snippet.name.clone(),
        body: snippet.body.clone(),
        shortcut: snippet.shortcut.clone(),
        category: snippet.category.clone(),
        tags: snippet.tags.clone(),
        created_at: Utc::now(),
    }
}

fn enrich_owner(snippet: &mut Snippet, users: &HashMap<String, User>) {
    if let Some(owner) = users.get(&snippet.owner_id) {
        snippet.owner_name = Some(owner.name.clone());
        snippet.owner_email = Some(owner.email.clone());
    }
}

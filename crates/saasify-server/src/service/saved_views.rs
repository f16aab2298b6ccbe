//! Saved project-list views. Every operation is scoped to the calling
//! user inside the selected tenant.

use saasify_core::error::SaasifyResult;
use saasify_core::models::saved_view::{CreateSavedView, SavedView, SavedViewFilters};
use saasify_core::repository::SavedViewRepository;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::validate::{trim_in_place, validate_input};

const SEARCH_MAX: usize = 120;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SavedViewInput {
    #[serde(default)]
    #[validate(length(min = 2, max = 60, message = "Must be 2 to 60 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_filters"))]
    pub filters: SavedViewFilters,
    #[serde(default)]
    pub is_pinned: bool,
}

impl SavedViewInput {
    /// Trims the name and drops a blank search.
    fn normalized(mut self) -> Self {
        trim_in_place(&mut self.name);
        self.filters.search = self
            .filters
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }
}

fn validate_filters(filters: &SavedViewFilters) -> Result<(), ValidationError> {
    let too_long = filters
        .search
        .as_ref()
        .is_some_and(|search| search.chars().count() > SEARCH_MAX);
    if too_long {
        return Err(ValidationError::new("length")
            .with_message("Search must be at most 120 characters".into()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SavedViewsService<V: SavedViewRepository> {
    views: V,
}

impl<V: SavedViewRepository> SavedViewsService<V> {
    pub fn new(views: V) -> Self {
        Self { views }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: SavedViewInput,
    ) -> SaasifyResult<SavedView> {
        let input = input.normalized();
        validate_input(&input)?;

        let view = self
            .views
            .create(CreateSavedView {
                tenant_id,
                user_id,
                name: input.name,
                filters: input.filters,
                is_pinned: input.is_pinned,
            })
            .await?;
        info!(%tenant_id, %user_id, view_id = %view.id, "Saved view created");
        Ok(view)
    }

    /// Pinned views first, then newest.
    pub async fn list(&self, tenant_id: Uuid, user_id: Uuid) -> SaasifyResult<Vec<SavedView>> {
        self.views.list_for_user(tenant_id, user_id).await
    }

    pub async fn set_pinned(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        view_id: Uuid,
        is_pinned: bool,
    ) -> SaasifyResult<SavedView> {
        let view = self
            .views
            .set_pinned(tenant_id, user_id, view_id, is_pinned)
            .await?;
        debug!(%tenant_id, %view_id, is_pinned, "Saved view pin changed");
        Ok(view)
    }

    pub async fn delete(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        view_id: Uuid,
    ) -> SaasifyResult<SavedView> {
        let view = self.views.delete(tenant_id, user_id, view_id).await?;
        info!(%tenant_id, %view_id, "Saved view deleted");
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use saasify_core::error::SaasifyError;

    use super::*;

    fn input(name: &str, search: Option<&str>) -> SavedViewInput {
        SavedViewInput {
            name: name.into(),
            filters: SavedViewFilters {
                status: None,
                search: search.map(str::to_string),
            },
            is_pinned: false,
        }
    }

    #[test]
    fn blank_search_is_dropped() {
        let normalized = input("  Mine ", Some("   ")).normalized();
        assert_eq!(normalized.name, "Mine");
        assert_eq!(normalized.filters.search, None);
    }

    #[test]
    fn name_and_search_are_bounded() {
        let err = validate_input(&input("x", None).normalized()).unwrap_err();
        let SaasifyError::Validation { field_errors, .. } = err else {
            panic!("expected validation error");
        };
        assert!(field_errors.contains_key("name"));

        let long_search = "s".repeat(SEARCH_MAX + 1);
        let err = validate_input(&input("Mine", Some(&long_search)).normalized()).unwrap_err();
        let SaasifyError::Validation { field_errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            field_errors["filters"],
            vec!["Search must be at most 120 characters"]
        );
    }
}

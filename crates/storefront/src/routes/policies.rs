//! Shop policy route handlers.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::context::{Layout, RequestContext, RootData};
use crate::error::{AppError, Result};
use crate::filters;
use crate::shopify::types::Policy;
use crate::state::AppState;

/// Path of the policy list.
pub const POLICIES_PATH: &str = "/policyer";

/// Policy link in the list.
#[derive(Clone)]
pub struct PolicyLink {
    pub title: String,
    pub url: String,
}

impl From<&Policy> for PolicyLink {
    fn from(policy: &Policy) -> Self {
        Self {
            title: policy.title.clone(),
            url: format!("{POLICIES_PATH}/{}", policy.handle),
        }
    }
}

/// Policy list template.
#[derive(Template)]
#[template(path = "policies/index.html")]
pub struct PoliciesIndexTemplate {
    pub layout: Layout,
    pub policies: Vec<PolicyLink>,
}

/// Single policy template.
#[derive(Template)]
#[template(path = "policies/show.html")]
pub struct PolicyShowTemplate {
    pub layout: Layout,
    pub title: String,
    pub body: String,
}

/// List the shop's published policies.
///
/// # Errors
///
/// Returns 404 if the shop has no published policies.
#[instrument(skip(state, ctx))]
pub async fn index(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    let (root, policies) = futures::try_join!(RootData::load(&state, &ctx), async {
        state.storefront().get_policies().await.map_err(AppError::from)
    })?;

    if policies.is_empty() {
        return Err(AppError::NotFound("Inga policys hittades".to_string()));
    }

    let html = PoliciesIndexTemplate {
        layout: root.layout(&ctx, "Policyer"),
        policies: policies.iter().map(PolicyLink::from).collect(),
    }
    .render()?;

    Ok(root.stream(&ctx, html).into_response())
}

/// Display a single policy.
///
/// # Errors
///
/// Returns 404 if no policy has this handle.
#[instrument(skip(state, ctx), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(handle): Path<String>,
) -> Result<Response> {
    let (root, policy) = futures::try_join!(RootData::load(&state, &ctx), async {
        state.storefront().get_policy(&handle).await.map_err(AppError::from)
    })?;

    let html = PolicyShowTemplate {
        layout: root.layout(&ctx, &policy.title),
        title: policy.title,
        body: policy.body,
    }
    .render()?;

    Ok(root.stream(&ctx, html).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_link() {
        let policy = Policy {
            id: "gid://shopify/ShopPolicy/1".to_string(),
            handle: "refund-policy".to_string(),
            title: "Returpolicy".to_string(),
            body: "<p>30 dagar</p>".to_string(),
        };
        let link = PolicyLink::from(&policy);
        assert_eq!(link.url, "/policyer/refund-policy");
        assert_eq!(link.title, "Returpolicy");
    }
}

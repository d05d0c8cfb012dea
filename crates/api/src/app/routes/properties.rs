use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::Value;

use roomshare_auth::{PROPERTY_UPDATE_FIELDS, PropertyAction, authorize_property};
use roomshare_core::{PropertyId, UserId, ValidationErrors};
use roomshare_infra::StoreError;
use roomshare_listings::{ListParams, ListingQuery, NewProperty, Property, PropertyPatch, SearchRequest};

use crate::app::dto::{
    self, LandlordSummary, ListingPayload, MyPropertiesParams, MyPropertiesPayload, PageParams, PropertyPayload,
    PropertyView, SearchPayload, ValidJson,
};
use crate::app::errors::{self, ApiError};
use crate::app::routes::require_principal;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route("/stats", get(property_stats))
        .route("/search", post(search_properties))
        .route("/my-properties", get(my_properties))
        .route("/landlord/:landlord_id", get(landlord_properties))
        .route(
            "/:id",
            get(get_property).put(update_property).delete(delete_property),
        )
}

fn property_not_found() -> ApiError {
    ApiError::not_found("Property not found")
}

/// Ids that cannot parse cannot exist.
fn parse_property_id(raw: &str) -> Result<PropertyId, ApiError> {
    raw.parse().map_err(|_| property_not_found())
}

/// A record removed between fetch and write reads as missing.
fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => property_not_found(),
        other => other.into(),
    }
}

type QueryPairs = Vec<(String, String)>;

/// Query strings are read as raw pairs so one bad or repeated key cannot
/// discard the others. An undecodable query string reads as empty.
fn query_pairs(params: Result<Query<QueryPairs>, QueryRejection>) -> QueryPairs {
    match params {
        Ok(Query(pairs)) => pairs,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "ignoring malformed query string");
            Vec::new()
        }
    }
}

/// Attach landlord contact cards, looking each landlord up once.
async fn with_landlords(services: &AppServices, properties: Vec<Property>) -> Result<Vec<PropertyView>, ApiError> {
    let mut cards: HashMap<UserId, Option<LandlordSummary>> = HashMap::new();
    for property in &properties {
        if !cards.contains_key(&property.landlord) {
            let owner = services.users.get(property.landlord).await?;
            cards.insert(property.landlord, owner.as_ref().map(LandlordSummary::of));
        }
    }

    Ok(properties
        .into_iter()
        .map(|property| PropertyView {
            landlord: cards.get(&property.landlord).cloned().flatten(),
            property,
        })
        .collect())
}

pub async fn list_properties(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = ListingQuery::from_params(&ListParams::from_pairs(query_pairs(params)));
    let page = services.properties.query(&query).await?;
    let payload = ListingPayload {
        properties: with_landlords(&services, page.properties).await?,
        pagination: page.pagination,
    };
    Ok(errors::success(StatusCode::OK, "Properties retrieved successfully", payload))
}

pub async fn property_stats(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, ApiError> {
    let stats = services.properties.listing_stats().await?;
    Ok(errors::success(
        StatusCode::OK,
        "Property statistics retrieved successfully",
        stats,
    ))
}

/// An empty body searches with every default.
fn parse_search(body: &[u8]) -> Result<SearchRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SearchRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(ValidationErrors::single("body", e.to_string())))
}

pub async fn search_properties(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = parse_search(&body)?;
    let query = ListingQuery::from_search(&request)?;
    let page = services.properties.query(&query).await?;
    Ok(errors::success(
        StatusCode::OK,
        "Search results retrieved successfully",
        SearchPayload {
            properties: with_landlords(&services, page.properties).await?,
            pagination: page.pagination,
            applied_filters: query.filter,
        },
    ))
}

pub async fn landlord_properties(
    Extension(services): Extension<Arc<AppServices>>,
    Path(landlord_id): Path<String>,
    params: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Response, ApiError> {
    let landlord: UserId = landlord_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid landlord id"))?;

    let paging = PageParams::from_pairs(&query_pairs(params));
    let query = ListingQuery::by_landlord(landlord, paging.page_request());
    let page = services.properties.query(&query).await?;
    let payload = ListingPayload {
        properties: with_landlords(&services, page.properties).await?,
        pagination: page.pagination,
    };
    Ok(errors::success(StatusCode::OK, "Properties retrieved successfully", payload))
}

pub async fn my_properties(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    params: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Response, ApiError> {
    let principal = require_principal(principal)?;
    let landlord = principal.user().id;
    let params = MyPropertiesParams::from_pairs(&query_pairs(params));

    let query = ListingQuery::owned(landlord, params.status(), params.page_params().page_request());
    let page = services.properties.query(&query).await?;
    let stats = services.properties.landlord_stats(landlord).await?;

    Ok(errors::success(
        StatusCode::OK,
        "Your properties retrieved successfully",
        MyPropertiesPayload {
            properties: page.properties.into_iter().map(PropertyView::from).collect(),
            pagination: page.pagination,
            stats,
        },
    ))
}

pub async fn create_property(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<ValidJson<NewProperty>, ApiError>,
) -> Result<Response, ApiError> {
    let actor = principal.as_ref().map(|Extension(p)| p.actor());
    let actor = authorize_property(actor.as_ref(), PropertyAction::Create)?;
    let ValidJson(body) = body?;

    let property = body.into_property(actor.user_id, Utc::now())?;
    let property = services.properties.insert(property).await?;
    tracing::info!(property_id = %property.id, landlord = %actor.user_id, "property created");

    Ok(errors::success(
        StatusCode::CREATED,
        "Property created successfully",
        PropertyPayload { property: property.into() },
    ))
}

pub async fn get_property(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_property_id(&id)?;
    let property = services
        .properties
        .record_view(id)
        .await?
        .ok_or_else(property_not_found)?;
    let landlord = services.users.get(property.landlord).await?;

    Ok(errors::success(
        StatusCode::OK,
        "Property retrieved successfully",
        PropertyPayload {
            property: PropertyView {
                landlord: landlord.as_ref().map(LandlordSummary::detailed),
                property,
            },
        },
    ))
}

pub async fn update_property(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<ValidJson<Value>, ApiError>,
) -> Result<Response, ApiError> {
    let actor = principal.as_ref().map(|Extension(p)| p.actor());
    let actor = roomshare_auth::require_session(actor.as_ref()).copied()?;
    let id = parse_property_id(&id)?;

    let existing = services.properties.get(id).await?.ok_or_else(property_not_found)?;
    authorize_property(Some(&actor), PropertyAction::Update { landlord: existing.landlord })?;

    let ValidJson(body) = body?;
    let patch: PropertyPatch = dto::decode_patch(body, PROPERTY_UPDATE_FIELDS)?;

    let now = Utc::now();
    let property = services
        .properties
        .update(
            id,
            Box::new(move |p: &mut Property| -> Result<(), StoreError> { Ok(patch.apply(p, now)?) }),
        )
        .await
        .map_err(store_error)?;

    Ok(errors::success(
        StatusCode::OK,
        "Property updated successfully",
        PropertyPayload { property: property.into() },
    ))
}

pub async fn delete_property(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let actor = principal.as_ref().map(|Extension(p)| p.actor());
    let actor = roomshare_auth::require_session(actor.as_ref()).copied()?;
    let id = parse_property_id(&id)?;

    let existing = services.properties.get(id).await?.ok_or_else(property_not_found)?;
    authorize_property(Some(&actor), PropertyAction::Delete { landlord: existing.landlord })?;

    if !services.properties.delete(id).await? {
        return Err(property_not_found());
    }
    tracing::info!(property_id = %id, landlord = %actor.user_id, "property deleted");

    Ok(errors::success(StatusCode::OK, "Property deleted successfully", ()))
}

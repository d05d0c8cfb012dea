//! Listing query builder.
//!
//! Two front doors produce the same [`ListingQuery`]:
//! - [`ListingQuery::from_params`] for query strings: anything unparsable is
//!   treated as absent and the page size is clamped.
//! - [`ListingQuery::from_search`] for search bodies: every supplied value is
//!   checked and all failures are reported together.
//!
//! Stores either evaluate the query in memory through [`ListingQuery::paginate`]
//! or translate it to their own query language; both must agree with
//! [`ListingQuery::matches`] and [`Sort::compare`].

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use roomshare_core::{UserId, ValidationErrors};

use crate::property::{Amenity, Coordinates, Property, PropertyType, parse_date};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

const EARTH_RADIUS_KM: f64 = 6371.0;

// ─────────────────────────────────────────────────────────────────────────────
// Paging
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request, replacing zero with the defaults and clamping the
    /// size to [`MAX_PAGE_SIZE`].
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_properties: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit));
        Self {
            current_page: request.page,
            total_pages,
            total_properties: total,
            has_next: u64::from(request.page) < total_pages,
            has_prev: request.page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub properties: Vec<Property>,
    pub pagination: Pagination,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sorting
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Rent,
    Deposit,
    Views,
    AvailableFrom,
    TotalRooms,
    AvailableRooms,
    Bathrooms,
    Title,
    AverageRating,
}

impl SortField {
    pub const ALL: [SortField; 11] = [
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::Rent,
        SortField::Deposit,
        SortField::Views,
        SortField::AvailableFrom,
        SortField::TotalRooms,
        SortField::AvailableRooms,
        SortField::Bathrooms,
        SortField::Title,
        SortField::AverageRating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Rent => "rent",
            SortField::Deposit => "deposit",
            SortField::Views => "views",
            SortField::AvailableFrom => "availableFrom",
            SortField::TotalRooms => "totalRooms",
            SortField::AvailableRooms => "availableRooms",
            SortField::Bathrooms => "bathrooms",
            SortField::Title => "title",
            SortField::AverageRating => "averageRating",
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(()),
        }
    }
}

/// Sort key plus direction. Ties break on the listing id in the same
/// direction, so equal keys still produce a total order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        let by_key = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Rent => a.rent.total_cmp(&b.rent),
            SortField::Deposit => a.deposit.total_cmp(&b.deposit),
            SortField::Views => a.views.cmp(&b.views),
            SortField::AvailableFrom => a.available_from.cmp(&b.available_from),
            SortField::TotalRooms => a.total_rooms.cmp(&b.total_rooms),
            SortField::AvailableRooms => a.available_rooms.cmp(&b.available_rooms),
            SortField::Bathrooms => a.bathrooms.cmp(&b.bathrooms),
            SortField::Title => a.title.cmp(&b.title),
            SortField::AverageRating => a.average_rating.total_cmp(&b.average_rating),
        };
        let ordering = by_key.then_with(|| a.id.cmp(&b.id));
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope & filters
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl FromStr for StatusFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            _ => Err(()),
        }
    }
}

/// Which listings a query may see before any filter applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Active listings with at least one available room.
    #[default]
    Public,
    /// One landlord's active listings, whatever their availability.
    Landlord(UserId),
    /// The caller's own listings.
    Owned { landlord: UserId, status: StatusFilter },
}

impl Visibility {
    pub fn admits(&self, property: &Property) -> bool {
        match *self {
            Visibility::Public => property.is_publicly_listed(),
            Visibility::Landlord(landlord) => property.landlord == landlord && property.is_active,
            Visibility::Owned { landlord, status } => {
                property.landlord == landlord
                    && match status {
                        StatusFilter::All => true,
                        StatusFilter::Active => property.is_active,
                        StatusFilter::Inactive => !property.is_active,
                    }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoRadius {
    pub coordinates: Coordinates,
    /// Kilometres.
    pub radius: f64,
}

impl GeoRadius {
    pub fn contains(&self, point: &Coordinates) -> bool {
        haversine_km(&self.coordinates, point) <= self.radius
    }
}

fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Filter dimensions, AND-ed together. Within `amenities` and `search` a
/// single match suffices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_types: Vec<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_available_rooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_total_rooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total_rooms: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<Amenity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_by: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoRadius>,
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl ListingFilter {
    pub fn matches(&self, p: &Property) -> bool {
        if let Some(geo) = &self.geo {
            match &p.address.coordinates {
                Some(c) if geo.contains(c) => {}
                _ => return false,
            }
        } else {
            if let Some(city) = &self.city {
                if !contains_ci(&p.address.city, &city.to_lowercase()) {
                    return false;
                }
            }
            if let Some(state) = &self.state {
                if !contains_ci(&p.address.state, &state.to_lowercase()) {
                    return false;
                }
            }
        }
        if !self.property_types.is_empty() && !self.property_types.contains(&p.property_type) {
            return false;
        }
        if self.min_rent.is_some_and(|min| p.rent < min) || self.max_rent.is_some_and(|max| p.rent > max) {
            return false;
        }
        if self.min_bathrooms.is_some_and(|min| p.bathrooms < min) {
            return false;
        }
        if self.min_available_rooms.is_some_and(|min| p.available_rooms < min) {
            return false;
        }
        if self.min_total_rooms.is_some_and(|min| p.total_rooms < min)
            || self.max_total_rooms.is_some_and(|max| p.total_rooms > max)
        {
            return false;
        }
        if !self.amenities.is_empty() && !self.amenities.iter().any(|a| p.amenities.contains(a)) {
            return false;
        }
        if self.available_by.is_some_and(|by| p.available_from > by) {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = [
                p.title.as_str(),
                p.description.as_str(),
                p.address.street.as_str(),
                p.address.city.as_str(),
            ]
            .into_iter()
            .any(|field| contains_ci(field, &term));
            if !hit {
                return false;
            }
        }
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub visibility: Visibility,
    pub filter: ListingFilter,
    pub sort: Sort,
    pub page: PageRequest,
}

impl ListingQuery {
    /// One landlord's public listings, newest first.
    pub fn by_landlord(landlord: UserId, page: PageRequest) -> Self {
        Self {
            visibility: Visibility::Landlord(landlord),
            page,
            ..Self::default()
        }
    }

    /// The caller's own listings, newest first.
    pub fn owned(landlord: UserId, status: StatusFilter, page: PageRequest) -> Self {
        Self {
            visibility: Visibility::Owned { landlord, status },
            page,
            ..Self::default()
        }
    }

    pub fn matches(&self, property: &Property) -> bool {
        self.visibility.admits(property) && self.filter.matches(property)
    }

    /// Evaluate the query over a full set of listings.
    pub fn paginate(&self, listings: impl IntoIterator<Item = Property>) -> ListingPage {
        let mut matched: Vec<Property> = listings.into_iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));

        let total = matched.len() as u64;
        let offset = usize::try_from(self.page.offset()).unwrap_or(usize::MAX);
        let properties = matched
            .into_iter()
            .skip(offset)
            .take(self.page.limit() as usize)
            .collect();

        ListingPage {
            properties,
            pagination: Pagination::new(self.page, total),
        }
    }

    /// Lenient construction from query-string parameters.
    pub fn from_params(params: &ListParams) -> Self {
        fn parsed<T: FromStr>(raw: &Option<String>) -> Option<T> {
            raw.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .and_then(|s| s.parse().ok())
        }
        fn non_blank(raw: &Option<String>) -> Option<String> {
            raw.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }
        let finite = |raw: &Option<String>| parsed::<f64>(raw).filter(|v| v.is_finite());

        let amenities = params
            .amenities
            .as_deref()
            .map(|list| {
                list.split(',')
                    .filter_map(|a| a.trim().parse::<Amenity>().ok())
                    .collect()
            })
            .unwrap_or_default();

        let filter = ListingFilter {
            city: non_blank(&params.city),
            property_types: parsed::<PropertyType>(&params.property_type).into_iter().collect(),
            min_rent: finite(&params.min_rent),
            max_rent: finite(&params.max_rent),
            min_bathrooms: parsed(&params.bathrooms),
            min_available_rooms: parsed(&params.available_rooms),
            amenities,
            available_by: params.available_from.as_deref().and_then(parse_date),
            search: non_blank(&params.search),
            ..ListingFilter::default()
        };

        Self {
            visibility: Visibility::Public,
            filter,
            sort: Sort::new(
                parsed(&params.sort_by).unwrap_or_default(),
                parsed(&params.sort_order).unwrap_or_default(),
            ),
            page: PageRequest::new(parsed(&params.page), parsed(&params.limit)),
        }
    }

    /// Strict construction from a search body.
    pub fn from_search(request: &SearchRequest) -> Result<Self, ValidationErrors> {
        let mut r = StrictReader::default();

        let page = r.uint("page", request.page.as_ref(), 1, u32::MAX, "Page must be a positive integer");
        let limit = r.uint(
            "limit",
            request.limit.as_ref(),
            1,
            MAX_PAGE_SIZE,
            "Limit must be between 1 and 50",
        );
        let sort_field = r.keyword::<SortField>("sortBy", request.sort_by.as_ref(), "Invalid sort field");
        let sort_order = r.keyword::<SortOrder>(
            "sortOrder",
            request.sort_order.as_ref(),
            "Sort order must be asc or desc",
        );

        let mut filter = ListingFilter::default();
        if let Some(f) = &request.filters {
            if let Some(location) = &f.location {
                filter.city = r.text("filters.location.city", location.city.as_ref());
                filter.state = r.text("filters.location.state", location.state.as_ref());
                let center = r.coordinates("filters.location.coordinates", location.coordinates.as_ref());
                let radius = r.number("filters.location.radius", location.radius.as_ref(), "Radius must be a positive number");
                match (center, radius) {
                    (Some(coordinates), Some(radius)) => {
                        filter.geo = Some(GeoRadius { coordinates, radius });
                    }
                    (Some(_), None) => r.errors.push("filters.location.radius", "Radius is required with coordinates"),
                    (None, Some(_)) => r.errors.push(
                        "filters.location.coordinates",
                        "Coordinates are required with radius",
                    ),
                    (None, None) => {}
                }
            }
            if let Some(range) = &f.price_range {
                filter.min_rent = r.number(
                    "filters.priceRange.min",
                    range.min.as_ref(),
                    "Minimum rent must be a positive number",
                );
                filter.max_rent = r.number(
                    "filters.priceRange.max",
                    range.max.as_ref(),
                    "Maximum rent must be a positive number",
                );
            }
            filter.property_types = r.keyword_list(
                "filters.propertyType",
                f.property_type.as_ref(),
                "Invalid property type",
            );
            filter.amenities = r.keyword_list("filters.amenities", f.amenities.as_ref(), "Invalid amenity");
            if let Some(rooms) = &f.rooms {
                filter.min_total_rooms = r.uint(
                    "filters.rooms.min",
                    rooms.min.as_ref(),
                    0,
                    u32::MAX,
                    "Minimum rooms must be a non-negative integer",
                );
                filter.max_total_rooms = r.uint(
                    "filters.rooms.max",
                    rooms.max.as_ref(),
                    0,
                    u32::MAX,
                    "Maximum rooms must be a non-negative integer",
                );
            }
            filter.min_bathrooms = r.uint(
                "filters.bathrooms",
                f.bathrooms.as_ref(),
                0,
                u32::MAX,
                "Bathrooms must be a non-negative integer",
            );
            filter.min_available_rooms = r.uint(
                "filters.availableRooms",
                f.available_rooms.as_ref(),
                0,
                u32::MAX,
                "Available rooms must be a non-negative integer",
            );
            filter.available_by = r.date("filters.availableFrom", f.available_from.as_ref());
            filter.search = r.text("filters.search", f.search.as_ref());
        }

        if let (Some(min), Some(max)) = (filter.min_rent, filter.max_rent) {
            if min > max {
                r.errors.push("filters.priceRange", "Minimum rent cannot exceed maximum rent");
            }
        }

        r.errors.finish(Self {
            visibility: Visibility::Public,
            filter,
            sort: Sort::new(sort_field.unwrap_or_default(), sort_order.unwrap_or_default()),
            page: PageRequest::new(page, limit),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Query-string parameters of the public listing endpoint, kept as raw text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub min_rent: Option<String>,
    pub max_rent: Option<String>,
    pub bathrooms: Option<String>,
    pub amenities: Option<String>,
    pub available_rooms: Option<String>,
    pub available_from: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    /// Build from decoded query pairs. A repeated key keeps its last value,
    /// except `amenities`, whose values accumulate. Unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            let slot = match key.as_ref() {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "city" => &mut params.city,
                "propertyType" => &mut params.property_type,
                "minRent" => &mut params.min_rent,
                "maxRent" => &mut params.max_rent,
                "bathrooms" => &mut params.bathrooms,
                "availableRooms" => &mut params.available_rooms,
                "availableFrom" => &mut params.available_from,
                "sortBy" => &mut params.sort_by,
                "sortOrder" => &mut params.sort_order,
                "search" => &mut params.search,
                "amenities" => {
                    params.amenities = Some(match params.amenities.take() {
                        Some(prev) => format!("{prev},{value}"),
                        None => value,
                    });
                    continue;
                }
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

/// Search body. Values stay as JSON so each one can be checked individually.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub page: Option<Value>,
    pub limit: Option<Value>,
    pub filters: Option<SearchFilters>,
    pub sort_by: Option<Value>,
    pub sort_order: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub location: Option<LocationFilter>,
    pub price_range: Option<RangeFilter>,
    pub property_type: Option<Value>,
    pub amenities: Option<Value>,
    pub rooms: Option<RangeFilter>,
    pub bathrooms: Option<Value>,
    pub available_rooms: Option<Value>,
    pub available_from: Option<Value>,
    pub search: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationFilter {
    pub city: Option<Value>,
    pub state: Option<Value>,
    pub coordinates: Option<Value>,
    pub radius: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeFilter {
    pub min: Option<Value>,
    pub max: Option<Value>,
}

/// Reads loosely typed JSON values, recording one error per bad field.
///
/// `null` counts as absent. Numbers may arrive as JSON numbers or numeric
/// strings.
#[derive(Default)]
struct StrictReader {
    errors: ValidationErrors,
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

impl StrictReader {
    fn raw_number(value: &Value) -> Option<f64> {
        let n: Option<f64> = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        n.filter(|v| v.is_finite())
    }

    fn number(&mut self, field: &str, value: Option<&Value>, message: &str) -> Option<f64> {
        let value = present(value)?;
        match Self::raw_number(value) {
            Some(n) if n >= 0.0 => Some(n),
            _ => {
                self.errors.push(field, message);
                None
            }
        }
    }

    fn uint(&mut self, field: &str, value: Option<&Value>, min: u32, max: u32, message: &str) -> Option<u32> {
        let value = present(value)?;
        let parsed = Self::raw_number(value)
            .filter(|n| n.fract() == 0.0 && *n >= f64::from(min) && *n <= f64::from(max))
            .map(|n| n as u32);
        if parsed.is_none() {
            self.errors.push(field, message);
        }
        parsed
    }

    fn text(&mut self, field: &str, value: Option<&Value>) -> Option<String> {
        match present(value)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.trim().to_string()),
            _ => {
                self.errors.push(field, format!("{field} must be a string"));
                None
            }
        }
    }

    fn keyword<T: FromStr>(&mut self, field: &str, value: Option<&Value>, message: &str) -> Option<T> {
        let value = present(value)?;
        let parsed = value.as_str().and_then(|s| s.parse().ok());
        if parsed.is_none() {
            self.errors.push(field, message);
        }
        parsed
    }

    /// A single keyword or an array of them.
    fn keyword_list<T: FromStr>(&mut self, field: &str, value: Option<&Value>, message: &str) -> Vec<T> {
        let Some(value) = present(value) else {
            return Vec::new();
        };
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| self.keyword(&format!("{field}[{i}]"), Some(item), message))
                .collect(),
            single => self.keyword(field, Some(single), message).into_iter().collect(),
        }
    }

    fn date(&mut self, field: &str, value: Option<&Value>) -> Option<DateTime<Utc>> {
        let value = present(value)?;
        let parsed = value.as_str().and_then(parse_date);
        if parsed.is_none() {
            self.errors.push(field, "Please provide a valid date");
        }
        parsed
    }

    fn coordinates(&mut self, field: &str, value: Option<&Value>) -> Option<Coordinates> {
        let value = present(value)?;
        let lat = value.get("lat").and_then(Self::raw_number);
        let lng = value.get("lng").and_then(Self::raw_number);
        match (lat, lng) {
            (Some(lat), Some(lng)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) => {
                Some(Coordinates { lat, lng })
            }
            _ => {
                self.errors.push(field, "Coordinates must include a valid lat and lng");
                None
            }
        }
    }
}

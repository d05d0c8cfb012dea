//! `roomshare-listings`: the property record, its validation and
//! patching rules, the listing query builder and aggregate statistics.
//!
//! Pure domain code; stores in `roomshare-infra` evaluate the queries built
//! here.

pub mod property;
pub mod query;
pub mod stats;

pub use property::{
    Address, AddressPatch, Amenity, Coordinates, GenderPreference, LeaseDuration, NewProperty, Property,
    PropertyPatch, PropertyType, Rules, RulesPatch, Utilities, UtilitiesPatch, parse_date,
};
pub use query::{
    GeoRadius, ListParams, ListingFilter, ListingPage, ListingQuery, LocationFilter, MAX_PAGE_SIZE,
    PageRequest, Pagination, RangeFilter, SearchFilters, SearchRequest, Sort, SortField, SortOrder,
    StatusFilter, Visibility,
};
pub use stats::{CityStats, GeneralStats, LandlordStats, ListingStats, PropertyTypeStats};

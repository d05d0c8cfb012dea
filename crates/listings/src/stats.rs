//! Aggregate listing statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::property::{Property, PropertyType};

pub const TOP_CITIES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStats {
    pub total_properties: u64,
    pub average_rent: f64,
    pub min_rent: f64,
    pub max_rent: f64,
    pub total_available_rooms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTypeStats {
    pub property_type: PropertyType,
    pub count: u64,
    pub average_rent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStats {
    pub city: String,
    pub count: u64,
    pub average_rent: f64,
}

/// Marketplace-wide figures over active listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingStats {
    pub general: GeneralStats,
    pub by_property_type: Vec<PropertyTypeStats>,
    pub by_city: Vec<CityStats>,
}

#[derive(Default)]
struct RentAccumulator {
    count: u64,
    sum: f64,
}

impl RentAccumulator {
    fn add(&mut self, rent: f64) {
        self.count += 1;
        self.sum += rent;
    }

    fn average(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.sum / self.count as f64 }
    }
}

impl ListingStats {
    /// Summarize `listings`, skipping inactive ones.
    pub fn summarize<'a>(listings: impl IntoIterator<Item = &'a Property>) -> Self {
        let mut all = RentAccumulator::default();
        let mut min_rent = f64::INFINITY;
        let mut max_rent = f64::NEG_INFINITY;
        let mut total_available_rooms = 0u64;
        let mut by_type: BTreeMap<&'static str, (PropertyType, RentAccumulator)> = BTreeMap::new();
        let mut by_city: BTreeMap<&str, RentAccumulator> = BTreeMap::new();

        for p in listings.into_iter().filter(|p| p.is_active) {
            all.add(p.rent);
            min_rent = min_rent.min(p.rent);
            max_rent = max_rent.max(p.rent);
            total_available_rooms += u64::from(p.available_rooms);
            by_type
                .entry(p.property_type.as_str())
                .or_insert_with(|| (p.property_type, RentAccumulator::default()))
                .1
                .add(p.rent);
            by_city.entry(p.address.city.as_str()).or_default().add(p.rent);
        }

        if all.count == 0 {
            return Self::default();
        }

        let by_property_type = by_type
            .into_values()
            .map(|(property_type, acc)| PropertyTypeStats {
                property_type,
                count: acc.count,
                average_rent: acc.average(),
            })
            .collect();

        let mut by_city: Vec<CityStats> = by_city
            .into_iter()
            .map(|(city, acc)| CityStats {
                city: city.to_string(),
                count: acc.count,
                average_rent: acc.average(),
            })
            .collect();
        by_city.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.city.cmp(&b.city)));
        by_city.truncate(TOP_CITIES);

        Self {
            general: GeneralStats {
                total_properties: all.count,
                average_rent: all.average(),
                min_rent,
                max_rent,
                total_available_rooms,
            },
            by_property_type,
            by_city,
        }
    }
}

/// Dashboard figures over every listing a landlord owns, active or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordStats {
    pub total_properties: u64,
    pub active_properties: u64,
    pub total_views: u64,
    pub average_rent: f64,
}

impl LandlordStats {
    pub fn summarize<'a>(listings: impl IntoIterator<Item = &'a Property>) -> Self {
        let mut rent = RentAccumulator::default();
        let mut stats = Self::default();
        for p in listings {
            rent.add(p.rent);
            if p.is_active {
                stats.active_properties += 1;
            }
            stats.total_views += p.views;
        }
        stats.total_properties = rent.count;
        stats.average_rent = rent.average();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::tests::sample_property;

    fn listing(city: &str, property_type: PropertyType, rent: f64, active: bool) -> Property {
        let mut p = sample_property();
        p.address.city = city.to_string();
        p.property_type = property_type;
        p.rent = rent;
        p.is_active = active;
        p
    }

    #[test]
    fn empty_marketplace_has_zeroed_stats() {
        let stats = ListingStats::summarize(&[]);
        assert_eq!(stats, ListingStats::default());
    }

    #[test]
    fn inactive_listings_are_excluded() {
        let listings = vec![
            listing("Kathmandu", PropertyType::Room, 10_000.0, true),
            listing("Kathmandu", PropertyType::Room, 30_000.0, true),
            listing("Pokhara", PropertyType::House, 90_000.0, false),
        ];
        let stats = ListingStats::summarize(&listings);
        assert_eq!(stats.general.total_properties, 2);
        assert_eq!(stats.general.average_rent, 20_000.0);
        assert_eq!(stats.general.min_rent, 10_000.0);
        assert_eq!(stats.general.max_rent, 30_000.0);
        assert_eq!(stats.by_property_type.len(), 1);
        assert_eq!(stats.by_city.len(), 1);
    }

    #[test]
    fn cities_sorted_by_count_then_name_and_capped() {
        let mut listings = Vec::new();
        for i in 0..12 {
            listings.push(listing(&format!("City{i:02}"), PropertyType::Room, 100.0, true));
        }
        listings.push(listing("City11", PropertyType::Studio, 300.0, true));

        let stats = ListingStats::summarize(&listings);
        assert_eq!(stats.by_city.len(), TOP_CITIES);
        assert_eq!(stats.by_city[0].city, "City11");
        assert_eq!(stats.by_city[0].count, 2);
        assert_eq!(stats.by_city[0].average_rent, 200.0);
        assert_eq!(stats.by_city[1].city, "City00");
        assert_eq!(stats.by_property_type[0].property_type, PropertyType::Room);
        assert_eq!(stats.by_property_type[1].property_type, PropertyType::Studio);
    }

    #[test]
    fn landlord_stats_cover_inactive_listings() {
        let mut a = listing("Kathmandu", PropertyType::Room, 10_000.0, true);
        a.views = 4;
        let mut b = listing("Kathmandu", PropertyType::Room, 20_000.0, false);
        b.views = 1;
        let stats = LandlordStats::summarize(&[a, b]);
        assert_eq!(
            stats,
            LandlordStats {
                total_properties: 2,
                active_properties: 1,
                total_views: 5,
                average_rent: 15_000.0,
            }
        );
    }
}

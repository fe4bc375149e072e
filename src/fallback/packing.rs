//! Fixed packing catalog

use crate::models::{Interest, PackingItem};

struct CatalogEntry {
    name: &'static str,
    category: &'static str,
    essential: bool,
    weather_dependent: bool,
    activities: &'static [Interest],
}

const fn item(name: &'static str, category: &'static str, essential: bool) -> CatalogEntry {
    CatalogEntry {
        name,
        category,
        essential,
        weather_dependent: false,
        activities: &[],
    }
}

const fn weather_item(
    name: &'static str,
    category: &'static str,
    essential: bool,
) -> CatalogEntry {
    CatalogEntry {
        weather_dependent: true,
        ..item(name, category, essential)
    }
}

const fn activity_item(
    name: &'static str,
    category: &'static str,
    activities: &'static [Interest],
) -> CatalogEntry {
    CatalogEntry {
        activities,
        ..item(name, category, false)
    }
}

const CATALOG: [CatalogEntry; 25] = [
    item("Passport and ID", "Documents", true),
    item("Travel Insurance Documents", "Documents", true),
    item("Credit Cards and Cash", "Documents", true),
    item("Phone and Charger", "Electronics", true),
    item("Camera", "Electronics", false),
    item("Power Adapter", "Electronics", true),
    item("T-shirts", "Clothing", true),
    item("Pants/Shorts", "Clothing", true),
    item("Underwear and Socks", "Clothing", true),
    item("Comfortable Walking Shoes", "Footwear", true),
    weather_item("Jacket/Sweater", "Clothing", true),
    weather_item("Rain Jacket", "Weather Gear", false),
    weather_item("Umbrella", "Weather Gear", false),
    weather_item("Sunscreen", "Toiletries", true),
    weather_item("Sunglasses", "Accessories", false),
    weather_item("Hat/Cap", "Accessories", false),
    activity_item(
        "Hiking Boots",
        "Footwear",
        &[Interest::Adventure, Interest::Nature],
    ),
    activity_item("Swimwear", "Clothing", &[Interest::Adventure]),
    item("First Aid Kit", "Health", true),
    item("Prescription Medications", "Health", true),
    item("Water Bottle", "Accessories", true),
    item("Daypack/Small Backpack", "Bags", true),
    item("Travel Pillow", "Comfort", false),
    item("Travel Guide Book", "Entertainment", false),
    item("Portable Charger", "Electronics", false),
];

impl CatalogEntry {
    fn to_item(&self) -> PackingItem {
        PackingItem {
            name: self.name.to_string(),
            category: self.category.to_string(),
            essential: self.essential,
            weather_dependent: self.weather_dependent.then_some(true),
            activity_dependent: (!self.activities.is_empty())
                .then(|| self.activities.iter().copied().collect()),
        }
    }
}

/// The full catalog, independent of the request
///
/// Activity-dependent items are always listed; presentation decides what to
/// highlight with [`PackingItem::is_relevant_to`].
#[must_use]
pub fn packing_list() -> Vec<PackingItem> {
    CATALOG.iter().map(CatalogEntry::to_item).collect()
}

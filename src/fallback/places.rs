//! Points of interest

use crate::models::{Interest, Place, TripRequest};

fn place(
    name: String,
    description: String,
    kind: &str,
    rating: f64,
    visit_duration: &str,
    address: String,
) -> Place {
    Place {
        name,
        description,
        kind: kind.to_string(),
        rating: Some(rating),
        visit_duration: Some(visit_duration.to_string()),
        address: Some(address),
    }
}

/// Six destination-named places, the last one themed on adventure interest
#[must_use]
pub fn places(request: &TripRequest) -> Vec<Place> {
    let destination = request.destination();

    let last = if request.has_interest(Interest::Adventure) {
        place(
            format!("{destination} Adventure Park"),
            "Get your adrenaline pumping with various adventure activities like zip-lining and rock climbing.".into(),
            "Adventure",
            4.6,
            "Full day",
            format!("Adventure Road, {destination}"),
        )
    } else {
        place(
            format!("{destination} Botanical Gardens"),
            "Stroll through beautiful gardens featuring local and exotic plant species.".into(),
            "Nature",
            4.6,
            "2-3 hours",
            format!("Garden Road, {destination}"),
        )
    };

    vec![
        place(
            format!("{destination} Historical Museum"),
            format!(
                "Discover the rich history of {destination} through interactive exhibits and ancient artifacts."
            ),
            "Historical",
            4.7,
            "2-3 hours",
            format!("123 Museum Ave, {destination}"),
        ),
        place(
            format!("{destination} National Park"),
            format!(
                "Experience the natural beauty of {destination} with stunning landscapes and diverse wildlife."
            ),
            "Nature",
            4.9,
            "Half day",
            format!("National Park Road, {destination}"),
        ),
        place(
            format!("{destination} Cultural Center"),
            "Immerse yourself in the local culture through art exhibitions, performances, and workshops.".into(),
            "Cultural",
            4.5,
            "1-2 hours",
            format!("45 Culture St, {destination}"),
        ),
        place(
            format!("{destination} Marketplace"),
            "Shop for local crafts, souvenirs, and taste authentic street food at this bustling market.".into(),
            "Shopping",
            4.3,
            "2 hours",
            format!("Market Square, {destination}"),
        ),
        place(
            format!("{destination} Viewpoint"),
            "Enjoy panoramic views of the entire city from this elevated viewpoint.".into(),
            "Sightseeing",
            4.8,
            "1 hour",
            format!("Hilltop Road, {destination}"),
        ),
        last,
    ]
}

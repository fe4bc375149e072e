//! Daily activity schedule

use crate::models::{Activity, DayPlan, Interest, TripRequest};

fn activity(time: &str, title: &str, description: String, location: &str) -> Activity {
    Activity {
        time: time.to_string(),
        title: title.to_string(),
        description,
        location: Some(location.to_string()),
    }
}

/// Plan for the `index`-th day of the trip
///
/// Every day has a meal plus a themed activity in each slot. Themes follow
/// the selected interests; variants alternate on even and odd days.
#[must_use]
pub fn day_plan(request: &TripRequest, index: usize) -> DayPlan {
    DayPlan {
        date: request.date_of_day(index),
        morning: vec![breakfast(request), morning_outing(request)],
        afternoon: vec![lunch(request), afternoon_outing(request, index)],
        evening: vec![dinner(request), night(request, index)],
    }
}

fn breakfast(request: &TripRequest) -> Activity {
    let description = if request.has_interest(Interest::Culinary) {
        "Enjoy a local breakfast at a popular café with authentic cuisine."
    } else {
        "Breakfast at the hotel or a nearby café."
    };
    activity("8:00 AM - 9:00 AM", "Breakfast", description.into(), "Local Café")
}

fn morning_outing(request: &TripRequest) -> Activity {
    let destination = request.destination();
    let (title, description, location) = if request.has_interest(Interest::Historical) {
        (
            "Historical Site Visit",
            format!("Explore the historical landmarks of {destination} with a guided tour."),
            "Historical District",
        )
    } else if request.has_interest(Interest::Nature) {
        (
            "Nature Walk",
            format!("Morning hike through the beautiful natural landscapes of {destination}."),
            "Nature Reserve",
        )
    } else {
        (
            "City Tour",
            format!("Guided tour of {destination}'s main attractions."),
            "City Center",
        )
    };
    activity("9:30 AM - 12:00 PM", title, description, location)
}

fn lunch(request: &TripRequest) -> Activity {
    let description = if request.has_interest(Interest::Culinary) {
        "Savor local delicacies at a renowned restaurant."
    } else {
        "Lunch at a recommended restaurant."
    };
    activity(
        "12:30 PM - 2:00 PM",
        "Lunch",
        description.into(),
        "Downtown Restaurant",
    )
}

fn afternoon_outing(request: &TripRequest, index: usize) -> Activity {
    let destination = request.destination();
    let even_day = index % 2 == 0;
    let (title, description, location) = if request.has_interest(Interest::Adventure) {
        let (sport, location) = if even_day {
            ("water sports", "Adventure Park")
        } else {
            ("hiking trails", "Mountain Trails")
        };
        (
            "Adventure Activity",
            format!("Experience thrilling {sport} in {destination}."),
            location,
        )
    } else if request.has_interest(Interest::Sightseeing) {
        (
            "Sightseeing",
            format!("Visit the iconic landmarks of {destination}."),
            "Tourist Attractions",
        )
    } else {
        (
            "Museum Visit",
            format!("Explore the cultural heritage at {destination}'s museums."),
            "National Museum",
        )
    };
    activity("2:30 PM - 5:00 PM", title, description, location)
}

fn dinner(request: &TripRequest) -> Activity {
    let description = if request.has_interest(Interest::Culinary) {
        "Fine dining experience with local specialties and wine pairing."
    } else {
        "Dinner at a popular local restaurant."
    };
    activity(
        "6:00 PM - 7:30 PM",
        "Dinner",
        description.into(),
        "Waterfront Restaurant",
    )
}

fn night(request: &TripRequest, index: usize) -> Activity {
    let destination = request.destination();
    if request.has_interest(Interest::Nightlife) {
        return activity(
            "8:00 PM - 10:00 PM",
            "Nightlife Experience",
            format!(
                "Experience the vibrant nightlife of {destination} with local music and entertainment."
            ),
            "Entertainment District",
        );
    }

    let (stroll, location) = if index % 2 == 0 {
        ("beach", "Beachfront")
    } else {
        ("city streets", "Old Town")
    };
    activity(
        "8:00 PM - 10:00 PM",
        "Evening Relaxation",
        format!("Relaxing evening stroll along the {stroll}."),
        location,
    )
}

//! Offline trip plan synthesis
//!
//! Builds a complete [`TripPlan`] without any remote call, used whenever the
//! model-backed path is unavailable or its output is unusable. Structure is
//! fully determined by the request; only the weather values are drawn from
//! the supplied random source, so a seeded source reproduces a plan exactly.
//!
//! Production callers should seed from entropy ([`synthesize_with_entropy`]);
//! tests pass a fixed seed.

mod itinerary;
mod packing;
mod places;
mod weather;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing::debug;

use crate::models::{TripPlan, TripRequest};

pub use itinerary::day_plan;
pub use packing::packing_list;
pub use places::places;
pub use weather::{CONDITIONS, forecast_day};

/// Synthesize a schema-valid plan for `request`
pub fn synthesize<R: RngExt + ?Sized>(request: &TripRequest, rng: &mut R) -> TripPlan {
    let itinerary = (0..request.day_count())
        .map(|i| day_plan(request, i))
        .collect::<Vec<_>>();
    let weather = request
        .dates()
        .map(|date| forecast_day(date, &mut *rng))
        .collect::<Vec<_>>();

    debug!(
        destination = request.destination(),
        days = itinerary.len(),
        "Synthesized fallback plan"
    );

    TripPlan {
        itinerary,
        places: places(request),
        weather,
        packing_list: packing_list(),
    }
}

/// Synthesize with a reproducible weather sequence
#[must_use]
pub fn synthesize_seeded(request: &TripRequest, seed: u64) -> TripPlan {
    synthesize(request, &mut StdRng::seed_from_u64(seed))
}

/// Synthesize with a fresh, unpredictable weather sequence
#[must_use]
pub fn synthesize_with_entropy(request: &TripRequest) -> TripPlan {
    synthesize_seeded(request, rand::random())
}

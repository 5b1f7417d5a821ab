pub mod availability;
pub mod catalog;

pub use availability::{
    compute_slots, ensure_within_horizon, fits_schedule, AvailabilityError, BookedInterval, SlotQuery,
    BOOKING_HORIZON_DAYS,
};
pub use catalog::CatalogService;

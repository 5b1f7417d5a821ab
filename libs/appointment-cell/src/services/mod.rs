pub mod booking;
pub mod lifecycle;
pub mod notifier;
pub mod slots;
pub mod stats;

pub use booking::BookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use notifier::AvailabilityNotifier;
pub use slots::SlotService;
pub use stats::StatsService;

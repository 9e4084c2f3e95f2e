pub mod availability;
pub mod consistency;
pub mod ledger;
pub mod lifecycle;
pub mod pricing;

pub use availability::AvailabilityChecker;
pub use ledger::AppointmentLedger;
pub use pricing::{DiscountPolicy, PriceQuote, PricingResolver};

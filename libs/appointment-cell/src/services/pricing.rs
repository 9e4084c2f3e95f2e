use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use doctor_cell::Doctor;

use crate::models::{round_cents, BookableItem, SpecialPackage};

/// Which discount, if any, shaped a final price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    None,
    /// Fixed package discount baked in when the bundle was built.
    PackageFixed,
    /// Per-doctor discount applied to a custom package at booking.
    DoctorBooking,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    pub item_name: String,
    pub base_price: f64,
    pub policy: DiscountPolicy,
    pub discount_rate: f64,
    pub discount_amount: f64,
    pub final_price: f64,
}

pub struct PricingResolver;

impl Default for PricingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingResolver {
    pub fn new() -> Self {
        Self
    }

    /// Final price of `item`. Supplying a doctor means the item is being
    /// booked with that doctor; only custom packages react to it.
    pub fn resolve_price(&self, item: &BookableItem, doctor: Option<&Doctor>) -> f64 {
        self.quote(item, doctor).final_price
    }

    pub fn quote(&self, item: &BookableItem, doctor: Option<&Doctor>) -> PriceQuote {
        debug!("Pricing '{}' (booking doctor: {:?})", item.name(), doctor.map(|d| d.name.as_str()));

        let quote = match item {
            BookableItem::Service(service) => PriceQuote {
                item_name: service.name.clone(),
                base_price: service.price,
                policy: DiscountPolicy::None,
                discount_rate: 0.0,
                discount_amount: 0.0,
                final_price: service.price,
            },
            BookableItem::SpecialPackage(package) => {
                let base_price = round_cents(package.raw_price());
                PriceQuote {
                    item_name: package.name().to_string(),
                    base_price,
                    policy: DiscountPolicy::PackageFixed,
                    discount_rate: SpecialPackage::DISCOUNT_RATE,
                    discount_amount: round_cents(base_price - package.price()),
                    final_price: package.price(),
                }
            }
            BookableItem::CustomPackage(package) => {
                let base_price = round_cents(package.raw_price());
                let rate = doctor.map(doctor_discount_rate).unwrap_or(0.0);

                if rate > 0.0 {
                    let final_price = round_cents(base_price * (1.0 - rate));
                    PriceQuote {
                        item_name: package.name().to_string(),
                        base_price,
                        policy: DiscountPolicy::DoctorBooking,
                        discount_rate: rate,
                        discount_amount: round_cents(base_price - final_price),
                        final_price,
                    }
                } else {
                    PriceQuote {
                        item_name: package.name().to_string(),
                        base_price,
                        policy: DiscountPolicy::None,
                        discount_rate: 0.0,
                        discount_amount: 0.0,
                        final_price: base_price,
                    }
                }
            }
        };

        info!("Calculated price: {:.2} for '{}' ({:?})", quote.final_price, quote.item_name, quote.policy);
        quote
    }
}

fn doctor_discount_rate(doctor: &Doctor) -> f64 {
    let rate = doctor.discount_rate;
    if !rate.is_finite() {
        warn!("Doctor {} has a non-numeric discount rate, ignoring it", doctor.name);
        return 0.0;
    }
    if !(0.0..=1.0).contains(&rate) {
        warn!("Doctor {} discount rate {} out of range, clamping", doctor.name, rate);
    }
    rate.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomPackage, Service};

    fn service(id: &str, price: f64) -> Service {
        Service {
            id: id.to_string(),
            name: format!("Service {}", id),
            category: "Skin".to_string(),
            price,
        }
    }

    fn doctor_with_rate(rate: f64) -> Doctor {
        Doctor {
            id: "D009".to_string(),
            name: "Nadia Shah".to_string(),
            specialization: "Laser".to_string(),
            contact: None,
            working_days: "Monday to Friday".to_string(),
            working_hours: "9:00am to 5:00pm".to_string(),
            discount_rate: rate,
            age: None,
            gender: None,
        }
    }

    fn custom_package_worth_1000() -> BookableItem {
        CustomPackage::new("My Glow Plan", vec![service("S01", 600.0), service("S02", 400.0)])
            .unwrap()
            .into()
    }

    #[test]
    fn test_service_price_ignores_doctor() {
        let resolver = PricingResolver::new();
        let item: BookableItem = service("L01", 5000.0).into();

        assert_eq!(resolver.resolve_price(&item, None), 5000.0);
        assert_eq!(resolver.resolve_price(&item, Some(&doctor_with_rate(0.3))), 5000.0);
    }

    #[test]
    fn test_custom_package_doctor_discount_at_booking() {
        let resolver = PricingResolver::new();
        let item = custom_package_worth_1000();

        let quote = resolver.quote(&item, Some(&doctor_with_rate(0.10)));
        assert_eq!(quote.final_price, 900.0);
        assert_eq!(quote.discount_amount, 100.0);
        assert_eq!(quote.policy, DiscountPolicy::DoctorBooking);
    }

    #[test]
    fn test_custom_package_without_booking_context() {
        let resolver = PricingResolver::new();
        let item = custom_package_worth_1000();

        let quote = resolver.quote(&item, None);
        assert_eq!(quote.final_price, 1000.0);
        assert_eq!(quote.policy, DiscountPolicy::None);
        assert_eq!(item.nominal_price(), 1000.0);
    }

    #[test]
    fn test_special_package_fixed_discount_regardless_of_doctor() {
        let resolver = PricingResolver::new();
        let item: BookableItem = SpecialPackage::new(
            "Laser Golden Package",
            vec![service("L01", 6000.0), service("L02", 4000.0)],
        )
        .unwrap()
        .into();

        for doctor in [None, Some(doctor_with_rate(0.0)), Some(doctor_with_rate(0.5))] {
            let quote = resolver.quote(&item, doctor.as_ref());
            assert_eq!(quote.final_price, 8500.0);
            assert_eq!(quote.base_price, 10000.0);
            assert_eq!(quote.discount_amount, 1500.0);
            assert_eq!(quote.policy, DiscountPolicy::PackageFixed);
        }
    }

    #[test]
    fn test_out_of_range_rates_are_clamped() {
        let resolver = PricingResolver::new();
        let item = custom_package_worth_1000();

        assert_eq!(resolver.resolve_price(&item, Some(&doctor_with_rate(-0.2))), 1000.0);
        assert_eq!(resolver.resolve_price(&item, Some(&doctor_with_rate(1.7))), 0.0);
        assert_eq!(resolver.resolve_price(&item, Some(&doctor_with_rate(f64::NAN))), 1000.0);
    }

    #[test]
    fn test_prices_round_to_cents() {
        let resolver = PricingResolver::new();
        let item: BookableItem = CustomPackage::new("Odd", vec![service("S03", 333.33)])
            .unwrap()
            .into();

        assert_eq!(resolver.resolve_price(&item, Some(&doctor_with_rate(0.15))), 283.33);
    }
}

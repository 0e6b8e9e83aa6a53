//! Static shop information: services with prices, opening hours, location.

use serde::Serialize;

use crate::models::{ServiceType, TIME_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceOffering {
    pub id: &'static str,
    pub title: &'static str,
    pub price: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpeningHours {
    pub weekdays: &'static str,
    pub saturday: &'static str,
    pub sunday: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub city: &'static str,
    pub country: &'static str,
    pub address: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
}

pub const SERVICES: &[ServiceOffering] = &[
    ServiceOffering {
        id: "mens-haircut",
        title: "Men's Haircut",
        price: "$25",
        description: "Professional cuts tailored to your style and face shape.",
        features: &["Consultation", "Wash & style", "Hot towel finish"],
    },
    ServiceOffering {
        id: "womens-haircut",
        title: "Women's Haircut",
        price: "$45",
        description: "Expert styling for all hair lengths and textures.",
        features: &["Style consultation", "Precision cutting", "Blow dry styling"],
    },
    ServiceOffering {
        id: "beard-service",
        title: "Beard Service",
        price: "$15",
        description: "Complete beard grooming from trim to hot towel shave.",
        features: &["Beard trim", "Hot towel shave", "Beard conditioning"],
    },
    ServiceOffering {
        id: "hair-coloring",
        title: "Hair Coloring",
        price: "$60+",
        description: "Professional coloring services for men and women.",
        features: &["Color consultation", "Full or partial color", "Root touch-up"],
    },
    ServiceOffering {
        id: "hair-treatment",
        title: "Hair Treatment",
        price: "$35",
        description: "Revitalize and strengthen your hair with premium treatments.",
        features: &["Deep conditioning", "Keratin treatment", "Scalp massage"],
    },
    ServiceOffering {
        id: "special-occasions",
        title: "Special Occasions",
        price: "$50+",
        description: "Look your best for weddings, events, and special moments.",
        features: &["Event styling", "Formal updos", "Bridal packages"],
    },
];

pub const HOURS: OpeningHours = OpeningHours {
    weekdays: "Mon - Fri: 5 AM - 11 PM",
    saturday: "Saturday: 6 AM - 9 PM",
    sunday: "Sun: 7 AM - 8 PM",
};

pub const LOCATION: Location = Location {
    city: "Damascus",
    country: "Syria",
    address: "Syria Damascus",
    phone: "+96312345678",
    email: "EliteCuts@gmail.com",
};

/// Everything the public services endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub services: &'static [ServiceOffering],
    pub hours: OpeningHours,
    pub location: Location,
    /// Values accepted as `service_type` when booking.
    pub bookable_services: &'static [ServiceType],
    pub time_slots: &'static [&'static str],
}

pub fn catalog() -> Catalog {
    Catalog {
        services: SERVICES,
        hours: HOURS,
        location: LOCATION,
        bookable_services: ServiceType::ALL,
        time_slots: TIME_SLOTS,
    }
}

/// "Men's Haircut ($25), Women's Haircut ($45), ..."
pub fn price_list(separator: &str) -> String {
    SERVICES
        .iter()
        .map(|s| format!("{} ({})", s.title, s.price))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_ids_unique() {
        let mut ids: Vec<_> = SERVICES.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SERVICES.len());
    }

    #[test]
    fn price_list_formats_titles() {
        let list = price_list(", ");
        assert!(list.starts_with("Men's Haircut ($25), Women's Haircut ($45)"));
        assert!(list.ends_with("Special Occasions ($50+)"));
    }

    #[test]
    fn catalog_serializes_bookable_names() {
        let json = serde_json::to_value(catalog()).unwrap();
        assert_eq!(json["bookable_services"][0], "Men's Haircut");
        assert_eq!(json["time_slots"].as_array().unwrap().len(), 15);
        assert_eq!(json["location"]["city"], "Damascus");
    }
}

/// A South African province and the cities offered in its selector.
#[derive(Debug, Clone, Copy)]
pub struct Province {
    pub key: &'static str,
    pub name: &'static str,
    pub cities: &'static [&'static str],
}

pub const PROVINCES: &[Province] = &[
    Province {
        key: "gauteng",
        name: "Gauteng",
        cities: &["Johannesburg", "Pretoria", "Sandton", "Randburg", "Centurion"],
    },
    Province {
        key: "western-cape",
        name: "Western Cape",
        cities: &["Cape Town", "Stellenbosch", "Paarl", "Worcester"],
    },
    Province {
        key: "kzn",
        name: "KwaZulu-Natal",
        cities: &["Durban", "Pietermaritzburg", "Ballito", "Richards Bay"],
    },
    Province {
        key: "eastern-cape",
        name: "Eastern Cape",
        cities: &["Port Elizabeth", "East London", "Grahamstown"],
    },
    Province {
        key: "free-state",
        name: "Free State",
        cities: &["Bloemfontein", "Welkom", "Bethlehem"],
    },
    Province {
        key: "mpumalanga",
        name: "Mpumalanga",
        cities: &["Nelspruit", "Witbank", "Middleburg"],
    },
    Province {
        key: "limpopo",
        name: "Limpopo",
        cities: &["Polokwane", "Modimolle", "Phalaborwa"],
    },
    Province {
        key: "north-west",
        name: "North West",
        cities: &["Mahikeng", "Rustenburg", "Potchefstroom"],
    },
    Province {
        key: "northern-cape",
        name: "Northern Cape",
        cities: &["Kimberley", "Upington", "Springbok"],
    },
];

pub fn find(key: &str) -> Option<&'static Province> {
    PROVINCES.iter().find(|p| p.key == key)
}

/// Cities for a province key; empty for unknown or blank keys.
pub fn cities_for(key: &str) -> &'static [&'static str] {
    find(key).map(|p| p.cities).unwrap_or(&[])
}

//! Products and accounts known to the simulated backend

/// Product as the storefront renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimProduct {
    pub name: String,
    pub price: String,
    pub description: String,
    pub slug: String,
}

impl SimProduct {
    pub fn new(name: &str, price: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            price: price.to_string(),
            description: description.to_string(),
            slug: slugify(name),
        }
    }
}

/// `Sauce Labs Bike Light` -> `sauce-labs-bike-light`
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

pub fn default_catalog() -> Vec<SimProduct> {
    vec![
        SimProduct::new(
            "Sauce Labs Backpack",
            "$29.99",
            "carry.allTheThings() with the sleek, streamlined Sly Pack that melds uncompromising style with unequaled laptop and tablet protection.",
        ),
        SimProduct::new(
            "Sauce Labs Bike Light",
            "$9.99",
            "A red light isn't the desired state in testing but it sure helps when riding your bike at night. Water-resistant with 3 lighting modes, 1 AAA battery included.",
        ),
        SimProduct::new(
            "Sauce Labs Bolt T-Shirt",
            "$15.99",
            "Get your testing superhero on with the Sauce Labs bolt T-shirt. From American Apparel, 100% ringspun combed cotton, heather gray with red bolt.",
        ),
        SimProduct::new(
            "Sauce Labs Fleece Jacket",
            "$49.99",
            "It's not every day that you come across a midweight quarter-zip fleece jacket capable of handling everything from a relaxing day outdoors to a busy day at the office.",
        ),
        SimProduct::new(
            "Sauce Labs Onesie",
            "$7.99",
            "Rib snap infant onesie for the junior automation engineer in development. Reinforced 3-snap bottom closure, two-needle hemmed sleeved and bottom won't unravel.",
        ),
        SimProduct::new(
            "Test.allTheThings() T-Shirt (Red)",
            "$15.99",
            "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests. Super-soft and comfy ringspun combed cotton.",
        ),
    ]
}

pub const SHARED_PASSWORD: &str = "secret_sauce";

pub const ACCEPTED_USERS: &[&str] = &[
    "standard_user",
    "locked_out_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

pub const LOCKED_USERS: &[&str] = &["locked_out_user"];

pub const MSG_LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
pub const MSG_INVALID: &str =
    "Epic sadface: Username and password do not match any user in this service";
pub const MSG_USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
pub const MSG_PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_match_data_test_ids() {
        assert_eq!(slugify("Sauce Labs Bolt T-Shirt"), "sauce-labs-bolt-t-shirt");
        assert_eq!(
            slugify("Test.allTheThings() T-Shirt (Red)"),
            "test.allthethings()-t-shirt-(red)"
        );
    }

    #[test]
    fn catalog_has_six_products() {
        assert_eq!(default_catalog().len(), 6);
    }
}

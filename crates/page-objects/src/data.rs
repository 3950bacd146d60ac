//! Static test data: accounts, products, error messages and URLs

use serde::Serialize;

/// Login credentials for one storefront account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub username: &'static str,
    pub password: &'static str,
    pub description: &'static str,
}

/// Accounts known to the storefront, plus one that is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UserKind {
    Standard,
    LockedOut,
    Problem,
    PerformanceGlitch,
    Error,
    Visual,
    Invalid,
}

impl UserKind {
    pub const ALL: [UserKind; 7] = [
        UserKind::Standard,
        UserKind::LockedOut,
        UserKind::Problem,
        UserKind::PerformanceGlitch,
        UserKind::Error,
        UserKind::Visual,
        UserKind::Invalid,
    ];

    pub fn credential(self) -> Credential {
        match self {
            UserKind::Standard => users::STANDARD,
            UserKind::LockedOut => users::LOCKED_OUT,
            UserKind::Problem => users::PROBLEM,
            UserKind::PerformanceGlitch => users::PERFORMANCE_GLITCH,
            UserKind::Error => users::ERROR,
            UserKind::Visual => users::VISUAL,
            UserKind::Invalid => users::INVALID,
        }
    }
}

pub mod users {
    use super::Credential;

    const PASSWORD: &str = "secret_sauce";

    pub const STANDARD: Credential = Credential {
        username: "standard_user",
        password: PASSWORD,
        description: "Standard user with normal functionality",
    };

    pub const LOCKED_OUT: Credential = Credential {
        username: "locked_out_user",
        password: PASSWORD,
        description: "User that has been locked out",
    };

    pub const PROBLEM: Credential = Credential {
        username: "problem_user",
        password: PASSWORD,
        description: "User with inventory image problems",
    };

    pub const PERFORMANCE_GLITCH: Credential = Credential {
        username: "performance_glitch_user",
        password: PASSWORD,
        description: "User with performance delays",
    };

    pub const ERROR: Credential = Credential {
        username: "error_user",
        password: PASSWORD,
        description: "User that experiences errors",
    };

    pub const VISUAL: Credential = Credential {
        username: "visual_user",
        password: PASSWORD,
        description: "User with visual differences",
    };

    pub const INVALID: Credential = Credential {
        username: "invalid_user",
        password: "wrong_password",
        description: "Invalid credentials for negative testing",
    };
}

/// Error banners shown by the login form.
pub mod error_messages {
    pub const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
    pub const INVALID_CREDENTIALS: &str =
        "Epic sadface: Username and password do not match any user in this service";
    pub const USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
    pub const PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";
}

/// Catalog entry.
///
/// `primary_selector` targets the product's add-to-cart button and
/// `fallback_selector` its remove button, both by `data-test` id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Product {
    pub name: &'static str,
    pub price: &'static str,
    pub primary_selector: &'static str,
    pub fallback_selector: &'static str,
    pub description: &'static str,
}

impl Product {
    /// `data-test` slug: lower-cased name with spaces as `-`.
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }
}

pub mod products {
    use super::Product;

    pub const BACKPACK: Product = Product {
        name: "Sauce Labs Backpack",
        price: "$29.99",
        primary_selector: r#"[data-test="add-to-cart-sauce-labs-backpack"]"#,
        fallback_selector: r#"[data-test="remove-sauce-labs-backpack"]"#,
        description: "carry.allTheThings() with the sleek, streamlined Sly Pack that melds uncompromising style with unequaled laptop and tablet protection.",
    };

    pub const BIKE_LIGHT: Product = Product {
        name: "Sauce Labs Bike Light",
        price: "$9.99",
        primary_selector: r#"[data-test="add-to-cart-sauce-labs-bike-light"]"#,
        fallback_selector: r#"[data-test="remove-sauce-labs-bike-light"]"#,
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night. Water-resistant with 3 lighting modes, 1 AAA battery included.",
    };

    pub const BOLT_T_SHIRT: Product = Product {
        name: "Sauce Labs Bolt T-Shirt",
        price: "$15.99",
        primary_selector: r#"[data-test="add-to-cart-sauce-labs-bolt-t-shirt"]"#,
        fallback_selector: r#"[data-test="remove-sauce-labs-bolt-t-shirt"]"#,
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt. From American Apparel, 100% ringspun combed cotton, heather gray with red bolt.",
    };

    pub const FLEECE_JACKET: Product = Product {
        name: "Sauce Labs Fleece Jacket",
        price: "$49.99",
        primary_selector: r#"[data-test="add-to-cart-sauce-labs-fleece-jacket"]"#,
        fallback_selector: r#"[data-test="remove-sauce-labs-fleece-jacket"]"#,
        description: "It's not every day that you come across a midweight quarter-zip fleece jacket capable of handling everything from a relaxing day outdoors to a busy day at the office.",
    };

    pub const ONESIE: Product = Product {
        name: "Sauce Labs Onesie",
        price: "$7.99",
        primary_selector: r#"[data-test="add-to-cart-sauce-labs-onesie"]"#,
        fallback_selector: r#"[data-test="remove-sauce-labs-onesie"]"#,
        description: "Rib snap infant onesie for the junior automation engineer in development. Reinforced 3-snap bottom closure, two-needle hemmed sleeved and bottom won't unravel.",
    };

    pub const TEST_T_SHIRT_RED: Product = Product {
        name: "Test.allTheThings() T-Shirt (Red)",
        price: "$15.99",
        primary_selector: r#"[data-test="add-to-cart-test.allthethings()-t-shirt-(red)"]"#,
        fallback_selector: r#"[data-test="remove-test.allthethings()-t-shirt-(red)"]"#,
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests. Super-soft and comfy ringspun combed cotton.",
    };

    pub const ALL: [Product; 6] = [
        BACKPACK,
        BIKE_LIGHT,
        BOLT_T_SHIRT,
        FLEECE_JACKET,
        ONESIE,
        TEST_T_SHIRT_RED,
    ];

    pub fn by_name(name: &str) -> Option<Product> {
        ALL.iter().copied().find(|p| p.name == name)
    }
}

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Page URLs derived from one base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteUrls {
    base: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SiteUrls {
    /// Normalizes `base` to end with exactly one `/`.
    pub fn new(base: &str) -> Self {
        Self {
            base: format!("{}/", base.trim_end_matches('/')),
        }
    }

    pub fn login(&self) -> String {
        self.base.clone()
    }

    pub fn inventory(&self) -> String {
        format!("{}inventory.html", self.base)
    }

    pub fn cart(&self) -> String {
        format!("{}cart.html", self.base)
    }

    pub fn checkout_step_one(&self) -> String {
        format!("{}checkout-step-one.html", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_follow_slug_convention() {
        for product in products::ALL {
            let slug = product.slug();
            assert_eq!(
                product.primary_selector,
                format!("[data-test=\"add-to-cart-{}\"]", slug)
            );
            assert_eq!(
                product.fallback_selector,
                format!("[data-test=\"remove-{}\"]", slug)
            );
        }
    }

    #[test]
    fn only_invalid_user_has_other_password() {
        for kind in UserKind::ALL {
            let cred = kind.credential();
            assert_eq!(cred.password == "secret_sauce", kind != UserKind::Invalid);
        }
    }

    #[test]
    fn urls_from_base() {
        let urls = SiteUrls::new("http://localhost:3000");
        assert_eq!(urls.login(), "http://localhost:3000/");
        assert_eq!(urls.inventory(), "http://localhost:3000/inventory.html");
        assert_eq!(SiteUrls::default().cart(), "https://www.saucedemo.com/cart.html");
    }
}

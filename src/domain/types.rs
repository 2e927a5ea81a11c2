use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Identifier of a registered user.
pub type UserId = Uuid;

/// Identifier of a sneaker record.
pub type SneakerId = Uuid;

/// ISO-style currency of a sneaker price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    KZT,
}

impl Currency {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::KZT => "KZT",
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "KZT" => Ok(Currency::KZT),
            other => Err(format!("unknown currency: {other}")),
        }
    }
}

/// Sizing system a shoe size is expressed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Country {
    US,
    UK,
    EU,
    JP,
}

impl Country {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::US => "US",
            Country::UK => "UK",
            Country::EU => "EU",
            Country::JP => "JP",
        }
    }
}

impl std::str::FromStr for Country {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "US" => Ok(Country::US),
            "UK" => Ok(Country::UK),
            "EU" => Ok(Country::EU),
            "JP" => Ok(Country::JP),
            other => Err(format!("unknown sizing system: {other}")),
        }
    }
}

/// Price of a sneaker. Amounts are stored and echoed, never computed with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Money {
    pub currency: Currency,
    pub amount: f64,
}

/// Shoe size in one sizing system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShoeSize {
    pub country: Country,
    pub value: u8,
}

/// A registered user. Created once at registration, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

impl User {
    /// Creates a user with a fresh identity. Email uniqueness must have been
    /// established before calling this.
    #[must_use]
    pub fn create(email: String, password_hash: String, salt: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            salt,
        }
    }
}

/// A sneaker record, exclusively owned by the user that created it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sneaker {
    pub id: SneakerId,
    pub user_id: UserId,
    pub name: String,
    pub brand: String,
    pub price: Money,
    pub size: ShoeSize,
    pub rate: u8,
}

impl Sneaker {
    /// Creates a sneaker with a fresh identity under the given owner.
    #[must_use]
    pub fn create(
        user_id: UserId,
        name: String,
        brand: String,
        price: Money,
        size: ShoeSize,
        rate: u8,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            brand,
            price,
            size,
            rate,
        }
    }

    /// Replaces every mutable field at once. Identity and owner never change.
    pub fn update(&mut self, name: String, brand: String, price: Money, size: ShoeSize, rate: u8) {
        self.name = name;
        self.brand = brand;
        self.price = price;
        self.size = size;
        self.rate = rate;
    }
}

/// Projection of a sneaker returned to callers. Never exposes the owner id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SneakerDto {
    pub id: SneakerId,
    pub name: String,
    pub brand: String,
    pub price: Money,
    pub size: ShoeSize,
    pub rate: u8,
}

impl From<&Sneaker> for SneakerDto {
    fn from(sneaker: &Sneaker) -> Self {
        Self {
            id: sneaker.id,
            name: sneaker.name.clone(),
            brand: sneaker.brand.clone(),
            price: sneaker.price,
            size: sneaker.size,
            rate: sneaker.rate,
        }
    }
}

/// Claims carried by an issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub email: String,
}

/// Command to register a new user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterCommand {
    #[validate(
        email(message = "email is invalid"),
        length(min = 1, max = 255, message = "email must be 1 to 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Command to exchange credentials for a bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Command to add a sneaker to the caller's collection.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddSneakerCommand {
    pub user_id: UserId,
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "brand must be 1 to 100 characters"))]
    pub brand: String,
    pub price: Money,
    pub size: ShoeSize,
    #[validate(range(min = 1, max = 5, message = "rate must be between 1 and 5"))]
    pub rate: u8,
}

/// Command to replace the mutable fields of an owned sneaker.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditSneakerCommand {
    pub user_id: UserId,
    pub sneaker_id: SneakerId,
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "brand must be 1 to 100 characters"))]
    pub brand: String,
    pub price: Money,
    pub size: ShoeSize,
    #[validate(range(min = 1, max = 5, message = "rate must be between 1 and 5"))]
    pub rate: u8,
}

/// Command to remove an owned sneaker.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteSneakerCommand {
    pub user_id: UserId,
    pub sneaker_id: SneakerId,
}

/// Query for the caller's sneaker collection.
#[derive(Debug, Clone, Deserialize)]
pub struct GetSneakersQuery {
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_price() -> Money {
        Money {
            currency: Currency::USD,
            amount: 120.0,
        }
    }

    fn sample_size() -> ShoeSize {
        ShoeSize {
            country: Country::US,
            value: 10,
        }
    }

    #[test]
    fn test_user_create_assigns_fresh_identity() {
        let a = User::create(
            "a@example.com".to_string(),
            "hash".to_string(),
            "salt".to_string(),
        );
        let b = User::create(
            "b@example.com".to_string(),
            "hash".to_string(),
            "salt".to_string(),
        );

        assert_ne!(a.id, b.id);
        assert_eq!(a.email, "a@example.com");
    }

    #[test]
    fn test_sneaker_create_sets_owner() {
        let owner = Uuid::new_v4();
        let sneaker = Sneaker::create(
            owner,
            "Air Max 90".to_string(),
            "Nike".to_string(),
            sample_price(),
            sample_size(),
            4,
        );

        assert_eq!(sneaker.user_id, owner);
        assert_eq!(sneaker.rate, 4);
    }

    #[test]
    fn test_sneaker_update_replaces_fields_but_not_identity() {
        let owner = Uuid::new_v4();
        let mut sneaker = Sneaker::create(
            owner,
            "Air Max 90".to_string(),
            "Nike".to_string(),
            sample_price(),
            sample_size(),
            4,
        );
        let id = sneaker.id;

        sneaker.update(
            "Superstar".to_string(),
            "Adidas".to_string(),
            Money {
                currency: Currency::EUR,
                amount: 89.99,
            },
            ShoeSize {
                country: Country::EU,
                value: 44,
            },
            5,
        );

        assert_eq!(sneaker.id, id);
        assert_eq!(sneaker.user_id, owner);
        assert_eq!(sneaker.name, "Superstar");
        assert_eq!(sneaker.brand, "Adidas");
        assert_eq!(sneaker.price.currency, Currency::EUR);
        assert_eq!(sneaker.rate, 5);
    }

    #[test]
    fn test_sneaker_dto_hides_owner() {
        let sneaker = Sneaker::create(
            Uuid::new_v4(),
            "Air Max 90".to_string(),
            "Nike".to_string(),
            sample_price(),
            sample_size(),
            3,
        );

        let dto = SneakerDto::from(&sneaker);
        assert_eq!(dto.id, sneaker.id);
        assert_eq!(dto.name, sneaker.name);

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_currency_round_trips_through_str() {
        for currency in [
            Currency::USD,
            Currency::EUR,
            Currency::GBP,
            Currency::JPY,
            Currency::KZT,
        ] {
            assert_eq!(currency.as_str().parse::<Currency>(), Ok(currency));
        }
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn test_country_round_trips_through_str() {
        for country in [Country::US, Country::UK, Country::EU, Country::JP] {
            assert_eq!(country.as_str().parse::<Country>(), Ok(country));
        }
        assert!("AU".parse::<Country>().is_err());
    }

    #[test]
    fn test_sneaker_serialization() {
        let sneaker = Sneaker::create(
            Uuid::new_v4(),
            "Dunk Low".to_string(),
            "Nike".to_string(),
            sample_price(),
            sample_size(),
            5,
        );

        let json = serde_json::to_string(&sneaker).unwrap();
        let deserialized: Sneaker = serde_json::from_str(&json).unwrap();
        assert_eq!(sneaker, deserialized);
    }

    #[test]
    fn test_register_command_rules() {
        let ok = RegisterCommand {
            email: "new@example.com".to_string(),
            password: "12345678".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short_password = RegisterCommand {
            email: "new@example.com".to_string(),
            password: "1234567".to_string(),
        };
        assert!(short_password.validate().is_err());

        let bad_email = RegisterCommand {
            email: "not-an-email".to_string(),
            password: "12345678".to_string(),
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_add_sneaker_command_rules() {
        let command = AddSneakerCommand {
            user_id: Uuid::new_v4(),
            name: "Jordan 1".to_string(),
            brand: "Nike".to_string(),
            price: sample_price(),
            size: sample_size(),
            rate: 5,
        };
        assert!(command.validate().is_ok());

        let out_of_range = AddSneakerCommand {
            rate: 6,
            ..command.clone()
        };
        assert!(out_of_range.validate().is_err());

        let long_name = AddSneakerCommand {
            name: "x".repeat(101),
            ..command
        };
        assert!(long_name.validate().is_err());
    }
}

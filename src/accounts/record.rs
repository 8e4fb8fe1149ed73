//! Registration form data. A [`RegistrationRecord`] holds exactly what the user
//! typed; [`ValidRegistration`] is the checked form that may be sent to the
//! Account Service. The password is kept in a `SecretString` and never printed.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::types::RegisterRequest;

/// Registration form fields, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Password,
    Gender,
    Contact,
    Age,
    Street,
    City,
    Pincode,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Name,
        Field::Email,
        Field::Password,
        Field::Gender,
        Field::Contact,
        Field::Age,
        Field::Street,
        Field::City,
        Field::Pincode,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::Gender => "gender",
            Field::Contact => "contact",
            Field::Age => "age",
            Field::Street => "street",
            Field::City => "city",
            Field::Pincode => "pincode",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| format!("unknown field: {value}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parses a selected option; the empty placeholder is not a gender.
    #[must_use]
    pub fn from_selection(value: &str) -> Option<Self> {
        match value.trim() {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Account role. Self-service registration only creates passengers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Passenger,
}

/// Registration input as collected from the user, one field at a time.
#[derive(Debug, Default)]
pub struct RegistrationRecord {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub contact: String,
    pub street: String,
    pub city: String,
    pub pincode: String,
    pub roles: Role,
    pub age: String,
    pub gender: String,
}

impl RegistrationRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a single field with the raw user input.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Password => self.password = SecretString::from(value),
            Field::Gender => self.gender = value,
            Field::Contact => self.contact = value,
            Field::Age => self.age = value,
            Field::Street => self.street = value,
            Field::City => self.city = value,
            Field::Pincode => self.pincode = value,
        }
    }

    /// Builder-style variant of [`RegistrationRecord::set`].
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Validates the record and converts it into a submittable registration.
    ///
    /// # Errors
    /// Returns every violated rule keyed by field.
    pub fn into_valid(self) -> Result<ValidRegistration, super::ValidationErrors> {
        let errors = super::validate(&self);
        if !errors.is_empty() {
            return Err(errors);
        }

        let (age, gender) = super::validator::typed_fields(&self)?;

        Ok(ValidRegistration {
            name: self.name,
            email: self.email,
            password: self.password,
            contact: self.contact,
            street: self.street,
            city: self.city,
            pincode: self.pincode,
            roles: self.roles,
            age,
            gender,
        })
    }
}

/// A registration that passed every validation rule.
#[derive(Debug)]
pub struct ValidRegistration {
    name: String,
    email: String,
    password: SecretString,
    contact: String,
    street: String,
    city: String,
    pincode: String,
    roles: Role,
    age: u8,
    gender: Gender,
}

impl ValidRegistration {
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn age(&self) -> u8 {
        self.age
    }

    #[must_use]
    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Borrows the registration as the wire payload. The payload exposes the
    /// password, so it must never be logged.
    #[must_use]
    pub fn request(&self) -> RegisterRequest<'_> {
        RegisterRequest {
            name: &self.name,
            email: &self.email,
            password: self.password.expose_secret(),
            contact: &self.contact,
            street: &self.street,
            city: &self.city,
            pincode: &self.pincode,
            roles: self.roles,
            age: self.age,
            gender: self.gender,
        }
    }
}

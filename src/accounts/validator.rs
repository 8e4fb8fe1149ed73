//! Field rules for passenger registration.
//!
//! Every rule is checked on every call so the form can show all problems at
//! once. Checking is pure; the same record always yields the same errors.

use regex::Regex;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::collections::BTreeMap;

use super::record::{Field, Gender, RegistrationRecord};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 100;

/// Validation messages keyed by field. Empty means the record is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").is_ok_and(|re| re.is_match(email))
}

/// Contact numbers are exactly 10 ASCII digits.
pub fn valid_contact(contact: &str) -> bool {
    Regex::new(r"^[0-9]{10}$").is_ok_and(|re| re.is_match(contact))
}

/// Pincodes are exactly 6 ASCII digits.
pub fn valid_pincode(pincode: &str) -> bool {
    Regex::new(r"^[0-9]{6}$").is_ok_and(|re| re.is_match(pincode))
}

pub fn valid_age(age: &str) -> bool {
    parse_age(age).is_some()
}

/// Parses an age typed into the form, accepting only whole years in range.
pub(crate) fn parse_age(age: &str) -> Option<u8> {
    age.trim()
        .parse::<i64>()
        .ok()
        .filter(|years| (i64::from(MIN_AGE)..=i64::from(MAX_AGE)).contains(years))
        .and_then(|years| u8::try_from(years).ok())
}

/// Parses the typed fields of a record, reporting each one that does not parse.
pub(crate) fn typed_fields(
    record: &RegistrationRecord,
) -> Result<(u8, Gender), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let age = parse_age(&record.age);
    let gender = Gender::from_selection(&record.gender);

    if age.is_none() {
        errors.insert(Field::Age, "Enter valid age (1 - 100)");
    }
    if gender.is_none() {
        errors.insert(Field::Gender, "Please select gender!");
    }

    match (age, gender) {
        (Some(age), Some(gender)) => Ok((age, gender)),
        _ => Err(errors),
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Checks a registration record against every field rule.
#[must_use]
pub fn validate(record: &RegistrationRecord) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if is_blank(&record.name) {
        errors.insert(Field::Name, "Passenger name is required!");
    }

    if is_blank(&record.email) {
        errors.insert(Field::Email, "Email is required!");
    } else if !valid_email(&record.email) {
        errors.insert(Field::Email, "Enter a valid email!");
    }

    let password = record.password.expose_secret();
    if is_blank(password) {
        errors.insert(Field::Password, "Password is required!");
    } else if password.encode_utf16().count() < MIN_PASSWORD_LENGTH {
        errors.insert(Field::Password, "Password must be at least 6 characters!");
    }

    if Gender::from_selection(&record.gender).is_none() {
        errors.insert(Field::Gender, "Please select gender!");
    }

    if is_blank(&record.contact) {
        errors.insert(Field::Contact, "Contact number is required!");
    } else if !valid_contact(&record.contact) {
        errors.insert(Field::Contact, "Contact must be exactly 10 digits!");
    }

    if is_blank(&record.age) {
        errors.insert(Field::Age, "Age is required!");
    } else if !valid_age(&record.age) {
        errors.insert(Field::Age, "Enter valid age (1 - 100)");
    }

    if is_blank(&record.street) {
        errors.insert(Field::Street, "Street address is required!");
    }

    if is_blank(&record.city) {
        errors.insert(Field::City, "City is required!");
    }

    if is_blank(&record.pincode) {
        errors.insert(Field::Pincode, "Pincode is required!");
    } else if !valid_pincode(&record.pincode) {
        errors.insert(Field::Pincode, "Pincode must be exactly 6 digits!");
    }

    errors
}

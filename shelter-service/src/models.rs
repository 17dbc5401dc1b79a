use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct Shelter {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Animal {
    pub id: i32,
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub species: String,
    pub breed: String,
    pub shelter_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct NewShelter {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShelter {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewAnimal {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub shelter_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAnimal {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub shelter_id: Option<i32>,
}

/// Required text fields must be present and non-blank; returns the trimmed
/// value.
pub fn required_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional text updates: blank strings are treated as "not provided".
pub fn provided_text(value: Option<String>) -> Option<String> {
    required_text(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank_and_missing() {
        assert_eq!(required_text(None), None);
        assert_eq!(required_text(Some("".into())), None);
        assert_eq!(required_text(Some("   ".into())), None);
        assert_eq!(required_text(Some(" Oakhaven ".into())), Some("Oakhaven".into()));
    }
}

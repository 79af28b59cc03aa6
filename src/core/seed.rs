//! # Seed Data
//!
//! The illustrative dataset a fresh store starts with, and loading of an
//! alternative dataset from a JSON file (same shape the web front-end used).

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use log::info;

use crate::core::model::{CompanyData, Message, UserChatHistory};

#[derive(Debug)]
pub enum SeedError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// Two siblings share an id. `scope` names the parent collection.
    Duplicate { scope: String, id: String },
    /// The file holds no companies.
    Empty,
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Io(e) => write!(f, "seed I/O error: {e}"),
            SeedError::Parse(e) => write!(f, "seed parse error: {e}"),
            SeedError::Duplicate { scope, id } => write!(f, "duplicate id '{id}' in {scope}"),
            SeedError::Empty => write!(f, "seed file contains no companies"),
        }
    }
}

impl std::error::Error for SeedError {}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn exchange(query: &str, reply: &str, asked: DateTime<Utc>, answered: DateTime<Utc>) -> Vec<Message> {
    vec![
        Message::query("1".to_string(), query, asked),
        Message::reply("2".to_string(), reply, answered),
    ]
}

/// Three companies: one with three users, one with a single user, one empty.
pub fn seed_companies() -> Vec<CompanyData> {
    vec![
        CompanyData::new(
            "1",
            "Company 1",
            vec![
                UserChatHistory::with_messages(
                    "1",
                    "user 1",
                    exchange(
                        "How do I reset my password?",
                        "You can reset your password by clicking on the \"Forgot Password\" link on the login page.",
                        at(2023, 6, 15, 10, 30),
                        at(2023, 6, 15, 10, 31),
                    ),
                ),
                UserChatHistory::with_messages(
                    "2",
                    "user 2",
                    exchange(
                        "What are the business hours?",
                        "Our business hours are 9 AM to 5 PM, Monday through Friday.",
                        at(2023, 6, 16, 14, 20),
                        at(2023, 6, 16, 14, 21),
                    ),
                ),
                UserChatHistory::new("3", "user 3"),
            ],
        ),
        CompanyData::new(
            "2",
            "Company 2",
            vec![UserChatHistory::with_messages(
                "1",
                "user 1",
                exchange(
                    "I need help with my account",
                    "Please provide your account number and I can assist you further.",
                    at(2023, 6, 17, 9, 15),
                    at(2023, 6, 17, 9, 16),
                ),
            )],
        ),
        CompanyData::new("3", "Company 3", vec![]),
    ]
}

/// Loads companies from a JSON array and checks ids are unique per parent.
pub fn load_seed_file(path: &Path) -> Result<Vec<CompanyData>, SeedError> {
    let json = fs::read_to_string(path).map_err(SeedError::Io)?;
    let companies: Vec<CompanyData> = serde_json::from_str(&json).map_err(SeedError::Parse)?;
    if companies.is_empty() {
        return Err(SeedError::Empty);
    }
    validate(&companies)?;
    info!(
        "Loaded {} companies from seed file {}",
        companies.len(),
        path.display()
    );
    Ok(companies)
}

/// Rejects datasets where two siblings share an id.
pub fn validate(companies: &[CompanyData]) -> Result<(), SeedError> {
    ensure_unique("companies", companies.iter().map(|c| c.company_id.as_str()))?;
    for company in companies {
        let scope = format!("users of company '{}'", company.company_id);
        ensure_unique(&scope, company.users.iter().map(|u| u.user_id.as_str()))?;
        for user in &company.users {
            let scope = format!(
                "messages of user '{}' in company '{}'",
                user.user_id, company.company_id
            );
            ensure_unique(&scope, user.messages.iter().map(|m| m.id.as_str()))?;
        }
    }
    Ok(())
}

fn ensure_unique<'a>(scope: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), SeedError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SeedError::Duplicate {
                scope: scope.to_string(),
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

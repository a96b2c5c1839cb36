use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use fs_extra::dir::create_all;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;
use std::path::Path;

use crate::error::Result;

pub const FIRST_NAMES: [&str; 8] = [
    "Alice", "Bob", "Charlie", "Diana", "Ethan", "Fiona", "George", "Hana",
];

pub const LAST_NAMES: [&str; 8] = [
    "Smith", "Johnson", "Kobayashi", "Garcia", "Brown", "Lee", "Ivanov", "Tanaka",
];

pub const TAGS: [&str; 7] = ["tech", "gaming", "art", "finance", "travel", "music", "sports"];

pub const MAX_TAGS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sex {
    Male,
    Female,
    NonBinary,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::NonBinary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::NonBinary => "non-binary",
        }
    }
}

/// Birthday as handed to a backend.
///
/// The standard generator yields a structured instant; the DianaDB variant
/// yields one of two fixed instants already rendered as text. Serialized
/// externally tagged (`{"instant": ..}` / `{"text": ..}`) so fixtures load back
/// as the variant they were written from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Birthday {
    Instant(DateTime<Utc>),
    Text(String),
}

impl Birthday {
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        match self {
            Birthday::Instant(instant) => Ok(*instant),
            Birthday::Text(text) => Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc)),
        }
    }

    /// RFC 3339 text; instants are rendered with millisecond precision.
    pub fn to_text(&self) -> String {
        match self {
            Birthday::Instant(instant) => instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            Birthday::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub sex: Sex,
    pub birthday: Birthday,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorVariant {
    #[default]
    Standard,
    /// Birthday is a coin flip between two fixed instants, rendered as text.
    FixedInstants,
}

pub fn birthday_lower_bound() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()
}

pub fn birthday_upper_bound() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2005, 12, 31, 0, 0, 0).unwrap()
}

pub fn fixed_birthdays() -> [DateTime<Utc>; 2] {
    [
        Utc.with_ymd_and_hms(1990, 4, 21, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2005, 12, 18, 0, 0, 0).unwrap(),
    ]
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    // Vocabularies are non-empty constants.
    pool.choose(rng).copied().unwrap_or_default()
}

fn random_instant<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let span = (end - start).num_milliseconds();
    start + Duration::milliseconds(rng.gen_range(0..=span))
}

fn random_fixed_birthday<R: Rng + ?Sized>(rng: &mut R) -> String {
    let [first, second] = fixed_birthdays();
    let chosen = if rng.gen_bool(0.5) { first } else { second };
    chosen.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn random_tags<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let count = rng.gen_range(1..=MAX_TAGS);
    let mut tags: Vec<String> = Vec::with_capacity(count);
    for _ in 0..count {
        let tag = pick(rng, &TAGS);
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

pub fn generate_user<R: Rng + ?Sized>(rng: &mut R) -> UserRecord {
    let name = format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES));
    let sex = *Sex::ALL.choose(rng).unwrap_or(&Sex::Male);
    let birthday = Birthday::Instant(random_instant(
        rng,
        birthday_lower_bound(),
        birthday_upper_bound(),
    ));
    let tags = random_tags(rng);

    UserRecord {
        name,
        sex,
        birthday,
        tags,
    }
}

pub fn generate_user_di<R: Rng + ?Sized>(rng: &mut R) -> UserRecord {
    let user = generate_user(rng);
    UserRecord {
        birthday: Birthday::Text(random_fixed_birthday(rng)),
        ..user
    }
}

pub fn generate<R: Rng + ?Sized>(variant: GeneratorVariant, rng: &mut R) -> UserRecord {
    match variant {
        GeneratorVariant::Standard => generate_user(rng),
        GeneratorVariant::FixedInstants => generate_user_di(rng),
    }
}

pub fn generate_users<R: Rng + ?Sized>(
    count: usize,
    variant: GeneratorVariant,
    rng: &mut R,
) -> Vec<UserRecord> {
    (0..count).map(|_| generate(variant, rng)).collect()
}

/// Dump `count` generated records as a pretty-printed JSON array.
pub fn generate_and_save_data(
    path: &Path,
    count: usize,
    variant: GeneratorVariant,
) -> Result<()> {
    let users = generate_users(count, variant, &mut rand::thread_rng());
    let json = to_string_pretty(&users)?;

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            create_all(dir, false)?;
        }
    }

    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn assert_well_formed(user: &UserRecord) {
        let tokens: Vec<&str> = user.name.split_whitespace().collect();
        assert_eq!(tokens.len(), 2, "name {:?} should be two tokens", user.name);
        assert!(FIRST_NAMES.contains(&tokens[0]));
        assert!(LAST_NAMES.contains(&tokens[1]));

        assert!(Sex::ALL.contains(&user.sex));

        assert!(!user.tags.is_empty() && user.tags.len() <= MAX_TAGS);
        let distinct: HashSet<&String> = user.tags.iter().collect();
        assert_eq!(distinct.len(), user.tags.len(), "duplicate tags in {:?}", user.tags);
        for tag in &user.tags {
            assert!(TAGS.contains(&tag.as_str()), "unknown tag {tag}");
        }
    }

    #[test]
    fn standard_records_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let user = generate_user(&mut rng);
            assert_well_formed(&user);

            match user.birthday {
                Birthday::Instant(instant) => {
                    assert!(instant >= birthday_lower_bound());
                    assert!(instant <= birthday_upper_bound());
                }
                Birthday::Text(text) => panic!("standard birthday rendered as text: {text}"),
            }
        }
    }

    #[test]
    fn di_records_use_one_of_two_fixed_instants() {
        let mut rng = StdRng::seed_from_u64(11);
        let allowed = ["1990-04-21T00:00:00.000Z", "2005-12-18T00:00:00.000Z"];
        let mut seen = HashSet::new();

        for _ in 0..500 {
            let user = generate_user_di(&mut rng);
            assert_well_formed(&user);
            match &user.birthday {
                Birthday::Text(text) => {
                    assert!(allowed.contains(&text.as_str()), "unexpected birthday {text}");
                    seen.insert(text.clone());
                }
                Birthday::Instant(_) => panic!("di birthday should be text"),
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn text_birthday_parses_back_to_instant() {
        let birthday = Birthday::Text("1990-04-21T00:00:00.000Z".to_string());
        assert_eq!(birthday.to_datetime().unwrap(), fixed_birthdays()[0]);
        assert!(Birthday::Text("yesterday".to_string()).to_datetime().is_err());
    }

    #[test]
    fn tag_usage_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let users = generate_users(10_000, GeneratorVariant::Standard, &mut rng);

        let mut counts = [0usize; TAGS.len()];
        for user in &users {
            for tag in &user.tags {
                let idx = TAGS.iter().position(|t| t == tag).unwrap();
                counts[idx] += 1;
            }
        }

        let total: usize = counts.iter().sum();
        let expected = total as f64 / TAGS.len() as f64;
        for (tag, count) in TAGS.iter().zip(counts) {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.1, "tag {tag} used {count} times, expected ~{expected:.0}");
        }
    }

    #[test]
    fn sex_serializes_as_lowercase_labels() {
        assert_eq!(serde_json::to_string(&Sex::NonBinary).unwrap(), "\"non-binary\"");
        for sex in Sex::ALL {
            assert_eq!(serde_json::to_value(sex).unwrap(), sex.as_str());
        }
    }

    #[test]
    fn saves_generated_data_as_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures").join("users.json");

        generate_and_save_data(&path, 25, GeneratorVariant::Standard).unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        let users: Vec<UserRecord> = serde_json::from_str(&data).unwrap();
        assert_eq!(users.len(), 25);
        users.iter().for_each(assert_well_formed);
        assert!(users
            .iter()
            .all(|u| matches!(u.birthday, Birthday::Instant(_))));
    }

    #[test]
    fn fixed_instant_fixtures_reload_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_di.json");

        generate_and_save_data(&path, 20, GeneratorVariant::FixedInstants).unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        let users: Vec<UserRecord> = serde_json::from_str(&data).unwrap();
        assert_eq!(users.len(), 20);
        for user in &users {
            assert_well_formed(user);
            match &user.birthday {
                Birthday::Text(text) => assert!(text.ends_with(".000Z"), "{text}"),
                Birthday::Instant(instant) => panic!("reloaded as instant {instant}"),
            }
        }
        assert_eq!(serde_json::to_string_pretty(&users).unwrap(), data);
    }

    #[test]
    fn text_rendering_keeps_millis() {
        let instant = Birthday::Instant(fixed_birthdays()[1]);
        assert_eq!(instant.to_text(), "2005-12-18T00:00:00.000Z");
        let text = Birthday::Text("1990-04-21T00:00:00.000Z".to_string());
        assert_eq!(text.to_text(), "1990-04-21T00:00:00.000Z");
    }
}

//! Lifespan value object.
//!
//! A person's age is known either as a whole number of years or through a date of birth. At
//! most one of the two is held. When both are supplied the date of birth wins and the known age
//! is discarded. Age, age in days, life stage and the PHI-friendly rendering are derived on
//! demand from the current date and never stored.
//!
//! Input coercion is lenient and range checks are strict:
//! - an age or date that cannot be coerced is treated as absent, with no error raised;
//! - an age or date that *was* coerced but is out of range raises a [`ValidationException`]
//!   filed under the `Lifespan` field.

use crate::constants::{LIFESPAN_FIELD, MAX_KNOWN_AGE};
use crate::error::ValidationException;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

const AGE_BELOW_ZERO: &str = "Age cannot be less than zero years.";
const AGE_ABOVE_MAX: &str = "Age cannot be more than 120 years.";
const DOB_NOT_IN_PAST: &str = "Date of birth must be in the past";

// ============================================================================
// Inputs
// ============================================================================

/// Raw known-age input: a whole number, any other number, or text still to be coerced.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum KnownAgeInput {
    Years(i64),
    /// Fractional, or too large for `i64`.
    Number(f64),
    Text(String),
}

impl KnownAgeInput {
    /// Coerces to whole years; `None` when text holds no leading integer.
    ///
    /// Numbers are truncated toward zero and saturate at the `i64` bounds, so an oversized
    /// value still reaches the range check.
    pub fn coerce(&self) -> Option<i64> {
        match self {
            KnownAgeInput::Years(years) => Some(*years),
            KnownAgeInput::Number(number) if number.is_nan() => None,
            KnownAgeInput::Number(number) => Some(number.trunc() as i64),
            KnownAgeInput::Text(text) => parse_leading_integer(text),
        }
    }
}

impl From<f64> for KnownAgeInput {
    fn from(value: f64) -> Self {
        KnownAgeInput::Number(value)
    }
}

impl From<i64> for KnownAgeInput {
    fn from(value: i64) -> Self {
        KnownAgeInput::Years(value)
    }
}

impl From<&str> for KnownAgeInput {
    fn from(value: &str) -> Self {
        KnownAgeInput::Text(value.to_owned())
    }
}

impl From<String> for KnownAgeInput {
    fn from(value: String) -> Self {
        KnownAgeInput::Text(value)
    }
}

/// Raw date-of-birth input: a calendar date, or text still to be coerced.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum DateOfBirthInput {
    Date(NaiveDate),
    Text(String),
}

impl DateOfBirthInput {
    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its UTC date).
    pub fn coerce(&self) -> Option<NaiveDate> {
        match self {
            DateOfBirthInput::Date(date) => Some(*date),
            DateOfBirthInput::Text(text) => parse_calendar_date(text),
        }
    }
}

impl From<NaiveDate> for DateOfBirthInput {
    fn from(value: NaiveDate) -> Self {
        DateOfBirthInput::Date(value)
    }
}

impl From<&str> for DateOfBirthInput {
    fn from(value: &str) -> Self {
        DateOfBirthInput::Text(value.to_owned())
    }
}

impl From<String> for DateOfBirthInput {
    fn from(value: String) -> Self {
        DateOfBirthInput::Text(value)
    }
}

/// Optional whitespace and sign, then the leading run of ASCII digits. A run too long for `i64`
/// saturates.
fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    let signed = if negative {
        format!("-{digits}").parse::<i64>().unwrap_or(i64::MIN)
    } else {
        digits.parse::<i64>().unwrap_or(i64::MAX)
    };
    Some(signed)
}

fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

// ============================================================================
// Life stage
// ============================================================================

/// Coarse age band. Each band includes its lower bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifeStage {
    Unknown,
    Infant,
    Toddler,
    Child,
    Adolescent,
    Adult,
    Senior,
}

impl LifeStage {
    pub fn from_age(age: Option<u32>) -> Self {
        match age {
            None => LifeStage::Unknown,
            Some(0) => LifeStage::Infant,
            Some(1..=2) => LifeStage::Toddler,
            Some(3..=12) => LifeStage::Child,
            Some(13..=17) => LifeStage::Adolescent,
            Some(18..=64) => LifeStage::Adult,
            Some(_) => LifeStage::Senior,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifeStage::Unknown => "Unknown",
            LifeStage::Infant => "Infant",
            LifeStage::Toddler => "Toddler",
            LifeStage::Child => "Child",
            LifeStage::Adolescent => "Adolescent",
            LifeStage::Adult => "Adult",
            LifeStage::Senior => "Senior",
        }
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for LifeStage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Lifespan
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Lifespan {
    known_age: Option<u32>,
    date_of_birth: Option<NaiveDate>,
}

impl Lifespan {
    /// A lifespan with neither age nor date of birth.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Builds a lifespan, checking dates against today's UTC date.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationException`] on field `Lifespan` if a coerced age is outside
    /// `0..=120` or a coerced date of birth is not strictly before today.
    pub fn create(
        known_age: Option<KnownAgeInput>,
        date_of_birth: Option<DateOfBirthInput>,
    ) -> Result<Self, ValidationException> {
        Self::create_on(known_age, date_of_birth, today())
    }

    /// Like [`Lifespan::create`], with "today" supplied by the caller.
    pub fn create_on(
        known_age: Option<KnownAgeInput>,
        date_of_birth: Option<DateOfBirthInput>,
        today: NaiveDate,
    ) -> Result<Self, ValidationException> {
        if let Some(dob) = date_of_birth.as_ref().and_then(DateOfBirthInput::coerce) {
            if dob >= today {
                return Err(lifespan_failure(DOB_NOT_IN_PAST));
            }
            return Ok(Self {
                known_age: None,
                date_of_birth: Some(dob),
            });
        }

        if let Some(age) = known_age.as_ref().and_then(KnownAgeInput::coerce) {
            if age < 0 {
                return Err(lifespan_failure(AGE_BELOW_ZERO));
            }
            if age > i64::from(MAX_KNOWN_AGE) {
                return Err(lifespan_failure(AGE_ABOVE_MAX));
            }
            return Ok(Self {
                known_age: u32::try_from(age).ok(),
                date_of_birth: None,
            });
        }

        Ok(Self::unknown())
    }

    pub fn from_known_age(age_in_years: i64) -> Result<Self, ValidationException> {
        Self::create(Some(KnownAgeInput::Years(age_in_years)), None)
    }

    pub fn from_date_of_birth(dob: NaiveDate) -> Result<Self, ValidationException> {
        Self::create(None, Some(DateOfBirthInput::Date(dob)))
    }

    pub fn known_age(&self) -> Option<u32> {
        self.known_age
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn is_unknown(&self) -> bool {
        self.known_age.is_none() && self.date_of_birth.is_none()
    }

    /// Age in whole years as of today.
    pub fn age(&self) -> Option<u32> {
        self.age_on(today())
    }

    /// Age in whole years as of `today`.
    ///
    /// From a date of birth this is the calendar year difference, less one if the birthday has
    /// not yet come round in `today`'s year.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        if let Some(age) = self.known_age {
            return Some(age);
        }
        self.date_of_birth.and_then(|dob| today.years_since(dob))
    }

    /// Whole days since the date of birth, counted from its UTC midnight.
    pub fn age_in_days(&self) -> Option<i64> {
        self.age_in_days_at(Utc::now())
    }

    pub fn age_in_days_at(&self, now: DateTime<Utc>) -> Option<i64> {
        let dob = self.date_of_birth?;
        let midnight = dob.and_hms_opt(0, 0, 0)?.and_utc();
        let elapsed = now.signed_duration_since(midnight);
        Some(elapsed.num_seconds().div_euclid(SECONDS_PER_DAY))
    }

    pub fn life_stage(&self) -> LifeStage {
        self.life_stage_on(today())
    }

    pub fn life_stage_on(&self, today: NaiveDate) -> LifeStage {
        LifeStage::from_age(self.age_on(today))
    }

    /// PHI-friendly age: coarsened below one year and above 89.
    pub fn phi_friendly_string(&self) -> String {
        self.phi_friendly_string_on(today())
    }

    pub fn phi_friendly_string_on(&self, today: NaiveDate) -> String {
        match self.age_on(today) {
            None => "Unknown".to_string(),
            Some(0) => "< 1 year".to_string(),
            Some(age) if age > 89 => "> 89 years".to_string(),
            Some(age) => format!("{age} years"),
        }
    }

    /// Same as `Display`, with "today" supplied by the caller.
    pub fn describe_on(&self, today: NaiveDate) -> String {
        if let Some(dob) = self.date_of_birth {
            let age = self.age_on(today).unwrap_or_default();
            return format!("DOB: {}, Age: {age} years", dob.format("%Y-%m-%d"));
        }
        if let Some(age) = self.known_age {
            return format!("Age: {age} years");
        }
        "Unknown lifespan".to_string()
    }
}

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn lifespan_failure(message: &str) -> ValidationException {
    ValidationException::from_field_and_message(LIFESPAN_FIELD, message)
}

impl fmt::Display for Lifespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe_on(today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, TimeZone};
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
    }

    fn fixed_today() -> NaiveDate {
        date(2024, 6, 15)
    }

    fn lifespan_message(err: &ValidationException) -> &str {
        err.errors()[LIFESPAN_FIELD][0].as_str()
    }

    #[test]
    fn known_age_round_trips_for_whole_valid_range() {
        for age in 0..=120 {
            let lifespan = Lifespan::from_known_age(age).expect("age in range");
            assert_eq!(lifespan.age(), Some(age as u32));
            assert_eq!(lifespan.known_age(), Some(age as u32));
            assert_eq!(lifespan.date_of_birth(), None);
            assert_eq!(lifespan.age_in_days(), None);
        }
    }

    #[test_case(-1, AGE_BELOW_ZERO ; "just below zero")]
    #[test_case(-40, AGE_BELOW_ZERO ; "well below zero")]
    #[test_case(121, AGE_ABOVE_MAX ; "just above max")]
    #[test_case(200, AGE_ABOVE_MAX ; "well above max")]
    fn out_of_range_age_is_rejected(age: i64, expected: &str) {
        let err = Lifespan::from_known_age(age).expect_err("age out of range");
        assert_eq!(err.message(), expected);
        assert_eq!(lifespan_message(&err), expected);
        assert_eq!(err.errors().len(), 1);
    }

    #[test_case(date(2024, 6, 14), 0 ; "yesterday")]
    #[test_case(date(2023, 6, 15), 1 ; "birthday today")]
    #[test_case(date(2023, 6, 16), 0 ; "birthday tomorrow")]
    #[test_case(date(2018, 5, 1), 6 ; "six years old")]
    #[test_case(date(1960, 12, 31), 63 ; "birthday at year end")]
    fn age_from_date_of_birth_uses_calendar_years(dob: NaiveDate, expected: u32) {
        let lifespan = Lifespan::create_on(None, Some(dob.into()), fixed_today())
            .expect("dob in the past");
        assert_eq!(lifespan.age_on(fixed_today()), Some(expected));
        assert_eq!(lifespan.known_age(), None);
        assert_eq!(lifespan.date_of_birth(), Some(dob));
    }

    #[test]
    fn leap_day_birthday_counts_from_first_of_march() {
        let lifespan = Lifespan::create_on(None, Some(date(2004, 2, 29).into()), date(2023, 3, 1))
            .expect("dob in the past");
        assert_eq!(lifespan.age_on(date(2023, 2, 28)), Some(18));
        assert_eq!(lifespan.age_on(date(2023, 3, 1)), Some(19));
    }

    #[test_case(date(2024, 6, 15) ; "today")]
    #[test_case(date(2024, 6, 16) ; "tomorrow")]
    #[test_case(date(2090, 1, 1) ; "far future")]
    fn date_of_birth_must_be_in_the_past(dob: NaiveDate) {
        let err = Lifespan::create_on(None, Some(dob.into()), fixed_today())
            .expect_err("dob not in the past");
        assert_eq!(err.message(), DOB_NOT_IN_PAST);
        assert_eq!(lifespan_message(&err), DOB_NOT_IN_PAST);
    }

    #[test]
    fn real_clock_rejects_today_and_accepts_yesterday() {
        let today = Utc::now().date_naive();
        assert!(Lifespan::from_date_of_birth(today).is_err());

        let yesterday = today.checked_sub_days(Days::new(1)).expect("valid date");
        let lifespan = Lifespan::from_date_of_birth(yesterday).expect("yesterday is past");
        assert_eq!(lifespan.age_in_days(), Some(1));
    }

    #[test]
    fn date_of_birth_trumps_known_age() {
        let dob = date(2000, 1, 1);
        let lifespan = Lifespan::create_on(Some(55.into()), Some(dob.into()), fixed_today())
            .expect("valid input");

        assert_eq!(lifespan.known_age(), None);
        assert_eq!(lifespan.date_of_birth(), Some(dob));
        assert_eq!(lifespan.age_on(fixed_today()), Some(24));
        assert_eq!(
            lifespan.describe_on(fixed_today()),
            "DOB: 2000-01-01, Age: 24 years"
        );
    }

    #[test]
    fn date_of_birth_wins_even_over_out_of_range_age() {
        let lifespan =
            Lifespan::create_on(Some(500.into()), Some("1990-02-03".into()), fixed_today())
                .expect("age is discarded");
        assert_eq!(lifespan.known_age(), None);
        assert_eq!(lifespan.age_on(fixed_today()), Some(34));
    }

    #[test]
    fn text_inputs_are_coerced() {
        let from_text_age =
            Lifespan::create_on(Some("42".into()), None, fixed_today()).expect("numeric text");
        assert_eq!(from_text_age.known_age(), Some(42));

        let lenient = Lifespan::create_on(Some(" 7 years".into()), None, fixed_today())
            .expect("leading digits");
        assert_eq!(lenient.known_age(), Some(7));

        let from_timestamp = Lifespan::create_on(
            None,
            Some("1999-12-31T23:30:00-02:00".into()),
            fixed_today(),
        )
        .expect("rfc3339 text");
        assert_eq!(from_timestamp.date_of_birth(), Some(date(2000, 1, 1)));
    }

    #[test]
    fn text_age_is_still_range_checked() {
        let err = Lifespan::create_on(Some("-3".into()), None, fixed_today())
            .expect_err("negative text age");
        assert_eq!(err.message(), AGE_BELOW_ZERO);
    }

    #[test_case("99999999999999999999", AGE_ABOVE_MAX ; "text past i64 max")]
    #[test_case("-9223372036854775808", AGE_BELOW_ZERO ; "text at i64 min")]
    #[test_case("-99999999999999999999", AGE_BELOW_ZERO ; "text past i64 min")]
    fn oversized_text_age_saturates_into_range_check(text: &str, expected: &str) {
        let err = Lifespan::create_on(Some(text.into()), None, fixed_today())
            .expect_err("coerced age out of range");
        assert_eq!(err.message(), expected);
        assert_eq!(lifespan_message(&err), expected);
    }

    #[test_case(1e20, AGE_ABOVE_MAX ; "huge number")]
    #[test_case(200.5, AGE_ABOVE_MAX ; "fractional above max")]
    #[test_case(-1e20, AGE_BELOW_ZERO ; "huge negative number")]
    fn non_integer_numbers_are_truncated_then_range_checked(age: f64, expected: &str) {
        let err = Lifespan::create_on(Some(age.into()), None, fixed_today())
            .expect_err("number out of range");
        assert_eq!(err.message(), expected);
    }

    #[test]
    fn fractional_age_truncates_toward_zero() {
        let lifespan =
            Lifespan::create_on(Some(42.9.into()), None, fixed_today()).expect("in range");
        assert_eq!(lifespan.known_age(), Some(42));

        let infant =
            Lifespan::create_on(Some((-0.5).into()), None, fixed_today()).expect("truncates to 0");
        assert_eq!(infant.known_age(), Some(0));
    }

    #[test]
    fn uncoercible_input_is_silently_absent() {
        let lifespan = Lifespan::create_on(Some("abc".into()), None, fixed_today())
            .expect("bad age text is ignored");
        assert!(lifespan.is_unknown());

        let lifespan = Lifespan::create_on(None, Some("31/02/1990".into()), fixed_today())
            .expect("bad date text is ignored");
        assert!(lifespan.is_unknown());
        assert_eq!(lifespan.describe_on(fixed_today()), "Unknown lifespan");
    }

    #[test]
    fn uncoercible_date_falls_back_to_known_age() {
        let lifespan =
            Lifespan::create_on(Some(30.into()), Some("not a date".into()), fixed_today())
                .expect("age is used");
        assert_eq!(lifespan.known_age(), Some(30));
        assert_eq!(lifespan.date_of_birth(), None);
    }

    #[test]
    fn age_in_days_floors_from_utc_midnight() {
        let lifespan = Lifespan::create_on(None, Some(date(2024, 6, 1).into()), fixed_today())
            .expect("valid dob");
        let now = Utc
            .with_ymd_and_hms(2024, 6, 15, 23, 59, 59)
            .single()
            .expect("valid instant");
        assert_eq!(lifespan.age_in_days_at(now), Some(14));

        let later = Utc
            .with_ymd_and_hms(2024, 6, 16, 0, 0, 0)
            .single()
            .expect("valid instant");
        assert_eq!(lifespan.age_in_days_at(later), Some(15));
    }

    #[test_case(0, "Infant")]
    #[test_case(1, "Toddler")]
    #[test_case(2, "Toddler")]
    #[test_case(3, "Child")]
    #[test_case(12, "Child")]
    #[test_case(13, "Adolescent")]
    #[test_case(17, "Adolescent")]
    #[test_case(18, "Adult")]
    #[test_case(64, "Adult")]
    #[test_case(65, "Senior")]
    #[test_case(120, "Senior")]
    fn life_stage_bands(age: i64, expected: &str) {
        let lifespan = Lifespan::from_known_age(age).expect("age in range");
        assert_eq!(lifespan.life_stage().as_str(), expected);
    }

    #[test]
    fn unknown_lifespan_derivations() {
        let lifespan = Lifespan::create(None, None).expect("nothing supplied");
        assert_eq!(lifespan.age(), None);
        assert_eq!(lifespan.life_stage(), LifeStage::Unknown);
        assert_eq!(lifespan.phi_friendly_string(), "Unknown");
        assert_eq!(lifespan.to_string(), "Unknown lifespan");
    }

    #[test_case(0, "< 1 year")]
    #[test_case(1, "1 years")]
    #[test_case(45, "45 years")]
    #[test_case(89, "89 years")]
    #[test_case(90, "> 89 years")]
    fn phi_friendly_rendering(age: i64, expected: &str) {
        let lifespan = Lifespan::from_known_age(age).expect("age in range");
        assert_eq!(lifespan.phi_friendly_string(), expected);
    }

    #[test]
    fn known_age_display() {
        let lifespan = Lifespan::from_known_age(33).expect("age in range");
        assert_eq!(lifespan.to_string(), "Age: 33 years");
    }

    #[test]
    fn inputs_deserialise_from_numbers_or_strings() {
        let number: KnownAgeInput = serde_json::from_str("200").expect("number");
        assert_eq!(number, KnownAgeInput::Years(200));
        let text: KnownAgeInput = serde_json::from_str("\"12\"").expect("text");
        assert_eq!(text.coerce(), Some(12));
        let huge: KnownAgeInput =
            serde_json::from_str("100000000000000000000").expect("integer past i64");
        assert_eq!(huge.coerce(), Some(i64::MAX));
        let fractional: KnownAgeInput = serde_json::from_str("200.5").expect("fractional");
        assert_eq!(fractional, KnownAgeInput::Number(200.5));

        let dob: DateOfBirthInput = serde_json::from_str("\"1980-04-05\"").expect("date text");
        assert_eq!(dob.coerce(), Some(date(1980, 4, 5)));
    }
}

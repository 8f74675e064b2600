// 🪪 Identity Parser - semantic view of a valid number
//
// Region names come from the table at three prefix lengths (2/4/6 digits).
// Intermediate levels may legitimately be missing from the table. Municipalities
// such as 重庆 list districts directly under the province, so those fall back to
// a synthetic "unknown" label instead of failing.

use crate::codec::{parse_birth_date, Codec, IdentityNumber};
use crate::error::{Result, ToolkitError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SEX
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Odd sequence digit = male, even = female
    pub fn from_sequence(sequence: u16) -> Self {
        if sequence % 2 == 1 {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    /// First sequence code the generator assigns for this sex
    pub fn first_sequence(&self) -> u16 {
        match self {
            Sex::Male => 1,
            Sex::Female => 2,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "男 (Male)",
            Sex::Female => "女 (Female)",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sex {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" | "男" => Ok(Sex::Male),
            "F" | "FEMALE" | "女" => Ok(Sex::Female),
            other => Err(ToolkitError::invalid_input(format!(
                "sex must be 'M' or 'F', got {:?}",
                other
            ))),
        }
    }
}

// ============================================================================
// PARSED IDENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub province: String,
    pub city: String,
    pub district: String,
}

/// Read-only decomposition of a number that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIdentity {
    pub address_code: String,
    pub address: AddressInfo,
    pub birth_date: NaiveDate,
    pub age: i32,
    pub sex: Sex,
    pub sequence_code: String,
    pub check_digit: char,
}

impl ParsedIdentity {
    /// Birth date in `YYYY-MM-DD`
    pub fn birth_date_string(&self) -> String {
        self.birth_date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseOutcome {
    Valid(ParsedIdentity),
    Invalid { error: String },
}

impl ParseOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ParseOutcome::Valid(_))
    }

    pub fn identity(&self) -> Option<&ParsedIdentity> {
        match self {
            ParseOutcome::Valid(identity) => Some(identity),
            ParseOutcome::Invalid { .. } => None,
        }
    }
}

/// Whole years elapsed between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday = (today.month(), today.day()) < (birth.month(), birth.day());
    today.year() - birth.year() - i32::from(before_birthday)
}

impl Codec<'_> {
    /// Validate, then decompose into region names, birth date, age and sex.
    pub fn parse(&self, id: &str) -> ParseOutcome {
        match self.inspect(id) {
            Ok(number) => ParseOutcome::Valid(self.describe(&number)),
            Err(rejection) => ParseOutcome::Invalid {
                error: rejection.reason,
            },
        }
    }

    pub(crate) fn describe(&self, number: &IdentityNumber) -> ParsedIdentity {
        let regions = self.regions();
        let address_code = number.region_code();
        let province_code = &address_code[0..2];
        let city_code = &address_code[0..4];

        let name_or = |code: &str, fallback: &str| {
            regions
                .lookup(code)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}({})", fallback, code))
        };

        // inspect() already rejected impossible dates
        let birth_date = parse_birth_date(number.birth_date_digits()).unwrap_or(self.today());

        ParsedIdentity {
            address_code: address_code.to_string(),
            address: AddressInfo {
                province: name_or(province_code, "未知省份"),
                city: name_or(city_code, "未知城市"),
                district: name_or(address_code, "未知区县"),
            },
            birth_date,
            age: age_on(birth_date, self.today()),
            sex: Sex::from_sequence(number.sequence()),
            sequence_code: number.sequence_code().to_string(),
            check_digit: number.check_digit(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{regions, today, with_check};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_full_address() {
        let table = regions();
        let codec = Codec::new(&table).with_today(today());

        let outcome = codec.parse("11010519491231002X");
        let identity = outcome.identity().expect("should parse");

        assert_eq!(identity.address_code, "110105");
        assert_eq!(identity.address.province, "北京市");
        assert_eq!(identity.address.city, "北京市市辖区");
        assert_eq!(identity.address.district, "北京市市辖区朝阳区");
        assert_eq!(identity.birth_date_string(), "1949-12-31");
        assert_eq!(identity.age, 74);
        assert_eq!(identity.sex, Sex::Female);
        assert_eq!(identity.sequence_code, "002");
        assert_eq!(identity.check_digit, 'X');
    }

    #[test]
    fn test_parse_missing_intermediate_level() {
        let table = regions();
        let codec = Codec::new(&table).with_today(today());

        let id = with_check("50010120000101123");
        let identity = codec.parse(&id).identity().cloned().unwrap();

        assert_eq!(identity.address.province, "重庆市");
        assert_eq!(identity.address.city, "未知城市(5001)");
        assert_eq!(identity.address.district, "重庆市万州区");
        assert_eq!(identity.sex, Sex::Male);
    }

    #[test]
    fn test_parse_invalid_carries_reason() {
        let table = regions();
        let codec = Codec::new(&table).with_today(today());

        let outcome = codec.parse("123");
        assert!(!outcome.is_valid());
        match outcome {
            ParseOutcome::Invalid { error } => assert!(error.starts_with("长度错误")),
            ParseOutcome::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn test_parse_normalizes_lowercase_x() {
        let table = regions();
        let codec = Codec::new(&table).with_today(today());

        let identity = codec.parse("11010519491231002x").identity().cloned().unwrap();
        assert_eq!(identity.check_digit, 'X');
    }

    #[test]
    fn test_age_is_calendar_aware() {
        let birth = date(2000, 6, 15);

        assert_eq!(age_on(birth, date(2024, 6, 14)), 23);
        assert_eq!(age_on(birth, date(2024, 6, 15)), 24);
        assert_eq!(age_on(birth, date(2024, 12, 31)), 24);
        assert_eq!(age_on(birth, birth), 0);

        // Leap-day births turn a year older on Mar 1 in common years
        let leap = date(2000, 2, 29);
        assert_eq!(age_on(leap, date(2023, 2, 28)), 22);
        assert_eq!(age_on(leap, date(2023, 3, 1)), 23);
    }

    #[test]
    fn test_sex_from_str() {
        assert_eq!("m".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!(" F ".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert!(matches!("x".parse::<Sex>(), Err(ToolkitError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_outcome_serialization() {
        let table = regions();
        let codec = Codec::new(&table).with_today(today());

        let json = serde_json::to_value(codec.parse("123")).unwrap();
        assert!(json["invalid"]["error"].as_str().unwrap().starts_with("长度错误"));

        let json = serde_json::to_value(codec.parse("11010519491231002X")).unwrap();
        assert_eq!(json["valid"]["birth_date"], "1949-12-31");
        assert_eq!(json["valid"]["sex"], "Female");
    }
}

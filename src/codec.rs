// 🔢 Identity Number Codec - GB 11643 checksum + structural validation
//
// Layout of an 18-character number:
//   [0..6)   region code
//   [6..14)  birth date YYYYMMDD
//   [14..17) sequence code (odd = male, even = female)
//   [17]     check character, 0-9 or X

use crate::error::{Result, ToolkitError};
use crate::region::RegionTable;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CHECKSUM
// ============================================================================

pub const WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];

/// Indexed by `weighted sum mod 11`
pub const CHECKSUM_MAP: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];

/// Compute the check character for a 17-digit prefix.
pub fn checksum(prefix17: &str) -> Result<char> {
    let bytes = prefix17.as_bytes();
    if bytes.len() != 17 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(ToolkitError::invalid_input(format!(
            "checksum prefix must be exactly 17 ASCII digits, got {:?}",
            prefix17
        )));
    }

    Ok(check_character(bytes))
}

/// Caller guarantees 17 ASCII digits.
fn check_character(prefix: &[u8]) -> char {
    let total: u32 = prefix
        .iter()
        .zip(WEIGHTS.iter())
        .map(|(digit, weight)| u32::from(digit - b'0') * weight)
        .sum();

    CHECKSUM_MAP[(total % 11) as usize]
}

/// 17 ASCII digits followed by a digit or `X`
fn is_well_shaped(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 18
        && bytes[..17].iter().all(u8::is_ascii_digit)
        && (bytes[17].is_ascii_digit() || bytes[17] == b'X')
}

/// Parse `YYYYMMDD` into a real calendar date. Years start at 0001.
pub(crate) fn parse_birth_date(digits: &str) -> Option<NaiveDate> {
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = digits[0..4].parse().ok()?;
    if year < 1 {
        return None;
    }
    let month = digits[4..6].parse().ok()?;
    let day = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

// ============================================================================
// IDENTITY NUMBER
// ============================================================================

/// An 18-character number whose shape (17 digits + digit/`X`) is known good.
///
/// Shape only: region, date and checksum are the codec's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityNumber(String);

impl IdentityNumber {
    /// Accept an already complete number; only the shape is checked.
    /// A lowercase `x` is normalized to `X`.
    pub fn new(id: &str) -> Result<Self> {
        let normalized = id.to_ascii_uppercase();
        if !is_well_shaped(&normalized) {
            return Err(ToolkitError::invalid_input(format!(
                "identity number must be 17 digits followed by a digit or 'X', got {:?}",
                id
            )));
        }
        Ok(IdentityNumber(normalized))
    }

    /// Build from a 17-digit prefix, appending the computed check character.
    pub fn from_prefix(prefix17: &str) -> Result<Self> {
        let check = checksum(prefix17)?;
        Ok(IdentityNumber(format!("{}{}", prefix17, check)))
    }

    pub fn region_code(&self) -> &str {
        &self.0[0..6]
    }

    pub fn birth_date_digits(&self) -> &str {
        &self.0[6..14]
    }

    pub fn sequence_code(&self) -> &str {
        &self.0[14..17]
    }

    /// Sequence code as a number (0..=999)
    pub fn sequence(&self) -> u16 {
        self.0.as_bytes()[14..17]
            .iter()
            .fold(0, |acc, b| acc * 10 + u16::from(b - b'0'))
    }

    pub fn prefix17(&self) -> &str {
        &self.0[0..17]
    }

    pub fn check_digit(&self) -> char {
        char::from(self.0.as_bytes()[17])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdentityNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IdentityNumber {
    type Error = ToolkitError;

    fn try_from(value: String) -> Result<Self> {
        IdentityNumber::new(&value)
    }
}

impl From<IdentityNumber> for String {
    fn from(id: IdentityNumber) -> Self {
        id.0
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Length,
    Format,
    Address,
    Date,
    Checksum,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Length => "length",
            FailureKind::Format => "format",
            FailureKind::Address => "address",
            FailureKind::Date => "date",
            FailureKind::Checksum => "checksum",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first check a number failed, with its user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub kind: FailureKind,
    pub reason: String,
}

impl Rejection {
    fn new(kind: FailureKind, reason: String) -> Self {
        Rejection { kind, reason }
    }
}

pub const VALID_MESSAGE: &str = "身份证号码有效";

/// Outcome of `Codec::validate`. Always data, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub ok: bool,
    pub reason: String,
    pub kind: Option<FailureKind>,
}

impl Validation {
    pub fn pass() -> Self {
        Validation {
            ok: true,
            reason: VALID_MESSAGE.to_string(),
            kind: None,
        }
    }

    pub fn fail(rejection: Rejection) -> Self {
        Validation {
            ok: false,
            reason: rejection.reason,
            kind: Some(rejection.kind),
        }
    }
}

// ============================================================================
// CODEC
// ============================================================================

/// Validation context: the region table plus the date treated as "today".
///
/// "Today" bounds birth dates and drives age computation, so it is part of
/// the value instead of being read from the clock at every call.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'a> {
    regions: &'a RegionTable,
    today: NaiveDate,
}

impl<'a> Codec<'a> {
    pub fn new(regions: &'a RegionTable) -> Self {
        Codec {
            regions,
            today: Local::now().date_naive(),
        }
    }

    /// Builder pattern: pin the reference date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn regions(&self) -> &'a RegionTable {
        self.regions
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Validate a candidate number, reporting the first failing check.
    pub fn validate(&self, id: &str) -> Validation {
        match self.inspect(id) {
            Ok(_) => Validation::pass(),
            Err(rejection) => Validation::fail(rejection),
        }
    }

    /// Run every check in order, yielding the normalized number on success.
    ///
    /// Input is trimmed and upper-cased first, so a trailing `x` is accepted.
    pub fn inspect(&self, id: &str) -> std::result::Result<IdentityNumber, Rejection> {
        let normalized = id.trim().to_uppercase();

        // Rule 1: length, counted in characters
        let mut chars = normalized.char_indices();
        let (idx, last) = match (chars.nth(17), chars.next()) {
            (Some(eighteenth), None) => eighteenth,
            _ => {
                return Err(Rejection::new(
                    FailureKind::Length,
                    "长度错误：必须为18位".to_string(),
                ));
            }
        };

        // Rule 2: 17-digit prefix. Past this point the prefix is ASCII.
        let prefix = &normalized[..idx];
        if !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Rejection::new(
                FailureKind::Format,
                "格式错误：前17位必须是数字".to_string(),
            ));
        }

        // Rule 3: check character
        if !(last.is_ascii_digit() || last == 'X') {
            return Err(Rejection::new(
                FailureKind::Format,
                "格式错误：最后一位必须是数字或'X'".to_string(),
            ));
        }

        // Rule 4: region code
        let region_code = &prefix[0..6];
        if !self.regions.contains(region_code) {
            return Err(Rejection::new(
                FailureKind::Address,
                format!("地址码错误：无效的行政区划代码 {}", region_code),
            ));
        }

        // Rule 5: birth date is real and not in the future
        let birth_digits = &prefix[6..14];
        match parse_birth_date(birth_digits) {
            Some(birth) if birth > self.today => {
                return Err(Rejection::new(
                    FailureKind::Date,
                    format!("日期错误：出生日期不能是未来日期 {}", birth_digits),
                ));
            }
            Some(_) => {}
            None => {
                return Err(Rejection::new(
                    FailureKind::Date,
                    format!("日期错误：无效的出生日期格式 {}", birth_digits),
                ));
            }
        }

        // Rule 6: checksum
        let expected = check_character(prefix.as_bytes());
        if last != expected {
            return Err(Rejection::new(
                FailureKind::Checksum,
                format!("校验码错误：计算值应为 '{}'，提供值为 '{}'", expected, last),
            ));
        }

        Ok(IdentityNumber(normalized))
    }
}

// ============================================================================
// TESTS
// ============================================================================

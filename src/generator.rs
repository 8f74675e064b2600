// 🔁 Reverse Generator - every candidate for region + birth date + sex
//
// The sequence code is the only unknown: 3 digits, parity fixed by sex.
// Male covers 001, 003, ..., 999 (500 candidates); female covers
// 002, 004, ..., 998 (499 candidates). Order is ascending by sequence.

use crate::codec::{parse_birth_date, Codec, IdentityNumber};
use crate::error::{Result, ToolkitError};
use crate::identity::Sex;

/// Highest sequence code (exclusive)
const SEQUENCE_END: u16 = 1000;

impl Codec<'_> {
    /// Enumerate every structurally valid number for the given inputs.
    ///
    /// Future birth dates are not rejected here; `validate` will.
    pub fn guess(
        &self,
        region_code: &str,
        birth_date_digits: &str,
        sex: Sex,
    ) -> Result<Vec<IdentityNumber>> {
        let well_formed = region_code.len() == 6 && region_code.bytes().all(|b| b.is_ascii_digit());
        if !well_formed || !self.regions().contains(region_code) {
            return Err(ToolkitError::invalid_input(format!(
                "无效或不存在的行政区划代码 {}",
                region_code
            )));
        }
        if parse_birth_date(birth_date_digits).is_none() {
            return Err(ToolkitError::invalid_input(format!(
                "无效的出生日期格式 {} (应为 YYYYMMDD)",
                birth_date_digits
            )));
        }

        let prefix14 = format!("{}{}", region_code, birth_date_digits);
        (sex.first_sequence()..SEQUENCE_END)
            .step_by(2)
            .map(|seq| IdentityNumber::from_prefix(&format!("{}{:03}", prefix14, seq)))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

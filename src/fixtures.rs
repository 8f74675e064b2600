// Shared test fixtures: a small region table and a pinned "today"

use crate::codec::checksum;
use crate::region::RegionTable;
use chrono::NaiveDate;

pub const REGIONS_JSON: &str = r#"[
    {"code": "11", "name": "北京市", "children": [
        {"code": "1101", "name": "市辖区", "children": [
            {"code": "110101", "name": "东城区"},
            {"code": "110105", "name": "朝阳区"}
        ]}
    ]},
    {"code": "44", "name": "广东省", "children": [
        {"code": "4403", "name": "深圳市", "children": [
            {"code": "440305", "name": "南山区"}
        ]}
    ]},
    {"code": "50", "name": "重庆市", "children": [
        {"code": "500101", "name": "万州区"}
    ]}
]"#;

pub const DISTRICTS: [&str; 4] = ["110101", "110105", "440305", "500101"];

pub fn regions() -> RegionTable {
    RegionTable::from_json(REGIONS_JSON).unwrap()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// Append the correct check character to a 17-digit prefix.
pub fn with_check(prefix17: &str) -> String {
    format!("{}{}", prefix17, checksum(prefix17).unwrap())
}

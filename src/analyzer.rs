// 📊 Population Sample Analyzer
//
// Batch-validates numbers and estimates how many people were registered per
// (region, birth date) from the highest sequence code seen for each sex.
//
// The estimate assumes sequence codes are handed out densely and in order
// within a region/date/sex. Nothing guarantees that, so the figures are an
// approximate upper bound derived from the sample, never an exact count.

use crate::codec::Codec;
use crate::identity::Sex;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

pub const ESTIMATE_NOTE: &str = "基于样本中最大顺序码的统计估算，非精确值。";
pub const UNKNOWN_REGION: &str = "未知地区";

// ============================================================================
// REPORT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEstimate {
    /// `"<region full name> (<YYYYMMDD>)"`; not unique if two codes share a name
    pub label: String,
    pub region_code: String,
    pub birth_date: String,
    pub sample_count: usize,
    pub estimated_male: u32,
    pub estimated_female: u32,
    pub estimated_total: u32,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidRecord {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: SampleSummary,
    /// Ordered by region code, then birth date
    pub groups: Vec<GroupEstimate>,
    /// In input order
    pub invalid_details: Vec<InvalidRecord>,
}

// ============================================================================
// BUCKETS
// ============================================================================

#[derive(Debug, Default)]
struct AnalysisBucket {
    male_sequences: Vec<u16>,
    female_sequences: Vec<u16>,
}

impl AnalysisBucket {
    fn push(&mut self, sequence: u16) {
        match Sex::from_sequence(sequence) {
            Sex::Male => self.male_sequences.push(sequence),
            Sex::Female => self.female_sequences.push(sequence),
        }
    }

    fn sample_count(&self) -> usize {
        self.male_sequences.len() + self.female_sequences.len()
    }

    /// Odd codes 1, 3, ..., n cover (n + 1) / 2 people
    fn estimated_male(&self) -> u32 {
        self.male_sequences
            .iter()
            .max()
            .map_or(0, |&max| (u32::from(max) + 1) / 2)
    }

    /// Even codes 2, 4, ..., n cover n / 2 people
    fn estimated_female(&self) -> u32 {
        self.female_sequences
            .iter()
            .max()
            .map_or(0, |&max| u32::from(max) / 2)
    }
}

// ============================================================================
// ANALYSIS
// ============================================================================

impl Codec<'_> {
    /// Validate a batch and estimate registrations per region and birth date.
    ///
    /// A bad record never stops the batch; it lands in `invalid_details`
    /// with the reason of the first check it failed.
    pub fn analyze_sample<S: AsRef<str>>(&self, ids: &[S]) -> AnalysisReport {
        let mut invalid_details = Vec::new();
        let mut buckets: BTreeMap<(String, String), AnalysisBucket> = BTreeMap::new();

        for raw in ids {
            let raw = raw.as_ref();
            match self.inspect(raw) {
                Ok(number) => {
                    let key = (
                        number.region_code().to_string(),
                        number.birth_date_digits().to_string(),
                    );
                    buckets.entry(key).or_default().push(number.sequence());
                }
                Err(rejection) => {
                    debug!(kind = %rejection.kind, "rejected record");
                    invalid_details.push(InvalidRecord {
                        id: raw.to_string(),
                        reason: rejection.reason,
                    });
                }
            }
        }

        let groups: Vec<GroupEstimate> = buckets
            .into_iter()
            .map(|((region_code, birth_date), bucket)| {
                let region_name = self
                    .regions()
                    .lookup(&region_code)
                    .unwrap_or(UNKNOWN_REGION);
                let estimated_male = bucket.estimated_male();
                let estimated_female = bucket.estimated_female();

                GroupEstimate {
                    label: format!("{} ({})", region_name, birth_date),
                    region_code,
                    birth_date,
                    sample_count: bucket.sample_count(),
                    estimated_male,
                    estimated_female,
                    estimated_total: estimated_male + estimated_female,
                    note: ESTIMATE_NOTE.to_string(),
                }
            })
            .collect();

        let summary = SampleSummary {
            total: ids.len(),
            valid: ids.len() - invalid_details.len(),
            invalid: invalid_details.len(),
        };
        info!(
            total = summary.total,
            valid = summary.valid,
            invalid = summary.invalid,
            groups = groups.len(),
            "sample analyzed"
        );

        AnalysisReport {
            summary,
            groups,
            invalid_details,
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

impl SampleSummary {
    pub fn summary(&self) -> String {
        format!(
            "共处理 {} 条记录: {} 条有效, {} 条无效",
            self.total, self.valid, self.invalid
        )
    }
}

impl AnalysisReport {
    /// Plain-text report with summary, estimates and invalid records.
    pub fn render_text(&self, source: &str, generated_at: NaiveDateTime) -> String {
        TextReport {
            report: self,
            source,
            generated_at,
        }
        .to_string()
    }
}

struct TextReport<'a> {
    report: &'a AnalysisReport,
    source: &'a str,
    generated_at: NaiveDateTime,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        let summary = &self.report.summary;

        writeln!(f, "身份证号码批量分析报告")?;
        writeln!(f, "生成时间: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "数据源文件: {}", self.source)?;
        writeln!(f, "{}\n", rule)?;

        writeln!(f, "【1. 分析摘要】")?;
        writeln!(f, "  - 总计处理记录: {} 条", summary.total)?;
        writeln!(f, "  - 有效记录数量: {} 条", summary.valid)?;
        writeln!(f, "  - 无效记录数量: {} 条\n", summary.invalid)?;

        writeln!(f, "【2. 人口估算统计报告】")?;
        if self.report.groups.is_empty() {
            writeln!(f, "  在提供的列表中未找到任何有效的身份证号码进行分析。")?;
        }
        for group in &self.report.groups {
            writeln!(f, "\n  分析对象: {}", group.label)?;
            writeln!(f, "    - 有效样本数量: {}", group.sample_count)?;
            writeln!(f, "    - 估算男性登记数: {}", group.estimated_male)?;
            writeln!(f, "    - 估算女性登记数: {}", group.estimated_female)?;
            writeln!(f, "    - 估算总登记数: {}", group.estimated_total)?;
            writeln!(f, "    - 备注: {}", group.note)?;
        }
        writeln!(f, "\n{}\n", rule)?;

        writeln!(f, "【3. 无效记录详情】")?;
        if self.report.invalid_details.is_empty() {
            writeln!(f, "  所有记录均有效，无无效记录。")?;
        }
        for record in &self.report.invalid_details {
            writeln!(f, "  - 号码: {:<20} | 原因: {}", record.id, record.reason)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

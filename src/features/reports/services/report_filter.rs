//! Search, filter and sort for the report browser.
//!
//! Everything here is pure: the same input list and criteria always give the
//! same output, and the input is never modified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;

use crate::features::reports::models::{CatGender, Report, ReportStatus};
use crate::shared::constants::{REPORT_TYPE_FOUND, REPORT_TYPE_LOST};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortOption::Newest),
            "oldest" => Ok(SortOption::Oldest),
            "name-asc" => Ok(SortOption::NameAsc),
            "name-desc" => Ok(SortOption::NameDesc),
            other => Err(format!(
                "Unknown sort '{}'. Expected one of: newest, oldest, name-asc, name-desc",
                other
            )),
        }
    }
}

/// Accepted values per category; an empty set accepts everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub status: HashSet<ReportStatus>,
    pub gender: HashSet<CatGender>,
    /// Normalized with [`normalize_report_type`]
    pub report_type: HashSet<String>,
}

impl ReportFilters {
    /// Number of selected values across all categories
    pub fn active_count(&self) -> usize {
        self.status.len() + self.gender.len() + self.report_type.len()
    }

    /// AND across categories, OR within one
    pub fn accepts(&self, report: &Report) -> bool {
        (self.status.is_empty() || self.status.contains(&report.status))
            && (self.gender.is_empty() || self.gender.contains(&report.gender))
            && (self.report_type.is_empty()
                || self
                    .report_type
                    .contains(&normalize_report_type(&report.report_type)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportCriteria {
    pub query: String,
    pub filters: ReportFilters,
    pub sort: SortOption,
}

/// Canonical spelling of a report type
///
/// English and Indonesian names of the two conventional types collapse to the
/// Indonesian label; anything else is kept as typed, trimmed.
pub fn normalize_report_type(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "lost" | "hilang" => REPORT_TYPE_LOST.to_string(),
        "found" | "ditemukan" => REPORT_TYPE_FOUND.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Case-insensitive substring match on name, breed, location and type
///
/// `needle` must already be lowercased. An empty needle matches every report.
fn matches_query(report: &Report, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        &report.name,
        &report.breed,
        &report.location_text,
        &report.report_type,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Primary sort key: decomposed, combining marks dropped, lowercased
///
/// - "Émile" -> "emile"
/// - "Ádam" -> "adam"
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Accent- and case-insensitive comparison with deterministic tie-breaks
///
/// Names equal after folding are ordered unaccented before accented, then
/// lowercase before uppercase by code point, so "Oyen" and "oyen" never compare
/// equal and descending order is the exact reverse of ascending.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn timestamp(report: &Report) -> DateTime<Utc> {
    report.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Search, filter, then sort
///
/// The sort is stable, so reports that compare equal keep their input order.
pub fn apply<'a>(reports: &'a [Report], criteria: &ReportCriteria) -> Vec<&'a Report> {
    let needle = criteria.query.to_lowercase();

    let mut out: Vec<&Report> = reports
        .iter()
        .filter(|r| matches_query(r, &needle))
        .filter(|r| criteria.filters.accepts(r))
        .collect();

    match criteria.sort {
        SortOption::Newest => out.sort_by(|a, b| timestamp(b).cmp(&timestamp(a))),
        SortOption::Oldest => out.sort_by(|a, b| timestamp(a).cmp(&timestamp(b))),
        SortOption::NameAsc => out.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortOption::NameDesc => out.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }

    out
}

/// Report counts per status, for the "my reports" summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub found: usize,
    pub closed: usize,
}

pub fn count_by_status<'a>(reports: impl IntoIterator<Item = &'a Report>) -> StatusCounts {
    reports
        .into_iter()
        .fold(StatusCounts::default(), |mut counts, report| {
            counts.total += 1;
            match report.status {
                ReportStatus::Active => counts.active += 1,
                ReportStatus::Found => counts.found += 1,
                ReportStatus::Closed => counts.closed += 1,
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use fake::{Fake, Faker};

    fn report(name: &str, breed: &str, location: &str, report_type: &str) -> Report {
        let mut r: Report = Faker.fake();
        r.name = name.to_string();
        r.breed = breed.to_string();
        r.location_text = location.to_string();
        r.report_type = report_type.to_string();
        r.status = ReportStatus::Active;
        r.gender = CatGender::Unknown;
        r
    }

    fn at(day: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap())
    }

    fn names(reports: &[&Report]) -> Vec<String> {
        reports.iter().map(|r| r.name.clone()).collect()
    }

    fn random_reports(count: usize) -> Vec<Report> {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let mut r: Report = Faker.fake();
                r.name = format!("{} {}", fake::faker::name::en::FirstName().fake::<String>(), i);
                r.created_at = if i % 7 == 0 {
                    None
                } else {
                    Some(base + Duration::minutes((0..100_000).fake::<i64>()))
                };
                r
            })
            .collect()
    }

    #[test]
    fn test_query_matches_location() {
        let reports = vec![
            report("Oyen", "Domestic", "Menteng", REPORT_TYPE_LOST),
            report("Mimi", "Persian", "Kemang", REPORT_TYPE_FOUND),
        ];
        let criteria = ReportCriteria {
            query: "men".to_string(),
            ..Default::default()
        };

        assert_eq!(names(&apply(&reports, &criteria)), vec!["Oyen"]);
    }

    #[test]
    fn test_query_is_case_insensitive_across_fields() {
        let reports = vec![
            report("Oyen", "Domestic", "Menteng", REPORT_TYPE_LOST),
            report("Mimi", "Persian", "Kemang", REPORT_TYPE_FOUND),
            report("Belang", "Anggora", "Depok", REPORT_TYPE_LOST),
        ];

        let by = |q: &str| {
            let criteria = ReportCriteria {
                query: q.to_string(),
                sort: SortOption::NameAsc,
                ..Default::default()
            };
            names(&apply(&reports, &criteria))
        };

        assert_eq!(by("PERSIAN"), vec!["Mimi"]);
        assert_eq!(by("hilang"), vec!["Belang", "Oyen"]);
        assert_eq!(by("ditemukan"), vec!["Mimi"]);
        assert!(by("siamese").is_empty());
    }

    #[test]
    fn test_every_result_contains_query_and_every_exclusion_does_not() {
        let reports = random_reports(60);
        let needle = "a";
        let criteria = ReportCriteria {
            query: needle.to_uppercase(),
            ..Default::default()
        };

        let result = apply(&reports, &criteria);
        let contains = |r: &Report| {
            [&r.name, &r.breed, &r.location_text, &r.report_type]
                .iter()
                .any(|f| f.to_lowercase().contains(needle))
        };

        assert!(result.iter().all(|r| contains(r)));
        let kept: HashSet<_> = result.iter().map(|r| r.id).collect();
        assert!(reports
            .iter()
            .filter(|r| !kept.contains(&r.id))
            .all(|r| !contains(r)));
    }

    #[test]
    fn test_empty_criteria_returns_everything_newest_first() {
        let mut reports = random_reports(40);
        reports[3].created_at = None;

        let result = apply(&reports, &ReportCriteria::default());
        assert_eq!(result.len(), reports.len());
        assert!(result
            .windows(2)
            .all(|w| timestamp(w[0]) >= timestamp(w[1])));
        // Missing timestamps sort as the earliest instant
        assert!(result.last().unwrap().created_at.is_none());
    }

    #[test]
    fn test_filters_and_across_or_within() {
        let mut reports = Vec::new();
        for (i, (status, gender, kind)) in [
            (ReportStatus::Active, CatGender::Male, REPORT_TYPE_LOST),
            (ReportStatus::Found, CatGender::Male, REPORT_TYPE_LOST),
            (ReportStatus::Closed, CatGender::Male, REPORT_TYPE_LOST),
            (ReportStatus::Active, CatGender::Female, REPORT_TYPE_FOUND),
            (ReportStatus::Found, CatGender::Unknown, "lost"),
        ]
        .into_iter()
        .enumerate()
        {
            let mut r = report(&format!("cat-{}", i), "Domestic", "Bandung", kind);
            r.status = status;
            r.gender = gender;
            r.created_at = at(i as u32 + 1);
            reports.push(r);
        }

        let criteria = ReportCriteria {
            filters: ReportFilters {
                status: [ReportStatus::Active, ReportStatus::Found].into(),
                report_type: [REPORT_TYPE_LOST.to_string()].into(),
                ..Default::default()
            },
            sort: SortOption::Oldest,
            ..Default::default()
        };

        let result = apply(&reports, &criteria);
        // "lost" is the same type as "Hilang"
        assert_eq!(names(&result), vec!["cat-0", "cat-1", "cat-4"]);
        assert!(result.iter().all(|r| criteria.filters.status.contains(&r.status)));
        assert_eq!(criteria.filters.active_count(), 3);

        let only_female = ReportFilters {
            gender: [CatGender::Female].into(),
            ..Default::default()
        };
        assert!(reports
            .iter()
            .all(|r| only_female.accepts(r) == (r.gender == CatGender::Female)));
    }

    #[test]
    fn test_name_sort_directions_are_reverses() {
        let reports = random_reports(50);
        let asc = apply(
            &reports,
            &ReportCriteria {
                sort: SortOption::NameAsc,
                ..Default::default()
            },
        );
        let mut desc = apply(
            &reports,
            &ReportCriteria {
                sort: SortOption::NameDesc,
                ..Default::default()
            },
        );

        desc.reverse();
        assert_eq!(names(&asc), names(&desc));
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let reports = vec![
            report("belang", "", "", ""),
            report("Oyen", "", "", ""),
            report("Anggun", "", "", ""),
            report("oyen", "", "", ""),
        ];
        let sorted = apply(
            &reports,
            &ReportCriteria {
                sort: SortOption::NameAsc,
                ..Default::default()
            },
        );
        assert_eq!(names(&sorted), vec!["Anggun", "belang", "Oyen", "oyen"]);
    }

    #[test]
    fn test_name_sort_folds_accents() {
        let reports = vec![
            report("Zara", "", "", ""),
            report("Émile", "", "", ""),
            report("Ádam", "", "", ""),
            report("Budi", "", "", ""),
            report("Emile", "", "", ""),
        ];
        let by = |sort| {
            names(&apply(
                &reports,
                &ReportCriteria {
                    sort,
                    ..Default::default()
                },
            ))
        };

        assert_eq!(
            by(SortOption::NameAsc),
            vec!["Ádam", "Budi", "Emile", "Émile", "Zara"]
        );
        assert_eq!(
            by(SortOption::NameDesc),
            vec!["Zara", "Émile", "Emile", "Budi", "Ádam"]
        );
    }

    #[test]
    fn test_compare_names_is_total() {
        assert_eq!(compare_names("Émile", "emile"), Ordering::Greater);
        assert_eq!(compare_names("emile", "Emile"), Ordering::Greater);
        assert_eq!(compare_names("Ádam", "Ádam"), Ordering::Equal);
        assert_eq!(compare_names("Ádam", "Adam"), Ordering::Greater);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let mut reports = vec![
            report("first", "", "", ""),
            report("second", "", "", ""),
            report("third", "", "", ""),
        ];
        for r in &mut reports {
            r.created_at = at(5);
        }

        for sort in [SortOption::Newest, SortOption::Oldest] {
            let result = apply(
                &reports,
                &ReportCriteria {
                    sort,
                    ..Default::default()
                },
            );
            assert_eq!(names(&result), vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let reports = random_reports(10);
        let before: Vec<_> = reports.iter().map(|r| r.id).collect();
        let _ = apply(
            &reports,
            &ReportCriteria {
                sort: SortOption::NameDesc,
                ..Default::default()
            },
        );
        let after: Vec<_> = reports.iter().map(|r| r.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_normalize_report_type() {
        assert_eq!(normalize_report_type(" lost "), REPORT_TYPE_LOST);
        assert_eq!(normalize_report_type("HILANG"), REPORT_TYPE_LOST);
        assert_eq!(normalize_report_type("Found"), REPORT_TYPE_FOUND);
        assert_eq!(normalize_report_type("Adopsi"), "Adopsi");
    }

    #[test]
    fn test_sort_option_parsing() {
        assert_eq!("name-asc".parse::<SortOption>(), Ok(SortOption::NameAsc));
        assert_eq!("NEWEST".parse::<SortOption>(), Ok(SortOption::Newest));
        assert!("random".parse::<SortOption>().is_err());
        assert_eq!(
            serde_json::to_string(&SortOption::NameDesc).unwrap(),
            r#""name-desc""#
        );
    }

    #[test]
    fn test_count_by_status() {
        let mut reports = random_reports(3);
        reports[0].status = ReportStatus::Active;
        reports[1].status = ReportStatus::Found;
        reports[2].status = ReportStatus::Found;

        assert_eq!(
            count_by_status(&reports),
            StatusCounts {
                total: 3,
                active: 1,
                found: 2,
                closed: 0
            }
        );
    }
}

use serde::Serialize;

use crate::{model::common::QuestionOption, results::tally::OptionCount};

/// An option's label with its share of participants.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct OptionPercentage {
    pub option: String,
    pub percentage: String,
}

/// Format `count / total` as a percentage string with exactly two decimal
/// places, e.g. `"33.33"`.
///
/// Rounding is half-up on the second decimal, computed in integer arithmetic
/// so equal counts always format identically. A total of zero yields
/// `"0.00"` for any count.
pub fn format_percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    // Per-cent with two decimals means scaling by 10_000.
    let scaled = count * 10_000;
    let mut hundredths = scaled / total;
    if (scaled % total) * 2 >= total {
        hundredths += 1;
    }
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// Pair each option's label with its formatted percentage of `total`
/// participants, preserving the option order of `counts`.
pub fn percentages(
    options: &[QuestionOption],
    counts: &[OptionCount],
    total: u64,
) -> Vec<OptionPercentage> {
    counts
        .iter()
        .map(|count| OptionPercentage {
            option: options
                .iter()
                .find(|option| option.id == count.option_id)
                .map(|option| option.value.clone())
                .unwrap_or_default(),
            percentage: format_percentage(count.count, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fractions_format_cleanly() {
        assert_eq!(format_percentage(1, 2), "50.00");
        assert_eq!(format_percentage(0, 2), "0.00");
        assert_eq!(format_percentage(2, 2), "100.00");
        assert_eq!(format_percentage(1, 4), "25.00");
    }

    #[test]
    fn repeating_fractions_round_half_up() {
        assert_eq!(format_percentage(1, 3), "33.33");
        assert_eq!(format_percentage(2, 3), "66.67");
        assert_eq!(format_percentage(1, 6), "16.67");
        assert_eq!(format_percentage(5, 6), "83.33");
    }

    #[test]
    fn rounding_boundary_is_half_up() {
        // 1/20000 = 0.005%, exactly on the boundary.
        assert_eq!(format_percentage(1, 20_000), "0.01");
        // Just below the boundary truncates.
        assert_eq!(format_percentage(1, 20_001), "0.00");
    }

    #[test]
    fn zero_total_never_divides() {
        assert_eq!(format_percentage(0, 0), "0.00");
        assert_eq!(format_percentage(3, 0), "0.00");
    }

    #[test]
    fn percentages_pair_labels_with_counts() {
        let options = vec![
            QuestionOption {
                id: 1,
                value: "Yes".to_string(),
            },
            QuestionOption {
                id: 2,
                value: "No".to_string(),
            },
        ];
        let counts = vec![
            OptionCount {
                option_id: 1,
                count: 2,
            },
            OptionCount {
                option_id: 2,
                count: 1,
            },
        ];
        assert_eq!(
            percentages(&options, &counts, 4),
            vec![
                OptionPercentage {
                    option: "Yes".to_string(),
                    percentage: "50.00".to_string(),
                },
                OptionPercentage {
                    option: "No".to_string(),
                    percentage: "25.00".to_string(),
                },
            ]
        );
    }
}

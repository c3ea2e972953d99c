use crate::model::common::{OptionId, QuestionType};

/// A raw answer value decoded according to its question's type.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum NormalizedAnswer {
    /// Free text, kept verbatim.
    OpenText(String),
    /// A single selected option, or `None` if the value was not a valid ID.
    SingleChoice(Option<OptionId>),
    /// Zero or more selected options; unparseable entries are dropped.
    MultiChoice(Vec<OptionId>),
}

impl NormalizedAnswer {
    /// Whether this answer selects the given option.
    pub fn selects(&self, option_id: OptionId) -> bool {
        match self {
            NormalizedAnswer::OpenText(_) => false,
            NormalizedAnswer::SingleChoice(selected) => *selected == Some(option_id),
            NormalizedAnswer::MultiChoice(selected) => selected.contains(&option_id),
        }
    }
}

/// Decode a raw stored answer value according to the question type.
///
/// Raw values are stored as strings: open answers verbatim, closed answers as
/// a single option ID, nominal answers as a comma-separated list of option
/// IDs. Malformed fragments never fail the decode; they simply select
/// nothing, so a stale answer cannot break results for everyone else.
pub fn normalize(question_type: QuestionType, raw: &str) -> NormalizedAnswer {
    match question_type {
        QuestionType::Open => NormalizedAnswer::OpenText(raw.to_string()),
        QuestionType::Closed => NormalizedAnswer::SingleChoice(raw.trim().parse().ok()),
        QuestionType::Nominal => NormalizedAnswer::MultiChoice(
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .filter_map(|part| part.parse().ok())
                .collect(),
        ),
    }
}

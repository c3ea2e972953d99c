use crate::{
    model::common::{OptionId, QuestionOption, QuestionType},
    results::normalize::normalize,
};

/// Per-option selection count.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct OptionCount {
    pub option_id: OptionId,
    pub count: u64,
}

/// The outcome of tallying a question's answers.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Tally {
    /// Open questions: the answer texts, in submission order.
    Verbatim(Vec<String>),
    /// Choice questions: selection counts per option, in declaration order.
    Counts(Vec<OptionCount>),
    /// A choice question with no options cannot be tallied.
    Unavailable,
}

/// Tally raw answer values against a question's options.
///
/// Answers selecting options that no longer exist contribute to no count;
/// an answer selecting several options increments each of them once.
pub fn tally(
    question_type: QuestionType,
    options: &[QuestionOption],
    raw_answers: &[String],
) -> Tally {
    if !question_type.has_options() {
        return Tally::Verbatim(raw_answers.to_vec());
    }
    if options.is_empty() {
        return Tally::Unavailable;
    }

    let normalized = raw_answers
        .iter()
        .map(|raw| normalize(question_type, raw))
        .collect::<Vec<_>>();

    let counts = options
        .iter()
        .map(|option| OptionCount {
            option_id: option.id,
            count: normalized
                .iter()
                .filter(|answer| answer.selects(option.id))
                .count() as u64,
        })
        .collect();
    Tally::Counts(counts)
}

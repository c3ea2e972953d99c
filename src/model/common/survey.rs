use std::fmt::{Display, Formatter};

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// Our survey IDs are integers.
pub type SurveyId = u32;
/// Our question IDs are integers.
pub type QuestionId = u32;
/// Our option IDs are integers, unique within their question.
pub type OptionId = u32;

/// States in the Survey lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyState {
    /// Under construction, only visible to its owner.
    Unpublished,
    /// Open for participation. Going back to `Unpublished` deletes all
    /// participants and their answers.
    Published,
}

impl From<SurveyState> for Bson {
    fn from(state: SurveyState) -> Self {
        to_bson(&state).expect("Serialisation is infallible")
    }
}

/// The three kinds of question a survey can contain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Free text; answers are unconstrained strings.
    Open,
    /// Single selection; exactly one option per answer.
    Closed,
    /// Multiple selection; zero or more options per answer.
    Nominal,
}

impl QuestionType {
    /// Whether this kind of question carries a set of options.
    pub fn has_options(self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Open => "open",
                Self::Closed => "closed",
                Self::Nominal => "nominal",
            }
        )
    }
}

/// A single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question unique ID.
    pub id: QuestionId,
    /// Question kind.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Question text.
    pub text: String,
    /// Possible answers, in declaration order. Always empty for `open` questions.
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Does this question declare the given option?
    pub fn has_option(&self, option_id: OptionId) -> bool {
        self.options.iter().any(|option| option.id == option_id)
    }

    /// Does the other question have the same answer structure (type and
    /// options)? Recorded answers stay meaningful across a text-only edit,
    /// but not across a structural one.
    pub fn same_structure(&self, other: &Self) -> bool {
        self.question_type == other.question_type && self.options == other.options
    }
}

/// One selectable option of a `closed` or `nominal` question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option ID, unique within its question.
    pub id: OptionId,
    /// Display label, e.g. "true" or "chocolate".
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: 1,
            question_type: QuestionType::Closed,
            text: "Do you like it?".to_string(),
            options: vec![
                QuestionOption {
                    id: 1,
                    value: "Yes".to_string(),
                },
                QuestionOption {
                    id: 2,
                    value: "No".to_string(),
                },
            ],
        }
    }

    #[test]
    fn text_only_edits_keep_the_structure() {
        let before = question();
        let mut after = question();
        after.text = "Do you really like it?".to_string();
        assert!(after.same_structure(&before));
    }

    #[test]
    fn type_or_option_edits_change_the_structure() {
        let before = question();

        let mut retyped = question();
        retyped.question_type = QuestionType::Nominal;
        assert!(!retyped.same_structure(&before));

        let mut relabelled = question();
        relabelled.options[0].value = "Definitely".to_string();
        assert!(!relabelled.same_structure(&before));

        let mut truncated = question();
        truncated.options.pop();
        assert!(!truncated.same_structure(&before));
    }
}

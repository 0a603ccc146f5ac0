//! Dashboard statistics over the question collection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::model::Question;

/// Count of questions sharing one value of a grouping field.
/// `id` is `None` for questions lacking the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_questions: u64,
    pub questions_by_subject: Vec<GroupCount>,
    pub questions_by_exam: Vec<GroupCount>,
    pub questions_by_difficulty: Vec<GroupCount>,
    pub questions_with_solutions: u64,
    pub questions_without_solutions: u64,
    pub questions_with_images: u64,
    pub questions_without_images: u64,
}

/// Sort groups by count descending, ties by key ascending (absent key first)
pub fn sort_groups(groups: &mut [GroupCount]) {
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
}

fn group_by<'a>(keys: impl Iterator<Item = Option<&'a str>>) -> Vec<GroupCount> {
    let mut counts: BTreeMap<Option<&str>, u64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }

    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(id, count)| GroupCount {
            id: id.map(str::to_string),
            count,
        })
        .collect();
    sort_groups(&mut groups);
    groups
}

impl Statistics {
    /// Assemble from precomputed totals, deriving the complement counts
    pub fn from_counts(
        total_questions: u64,
        questions_by_subject: Vec<GroupCount>,
        questions_by_exam: Vec<GroupCount>,
        questions_by_difficulty: Vec<GroupCount>,
        questions_with_solutions: u64,
        questions_with_images: u64,
    ) -> Self {
        Self {
            total_questions,
            questions_by_subject,
            questions_by_exam,
            questions_by_difficulty,
            questions_with_solutions,
            questions_without_solutions: total_questions.saturating_sub(questions_with_solutions),
            questions_with_images,
            questions_without_images: total_questions.saturating_sub(questions_with_images),
        }
    }

    /// Compute every metric in one pass over the records
    pub fn from_questions(questions: &[Question]) -> Self {
        Self::from_counts(
            questions.len() as u64,
            group_by(questions.iter().map(|q| q.subject.as_deref())),
            group_by(questions.iter().map(|q| q.exam.as_deref())),
            group_by(questions.iter().map(|q| q.difficulty.as_deref())),
            questions.iter().filter(|q| q.has_solution()).count() as u64,
            questions.iter().filter(|q| q.has_image()).count() as u64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::model::{QuestionType, DEFAULT_MARKS, DEFAULT_TIME_LIMIT};

    fn question(subject: Option<&str>, difficulty: Option<&str>, solution: &str) -> Question {
        Question {
            id: None,
            text: "Q".into(),
            options: vec![],
            answer: String::new(),
            correct_option_index: None,
            correct_option_letter: None,
            solution: solution.into(),
            subject: subject.map(str::to_string),
            exam: None,
            difficulty: difficulty.map(str::to_string),
            blooms: None,
            language: None,
            tags: vec![],
            marks: DEFAULT_MARKS,
            time_limit: DEFAULT_TIME_LIMIT,
            question_type: QuestionType::Static,
            image_url: None,
        }
    }

    #[test]
    fn test_solution_counts() {
        let stats = Statistics::from_questions(&[
            question(None, None, "because"),
            question(None, None, "since"),
            question(None, None, ""),
        ]);
        assert_eq!(stats.total_questions, 3);
        assert_eq!(stats.questions_with_solutions, 2);
        assert_eq!(stats.questions_without_solutions, 1);
        assert_eq!(stats.questions_with_images, 0);
        assert_eq!(stats.questions_without_images, 3);
    }

    #[test]
    fn test_groups_sorted_and_sum_to_total() {
        let stats = Statistics::from_questions(&[
            question(Some("Physics"), Some("easy"), ""),
            question(Some("Algebra"), Some("hard"), ""),
            question(Some("Algebra"), None, ""),
            question(None, Some("easy"), ""),
        ]);

        assert_eq!(
            stats.questions_by_subject,
            vec![
                GroupCount { id: Some("Algebra".into()), count: 2 },
                GroupCount { id: None, count: 1 },
                GroupCount { id: Some("Physics".into()), count: 1 },
            ]
        );

        let sum: u64 = stats.questions_by_difficulty.iter().map(|g| g.count).sum();
        assert_eq!(sum, stats.total_questions);
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(Statistics::from_questions(&[question(
            Some("Math"),
            None,
            "",
        )]))
        .unwrap();
        assert_eq!(json["totalQuestions"], 1);
        assert_eq!(json["questionsBySubject"][0]["_id"], "Math");
        assert!(json["questionsByExam"][0]["_id"].is_null());
    }
}

pub mod fixtures {
    use crate::models::domain::{AnswerOption, Category, Question, User};

    /// A three-option question with the correct answer at `correct_index`.
    pub fn question(text: &str, correct_index: usize) -> Question {
        let options = vec![
            AnswerOption::new("Standing water in containers", 0, correct_index == 0),
            AnswerOption::new("Fast-flowing rivers", 1, correct_index == 1),
            AnswerOption::new("Salt water pools", 2, correct_index == 2),
        ];

        Question::new(
            text,
            1,
            10,
            Some("Aedes aegypti breeds in clean standing water.".to_string()),
            options,
        )
        .expect("fixture question is valid")
    }

    pub fn category_with_questions(name: &str, count: usize) -> Category {
        let mut category = Category::new(name, None);
        category.questions = (0..count)
            .map(|i| question(&format!("{} question {}", name, i), i % 3))
            .collect();
        category
    }

    pub fn test_user() -> User {
        User::test_user("user-1", "Maria Silva")
    }
}

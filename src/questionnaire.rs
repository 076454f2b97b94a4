use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Select,
    Text,
    Number,
}

#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub kind: FieldKind,
    pub placeholder: &'static str,
}

pub const STATUS_OPTIONS: [(&str, &str); 3] = [
    ("school_student", "School Student"),
    ("college_student", "College Student"),
    ("passout", "Professional/Passout"),
];

pub const QUESTIONS: [Question; 3] = [
    Question {
        id: "status",
        prompt: "To start, what is your current status?",
        kind: FieldKind::Select,
        placeholder: "",
    },
    Question {
        id: "name",
        prompt: "Great. What is your name?",
        kind: FieldKind::Text,
        placeholder: "e.g., Alex Doe",
    },
    Question {
        id: "age",
        prompt: "And what is your age?",
        kind: FieldKind::Number,
        placeholder: "e.g., 16",
    },
];

pub const CONNECTIVITY_ERROR_TEXT: &str =
    "An error occurred. Please ensure your backend server is running and accessible.";

/// Outcome of confirming the current answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStep {
    /// Validation failed or a submit is already in flight.
    Stay,
    Advanced,
    /// Last answer confirmed; carries the full intake payload.
    Submit(serde_json::Value),
}

/// Intake form state: one question at a time with back/forward navigation,
/// local validation before advancing, and per-field server errors after a
/// rejected submit.
#[derive(Debug, Default)]
pub struct IntakeForm {
    index: usize,
    answers: [String; QUESTIONS.len()],
    option_cursor: usize,
    error: Option<String>,
    submitting: bool,
}

impl IntakeForm {
    pub fn current_question(&self) -> &'static Question {
        &QUESTIONS[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn question_count(&self) -> usize {
        QUESTIONS.len()
    }

    pub fn current_answer(&self) -> &str {
        &self.answers[self.index]
    }

    pub fn option_cursor(&self) -> usize {
        self.option_cursor
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn input_char(&mut self, c: char) {
        if self.submitting {
            return;
        }
        match self.current_question().kind {
            FieldKind::Select => {}
            FieldKind::Text => {
                self.error = None;
                self.answers[self.index].push(c);
            }
            FieldKind::Number => {
                if c.is_ascii_digit() {
                    self.error = None;
                    self.answers[self.index].push(c);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        if self.submitting {
            return;
        }
        if self.current_question().kind != FieldKind::Select {
            self.error = None;
            self.answers[self.index].pop();
        }
    }

    pub fn move_up(&mut self) {
        if self.current_question().kind == FieldKind::Select {
            self.option_cursor = self.option_cursor.saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        if self.current_question().kind == FieldKind::Select {
            self.option_cursor = (self.option_cursor + 1).min(STATUS_OPTIONS.len() - 1);
        }
    }

    /// Confirm the current answer; advances, stays on a validation error, or
    /// yields the submit payload on the last question.
    pub fn next(&mut self) -> SubmitStep {
        if self.submitting {
            return SubmitStep::Stay;
        }
        if let Err(message) = self.validate_current() {
            self.error = Some(message);
            return SubmitStep::Stay;
        }
        self.error = None;
        if self.index + 1 < QUESTIONS.len() {
            self.index += 1;
            return SubmitStep::Advanced;
        }
        self.submitting = true;
        SubmitStep::Submit(self.payload())
    }

    pub fn back(&mut self) {
        if self.submitting {
            return;
        }
        self.error = None;
        self.index = self.index.saturating_sub(1);
    }

    fn validate_current(&mut self) -> Result<(), String> {
        match self.current_question().kind {
            FieldKind::Select => {
                // The highlighted option is the answer.
                self.answers[self.index] = STATUS_OPTIONS[self.option_cursor].0.to_string();
                Ok(())
            }
            FieldKind::Text => {
                let value = self.answers[self.index].trim();
                if value.is_empty() {
                    Err("Please provide an answer.".to_string())
                } else if value.chars().count() < 2 {
                    Err("Name must be at least 2 characters.".to_string())
                } else {
                    Ok(())
                }
            }
            FieldKind::Number => {
                let value = self.answers[self.index].trim();
                if value.is_empty() {
                    return Err("Please provide an answer.".to_string());
                }
                match value.parse::<i64>() {
                    Ok(age) if (10..=100).contains(&age) => Ok(()),
                    _ => Err("Please enter a valid age.".to_string()),
                }
            }
        }
    }

    fn payload(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (question, answer) in QUESTIONS.iter().zip(self.answers.iter()) {
            map.insert(
                question.id.to_string(),
                serde_json::Value::String(answer.trim().to_string()),
            );
        }
        serde_json::Value::Object(map)
    }

    /// Per-field rejection from the server; the joined messages land in the
    /// card's error area and the form becomes editable again.
    pub fn apply_server_errors(&mut self, errors: &BTreeMap<String, Vec<String>>) {
        self.submitting = false;
        let joined: Vec<String> = errors.values().flatten().cloned().collect();
        self.error = if joined.is_empty() {
            Some("An unknown error occurred.".to_string())
        } else {
            Some(joined.join("\n"))
        };
    }

    pub fn apply_transport_error(&mut self) {
        self.submitting = false;
        self.error = Some(CONNECTIVITY_ERROR_TEXT.to_string());
    }
}

#[cfg(test)]
#[path = "../tests/unit/questionnaire_tests.rs"]
mod tests;

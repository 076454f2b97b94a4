use super::*;

fn type_answer(form: &mut IntakeForm, text: &str) {
    for c in text.chars() {
        form.input_char(c);
    }
}

/// Fills the first two questions and lands on the age question.
fn form_at_age_question() -> IntakeForm {
    let mut form = IntakeForm::default();
    assert_eq!(form.next(), SubmitStep::Advanced);
    type_answer(&mut form, "Alex Doe");
    assert_eq!(form.next(), SubmitStep::Advanced);
    form
}

#[test]
fn status_select_records_the_highlighted_option() {
    let mut form = IntakeForm::default();
    form.move_down();
    form.move_down();
    form.move_down(); // cursor clamps at the last option
    assert_eq!(form.option_cursor(), 2);
    assert_eq!(form.next(), SubmitStep::Advanced);

    type_answer(&mut form, "Alex Doe");
    assert_eq!(form.next(), SubmitStep::Advanced);
    type_answer(&mut form, "34");
    match form.next() {
        SubmitStep::Submit(payload) => assert_eq!(payload["status"], "passout"),
        other => panic!("expected submit, got {other:?}"),
    }
}

#[test]
fn select_ignores_typed_characters() {
    let mut form = IntakeForm::default();
    type_answer(&mut form, "typing at a menu");
    form.backspace();
    assert_eq!(form.current_answer(), "");
    assert_eq!(form.index(), 0);
}

#[test]
fn empty_name_blocks_advancing() {
    let mut form = IntakeForm::default();
    assert_eq!(form.next(), SubmitStep::Advanced);

    type_answer(&mut form, "   ");
    assert_eq!(form.next(), SubmitStep::Stay);
    assert_eq!(form.error(), Some("Please provide an answer."));
    assert_eq!(form.index(), 1);
}

#[test]
fn single_character_name_is_rejected() {
    let mut form = IntakeForm::default();
    assert_eq!(form.next(), SubmitStep::Advanced);

    type_answer(&mut form, " A ");
    assert_eq!(form.next(), SubmitStep::Stay);
    assert_eq!(form.error(), Some("Name must be at least 2 characters."));
}

#[test]
fn typing_clears_the_validation_error() {
    let mut form = IntakeForm::default();
    assert_eq!(form.next(), SubmitStep::Advanced);
    assert_eq!(form.next(), SubmitStep::Stay);
    assert!(form.error().is_some());

    form.input_char('A');
    assert!(form.error().is_none());
}

#[test]
fn age_field_accepts_digits_only() {
    let mut form = form_at_age_question();
    type_answer(&mut form, "3a4-");
    assert_eq!(form.current_answer(), "34");
}

#[test]
fn age_outside_the_accepted_range_is_rejected() {
    let mut form = form_at_age_question();
    type_answer(&mut form, "9");
    assert_eq!(form.next(), SubmitStep::Stay);
    assert_eq!(form.error(), Some("Please enter a valid age."));

    form.backspace();
    type_answer(&mut form, "101");
    assert_eq!(form.next(), SubmitStep::Stay);
    assert_eq!(form.error(), Some("Please enter a valid age."));
}

#[test]
fn completing_the_form_yields_the_trimmed_payload() {
    let mut form = IntakeForm::default();
    assert_eq!(form.next(), SubmitStep::Advanced);
    type_answer(&mut form, "  Alex Doe  ");
    assert_eq!(form.next(), SubmitStep::Advanced);
    type_answer(&mut form, "16");

    match form.next() {
        SubmitStep::Submit(payload) => {
            assert_eq!(payload["status"], "school_student");
            assert_eq!(payload["name"], "Alex Doe");
            assert_eq!(payload["age"], "16");
        }
        other => panic!("expected submit, got {other:?}"),
    }
    assert!(form.is_submitting());
}

#[test]
fn submitting_gates_further_edits_and_confirms() {
    let mut form = form_at_age_question();
    type_answer(&mut form, "16");
    assert!(matches!(form.next(), SubmitStep::Submit(_)));

    assert_eq!(form.next(), SubmitStep::Stay);
    form.input_char('7');
    form.backspace();
    form.back();
    assert_eq!(form.current_answer(), "16");
    assert_eq!(form.index(), 2);
}

#[test]
fn back_returns_to_the_previous_question_and_clears_errors() {
    let mut form = IntakeForm::default();
    assert_eq!(form.next(), SubmitStep::Advanced);
    assert_eq!(form.next(), SubmitStep::Stay);
    assert!(form.error().is_some());

    form.back();
    assert_eq!(form.index(), 0);
    assert!(form.error().is_none());

    form.back();
    assert_eq!(form.index(), 0);
}

#[test]
fn answers_survive_back_and_forward_navigation() {
    let mut form = IntakeForm::default();
    assert_eq!(form.next(), SubmitStep::Advanced);
    type_answer(&mut form, "Alex Doe");
    form.back();
    assert_eq!(form.next(), SubmitStep::Advanced);
    assert_eq!(form.current_answer(), "Alex Doe");
}

#[test]
fn server_rejection_reenables_the_form_with_joined_messages() {
    let mut form = form_at_age_question();
    type_answer(&mut form, "16");
    assert!(matches!(form.next(), SubmitStep::Submit(_)));

    let mut errors = BTreeMap::new();
    errors.insert(
        "age".to_string(),
        vec!["Ensure this value is at least 10.".to_string()],
    );
    errors.insert(
        "name".to_string(),
        vec!["This field is required.".to_string()],
    );
    form.apply_server_errors(&errors);

    assert!(!form.is_submitting());
    assert_eq!(
        form.error(),
        Some("Ensure this value is at least 10.\nThis field is required.")
    );
}

#[test]
fn server_rejection_without_details_still_reports_something() {
    let mut form = IntakeForm::default();
    form.apply_server_errors(&BTreeMap::new());
    assert_eq!(form.error(), Some("An unknown error occurred."));
}

#[test]
fn transport_failure_points_at_the_backend() {
    let mut form = form_at_age_question();
    type_answer(&mut form, "16");
    assert!(matches!(form.next(), SubmitStep::Submit(_)));

    form.apply_transport_error();
    assert!(!form.is_submitting());
    assert_eq!(form.error(), Some(CONNECTIVITY_ERROR_TEXT));
}

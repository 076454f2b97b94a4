use super::*;
use crate::roadmap::RoadmapData;

fn ai_message(id: &str, text: &str) -> ChatMessage {
    ChatMessage {
        message_id: id.to_string(),
        sender: Sender::Ai,
        text: text.to_string(),
        timestamp: None,
    }
}

fn user_message(id: &str, text: &str) -> ChatMessage {
    ChatMessage {
        message_id: id.to_string(),
        sender: Sender::User,
        text: text.to_string(),
        timestamp: None,
    }
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.input_char(c);
    }
}

/// Drives the app into the chat stage with session "s1" and an empty,
/// settled history.
fn chat_app() -> App {
    let mut app = App::default();
    let start = Instant::now();
    app.complete_intake("s1".to_string(), Duration::from_millis(0), start);
    let request = app
        .advance_loading_if_elapsed(start)
        .expect("history request after the loading delay");
    assert_eq!(request.session_id, "s1");
    app.apply_history_result(request.generation, Ok(Vec::new()));
    app
}

#[test]
fn default_state_starts_at_questionnaire() {
    let app = App::default();
    assert!(app.running);
    assert_eq!(app.stage(), Stage::Questionnaire);
    assert!(app.session_id().is_none());
    assert_eq!(app.message_count(), 0);
    assert!(!app.is_in_flight());
}

#[test]
fn intake_completion_moves_to_loading_with_session() {
    let mut app = App::default();
    let start = Instant::now();
    app.complete_intake("s1".to_string(), Duration::from_secs(2), start);
    assert_eq!(app.stage(), Stage::Loading);
    assert_eq!(app.session_id(), Some("s1"));
}

#[test]
fn loading_advances_only_after_the_delay_and_only_once() {
    let mut app = App::default();
    let start = Instant::now();
    app.complete_intake("s1".to_string(), Duration::from_secs(2), start);

    assert!(app.advance_loading_if_elapsed(start).is_none());
    assert_eq!(app.stage(), Stage::Loading);

    let request = app
        .advance_loading_if_elapsed(start + Duration::from_secs(3))
        .expect("deadline elapsed");
    assert_eq!(app.stage(), Stage::Chat);
    assert_eq!(request.session_id, "s1");
    assert!(app.is_history_loading());

    // The deadline fires exactly once per entry to loading.
    assert!(
        app.advance_loading_if_elapsed(start + Duration::from_secs(4))
            .is_none()
    );
}

#[test]
fn full_stage_cycle_clears_session_data() {
    let mut app = chat_app();
    type_text(&mut app, "hello");
    assert!(app.submit_compose().is_some());
    app.apply_send_result(app.turn_generation(), Ok(ai_message("m1", "hi")));

    let session_id = app.open_roadmap().expect("session for roadmap fetch");
    assert_eq!(session_id, "s1");
    assert_eq!(app.stage(), Stage::Roadmap);

    app.start_new_session();
    assert_eq!(app.stage(), Stage::Questionnaire);
    assert!(app.session_id().is_none());
    assert_eq!(app.message_count(), 0);
    assert!(app.compose().is_empty());
    assert!(!app.is_in_flight());
    assert_eq!(app.roadmap_view(), &RoadmapView::Loading);
}

#[test]
fn start_new_session_is_only_valid_from_roadmap() {
    let mut app = chat_app();
    app.start_new_session();
    assert_eq!(app.stage(), Stage::Chat);
    assert_eq!(app.session_id(), Some("s1"));
}

#[test]
fn send_text_appends_optimistic_user_message_synchronously() {
    let mut app = chat_app();
    type_text(&mut app, "  what should I study?  ");

    let action = app.submit_compose();
    assert_eq!(
        action,
        Some(ComposeAction::Text("what should I study?".to_string()))
    );
    assert_eq!(app.message_count(), 1);
    let echoed = &app.messages()[0];
    assert_eq!(echoed.sender, Sender::User);
    assert_eq!(echoed.text, "what should I study?");
    assert!(echoed.timestamp.is_some());
    assert!(app.compose().is_empty());
    assert!(app.is_in_flight());
}

#[test]
fn sending_while_in_flight_is_a_no_op() {
    let mut app = chat_app();
    type_text(&mut app, "first");
    assert!(app.submit_compose().is_some());

    type_text(&mut app, "second");
    assert!(app.submit_compose().is_none());
    assert_eq!(app.message_count(), 1);
}

#[test]
fn sending_empty_compose_without_attachment_is_a_no_op() {
    let mut app = chat_app();
    type_text(&mut app, "   ");
    assert!(app.submit_compose().is_none());
    assert_eq!(app.message_count(), 0);
    assert!(!app.is_in_flight());
}

#[test]
fn sending_without_a_session_is_a_no_op() {
    let mut app = App::default();
    type_text(&mut app, "hello");
    assert!(app.submit_compose().is_none());
    assert_eq!(app.message_count(), 0);
}

#[test]
fn send_failure_yields_exactly_two_messages_for_the_turn() {
    let mut app = chat_app();
    type_text(&mut app, "hello");
    assert!(app.submit_compose().is_some());

    app.apply_send_result(app.turn_generation(), Err(TransportError::MissingAiResponse));
    assert_eq!(app.message_count(), 2);
    assert_eq!(app.messages()[0].sender, Sender::User);
    let error = &app.messages()[1];
    assert_eq!(error.sender, Sender::Ai);
    assert_eq!(error.text, SEND_FAILED_TEXT);
    assert!(!app.is_in_flight());
}

#[test]
fn send_success_appends_the_server_reply() {
    let mut app = chat_app();
    type_text(&mut app, "hello");
    assert!(app.submit_compose().is_some());

    app.apply_send_result(app.turn_generation(), Ok(ai_message("m2", "Consider data science.")));
    assert_eq!(app.message_count(), 2);
    assert_eq!(app.messages()[1].text, "Consider data science.");
    assert!(!app.is_in_flight());
}

#[test]
fn history_load_replaces_the_store_wholesale() {
    let mut app = chat_app();
    app.apply_send_result(app.turn_generation(), Ok(ai_message("stale", "old content")));

    let request = app.begin_history_load().expect("session present");
    app.apply_history_result(request.generation, Ok(vec![ai_message("m1", "hi")]));
    assert_eq!(app.messages(), &[ai_message("m1", "hi")]);
    assert!(!app.is_history_loading());
}

#[test]
fn history_failure_replaces_the_store_with_one_error_message() {
    let mut app = chat_app();
    app.apply_send_result(app.turn_generation(), Ok(ai_message("stale", "old content")));

    let request = app.begin_history_load().expect("session present");
    app.apply_history_result(request.generation, Err(TransportError::MissingAiResponse));
    assert_eq!(app.message_count(), 1);
    assert_eq!(app.messages()[0].message_id, "error_fetch");
    assert_eq!(app.messages()[0].text, HISTORY_FAILED_TEXT);
}

#[test]
fn stale_history_results_are_dropped() {
    let mut app = chat_app();
    let first = app.begin_history_load().expect("first request");
    let second = app.begin_history_load().expect("second request");
    assert!(second.generation > first.generation);

    app.apply_history_result(first.generation, Ok(vec![ai_message("old", "stale")]));
    assert_eq!(app.message_count(), 0);
    assert!(app.is_history_loading());

    app.apply_history_result(second.generation, Ok(vec![ai_message("new", "fresh")]));
    assert_eq!(app.messages(), &[ai_message("new", "fresh")]);
    assert!(!app.is_history_loading());
}

#[test]
fn send_results_from_a_previous_session_are_dropped() {
    let mut app = chat_app();
    type_text(&mut app, "hello");
    assert!(app.submit_compose().is_some());
    let turn = app.turn_generation();

    // The send is still outstanding while the user walks to the roadmap and
    // starts over.
    app.open_roadmap().expect("session present");
    app.start_new_session();

    app.apply_send_result(turn, Ok(ai_message("late", "reply for the old session")));
    assert_eq!(app.message_count(), 0);

    app.apply_send_result(turn, Err(TransportError::MissingAiResponse));
    assert_eq!(app.message_count(), 0);
}

#[test]
fn upload_results_from_a_previous_session_are_dropped() {
    let mut app = chat_app();
    app.select_attachment(PathBuf::from("/tmp/resume.pdf"));
    assert!(app.submit_compose().is_some());
    let turn = app.turn_generation();

    app.open_roadmap().expect("session present");
    app.start_new_session();

    app.apply_upload_result("resume.pdf", turn, Ok(ai_message("late", "old reply")));
    assert_eq!(app.message_count(), 0);
    assert!(app.compose().is_empty());
    assert!(app.pending_attachment().is_none());
}

#[test]
fn compose_editing_is_closed_while_a_turn_is_outstanding() {
    let mut app = chat_app();
    type_text(&mut app, "hello");
    assert!(app.submit_compose().is_some());

    type_text(&mut app, "typed too early");
    app.backspace_input();
    assert!(app.compose().is_empty());

    app.apply_send_result(app.turn_generation(), Ok(ai_message("m1", "hi")));
    app.input_char('x');
    assert_eq!(app.compose(), "x");
}

#[test]
fn compose_editing_is_closed_while_history_is_loading() {
    let mut app = chat_app();
    assert!(app.begin_history_load().is_some());
    type_text(&mut app, "hello");
    assert!(app.compose().is_empty());
}

#[test]
fn history_load_without_a_session_fails_fast_locally() {
    let mut app = App::default();
    assert!(app.begin_history_load().is_none());
    assert_eq!(app.message_count(), 1);
    assert_eq!(app.messages()[0].message_id, "error");
    assert_eq!(app.messages()[0].text, NO_SESSION_TEXT);
    assert!(!app.is_history_loading());
}

#[test]
fn selecting_an_attachment_mirrors_the_file_name_into_compose() {
    let mut app = chat_app();
    app.select_attachment(PathBuf::from("/tmp/resume.pdf"));
    assert_eq!(app.compose(), "File selected: resume.pdf");
    let pending = app.pending_attachment().expect("attachment recorded");
    assert_eq!(pending.name, "resume.pdf");
    // Selection does not start the upload.
    assert!(!app.is_in_flight());
}

#[test]
fn attachment_wins_over_composed_text_at_submit_time() {
    let mut app = chat_app();
    app.select_attachment(PathBuf::from("/tmp/resume.pdf"));
    type_text(&mut app, " extra prose");

    let action = app.submit_compose().expect("upload action");
    match action {
        ComposeAction::Attachment(attachment) => assert_eq!(attachment.name, "resume.pdf"),
        other => panic!("expected attachment action, got {other:?}"),
    }
    assert_eq!(app.compose(), "Uploading: resume.pdf");
    assert!(app.is_in_flight());
    // No optimistic echo for uploads; the log entry lands with the outcome.
    assert_eq!(app.message_count(), 0);
}

#[test]
fn upload_success_appends_file_echo_then_reply_and_resets() {
    let mut app = chat_app();
    app.select_attachment(PathBuf::from("/tmp/resume.pdf"));
    assert!(app.submit_compose().is_some());

    app.apply_upload_result(
        "resume.pdf",
        app.turn_generation(),
        Ok(ai_message("m1", "Thanks for the resume.")),
    );
    assert_eq!(app.message_count(), 2);
    assert_eq!(app.messages()[0].sender, Sender::User);
    assert_eq!(app.messages()[0].text, "You sent a file: resume.pdf");
    assert_eq!(app.messages()[1].text, "Thanks for the resume.");
    assert!(app.pending_attachment().is_none());
    assert!(app.compose().is_empty());
    assert!(!app.is_in_flight());
}

#[test]
fn upload_failure_still_records_the_attempt() {
    let mut app = chat_app();
    app.select_attachment(PathBuf::from("/tmp/resume.pdf"));
    assert!(app.submit_compose().is_some());

    app.apply_upload_result(
        "resume.pdf",
        app.turn_generation(),
        Err(TransportError::MissingAiResponse),
    );
    assert_eq!(app.message_count(), 2);
    assert_eq!(app.messages()[0].sender, Sender::User);
    assert_eq!(app.messages()[0].text, "Failed to send file: resume.pdf");
    assert_eq!(app.messages()[1].sender, Sender::Ai);
    assert_eq!(app.messages()[1].text, UPLOAD_FAILED_TEXT);
    assert!(app.pending_attachment().is_none());
    assert!(!app.is_in_flight());
}

#[test]
fn roadmap_link_is_only_detected_in_ai_messages() {
    let mut app = chat_app();
    let request = app.begin_history_load().expect("session present");
    app.apply_history_result(
        request.generation,
        Ok(vec![user_message("u1", "show me [View Your Roadmap] please")]),
    );
    assert!(!app.has_roadmap_link());

    let request = app.begin_history_load().expect("session present");
    app.apply_history_result(
        request.generation,
        Ok(vec![ai_message("m1", "All set. [View Your Roadmap]")]),
    );
    assert!(app.has_roadmap_link());
}

#[test]
fn roadmap_results_update_the_view() {
    let mut app = chat_app();
    app.open_roadmap().expect("session present");
    assert_eq!(app.roadmap_view(), &RoadmapView::Loading);

    app.apply_roadmap_result(Ok(RoadmapData::default()));
    assert_eq!(app.roadmap_view(), &RoadmapView::Ready(RoadmapData::default()));

    app.apply_roadmap_result(Err(TransportError::MissingAiResponse));
    assert_eq!(
        app.roadmap_view(),
        &RoadmapView::Failed(ROADMAP_FAILED_TEXT.to_string())
    );
}

#[test]
fn roadmap_results_are_ignored_outside_the_roadmap_stage() {
    let mut app = chat_app();
    app.apply_roadmap_result(Ok(RoadmapData::default()));
    assert_eq!(app.roadmap_view(), &RoadmapView::Loading);
}

#[test]
fn compose_cursor_editing_handles_multibyte_text() {
    let mut app = chat_app();
    type_text(&mut app, "héllo");
    assert_eq!(app.compose_cursor(), 5);
    app.move_cursor_left();
    app.move_cursor_left();
    app.backspace_input();
    assert_eq!(app.compose(), "hélo");
    app.move_cursor_right();
    app.input_char('l');
    assert_eq!(app.compose(), "héllo");

    app.move_cursor_right();
    app.input_char('!');
    assert_eq!(app.compose(), "héllo!");
}

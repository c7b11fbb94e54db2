//! Full round-trip tests: editor encoding through both rendering
//! targets, and JSON record bundles through the export operations.

use chrono::{TimeZone, Utc};

use clinmark::markup::{Marker, MarkupDocument, apply_marker};
use clinmark::records::RecordBundle;
use clinmark::render::html::render_html_str;
use clinmark::render::pdf::{PageCursor, PageStyle, render_markup_str, text_runs};
use printpdf::Mm;

#[test]
fn test_encode_then_render_html() {
    // A doctor types a note, selects a word, clicks Bold.
    let note = "Patient reports severe headaches";
    let edit = apply_marker(note, 16, 22, Marker::Bold).unwrap();
    assert_eq!(edit.buffer, "Patient reports **severe** headaches");

    let html = render_html_str(&edit.buffer);
    assert_eq!(html, "Patient reports <strong>severe</strong> headaches");
}

#[test]
fn test_encode_then_render_pdf_runs() {
    let edit = apply_marker("Take Paracetamol daily", 5, 16, Marker::Bold).unwrap();
    let doc = MarkupDocument::parse(&edit.buffer);
    let runs = text_runs(&doc.lines()[0]);
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[1].text, "Paracetamol");
    assert!(runs[1].bold);
}

#[test]
fn test_both_targets_agree_on_visible_text() {
    let markup = "**Plan**\n- rest\n- fluids\nreview in *one week*";
    let doc = MarkupDocument::parse(markup);

    let pdf_text: String = doc
        .lines()
        .iter()
        .flat_map(|line| text_runs(line))
        .map(|run| run.text)
        .collect::<Vec<_>>()
        .join("|");
    assert_eq!(pdf_text, "Plan|rest|fluids|review in one week");

    let html = render_html_str(markup);
    assert!(html.contains("<strong>Plan</strong>"));
    assert!(html.contains("<ul><li>rest</li><li>fluids</li></ul>"));
    assert!(html.contains("review in <em>one week</em>"));
}

#[test]
fn test_markup_file_renders_to_pdf_bytes() {
    let markup = "**Findings**\n\n- BP 120/80\n- HR 72\n\nContinue current medication";
    let style = PageStyle::default();
    let (mut cursor, fonts) = PageCursor::new("Clinical Note", style).unwrap();
    let final_y = render_markup_str(
        &mut cursor,
        &fonts,
        markup,
        style.margin,
        style.content_width(),
        11.0,
    )
    .unwrap();
    assert!(final_y.0 < style.height.0 - style.margin.0);

    let bytes = cursor.into_bytes().unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_bundle_json_exports_consultation() {
    let json = r#"{
        "patient": {
            "id": "p1", "firstName": "Ama", "lastName": "Owusu",
            "age": 29, "gender": "female", "bloodType": "AB-",
            "phoneNumber": "+233501234567"
        },
        "practitioner": {
            "id": "d1", "firstName": "Yaw", "lastName": "Darko",
            "email": "yaw@example.com"
        },
        "consultation": {
            "id": "c1", "patientId": "p1",
            "title": "Follow-up visit",
            "content": "Patient is **stable**.\n- continue lisinopril\n- reduce salt intake",
            "date": "2025-06-01T10:00:00Z"
        }
    }"#;
    let bundle: RecordBundle = serde_json::from_str(json).unwrap();
    let note = bundle.consultation.as_ref().unwrap();
    assert_eq!(note.date, Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap());

    let bytes =
        clinmark::export::export_consultation(note, &bundle.patient, &bundle.practitioner)
            .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_bundle_with_bad_enum_is_rejected_at_the_boundary() {
    let json = r#"{
        "patient": {
            "id": "p1", "firstName": "A", "lastName": "B",
            "age": 29, "gender": "unknown", "phoneNumber": "1"
        },
        "practitioner": {
            "id": "d1", "firstName": "C", "lastName": "D",
            "email": "d@example.com"
        }
    }"#;
    assert!(serde_json::from_str::<RecordBundle>(json).is_err());
}

#[test]
fn test_stored_markup_is_replaced_wholesale() {
    // The core performs full-string round trips only: re-encoding an
    // already-marked string layers markers without partial edits.
    let first = apply_marker("important", 0, 9, Marker::Bold).unwrap();
    let second = apply_marker(&first.buffer, 0, first.buffer.chars().count(), Marker::Italic)
        .unwrap();
    assert_eq!(second.buffer, "***important***");

    // Best-effort parse: `**` wins at the front, the stray `*` stays.
    let html = render_html_str(&second.buffer);
    assert!(html.contains("important"));
}

#[test]
fn test_crlf_free_multiline_note_layout() {
    let markup = "line one\nline two";
    let style = PageStyle::default();
    let (mut cursor, fonts) = PageCursor::new("n", style).unwrap();
    let start = cursor.y();
    let end = render_markup_str(
        &mut cursor,
        &fonts,
        markup,
        Mm(20.0),
        Mm(170.0),
        11.0,
    )
    .unwrap();
    assert!((start.0 - end.0 - 2.0 * style.line_height.0).abs() < 0.01);
}

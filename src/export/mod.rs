//! One-shot PDF document exports.
//!
//! Each export validates its records, lays the document out against a
//! [`PageCursor`], and returns the finished PDF bytes. File I/O belongs
//! to the caller. Embedded markup fields (consultation content,
//! medication instructions) go through the markup PDF path; everything
//! else is fixed layout.

use printpdf::Mm;
use thiserror::Error;
use tracing::info;

use crate::records::{
    ConsultationNote, Invoice, Patient, Practitioner, Prescription, RecordError,
};
use crate::render::pdf::{PageCursor, PageStyle, PdfFonts, RenderError, render_markup_str};

/// Failure of an export operation. Fatal to the operation in progress;
/// the caller surfaces it and may retry with corrected input.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid record: {0}")]
    Record(#[from] RecordError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

const BODY_SIZE: f32 = 11.0;
const SMALL_SIZE: f32 = 9.0;
const SECTION_SIZE: f32 = 13.0;
const TITLE_SIZE: f32 = 18.0;

/// Generate a prescription document. Returns the PDF bytes.
///
/// # Errors
/// [`ExportError::Record`] if any record fails validation;
/// [`ExportError::Render`] if layout or serialization fails.
pub fn export_prescription(
    prescription: &Prescription,
    patient: &Patient,
    practitioner: &Practitioner,
) -> Result<Vec<u8>, ExportError> {
    prescription.validate()?;
    patient.validate()?;
    practitioner.validate()?;

    let style = PageStyle::default();
    let (mut cursor, fonts) = PageCursor::new("Medical Prescription", style)?;
    let x0 = style.margin;

    title(&mut cursor, &fonts, "Medical Prescription");
    line(&mut cursor, &fonts, &practitioner.display_name(), BODY_SIZE);
    line(
        &mut cursor,
        &fonts,
        &format!("Prescription #: {}", prescription.prescription_number),
        BODY_SIZE,
    );
    line(
        &mut cursor,
        &fonts,
        &format!("Date: {}", prescription.date.format("%Y-%m-%d")),
        BODY_SIZE,
    );
    cursor.advance();

    section(&mut cursor, &fonts, "Patient Information");
    line(
        &mut cursor,
        &fonts,
        &format!("Name: {}", patient.full_name()),
        BODY_SIZE,
    );
    line(
        &mut cursor,
        &fonts,
        &format!("Age: {} years", patient.age),
        BODY_SIZE,
    );
    line(
        &mut cursor,
        &fonts,
        &format!("Gender: {}", patient.gender.label()),
        BODY_SIZE,
    );
    line(
        &mut cursor,
        &fonts,
        &format!("Phone: {}", patient.phone_number),
        BODY_SIZE,
    );
    cursor.advance();

    section(&mut cursor, &fonts, "Prescribed Medications");
    for (index, medication) in prescription.medications.iter().enumerate() {
        cursor.ensure_room(Mm(4.0 * style.line_height.0));
        cursor.text(
            &format!(
                "{}. {} - {}",
                index + 1,
                medication.name,
                medication.dosage
            ),
            BODY_SIZE,
            x0,
            &fonts.bold,
        );
        cursor.advance();

        // Instructions are a markup field; indent them under the drug.
        let indent = Mm(x0.0 + 5.0);
        render_markup_str(
            &mut cursor,
            &fonts,
            &medication.instructions,
            indent,
            Mm(style.right_edge().0 - indent.0),
            BODY_SIZE,
        )?;
        line(
            &mut cursor,
            &fonts,
            &format!(
                "Duration: {}   Refills: {}",
                medication.duration, medication.refills
            ),
            SMALL_SIZE,
        );
        cursor.advance();
    }

    footer(
        &cursor,
        &fonts,
        "This prescription is valid for 30 days from the date of issue.",
    );

    let bytes = cursor.into_bytes()?;
    info!(
        number = %prescription.prescription_number,
        bytes = bytes.len(),
        "prescription exported"
    );
    Ok(bytes)
}

/// Generate an invoice document. Returns the PDF bytes.
///
/// # Errors
/// See [`export_prescription`].
pub fn export_invoice(
    invoice: &Invoice,
    patient: &Patient,
    practitioner: &Practitioner,
) -> Result<Vec<u8>, ExportError> {
    invoice.validate()?;
    patient.validate()?;
    practitioner.validate()?;

    let style = PageStyle::default();
    let (mut cursor, fonts) = PageCursor::new("Medical Invoice", style)?;
    let x0 = style.margin;
    let right = style.right_edge();

    title(&mut cursor, &fonts, "Medical Invoice");
    line(&mut cursor, &fonts, &practitioner.display_name(), BODY_SIZE);
    line(
        &mut cursor,
        &fonts,
        &format!("Invoice #: {}", invoice.invoice_number),
        BODY_SIZE,
    );
    line(
        &mut cursor,
        &fonts,
        &format!("Date: {}", invoice.date.format("%Y-%m-%d")),
        BODY_SIZE,
    );
    line(
        &mut cursor,
        &fonts,
        &format!("Status: {}", invoice.status.label()),
        BODY_SIZE,
    );
    cursor.advance();

    section(&mut cursor, &fonts, "Bill To");
    line(&mut cursor, &fonts, &patient.full_name(), BODY_SIZE);
    line(&mut cursor, &fonts, &patient.phone_number, BODY_SIZE);
    if let Some(email) = &patient.email {
        line(&mut cursor, &fonts, email, BODY_SIZE);
    }
    cursor.advance();

    section(&mut cursor, &fonts, "Services");

    // Column x positions, matching the printed invoice layout.
    let col_qty = Mm(120.0);
    let col_unit = Mm(140.0);
    let col_total = Mm(170.0);

    cursor.text("Description", SMALL_SIZE, x0, &fonts.bold);
    cursor.text("Qty", SMALL_SIZE, col_qty, &fonts.bold);
    cursor.text("Unit Price", SMALL_SIZE, col_unit, &fonts.bold);
    cursor.text("Total", SMALL_SIZE, col_total, &fonts.bold);
    cursor.advance();
    cursor.rule(x0, right);
    cursor.advance();

    for item in &invoice.items {
        cursor.ensure_room(style.line_height);
        cursor.text(&item.description, SMALL_SIZE, x0, &fonts.regular);
        cursor.text(
            &item.quantity.to_string(),
            SMALL_SIZE,
            col_qty,
            &fonts.regular,
        );
        cursor.text(
            &format!("${:.2}", item.unit_price),
            SMALL_SIZE,
            col_unit,
            &fonts.regular,
        );
        cursor.text(
            &format!("${:.2}", item.total),
            SMALL_SIZE,
            col_total,
            &fonts.regular,
        );
        cursor.advance();
    }

    cursor.rule(x0, right);
    cursor.advance();

    cursor.ensure_room(Mm(3.0 * style.line_height.0));
    cursor.text(
        &format!("Subtotal: ${:.2}", invoice.subtotal),
        BODY_SIZE,
        col_unit,
        &fonts.regular,
    );
    cursor.advance();
    cursor.text(
        &format!(
            "Tax ({:.1}%): ${:.2}",
            invoice.tax_rate * 100.0,
            invoice.tax_amount
        ),
        BODY_SIZE,
        col_unit,
        &fonts.regular,
    );
    cursor.advance();
    cursor.text(
        &format!("Total: ${:.2}", invoice.total),
        BODY_SIZE,
        col_unit,
        &fonts.bold,
    );
    cursor.advance();

    footer(&cursor, &fonts, "Thank you for your visit!");

    let bytes = cursor.into_bytes()?;
    info!(
        number = %invoice.invoice_number,
        bytes = bytes.len(),
        "invoice exported"
    );
    Ok(bytes)
}

/// Generate a consultation note document, rendering the note body
/// through the full markup path. Returns the PDF bytes.
///
/// # Errors
/// See [`export_prescription`].
pub fn export_consultation(
    note: &ConsultationNote,
    patient: &Patient,
    practitioner: &Practitioner,
) -> Result<Vec<u8>, ExportError> {
    note.validate()?;
    patient.validate()?;
    practitioner.validate()?;

    let style = PageStyle::default();
    let (mut cursor, fonts) = PageCursor::new("Consultation Note", style)?;
    let x0 = style.margin;

    title(&mut cursor, &fonts, &note.title);
    line(&mut cursor, &fonts, &practitioner.display_name(), BODY_SIZE);
    line(
        &mut cursor,
        &fonts,
        &format!("Patient: {}", patient.full_name()),
        BODY_SIZE,
    );
    line(
        &mut cursor,
        &fonts,
        &format!("Date: {}", note.date.format("%Y-%m-%d")),
        BODY_SIZE,
    );
    cursor.advance();
    cursor.rule(x0, style.right_edge());
    cursor.advance();

    render_markup_str(
        &mut cursor,
        &fonts,
        &note.content,
        x0,
        style.content_width(),
        BODY_SIZE,
    )?;

    let bytes = cursor.into_bytes()?;
    info!(note = %note.id, bytes = bytes.len(), "consultation exported");
    Ok(bytes)
}

fn title(cursor: &mut PageCursor, fonts: &PdfFonts, text: &str) {
    cursor.text(text, TITLE_SIZE, cursor.style().margin, &fonts.bold);
    cursor.advance_by(Mm(10.0));
}

fn section(cursor: &mut PageCursor, fonts: &PdfFonts, text: &str) {
    cursor.ensure_room(Mm(2.0 * cursor.style().line_height.0));
    cursor.text(
        &format!("{text}:"),
        SECTION_SIZE,
        cursor.style().margin,
        &fonts.bold,
    );
    cursor.advance();
}

fn line(cursor: &mut PageCursor, fonts: &PdfFonts, text: &str, size: f32) {
    cursor.ensure_room(cursor.style().line_height);
    cursor.text(text, size, cursor.style().margin, &fonts.regular);
    cursor.advance();
}

fn footer(cursor: &PageCursor, fonts: &PdfFonts, text: &str) {
    let style = cursor.style();
    let layer_y = Mm(style.margin.0 / 2.0 + 5.0);
    cursor.text_at(text, SMALL_SIZE, style.margin, layer_y, &fonts.regular);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Gender, InvoiceItem, InvoiceStatus, Medication};
    use chrono::{TimeZone, Utc};

    fn patient() -> Patient {
        Patient {
            id: "p1".to_string(),
            first_name: "Kwame".to_string(),
            last_name: "Mensah".to_string(),
            age: 52,
            gender: Gender::Male,
            blood_type: None,
            phone_number: "+233241112222".to_string(),
            email: Some("kwame@example.com".to_string()),
            address: None,
            medical_history: None,
        }
    }

    fn practitioner() -> Practitioner {
        Practitioner {
            id: "d1".to_string(),
            first_name: "Efua".to_string(),
            last_name: "Boateng".to_string(),
            email: "efua@example.com".to_string(),
        }
    }

    fn prescription() -> Prescription {
        Prescription {
            id: "r1".to_string(),
            patient_id: "p1".to_string(),
            prescription_number: "RX-2025-0042".to_string(),
            medications: vec![Medication {
                name: "Paracetamol".to_string(),
                dosage: "500mg".to_string(),
                duration: "5 days".to_string(),
                instructions: "Take **two tablets** with water, *after meals*".to_string(),
                refills: 1,
            }],
            date: Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_prescription_export_produces_pdf() {
        let bytes =
            export_prescription(&prescription(), &patient(), &practitioner()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_prescription_export_rejects_invalid_record() {
        let mut rx = prescription();
        rx.medications.clear();
        let err = export_prescription(&rx, &patient(), &practitioner()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Record(RecordError::EmptyPrescription)
        ));
    }

    #[test]
    fn test_invoice_export_produces_pdf() {
        let invoice = Invoice {
            id: "i1".to_string(),
            patient_id: "p1".to_string(),
            invoice_number: "INV-2025-0007".to_string(),
            items: vec![InvoiceItem {
                description: "General consultation".to_string(),
                quantity: 1,
                unit_price: 80.0,
                total: 80.0,
            }],
            subtotal: 80.0,
            tax_rate: 0.125,
            tax_amount: 10.0,
            total: 90.0,
            status: InvoiceStatus::Pending,
            date: Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        };
        let bytes = export_invoice(&invoice, &patient(), &practitioner()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_consultation_export_renders_long_markup_across_pages() {
        let mut content = String::from("**Assessment**\n");
        for i in 1..=120 {
            content.push_str(&format!("{i}. follow-up observation with stable vitals\n"));
        }
        let note = ConsultationNote {
            id: "c1".to_string(),
            patient_id: "p1".to_string(),
            title: "Quarterly review".to_string(),
            content,
            date: Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        };
        let bytes = export_consultation(&note, &patient(), &practitioner()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // 120 list lines at 6mm cannot fit a single A4 content column.
        assert!(bytes.len() > 2_000);
    }
}

//! Clinical record types.
//!
//! Closed tagged-variant enums for the coded fields (gender, blood
//! type, invoice status) and boundary validation on every record, so
//! malformed data is rejected when it enters the model rather than at
//! arbitrary call sites. Serialization matches the practice backend's
//! camelCase JSON documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures raised at the record boundary.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("age {0} is out of range (0-150)")]
    AgeOutOfRange(u32),
    #[error("prescription has no medications")]
    EmptyPrescription,
    #[error("invoice has no items")]
    EmptyInvoice,
    #[error("tax rate {0} is out of range (0-1)")]
    TaxRateOutOfRange(f64),
    #[error("invoice totals are inconsistent: {field} is {actual}, expected {expected}")]
    InconsistentTotals {
        field: &'static str,
        actual: f64,
        expected: f64,
    },
}

fn require(field: &'static str, value: &str) -> Result<(), RecordError> {
    if value.trim().is_empty() {
        return Err(RecordError::MissingField { field });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Capitalized label used on printed documents.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

/// ABO/Rh blood group, serialized in the conventional `A+` … `O-` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    /// Upper-case label used on printed invoices.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<BloodType>,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Free-text history; may contain markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        require("first name", &self.first_name)?;
        require("last name", &self.last_name)?;
        require("phone number", &self.phone_number)?;
        if self.age > 150 {
            return Err(RecordError::AgeOutOfRange(self.age));
        }
        Ok(())
    }
}

/// The treating doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Practitioner {
    /// Display name with title, as printed on documents.
    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        require("first name", &self.first_name)?;
        require("last name", &self.last_name)?;
        Ok(())
    }
}

/// A consultation note whose `content` field is a stored markup
/// document, created and replaced wholesale with its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationNote {
    pub id: String,
    pub patient_id: String,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
}

impl ConsultationNote {
    pub fn validate(&self) -> Result<(), RecordError> {
        require("title", &self.title)?;
        require("content", &self.content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub duration: String,
    /// Dosing instructions; may contain markup.
    pub instructions: String,
    #[serde(default)]
    pub refills: u32,
}

impl Medication {
    pub fn validate(&self) -> Result<(), RecordError> {
        require("medication name", &self.name)?;
        require("dosage", &self.dosage)?;
        require("duration", &self.duration)?;
        require("instructions", &self.instructions)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: String,
    pub patient_id: String,
    pub prescription_number: String,
    pub medications: Vec<Medication>,
    pub date: DateTime<Utc>,
}

impl Prescription {
    pub fn validate(&self) -> Result<(), RecordError> {
        require("prescription number", &self.prescription_number)?;
        if self.medications.is_empty() {
            return Err(RecordError::EmptyPrescription);
        }
        for medication in &self.medications {
            medication.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
}

impl InvoiceItem {
    pub fn validate(&self) -> Result<(), RecordError> {
        require("item description", &self.description)?;
        let expected = f64::from(self.quantity) * self.unit_price;
        if !approx_eq(self.total, expected) {
            return Err(RecordError::InconsistentTotals {
                field: "item total",
                actual: self.total,
                expected,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub patient_id: String,
    pub invoice_number: String,
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub status: InvoiceStatus,
    pub date: DateTime<Utc>,
}

impl Invoice {
    pub fn validate(&self) -> Result<(), RecordError> {
        require("invoice number", &self.invoice_number)?;
        if self.items.is_empty() {
            return Err(RecordError::EmptyInvoice);
        }
        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(RecordError::TaxRateOutOfRange(self.tax_rate));
        }
        for item in &self.items {
            item.validate()?;
        }

        let subtotal: f64 = self.items.iter().map(|i| i.total).sum();
        if !approx_eq(self.subtotal, subtotal) {
            return Err(RecordError::InconsistentTotals {
                field: "subtotal",
                actual: self.subtotal,
                expected: subtotal,
            });
        }
        let total = self.subtotal + self.tax_amount;
        if !approx_eq(self.total, total) {
            return Err(RecordError::InconsistentTotals {
                field: "total",
                actual: self.total,
                expected: total,
            });
        }
        Ok(())
    }
}

/// Everything one export operation needs, as fetched from the backend
/// by the caller (or read from a JSON bundle by the CLI).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBundle {
    pub patient: Patient,
    pub practitioner: Practitioner,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription: Option<Prescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation: Option<ConsultationNote>,
}

// Currency comparisons tolerate sub-cent float error.
fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.005
}

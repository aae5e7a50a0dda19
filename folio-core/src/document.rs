//! Structured document fields supplied by the entry form.
//!
//! The layout engine only reads these, except for the signature image which
//! can be replaced from the canvas and is then re-emitted upstream.

use serde::{Deserialize, Serialize};

/// Kind of document template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Formal letter.
    #[default]
    Letter,
    /// Invoice with totals.
    Invoice,
    /// Periodic report.
    Report,
    /// Internal memo.
    Memo,
}

/// The template a document was created from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Template identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Template kind.
    #[serde(rename = "type", default)]
    pub kind: TemplateKind,
}

/// Document priority level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Normal priority.
    #[default]
    Normal,
    /// High priority.
    High,
    /// Urgent.
    Urgent,
}

/// Document classification level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Public.
    #[default]
    Public,
    /// Internal use only.
    Internal,
    /// Confidential.
    Confidential,
    /// Restricted.
    Restricted,
}

/// Letterhead printed at the top of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Letterhead {
    /// Letterhead composed from company details.
    #[serde(rename_all = "camelCase")]
    Manual {
        /// Company name.
        company_name: String,
        /// Postal address.
        #[serde(default)]
        address: Option<String>,
        /// Phone number.
        #[serde(default)]
        phone: Option<String>,
        /// Email address.
        #[serde(default)]
        email: Option<String>,
        /// Website.
        #[serde(default)]
        website: Option<String>,
        /// Logo image URI.
        #[serde(default)]
        logo_url: Option<String>,
    },
    /// Letterhead supplied as a pre-rendered image.
    #[serde(rename_all = "camelCase")]
    Uploaded {
        /// Display name of the uploaded letterhead.
        name: String,
        /// Image URI.
        image_url: String,
    },
}

/// Signature block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureBlock {
    /// Signer name.
    #[serde(default)]
    pub name: String,
    /// Signer position or job title.
    #[serde(default)]
    pub position: String,
    /// Signature image URI or data URI.
    #[serde(default)]
    pub signature_image: Option<String>,
    /// Whether the digital signature image should be used.
    #[serde(default)]
    pub use_digital_signature: bool,
}

/// Snapshot of all document fields at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    /// Document title.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Document date (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: String,
    /// Recipient block (letters).
    #[serde(default)]
    pub recipient: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Document number.
    #[serde(default)]
    pub document_number: Option<String>,
    /// Invoice number.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Invoice due date.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Invoice total before tax, as entered.
    #[serde(default)]
    pub total_amount: Option<String>,
    /// Tax rate in percent, as entered.
    #[serde(default)]
    pub tax_rate: Option<String>,
    /// Reporting department.
    #[serde(default)]
    pub department: Option<String>,
    /// Report period start.
    #[serde(default)]
    pub period_start: Option<String>,
    /// Report period end.
    #[serde(default)]
    pub period_end: Option<String>,
    /// Priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Classification.
    #[serde(default)]
    pub classification: Option<Classification>,
    /// Carbon-copy recipients, one per line.
    #[serde(default)]
    pub cc: Option<String>,
    /// Place of signing.
    #[serde(default)]
    pub location: Option<String>,
    /// Source template.
    #[serde(default)]
    pub template: Template,
    /// Letterhead.
    #[serde(default)]
    pub letterhead: Option<Letterhead>,
    /// Signature block.
    #[serde(default)]
    pub signature: Option<SignatureBlock>,
}

impl DocumentSnapshot {
    /// Signature image, if one is attached.
    #[must_use]
    pub fn signature_image(&self) -> Option<&str> {
        self.signature
            .as_ref()
            .and_then(|s| s.signature_image.as_deref())
            .filter(|src| !src.is_empty())
    }

    /// Copy of this snapshot with the signature image replaced.
    ///
    /// Creates an empty signature block when none exists yet.
    #[must_use]
    pub fn with_signature_image(&self, src: Option<String>) -> Self {
        let mut next = self.clone();
        let block = next.signature.get_or_insert_with(SignatureBlock::default);
        block.signature_image = src;
        next
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a document.
    pub fn from_json(json: &str) -> crate::CanvasResult<Self> {
        serde_json::from_str(json).map_err(crate::CanvasError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_form_json() {
        let json = r#"{
            "title": "Invoice #1",
            "content": "Thanks",
            "date": "2024-05-01",
            "taxRate": "11",
            "template": { "id": "inv", "name": "Invoice", "type": "invoice" },
            "letterhead": { "type": "manual", "companyName": "Acme", "logoUrl": "logo.png" },
            "signature": { "name": "Budi", "position": "CEO", "signatureImage": "data:image/png;base64,AAAA" }
        }"#;
        let doc = DocumentSnapshot::from_json(json).expect("parse");
        assert_eq!(doc.title, "Invoice #1");
        assert_eq!(doc.template.kind, TemplateKind::Invoice);
        assert_eq!(doc.tax_rate.as_deref(), Some("11"));
        assert_eq!(doc.signature_image(), Some("data:image/png;base64,AAAA"));
        assert!(matches!(
            doc.letterhead,
            Some(Letterhead::Manual { ref company_name, .. }) if company_name == "Acme"
        ));
    }

    #[test]
    fn test_empty_signature_image_is_absent() {
        let doc = DocumentSnapshot {
            signature: Some(SignatureBlock {
                signature_image: Some(String::new()),
                ..SignatureBlock::default()
            }),
            ..DocumentSnapshot::default()
        };
        assert_eq!(doc.signature_image(), None);
    }

    #[test]
    fn test_with_signature_image_creates_block() {
        let doc = DocumentSnapshot::default();
        let next = doc.with_signature_image(Some("sig.png".to_string()));
        assert_eq!(next.signature_image(), Some("sig.png"));
        assert!(doc.signature.is_none());
    }
}

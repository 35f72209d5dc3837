//! CSV export for lead lists.
//!
//! Exports apply the same filters as the JSON list endpoints but ignore
//! pagination. Output is UTF-8 with a byte order mark so spreadsheet tools
//! detect the encoding, and is delivered as a download attachment.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::db::models::clinics::ClinicDBResponse;
use crate::db::models::contacts::ContactDBResponse;
use crate::db::models::salons::SalonDBResponse;

const BOM: &str = "\u{feff}";

/// Whether a `format` query parameter asks for CSV. Matching is
/// case-insensitive, so `format=CSV` downloads too.
pub fn requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.eq_ignore_ascii_case("csv"))
}

/// An entity that can be rendered as CSV rows.
pub trait CsvRecord {
    /// Plural, lowercase entity name used in the download filename.
    const ENTITY: &'static str;
    /// Column names, one per persisted field, in a stable order.
    const HEADER: &'static [&'static str];

    fn row(&self) -> Vec<String>;
}

/// Quote a field only when it contains a comma, double quote, or newline;
/// internal quotes are doubled.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_num(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a full CSV document: BOM, header row, then one row per item.
pub fn render<T: CsvRecord>(items: &[T]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&T::HEADER.join(","));
    out.push('\n');
    for item in items {
        let row: Vec<String> = item.row().iter().map(|f| escape(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Wrap a rendered CSV document as a download response, named after the
/// entity and the current date.
pub fn attachment<T: CsvRecord>(items: &[T]) -> Response {
    let filename = format!("{}-{}.csv", T::ENTITY, Utc::now().format("%Y-%m-%d"));
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        render(items),
    )
        .into_response()
}

impl CsvRecord for ClinicDBResponse {
    const ENTITY: &'static str = "clinics";
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "location",
        "doctorCount",
        "instagram",
        "site",
        "bioLink",
        "contactPerson",
        "email",
        "whatsapp",
        "notes",
        "prospectEmail",
        "prospectCall",
        "prospectWhatsapp",
        "createdAt",
        "updatedAt",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(&self.location),
            opt_num(self.doctor_count),
            opt(&self.instagram),
            opt(&self.site),
            opt(&self.bio_link),
            opt(&self.contact_person),
            opt(&self.email),
            opt(&self.whatsapp),
            opt(&self.notes),
            self.prospect_email.to_string(),
            self.prospect_call.to_string(),
            self.prospect_whatsapp.to_string(),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }
}

impl CsvRecord for SalonDBResponse {
    const ENTITY: &'static str = "salons";
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "address",
        "instagram",
        "email",
        "phone",
        "site",
        "unitCount",
        "createdAt",
        "updatedAt",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(&self.address),
            opt(&self.instagram),
            opt(&self.email),
            opt(&self.phone),
            opt(&self.site),
            opt_num(self.unit_count),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }
}

impl CsvRecord for ContactDBResponse {
    const ENTITY: &'static str = "contacts";
    const HEADER: &'static [&'static str] = &[
        "id",
        "userId",
        "name",
        "specialty",
        "instagram",
        "whatsapp",
        "email",
        "status",
        "notes",
        "address",
        "createdAt",
        "updatedAt",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.user_id.to_string(),
            self.name.clone(),
            opt(&self.specialty),
            opt(&self.instagram),
            opt(&self.whatsapp),
            opt(&self.email),
            self.status.clone(),
            opt(&self.notes),
            opt(&self.address),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn format_parameter_matches_csv_in_any_case() {
        assert!(requested(Some("csv")));
        assert!(requested(Some("CSV")));
        assert!(requested(Some("Csv")));
        assert!(!requested(Some("json")));
        assert!(!requested(None));
    }

    fn salon() -> SalonDBResponse {
        SalonDBResponse {
            id: Uuid::nil(),
            name: "Glow, \"The\" Studio".to_string(),
            address: Some("Rua A\nSala 2".to_string()),
            instagram: None,
            email: Some("hi@glow.test".to_string()),
            phone: None,
            site: None,
            unit_count: Some(3),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(escape("hello"), "hello");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn fields_with_delimiters_are_quoted_and_doubled() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn document_starts_with_a_bom_and_header() {
        let csv = render::<SalonDBResponse>(&[]);
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("id,name,address,instagram,email,phone,site,unitCount,createdAt,updatedAt\n"));
    }

    #[test]
    fn rows_render_nulls_empty_and_escape_specials() {
        let csv = render(&[salon()]);
        assert!(csv.contains("\"Glow, \"\"The\"\" Studio\""));
        // None fields collapse to consecutive separators
        assert!(csv.contains(",,hi@glow.test,,,3,2024-05-01T12:30:00.000Z"));
    }

    #[test]
    fn newline_in_a_field_stays_inside_quotes() {
        let csv = render(&[salon()]);
        // Header + 2 physical lines for the one record (embedded newline)
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("\"Rua A\nSala 2\""));
    }

    #[test]
    fn attachment_sets_download_headers() {
        let response = attachment::<SalonDBResponse>(&[]);
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/csv; charset=utf-8");
        let disposition = headers.get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"salons-"));
        assert!(disposition.ends_with(".csv\""));
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    }
}

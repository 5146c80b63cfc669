use std::path::Path;

use crate::config::Config;
use crate::error::ExportError;
use crate::pdf::{self, Font, Page, PdfWriter};

use super::{AttachmentReport, AttachmentStatusRow};

const SUMMARY_HEADER: &str =
    "CRN,WorkerID,WorkerName,IncidentType,AttachmentType,Mandatory,FolderPath,Submitted,FileCount,Files";
const FILES_HEADER: &str =
    "CRN,WorkerID,WorkerName,IncidentType,AttachmentType,Mandatory,FolderPath,Submitted,FileName,PublicUrl";

/// Quotes a field when it holds a comma, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn leading_fields(row: &AttachmentStatusRow) -> Vec<String> {
    vec![
        csv_field(&row.claim.crn),
        row.claim.worker_id.to_string(),
        csv_field(&row.claim.worker_name),
        csv_field(&row.claim.incident_type),
        csv_field(&row.attachment_type),
        yes_no(row.mandatory).to_string(),
        csv_field(row.folder_path.as_deref().unwrap_or("")),
        yes_no(row.submitted()).to_string(),
    ]
}

/// One line per required attachment, with the submitted file names joined by `; `.
pub fn summary_csv(rows: &[AttachmentStatusRow]) -> String {
    let mut out = String::from(SUMMARY_HEADER);
    out.push('\n');
    for row in rows {
        let names: Vec<&str> = row
            .files
            .iter()
            .filter_map(|f| f.file_name.as_deref())
            .collect();
        let mut fields = leading_fields(row);
        fields.push(row.files.len().to_string());
        fields.push(csv_field(&names.join("; ")));
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// One line per submitted file; attachments with no file get a single line
/// with empty file columns.
pub fn files_csv(rows: &[AttachmentStatusRow], config: &Config) -> String {
    let mut out = String::from(FILES_HEADER);
    out.push('\n');
    for row in rows {
        let lead = leading_fields(row).join(",");
        if row.files.is_empty() {
            out.push_str(&format!("{},,\n", lead));
            continue;
        }
        for file in &row.files {
            let url = file
                .file_url
                .as_deref()
                .map(|u| config.public_url(u))
                .unwrap_or_default();
            out.push_str(&format!(
                "{},{},{}\n",
                lead,
                csv_field(file.file_name.as_deref().unwrap_or("")),
                csv_field(&url)
            ));
        }
    }
    out
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, bytes).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn export_summary_csv(report: &AttachmentReport, path: &Path) -> Result<(), ExportError> {
    let _span = tracing::info_span!("attachments.export_summary_csv").entered();
    write(path, summary_csv(&report.rows).as_bytes())?;
    log::info!("Exported {} attachment rows to {}", report.rows.len(), path.display());
    Ok(())
}

pub fn export_files_csv(
    report: &AttachmentReport,
    config: &Config,
    path: &Path,
) -> Result<(), ExportError> {
    let _span = tracing::info_span!("attachments.export_files_csv").entered();
    write(path, files_csv(&report.rows, config).as_bytes())?;
    log::info!("Exported attachment files to {}", path.display());
    Ok(())
}

const ROW_HEIGHT: f64 = 14.0;
const TOP: f64 = 720.0;
const BOTTOM: f64 = 60.0;
const COLUMNS: [(&str, f64); 6] = [
    ("CRN", 40.0),
    ("Worker", 120.0),
    ("Attachment", 250.0),
    ("Mandatory", 400.0),
    ("Submitted", 465.0),
    ("Files", 530.0),
];

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(max.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

fn table_header(page: &mut Page, y: f64) {
    for (title, x) in COLUMNS {
        page.text(x, y, 9.0, Font::Bold, title);
    }
    page.rule(40.0, y - 4.0, pdf::PAGE_WIDTH - 40.0, y - 4.0);
}

/// Renders the status table with the completion figures above it.
pub fn export_pdf(report: &AttachmentReport, path: &Path) -> Result<(), ExportError> {
    let _span = tracing::info_span!("attachments.export_pdf").entered();

    let mut writer = PdfWriter::new();
    let mut page = Page::new();
    let s = &report.stats;
    page.text(40.0, 750.0, 14.0, Font::Bold, "Attachment Status")
        .text(
            40.0,
            734.0,
            9.0,
            Font::Regular,
            &format!(
                "Required {} (mandatory {}), submitted {} (mandatory {}), missing {} (mandatory {})",
                s.total_required,
                s.mandatory_required,
                s.total_submitted,
                s.mandatory_submitted,
                s.total_missing,
                s.mandatory_missing
            ),
        );
    let mut y = TOP - 10.0;
    table_header(&mut page, y);
    y -= ROW_HEIGHT + 4.0;

    for row in &report.rows {
        if y < BOTTOM {
            writer.add_page(std::mem::take(&mut page));
            y = TOP;
            table_header(&mut page, y);
            y -= ROW_HEIGHT + 4.0;
        }
        let cells = [
            truncate(&row.claim.crn, 14),
            truncate(&row.claim.worker_name, 22),
            truncate(&row.attachment_type, 26),
            yes_no(row.mandatory).to_string(),
            yes_no(row.submitted()).to_string(),
            row.files.len().to_string(),
        ];
        for ((_, x), cell) in COLUMNS.iter().zip(cells.iter()) {
            page.text(*x, y, 9.0, Font::Regular, cell);
        }
        y -= ROW_HEIGHT;
    }
    writer.add_page(page);

    let bytes = writer
        .into_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    write(path, &bytes)?;
    log::info!("Exported attachment status PDF to {}", path.display());
    Ok(())
}

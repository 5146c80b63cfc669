//! Consent of Award (Injury): the two-page certificate issued once an
//! award is accepted.

mod assets;
mod format;

pub use assets::{load_asset, load_optional};
pub use format::{format_currency, format_ordinal_date, parse_stored_date};

use std::path::PathBuf;

use rusqlite::Connection;
use serde::Serialize;

use crate::config::{Config, SignatoryAssets};
use crate::db::claim_repo::{self, CompensationComponent};
use crate::db::{master_repo, review_repo, worker_repo};
use crate::error::CertificateError;
use crate::pdf::{self, Font, Page, PdfWriter, RasterImage};

/// Every field printed on the certificate, gathered before rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardDetails {
    pub irn: i64,
    pub display_code: String,
    pub claim_type: Option<String>,
    pub incident_date: Option<String>,
    pub incident_location: Option<String>,
    pub incident_province: Option<String>,
    pub nature_extent_injury: Option<String>,
    pub injury_cause: Option<String>,
    pub decision_status: Option<String>,
    pub decision_date: Option<String>,
    pub components: Vec<CompensationComponent>,
    pub total: f64,
    pub worker_name: String,
    pub worker_origin: String,
    pub worker_address: String,
    pub employer_name: String,
    pub employer_address: String,
    pub insurer_name: String,
}

fn join_present(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|p| p.as_deref().map(str::trim).filter(|s| !s.is_empty()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Gathers the certificate fields in a fixed order: claim, commissioner
/// decision, compensation, worker, employer, insurer.
pub fn collect(conn: &Connection, irn: i64) -> Result<AwardDetails, CertificateError> {
    let claim = claim_repo::find_by_irn(conn, irn)?.ok_or(CertificateError::ClaimNotFound(irn))?;

    let decision = review_repo::fetch_rows(
        conn,
        review_repo::AWARD_COMMISSIONER_REVIEW.table,
        irn,
        &["CACRReviewStatus", "CACRDecisionDate"],
    )?;
    let decision_text = |i: usize| {
        decision.first().and_then(|row| match &row[i] {
            rusqlite::types::Value::Text(s) => Some(s.clone()),
            _ => None,
        })
    };

    let components = claim_repo::list_components(conn, irn)?;
    let total: f64 = components.iter().map(|c| c.amount).sum();

    let personal = worker_repo::find_personal(conn, claim.worker_id)?.map(|(p, _)| p);
    let (worker_name, worker_origin, worker_address) = match &personal {
        Some(p) => (
            p.full_name(),
            join_present(&[
                &p.worker_place_of_origin_village,
                &p.worker_place_of_origin_district,
                &p.worker_place_of_origin_province,
            ]),
            join_present(&[&p.worker_address1, &p.worker_city, &p.worker_province]),
        ),
        None => Default::default(),
    };

    let employer = match worker_repo::find_employment(conn, claim.worker_id)?
        .and_then(|e| e.employer_cppsid)
    {
        Some(cppsid) => master_repo::find_employer(conn, &cppsid)?,
        None => None,
    };
    let (employer_name, employer_address) = employer
        .as_ref()
        .map(|e| {
            (
                e.organization_name.clone(),
                join_present(&[&e.address1, &e.city, &e.province]),
            )
        })
        .unwrap_or_default();

    let insurer_code = employer
        .as_ref()
        .and_then(|e| e.insurance_provider_ipa_code.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("SELF"));
    let insurer_name = match insurer_code {
        Some(code) => master_repo::find_insurer(conn, code)?
            .map(|i| i.organization_name)
            .unwrap_or_else(|| employer_name.clone()),
        None => employer_name.clone(),
    };

    Ok(AwardDetails {
        irn,
        display_code: claim.display_code(),
        claim_type: claim.claim_type,
        incident_date: claim.incident_date,
        incident_location: claim.incident_location,
        incident_province: claim.incident_province,
        nature_extent_injury: claim.nature_extent_injury,
        injury_cause: claim.injury_cause,
        decision_status: decision_text(0),
        decision_date: decision_text(1),
        components,
        total,
        worker_name,
        worker_origin,
        worker_address,
        employer_name,
        employer_address,
        insurer_name,
    })
}

pub fn file_name(details: &AwardDetails) -> String {
    format!("ConsentOfAward-Injury-{}.pdf", details.display_code)
}

/// Decoded images for the certificate. The crest appears on both pages.
#[derive(Debug, Default)]
pub struct CertificateImages {
    pub crest: Option<RasterImage>,
    pub stamp: Option<RasterImage>,
    pub signature: Option<RasterImage>,
}

impl CertificateImages {
    pub fn load(
        crest: Option<&str>,
        signatory: &SignatoryAssets,
        include_signature: bool,
    ) -> Result<Self, CertificateError> {
        let mut images = Self {
            crest: load_optional("crest", crest)?,
            ..Default::default()
        };
        if include_signature {
            images.stamp = load_optional("stamp", signatory.stamp.as_deref())?;
            images.signature = load_optional("signature", signatory.signature.as_deref())?;
        }
        Ok(images)
    }
}

fn dated(raw: Option<&str>) -> String {
    match raw {
        Some(r) => parse_stored_date(r)
            .map(format_ordinal_date)
            .unwrap_or_else(|| r.to_string()),
        None => "-".to_string(),
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

const LEFT: f64 = 72.0;

/// Renders the two pages. Stamp and signature are only drawn when present
/// in `images`, so callers control them through [`CertificateImages::load`].
pub fn render(details: &AwardDetails, images: &CertificateImages) -> Result<Vec<u8>, CertificateError> {
    let _span = tracing::info_span!("certificate.render", irn = details.irn).entered();

    let mut writer = PdfWriter::new();
    let crest = images.crest.as_ref().map(|img| writer.add_image(img));
    let stamp = images.stamp.as_ref().map(|img| writer.add_image(img));
    let signature = images.signature.as_ref().map(|img| writer.add_image(img));

    let header = |page: &mut Page| {
        if let Some(id) = crest {
            page.image(id, (pdf::PAGE_WIDTH - 64.0) / 2.0, 700.0, 64.0, 64.0);
        }
        page.centered(680.0, 12.0, Font::Bold, "OFFICE OF WORKERS' COMPENSATION")
            .centered(662.0, 10.0, Font::Regular, "Workers' Compensation Tribunal")
            .rule(LEFT, 652.0, pdf::PAGE_WIDTH - LEFT, 652.0);
    };

    // Page one: parties and tribunal composition.
    let mut first = Page::new();
    header(&mut first);
    first
        .centered(625.0, 16.0, Font::Bold, "CONSENT OF AWARD")
        .centered(607.0, 10.0, Font::Regular, &format!("Claim {}", details.display_code));

    let mut y = 570.0;
    let mut field = |page: &mut Page, label: &str, value: &str| {
        page.text(LEFT, y, 10.0, Font::Bold, label);
        for line in pdf::wrap(value, 60) {
            page.text(LEFT + 150.0, y, 10.0, Font::Regular, &line);
            y -= 14.0;
        }
        y -= 6.0;
    };
    field(&mut first, "Worker", &details.worker_name);
    field(&mut first, "Place of origin", &details.worker_origin);
    field(&mut first, "Address", &details.worker_address);
    field(&mut first, "Employer", &details.employer_name);
    field(&mut first, "Employer address", &details.employer_address);
    field(&mut first, "Insurer", &details.insurer_name);
    field(&mut first, "Date of incident", &dated(details.incident_date.as_deref()));
    field(&mut first, "Place of incident", or_dash(&details.incident_location));
    field(&mut first, "Province", or_dash(&details.incident_province));
    field(&mut first, "Nature of injury", or_dash(&details.nature_extent_injury));
    field(&mut first, "Cause of injury", or_dash(&details.injury_cause));
    field(&mut first, "Claim form", or_dash(&details.claim_type));

    first.text(LEFT, y - 10.0, 11.0, Font::Bold, "Tribunal composition");
    let mut ty = y - 30.0;
    for line in [
        "Chief Commissioner, presiding",
        "Commissioner, member",
        "Registrar of Workers' Compensation, secretary",
    ] {
        first.text(LEFT + 12.0, ty, 10.0, Font::Regular, line);
        ty -= 14.0;
    }
    writer.add_page(first);

    // Page two: award, payment instructions, signature block.
    let mut second = Page::new();
    header(&mut second);
    second.centered(625.0, 14.0, Font::Bold, "AWARD");
    let mut y = 595.0;
    let award = format!(
        "The Tribunal, having considered the claim of {} against {}, awards \
         compensation in the sum of {} as set out below.",
        details.worker_name,
        details.employer_name,
        format_currency(details.total)
    );
    for line in pdf::wrap(&award, 85) {
        second.text(LEFT, y, 10.0, Font::Regular, &line);
        y -= 14.0;
    }
    y -= 8.0;
    for c in &details.components {
        second
            .text(LEFT + 12.0, y, 10.0, Font::Regular, &c.component)
            .text(420.0, y, 10.0, Font::Regular, &format_currency(c.amount));
        y -= 14.0;
    }
    second
        .rule(LEFT, y + 4.0, pdf::PAGE_WIDTH - LEFT, y + 4.0)
        .text(LEFT + 12.0, y - 10.0, 10.0, Font::Bold, "Total")
        .text(420.0, y - 10.0, 10.0, Font::Bold, &format_currency(details.total));
    y -= 40.0;

    let instructions = format!(
        "{} shall pay the awarded sum to the Office of Workers' Compensation \
         within fourteen days of this consent, quoting claim {}.",
        details.insurer_name, details.display_code
    );
    second.text(LEFT, y, 11.0, Font::Bold, "Payment instructions");
    y -= 18.0;
    for line in pdf::wrap(&instructions, 85) {
        second.text(LEFT, y, 10.0, Font::Regular, &line);
        y -= 14.0;
    }

    let decided = dated(details.decision_date.as_deref());
    second.text(LEFT, 200.0, 10.0, Font::Regular, &format!("Dated {}", decided));
    if let Some(id) = signature {
        second.image(id, LEFT, 120.0, 120.0, 48.0);
    }
    if let Some(id) = stamp {
        second.image(id, 360.0, 110.0, 90.0, 90.0);
    }
    second
        .rule(LEFT, 112.0, LEFT + 180.0, 112.0)
        .text(LEFT, 98.0, 10.0, Font::Regular, "Registrar of Workers' Compensation");
    writer.add_page(second);

    writer
        .into_bytes()
        .map_err(|e| CertificateError::Pdf(e.to_string()))
}

/// Collects, renders and writes the certificate for `irn` into the
/// configured output directory. Returns the written path.
pub fn generate_consent_of_award(
    conn: &Connection,
    irn: i64,
    config: &Config,
    signatory: &SignatoryAssets,
    include_signature: bool,
) -> Result<PathBuf, CertificateError> {
    let details = collect(conn, irn)?;
    let images = CertificateImages::load(config.assets.crest.as_deref(), signatory, include_signature)?;
    let bytes = render(&details, &images)?;

    let dir = PathBuf::from(&config.output_directory);
    std::fs::create_dir_all(&dir).map_err(|e| CertificateError::Io {
        path: dir.clone(),
        source: e,
    })?;
    let path = dir.join(file_name(&details));
    std::fs::write(&path, bytes).map_err(|e| CertificateError::Io {
        path: path.clone(),
        source: e,
    })?;

    log::info!("Wrote award certificate {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::master_repo::{EmployerRow, InsurerRow};
    use crate::db::Database;
    use crate::worker::{EmploymentDetails, PersonalDetails};

    fn seed(conn: &Connection, ipa_code: Option<&str>) -> Result<(), crate::db::DatabaseError> {
        let personal = PersonalDetails {
            worker_first_name: "John".into(),
            worker_last_name: "Kapi".into(),
            worker_dob: "1990-01-01".into(),
            worker_gender: "M".into(),
            worker_place_of_origin_village: Some("Hanuabada".into()),
            ..Default::default()
        };
        let worker_id = worker_repo::insert_personal(conn, &personal, false)?;
        worker_repo::upsert_employment(
            conn,
            worker_id,
            &EmploymentDetails {
                employer_cppsid: Some("EMP1".into()),
                ..Default::default()
            },
        )?;
        master_repo::insert_employer(
            conn,
            &EmployerRow {
                cppsid: "EMP1".into(),
                organization_name: "Coastal Timber".into(),
                insurance_provider_ipa_code: ipa_code.map(String::from),
                ..Default::default()
            },
        )?;
        master_repo::insert_insurer(
            conn,
            &InsurerRow {
                ipa_code: "IPA9".into(),
                organization_name: "Pacific Mutual".into(),
                ..Default::default()
            },
        )?;
        claim_repo::insert(
            conn,
            &claim_repo::ClaimRow {
                irn: 42,
                display_irn: Some("INJ-042".into()),
                worker_id,
                incident_type: "Injury".into(),
                incident_date: Some("2024-03-01".into()),
                ..Default::default()
            },
        )?;
        for amount in [1000.0, 200.0, 50.0, -25.0] {
            claim_repo::insert_component(conn, 42, "Component", amount)?;
        }
        Ok(())
    }

    #[test]
    fn test_collect_sums_components_and_resolves_insurer() {
        let db = Database::open_in_memory().unwrap();
        let details = db
            .with_conn(|conn| {
                seed(conn, Some("IPA9"))?;
                collect(conn, 42).map_err(|e| match e {
                    CertificateError::Database(d) => d,
                    other => panic!("{other}"),
                })
            })
            .unwrap();
        assert_eq!(format_currency(details.total), "K1,225");
        assert_eq!(details.worker_name, "John Kapi");
        assert_eq!(details.worker_origin, "Hanuabada");
        assert_eq!(details.employer_name, "Coastal Timber");
        assert_eq!(details.insurer_name, "Pacific Mutual");
        assert_eq!(file_name(&details), "ConsentOfAward-Injury-INJ-042.pdf");
    }

    #[test]
    fn test_self_insured_falls_back_to_employer() {
        let db = Database::open_in_memory().unwrap();
        let insurer = db
            .with_conn(|conn| {
                seed(conn, Some("SELF"))?;
                Ok(collect(conn, 42).unwrap().insurer_name)
            })
            .unwrap();
        assert_eq!(insurer, "Coastal Timber");
    }

    #[test]
    fn test_missing_claim() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_conn(|conn| Ok(collect(conn, 5))).unwrap();
        assert!(matches!(result, Err(CertificateError::ClaimNotFound(5))));
    }

    #[test]
    fn test_generate_writes_two_page_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let mut config = Config::with_chief_commissioner(1);
        config.output_directory = dir.path().to_string_lossy().into_owned();
        config.assets.crest = Some(assets::tests::png_data_uri());
        let signatory = SignatoryAssets {
            stamp: Some(assets::tests::png_data_uri()),
            signature: None,
        };

        let path = db
            .with_conn(|conn| {
                seed(conn, None)?;
                Ok(generate_consent_of_award(conn, 42, &config, &signatory, true).unwrap())
            })
            .unwrap();
        assert!(path.ends_with("ConsentOfAward-Injury-INJ-042.pdf"));
        let doc = lopdf::Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_signature_images_skipped_without_flag() {
        let signatory = SignatoryAssets {
            stamp: Some("does-not-exist.png".into()),
            signature: Some("does-not-exist.png".into()),
        };
        let images = CertificateImages::load(None, &signatory, false).unwrap();
        assert!(images.stamp.is_none() && images.signature.is_none());
    }
}

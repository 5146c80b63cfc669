//! Field-by-field comparison of a stored worker against an edited form.
//!
//! Values are normalized before comparison so that representation noise
//! (`"1"` vs `true`, a timestamp vs a bare date, key order inside child
//! rows) never shows up as a change.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::model::WorkerForm;

/// Form tab a change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tab {
    Personal,
    Spouse,
    Dependants,
    Employment,
    WorkHistory,
    Insurance,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Personal,
        Tab::Spouse,
        Tab::Dependants,
        Tab::Employment,
        Tab::WorkHistory,
        Tab::Insurance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Personal => "Personal",
            Tab::Spouse => "Spouse",
            Tab::Dependants => "Dependants",
            Tab::Employment => "Employment",
            Tab::WorkHistory => "Work History",
            Tab::Insurance => "Insurance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Bool,
    Date,
    Number,
    Married,
    Gender,
}

struct FieldSpec {
    tab: Tab,
    key: &'static str,
    label: &'static str,
    kind: FieldKind,
}

const fn field(tab: Tab, key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        tab,
        key,
        label,
        kind,
    }
}

use FieldKind::{Bool, Date, Gender, Married, Number, Text};

const PERSONAL_FIELDS: &[FieldSpec] = &[
    field(Tab::Personal, "WorkerFirstName", "First Name", Text),
    field(Tab::Personal, "WorkerLastName", "Last Name", Text),
    field(Tab::Personal, "WorkerAliasName", "Alias", Text),
    field(Tab::Personal, "WorkerDOB", "Date of Birth", Date),
    field(Tab::Personal, "WorkerGender", "Gender", Gender),
    field(Tab::Personal, "WorkerMarried", "Marital Status", Married),
    field(Tab::Personal, "WorkerHanded", "Handedness", Text),
    field(Tab::Personal, "WorkerPlaceOfOriginVillage", "Village of Origin", Text),
    field(Tab::Personal, "WorkerPlaceOfOriginDistrict", "District of Origin", Text),
    field(Tab::Personal, "WorkerPlaceOfOriginProvince", "Province of Origin", Text),
    field(Tab::Personal, "WorkerAddress1", "Address Line 1", Text),
    field(Tab::Personal, "WorkerAddress2", "Address Line 2", Text),
    field(Tab::Personal, "WorkerCity", "City", Text),
    field(Tab::Personal, "WorkerProvince", "Province", Text),
    field(Tab::Personal, "WorkerPOBox", "PO Box", Text),
    field(Tab::Personal, "WorkerEmail", "Email", Text),
    field(Tab::Personal, "WorkerMobile", "Mobile", Text),
    field(Tab::Personal, "WorkerLandline", "Landline", Text),
    field(Tab::Spouse, "SpouseFirstName", "Spouse First Name", Text),
    field(Tab::Spouse, "SpouseLastName", "Spouse Last Name", Text),
    field(Tab::Spouse, "SpouseDOB", "Spouse Date of Birth", Date),
    field(Tab::Spouse, "SpouseAddress1", "Spouse Address", Text),
    field(Tab::Spouse, "SpouseCity", "Spouse City", Text),
    field(Tab::Spouse, "SpouseProvince", "Spouse Province", Text),
    field(Tab::Spouse, "SpouseMobile", "Spouse Mobile", Text),
];

const EMPLOYMENT_FIELDS: &[FieldSpec] = &[
    field(Tab::Employment, "EmploymentID", "Employment ID", Text),
    field(Tab::Employment, "Occupation", "Occupation", Text),
    field(Tab::Employment, "PlaceOfEmployment", "Place of Employment", Text),
    field(Tab::Employment, "NatureOfEmployment", "Nature of Employment", Text),
    field(Tab::Employment, "AverageWeeklyWage", "Average Weekly Wage", Number),
    field(Tab::Employment, "WeeklyPaymentRate", "Weekly Payment Rate", Number),
    field(Tab::Employment, "WorkedUnderSubContractor", "Worked Under Sub-Contractor", Bool),
    field(Tab::Employment, "SubContractorOrganizationName", "Sub-Contractor Organization", Text),
    field(Tab::Employment, "SubContractorLocation", "Sub-Contractor Location", Text),
    field(Tab::Employment, "SubContractorNatureOfBusiness", "Sub-Contractor Business", Text),
    field(Tab::Employment, "EmployerCPPSID", "Employer CPPSID", Text),
    field(Tab::Insurance, "InsuranceProviderIPACode", "Insurance Provider", Text),
];

/// One line of the confirmation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRow {
    pub tab: Tab,
    pub field: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub rows: Vec<ChangeRow>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Badge count for one tab.
    pub fn count_for(&self, tab: Tab) -> usize {
        self.rows.iter().filter(|r| r.tab == tab).count()
    }

    /// Tabs with at least one change, in tab order.
    pub fn tab_counts(&self) -> Vec<(Tab, usize)> {
        Tab::ALL
            .iter()
            .map(|&tab| (tab, self.count_for(tab)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Rows grouped by tab, in tab order.
    pub fn grouped(&self) -> BTreeMap<Tab, Vec<&ChangeRow>> {
        let mut groups: BTreeMap<Tab, Vec<&ChangeRow>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(row.tab).or_default().push(row);
        }
        groups
    }

    pub fn find(&self, field: &str) -> Option<&ChangeRow> {
        self.rows.iter().find(|r| r.field == field)
    }

    fn push(&mut self, tab: Tab, field: &str, from: String, to: String) {
        self.rows.push(ChangeRow {
            tab,
            field: field.to_string(),
            from,
            to,
        });
    }
}

/// Compares the stored snapshot against the edited form.
pub fn diff(original: &WorkerForm, edited: &WorkerForm) -> ChangeSet {
    let mut changes = ChangeSet::default();

    compare_fields(
        &mut changes,
        PERSONAL_FIELDS,
        &to_value(&original.personal),
        &to_value(&edited.personal),
    );

    compare_flag(
        &mut changes,
        Tab::Dependants,
        "Has Dependants",
        original.has_dependants,
        edited.has_dependants,
    );
    compare_children(
        &mut changes,
        Tab::Dependants,
        "Dependants",
        &canonical_rows(original.effective_dependants()),
        &canonical_rows(edited.effective_dependants()),
    );

    compare_fields(
        &mut changes,
        EMPLOYMENT_FIELDS,
        &to_value(&original.employment),
        &to_value(&edited.employment),
    );

    compare_flag(
        &mut changes,
        Tab::WorkHistory,
        "Has Work History",
        original.has_history,
        edited.has_history,
    );
    compare_children(
        &mut changes,
        Tab::WorkHistory,
        "Work History",
        &canonical_rows(original.effective_work_history()),
        &canonical_rows(edited.effective_work_history()),
    );

    changes
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn compare_fields(changes: &mut ChangeSet, fields: &[FieldSpec], from: &Value, to: &Value) {
    for field in fields {
        let before = normalize(field.kind, from.get(field.key).unwrap_or(&Value::Null));
        let after = normalize(field.kind, to.get(field.key).unwrap_or(&Value::Null));
        if before != after {
            changes.push(field.tab, field.label, before, after);
        }
    }
}

fn compare_flag(changes: &mut ChangeSet, tab: Tab, label: &str, from: bool, to: bool) {
    if from != to {
        changes.push(tab, label, yes_no(from).into(), yes_no(to).into());
    }
}

fn compare_children(
    changes: &mut ChangeSet,
    tab: Tab,
    label: &str,
    from: &[BTreeMap<String, String>],
    to: &[BTreeMap<String, String>],
) {
    if from.len() != to.len() {
        changes.push(
            tab,
            &format!("{} (rows)", label),
            from.len().to_string(),
            to.len().to_string(),
        );
        return;
    }

    let modified = from.iter().zip(to).filter(|(a, b)| a != b).count();
    if modified > 0 {
        changes.push(
            tab,
            &format!("{} (details)", label),
            format!("{} rows", from.len()),
            format!("{} rows changed", modified),
        );
    }
}

/// Each child row as a sorted map of normalized text values.
fn canonical_rows<T: Serialize>(rows: &[T]) -> Vec<BTreeMap<String, String>> {
    rows.iter()
        .map(|row| match to_value(row) {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| {
                    let kind = if k.ends_with("DOB") || k.ends_with("Date") {
                        Date
                    } else {
                        Text
                    };
                    let normalized = normalize(kind, &v);
                    (k, normalized)
                })
                .collect(),
            _ => BTreeMap::new(),
        })
        .collect()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y"
        ),
        _ => false,
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => yes_no(*b).to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Normalized display string for one value.
fn normalize(kind: FieldKind, value: &Value) -> String {
    match kind {
        FieldKind::Text => plain_text(value),
        FieldKind::Bool => yes_no(is_truthy(value)).to_string(),
        FieldKind::Married => {
            if is_truthy(value) {
                "Married".to_string()
            } else {
                "Single".to_string()
            }
        }
        FieldKind::Gender => match plain_text(value).to_ascii_uppercase().as_str() {
            "M" | "MALE" => "Male".to_string(),
            "F" | "FEMALE" => "Female".to_string(),
            _ => plain_text(value),
        },
        FieldKind::Date => {
            let text = plain_text(value);
            match text.get(..10) {
                Some(prefix) if chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() => {
                    prefix.to_string()
                }
                _ => text,
            }
        }
        FieldKind::Number => match value {
            Value::Number(n) => n.as_f64().map(format_number).unwrap_or_default(),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(format_number)
                .unwrap_or_else(|_| s.trim().to_string()),
            _ => plain_text(value),
        },
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

use crate::error::ValidationError;

use super::model::WorkerForm;

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Lists every required field the form leaves empty.
pub fn validate(form: &WorkerForm) -> Result<(), ValidationError> {
    let p = &form.personal;
    let mut missing = Vec::new();

    for (label, value) in [
        ("First Name", p.worker_first_name.as_str()),
        ("Last Name", p.worker_last_name.as_str()),
        ("Date of Birth", p.worker_dob.as_str()),
        ("Gender", p.worker_gender.as_str()),
    ] {
        if blank(value) {
            missing.push(label.to_string());
        }
    }

    if form.employment.employer_cppsid.as_deref().map_or(true, blank) {
        missing.push("Employer CPPSID".to_string());
    }

    for (i, d) in form.effective_dependants().iter().enumerate() {
        if blank(&d.dependant_first_name) {
            missing.push(format!("Dependant {} First Name", i + 1));
        }
        if blank(&d.dependant_last_name) {
            missing.push(format!("Dependant {} Last Name", i + 1));
        }
    }

    for (i, h) in form.effective_work_history().iter().enumerate() {
        if blank(&h.organization_name) {
            missing.push(format!("Work History {} Organization Name", i + 1));
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::model::Dependant;

    #[test]
    fn test_empty_form_lists_all_required() {
        let err = validate(&WorkerForm::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "First Name".into(),
                "Last Name".into(),
                "Date of Birth".into(),
                "Gender".into(),
                "Employer CPPSID".into(),
            ])
        );
    }

    #[test]
    fn test_dependants_only_checked_when_enabled() {
        let mut form = WorkerForm::default();
        form.personal.worker_first_name = "A".into();
        form.personal.worker_last_name = "B".into();
        form.personal.worker_dob = "2000-01-01".into();
        form.personal.worker_gender = "F".into();
        form.employment.employer_cppsid = Some("CPPS-1".into());
        form.dependants = vec![Dependant::default()];
        assert!(validate(&form).is_ok());

        form.has_dependants = true;
        let ValidationError::MissingFields(missing) = validate(&form).unwrap_err();
        assert_eq!(missing, vec!["Dependant 1 First Name", "Dependant 1 Last Name"]);
    }
}

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::SessionState;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prescription {
    pub medication: String,
    pub dosage: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Allergy {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Condition {
    pub name: String,
}

/// 预约时写入日历的患者记录
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    pub name: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub prescriptions: Option<Vec<Prescription>>,
    #[serde(default)]
    pub allergies: Option<Vec<Allergy>>,
    #[serde(default)]
    pub conditions: Option<Vec<Condition>>,
    pub visit_reasons: String,
    pub visit_date: String,
}

impl Patient {
    /// 从会话累积的字段组装患者记录
    pub fn from_session(session: &SessionState) -> Result<Self> {
        Ok(Self {
            name: session.require_str("name")?.to_string(),
            date_of_birth: session.require_str("date_of_birth")?.to_string(),
            prescriptions: session.get_as("prescriptions")?,
            allergies: session.get_as("allergies")?,
            conditions: session.get_as("conditions")?,
            visit_reasons: session.require_str("visit_reasons")?.to_string(),
            visit_date: session.require_str("visit_date")?.to_string(),
        })
    }
}

/// 日历事件描述
pub fn summarize(patient: &Patient) -> String {
    let mut summary = format!("{}'s visit for {}.", patient.name, patient.visit_reasons);

    if let Some(prescriptions) = non_empty(&patient.prescriptions) {
        let listed: Vec<String> = prescriptions
            .iter()
            .map(|p| format!("{} ({})", p.medication, p.dosage))
            .collect();
        summary.push_str(&format!(" Patient is currently under {}.", listed.join(", ")));
    }
    if let Some(allergies) = non_empty(&patient.allergies) {
        summary.push_str(" Patient has the following allergies:\n");
        let names: Vec<&str> = allergies.iter().map(|a| a.name.as_str()).collect();
        summary.push_str(&names.join("\n"));
    }
    if let Some(conditions) = non_empty(&patient.conditions) {
        let names: Vec<&str> = conditions.iter().map(|c| c.name.as_str()).collect();
        summary.push_str(&format!(
            " Patient has a medical history with the following conditions: {}.",
            names.join(", ")
        ));
    }
    summary
}

fn non_empty<T>(items: &Option<Vec<T>>) -> Option<&[T]> {
    items.as_deref().filter(|items| !items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_patient() -> Patient {
        Patient {
            name: "John Doe".into(),
            date_of_birth: "1999-12-03".into(),
            prescriptions: None,
            allergies: None,
            conditions: None,
            visit_reasons: "back ache".into(),
            visit_date: "2024-12-22".into(),
        }
    }

    #[test]
    fn basic_summary() {
        assert_eq!(summarize(&sample_patient()), "John Doe's visit for back ache.");
    }

    #[test]
    fn summary_with_allergies() {
        let patient = Patient {
            allergies: Some(vec![Allergy {
                name: "peanut allergy".into(),
            }]),
            ..sample_patient()
        };
        assert_eq!(
            summarize(&patient),
            "John Doe's visit for back ache. Patient has the following allergies:\npeanut allergy"
        );
    }

    #[test]
    fn empty_lists_are_omitted() {
        let patient = Patient {
            prescriptions: Some(Vec::new()),
            conditions: Some(Vec::new()),
            ..sample_patient()
        };
        assert_eq!(summarize(&patient), "John Doe's visit for back ache.");
    }

    #[test]
    fn summary_lists_prescriptions_and_conditions() {
        let patient = Patient {
            prescriptions: Some(vec![Prescription {
                medication: "Doliprane".into(),
                dosage: "500mg".into(),
            }]),
            conditions: Some(vec![
                Condition { name: "asthme".into() },
                Condition { name: "diabète".into() },
            ]),
            ..sample_patient()
        };
        assert_eq!(
            summarize(&patient),
            "John Doe's visit for back ache. Patient is currently under Doliprane (500mg). \
             Patient has a medical history with the following conditions: asthme, diabète."
        );
    }

    #[test]
    fn from_session_requires_identity_and_visit() {
        let mut session = SessionState::new();
        session.insert("name", "John Doe");
        session.insert("date_of_birth", "1999-12-03");
        session.insert("visit_reasons", "back ache");
        assert!(Patient::from_session(&session).is_err());

        session.insert("visit_date", "2024-12-22");
        session.insert("allergies", json!([{ "name": "peanut allergy" }]));
        let patient = Patient::from_session(&session).unwrap();
        assert_eq!(patient.allergies.map(|a| a.len()), Some(1));
        assert_eq!(patient.prescriptions, None);
    }
}

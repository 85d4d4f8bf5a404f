//! Delegation routing: intent identifier to delegate category.

use komando_common::DelegateCategory;
use serde::{Deserialize, Serialize};

/// Display name used in the delegation notice for unrecognized intents.
pub const UNKNOWN_AGENT_NAME: &str = "Unknown Agent";

/// Known intent families, identified by a marker substring of the intent name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    MedicalRecords,
    Appointments,
    PatientManagement,
    Billing,
    /// The classifier named an intent none of the markers match.
    Unknown,
}

/// Marker table, checked in order. First match wins.
const MARKERS: [(&str, IntentKind); 4] = [
    ("rekam_medis", IntentKind::MedicalRecords),
    ("penjadwal", IntentKind::Appointments),
    ("manajemen_pasien", IntentKind::PatientManagement),
    ("penagihan", IntentKind::Billing),
];

impl IntentKind {
    pub fn from_identifier(identifier: &str) -> Self {
        MARKERS
            .iter()
            .find(|(marker, _)| identifier.contains(marker))
            .map(|(_, kind)| *kind)
            .unwrap_or(IntentKind::Unknown)
    }

    /// Target category. `Unknown` falls back to the coordinator.
    pub fn category(&self) -> DelegateCategory {
        match self {
            Self::MedicalRecords => DelegateCategory::MedicalRecords,
            Self::Appointments => DelegateCategory::Appointments,
            Self::PatientManagement => DelegateCategory::PatientManagement,
            Self::Billing => DelegateCategory::Billing,
            Self::Unknown => DelegateCategory::Coordinator,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unknown => UNKNOWN_AGENT_NAME,
            known => known.category().display_name(),
        }
    }
}

/// Resolve an intent identifier to its delegate category. Total: never fails.
pub fn route(identifier: &str) -> DelegateCategory {
    IntentKind::from_identifier(identifier).category()
}

/// The outcome of routing one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub identifier: String,
    pub kind: IntentKind,
    pub category: DelegateCategory,
}

impl RouteDecision {
    pub fn resolve(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let kind = IntentKind::from_identifier(&identifier);
        Self {
            identifier,
            kind,
            category: kind.category(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == IntentKind::Unknown
    }

    /// Name announced in the delegation notice.
    pub fn display_name(&self) -> &'static str {
        self.kind.display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_each_marker() {
        assert_eq!(route("panggil_sub_agen_rekam_medis"), DelegateCategory::MedicalRecords);
        assert_eq!(route("panggil_sub_agen_penjadwal"), DelegateCategory::Appointments);
        assert_eq!(
            route("panggil_sub_agen_manajemen_pasien"),
            DelegateCategory::PatientManagement
        );
        assert_eq!(route("panggil_sub_agen_penagihan"), DelegateCategory::Billing);
    }

    #[test]
    fn markers_match_anywhere_in_identifier() {
        assert_eq!(route("rekam_medis"), DelegateCategory::MedicalRecords);
        assert_eq!(route("x_penjadwal_v2"), DelegateCategory::Appointments);
        assert_eq!(route("penagihan_asuransi"), DelegateCategory::Billing);
    }

    #[test]
    fn first_marker_wins() {
        // Contains both the medical-records and billing markers.
        assert_eq!(route("penagihan_rekam_medis"), DelegateCategory::MedicalRecords);
    }

    #[test]
    fn unmatched_identifiers_fall_back_to_coordinator() {
        for identifier in ["", "panggil_sub_agen_farmasi", "REKAM_MEDIS", "lookup_weather"] {
            assert_eq!(route(identifier), DelegateCategory::Coordinator, "{identifier}");
        }
    }

    #[test]
    fn decision_keeps_unknown_distinguishable() {
        let unknown = RouteDecision::resolve("panggil_sub_agen_farmasi");
        assert!(unknown.is_unknown());
        assert_eq!(unknown.category, DelegateCategory::Coordinator);
        assert_eq!(unknown.display_name(), UNKNOWN_AGENT_NAME);

        let known = RouteDecision::resolve("panggil_sub_agen_penagihan");
        assert!(!known.is_unknown());
        assert_eq!(known.display_name(), "Sub-agen Keuangan");
    }
}

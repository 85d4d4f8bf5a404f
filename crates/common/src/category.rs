//! Delegate categories a conversation turn can be attributed to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of speakers the coordinator can hand a request to.
///
/// `Coordinator` is both the initial active category of a conversation and
/// the fallback for intents that do not map to any sub-agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelegateCategory {
    #[default]
    Coordinator,
    MedicalRecords,
    Appointments,
    PatientManagement,
    Billing,
}

impl DelegateCategory {
    /// All categories in sidebar order.
    pub const ALL: [DelegateCategory; 5] = [
        DelegateCategory::Coordinator,
        DelegateCategory::MedicalRecords,
        DelegateCategory::Appointments,
        DelegateCategory::PatientManagement,
        DelegateCategory::Billing,
    ];

    /// The four sub-agent categories (everything except `Coordinator`).
    pub const DELEGATES: [DelegateCategory; 4] = [
        DelegateCategory::MedicalRecords,
        DelegateCategory::Appointments,
        DelegateCategory::PatientManagement,
        DelegateCategory::Billing,
    ];

    /// Human-readable name shown in delegation notices and the sidebar.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Coordinator => "Koordinator Pusat",
            Self::MedicalRecords => "Sub-agen Rekam Medis",
            Self::Appointments => "Sub-agen Penjadwal",
            Self::PatientManagement => "Sub-agen Pasien",
            Self::Billing => "Sub-agen Keuangan",
        }
    }

    pub fn is_delegate(&self) -> bool {
        !matches!(self, Self::Coordinator)
    }
}

impl fmt::Display for DelegateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Coordinator => "coordinator",
            Self::MedicalRecords => "medical_records",
            Self::Appointments => "appointments",
            Self::PatientManagement => "patient_management",
            Self::Billing => "billing",
        };
        f.write_str(tag)
    }
}

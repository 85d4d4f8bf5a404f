//! Specialist sub-agents for the hospital command center.
//!
//! Each sub-agent answers for one [`DelegateCategory`](komando_common::DelegateCategory):
//!
//! - **Medical Records**: clinical history, lab results, diagnoses
//! - **Appointments**: booking and rescheduling doctor visits
//! - **Patient Management**: registration and identity data
//! - **Billing**: costs, claims and insurance coverage
//!
//! The bundled agents return canned responses; real subsystems replace them
//! by registering their own [`SubAgent`](komando_common::SubAgent) with the
//! [`SubAgentExecutor`].
//!
//! ```text
//!                ┌──────────────────┐
//!                │ SubAgentExecutor │  ◄── latency, fallback
//!                └────────┬─────────┘
//!    ┌───────────┬────────┴──┬─────────────┐
//!    ▼           ▼           ▼             ▼
//! [Records] [Appointments] [Patients]  [Billing]
//! ```

pub mod appointments;
pub mod billing;
pub mod executor;
pub mod medical_records;
pub mod patient_management;

pub use appointments::AppointmentsAgent;
pub use billing::BillingAgent;
pub use executor::{ExecutorConfig, SubAgentExecutor, UNRECOGNIZED_DELEGATE_RESPONSE};
pub use medical_records::MedicalRecordsAgent;
pub use patient_management::PatientManagementAgent;

/// Echoed when the classifier did not forward the user's request.
pub const NO_REQUEST_PROVIDED: &str = "No request provided";

//! Appointment scheduling agent.

use async_trait::async_trait;
use komando_common::message::request_text;
use komando_common::{DelegateCategory, DelegationResult, IntentArgument, SubAgent};
use tracing::info;

use crate::NO_REQUEST_PROVIDED;

/// Creates, changes or cancels doctor appointments.
#[derive(Debug, Default)]
pub struct AppointmentsAgent;

impl AppointmentsAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubAgent for AppointmentsAgent {
    fn category(&self) -> DelegateCategory {
        DelegateCategory::Appointments
    }

    async fn handle(&self, argument: &IntentArgument) -> DelegationResult {
        let request = request_text(argument).unwrap_or(NO_REQUEST_PROVIDED);
        info!(agent = %self.category(), "Checking doctor availability");

        DelegationResult::new(
            self.category(),
            format!(
                "**[Sistem Penjadwalan Terpadu]**\n\n\
                 Memproses permintaan jadwal: _\"{request}\"_\n\n\
                 Saya telah memeriksa ketersediaan dokter terkait.\n\n\
                 **Opsi Tersedia:**\n\
                 1. dr. Siti Aminah, Sp.PD - Senin, 09:00 WIB\n\
                 2. dr. Budi Gunawan, Sp.P - Selasa, 14:00 WIB\n\n\
                 Silakan konfirmasi pilihan Anda untuk mengunci slot waktu."
            ),
        )
    }
}

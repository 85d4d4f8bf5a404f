//! Billing and insurance agent.

use async_trait::async_trait;
use komando_common::message::request_text;
use komando_common::{DelegateCategory, DelegationResult, IntentArgument, SubAgent};
use tracing::info;

use crate::NO_REQUEST_PROVIDED;

/// Answers cost, claim and BPJS coverage questions.
#[derive(Debug, Default)]
pub struct BillingAgent;

impl BillingAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubAgent for BillingAgent {
    fn category(&self) -> DelegateCategory {
        DelegateCategory::Billing
    }

    async fn handle(&self, argument: &IntentArgument) -> DelegationResult {
        let request = request_text(argument).unwrap_or(NO_REQUEST_PROVIDED);
        info!(agent = %self.category(), "Estimating costs");

        DelegationResult::new(
            self.category(),
            format!(
                "**[Layanan Keuangan & Asuransi]**\n\n\
                 Analisis biaya untuk: _\"{request}\"_\n\n\
                 Status Asuransi: **BPJS Kesehatan Aktif** (Kelas 1).\n\n\
                 Estimasi biaya untuk tindakan yang disebutkan ditanggung sepenuhnya oleh BPJS \
                 sesuai prosedur rujukan berjenjang. Tidak ada biaya *out-of-pocket* yang \
                 diproyeksikan saat ini."
            ),
        )
    }
}

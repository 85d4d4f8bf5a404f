//! Patient administration agent - registration, identity, general info.

use async_trait::async_trait;
use komando_common::message::request_text;
use komando_common::{DelegateCategory, DelegationResult, IntentArgument, SubAgent};
use tracing::info;

use crate::NO_REQUEST_PROVIDED;

#[derive(Debug, Default)]
pub struct PatientManagementAgent;

impl PatientManagementAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubAgent for PatientManagementAgent {
    fn category(&self) -> DelegateCategory {
        DelegateCategory::PatientManagement
    }

    async fn handle(&self, argument: &IntentArgument) -> DelegationResult {
        let request = request_text(argument).unwrap_or(NO_REQUEST_PROVIDED);
        info!(agent = %self.category(), "Looking up patient registry");

        DelegationResult::new(
            self.category(),
            format!(
                "**[Administrasi Pasien]**\n\n\
                 Menerima kueri: _\"{request}\"_\n\n\
                 Data pasien telah ditemukan di database pusat. Status keanggotaan aktif. \
                 Tidak ada perubahan data demografis yang tertunda. Jika Anda ingin memperbarui \
                 alamat atau nomor telepon, silakan unggah dokumen pendukung."
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_request_uses_placeholder() {
        let result = PatientManagementAgent::new()
            .handle(&IntentArgument::new())
            .await;

        assert_eq!(result.category, DelegateCategory::PatientManagement);
        assert!(result.text.contains(NO_REQUEST_PROVIDED));
    }
}

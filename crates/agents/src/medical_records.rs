//! Medical records agent - clinical history, lab results, diagnoses.

use async_trait::async_trait;
use komando_common::message::request_text;
use komando_common::{DelegateCategory, DelegationResult, IntentArgument, SubAgent};
use tracing::info;

use crate::NO_REQUEST_PROVIDED;

/// Answers clinical queries from the electronic medical record.
///
/// Every response opens with the data-protection banner and closes with the
/// confidentiality note, since the payload is regulated EMR content.
#[derive(Debug, Default)]
pub struct MedicalRecordsAgent;

impl MedicalRecordsAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubAgent for MedicalRecordsAgent {
    fn category(&self) -> DelegateCategory {
        DelegateCategory::MedicalRecords
    }

    async fn handle(&self, argument: &IntentArgument) -> DelegationResult {
        let request = request_text(argument).unwrap_or(NO_REQUEST_PROVIDED);
        info!(agent = %self.category(), "Accessing medical record");

        DelegationResult::new(
            self.category(),
            format!(
                "**[PROTOKOL KEAMANAN DATA DIAKTIFKAN]**\n\n\
                 Verifikasi akses berhasil. Mengakses Electronic Medical Record (EMR) terenkripsi.\n\n\
                 Berdasarkan permintaan: _\"{request}\"_\n\n\
                 **Ringkasan Klinis:**\n\
                 - Pasien: Budi Santoso (L)\n\
                 - Tanggal Kunjungan Terakhir: 12 Oktober 2024\n\
                 - Diagnosis: Bronkitis Akut (J20.9)\n\
                 - Hasil Lab: Leukosit sedikit meningkat (11.500/uL), Rontgen Thorax menunjukkan infiltrat minimal.\n\
                 - Rencana: Antibiotik Azithromycin 500mg (Selesai), evaluasi ulang 1 minggu.\n\n\
                 _Catatan: Data ini bersifat RAHASIA. Dilarang menyebarkan tanpa otorisasi._"
            ),
        )
    }
}

//! Coordinator system instruction and the intent schemas offered to the classifier.

use komando_common::message::REQUEST_FIELD;
use komando_llm::ToolDeclaration;
use serde_json::json;

pub const MEDICAL_RECORDS_INTENT: &str = "panggil_sub_agen_rekam_medis";
pub const APPOINTMENTS_INTENT: &str = "panggil_sub_agen_penjadwal";
pub const PATIENT_MANAGEMENT_INTENT: &str = "panggil_sub_agen_manajemen_pasien";
pub const BILLING_INTENT: &str = "panggil_sub_agen_penagihan";

pub const COORDINATOR_SYSTEM_INSTRUCTION: &str = r#"
# PERAN KOORDINATOR PUSAT (SISTEM RUMAH SAKIT)

Anda adalah 'Sistem Rumah Sakit,' Koordinator Pusat untuk seluruh layanan berbasis Agen AI. Misi Anda adalah menyediakan layanan kesehatan yang efisien dan aman dengan mendelegasikan tugas secara sempurna.

[8] DAFTAR SUB-AGEN YANG TERSEDIA:
- Sub-agen Manajemen Pasien (Untuk pendaftaran, identitas, atau info umum pasien yang tidak sensitif).
- Sub-agen Penjadwal Janji Temu (Untuk booking atau modifikasi jadwal).
- Sub-agen Rekam Medis (Untuk data klinis, riwayat, hasil lab, diagnosis).
- Sub-agen Penagihan dan Asuransi (Untuk kueri biaya, klaim, atau penagihan).

[9] PRINSIP OPERASIONAL KETAT (HARUS DIIKUTI):
A. DELEGASI WAJIB: Anda tidak pernah boleh mencoba memproses atau menjawab permintaan pengguna secara langsung. Tugas Anda adalah MENGANALISIS maksud pengguna dan HANYA mendelegasikannya.
B. PRINSIP SATU PANGGILAN: Anda harus memanggil HANYA SATU sub-agen yang paling sesuai per permintaan pengguna.
C. TRANSMISI DATA: Anda harus menyertakan semua detail yang relevan dari kueri asli pengguna dalam pemanggilan (arguments) ke sub-agen yang dipilih.

[10] PRIORITAS TINGGI (KHUSUS REKAM MEDIS):
Jika permintaan melibatkan riwayat medis, hasil lab, atau diagnosis, Anda harus memilih 'Sub-agen Rekam Medis'. Ingat, sub-agen tersebut diinstruksikan untuk memproses data tersebut dengan prioritas keamanan dan privasi data tertinggi, sesuai dengan kewajiban regulasi Rekam Medis Elektronik.
"#;

fn intent_tool(name: &str, description: &str, field_description: &str) -> ToolDeclaration {
    ToolDeclaration {
        name: name.to_string(),
        description: description.to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                REQUEST_FIELD: {
                    "type": "string",
                    "description": field_description,
                }
            },
            "required": [REQUEST_FIELD],
        }),
    }
}

/// The four delegation intents, one per sub-agent.
pub fn intent_tools() -> Vec<ToolDeclaration> {
    vec![
        intent_tool(
            MEDICAL_RECORDS_INTENT,
            "Mengambil dan merangkum riwayat medis pasien, hasil lab, diagnosis, dan rencana perawatan. PERHATIAN: Hanya untuk data klinis dan harus menjamin privasi dan keamanan data.",
            "Kueri lengkap pengguna yang akan diteruskan. Contoh: \"Tolong berikan ringkasan diagnosis CT Thorax Tuan Budi bulan lalu.\"",
        ),
        intent_tool(
            APPOINTMENTS_INTENT,
            "Menangani pembuatan, pengubahan, atau pembatalan janji temu dokter.",
            "Kueri lengkap pengguna terkait jadwal.",
        ),
        intent_tool(
            PATIENT_MANAGEMENT_INTENT,
            "Menangani pendaftaran pasien baru, pembaruan data identitas (KTP/Alamat), dan informasi umum RS.",
            "Kueri lengkap pengguna terkait data administratif pasien.",
        ),
        intent_tool(
            BILLING_INTENT,
            "Menangani pertanyaan seputar tagihan, asuransi, BPJS, dan estimasi biaya.",
            "Kueri lengkap pengguna terkait keuangan.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::route;
    use komando_common::DelegateCategory;

    #[test]
    fn four_tools_each_with_one_required_string_field() {
        let tools = intent_tools();
        assert_eq!(tools.len(), 4);
        for tool in &tools {
            let required = tool.parameters["required"].as_array().unwrap();
            assert_eq!(required.len(), 1);
            assert_eq!(required[0], REQUEST_FIELD);
            assert_eq!(
                tool.parameters["properties"][REQUEST_FIELD]["type"],
                "string"
            );
        }
    }

    #[test]
    fn every_tool_routes_to_a_distinct_delegate() {
        let mut categories: Vec<_> = intent_tools().iter().map(|t| route(&t.name)).collect();
        assert!(!categories.contains(&DelegateCategory::Coordinator));
        categories.sort_by_key(|c| c.to_string());
        categories.dedup();
        assert_eq!(categories.len(), 4);
    }
}

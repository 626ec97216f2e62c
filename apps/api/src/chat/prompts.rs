// All prompt constants for the chat orchestrator. The response language
// is a fixed product policy, not user-configurable per turn.

use crate::session::truncate_chars;

/// Max characters of an uploaded CV carried into the prompt.
pub const CV_EXCERPT_CHARS: usize = 2000;

/// Fixed operating instructions for every orchestration run.
pub const SYSTEM_PROMPT: &str = "Anda adalah **AI ResuMind**, asisten yang sangat fokus \
    pada analisis dan perbandingan data karier, CV, dan kriteria posisi pekerjaan. \
    Anda memiliki satu-satunya tool eksternal yang tersedia: **'get_relevant_docs'**.\
    \n\n**ATURAN PENGGUNAAN TOOL:**\
    \n1. **WAJIB PANGGIL TOOL** jika pertanyaan secara eksplisit terkait: **Analisis CV**, \
    **Perbandingan Kandidat**, **Kriteria Posisi/Role**, **Mencari Kandidat Relevan**, \
    atau **segala yang terkait dengan kepentingan pekerjaan seorang Recruiter**.\
    \n\n**EKSTRAKSI KATEGORI:** Sebelum memanggil 'get_relevant_docs', **WAJIB** analisis \
    pertanyaan pengguna dan ekstrak kategori/industri utama (contoh: 'HR', 'IT', 'SALES'). \
    Panggil tool dengan argumen `category_filter` yang sesuai. Jika kategori tidak \
    teridentifikasi, set `category_filter` ke `NONE`.\
    \n\n**OUTPUT:** Jawablah semua pertanyaan, termasuk ringkasan dan kesimpulan, \
    **HANYA dalam Bahasa Indonesia**.";

/// Human-turn template when a CV was uploaded.
/// Replace `{cv_excerpt}` and `{query}` before sending.
const UPLOADED_CV_TEMPLATE: &str = "Telah diunggah CV kandidat berikut:
--- CV KANDIDAT ---
{cv_excerpt}
--- AKHIR CV ---

Pertanyaan Anda: {query}
Gunakan tool 'get_relevant_docs' dengan ringkasan CV ini sebagai input, untuk mencari \
kandidat pembanding di database.";

/// Builds the human turn: the query verbatim, or the uploaded-CV template
/// wrapping a truncated excerpt when a document is attached.
pub fn build_user_message(query: &str, uploaded_text: Option<&str>) -> String {
    match uploaded_text {
        Some(text) => UPLOADED_CV_TEMPLATE
            .replace("{cv_excerpt}", &truncate_chars(text, CV_EXCERPT_CHARS))
            .replace("{query}", query),
        None => query.to_string(),
    }
}

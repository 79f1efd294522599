use course_rag::Language;

/// Fixed texts shown by the shell.
#[derive(Debug, Clone, Copy)]
pub struct UiStrings {
    pub title: &'static str,
    pub starting: &'static str,
    pub ready: &'static str,
    pub setup_failed: &'static str,
    pub thinking: &'static str,
    pub prompt: &'static str,
    pub goodbye: &'static str,
}

impl UiStrings {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::English => Self {
                title: "Course Assistant",
                starting: "Starting the assistant... Loading course notes...",
                ready: "Assistant ready. Ask your questions.",
                setup_failed: "Error: the assistant could not start. Check the 'docs' folder or your API key.",
                thinking: "Thinking...",
                prompt: "Type your question > ",
                goodbye: "Goodbye.",
            },
            Language::Turkish => Self {
                title: "Ders Asistanı",
                starting: "Asistan başlatılıyor... Ders notları yükleniyor...",
                ready: "Asistan hazır. Sorularınızı sorabilirsiniz.",
                setup_failed: "Hata: Asistan başlatılamadı. 'docs' klasörünü veya API anahtarınızı kontrol edin.",
                thinking: "Düşünüyor...",
                prompt: "Sorunuzu buraya yazın > ",
                goodbye: "Görüşmek üzere.",
            },
        }
    }
}

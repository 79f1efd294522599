use crate::config::Language;

pub fn query_transform_prompt(language: Language, question: &str) -> String {
    match language {
        Language::English => format!(
            r#"A user asked a chat question. Rewrite it as the best possible optimized keyword query for searching a vector database.
Return only the optimized query.

Original question: {question}
Optimized query:"#
        ),
        Language::Turkish => format!(
            r#"Bir kullanıcı sohbet sorusu sordu. Bu soruyu bir vektör veritabanında aramak için en uygun, optimize edilmiş anahtar kelime sorgusuna dönüştür.
Sadece optimize edilmiş sorguyu döndür.

Orijinal soru: {question}
Optimize edilmiş sorgu:"#
        ),
    }
}

pub fn answer_prompt(language: Language, context: &str, question: &str) -> String {
    let not_found = not_in_notes(language);
    match language {
        Language::English => format!(
            r#"You are a university course assistant.
Answer the 'Question' using only the information in the 'Context' below.
NEVER make up information that is not in the context.
If the context does not contain the answer, say: "{not_found}"

Context:
{context}

Question:
{question}

Answer:"#
        ),
        Language::Turkish => format!(
            r#"Sen bir üniversite ders asistanısın.
Aşağıdaki 'Bağlam' içindeki bilgilere dayanarak 'Soru'yu cevapla.
Bağlamda olmayan bilgiyi ASLA uydurma.
Bağlamda yoksa: "{not_found}" de.

Bağlam:
{context}

Soru:
{question}

Cevap:"#
        ),
    }
}

pub fn not_in_notes(language: Language) -> &'static str {
    match language {
        Language::English => "This information is not in my course notes.",
        Language::Turkish => "Bu bilgi elimdeki ders notlarında bulunmuyor.",
    }
}

/// Returned for any per-question failure.
pub fn fallback_answer(language: Language) -> &'static str {
    match language {
        Language::English => "Sorry, an error occurred.",
        Language::Turkish => "Bir hata oluştu.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_prompt_embeds_the_question_last() {
        let prompt = query_transform_prompt(Language::English, "how does quicksort pick a pivot?");
        assert!(prompt.contains("Original question: how does quicksort pick a pivot?"));
        assert!(prompt.trim_end().ends_with("Optimized query:"));
    }

    #[test]
    fn answer_prompt_fills_both_slots_and_the_refusal() {
        for language in [Language::English, Language::Turkish] {
            let prompt = answer_prompt(language, "CTX-BLOCK", "QUESTION-TEXT");
            assert!(prompt.contains("CTX-BLOCK"));
            assert!(prompt.contains("QUESTION-TEXT"));
            assert!(prompt.contains(not_in_notes(language)));
            assert!(prompt.find("CTX-BLOCK") < prompt.find("QUESTION-TEXT"));
        }
    }
}

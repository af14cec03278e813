use super::types::{ChatMessage, Profile};
use super::vitals::NormalizedVitals;

pub const TRIAGE_SYSTEM_PROMPT: &str = "Ты — медицинский ассистент по ТРИАЖУ. \
На основе жалоб, анамнеза и виталий выдай СТРОГО валидный JSON \
с ключами: priority, reason, hint_for_doctor, profile, confidence, red_flags, sources. \
Только приоритет и причины, без диагнозов.
Правила приоритета:
- 'критично срочно': угроза жизни/тяжёлые red flags (нарушение дыхания, SpO2<94%, \
боль за грудиной >10 мин, неврол. дефицит, гипотензия <90, сознание <15, и т.д.).
- 'срочно': потенциально опасно, но без немедленных red flags.
- 'планово': стабильное состояние, без красных флагов.
Отсутствующие витальные показатели НЕ повышают приоритет — только понижают confidence.";

const RESPONSE_EXAMPLE: &str = r#"{
  "priority": "критично срочно",
  "reason": "…",
  "hint_for_doctor": "…",
  "profile": "therapy",
  "confidence": 0.85,
  "red_flags": ["…","…"],
  "sources": [ { "id": "doc_cardio_01", "section": "1", "version_date": "2025-05-12" } ]
}"#;

/// System message: fixed rules plus the closed profile list.
pub fn build_system_prompt() -> String {
    let profiles: Vec<&str> = Profile::ALL.iter().map(|p| p.as_str()).collect();
    format!(
        "{TRIAGE_SYSTEM_PROMPT}\nПоле 'profile' выбери из: {}.",
        profiles.join(", ")
    )
}

/// User message for one patient. Inputs must already be sanitized.
pub fn build_user_prompt(complaint: &str, history: &str, vitals: &NormalizedVitals) -> String {
    let structured = serde_json::to_string(vitals).unwrap_or_else(|_| "{}".to_string());
    format!(
        "INPUT:\n\
         complaint: {complaint}\n\
         history: {history}\n\
         vitals: {summary}\n\
         vitals_structured: {structured}\n\n\
         ОТВЕТЬ В JSON (без лишнего текста), пример структуры:\n\
         {RESPONSE_EXAMPLE}\n\
         Если не уверена — понижай confidence, но JSON-схему не нарушай.",
        summary = vitals.summary(),
    )
}

/// Full conversation sent to the completion provider.
pub fn build_triage_messages(
    complaint: &str,
    history: &str,
    vitals: &NormalizedVitals,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(build_system_prompt()),
        ChatMessage::user(build_user_prompt(complaint, history, vitals)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chest_pain_vitals() -> NormalizedVitals {
        NormalizedVitals {
            bp_systolic: Some(180),
            bp_diastolic: Some(110),
            heart_rate: Some(110),
            spo2: Some(92),
            ..Default::default()
        }
    }

    #[test]
    fn system_prompt_lists_all_profiles() {
        let system = build_system_prompt();
        for p in Profile::ALL {
            assert!(system.contains(p.as_str()), "missing profile {}", p.as_str());
        }
        assert!(system.contains("'критично срочно'"));
    }

    #[test]
    fn user_prompt_contains_inputs_and_summary() {
        let prompt = build_user_prompt(
            "боль в груди 20 минут, холодный пот",
            "гипертония",
            &chest_pain_vitals(),
        );
        assert!(prompt.contains("complaint: боль в груди 20 минут, холодный пот"));
        assert!(prompt.contains("history: гипертония"));
        assert!(prompt.contains("vitals: АД: 180/110; ЧСС: 110; SpO₂: 92%"));
        assert!(prompt.contains("\"bp_systolic\":180"));
        assert!(prompt.contains("\"doc_cardio_01\""));
    }

    #[test]
    fn user_prompt_without_vitals_uses_placeholder() {
        let prompt = build_user_prompt("кашель", "", &NormalizedVitals::default());
        assert!(prompt.contains("vitals: не указаны"));
    }

    #[test]
    fn messages_are_system_then_user() {
        let messages = build_triage_messages("кашель", "", &NormalizedVitals::default());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }
}

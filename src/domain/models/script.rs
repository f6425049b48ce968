//! Fixed dialogue script: question banks and canned phrases per tone.

use super::condition::Tone;

const INFORMAL_QUESTIONS: [&str; 15] = [
    "최근에 본 영화 중에 제일 기억에 남는 장면이 어떤 거야?",
    "영화를 다른 사람에게 추천한다면 어떤 점을 강조하고 싶어?",
    "영화 볼 때 팝콘 말고 즐겨 먹는 간식이 있어? 있다면 어떤 거야?",
    "드라마에 나오는 악당 중에 제일 인상 깊었던 사람은 누구야?",
    "코미디 영화랑 액션 영화 중에 어떤 거 더 좋아해?",
    "영화관에서 어디 자리에 앉는 거 제일 좋아해?",
    "집에서 혼자 영화 보는 거랑 다른 사람들이랑 같이 보는 거 중에 뭐가 더 좋아?",
    "영화 볼 때 제일 집중 안 됐던 적이 언제야? (예: 광고 할 때, 옆 사람 시끄러울 때)",
    "가장 기억에 남는 영화 속 캐릭터의 특징이 뭐야?",
    "영화나 드라마 결말이 완전 예상 밖으로 가면 기분 어때?",
    "만약에 영화 주인공이 될 수 있다면 어떤 영화 주인공을 해보고 싶어?",
    "영화 보다가 너무 현실이랑 다르다고 느낀 내용은 어떤 내용이야?",
    "영화 주인공처럼 특별한 능력 하나 가질 수 있다면 어떤 능력 갖고 싶어?",
    "드라마를 통해 새로운 사실이나 정보를 알게 된 적 있어? 있다면 어떤 내용이야?",
    "영화 시작 전에 광고 너무 길게 하는 거 어떻게 생각해?",
];

const FORMAL_QUESTIONS: [&str; 15] = [
    "최근에 감상하신 영화 중에서 가장 인상 깊었던 장면은 무엇이었나요?",
    "가장 기억에 남는 영화 속 캐릭터의 특징은 무엇이었나요?",
    "영화 관람 시 팝콘 외에 즐겨 드시는 간식이 있으신가요? 있다면 무엇인가요?",
    "드라마에 등장하는 악역 중에서 가장 인상 깊었던 인물은 누구인가요?",
    "코미디 영화와 액션 영화 중 어떤 장르를 더 선호하시나요?",
    "영화관에서 가장 선호하시는 좌석 위치는 어디인가요?",
    "집에서 혼자 영화를 시청하는 것과 다른 사람들과 함께 보는 것 중 어느 쪽을 더 좋아하시나요?",
    "영화를 보실 때 가장 집중하기 어려웠던 순간은 언제였나요? (예: 광고 상영 시, 주변 관람객의 소음)",
    "영화를 다른 사람에게 추천하신다면 어떤 점을 강조하고 싶으신가요?",
    "영화나 드라마의 결말이 예상치 못한 방향으로 흘러간다면 어떤 느낌이 드시나요?",
    "만약 영화 속 주인공이 될 수 있다면 어떤 영화의 주인공 역할을 해보고 싶으신가요?",
    "영화를 보시다가 비현실적이라고 느껴진 내용은 어떤 내용이었나요?",
    "영화 주인공과 같은 특별한 능력을 하나 가질 수 있다면 어떤 능력을 갖고 싶으신가요?",
    "드라마를 통해 새로운 사실이나 정보를 알게 되신 적이 있으신가요? 있다면 어떤 내용이었나요?",
    "영화 시작 전 광고가 너무 길게 상영되는 것에 대해 어떻게 생각하시나요?",
];

/// Words that mark a greeting on the opening turn.
pub const GREETING_MARKERS: [&str; 2] = ["안녕", "안녕하세요"];

pub const EMPTY_INPUT_WARNING: &str = "내용을 입력해 주세요.";
pub const LOGGING_FAILED_WARNING: &str = "대화 기록 저장 중 오류 발생. 대화는 계속됩니다.";
pub const LAST_TURN_WARNING: &str = "대화 횟수가 1회 남았습니다.";
pub const COMPLETED_NOTICE: &str = "대화가 완료되었습니다. 설문으로 이동해주세요.";
pub const INSTRUCTIONS: &str = "챗봇의 질문에만 해당하는 내용으로 답변해 주세요. 챗봇에게 질문하거나 단답으로 응답하는 것은 삼가주시기 바랍니다.";

/// Rejection shown for input over the configured length limit.
pub fn input_too_long_warning(max_chars: usize) -> String {
    format!("입력은 {max_chars}자 이하로 해주세요.")
}

pub fn input_placeholder(max_chars: usize) -> String {
    format!("영화나 드라마에 대해 이야기해 주세요. (최대 {max_chars}자)")
}

/// The question bank for one tone.
pub fn questions(tone: Tone) -> Vec<String> {
    let bank: &[&str] = match tone {
        Tone::Informal => &INFORMAL_QUESTIONS,
        Tone::Formal => &FORMAL_QUESTIONS,
    };
    bank.iter().map(|q| (*q).to_string()).collect()
}

pub fn greeting(tone: Tone) -> &'static str {
    match tone {
        Tone::Informal => "안녕! 영화나 드라마 얘기 좀 해보자.",
        Tone::Formal => "안녕하세요! 영화나 드라마에 대해 이야기해 볼까요?",
    }
}

/// Sentence connective placed between the mirrored sentence and the next question.
pub fn connective(tone: Tone) -> &'static str {
    match tone {
        Tone::Informal => " 그러면 ",
        Tone::Formal => " 그렇다면 ",
    }
}

/// Neutral acknowledgement used when no mirrored sentence is available.
pub fn fallback_acknowledgement(tone: Tone) -> &'static str {
    match tone {
        Tone::Informal => "그렇구나",
        Tone::Formal => "그렇군요",
    }
}

pub fn is_greeting(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    GREETING_MARKERS.iter().any(|g| normalized.contains(g))
}

/// Whether a generated sentence stays in the session's speech level.
pub fn is_consistent_tone(sentence: &str, tone: Tone) -> bool {
    const FORMAL_ENDINGS: [&str; 3] = ["군요", "네요", "셨어요"];
    const INFORMAL_ENDINGS: [&str; 4] = ["구나", "네", "았어", "었어"];

    let body = sentence.trim_end_matches(|c: char| c.is_whitespace() || ".!?~…".contains(c));
    let forbidden: &[&str] = match tone {
        Tone::Formal => &INFORMAL_ENDINGS,
        Tone::Informal => &FORMAL_ENDINGS,
    };
    forbidden.iter().all(|ending| !body.ends_with(ending))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banks_have_fifteen_distinct_questions() {
        for tone in [Tone::Informal, Tone::Formal] {
            let mut bank = questions(tone);
            assert_eq!(bank.len(), 15);
            bank.sort();
            bank.dedup();
            assert_eq!(bank.len(), 15);
        }
    }

    #[test]
    fn test_length_messages_follow_the_limit() {
        assert_eq!(input_too_long_warning(100), "입력은 100자 이하로 해주세요.");
        assert_eq!(input_too_long_warning(50), "입력은 50자 이하로 해주세요.");
        assert!(input_placeholder(80).ends_with("(최대 80자)"));
    }

    #[test]
    fn test_greeting_detection() {
        assert!(is_greeting("안녕"));
        assert!(is_greeting("  안녕하세요!! "));
        assert!(!is_greeting("영화 좋아해"));
    }

    #[test]
    fn test_tone_consistency_ignores_trailing_punctuation() {
        assert!(is_consistent_tone("정말 재미있으셨군요.", Tone::Formal));
        assert!(!is_consistent_tone("정말 재미있었구나!", Tone::Formal));
        assert!(is_consistent_tone("정말 재미있었구나!", Tone::Informal));
        assert!(!is_consistent_tone("그 장면이 인상 깊으셨네요.", Tone::Informal));
    }

    #[test]
    fn test_connectives_differ_by_tone() {
        assert_eq!(connective(Tone::Formal), " 그렇다면 ");
        assert_eq!(connective(Tone::Informal), " 그러면 ");
    }
}

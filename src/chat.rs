//! Rule-based shop assistant.
//!
//! Keyword matching over a fixed bilingual table (English and Arabic). The
//! reply language follows the script of the question. The one dynamic intent
//! looks up the signed-in actor's next appointment.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::catalog::{self, HOURS, LOCATION};
use crate::lifecycle::{AppointmentManager, LifecycleError};
use crate::roles::Actor;
use crate::store::RecordStore;

static ARABIC_SCRIPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\x{0600}-\x{06FF}]").unwrap());

const NEXT_APPOINTMENT_TRIGGERS: &[&str] = &["موعدي", "appointment", "next"];

const ARABIC_MONTHS: [&str; 12] = [
    "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يوليو", "أغسطس", "سبتمبر", "أكتوبر",
    "نوفمبر", "ديسمبر",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Arabic,
}

pub fn detect_language(text: &str) -> Language {
    if ARABIC_SCRIPT.is_match(text) {
        Language::Arabic
    } else {
        Language::English
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatIntent {
    Welcome,
    NextAppointment,
    Booking,
    Prices,
    Hours,
    Location,
    Help,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub intent: ChatIntent,
    pub language: Language,
    pub text: String,
}

struct KnowledgeEntry {
    intent: ChatIntent,
    keywords: &'static [&'static str],
}

const KNOWLEDGE_BASE: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        intent: ChatIntent::Booking,
        keywords: &["حجز", "موعد", "book", "appointment", "reserve", "احجز"],
    },
    KnowledgeEntry {
        intent: ChatIntent::Prices,
        keywords: &["سعر", "اسعار", "price", "cost", "how much", "بكم"],
    },
    KnowledgeEntry {
        intent: ChatIntent::Hours,
        keywords: &["وقت", "ساعة", "مفتوح", "متى", "hours", "time", "open", "schedule", "اي ساعة"],
    },
    KnowledgeEntry {
        intent: ChatIntent::Location,
        keywords: &[
            "مكان", "عنوان", "فرع", "دمشق", "سوريا", "location", "address", "damascus", "syria", "وين",
        ],
    },
    KnowledgeEntry {
        intent: ChatIntent::Help,
        keywords: &["مساعدة", "بوت", "help", "assistant"],
    },
];

fn canned_reply(intent: ChatIntent, language: Language) -> String {
    use Language::*;
    match (intent, language) {
        (ChatIntent::Booking, English) => "You can book an appointment easily from your Dashboard! Just log in and select your preferred service, date, and time.".to_string(),
        (ChatIntent::Booking, Arabic) => "يمكنك حجز موعد بسهولة من لوحة التحكم (Dashboard)! فقط قم بتسجيل الدخول واختر الخدمة والتاريخ والوقت المفضل لديك.".to_string(),
        (ChatIntent::Prices, English) => format!(
            "Our services include: {}. Check our Services page for full details!",
            catalog::price_list(", ")
        ),
        (ChatIntent::Prices, Arabic) => format!(
            "خدماتنا تشمل: {}. يمكنك مراجعة صفحة الخدمات للتفاصيل!",
            catalog::price_list("، ")
        ),
        (ChatIntent::Hours, English) => format!(
            "We are open: {}, {}, and {}.",
            HOURS.weekdays, HOURS.saturday, HOURS.sunday
        ),
        (ChatIntent::Hours, Arabic) => format!(
            "نفتح في الأوقات التالية: {}، {}، و {}.",
            HOURS.weekdays, HOURS.saturday, HOURS.sunday
        ),
        (ChatIntent::Location, English) => format!(
            "We are located in {}, {}! Our address is {}.",
            LOCATION.city, LOCATION.country, LOCATION.address
        ),
        (ChatIntent::Location, Arabic) => format!(
            "موقعنا في {}، {}! عنواننا هو {}.",
            LOCATION.country, LOCATION.city, LOCATION.address
        ),
        (ChatIntent::Help, English) => "I am your EliteCuts assistant! I can help with booking, prices, location, and hours. What's on your mind?".to_string(),
        (ChatIntent::Help, Arabic) => "أنا مساعد EliteCuts الذكي! يمكنني مساعدتك بخصوص الحجز، الأسعار، الموقع، وأوقات العمل. ماذا يدور في ذهنك؟".to_string(),
        _ => "I'm sorry, I don't have information on that yet. You can try asking about 'prices', 'booking', or 'location'. \n\nعذراً، ليس لدي معلومات عن هذا بعد. يمكنك سؤالي عن 'الأسعار'، 'الحجز'، أو 'الموقع'.".to_string(),
    }
}

/// Greeting shown when the widget opens. `email` is the signed-in user's.
pub fn welcome_message(email: Option<&str>) -> String {
    match email.and_then(|e| e.split('@').next()).filter(|n| !n.is_empty()) {
        Some(name) => format!(
            "Welcome back, {name}! How can I help you with your next appointment today? \n\nأهلاً بعودتك يا {name}! كيف يمكنني مساعدتك في موعدك القادم اليوم؟"
        ),
        None => "Welcome to EliteCuts! I'm your AI assistant. How can I help you today? \n\nأهلاً بك في EliteCuts! أنا مساعدك الذكي. كيف يمكنني مساعدتك اليوم؟".to_string(),
    }
}

/// Keyword intent for `text`, ignoring the next-appointment lookup.
pub fn match_intent(text: &str) -> ChatIntent {
    let lowered = text.to_lowercase();
    KNOWLEDGE_BASE
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| lowered.contains(k)))
        .map_or(ChatIntent::Fallback, |entry| entry.intent)
}

fn asks_for_next_appointment(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NEXT_APPOINTMENT_TRIGGERS.iter().any(|t| lowered.contains(t))
}

pub fn format_chat_date(date: NaiveDate, language: Language) -> String {
    match language {
        Language::English => date.format("%B %-d, %Y").to_string(),
        Language::Arabic => format!(
            "{} {} {}",
            date.day(),
            ARABIC_MONTHS[date.month0() as usize],
            date.year()
        ),
    }
}

/// Answer one message. `actor` is `None` for anonymous visitors.
pub async fn respond<S: RecordStore>(
    manager: &AppointmentManager<S>,
    actor: Option<&Actor>,
    text: &str,
) -> Result<ChatReply, LifecycleError> {
    let language = detect_language(text);

    if asks_for_next_appointment(text) {
        let text = match actor {
            None => match language {
                Language::Arabic => "عذراً، لا يمكنني التحقق من مواعيدك بدون تسجيل الدخول. يرجى تسجيل الدخول أولاً.".to_string(),
                Language::English => "Sorry, I can't check your appointments without you being logged in. Please log in first.".to_string(),
            },
            Some(actor) => match manager.next_appointment(actor).await? {
                Some(next) => {
                    let date = format_chat_date(next.date, language);
                    match language {
                        Language::Arabic => format!(
                            "موعدك القادم هو: {} في {} الساعة {}.",
                            next.service_type, date, next.time
                        ),
                        Language::English => format!(
                            "Your next appointment is: {} on {} at {}.",
                            next.service_type, date, next.time
                        ),
                    }
                }
                None => match language {
                    Language::Arabic => "ليس لديك أي مواعيد قادمة. يمكنك حجز موعد جديد من لوحة التحكم.".to_string(),
                    Language::English => "You don't have any upcoming appointments. You can book a new one from your Dashboard.".to_string(),
                },
            },
        };
        return Ok(ChatReply {
            intent: ChatIntent::NextAppointment,
            language,
            text,
        });
    }

    let intent = match_intent(text);
    Ok(ChatReply {
        intent,
        language,
        text: canned_reply(intent, language),
    })
}

use crate::button::button_model::ButtonCategory;

const GENERAL_DESCRIPTION_CHARS: usize = 50;

/// What makes a rule fire.
#[derive(Debug)]
pub enum Trigger {
    /// Any keyword is a substring of the combined text.
    Keywords(&'static [&'static str]),
    /// `type="submit"`, or a `<button>` whose combined text mentions "submit".
    SubmitControl,
}

#[derive(Debug)]
pub struct PatternRule {
    pub category: ButtonCategory,
    pub label: &'static str,
    pub trigger: Trigger,
}

/// Ordered rule table. Position encodes precedence: the first rule that
/// fires decides the category, later rules are never consulted.
pub static PATTERN_TABLE: [PatternRule; 7] = [
    PatternRule {
        category: ButtonCategory::CookieConsent,
        label: "Cookie Consent Button",
        trigger: Trigger::Keywords(&[
            "accept all",
            "accept cookies",
            "allow all",
            "allow cookies",
            "agree and continue",
            "accept and continue",
            "cookie",
            "consent",
            "i accept",
            "i agree",
            "موافق على الكوكيز",
            "قبول الكوكيز",
            "موافق",
        ]),
    },
    PatternRule {
        category: ButtonCategory::TermsAgreement,
        label: "Terms Agreement Button",
        trigger: Trigger::Keywords(&[
            "accept terms",
            "agree terms",
            "accept conditions",
            "agree conditions",
            "i agree to terms",
            "accept privacy",
            "موافق على الشروط",
            "قبول الشروط",
            "terms",
            "privacy policy",
            "موافقة على الشروط",
        ]),
    },
    PatternRule {
        category: ButtonCategory::Submit,
        label: "Form Submit Button",
        trigger: Trigger::SubmitControl,
    },
    PatternRule {
        category: ButtonCategory::Navigation,
        label: "Navigation Button",
        trigger: Trigger::Keywords(&["next", "continue", "proceed", "forward", "التالي", "متابعة", "المتابعة"]),
    },
    PatternRule {
        category: ButtonCategory::Search,
        label: "Search Button",
        trigger: Trigger::Keywords(&["search", "find", "بحث", "البحث"]),
    },
    PatternRule {
        category: ButtonCategory::Choice,
        label: "Choice Button",
        trigger: Trigger::Keywords(&["yes", "no", "ok", "confirm", "نعم", "لا", "موافق", "تأكيد"]),
    },
    PatternRule {
        category: ButtonCategory::Cancel,
        label: "Cancel/Close Button",
        trigger: Trigger::Keywords(&[
            "cancel", "close", "dismiss", "skip", "not now", "later", "إلغاء", "إغلاق", "تجاهل", "لاحقاً",
            "ليس الآن",
        ]),
    },
];

/// Outcome of running a button through the pattern table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorization {
    pub category: ButtonCategory,
    pub priority: u8,
    pub description: String,
}

impl PatternRule {
    /// The description suffix when the rule fires, `None` otherwise.
    fn fire(&self, combined_text: &str, type_attr: &str, tag_name: &str) -> Option<String> {
        match &self.trigger {
            Trigger::Keywords(words) => words
                .iter()
                .find(|w| combined_text.contains(*w))
                .map(|w| format!("{}: {}", self.label, w)),
            Trigger::SubmitControl => {
                let fires = type_attr == "submit" || (tag_name == "button" && combined_text.contains("submit"));
                fires.then(|| self.label.to_string())
            }
        }
    }
}

/// Categorize a button from its combined lower-cased text, `type` attribute
/// and tag name. Pure and deterministic.
pub fn categorize(combined_text: &str, type_attr: &str, tag_name: &str) -> Categorization {
    for rule in PATTERN_TABLE.iter() {
        if let Some(description) = rule.fire(combined_text, type_attr, tag_name) {
            return Categorization {
                category: rule.category,
                priority: rule.category.priority(),
                description,
            };
        }
    }

    let head: String = combined_text.chars().take(GENERAL_DESCRIPTION_CHARS).collect();
    Categorization {
        category: ButtonCategory::General,
        priority: ButtonCategory::General.priority(),
        description: format!("General Button: {}", head),
    }
}

/// `text class id title aria-label onclick`, lower-cased.
pub fn combined_text(parts: [&str; 6]) -> String {
    parts.join(" ").to_lowercase()
}
